//! # PostgreSQL store
//!
//! Maps the relational schema in `migrations/` to the domain models.
//! Enums are stored as their display strings so the table stays readable
//! from psql.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::{error, info};
use uuid::Uuid;

use domains::{
    Admin, AdminRepository, AdminRole, Complaint, ComplaintFilter, ComplaintPatch,
    ComplaintRepository, ComplaintStatus, Department, DomainError, NewAdmin, NewComplaint,
    NewUser, Result, User, UserRepository, UserUpdate,
};

const COMPLAINT_COLUMNS: &str = "id, text, category, department, department_email, status, \
     sentiment, priority, submitted_by, user_id, assigned_to, location, contact_number, image, \
     created_at, updated_at";

const USER_COLUMNS: &str =
    "id, name, email, password_hash, phone, address, is_active, created_at, updated_at";

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, department, role, is_active, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies pending migrations.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(db_error)?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                error!(error = %e, "migration failed");
                DomainError::internal("database migration failed")
            })?;
        info!(max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Logs the driver error and hands back a message safe for callers.
fn db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DomainError::conflict("email already in use");
        }
    }
    error!(error = %err, "database operation failed");
    DomainError::internal("database operation failed")
}

fn corrupt(column: &str, err: DomainError) -> DomainError {
    error!(column, error = %err, "unreadable value in database row");
    DomainError::internal("stored record is malformed")
}

fn complaint_from_row(row: &PgRow) -> Result<Complaint> {
    let text = |col: &str| row.try_get::<String, _>(col).map_err(db_error);
    Ok(Complaint {
        id: row.try_get("id").map_err(db_error)?,
        text: text("text")?,
        category: text("category")?,
        department: text("department")?
            .parse::<Department>()
            .map_err(|e| corrupt("department", e))?,
        department_email: text("department_email")?,
        status: text("status")?
            .parse::<ComplaintStatus>()
            .map_err(|e| corrupt("status", e))?,
        sentiment: text("sentiment")?.parse().map_err(|e| corrupt("sentiment", e))?,
        priority: text("priority")?.parse().map_err(|e| corrupt("priority", e))?,
        submitted_by: text("submitted_by")?,
        user_id: row.try_get("user_id").map_err(db_error)?,
        assigned_to: row.try_get("assigned_to").map_err(db_error)?,
        location: row.try_get("location").map_err(db_error)?,
        contact_number: row.try_get("contact_number").map_err(db_error)?,
        image: row.try_get("image").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

fn user_from_row(row: &PgRow) -> Result<User> {
    Ok(User {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        email: row.try_get("email").map_err(db_error)?,
        password_hash: row.try_get("password_hash").map_err(db_error)?,
        phone: row.try_get("phone").map_err(db_error)?,
        address: row.try_get("address").map_err(db_error)?,
        is_active: row.try_get("is_active").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

fn admin_from_row(row: &PgRow) -> Result<Admin> {
    let department: String = row.try_get("department").map_err(db_error)?;
    let role: String = row.try_get("role").map_err(db_error)?;
    Ok(Admin {
        id: row.try_get("id").map_err(db_error)?,
        name: row.try_get("name").map_err(db_error)?,
        email: row.try_get("email").map_err(db_error)?,
        password_hash: row.try_get("password_hash").map_err(db_error)?,
        department: department.parse().map_err(|e| corrupt("department", e))?,
        role: match role.as_str() {
            "super_admin" => AdminRole::SuperAdmin,
            _ => AdminRole::Admin,
        },
        is_active: row.try_get("is_active").map_err(db_error)?,
        created_at: row.try_get("created_at").map_err(db_error)?,
        updated_at: row.try_get("updated_at").map_err(db_error)?,
    })
}

const fn role_str(role: AdminRole) -> &'static str {
    match role {
        AdminRole::Admin => "admin",
        AdminRole::SuperAdmin => "super_admin",
    }
}

/// Escapes LIKE metacharacters so a search term matches literally.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Appends the WHERE clause for every non-paging criterion.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ComplaintFilter) {
    qb.push(" WHERE TRUE");
    if let Some(user_id) = filter.user_id {
        qb.push(" AND user_id = ").push_bind(user_id);
    }
    if let Some(department) = filter.department {
        qb.push(" AND department = ").push_bind(department.name());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(sentiment) = filter.sentiment {
        qb.push(" AND sentiment = ").push_bind(sentiment.as_str());
    }
    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        qb.push(" AND (text ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR submitted_by ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[async_trait]
impl ComplaintRepository for PgStore {
    async fn create(&self, new: NewComplaint) -> Result<Complaint> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO complaints ({COMPLAINT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, $11, $12, $13, $14, $14) \
             RETURNING {COMPLAINT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(new.text)
            .bind(new.category)
            .bind(new.department.name())
            .bind(new.department_email)
            .bind(ComplaintStatus::Pending.as_str())
            .bind(new.sentiment.as_str())
            .bind(new.priority.as_str())
            .bind(new.submitted_by)
            .bind(new.user_id)
            .bind(new.location)
            .bind(new.contact_number)
            .bind(new.image)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        complaint_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>> {
        let sql = format!("SELECT {COMPLAINT_COLUMNS} FROM complaints WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(complaint_from_row).transpose()
    }

    async fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {COMPLAINT_COLUMNS} FROM complaints"
        ));
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY created_at DESC, id DESC");
        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }
        if let Some(offset) = filter.offset {
            qb.push(" OFFSET ").push_bind(i64::from(offset));
        }

        let rows = qb.build().fetch_all(&self.pool).await.map_err(db_error)?;
        rows.iter().map(complaint_from_row).collect()
    }

    /// Single-statement update: concurrent writers are last-write-wins.
    async fn update(&self, id: Uuid, patch: &ComplaintPatch) -> Result<Complaint> {
        let sql = format!(
            "UPDATE complaints SET \
                 status = COALESCE($2, status), \
                 priority = COALESCE($3, priority), \
                 assigned_to = CASE WHEN $4 THEN $5 ELSE assigned_to END, \
                 updated_at = $6 \
             WHERE id = $1 \
             RETURNING {COMPLAINT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.status.map(ComplaintStatus::as_str))
            .bind(patch.priority.map(|p| p.as_str()))
            .bind(patch.assigned_to.is_some())
            .bind(patch.assigned_to.flatten())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::not_found("complaint", id))?;
        complaint_from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("complaint", id));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, new: NewUser) -> Result<User> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(new.name)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.phone)
            .bind(new.address)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        user_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(user_from_row).transpose()
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User> {
        let sql = format!(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             updated_at = $4 WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(update.name.as_deref())
            .bind(update.email.as_deref())
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::not_found("user", id))?;
        user_from_row(&row)
    }
}

#[async_trait]
impl AdminRepository for PgStore {
    async fn create(&self, new: NewAdmin) -> Result<Admin> {
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO admins ({ADMIN_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $7) \
             RETURNING {ADMIN_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(new.name)
            .bind(new.email)
            .bind(new.password_hash)
            .bind(new.department.name())
            .bind(role_str(new.role))
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        admin_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let sql = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(admin_from_row).transpose()
    }

    async fn list_by_department(&self, department: Department) -> Result<Vec<Admin>> {
        let sql = format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE department = $1 ORDER BY created_at"
        );
        let rows = sqlx::query(&sql)
            .bind(department.name())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.iter().map(admin_from_row).collect()
    }
}
