//! # AuthService
//!
//! Registration, login and profile management for citizens and admins.
//! Successful logins return a signed token carrying the caller's claim.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use domains::{
    is_email, Admin, AdminRepository, Caller, DomainError, NewUser, PasswordHasher, Result,
    TokenService, User, UserRepository, UserUpdate,
};

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 100;
const PASSWORD_MIN_CHARS: usize = 6;

/// Input for citizen registration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSession {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub admin: Admin,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    admins: Arc<dyn AdminRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        admins: Arc<dyn AdminRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            users,
            admins,
            hasher,
            tokens,
        }
    }

    pub async fn register(&self, form: Registration) -> Result<UserSession> {
        let name = validate_name(&form.name)?;
        let email = normalize_email(&form.email)?;
        if form.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(DomainError::validation(format!(
                "password must be at least {PASSWORD_MIN_CHARS} characters long"
            )));
        }
        if form.password != form.confirm_password {
            return Err(DomainError::validation("passwords do not match"));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::conflict("user with this email already exists"));
        }

        let user = self
            .users
            .create(NewUser {
                name,
                email,
                password_hash: self.hasher.hash(&form.password)?,
                phone: trimmed(form.phone),
                address: trimmed(form.address),
            })
            .await?;
        info!(user_id = %user.id, "user registered");

        let token = self.tokens.issue(&Caller::citizen(user.id))?;
        Ok(UserSession { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserSession> {
        let email = normalize_email(email)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .filter(|u| u.is_active && self.hasher.verify(password, &u.password_hash))
            .ok_or_else(|| {
                warn!(%email, "user login rejected");
                DomainError::unauthorized("invalid email or password")
            })?;

        let token = self.tokens.issue(&Caller::citizen(user.id))?;
        Ok(UserSession { user, token })
    }

    pub async fn profile(&self, caller: &Caller) -> Result<User> {
        let user_id = caller.require_citizen()?;
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    pub async fn update_profile(
        &self,
        caller: &Caller,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<User> {
        let current = self.profile(caller).await?;

        let name = trimmed(name).map(|n| validate_name(&n)).transpose()?;
        let email = trimmed(email).map(|e| normalize_email(&e)).transpose()?;
        if let Some(email) = email.as_deref().filter(|e| *e != current.email) {
            if self.users.find_by_email(email).await?.is_some() {
                return Err(DomainError::conflict("email already in use"));
            }
        }

        self.users
            .update(current.id, &UserUpdate { name, email })
            .await
    }

    pub async fn admin_login(&self, email: &str, password: &str) -> Result<AdminSession> {
        let email = normalize_email(email)?;
        let admin = self
            .admins
            .find_by_email(&email)
            .await?
            .filter(|a| a.is_active && self.hasher.verify(password, &a.password_hash))
            .ok_or_else(|| {
                warn!(%email, "admin login rejected");
                DomainError::unauthorized("invalid credentials")
            })?;

        let token = self.tokens.issue(&Caller::admin(admin.id, admin.department))?;
        info!(admin_id = %admin.id, department = %admin.department, "admin logged in");
        Ok(AdminSession { admin, token })
    }

    pub async fn admin_profile(&self, caller: &Caller) -> Result<Admin> {
        let claim = caller.require_admin()?;
        self.admins
            .find_by_id(claim.admin_id)
            .await?
            .ok_or_else(|| DomainError::not_found("admin", claim.admin_id))
    }

    /// Resolves a bearer token into a caller.
    pub fn authenticate(&self, token: &str) -> Result<Caller> {
        self.tokens.verify(token)
    }
}

fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    let len = name.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "name must be between {NAME_MIN_CHARS} and {NAME_MAX_CHARS} characters"
        )));
    }
    Ok(name.to_string())
}

fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    if !is_email(&email) {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(email)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{
        Department, MockAdminRepository, MockPasswordHasher, MockTokenService, MockUserRepository,
    };
    use uuid::Uuid;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::now_v7(),
            name: "John Doe".into(),
            email: email.into(),
            password_hash: "hash".into(),
            phone: None,
            address: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn registration() -> Registration {
        Registration {
            name: " John Doe ".into(),
            email: "John@Example.com".into(),
            password: "password123".into(),
            confirm_password: "password123".into(),
            ..Default::default()
        }
    }

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher.expect_hash().returning(|p| Ok(format!("hashed:{p}")));
        hasher
            .expect_verify()
            .returning(|p, h| h == format!("hashed:{p}"));
        hasher
    }

    fn tokens() -> MockTokenService {
        let mut tokens = MockTokenService::new();
        tokens.expect_issue().returning(|_| Ok("signed".into()));
        tokens
    }

    #[tokio::test]
    async fn register_normalizes_and_issues_token() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|n| n.email == "john@example.com" && n.name == "John Doe")
            .returning(|n| {
                let mut u = user(&n.email);
                u.password_hash = n.password_hash;
                Ok(u)
            });

        let svc = AuthService::new(
            Arc::new(users),
            Arc::new(MockAdminRepository::new()),
            Arc::new(hasher()),
            Arc::new(tokens()),
        );
        let session = svc.register(registration()).await.unwrap();
        assert_eq!(session.token, "signed");
        assert_eq!(session.user.password_hash, "hashed:password123");
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_email()
            .returning(|e| Ok(Some(user(e))));
        let svc = AuthService::new(
            Arc::new(users),
            Arc::new(MockAdminRepository::new()),
            Arc::new(hasher()),
            Arc::new(tokens()),
        );
        let err = svc.register(registration()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn mismatched_confirmation_is_invalid() {
        let svc = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockAdminRepository::new()),
            Arc::new(hasher()),
            Arc::new(tokens()),
        );
        let mut form = registration();
        form.confirm_password = "different".into();
        assert!(matches!(
            svc.register(form).await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|e| {
            let mut u = user(e);
            u.password_hash = "hashed:password123".into();
            Ok(Some(u))
        });
        let svc = AuthService::new(
            Arc::new(users),
            Arc::new(MockAdminRepository::new()),
            Arc::new(hasher()),
            Arc::new(tokens()),
        );
        assert!(svc.login("john@example.com", "password123").await.is_ok());
        assert!(matches!(
            svc.login("john@example.com", "nope").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn admin_token_carries_department() {
        let mut admins = MockAdminRepository::new();
        admins.expect_find_by_email().returning(|e| {
            let now = Utc::now();
            Ok(Some(Admin {
                id: Uuid::now_v7(),
                name: "Road & Safety Admin".into(),
                email: e.to_string(),
                password_hash: "hashed:roads123".into(),
                department: Department::RoadSafety,
                role: Default::default(),
                is_active: true,
                created_at: now,
                updated_at: now,
            }))
        });
        let mut tokens = MockTokenService::new();
        tokens
            .expect_issue()
            .withf(|c| c.admin.map(|a| a.department) == Some(Department::RoadSafety))
            .times(1)
            .returning(|_| Ok("admin-token".into()));

        let svc = AuthService::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(admins),
            Arc::new(hasher()),
            Arc::new(tokens),
        );
        let session = svc.admin_login("admin@roads.gov", "roads123").await.unwrap();
        assert_eq!(session.token, "admin-token");
    }
}
