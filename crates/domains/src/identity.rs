//! # Identity
//!
//! Citizen and admin accounts, plus the claim a verified bearer token
//! resolves to. Complaints only ever hold weak references (ids) to these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::department::Department;
use crate::error::{DomainError, Result};

/// A citizen account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; never leaves the process
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Profile changes a citizen may make to their own account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

/// A department staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub department: Department,
    pub role: AdminRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub department: Department,
    pub role: AdminRole,
}

/// The admin half of an identity claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaim {
    pub admin_id: Uuid,
    pub department: Department,
}

/// Identity of whoever is calling the core, resolved from a verified
/// token before any service is invoked. Either half may be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Option<Uuid>,
    pub admin: Option<AdminClaim>,
}

impl Caller {
    pub const fn citizen(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            admin: None,
        }
    }

    pub const fn admin(admin_id: Uuid, department: Department) -> Self {
        Self {
            user_id: None,
            admin: Some(AdminClaim {
                admin_id,
                department,
            }),
        }
    }

    pub const fn is_anonymous(&self) -> bool {
        self.user_id.is_none() && self.admin.is_none()
    }

    /// The citizen id, or `Forbidden` for admin-only callers.
    pub fn require_citizen(&self) -> Result<Uuid> {
        self.ensure_identified()?;
        self.user_id
            .ok_or_else(|| DomainError::forbidden("citizen account required"))
    }

    /// The admin claim, or `Forbidden` for citizen-only callers.
    pub fn require_admin(&self) -> Result<AdminClaim> {
        self.ensure_identified()?;
        self.admin
            .ok_or_else(|| DomainError::forbidden("admin account required"))
    }

    pub fn ensure_identified(&self) -> Result<()> {
        if self.is_anonymous() {
            return Err(DomainError::unauthorized("authorization required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_caller_is_unauthorized() {
        let caller = Caller::default();
        assert!(matches!(
            caller.require_citizen(),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn admin_is_not_a_citizen() {
        let caller = Caller::admin(Uuid::now_v7(), Department::Sanitation);
        assert!(matches!(
            caller.require_citizen(),
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(caller.require_admin().unwrap().department, Department::Sanitation);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name: "John Doe".into(),
            email: "john@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            phone: None,
            address: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "john@example.com");
    }
}
