//! # Core Traits (Ports)
//!
//! Storage and identity adapters implement these traits; services only
//! ever see `Arc<dyn Trait>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::complaint::{Complaint, ComplaintFilter, ComplaintPatch, NewComplaint};
use crate::department::Department;
use crate::error::Result;
use crate::identity::{Admin, Caller, NewAdmin, NewUser, User, UserUpdate};

/// Persistence contract for complaint records.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Stores a validated complaint, assigning id, `Pending` status and
    /// timestamps.
    async fn create(&self, complaint: NewComplaint) -> Result<Complaint>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>>;

    /// Newest first. An empty result is not an error.
    async fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>>;

    /// Fails with `NotFound` if `id` is absent.
    async fn update(&self, id: Uuid, patch: &ComplaintPatch) -> Result<Complaint>;

    /// Fails with `NotFound` if `id` is absent, including when it was
    /// already deleted.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

/// Citizen account storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn create(&self, user: NewUser) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User>;
}

/// Department staff storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn create(&self, admin: NewAdmin) -> Result<Admin>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>>;
    async fn list_by_department(&self, department: Department) -> Result<Vec<Admin>>;
}

/// One-way credential hashing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String>;
    /// `false` for a wrong password or an unparsable hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Signed bearer credentials carrying a `Caller`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenService: Send + Sync {
    fn issue(&self, caller: &Caller) -> Result<String>;
    /// Fails with `Unauthorized` for expired, malformed or tampered tokens.
    fn verify(&self, token: &str) -> Result<Caller>;
}
