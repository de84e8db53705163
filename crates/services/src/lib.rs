//! # services
//!
//! Application logic for the complaint desk: the complaint lifecycle,
//! access scoping, keyword classification, statistics and identity.
//! Everything here talks to storage and credentials through the ports
//! defined in `domains`.

pub mod auth_service;
pub mod bootstrap;
pub mod classifier;
pub mod complaint_service;
pub mod directory;
pub mod scope;
pub mod stats;

pub use auth_service::{AdminSession, AuthService, Registration, UserSession};
pub use complaint_service::ComplaintService;
pub use directory::DirectoryService;
pub use stats::ComplaintStats;
