//! civic-desk/crates/domains/src/lib.rs
//!
//! Entities, identity claims, the error taxonomy and the port traits that
//! every other crate in the workspace builds on.

pub mod complaint;
pub mod department;
pub mod error;
pub mod identity;
pub mod ports;

// Re-exporting for easier access in other crates
pub use complaint::*;
pub use department::*;
pub use error::*;
pub use identity::*;
pub use ports::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn patch_never_touches_owner() {
        let now = Utc::now();
        let owner = Uuid::now_v7();
        let mut complaint = Complaint {
            id: Uuid::now_v7(),
            text: "Pothole on Elm Street causing damage".into(),
            category: "Road & Safety".into(),
            department: Department::RoadSafety,
            department_email: "admin@roads.gov".into(),
            status: ComplaintStatus::Pending,
            sentiment: Priority::Medium,
            priority: Priority::Medium,
            submitted_by: "Jane Smith".into(),
            user_id: owner,
            assigned_to: None,
            location: None,
            contact_number: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        let patch = ComplaintPatch {
            status: Some(ComplaintStatus::Rejected),
            ..Default::default()
        };
        let later = now + chrono::Duration::seconds(5);
        patch.apply(&mut complaint, later);

        assert_eq!(complaint.status, ComplaintStatus::Rejected);
        assert_eq!(complaint.user_id, owner);
        assert_eq!(complaint.updated_at, later);
        assert_eq!(complaint.created_at, now);

        let admin = Uuid::now_v7();
        let assign = ComplaintPatch {
            assigned_to: Some(Some(admin)),
            ..Default::default()
        };
        assign.apply(&mut complaint, later);
        assert_eq!(complaint.assigned_to, Some(admin));

        let unassign = ComplaintPatch {
            assigned_to: Some(None),
            ..Default::default()
        };
        unassign.apply(&mut complaint, later);
        assert_eq!(complaint.assigned_to, None);
        assert_eq!(complaint.status, ComplaintStatus::Rejected);
    }
}
