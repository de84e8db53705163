//! # Access Scoping
//!
//! Decides which complaints a caller may see or mutate. Both functions are
//! pure: no storage access, no logging.

use domains::{Caller, Complaint, ComplaintFilter, Department, DomainError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Update,
    Delete,
}

/// Citizens may read and delete their own complaints. Admins may read,
/// update and delete complaints of their own department. A caller holding
/// both claims must satisfy both. Mismatches are `Forbidden`, never
/// `NotFound`.
pub fn authorize(caller: &Caller, complaint: &Complaint, action: Action) -> Result<()> {
    caller.ensure_identified()?;

    if let Some(user_id) = caller.user_id {
        if action == Action::Update && caller.admin.is_none() {
            return Err(DomainError::forbidden(
                "only department admins may update complaints",
            ));
        }
        if complaint.user_id != user_id {
            return Err(DomainError::forbidden(match action {
                Action::Delete => "you can only delete your own complaints",
                _ => "access denied",
            }));
        }
    }

    if let Some(admin) = caller.admin {
        if complaint.department != admin.department {
            return Err(DomainError::forbidden(match action {
                Action::Read => "access denied",
                Action::Update => "you can only update complaints from your department",
                Action::Delete => "you can only delete complaints from your department",
            }));
        }
    }

    Ok(())
}

/// Narrows `filter` to the caller's scope. A citizen-only caller is pinned
/// to their own complaints; an admin is pinned to their department, and
/// asking for another department is `Forbidden`.
pub fn scope_filter(caller: &Caller, mut filter: ComplaintFilter) -> Result<ComplaintFilter> {
    caller.ensure_identified()?;

    if let Some(admin) = caller.admin {
        ensure_same_department(filter.department, admin.department)?;
        filter.department = Some(admin.department);
    } else if let Some(user_id) = caller.user_id {
        filter.user_id = Some(user_id);
    }
    Ok(filter)
}

fn ensure_same_department(requested: Option<Department>, own: Department) -> Result<()> {
    match requested {
        Some(other) if other != own => Err(DomainError::forbidden(format!(
            "admins of {own} cannot view complaints of {other}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{ComplaintStatus, Priority};
    use uuid::Uuid;

    fn complaint(owner: Uuid, department: Department) -> Complaint {
        let now = Utc::now();
        Complaint {
            id: Uuid::now_v7(),
            text: "Water leak on Main St for 3 days".into(),
            category: "Water".into(),
            department,
            department_email: department.email().into(),
            status: ComplaintStatus::Pending,
            sentiment: Priority::Medium,
            priority: Priority::Medium,
            submitted_by: "John Doe".into(),
            user_id: owner,
            assigned_to: None,
            location: None,
            contact_number: None,
            image: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn admin_update_requires_matching_department() {
        let c = complaint(Uuid::now_v7(), Department::WaterManagement);
        let water = Caller::admin(Uuid::now_v7(), Department::WaterManagement);
        let roads = Caller::admin(Uuid::now_v7(), Department::RoadSafety);

        assert!(authorize(&water, &c, Action::Update).is_ok());
        assert!(matches!(
            authorize(&roads, &c, Action::Update),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn citizen_may_delete_only_own() {
        let owner = Uuid::now_v7();
        let c = complaint(owner, Department::Sanitation);

        assert!(authorize(&Caller::citizen(owner), &c, Action::Delete).is_ok());
        assert!(matches!(
            authorize(&Caller::citizen(Uuid::now_v7()), &c, Action::Delete),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn citizen_cannot_update_even_own() {
        let owner = Uuid::now_v7();
        let c = complaint(owner, Department::Sanitation);
        assert!(matches!(
            authorize(&Caller::citizen(owner), &c, Action::Update),
            Err(DomainError::Forbidden(_))
        ));
    }

    #[test]
    fn dual_claim_must_satisfy_both() {
        let owner = Uuid::now_v7();
        let c = complaint(owner, Department::PublicHealth);
        let mut caller = Caller::admin(Uuid::now_v7(), Department::PublicHealth);
        caller.user_id = Some(Uuid::now_v7());
        assert!(authorize(&caller, &c, Action::Read).is_err());

        caller.user_id = Some(owner);
        assert!(authorize(&caller, &c, Action::Read).is_ok());
    }

    #[test]
    fn anonymous_is_unauthorized() {
        let c = complaint(Uuid::now_v7(), Department::PublicHealth);
        assert!(matches!(
            authorize(&Caller::default(), &c, Action::Read),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn filters_are_pinned_to_scope() {
        let user = Uuid::now_v7();
        let scoped = scope_filter(&Caller::citizen(user), ComplaintFilter::default()).unwrap();
        assert_eq!(scoped.user_id, Some(user));
        assert_eq!(scoped.department, None);

        let admin = Caller::admin(Uuid::now_v7(), Department::RoadSafety);
        let scoped = scope_filter(&admin, ComplaintFilter::default()).unwrap();
        assert_eq!(scoped.department, Some(Department::RoadSafety));
        assert_eq!(scoped.user_id, None);

        let other = ComplaintFilter {
            department: Some(Department::WaterManagement),
            ..Default::default()
        };
        assert!(matches!(
            scope_filter(&admin, other),
            Err(DomainError::Forbidden(_))
        ));
    }
}
