//! # In-memory store
//!
//! DashMap-backed implementation of every repository port. Used when no
//! database is configured and as the test double in integration tests.
//! Each instance is independent: there is no process-wide state.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use domains::{
    Admin, AdminRepository, Complaint, ComplaintFilter, ComplaintPatch, ComplaintRepository,
    ComplaintStatus, Department, DomainError, NewAdmin, NewComplaint, NewUser, Result, User,
    UserRepository, UserUpdate,
};

/// A complaint plus its insertion sequence, used to break `created_at`
/// ties so ordering stays newest-first even within one clock tick.
struct Stored {
    seq: u64,
    complaint: Complaint,
}

#[derive(Default)]
pub struct InMemoryStore {
    complaints: DashMap<Uuid, Stored>,
    users: DashMap<Uuid, User>,
    user_emails: DashMap<String, Uuid>,
    admins: DashMap<Uuid, Admin>,
    admin_emails: DashMap<String, Uuid>,
    seq: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn complaint_count(&self) -> usize {
        self.complaints.len()
    }
}

#[async_trait]
impl ComplaintRepository for InMemoryStore {
    async fn create(&self, new: NewComplaint) -> Result<Complaint> {
        let now = Utc::now();
        let mut id = Uuid::now_v7();
        while self.complaints.contains_key(&id) {
            id = Uuid::now_v7();
        }
        let complaint = Complaint {
            id,
            text: new.text,
            category: new.category,
            department: new.department,
            department_email: new.department_email,
            status: ComplaintStatus::Pending,
            sentiment: new.sentiment,
            priority: new.priority,
            submitted_by: new.submitted_by,
            user_id: new.user_id,
            assigned_to: None,
            location: new.location,
            contact_number: new.contact_number,
            image: new.image,
            created_at: now,
            updated_at: now,
        };
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        self.complaints.insert(
            id,
            Stored {
                seq,
                complaint: complaint.clone(),
            },
        );
        debug!(complaint_id = %id, "complaint stored in memory");
        Ok(complaint)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Complaint>> {
        Ok(self.complaints.get(&id).map(|s| s.complaint.clone()))
    }

    async fn list(&self, filter: &ComplaintFilter) -> Result<Vec<Complaint>> {
        let mut hits: Vec<(u64, Complaint)> = self
            .complaints
            .iter()
            .filter(|entry| filter.matches(&entry.complaint))
            .map(|entry| (entry.seq, entry.complaint.clone()))
            .collect();

        hits.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| seq_b.cmp(seq_a))
        });

        let offset = filter.offset.unwrap_or(0) as usize;
        let limit = filter.limit.map_or(usize::MAX, |l| l as usize);
        Ok(hits
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, c)| c)
            .collect())
    }

    async fn update(&self, id: Uuid, patch: &ComplaintPatch) -> Result<Complaint> {
        let mut stored = self
            .complaints
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("complaint", id))?;
        patch.apply(&mut stored.complaint, Utc::now());
        Ok(stored.complaint.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.complaints
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("complaint", id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, new: NewUser) -> Result<User> {
        let id = Uuid::now_v7();
        match self.user_emails.entry(new.email.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::conflict("user with this email already exists"))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        let now = Utc::now();
        let user = User {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            phone: new.phone,
            address: new.address,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let Some(id) = self.user_emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        UserRepository::find_by_id(self, id).await
    }

    async fn update(&self, id: Uuid, update: &UserUpdate) -> Result<User> {
        let old_email = self
            .users
            .get(&id)
            .map(|u| u.email.clone())
            .ok_or_else(|| DomainError::not_found("user", id))?;

        if let Some(email) = update.email.as_ref().filter(|e| **e != old_email) {
            match self.user_emails.entry(email.clone()) {
                Entry::Occupied(_) => return Err(DomainError::conflict("email already in use")),
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
            self.user_emails.remove(&old_email);
        }

        let mut user = self
            .users
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("user", id))?;
        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl AdminRepository for InMemoryStore {
    async fn create(&self, new: NewAdmin) -> Result<Admin> {
        let id = Uuid::now_v7();
        match self.admin_emails.entry(new.email.clone()) {
            Entry::Occupied(_) => {
                return Err(DomainError::conflict("admin with this email already exists"))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }
        let now = Utc::now();
        let admin = Admin {
            id,
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            department: new.department,
            role: new.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.admins.insert(id, admin.clone());
        Ok(admin)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Admin>> {
        Ok(self.admins.get(&id).map(|a| a.clone()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let Some(id) = self.admin_emails.get(email).map(|id| *id) else {
            return Ok(None);
        };
        AdminRepository::find_by_id(self, id).await
    }

    async fn list_by_department(&self, department: Department) -> Result<Vec<Admin>> {
        let mut admins: Vec<Admin> = self
            .admins
            .iter()
            .filter(|a| a.department == department)
            .map(|a| a.clone())
            .collect();
        admins.sort_by_key(|a| a.created_at);
        Ok(admins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::Priority;

    fn new_complaint(user_id: Uuid, department: Department, text: &str) -> NewComplaint {
        NewComplaint {
            text: text.into(),
            category: "General".into(),
            department,
            department_email: department.email().into(),
            sentiment: Priority::Medium,
            priority: Priority::Medium,
            submitted_by: "John Doe".into(),
            user_id,
            location: None,
            contact_number: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn create_assigns_pending_and_unique_ids() {
        let store = InMemoryStore::new();
        let user = Uuid::now_v7();
        let a = ComplaintRepository::create(
            &store,
            new_complaint(user, Department::Sanitation, "Blocked sewer on 5th"),
        )
        .await
        .unwrap();
        let b = ComplaintRepository::create(
            &store,
            new_complaint(user, Department::Sanitation, "Blocked sewer on 6th"),
        )
        .await
        .unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, ComplaintStatus::Pending);
        assert_eq!(store.complaint_count(), 2);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paged() {
        let store = InMemoryStore::new();
        let user = Uuid::now_v7();
        for i in 0..5 {
            ComplaintRepository::create(
                &store,
                new_complaint(user, Department::RoadSafety, &format!("pothole number {i}")),
            )
            .await
            .unwrap();
        }
        let all = store.list(&ComplaintFilter::default()).await.unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[0].text, "pothole number 4");
        assert_eq!(all[4].text, "pothole number 0");

        let page = store
            .list(&ComplaintFilter {
                limit: Some(2),
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        let texts: Vec<_> = page.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["pothole number 3", "pothole number 2"]);
    }

    #[tokio::test]
    async fn department_filter_keeps_only_that_department_newest_first() {
        let store = InMemoryStore::new();
        let user = Uuid::now_v7();
        let rotation = [
            Department::WaterManagement,
            Department::RoadSafety,
            Department::Sanitation,
        ];
        for i in 0..9 {
            let department = rotation[i % rotation.len()];
            ComplaintRepository::create(
                &store,
                new_complaint(user, department, &format!("{department} report {i}")),
            )
            .await
            .unwrap();
        }

        let water = store
            .list(&ComplaintFilter {
                department: Some(Department::WaterManagement),
                ..Default::default()
            })
            .await
            .unwrap();
        let texts: Vec<_> = water.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "Water Management report 6",
                "Water Management report 3",
                "Water Management report 0",
            ]
        );
        assert!(water
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[tokio::test]
    async fn assignee_can_be_cleared() {
        let store = InMemoryStore::new();
        let c = ComplaintRepository::create(
            &store,
            new_complaint(Uuid::now_v7(), Department::Sanitation, "Blocked drain on 5th"),
        )
        .await
        .unwrap();
        let admin = Uuid::now_v7();
        let assigned = ComplaintRepository::update(
            &store,
            c.id,
            &ComplaintPatch {
                assigned_to: Some(Some(admin)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(assigned.assigned_to, Some(admin));

        let reprioritised = ComplaintRepository::update(
            &store,
            c.id,
            &ComplaintPatch {
                priority: Some(Priority::High),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(reprioritised.assigned_to, Some(admin));

        let cleared = ComplaintRepository::update(
            &store,
            c.id,
            &ComplaintPatch {
                assigned_to: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cleared.assigned_to, None);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_fields() {
        let store = InMemoryStore::new();
        let user = Uuid::now_v7();
        ComplaintRepository::create(
            &store,
            new_complaint(user, Department::RoadSafety, "Huge POTHOLE on Elm Street"),
        )
        .await
        .unwrap();
        ComplaintRepository::create(
            &store,
            new_complaint(user, Department::WaterManagement, "Low water pressure all week"),
        )
        .await
        .unwrap();

        let hits = store
            .list(&ComplaintFilter {
                search: Some("pothole".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].department, Department::RoadSafety);

        let by_name = store
            .list(&ComplaintFilter {
                search: Some("john".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete_missing_are_not_found() {
        let store = InMemoryStore::new();
        let patch = ComplaintPatch {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        };
        assert!(matches!(
            ComplaintRepository::update(&store, Uuid::now_v7(), &patch).await,
            Err(DomainError::NotFound { .. })
        ));

        let c = ComplaintRepository::create(
            &store,
            new_complaint(Uuid::now_v7(), Department::PublicHealth, "Overflowing garbage bins"),
        )
        .await
        .unwrap();
        store.delete(c.id).await.unwrap();
        assert!(matches!(
            store.delete(c.id).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn user_emails_are_unique() {
        let store = InMemoryStore::new();
        let new = NewUser {
            name: "Jane Smith".into(),
            email: "jane@example.com".into(),
            password_hash: "hash".into(),
            phone: None,
            address: None,
        };
        let jane = UserRepository::create(&store, new.clone()).await.unwrap();
        assert!(matches!(
            UserRepository::create(&store, new).await,
            Err(DomainError::Conflict(_))
        ));

        let renamed = UserRepository::update(
            &store,
            jane.id,
            &UserUpdate {
                name: None,
                email: Some("jane.smith@example.com".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.email, "jane.smith@example.com");
        assert!(UserRepository::find_by_email(&store, "jane@example.com")
            .await
            .unwrap()
            .is_none());
        assert!(UserRepository::find_by_email(&store, "jane.smith@example.com")
            .await
            .unwrap()
            .is_some());
    }
}
