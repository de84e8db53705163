//! # ComplaintService
//!
//! Orchestrates the complaint lifecycle: validation, scoping, storage and
//! aggregation. HTTP handlers call this and nothing below it.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use domains::{
    AdminRepository, Caller, Complaint, ComplaintDraft, ComplaintFilter, ComplaintPatch,
    ComplaintRepository, Department, DomainError, NewComplaint, Priority, Result, UserRepository,
};

use crate::classifier;
use crate::scope::{self, Action};
use crate::stats::{self, ComplaintStats};

pub struct ComplaintService {
    complaints: Arc<dyn ComplaintRepository>,
    users: Arc<dyn UserRepository>,
    admins: Arc<dyn AdminRepository>,
}

impl ComplaintService {
    pub fn new(
        complaints: Arc<dyn ComplaintRepository>,
        users: Arc<dyn UserRepository>,
        admins: Arc<dyn AdminRepository>,
    ) -> Self {
        Self {
            complaints,
            users,
            admins,
        }
    }

    /// Files a new complaint for the calling citizen. The result is always
    /// `Pending` with a fresh id.
    pub async fn submit(&self, caller: &Caller, draft: ComplaintDraft) -> Result<Complaint> {
        let user_id = caller.require_citizen()?;
        let valid = draft.validate()?;

        let submitted_by = match self.users.find_by_id(user_id).await? {
            Some(user) => user.name,
            None => format!("User {user_id}"),
        };

        let new = NewComplaint {
            sentiment: classifier::predict_sentiment(&valid.text),
            priority: Priority::default(),
            text: valid.text,
            category: valid.category,
            department: valid.department,
            department_email: valid.department_email,
            submitted_by,
            user_id,
            location: valid.location,
            contact_number: valid.contact_number,
            image: valid.image,
        };

        let complaint = self.complaints.create(new).await?;
        info!(
            complaint_id = %complaint.id,
            department = %complaint.department,
            user_id = %user_id,
            "complaint submitted"
        );
        Ok(complaint)
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<Complaint> {
        let complaint = self.load(id).await?;
        self.check(caller, &complaint, Action::Read)?;
        Ok(complaint)
    }

    /// Lists the caller's scope, newest first.
    pub async fn list(&self, caller: &Caller, filter: ComplaintFilter) -> Result<Vec<Complaint>> {
        filter.validate()?;
        let filter = scope::scope_filter(caller, filter)?;
        self.complaints.list(&filter).await
    }

    /// A citizen's own complaints, whatever else the caller holds. A
    /// `department` in the filter narrows the result.
    pub async fn list_mine(
        &self,
        caller: &Caller,
        filter: ComplaintFilter,
    ) -> Result<Vec<Complaint>> {
        let user_id = caller.require_citizen()?;
        filter.validate()?;
        let filter = ComplaintFilter {
            user_id: Some(user_id),
            ..filter
        };
        self.complaints.list(&filter).await
    }

    /// Everything routed to the calling admin's department.
    pub async fn list_department(
        &self,
        caller: &Caller,
        filter: ComplaintFilter,
    ) -> Result<Vec<Complaint>> {
        let admin = caller.require_admin()?;
        filter.validate()?;
        let filter = ComplaintFilter {
            department: Some(admin.department),
            user_id: None,
            ..filter
        };
        self.complaints.list(&filter).await
    }

    /// Applies a status/priority/assignment change on behalf of an admin
    /// of the complaint's department.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        patch: ComplaintPatch,
    ) -> Result<Complaint> {
        caller.require_admin()?;
        if patch.is_empty() {
            return Err(DomainError::validation("status is required"));
        }
        let complaint = self.load(id).await?;
        self.check(caller, &complaint, Action::Update)?;
        if let Some(Some(assignee)) = patch.assigned_to {
            self.check_assignee(assignee, &complaint).await?;
        }

        let updated = self.complaints.update(id, &patch).await?;
        info!(
            complaint_id = %id,
            from = %complaint.status,
            to = %updated.status,
            "complaint updated"
        );
        Ok(updated)
    }

    /// Removes a complaint. An id that does not exist (or no longer
    /// exists) is `NotFound`.
    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<()> {
        let complaint = self.load(id).await?;
        self.check(caller, &complaint, Action::Delete)?;
        self.complaints.delete(id).await?;
        info!(complaint_id = %id, "complaint deleted");
        Ok(())
    }

    /// Aggregate counts over the caller's scope, optionally narrowed to a
    /// department. Always recomputed.
    pub async fn stats(
        &self,
        caller: &Caller,
        department: Option<Department>,
    ) -> Result<ComplaintStats> {
        let filter = ComplaintFilter {
            department,
            ..Default::default()
        };
        let filter = scope::scope_filter(caller, filter)?;
        let complaints = self.complaints.list(&filter.unpaged()).await?;
        Ok(stats::aggregate(&complaints))
    }

    /// Department suggestion for the submission form.
    pub fn suggest_department(&self, text: &str) -> Department {
        classifier::classify(text)
    }

    async fn load(&self, id: Uuid) -> Result<Complaint> {
        self.complaints
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("complaint", id))
    }

    /// The assignee must be an active admin of the complaint's department.
    async fn check_assignee(&self, assignee: Uuid, complaint: &Complaint) -> Result<()> {
        let admin = self
            .admins
            .find_by_id(assignee)
            .await?
            .ok_or_else(|| DomainError::not_found("admin", assignee))?;
        if admin.department != complaint.department || !admin.is_active {
            warn!(
                complaint_id = %complaint.id,
                assignee = %assignee,
                "assignee rejected"
            );
            return Err(DomainError::validation(format!(
                "assignee must be an active admin of {}",
                complaint.department
            )));
        }
        Ok(())
    }

    fn check(&self, caller: &Caller, complaint: &Complaint, action: Action) -> Result<()> {
        scope::authorize(caller, complaint, action).inspect_err(|e| {
            warn!(complaint_id = %complaint.id, ?action, error = %e, "complaint access denied");
        })
    }
}
