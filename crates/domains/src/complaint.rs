//! # Complaint Models
//!
//! The complaint record, its lifecycle enums, and the input types the
//! store accepts. We use UUID v7 for time-ordered, globally unique ids.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::department::Department;
use crate::error::{DomainError, Result};

pub const TEXT_MIN_CHARS: usize = 10;
pub const TEXT_MAX_CHARS: usize = 2000;
const CATEGORY_MAX_CHARS: usize = 100;
const LOCATION_MAX_CHARS: usize = 200;
const CONTACT_MAX_CHARS: usize = 20;
const IMAGE_MAX_CHARS: usize = 500;

/// Largest page a caller may request from `list`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Lifecycle stage of a complaint. Any stage may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
    Rejected,
}

impl ComplaintStatus {
    pub const ALL: [ComplaintStatus; 4] = [
        ComplaintStatus::Pending,
        ComplaintStatus::InProgress,
        ComplaintStatus::Resolved,
        ComplaintStatus::Rejected,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
            ComplaintStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DomainError::validation(format!("invalid status value: {needle}")))
    }
}

/// Severity classification, used for both `sentiment` and `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| DomainError::validation(format!("invalid priority value: {needle}")))
    }
}

/// A citizen-submitted issue report routed to a department.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub text: String,
    pub category: String,
    pub department: Department,
    pub department_email: String,
    pub status: ComplaintStatus,
    pub sentiment: Priority,
    pub priority: Priority,
    /// Display name of the owning citizen at submission time
    pub submitted_by: String,
    /// Owning citizen. Never changes after creation.
    pub user_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw submission as it arrives from a caller. Nothing is trusted yet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDraft {
    pub text: Option<String>,
    pub category: Option<String>,
    pub department: Option<String>,
    pub department_email: Option<String>,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub image: Option<String>,
}

/// A validated complaint ready for the store. The store assigns id,
/// status and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewComplaint {
    pub text: String,
    pub category: String,
    pub department: Department,
    pub department_email: String,
    pub sentiment: Priority,
    pub priority: Priority,
    pub submitted_by: String,
    pub user_id: Uuid,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub image: Option<String>,
}

/// Fields of a draft that survived validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidDraft {
    pub text: String,
    pub category: String,
    pub department: Department,
    pub department_email: String,
    pub location: Option<String>,
    pub contact_number: Option<String>,
    pub image: Option<String>,
}

impl ComplaintDraft {
    /// Trims and checks every field. Required fields that are missing or
    /// blank, text outside 10..=2000 chars, an unknown department or a
    /// malformed email/URL all yield `DomainError::Validation`.
    pub fn validate(self) -> Result<ValidDraft> {
        let text = required(self.text, "text")?;
        let category = required(self.category, "category")?;
        let department = required(self.department, "department")?;
        let department_email = required(self.department_email, "departmentEmail")?;

        let text_len = text.chars().count();
        if text_len < TEXT_MIN_CHARS {
            return Err(DomainError::validation(format!(
                "complaint description must be at least {TEXT_MIN_CHARS} characters long"
            )));
        }
        if text_len > TEXT_MAX_CHARS {
            return Err(DomainError::validation(format!(
                "complaint description must be at most {TEXT_MAX_CHARS} characters long"
            )));
        }
        max_len(&category, CATEGORY_MAX_CHARS, "category")?;

        let department: Department = department.parse()?;

        let department_email = department_email.to_lowercase();
        if !is_email(&department_email) {
            return Err(DomainError::validation("invalid department email format"));
        }

        let location = optional(self.location);
        if let Some(location) = &location {
            max_len(location, LOCATION_MAX_CHARS, "location")?;
        }
        let contact_number = optional(self.contact_number);
        if let Some(contact) = &contact_number {
            max_len(contact, CONTACT_MAX_CHARS, "contactNumber")?;
        }
        let image = optional(self.image);
        if let Some(image) = &image {
            max_len(image, IMAGE_MAX_CHARS, "image")?;
            if !(image.starts_with("http://") || image.starts_with("https://")) {
                return Err(DomainError::validation("image must be an http(s) URL"));
            }
        }

        Ok(ValidDraft {
            text,
            category,
            department,
            department_email,
            location,
            contact_number,
            image,
        })
    }
}

/// Partial update applied by a department admin. `user_id` is
/// absent: ownership cannot be patched.
///
/// `assigned_to` has three states: `None` leaves the assignee alone,
/// `Some(None)` clears it and `Some(Some(id))` assigns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintPatch {
    pub status: Option<ComplaintStatus>,
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub assigned_to: Option<Option<Uuid>>,
}

impl ComplaintPatch {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.assigned_to.is_none()
    }

    /// Applies the patch in place and stamps `updated_at`.
    pub fn apply(&self, complaint: &mut Complaint, now: DateTime<Utc>) {
        if let Some(status) = self.status {
            complaint.status = status;
        }
        if let Some(priority) = self.priority {
            complaint.priority = priority;
        }
        if let Some(assignee) = self.assigned_to {
            complaint.assigned_to = assignee;
        }
        complaint.updated_at = now;
    }
}

/// Keeps an explicit JSON `null` apart from an absent field. Pair with
/// `#[serde(default)]` so that absence stays `None`.
pub fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Filters accepted by `ComplaintRepository::list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplaintFilter {
    pub user_id: Option<Uuid>,
    pub department: Option<Department>,
    pub status: Option<ComplaintStatus>,
    pub sentiment: Option<Priority>,
    /// Case-insensitive substring of text, category or submittedBy
    pub search: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ComplaintFilter {
    /// Rejects page sizes outside 1..=100.
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(DomainError::validation(format!(
                    "limit must be a number between 1 and {MAX_PAGE_SIZE}"
                )));
            }
        }
        Ok(())
    }

    /// The same filter without paging, used for aggregation.
    pub fn unpaged(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Whether `complaint` passes every non-paging criterion.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        if self.user_id.is_some_and(|u| u != complaint.user_id) {
            return false;
        }
        if self.department.is_some_and(|d| d != complaint.department) {
            return false;
        }
        if self.status.is_some_and(|s| s != complaint.status) {
            return false;
        }
        if self.sentiment.is_some_and(|s| s != complaint.sentiment) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                [&complaint.text, &complaint.category, &complaint.submitted_by]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    optional(value).ok_or_else(|| DomainError::validation(format!("{field} is required")))
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn max_len(value: &str, max: usize, field: &str) -> Result<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters long"
        )));
    }
    Ok(())
}

/// Loose `local@domain.tld` shape check; no whitespace allowed.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
