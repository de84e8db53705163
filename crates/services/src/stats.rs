//! # Stats Aggregator
//!
//! Counts by status, priority and department, computed in one pass over an
//! already-scoped complaint set. Nothing here is persisted.

use std::collections::BTreeMap;

use serde::Serialize;

use domains::{Complaint, ComplaintStatus, Department, Priority};

/// Per-status counters shared by the overall and per-department views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub rejected: u64,
}

impl StatusCounts {
    fn record(&mut self, status: ComplaintStatus) {
        self.total += 1;
        match status {
            ComplaintStatus::Pending => self.pending += 1,
            ComplaintStatus::InProgress => self.in_progress += 1,
            ComplaintStatus::Resolved => self.resolved += 1,
            ComplaintStatus::Rejected => self.rejected += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    #[serde(rename = "Low")]
    pub low: u64,
    #[serde(rename = "Medium")]
    pub medium: u64,
    #[serde(rename = "High")]
    pub high: u64,
    #[serde(rename = "Critical")]
    pub critical: u64,
}

impl PriorityCounts {
    fn record(&mut self, priority: Priority) {
        match priority {
            Priority::Low => self.low += 1,
            Priority::Medium => self.medium += 1,
            Priority::High => self.high += 1,
            Priority::Critical => self.critical += 1,
        }
    }
}

/// The stats object returned to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintStats {
    #[serde(flatten)]
    pub counts: StatusCounts,
    pub by_priority: PriorityCounts,
    pub by_department: BTreeMap<Department, StatusCounts>,
}

impl ComplaintStats {
    pub const fn total(&self) -> u64 {
        self.counts.total
    }
}

pub fn aggregate<'a, I>(complaints: I) -> ComplaintStats
where
    I: IntoIterator<Item = &'a Complaint>,
{
    let mut stats = ComplaintStats::default();
    for complaint in complaints {
        stats.counts.record(complaint.status);
        stats.by_priority.record(complaint.priority);
        stats
            .by_department
            .entry(complaint.department)
            .or_default()
            .record(complaint.status);
    }
    stats
}
