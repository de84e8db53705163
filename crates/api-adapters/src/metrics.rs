//! Prometheus metrics for the complaint API.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use domains::ComplaintStatus;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StatusLabels {
    pub status: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub class: String,
}

pub struct Metrics {
    registry: Registry,
    complaints_submitted: Counter,
    status_updates: Family<StatusLabels, Counter>,
    http_errors: Family<ErrorLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let complaints_submitted = Counter::default();
        let status_updates = Family::<StatusLabels, Counter>::default();
        let http_errors = Family::<ErrorLabels, Counter>::default();

        registry.register(
            "complaints_submitted",
            "Complaints accepted for processing",
            complaints_submitted.clone(),
        );
        registry.register(
            "complaint_status_updates",
            "Complaint updates by resulting status",
            status_updates.clone(),
        );
        registry.register(
            "http_errors",
            "Error responses by status class",
            http_errors.clone(),
        );

        Self {
            registry,
            complaints_submitted,
            status_updates,
            http_errors,
        }
    }

    pub fn complaint_submitted(&self) {
        self.complaints_submitted.inc();
    }

    pub fn status_updated(&self, status: ComplaintStatus) {
        self.status_updates
            .get_or_create(&StatusLabels {
                status: status.as_str().to_string(),
            })
            .inc();
    }

    /// Counts a 4xx or 5xx response. Other codes are ignored.
    pub fn http_error(&self, status: u16) {
        let class = match status {
            400..=499 => "4xx",
            500..=599 => "5xx",
            _ => return,
        };
        self.http_errors
            .get_or_create(&ErrorLabels {
                class: class.to_string(),
            })
            .inc();
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buf = String::new();
        encode(&mut buf, &self.registry)?;
        Ok(buf)
    }
}
