//! # Departments
//!
//! The fixed set of organizational units a complaint can be routed to.
//! This enum is the only place department names, slugs and contact
//! addresses are spelled out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Water Management")]
    WaterManagement,
    #[serde(rename = "Road & Safety")]
    RoadSafety,
    #[serde(rename = "Public Health")]
    PublicHealth,
    #[serde(rename = "Electricity Board")]
    ElectricityBoard,
    #[serde(rename = "Sanitation")]
    Sanitation,
    #[serde(rename = "General Administration")]
    GeneralAdministration,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::WaterManagement,
        Department::RoadSafety,
        Department::PublicHealth,
        Department::ElectricityBoard,
        Department::Sanitation,
        Department::GeneralAdministration,
    ];

    /// Short stable identifier used in URLs and seed data (e.g., "water").
    pub const fn slug(self) -> &'static str {
        match self {
            Department::WaterManagement => "water",
            Department::RoadSafety => "roads",
            Department::PublicHealth => "health",
            Department::ElectricityBoard => "electricity",
            Department::Sanitation => "sanitation",
            Department::GeneralAdministration => "general",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Department::WaterManagement => "Water Management",
            Department::RoadSafety => "Road & Safety",
            Department::PublicHealth => "Public Health",
            Department::ElectricityBoard => "Electricity Board",
            Department::Sanitation => "Sanitation",
            Department::GeneralAdministration => "General Administration",
        }
    }

    /// Contact address complaints for this department are routed to.
    pub const fn email(self) -> &'static str {
        match self {
            Department::WaterManagement => "admin@water.gov",
            Department::RoadSafety => "admin@roads.gov",
            Department::PublicHealth => "admin@health.gov",
            Department::ElectricityBoard => "admin@power.gov",
            Department::Sanitation => "admin@sanitation.gov",
            Department::GeneralAdministration => "admin@general.gov",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.slug() == slug)
    }

    pub fn info(self) -> DepartmentInfo {
        DepartmentInfo {
            id: self.slug(),
            name: self.name(),
            email: self.email(),
            description: format!("{} - Government Department", self.name()),
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the display name (any case) or the slug.
impl FromStr for Department {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(needle) || d.slug() == needle)
            .ok_or_else(|| DomainError::validation(format!("unknown department: {needle}")))
    }
}

/// Public view of a department for the directory endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_slugs() {
        assert_eq!("Road & Safety".parse::<Department>(), Ok(Department::RoadSafety));
        assert_eq!("road & safety".parse::<Department>(), Ok(Department::RoadSafety));
        assert_eq!("electricity".parse::<Department>(), Ok(Department::ElectricityBoard));
        assert!(matches!(
            "Parks".parse::<Department>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn serializes_as_display_name() {
        let json = serde_json::to_string(&Department::WaterManagement).unwrap();
        assert_eq!(json, "\"Water Management\"");
        let back: Department = serde_json::from_str("\"Sanitation\"").unwrap();
        assert_eq!(back, Department::Sanitation);
    }

    #[test]
    fn slugs_are_unique() {
        for d in Department::ALL {
            assert_eq!(Department::from_slug(d.slug()), Some(d));
        }
    }
}
