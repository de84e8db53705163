//! Keyword heuristics used to pre-fill a submission form.
//!
//! Both functions are advisory: the department a citizen actually submits
//! always wins over `classify`.

use domains::{Department, Priority};

/// Evaluated top to bottom; the first rule with a matching keyword wins.
const DEPARTMENT_RULES: &[(Department, &[&str])] = &[
    (Department::WaterManagement, &["water", "supply", "quality"]),
    (Department::RoadSafety, &["road", "traffic", "pothole"]),
    (Department::PublicHealth, &["garbage", "waste", "health"]),
    (Department::ElectricityBoard, &["power", "electricity", "outage"]),
    (Department::Sanitation, &["sewer", "sanitation", "cleaning"]),
];

const NEGATIVE_WORDS: &[&str] = &[
    "bad",
    "terrible",
    "awful",
    "horrible",
    "disgusting",
    "broken",
    "damaged",
];

const POSITIVE_WORDS: &[&str] = &["good", "great", "excellent", "wonderful", "amazing", "perfect"];

/// Maps free text to the department most likely responsible.
/// Falls back to General Administration; never fails.
pub fn classify(text: &str) -> Department {
    let lower = text.to_lowercase();
    DEPARTMENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(department, _)| *department)
        .unwrap_or(Department::GeneralAdministration)
}

/// Word-count sentiment: more negative words means higher severity.
pub fn predict_sentiment(text: &str) -> Priority {
    let (mut positive, mut negative) = (0usize, 0usize);
    for word in text.to_lowercase().split_whitespace() {
        if NEGATIVE_WORDS.contains(&word) {
            negative += 1;
        }
        if POSITIVE_WORDS.contains(&word) {
            positive += 1;
        }
    }
    match negative.cmp(&positive) {
        std::cmp::Ordering::Greater => Priority::High,
        std::cmp::Ordering::Less => Priority::Low,
        std::cmp::Ordering::Equal => Priority::Medium,
    }
}
