//! Per-request chat types: the category partition, the incoming query, and
//! the response returned to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Model identifier reported when a canned answer was served.
pub const FALLBACK_MODEL: &str = "fallback";

/// A named partition of profile facts, used for retrieval and for fallback
/// selection.
///
/// Variant order is the retention priority: when a prompt is over budget,
/// blocks are dropped from the bottom of this list first. Deriving `Ord`
/// means a `BTreeSet<Category>` iterates in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    About,
    Experience,
    Skills,
    Projects,
    Contact,
}

impl Category {
    /// All categories, highest priority first.
    pub const ALL: [Category; 5] = [
        Category::About,
        Category::Experience,
        Category::Skills,
        Category::Projects,
        Category::Contact,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Experience => "experience",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }

    /// Section title used in assembled prompts.
    pub fn title(&self) -> &'static str {
        match self {
            Self::About => "About",
            Self::Experience => "Experience",
            Self::Skills => "Skills",
            Self::Projects => "Projects",
            Self::Contact => "Contact",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// The raw question as received from the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatQuery {
    pub message: String,
}

impl ChatQuery {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The answer produced for one query. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    /// Category names that actually informed the answer.
    pub sources: Vec<String>,
    /// Model id that generated the text, or [`FALLBACK_MODEL`].
    pub model: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatResponse {
    pub fn is_fallback(&self) -> bool {
        self.model == FALLBACK_MODEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn set_iterates_in_priority_order() {
        let set: BTreeSet<Category> = [Category::Contact, Category::Skills, Category::About]
            .into_iter()
            .collect();
        let names: Vec<_> = set.iter().map(Category::as_str).collect();
        assert_eq!(names, ["about", "skills", "contact"]);
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("Projects".parse::<Category>().unwrap(), Category::Projects);
        assert!("hobbies".parse::<Category>().is_err());
    }

    #[test]
    fn response_serializes_rfc3339_timestamp() {
        let resp = ChatResponse {
            response: "hi".into(),
            sources: vec!["about".into()],
            model: FALLBACK_MODEL.into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["timestamp"].as_str().unwrap().contains('T'));
        assert_eq!(json["model"], "fallback");
        assert!(resp.is_fallback());
    }
}
