//! Profile records: the facts a chat answer can be grounded in.
//!
//! All of these are owned by an external admin path. The chat core only reads
//! them through [`DataStore`](crate::DataStore).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A labelled URL (GitHub, LinkedIn, live demo, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
}

impl ProfileLink {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    /// Free-form grouping such as "Infrastructure" or "Languages".
    pub category: String,
    /// 1 (familiar) to 5 (expert).
    pub proficiency: u8,
    pub display_order: i32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub current: bool,
    pub description: String,
    /// Case-sensitive. A `BTreeSet` keeps rendering order stable.
    #[serde(default)]
    pub technologies: BTreeSet<String>,
    pub display_order: i32,
    pub active: bool,
}

impl Experience {
    /// Human-readable period, e.g. `Mar 2021 - Present`.
    pub fn period(&self) -> String {
        let start = self.start_date.format("%b %Y");
        match (self.current, self.end_date) {
            (true, _) | (false, None) => format!("{start} - Present"),
            (false, Some(end)) => format!("{start} - {}", end.format("%b %Y")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// e.g. "open-source", "homelab", "professional".
    pub project_type: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ProfileLink>,
    #[serde(default)]
    pub technologies: BTreeSet<String>,
    pub featured: bool,
    pub active: bool,
    pub display_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<ProfileLink>,
    pub availability: String,
}
