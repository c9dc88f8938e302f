//! Query classification: question text to a set of fact categories.
//!
//! Matching is case-insensitive and token-based. A keyword of four or more
//! letters is a stem and matches any word starting with it (`skill` matches
//! `skills`, `compan` matches `company`). Shorter keywords match the whole
//! word or its plural only, so `who` does not fire on `whole`.

use folio_core::Category;
use std::collections::BTreeSet;

/// Declarative keyword table, one row per category.
///
/// Technology names live under skills so a question like "experience with
/// Kubernetes" pulls both the roles and the skill list.
pub const KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::About,
        &["who", "about", "background", "yourself", "introduc", "bio", "summar"],
    ),
    (
        Category::Experience,
        &[
            "experienc", "work", "compan", "job", "career", "role", "position", "employ",
        ],
    ),
    (
        Category::Skills,
        &[
            "skill", "technolog", "tech", "know", "stack", "tool", "language", "proficien",
            "expert", "kubernetes", "k8s", "docker", "terraform", "ansible", "python", "rust",
            "golang", "aws", "cloud", "prometheus", "grafana", "linux",
        ],
    ),
    (
        Category::Projects,
        &["project", "built", "build", "github", "portfolio", "homelab"],
    ),
    (
        Category::Contact,
        &[
            "contact", "email", "mail", "reach", "hire", "hiring", "linkedin", "availab",
        ],
    ),
];

fn matches_keyword(token: &str, keyword: &str) -> bool {
    if keyword.len() < 4 {
        token == keyword || token.strip_suffix('s') == Some(keyword)
    } else {
        token.starts_with(keyword)
    }
}

/// Classify a question. Never empty: no match (or a blank question) yields
/// `{About}`. Iteration order is category priority.
pub fn classify(question: &str) -> BTreeSet<Category> {
    let lowered = question.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut categories: BTreeSet<Category> = KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            keywords
                .iter()
                .any(|kw| tokens.iter().any(|t| matches_keyword(t, kw)))
        })
        .map(|(category, _)| *category)
        .collect();

    if categories.is_empty() {
        categories.insert(Category::About);
    }
    categories
}
