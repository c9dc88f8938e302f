//! Canned answers served when the model backend cannot answer.
//!
//! One response per category. Built-ins can be replaced from
//! `[fallback.responses]`; blank replacements are ignored so every category
//! always has non-empty text.

use folio_core::Category;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

pub struct FallbackResponder {
    responses: BTreeMap<Category, String>,
}

/// A selected canned answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fallback<'a> {
    pub category: Category,
    pub text: &'a str,
}

fn builtin(category: Category, name: &str) -> String {
    match category {
        Category::About => format!(
            "{name} is a Site Reliability Engineer focused on reliable, well-observed \
             infrastructure. The assistant is running in limited mode right now, so \
             please try again shortly for a detailed answer."
        ),
        Category::Experience => format!(
            "{name} has several years of hands-on experience running production systems \
             in SRE and DevOps roles. A detailed answer is unavailable right now; please \
             try again shortly."
        ),
        Category::Skills => format!(
            "{name} works across cloud infrastructure, Kubernetes, infrastructure as code, \
             observability and automation. A detailed answer is unavailable right now; \
             please try again shortly."
        ),
        Category::Projects => format!(
            "{name} maintains infrastructure and open-source projects, including a homelab \
             platform. A detailed answer is unavailable right now; please try again shortly."
        ),
        Category::Contact => format!(
            "You can reach {name} through the contact details on this site. The assistant \
             is running in limited mode right now."
        ),
    }
}

impl FallbackResponder {
    /// Built-in responses mentioning `profile_name`.
    pub fn new(profile_name: &str) -> Self {
        Self {
            responses: Category::ALL
                .into_iter()
                .map(|c| (c, builtin(c, profile_name)))
                .collect(),
        }
    }

    /// Replace built-ins by category name. Unknown names are logged and skipped.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, String>) -> Self {
        for (name, text) in overrides {
            let text = text.trim();
            if text.is_empty() {
                warn!(category = %name, "Ignoring blank fallback override");
                continue;
            }
            match name.parse::<Category>() {
                Ok(category) => {
                    self.responses.insert(category, text.to_string());
                }
                Err(e) => warn!(error = %e, "Ignoring fallback override"),
            }
        }
        self
    }

    /// The answer for the highest-priority category in `categories`
    /// (`About` when the set is empty).
    pub fn respond(&self, categories: &BTreeSet<Category>) -> Fallback<'_> {
        let category = categories.first().copied().unwrap_or(Category::About);
        let text = self
            .responses
            .get(&category)
            .map(String::as_str)
            .unwrap_or("This assistant is temporarily unavailable. Please try again shortly.");
        Fallback { category, text }
    }
}
