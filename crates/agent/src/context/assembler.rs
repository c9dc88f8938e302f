//! Prompt assembly with a hard size budget.
//!
//! Layout:
//!
//! ```text
//! <persona preamble>
//!
//! ### About
//! ...
//!
//! ### Experience
//! ...
//!
//! User: <question>
//! Assistant:
//! ```
//!
//! # Budget enforcement (characters)
//!
//! | Step | Action |
//! |------|--------|
//! | 1 | Drop whole context blocks, lowest priority first (contact, projects, skills, experience, about) |
//! | 2 | Shorten the persona preamble |
//! | 3 | Cut the tail of the question (only when the question alone is over budget) |
//!
//! The question line is never removed, and the result never exceeds the
//! budget. Assembly is deterministic: identical inputs produce identical
//! prompts.

use crate::context::token;
use crate::retriever::ContextBlock;
use folio_core::Category;
use serde::{Deserialize, Serialize};

const SEPARATOR: &str = "\n\n";

/// Wraps the question; always present in the prompt.
const QUESTION_FRAME: &str = "User: \nAssistant:";

// ── Types ─────────────────────────────────────────────────────────────────

/// The prompt sent to the model, plus how it was built.
#[derive(Debug, Clone)]
pub struct AssembledPrompt {
    pub prompt: String,
    /// Categories whose blocks made it into the prompt, in priority order.
    pub included: Vec<Category>,
    pub metadata: AssemblyMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyMetadata {
    /// Characters in the final prompt.
    pub total_chars: usize,
    /// Rough token count (≈4 chars per token).
    pub estimated_tokens: usize,
    /// Configured character budget.
    pub budget: usize,
    /// Budget utilization percentage (0.0–100.0).
    pub utilization_pct: f32,
    pub sections: Vec<SectionStats>,
    pub drops: Vec<DropInfo>,
    pub preamble_truncated: bool,
    pub question_truncated: bool,
}

/// One context section that made it into the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionStats {
    pub category: Category,
    pub chars: usize,
    pub items: usize,
}

/// A context block removed to fit the budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropInfo {
    pub category: Category,
    pub chars_dropped: usize,
    pub items_dropped: usize,
}

// ── Assembler ─────────────────────────────────────────────────────────────

/// Stateless: create one and reuse it.
pub struct PromptAssembler {
    persona: String,
    max_chars: usize,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// The first `n` characters of `s`.
fn truncate_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn render_section(block: &ContextBlock) -> String {
    format!("### {}\n{}", block.category.title(), block.text)
}

impl PromptAssembler {
    /// `max_chars` is raised to the length of the empty question frame if
    /// smaller, so every prompt fits its budget.
    pub fn new(persona: impl Into<String>, max_chars: usize) -> Self {
        Self {
            persona: persona.into(),
            max_chars: max_chars.max(char_len(QUESTION_FRAME)),
        }
    }

    /// The default persona for a profile owner.
    pub fn default_persona(profile_name: &str) -> String {
        format!(
            "You are {profile_name}'s portfolio assistant. Answer questions about \
             {profile_name}'s professional background using only the facts below. \
             If the facts do not cover the question, say so briefly and suggest \
             getting in touch."
        )
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Build the prompt for `question` from `blocks`.
    ///
    /// Blocks may arrive in any order; they are emitted in category priority
    /// order.
    pub fn assemble(&self, question: &str, blocks: &[ContextBlock]) -> AssembledPrompt {
        let mut kept: Vec<&ContextBlock> = blocks.iter().collect();
        kept.sort_by_key(|b| b.category);

        let mut sections: Vec<String> = kept.iter().map(|b| render_section(b)).collect();
        let mut question_part = format!("User: {question}\nAssistant:");
        let mut preamble = self.persona.trim().to_string();
        let mut drops = Vec::new();

        // Step 1: drop blocks from the bottom of the priority list.
        while Self::measure(&preamble, &sections, &question_part) > self.max_chars {
            let (Some(block), Some(section)) = (kept.pop(), sections.pop()) else {
                break;
            };
            drops.push(DropInfo {
                category: block.category,
                chars_dropped: char_len(&section),
                items_dropped: block.items,
            });
        }

        // Step 2: shorten the preamble to whatever the question leaves.
        let mut preamble_truncated = false;
        if Self::measure(&preamble, &sections, &question_part) > self.max_chars {
            let room = self
                .max_chars
                .saturating_sub(char_len(&question_part) + char_len(SEPARATOR));
            preamble = truncate_chars(&preamble, room).trim_end().to_string();
            preamble_truncated = true;
        }

        // Step 3: the question alone is too long; keep its head.
        let mut question_truncated = false;
        if Self::measure(&preamble, &sections, &question_part) > self.max_chars {
            preamble.clear();
            let frame = char_len(QUESTION_FRAME);
            let room = self.max_chars.saturating_sub(frame);
            question_part = format!("User: {}\nAssistant:", truncate_chars(question, room));
            question_truncated = true;
        }

        let mut parts: Vec<&str> = Vec::with_capacity(sections.len() + 2);
        if !preamble.is_empty() {
            parts.push(&preamble);
        }
        parts.extend(sections.iter().map(String::as_str));
        parts.push(&question_part);
        let prompt = parts.join(SEPARATOR);

        let total_chars = char_len(&prompt);
        let section_stats = kept
            .iter()
            .zip(&sections)
            .map(|(b, s)| SectionStats {
                category: b.category,
                chars: char_len(s),
                items: b.items,
            })
            .collect();

        AssembledPrompt {
            included: kept.iter().map(|b| b.category).collect(),
            metadata: AssemblyMetadata {
                total_chars,
                estimated_tokens: token::estimate_tokens_for_chars(total_chars),
                budget: self.max_chars,
                utilization_pct: if self.max_chars == 0 {
                    100.0
                } else {
                    total_chars as f32 / self.max_chars as f32 * 100.0
                },
                sections: section_stats,
                drops,
                preamble_truncated,
                question_truncated,
            },
            prompt,
        }
    }

    /// Character length of the prompt these parts would join into.
    fn measure(preamble: &str, sections: &[String], question_part: &str) -> usize {
        let mut count = 0usize;
        let mut total = 0;
        for part in std::iter::once(preamble)
            .filter(|p| !p.is_empty())
            .chain(sections.iter().map(String::as_str))
            .chain(std::iter::once(question_part))
        {
            total += char_len(part);
            count += 1;
        }
        total + count.saturating_sub(1) * char_len(SEPARATOR)
    }
}
