//! Note card summaries for the notes grid.
//!
//! # Responsibility
//! - Derive a short plain-text excerpt from note content.
//! - Pick the check items shown on a card and count checked ones.
//!
//! # Invariants
//! - Excerpts never exceed [`EXCERPT_MAX_CHARS`] characters plus an ellipsis.
//! - Card items keep the order they were given in.

use crate::model::note::{CheckItem, Note};
use crate::model::EntityId;
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum excerpt length in characters, ellipsis excluded.
pub const EXCERPT_MAX_CHARS: usize = 160;
/// Number of check items previewed on a card.
pub const CARD_ITEM_LIMIT: usize = 3;

static MARKDOWN_SYMBOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\*_`#>~]+").expect("valid markdown symbol regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Card projection of one note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub note_id: EntityId,
    pub title: String,
    /// Plain-text excerpt, `None` when the content is blank.
    pub excerpt: Option<String>,
    /// First few check items of the note.
    pub items: Vec<CheckItem>,
    pub checked: usize,
    pub total: usize,
}

/// Collapses markup and whitespace and truncates to [`EXCERPT_MAX_CHARS`].
pub fn excerpt(content: &str) -> Option<String> {
    let without_symbols = MARKDOWN_SYMBOL_RE.replace_all(content, " ");
    let normalized = WHITESPACE_RE.replace_all(&without_symbols, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() <= EXCERPT_MAX_CHARS {
        return Some(trimmed.to_string());
    }
    let head: String = trimmed.chars().take(EXCERPT_MAX_CHARS).collect();
    Some(format!("{}...", head.trim_end()))
}

/// Builds the card for `note` from the note's own check items.
pub fn note_card(note: &Note, items: &[CheckItem]) -> NoteCard {
    let own: Vec<&CheckItem> = items.iter().filter(|item| item.note_id == note.id).collect();
    NoteCard {
        note_id: note.id,
        title: note.title.clone(),
        excerpt: excerpt(&note.content),
        items: own
            .iter()
            .take(CARD_ITEM_LIMIT)
            .map(|item| (*item).clone())
            .collect(),
        checked: own.iter().filter(|item| item.checked).count(),
        total: own.len(),
    }
}
