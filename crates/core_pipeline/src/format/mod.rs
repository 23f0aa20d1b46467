//! Text formatter
//!
//! Converts raw model output into an HTML view and a key/value map for
//! JSON export. Classification into the [`ir`] types and HTML rendering
//! are kept apart so each can be tested on its own.

pub mod classify;
pub mod ir;
pub mod render;

use std::collections::BTreeMap;

pub use classify::is_card_like;
pub use ir::{Block, CardDocument, CardRow, Layout, ListMarker};

/// Output of [`format_text`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedText {
    pub html: String,
    pub structured: BTreeMap<String, String>,
    pub is_card_like: bool,
    pub layout: Layout,
    /// First line of the text, for card-like text
    pub title: Option<String>,
}

/// Format raw model output
///
/// Leading and trailing whitespace is dropped first. Empty input yields
/// the container with an empty body.
pub fn format_text(raw: &str) -> FormattedText {
    let text = raw.trim();

    if classify::is_card_like(text) {
        let doc = classify::classify_card(text);
        FormattedText {
            html: render::render_card(&doc),
            structured: doc.structured(),
            is_card_like: true,
            layout: doc.layout,
            title: Some(doc.title),
        }
    } else {
        let blocks = classify::classify_regular(text);
        FormattedText {
            html: render::render_blocks(&blocks),
            structured: ir::structured_from_blocks(&blocks),
            is_card_like: false,
            layout: Layout::Text,
            title: None,
        }
    }
}
