//! Intermediate representation of formatted text

use std::collections::BTreeMap;

/// Overall layout the formatter settled on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Card-like text whose title names an identity document
    IdCard,
    /// Any other card-like text
    TabularData,
    /// Free-flowing text
    Text,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::IdCard => "id_card",
            Layout::TabularData => "tabular_data",
            Layout::Text => "text",
        }
    }
}

/// Marker in front of a list item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListMarker {
    /// `12. ` style marker, holding the digits
    Numbered(String),
    /// `- `, `* ` or `• `
    Bullet(char),
}

/// A block of regular text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Upper-case line ending in a colon, stored without the colon
    Header(String),
    ListItem { marker: ListMarker, body: String },
    KeyValue { key: String, value: String },
    Paragraph(String),
}

/// One non-empty line of card-like text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardRow {
    /// `N. key` or `N. key: value`
    Numbered {
        number: String,
        key: String,
        value: Option<String>,
    },
    KeyValue {
        key: String,
        value: String,
    },
    Text(String),
}

/// Card-like text broken into rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDocument {
    /// First line of the text
    pub title: String,
    /// `IdCard` or `TabularData`
    pub layout: Layout,
    pub rows: Vec<CardRow>,
}

impl CardDocument {
    /// Key/value pairs carried by the rows, last write wins
    ///
    /// A numbered row without a value is stored as `item_<N>`.
    pub fn structured(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for row in &self.rows {
            match row {
                CardRow::Numbered {
                    key,
                    value: Some(value),
                    ..
                } => {
                    map.insert(key.clone(), value.clone());
                }
                CardRow::Numbered {
                    number,
                    key,
                    value: None,
                } => {
                    map.insert(format!("item_{}", number), key.clone());
                }
                CardRow::KeyValue { key, value } => {
                    map.insert(key.clone(), value.clone());
                }
                CardRow::Text(_) => {}
            }
        }
        map
    }
}

/// Key/value pairs found in regular text blocks, last write wins
pub fn structured_from_blocks(blocks: &[Block]) -> BTreeMap<String, String> {
    blocks
        .iter()
        .filter_map(|block| match block {
            Block::KeyValue { key, value } => Some((key.clone(), value.clone())),
            _ => None,
        })
        .collect()
}
