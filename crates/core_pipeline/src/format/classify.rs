//! Line and block classifiers: raw text to [`CardDocument`] or [`Block`]s

use super::ir::{Block, CardDocument, CardRow, Layout, ListMarker};
use once_cell::sync::Lazy;
use regex::Regex;

static CARD_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+\.\s.*?:|\bID\b|\bCard\b|\bPassport\b)").unwrap());

static ID_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(ID|Identity|Card|National|Passport|citizenship)").unwrap());

static CARD_NUMBERED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.*?)(?::\s*(.*))?$").unwrap());

static CARD_KEY_VALUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?):\s*(.*)$").unwrap());

static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([A-Z][A-Z ]+):$").unwrap());

static NUMBERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.\s+(.*)$").unwrap());

static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([-•*])\s+(.*)$").unwrap());

static KEY_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\p{L}[\p{L}\p{N} '’()/-]{0,40}?)\s*:\s*(.*)$").unwrap());

/// Whether text looks like structured fields (ID cards, numbered forms)
///
/// True when a numbered item carries a label (`1. Name:`) or the text
/// mentions ID, Card or Passport as a word.
pub fn is_card_like(text: &str) -> bool {
    CARD_LIKE.is_match(text)
}

/// Split card-like text into rows
pub fn classify_card(text: &str) -> CardDocument {
    let title = text.lines().next().unwrap_or_default().trim().to_string();
    let layout = if ID_TITLE.is_match(&title) {
        Layout::IdCard
    } else {
        Layout::TabularData
    };

    let rows = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify_card_line)
        .collect();

    CardDocument {
        title,
        layout,
        rows,
    }
}

fn classify_card_line(line: &str) -> CardRow {
    if let Some(caps) = CARD_NUMBERED.captures(line) {
        let number = caps[1].to_string();
        let key = caps[2].trim_end().to_string();
        let value = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .filter(|v| !v.is_empty());
        return CardRow::Numbered { number, key, value };
    }

    if let Some(caps) = CARD_KEY_VALUE.captures(line) {
        let key = caps[1].trim();
        if !key.is_empty() {
            return CardRow::KeyValue {
                key: key.to_string(),
                value: caps[2].to_string(),
            };
        }
    }

    CardRow::Text(line.to_string())
}

/// Block currently collecting continuation lines
enum Open {
    Numbered { number: String, body: Vec<String> },
    Bullet { bullet: char, body: Vec<String> },
    KeyValue { key: String, value: Vec<String> },
    Paragraph(Vec<String>),
}

impl Open {
    fn close(self) -> Block {
        let join = |lines: Vec<String>| lines.join("\n").trim().to_string();
        match self {
            Open::Numbered { number, body } => Block::ListItem {
                marker: ListMarker::Numbered(number),
                body: join(body),
            },
            Open::Bullet { bullet, body } => Block::ListItem {
                marker: ListMarker::Bullet(bullet),
                body: join(body),
            },
            Open::KeyValue { key, value } => Block::KeyValue {
                key,
                value: join(value),
            },
            Open::Paragraph(lines) => Block::Paragraph(join(lines)),
        }
    }
}

/// Split regular text into blocks
///
/// Classifiers are tried per line in order: header, numbered item, bullet
/// item, key/value, paragraph. A list item or key/value block keeps
/// absorbing the following lines until a blank line or a line that starts
/// a block of the same kind. Headers always stand alone.
pub fn classify_regular(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<Open> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() {
            if let Some(current) = open.take() {
                blocks.push(current.close());
            }
            continue;
        }

        if let Some(caps) = HEADER.captures(line) {
            if let Some(current) = open.take() {
                blocks.push(current.close());
            }
            blocks.push(Block::Header(caps[1].trim_end().to_string()));
            continue;
        }

        if let Some(caps) = NUMBERED.captures(line) {
            if let Some(current) = open.take() {
                blocks.push(current.close());
            }
            open = Some(Open::Numbered {
                number: caps[1].to_string(),
                body: vec![caps[2].to_string()],
            });
            continue;
        }

        if let Some(Open::Numbered { body, .. }) = open.as_mut() {
            body.push(line.to_string());
            continue;
        }

        if let Some(caps) = BULLET.captures(line) {
            if let Some(current) = open.take() {
                blocks.push(current.close());
            }
            open = Some(Open::Bullet {
                bullet: caps[1].chars().next().unwrap_or('-'),
                body: vec![caps[2].to_string()],
            });
            continue;
        }

        if let Some(Open::Bullet { body, .. }) = open.as_mut() {
            body.push(line.to_string());
            continue;
        }

        if let Some(caps) = KEY_VALUE.captures(line) {
            if let Some(current) = open.take() {
                blocks.push(current.close());
            }
            open = Some(Open::KeyValue {
                key: caps[1].trim_end().to_string(),
                value: vec![caps[2].to_string()],
            });
            continue;
        }

        match open.as_mut() {
            Some(Open::KeyValue { value, .. }) => value.push(line.to_string()),
            Some(Open::Paragraph(lines)) => lines.push(line.to_string()),
            _ => open = Some(Open::Paragraph(vec![line.to_string()])),
        }
    }

    if let Some(current) = open.take() {
        blocks.push(current.close());
    }

    blocks
}
