//! Core types for the docscan pipeline
//!
//! This module defines the document categories, the result of a single
//! extraction, and the JSON record handed out for download.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for one extraction request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractionId(pub Uuid);

impl ExtractionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ExtractionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExtractionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ExtractionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Coarse classification of an uploaded document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    /// Front side of an identity card
    IdFront,
    /// Back side of an identity card
    IdBack,
    /// Shop receipt or invoice
    ReceiptOrInvoice,
    /// Business card
    BusinessCard,
    /// Form with labelled fields
    Form,
    /// Table or spreadsheet
    Table,
    /// Handwritten page
    Handwritten,
    /// Nothing recognisable
    Unknown,
}

impl DocumentCategory {
    /// Every category, in the order answers are matched against them
    pub const ALL: [DocumentCategory; 8] = [
        DocumentCategory::IdFront,
        DocumentCategory::IdBack,
        DocumentCategory::ReceiptOrInvoice,
        DocumentCategory::BusinessCard,
        DocumentCategory::Form,
        DocumentCategory::Table,
        DocumentCategory::Handwritten,
        DocumentCategory::Unknown,
    ];

    /// Map a free-text model answer to a category.
    ///
    /// Matching is case-insensitive substring search. The checks run in a
    /// fixed priority order, so an answer mentioning both "id front" and
    /// "form" is an `IdFront`.
    pub fn from_answer(answer: &str) -> Self {
        let answer = answer.trim().to_lowercase();
        let has = |needle: &str| answer.contains(needle);

        if has("id front") {
            DocumentCategory::IdFront
        } else if has("id back") {
            DocumentCategory::IdBack
        } else if has("receipt") || has("invoice") {
            DocumentCategory::ReceiptOrInvoice
        } else if has("business") && has("card") {
            DocumentCategory::BusinessCard
        } else if has("form") {
            DocumentCategory::Form
        } else if has("table") || has("spreadsheet") {
            DocumentCategory::Table
        } else if has("handwritten") {
            DocumentCategory::Handwritten
        } else {
            DocumentCategory::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::IdFront => "id_front",
            DocumentCategory::IdBack => "id_back",
            DocumentCategory::ReceiptOrInvoice => "receipt_or_invoice",
            DocumentCategory::BusinessCard => "business_card",
            DocumentCategory::Form => "form",
            DocumentCategory::Table => "table",
            DocumentCategory::Handwritten => "handwritten",
            DocumentCategory::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DocumentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything produced by one successful extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedResult {
    /// Identifier the result is stored under
    pub id: ExtractionId,
    /// Trimmed model output
    pub raw_text: String,
    /// Rendered HTML view
    pub html: String,
    /// Key/value pairs recognised in the text
    pub structured_data: BTreeMap<String, String>,
    /// Layout label reported by the formatter (`id_card`, `tabular_data`, `text`)
    pub document_type: String,
    /// Prompt the model was given
    pub prompt_used: String,
    /// Category detected by the classifier, if classification ran
    pub category: Option<DocumentCategory>,
    /// SHA-256 of the prepared image pixels
    pub image_sha256: String,
}

/// JSON record served by `/download_json`
///
/// A failed generation leaves a record holding only the attempted prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_data: Option<BTreeMap<String, String>>,
    pub prompt_used: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_category: Option<DocumentCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_sha256: Option<String>,
}

impl ResultRecord {
    /// Record for an extraction whose generation step failed
    pub fn attempted(prompt_used: impl Into<String>) -> Self {
        Self {
            prompt_used: prompt_used.into(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        self.full_text.is_some()
    }
}

impl From<&ExtractedResult> for ResultRecord {
    fn from(result: &ExtractedResult) -> Self {
        Self {
            full_text: Some(result.raw_text.clone()),
            structured_data: Some(result.structured_data.clone()),
            prompt_used: result.prompt_used.clone(),
            document_type: Some(result.document_type.clone()),
            document_category: result.category,
            image_sha256: Some(result.image_sha256.clone()),
        }
    }
}
