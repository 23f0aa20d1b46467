//! Extraction prompts
//!
//! One hand-written instruction per [`DocumentCategory`], plus the
//! meta-question used to classify a document and the prompt used when
//! classification could not run at all.

use crate::types::DocumentCategory;

/// Output cap for the classification question
pub const CLASSIFY_MAX_TOKENS: u32 = 50;

/// Output cap for the extraction call
pub const EXTRACT_MAX_TOKENS: u32 = 512;

/// Question asked before extraction when the user gave no prompt
pub const CLASSIFY_PROMPT: &str = "What type of document is this? If it's an ID card, \
specify if it's the front or back side. Just answer with: ID FRONT, ID BACK, or specify \
another document type.";

/// Used when the classification call itself failed
pub const FALLBACK_PROMPT: &str =
    "Extract all text visible in this image. Preserve the structure and formatting of the content.";

const ID_FRONT_PROMPT: &str = "Extract all text from the front of this ID card systematically. \
Format as follows:
1. Name (in Arabic and English if available)
2. ID Number
3. Gender
4. Date of Birth
5. Place of Birth
6. Mother's Name

Present each field in both Arabic and English if available. Format as a clean numbered list \
with clear labels. If any field is not visible or unclear, mark it as [Not Found].";

const ID_BACK_PROMPT: &str = "Extract all text from the back of this ID card systematically. \
Format as follows:
1. مكان ورقم القيد (Civil Registry Number and Place)
2. الصلاحية (Expiry Date)
3. مكان الاصدار (Place of Issue)
4. مكان الاقامة (Place of Residence)
5. فصيلة الدم (Blood Type)
6. ID Number
7. Additional Information

Present each field in both Arabic and English if available. Format as a clean numbered list \
with clear labels. If any field is not visible or unclear, mark it as [Not Found].";

const RECEIPT_PROMPT: &str = "Extract all text from this receipt. Include store name, date, \
all items with prices, subtotal, tax, and total. Format as a clean list with prices aligned.";

const BUSINESS_CARD_PROMPT: &str = "Extract all information from this business card \
including: name, title, company, address, phone number, email, and website. Format as \
key-value pairs.";

const FORM_PROMPT: &str = "Extract all fields and their values from this form. Present as \
key-value pairs and preserve the form structure. Include all text, labels, and values.";

const TABLE_PROMPT: &str = "Extract this table data preserving its structure. Maintain column \
alignment and present values in their respective rows and columns. Preserve headers and cell \
values.";

const HANDWRITTEN_PROMPT: &str = "Carefully transcribe all handwritten text from this image. \
Preserve paragraph breaks and formatting. If any text is unclear, indicate with [unclear].";

const GENERIC_PROMPT: &str = "Extract all text visible in this image. Preserve the original \
structure and formatting. For any tables, maintain alignment. For forms or cards, present as \
key-value pairs. Number items if they appear in a list.";

/// Select the extraction prompt for a category
pub fn prompt_for(category: DocumentCategory) -> &'static str {
    match category {
        DocumentCategory::IdFront => ID_FRONT_PROMPT,
        DocumentCategory::IdBack => ID_BACK_PROMPT,
        DocumentCategory::ReceiptOrInvoice => RECEIPT_PROMPT,
        DocumentCategory::BusinessCard => BUSINESS_CARD_PROMPT,
        DocumentCategory::Form => FORM_PROMPT,
        DocumentCategory::Table => TABLE_PROMPT,
        DocumentCategory::Handwritten => HANDWRITTEN_PROMPT,
        DocumentCategory::Unknown => GENERIC_PROMPT,
    }
}
