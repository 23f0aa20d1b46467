//! HTML rendering of the formatter IR
//!
//! All text coming from the model is escaped. Value spans carry
//! `dir="auto"` so right-to-left values render in their own direction
//! without reordering the surrounding punctuation.

use super::ir::{Block, CardDocument, CardRow, Layout, ListMarker};

const HEADER_BAR: &str = concat!(
    r#"<div class="card-header-blue"><h3>Extracted Text</h3>"#,
    r#"<button id="download-json" class="btn-icon-white" title="Download JSON">"#,
    r#"<i class="fas fa-download"></i></button></div>"#,
);

const ID_CARD_STYLE: &str = "<style>\
.id-card-row{margin-bottom:10px;padding:5px;border-bottom:1px solid rgba(0,0,0,0.05);}\
.id-card-row:last-child{border-bottom:none;}\
.value{font-weight:500;}\
[dir=\"auto\"]{unicode-bidi:isolate;}\
</style>";

/// Escape text for use in element content and quoted attributes
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(body: &str) -> String {
    format!(
        r#"<div class="card-document">{}<div class="card-body-light">{}</div></div>"#,
        HEADER_BAR, body
    )
}

fn value_span(value: &str) -> String {
    format!(r#"<span class="value" dir="auto">{}</span>"#, escape_html(value))
}

fn render_row(row: &CardRow) -> String {
    match row {
        CardRow::Numbered { number, key, value } => {
            let number = format!(r#"<span class="number">{}.</span>"#, escape_html(number));
            match value {
                Some(value) => format!(
                    r#"<div class="id-card-row">{} <span class="key">{}:</span> {}</div>"#,
                    number,
                    escape_html(key),
                    value_span(value)
                ),
                None => format!(
                    r#"<div class="id-card-row">{} <span class="text" dir="auto">{}</span></div>"#,
                    number,
                    escape_html(key)
                ),
            }
        }
        CardRow::KeyValue { key, value } => format!(
            r#"<div class="id-card-row"><span class="key">{}:</span> {}</div>"#,
            escape_html(key),
            value_span(value)
        ),
        CardRow::Text(text) => format!(
            r#"<div class="id-card-row"><span class="text" dir="auto">{}</span></div>"#,
            escape_html(text)
        ),
    }
}

/// Render card-like text as rows inside the shared container
pub fn render_card(doc: &CardDocument) -> String {
    let rows: String = doc.rows.iter().map(render_row).collect();
    let style = if doc.layout == Layout::IdCard {
        ID_CARD_STYLE
    } else {
        ""
    };

    let body = format!(
        concat!(
            r#"<p>Here is the extracted text from the image:</p>"#,
            r#"<div class="inner-card" data-document-type="{}" data-title="{}">"#,
            r#"<div class="card-content">{}</div>{}</div>"#,
        ),
        doc.layout.as_str(),
        escape_html(&doc.title),
        rows,
        style
    );
    document(&body)
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Header(title) => {
            format!(r#"<h3 class="section-title">{}:</h3>"#, escape_html(title))
        }
        Block::ListItem {
            marker: ListMarker::Numbered(number),
            body,
        } => format!(
            r#"<div class="list-item"><span class="list-number">{}. </span>{}</div>"#,
            escape_html(number),
            escape_html(body)
        ),
        Block::ListItem {
            marker: ListMarker::Bullet(bullet),
            body,
        } => format!(
            r#"<div class="list-item"><span class="list-bullet">{} </span>{}</div>"#,
            escape_html(&bullet.to_string()),
            escape_html(body)
        ),
        Block::KeyValue { key, value } => format!(
            r#"<div class="key-value"><span class="key">{}:</span>{}</div>"#,
            escape_html(key),
            value_span(value)
        ),
        Block::Paragraph(text) => format!("<p>{}</p>", escape_html(text)),
    }
}

/// Render regular text blocks inside the shared container
pub fn render_blocks(blocks: &[Block]) -> String {
    let content = blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n");
    document(&format!(r#"<div class="extracted-content">{}</div>"#, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("محمد"), "محمد");
    }

    #[test]
    fn test_render_empty_blocks_keeps_container() {
        let html = render_blocks(&[]);
        assert!(html.starts_with(r#"<div class="card-document">"#));
        assert!(html.contains(r#"id="download-json""#));
        assert!(html.contains(r#"<div class="extracted-content"></div>"#));
    }

    #[test]
    fn test_render_key_value_block() {
        let html = render_blocks(&[Block::KeyValue {
            key: "Name".to_string(),
            value: "علي (Ali)".to_string(),
        }]);
        assert!(html.contains(
            r#"<div class="key-value"><span class="key">Name:</span><span class="value" dir="auto">علي (Ali)</span></div>"#
        ));
    }

    #[test]
    fn test_render_list_markers() {
        let html = render_blocks(&[
            Block::ListItem {
                marker: ListMarker::Numbered("1".to_string()),
                body: "first".to_string(),
            },
            Block::ListItem {
                marker: ListMarker::Bullet('•'),
                body: "second".to_string(),
            },
        ]);
        assert!(html.contains(r#"<span class="list-number">1. </span>first"#));
        assert!(html.contains(r#"<span class="list-bullet">• </span>second"#));
    }

    #[test]
    fn test_render_card_rows_and_style() {
        let doc = CardDocument {
            title: "National ID".to_string(),
            layout: Layout::IdCard,
            rows: vec![
                CardRow::Numbered {
                    number: "1".to_string(),
                    key: "Name".to_string(),
                    value: Some("<script>".to_string()),
                },
                CardRow::Text("plain".to_string()),
            ],
        };
        let html = render_card(&doc);
        assert!(html.contains(r#"<span class="number">1.</span> <span class="key">Name:</span> <span class="value" dir="auto">&lt;script&gt;</span>"#));
        assert!(html.contains(r#"data-document-type="id_card""#));
        assert!(html.contains("<style>"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_tabular_card_has_no_style() {
        let doc = CardDocument {
            title: "Scores".to_string(),
            layout: Layout::TabularData,
            rows: Vec::new(),
        };
        assert!(!render_card(&doc).contains("<style>"));
    }
}
