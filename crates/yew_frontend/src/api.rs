//! Calls to the docscan server

use gloo_net::http::{Request, Response};
use serde::Deserialize;
use web_sys::{File, FormData};

/// File name used when saving a result record
pub const JSON_FILE_NAME: &str = "extracted_text.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ExtractResponse {
    pub result: String,
    pub request_id: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

pub fn download_url(request_id: Option<&str>) -> String {
    match request_id {
        Some(id) if !id.is_empty() => format!("/download_json?id={}", id),
        _ => "/download_json".to_string(),
    }
}

/// Pull the message out of an `{"error": ...}` body, falling back to the status
pub fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("Request failed with status {}", status))
}

pub fn is_out_of_memory(message: &str) -> bool {
    message.to_lowercase().contains("out of memory")
}

/// Pretty-print a record for saving; unparseable text is saved as received
pub fn pretty_json(raw: &str) -> String {
    serde_json::from_str::<serde_json::Value>(raw)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| raw.to_string())
}

async fn read_error(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_message(status, &body)
}

pub async fn extract(file: &File, prompt: &str) -> Result<ExtractResponse, String> {
    let form = FormData::new().map_err(|_| "Could not build upload form".to_string())?;
    form.append_with_blob_and_filename("image", file, &file.name())
        .map_err(|_| "Could not attach image".to_string())?;
    form.append_with_str("prompt", prompt)
        .map_err(|_| "Could not attach prompt".to_string())?;

    let response = Request::post("/extract")
        .body(form)
        .map_err(|e| e.to_string())?
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        return Err(read_error(response).await);
    }
    response
        .json::<ExtractResponse>()
        .await
        .map_err(|e| e.to_string())
}

/// Fetch the stored JSON record, pretty-printed
pub async fn fetch_record(request_id: Option<&str>) -> Result<String, String> {
    let response = Request::get(&download_url(request_id))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !response.ok() {
        return Err(read_error(response).await);
    }
    let raw = response.text().await.map_err(|e| e.to_string())?;
    Ok(pretty_json(&raw))
}

pub async fn clear_cache() -> Result<(), String> {
    let response = Request::post("/clear_cache")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.ok() {
        Ok(())
    } else {
        Err(read_error(response).await)
    }
}
