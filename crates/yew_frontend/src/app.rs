//! Main application component

use crate::api::{self, ExtractResponse, JSON_FILE_NAME};
use crate::components::result::ResultPanel;
use crate::components::upload::UploadForm;
use gloo::file::{Blob, ObjectUrl};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{File, HtmlAnchorElement};
use yew::prelude::*;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    /// Notice for a failed extraction; out-of-memory errors point at Clear Memory
    pub fn extraction_failed(error: &str) -> Self {
        if api::is_out_of_memory(error) {
            Self::error(
                "Out of memory. Try clicking \"Clear Memory\" and retry with a smaller image.",
            )
        } else {
            Self::error("Failed to extract text")
        }
    }

    fn class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Info => "notification info",
            NoticeKind::Success => "notification success",
            NoticeKind::Error => "notification error",
        }
    }
}

fn save_json(contents: &str) -> Result<(), String> {
    let blob = Blob::new_with_options(contents, Some("application/json"));
    let url = ObjectUrl::from(blob);

    let document = gloo::utils::document();
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .ok()
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| "Could not create download link".to_string())?;
    anchor.set_href(&url);
    anchor.set_download(JSON_FILE_NAME);
    anchor.click();

    // Revoke the URL only after the browser has picked up the download
    Timeout::new(0, move || drop(url)).forget();
    Ok(())
}

#[function_component(App)]
pub fn app() -> Html {
    let result = use_state(|| None::<ExtractResponse>);
    let error = use_state(|| None::<String>);
    let notice = use_state(|| None::<Notice>);
    let busy = use_state(|| false);
    let clearing = use_state(|| false);

    let on_submit = {
        let result = result.clone();
        let error = error.clone();
        let notice = notice.clone();
        let busy = busy.clone();
        Callback::from(move |(file, prompt): (File, String)| {
            let result = result.clone();
            let error = error.clone();
            let notice = notice.clone();
            let busy = busy.clone();
            busy.set(true);
            error.set(None);
            notice.set(None);
            spawn_local(async move {
                match api::extract(&file, &prompt).await {
                    Ok(response) => {
                        result.set(Some(response));
                        notice.set(Some(Notice::success("Text extracted")));
                    }
                    Err(e) => {
                        result.set(None);
                        notice.set(Some(Notice::extraction_failed(&e)));
                        error.set(Some(e));
                    }
                }
                busy.set(false);
            });
        })
    };

    let on_notice = {
        let notice = notice.clone();
        Callback::from(move |message: String| notice.set(Some(Notice::error(message))))
    };

    let on_download = {
        let result = result.clone();
        let notice = notice.clone();
        Callback::from(move |_: ()| {
            let request_id = (*result).as_ref().map(|r| r.request_id.clone());
            let notice = notice.clone();
            spawn_local(async move {
                let saved = api::fetch_record(request_id.as_deref())
                    .await
                    .and_then(|json| save_json(&json));
                notice.set(Some(match saved {
                    Ok(()) => Notice::success("JSON file downloaded"),
                    Err(e) => Notice::error(format!("Error downloading JSON: {}", e)),
                }));
            });
        })
    };

    let on_clear = {
        let notice = notice.clone();
        let clearing = clearing.clone();
        Callback::from(move |_: MouseEvent| {
            let notice = notice.clone();
            let clearing = clearing.clone();
            clearing.set(true);
            notice.set(Some(Notice::info("Clearing model memory...")));
            spawn_local(async move {
                notice.set(Some(match api::clear_cache().await {
                    Ok(()) => Notice::success("Model memory cleared"),
                    Err(e) => Notice::error(format!("Error clearing memory: {}", e)),
                }));
                clearing.set(false);
            });
        })
    };

    html! {
        <div class="app">
            <header class="app-header">
                <h1>{ "docscan" }</h1>
                <p>{ "Extract text from document images" }</p>
                <button class="clear-cache-btn" onclick={on_clear} disabled={*clearing}>
                    { if *clearing { "Clearing..." } else { "Clear Memory" } }
                </button>
            </header>

            if let Some(n) = (*notice).as_ref() {
                <div class={n.class()}>{ n.message.clone() }</div>
            }

            <main class="app-main">
                <UploadForm on_submit={on_submit} on_notice={on_notice} busy={*busy} />

                if *busy {
                    <div class="loading">{ "Reading the document, this can take a while..." }</div>
                }

                if let Some(message) = (*error).as_ref() {
                    <div class="error-message">{ format!("Error: {}", message) }</div>
                }

                if let Some(response) = (*result).as_ref() {
                    <ResultPanel
                        html={AttrValue::from(response.result.clone())}
                        on_download={on_download}
                    />
                }
            </main>
        </div>
    }
}
