//! Extraction result panel

use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent};
use yew::prelude::*;

/// Id of the download button inside the rendered result
pub const DOWNLOAD_BUTTON_ID: &str = "download-json";

#[derive(Properties, PartialEq)]
pub struct ResultProps {
    /// Server-rendered HTML of the extracted text
    pub html: AttrValue,
    /// Fired when the download button inside the result is clicked
    pub on_download: Callback<()>,
}

#[function_component(ResultPanel)]
pub fn result_panel(props: &ResultProps) -> Html {
    // The download button is part of the server HTML, so clicks are caught here
    let onclick = {
        let on_download = props.on_download.clone();
        Callback::from(move |e: MouseEvent| {
            let hit = e
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("#{}", DOWNLOAD_BUTTON_ID)).ok().flatten());
            if hit.is_some() {
                e.prevent_default();
                on_download.emit(());
            }
        })
    };

    html! {
        <section class="result-card" {onclick}>
            <h2>{ "Extracted Text" }</h2>
            <div class="result-container">
                { Html::from_html_unchecked(props.html.clone()) }
            </div>
        </section>
    }
}
