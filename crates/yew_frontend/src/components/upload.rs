//! Image upload form with preview and optional prompt

use gloo::file::ObjectUrl;
use std::rc::Rc;
use web_sys::{DragEvent, Event, File, HtmlInputElement, HtmlTextAreaElement, InputEvent};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UploadProps {
    /// Called with the chosen image and the prompt text
    pub on_submit: Callback<(File, String)>,
    /// Called when the form has something to tell the user
    pub on_notice: Callback<String>,
    #[prop_or_default]
    pub busy: bool,
}

fn is_image(file: &File) -> bool {
    file.type_().starts_with("image/")
}

#[function_component(UploadForm)]
pub fn upload_form(props: &UploadProps) -> Html {
    let file = use_state(|| None::<File>);
    let preview = use_state(|| None::<Rc<ObjectUrl>>);
    let prompt = use_state(String::new);
    let dragging = use_state(|| false);

    let select = {
        let file = file.clone();
        let preview = preview.clone();
        let on_notice = props.on_notice.clone();
        Rc::new(move |chosen: File| {
            if !is_image(&chosen) {
                file.set(None);
                preview.set(None);
                on_notice.emit("Please select an image file".to_string());
                return;
            }
            let url = ObjectUrl::from(gloo::file::File::from(chosen.clone()));
            preview.set(Some(Rc::new(url)));
            file.set(Some(chosen));
        })
    };

    let on_file_change = {
        let select = select.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            if let Some(chosen) = input.files().and_then(|list| list.get(0)) {
                select(chosen);
            }
        })
    };

    let on_drag_over = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(true);
        })
    };

    let on_drag_leave = {
        let dragging = dragging.clone();
        Callback::from(move |_: DragEvent| dragging.set(false))
    };

    let on_drop = {
        let dragging = dragging.clone();
        Callback::from(move |e: DragEvent| {
            e.prevent_default();
            dragging.set(false);
            let dropped = e
                .data_transfer()
                .and_then(|transfer| transfer.files())
                .and_then(|list| list.get(0));
            if let Some(chosen) = dropped {
                select(chosen);
            }
        })
    };

    let on_prompt_input = {
        let prompt = prompt.clone();
        Callback::from(move |e: InputEvent| {
            let area: HtmlTextAreaElement = e.target_unchecked_into();
            prompt.set(area.value());
        })
    };

    let on_submit = {
        let file = file.clone();
        let prompt = prompt.clone();
        let submit = props.on_submit.clone();
        let on_notice = props.on_notice.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match (*file).clone() {
                Some(chosen) => submit.emit((chosen, (*prompt).clone())),
                None => on_notice.emit("Please select an image first".to_string()),
            }
        })
    };

    let zone_class = classes!("drop-zone", dragging.then_some("active"));
    let preview_src = (*preview).as_ref().map(|url| String::from(&***url));

    html! {
        <form class="upload-form" onsubmit={on_submit}>
            <label
                class={zone_class}
                ondragover={on_drag_over.clone()}
                ondragenter={on_drag_over}
                ondragleave={on_drag_leave}
                ondrop={on_drop}
            >
                <span class="drop-zone__prompt">{ "Drop an image here or click to choose one" }</span>
                <input
                    class="drop-zone__input"
                    type="file"
                    name="image"
                    accept="image/*"
                    onchange={on_file_change}
                />
            </label>

            if let Some(src) = preview_src {
                <div class="preview">
                    <img {src} alt="Selected image" />
                    if let Some(chosen) = (*file).as_ref() {
                        <p class="preview__name">{ chosen.name() }</p>
                    }
                </div>
            }

            <label class="prompt-label" for="prompt">
                { "Prompt (optional, leave empty to detect the document type)" }
            </label>
            <textarea
                id="prompt"
                name="prompt"
                rows="3"
                value={(*prompt).clone()}
                oninput={on_prompt_input}
            />

            <button type="submit" class="extract-btn" disabled={props.busy}>
                { if props.busy { "Processing..." } else { "Extract Text" } }
            </button>
        </form>
    }
}

