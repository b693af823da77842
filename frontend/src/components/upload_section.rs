use super::utils::{debounce, extract_image_files};
use crate::pages::upload::{Msg, UploadPage};
use shared::validation::ALLOWED_TYPES;
use wasm_bindgen::JsCast;
use web_sys::{DragEvent, HtmlInputElement};
use yew::prelude::*;

pub fn render_upload_section(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    if page.camera.is_active() {
        return html! {};
    }
    html! {
        <div class="upload-section">
            { render_file_input_area(page, ctx) }
        </div>
    }
}

fn render_file_input_area(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    let link = ctx.link();
    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let files = input.files();
        let files_to_process = files.as_ref().map(extract_image_files).unwrap_or_default();

        input.set_value("");

        if !files_to_process.is_empty() {
            Msg::FilesAdded(files_to_process)
        } else {
            Msg::SetError(Some("No valid image files selected.".into()))
        }
    });

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);
    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept={ALLOWED_TYPES.join(",")}
                style="display: none;"
                onchange={handle_change}
            />

            <div class="button-container">
                <button
                    id="upload-button"
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let trigger_file_input = trigger_file_input.clone();
                        move || trigger_file_input.emit(())
                    })}
                >
                    <i class="fa-solid fa-upload"></i> {" Select Image"}
                </button>
                <button
                    id="camera-button"
                    class="analyze-btn secondary"
                    disabled={page.camera.is_opening()}
                    onclick={link.callback(|_| Msg::OpenCamera)}
                >
                    <i class="fa-solid fa-camera"></i> {" Use Camera"}
                </button>
            </div>

            <div
                id="drop-zone"
                class={classes!("upload-area", page.is_dragging.then_some("drag-over"))}
                ondragover={handle_drag_over}
                ondragleave={handle_drag_leave}
                ondrop={handle_drop}
                onclick={debounce(300, {
                    let trigger_file_input = trigger_file_input.clone();
                    move || trigger_file_input.emit(())
                })}
            >
                <div class="upload-placeholder">
                    <i class="fa-solid fa-cloud-arrow-up"></i>
                    <p>{"Drag & drop an image here, paste, or click"}</p>
                    <p class="file-types">{"Supported formats: JPG, PNG (max 10MB)"}</p>
                </div>
            </div>
        </>
    }
}
