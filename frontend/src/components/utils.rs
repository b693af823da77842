use gloo_file::{Blob, File as GlooFile, ObjectUrl};
use gloo_timers::callback::Timeout;
use js_sys::Date;
use shared::export::ExportFile;
use shared::FileMeta;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{FileList, HtmlAnchorElement};
use yew::prelude::*;

pub fn now_ms() -> u64 {
    Date::now() as u64
}

/// Local date and time, as stored on history entries.
pub fn local_timestamp() -> String {
    Date::new_0()
        .to_locale_string("en-US", &JsValue::UNDEFINED)
        .into()
}

// Debounce function to limit button events
pub fn debounce<F>(duration: u32, callback: F) -> Callback<MouseEvent>
where
    F: Fn() + Clone + 'static,
{
    let timeout = Rc::new(RefCell::new(None::<Timeout>));

    Callback::from(move |_| {
        let mut timeout_ref = timeout.borrow_mut();

        if let Some(old_timeout) = timeout_ref.take() {
            old_timeout.cancel();
        }

        let inner_callback = callback.clone();
        *timeout_ref = Some(Timeout::new(duration, move || {
            inner_callback();
        }));
    })
}

pub fn extract_image_files(file_list: &FileList) -> Vec<GlooFile> {
    (0..file_list.length())
        .filter_map(|i| file_list.item(i))
        .filter(|file| shared::validation::is_image_mime(&file.type_()))
        .map(GlooFile::from)
        .collect()
}

pub fn file_meta(file: &GlooFile) -> FileMeta {
    FileMeta::new(file.name(), file.raw_mime_type(), file.size())
}

pub fn render_error_message(error: Option<&str>) -> Html {
    if let Some(error_msg) = error {
        html! {
            <div class="error-message">
                <i class="fa-solid fa-circle-exclamation"></i>
                <p>{ error_msg }</p>
            </div>
        }
    } else {
        html! {}
    }
}

/// Hands `file` to the browser as a download through a temporary anchor.
pub fn trigger_download(file: &ExportFile) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document available"))?;

    let blob = Blob::new_with_options(file.contents.as_str(), Some(file.mime_type));
    let url = ObjectUrl::from(blob);

    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(&file.file_name);
    anchor.click();
    log::info!("Exported {}", file.file_name);

    // Revoking straight away can cancel the download in some browsers.
    Timeout::new(1_000, move || drop(url)).forget();
    Ok(())
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        if window.alert_with_message(message).is_err() {
            log::error!("Alert failed: {}", message);
        }
    }
}
