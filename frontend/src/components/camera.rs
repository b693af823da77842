use crate::pages::upload::{Msg, UploadPage};
use shared::camera::MediaTracks;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlVideoElement, MediaStream,
    MediaStreamConstraints, MediaStreamTrack,
};
use yew::prelude::*;

/// Browser camera stream, owned by a `CameraSession`.
#[derive(Debug)]
pub struct BrowserStream(pub MediaStream);

impl MediaTracks for BrowserStream {
    fn stop_tracks(&self) {
        for track in self.0.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

pub async fn open_camera() -> Result<MediaStream, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let devices = window.navigator().media_devices()?;

    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&JsValue::TRUE);
    constraints.set_audio(&JsValue::FALSE);

    let stream = JsFuture::from(devices.get_user_media_with_constraints(&constraints)?).await?;
    stream.dyn_into::<MediaStream>()
}

/// Draws the current video frame onto a canvas and encodes it as JPEG.
pub fn capture_frame(video: &HtmlVideoElement) -> Result<String, JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    canvas.set_width(video.video_width());
    canvas.set_height(video.video_height());

    let context: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d canvas context unavailable"))?
        .dyn_into()?;
    context.draw_image_with_html_video_element(video, 0.0, 0.0)?;

    canvas.to_data_url_with_type_and_encoder_options("image/jpeg", &JsValue::from_f64(0.92))
}

pub fn render_camera(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    let link = ctx.link();

    if page.camera.is_opening() {
        return html! {
            <div class="camera-panel">
                <i class="fa-solid fa-spinner fa-spin"></i>
                <p>{"Waiting for camera permission..."}</p>
                <button class="analyze-btn secondary" onclick={link.callback(|_| Msg::CloseCamera)}>
                    <i class="fa-solid fa-xmark"></i>{" Cancel"}
                </button>
            </div>
        };
    }

    if !page.camera.is_active() {
        return html! {};
    }

    html! {
        <div class="camera-panel">
            <video ref={page.video_ref.clone()} class="camera-video" autoplay=true playsinline=true muted=true />
            <div class="button-container">
                <button class="analyze-btn" onclick={link.callback(|_| Msg::Capture)}>
                    <i class="fa-solid fa-camera"></i>{" Capture"}
                </button>
                <button class="analyze-btn secondary" onclick={link.callback(|_| Msg::CloseCamera)}>
                    <i class="fa-solid fa-xmark"></i>{" Cancel"}
                </button>
            </div>
        </div>
    }
}
