use crate::api;
use crate::components::camera::{capture_frame, open_camera, BrowserStream};
use crate::components::utils::{alert, extract_image_files, file_meta, local_timestamp, now_ms, trigger_download};
use crate::pages::upload::{Msg, UploadPage};
use gloo_file::File as GlooFile;
use gloo_file::futures::read_as_data_url;
use shared::export::{export, ExportFormat};
use shared::media::{capture_file_name, decode_data_url};
use shared::workflow::WorkflowError;
use shared::{HistoryEntry, PredictionResult, Ticket};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList, HtmlVideoElement};
use yew::prelude::*;

/// Takes the first image of a selection as the new candidate.
pub fn handle_files_added(page: &mut UploadPage, ctx: &Context<UploadPage>, files: Vec<GlooFile>) -> bool {
    let Some(file) = files.into_iter().next() else {
        page.error = Some("No valid image files selected.".into());
        return true;
    };

    let meta = file_meta(&file);
    match page.workflow.select(file.clone(), meta) {
        Ok(ticket) => {
            page.camera.release();
            page.error = None;
            load_preview(ctx, ticket, file);
        }
        Err(WorkflowError::Validation(e)) => {
            log::warn!("Rejected {}: {}", file.name(), e);
        }
        Err(e) => page.error = Some(e.to_string()),
    }
    true
}

fn load_preview(ctx: &Context<UploadPage>, ticket: Ticket, file: GlooFile) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match read_as_data_url(&file).await {
            Ok(url) => link.send_message(Msg::PreviewReady(ticket, url)),
            Err(e) => {
                log::error!("Could not read {}: {}", file.name(), e);
                link.send_message(Msg::SetError(Some(format!("Could not read image: {}", e))));
            }
        }
    });
}

pub fn handle_analyze(page: &mut UploadPage, ctx: &Context<UploadPage>) -> bool {
    match page.workflow.begin_with_camera(&mut page.camera) {
        Ok(ticket) => {
            page.error = None;
            send_prediction_request(page, ctx, ticket);
            true
        }
        Err(e) => {
            page.error = Some(e.to_string());
            true
        }
    }
}

pub fn handle_retry(page: &mut UploadPage, ctx: &Context<UploadPage>) -> bool {
    match page.workflow.retry() {
        Ok(ticket) => {
            page.camera.release();
            log::info!("Retrying {} analysis", page.endpoint);
            send_prediction_request(page, ctx, ticket);
            true
        }
        Err(e) => {
            page.error = Some(e.to_string());
            true
        }
    }
}

fn send_prediction_request(page: &UploadPage, ctx: &Context<UploadPage>, ticket: Ticket) {
    let (Some(app), Some(candidate)) = (page.app.as_ref(), page.workflow.candidate()) else {
        ctx.link().send_message(Msg::SetError(Some(
            "Nothing to analyze. Please select an image first.".into(),
        )));
        return;
    };

    let endpoints = app.endpoints.clone();
    let endpoint = page.endpoint;
    let file = candidate.file.clone();
    let threshold = page.threshold;
    let link = ctx.link().clone();
    let progress = link.callback(move |milestone| Msg::Progress(ticket, milestone));

    spawn_local(async move {
        match api::predict_image(&endpoints, endpoint, &file, threshold, progress).await {
            Ok(result) => link.send_message(Msg::Completed(ticket, result)),
            Err(e) => link.send_message(Msg::Failed(ticket, e)),
        }
    });
}

/// Records the prediction in history together with the analysed preview.
pub fn handle_completed(page: &mut UploadPage, ticket: Ticket, result: PredictionResult) -> bool {
    if !page.workflow.complete(ticket, result.clone()) {
        return false;
    }
    log::info!("{} analysis completed", page.endpoint);

    if let Some(app) = &page.app {
        let image = page.workflow.candidate().and_then(|c| c.preview.clone());
        app.record
            .emit(HistoryEntry::new(image, result, local_timestamp()));
    }
    true
}

pub fn handle_export(page: &mut UploadPage, format: ExportFormat) -> bool {
    let Some(result) = page.workflow.result() else {
        return false;
    };
    match export(result, format, now_ms()) {
        Ok(file) => {
            if let Err(e) = trigger_download(&file) {
                log::error!("Download failed: {:?}", e);
                page.error = Some("Could not start the download.".into());
                return true;
            }
            false
        }
        Err(e) => {
            page.error = Some(format!("Export failed: {}", e));
            true
        }
    }
}

pub fn handle_open_camera(page: &mut UploadPage, ctx: &Context<UploadPage>) -> bool {
    if page.camera.is_opening() {
        return false;
    }
    let pending = page.camera.request();

    let link = ctx.link().clone();
    spawn_local(async move {
        match open_camera().await {
            Ok(stream) => {
                log::info!("Camera stream acquired");
                // Stopped here when the page was left or the request cancelled.
                if let Some(stream) = pending.deliver(BrowserStream(stream)) {
                    link.send_message(Msg::CameraReady(stream));
                }
            }
            Err(e) => {
                log::error!("Camera access failed: {:?}", e);
                if pending.is_wanted() {
                    link.send_message(Msg::CameraDenied(
                        "Unable to access camera. Please check permissions.".into(),
                    ));
                }
            }
        }
    });
    true
}

pub fn handle_camera_denied(message: &str) {
    alert(message);
}

/// Grabs one JPEG frame, releases the camera and feeds the frame through
/// the normal selection path.
pub fn handle_capture(page: &mut UploadPage, ctx: &Context<UploadPage>) -> bool {
    let video = page.video_ref.cast::<HtmlVideoElement>();
    let frame = page
        .camera
        .capture(|_| video.as_ref().map(capture_frame));

    let data_url = match frame.flatten() {
        Some(Ok(data_url)) => data_url,
        Some(Err(e)) => {
            log::error!("Frame capture failed: {:?}", e);
            page.error = Some("Could not capture a frame from the camera.".into());
            return true;
        }
        None => {
            page.error = Some("The camera is not ready yet.".into());
            return true;
        }
    };

    match decode_data_url(&data_url) {
        Ok(decoded) => {
            let name = capture_file_name(now_ms(), &decoded.mime_type);
            let file = GlooFile::new_with_options(
                &name,
                decoded.bytes.as_slice(),
                Some(decoded.mime_type.as_str()),
                None,
            );
            handle_files_added(page, ctx, vec![file])
        }
        Err(e) => {
            page.error = Some(format!("Captured frame was unreadable: {}", e));
            true
        }
    }
}

pub fn handle_drop(page: &mut UploadPage, ctx: &Context<UploadPage>, event: DragEvent) -> bool {
    event.prevent_default();
    page.is_dragging = false;

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

pub fn handle_paste(page: &mut UploadPage, ctx: &Context<UploadPage>, event: ClipboardEvent) -> bool {
    if page.workflow.state().is_analyzing() || page.camera.is_active() {
        return false;
    }
    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            if file_list.length() > 0 {
                event.prevent_default();
                process_file_list(ctx, file_list);
                return true;
            }
        }
    }
    false
}

pub fn process_file_list(ctx: &Context<UploadPage>, file_list: FileList) {
    let files = extract_image_files(&file_list);
    if files.len() < file_list.length() as usize {
        log::warn!("Skipping non-image files in selection");
    }

    if files.is_empty() {
        ctx.link()
            .send_message(Msg::SetError(Some("Skipped non-image file.".into())));
    } else {
        ctx.link().send_message(Msg::FilesAdded(files));
    }
}
