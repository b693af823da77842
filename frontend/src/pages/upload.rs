use crate::AppContext;
use crate::components::camera::{render_camera, BrowserStream};
use crate::components::handlers;
use crate::components::preview_area::render_preview_area;
use crate::components::progress::render_progress;
use crate::components::results::render_result;
use crate::components::upload_section::render_upload_section;
use crate::components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::File as GlooFile;
use shared::camera::CameraSession;
use shared::export::ExportFormat;
use shared::{ApiError, Endpoint, Milestone, PredictionResult, Ticket, UploadWorkflow, WorkflowState};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent, HtmlVideoElement};
use yew::context::ContextHandle;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct UploadPageProps {
    pub endpoint: Endpoint,
}

pub enum Msg {
    // File operations
    FilesAdded(Vec<GlooFile>),
    PreviewReady(Ticket, String),
    Reset,

    // Analysis operations
    Analyze,
    Progress(Ticket, Milestone),
    Completed(Ticket, PredictionResult),
    Failed(Ticket, ApiError),
    Retry,
    Export(ExportFormat),
    SetThreshold(f32),

    // Camera
    OpenCamera,
    CameraReady(BrowserStream),
    CameraDenied(String),
    Capture,
    CloseCamera,

    // UI states
    SetError(Option<String>),
    SetDragging(bool),
    ContextChanged(AppContext),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

/// Upload, preview, analyze and show results for one image endpoint.
pub struct UploadPage {
    pub(crate) endpoint: Endpoint,
    pub(crate) workflow: UploadWorkflow<GlooFile>,
    pub(crate) camera: CameraSession<BrowserStream>,
    pub(crate) video_ref: NodeRef,
    pub(crate) error: Option<String>,
    pub(crate) is_dragging: bool,
    pub(crate) threshold: f32,
    pub(crate) app: Option<AppContext>,
    _app_handle: Option<ContextHandle<AppContext>>,
    _paste_listener: Option<EventListener>,
}

impl Component for UploadPage {
    type Message = Msg;
    type Properties = UploadPageProps;

    fn create(ctx: &Context<Self>) -> Self {
        let (app, app_handle) = ctx
            .link()
            .context::<AppContext>(ctx.link().callback(Msg::ContextChanged))
            .unzip();

        let base_url = app
            .as_ref()
            .map(|app| app.endpoints.base_url.clone())
            .unwrap_or_default();
        let threshold = app
            .as_ref()
            .map(|app| app.settings.crack_threshold)
            .unwrap_or(0.5);

        let link = ctx.link().clone();
        let paste_listener = web_sys::window().map(|window| {
            EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            })
        });

        Self {
            endpoint: ctx.props().endpoint,
            workflow: UploadWorkflow::new(base_url),
            camera: CameraSession::new(),
            video_ref: NodeRef::default(),
            error: None,
            is_dragging: false,
            threshold,
            app,
            _app_handle: app_handle,
            _paste_listener: paste_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            // File operations
            Msg::FilesAdded(files) => handlers::handle_files_added(self, ctx, files),
            Msg::PreviewReady(ticket, url) => self.workflow.attach_preview(ticket, url),
            Msg::Reset => {
                self.workflow.reset();
                self.error = None;
                true
            }

            // Analysis operations
            Msg::Analyze => handlers::handle_analyze(self, ctx),
            Msg::Progress(ticket, milestone) => self.workflow.advance(ticket, milestone),
            Msg::Completed(ticket, result) => handlers::handle_completed(self, ticket, result),
            Msg::Failed(ticket, error) => {
                log::warn!("{} analysis failed: {}", self.endpoint, error);
                self.workflow.fail(ticket, &error)
            }
            Msg::Retry => handlers::handle_retry(self, ctx),
            Msg::Export(format) => handlers::handle_export(self, format),
            Msg::SetThreshold(threshold) => {
                self.threshold = threshold.clamp(0.0, 1.0);
                true
            }

            // Camera
            Msg::OpenCamera => handlers::handle_open_camera(self, ctx),
            Msg::CameraReady(stream) => {
                self.camera.attach(stream);
                true
            }
            Msg::CameraDenied(message) => {
                self.camera.release();
                handlers::handle_camera_denied(&message);
                true
            }
            Msg::Capture => handlers::handle_capture(self, ctx),
            Msg::CloseCamera => {
                self.camera.release();
                true
            }

            // UI states
            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }
            Msg::ContextChanged(app) => {
                self.workflow.set_base_url(app.endpoints.base_url.clone());
                if self.app.as_ref().map(|a| a.settings.crack_threshold)
                    != Some(app.settings.crack_threshold)
                {
                    self.threshold = app.settings.crack_threshold;
                }
                self.app = Some(app);
                true
            }

            // Input events
            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(self, ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let body = match self.workflow.state() {
            WorkflowState::Completed => match self.workflow.result() {
                Some(result) => html! {
                    <>
                        { render_result(result, link.callback(Msg::Export)) }
                        <div class="button-container">
                            <button class="analyze-btn" onclick={link.callback(|_| Msg::Reset)}>
                                <i class="fa-solid fa-rotate-left"></i>{" Analyze New Image"}
                            </button>
                        </div>
                    </>
                },
                None => html! {},
            },
            WorkflowState::Analyzing { .. } | WorkflowState::Failed { .. } => {
                render_progress(self, ctx)
            }
            WorkflowState::Idle | WorkflowState::Previewing => html! {
                <>
                    { render_upload_section(self, ctx) }
                    { render_camera(self, ctx) }
                    { render_preview_area(self, ctx) }
                </>
            },
        };

        html! {
            <div class="upload-page">
                <p class="page-intro">{ intro(self.endpoint) }</p>
                { render_error_message(self.error.as_deref().or(self.workflow.notice())) }
                { body }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.camera.release();
    }

    fn rendered(&mut self, _ctx: &Context<Self>, _first_render: bool) {
        let (Some(video), Some(stream)) =
            (self.video_ref.cast::<HtmlVideoElement>(), self.camera.stream())
        else {
            return;
        };
        if video.src_object().is_none() {
            video.set_src_object(Some(&stream.0));
        }
    }
}

fn intro(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::ClinkerPhase => {
            "Upload a clinker micrograph to classify its dominant mineral phase."
        }
        Endpoint::CrackDetection => {
            "Upload or capture a photo of a specimen to segment surface cracks."
        }
        Endpoint::ParticleCount => {
            "Upload a raw meal sample image to count dark red, light red and white particles."
        }
        Endpoint::StrengthPrediction => "",
    }
}
