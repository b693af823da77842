use crate::pages::upload::{Msg, UploadPage};
use shared::{Milestone, WorkflowState};
use yew::prelude::*;

const STEPS: [Milestone; 3] = [Milestone::Sending, Milestone::InFlight, Milestone::Parsing];

/// Progress bar while analyzing, or the failure panel with retry.
pub fn render_progress(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    let link = ctx.link();

    match page.workflow.state() {
        WorkflowState::Analyzing { progress } => {
            let caption = STEPS
                .iter()
                .rev()
                .find(|step| step.percent() <= *progress)
                .map(|step| step.caption())
                .unwrap_or("Preparing...");

            html! {
                <div class="analysis-progress">
                    { preview_thumbnail(page) }
                    <h2><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</h2>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", progress)}></div>
                    </div>
                    <div class="meter-value">{ format!("{}%", progress) }</div>
                    <p class="progress-caption">{ caption }</p>
                </div>
            }
        }
        WorkflowState::Failed { message, remediation } => html! {
            <div class="analysis-failed">
                { preview_thumbnail(page) }
                <div class="error-message">
                    <i class="fa-solid fa-circle-exclamation"></i>
                    <p>{ message }</p>
                </div>
                if !remediation.is_empty() {
                    <ol class="remediation-steps">
                        { for remediation.iter().map(|step| html! { <li>{ *step }</li> }) }
                    </ol>
                }
                <div class="button-container">
                    <button class="analyze-btn" onclick={link.callback(|_| Msg::Retry)}>
                        <i class="fa-solid fa-rotate-right"></i>{" Try Again"}
                    </button>
                    <button class="analyze-btn secondary" onclick={link.callback(|_| Msg::Reset)}>
                        {"Choose Another Image"}
                    </button>
                </div>
            </div>
        },
        _ => html! {},
    }
}

fn preview_thumbnail(page: &UploadPage) -> Html {
    match page.workflow.candidate().and_then(|c| c.preview.as_ref()) {
        Some(url) => html! { <img class="progress-thumbnail" src={url.clone()} alt="Analyzed image" /> },
        None => html! {},
    }
}
