use super::utils::debounce;
use crate::pages::upload::{Msg, UploadPage};
use shared::validation::format_file_size;
use shared::Endpoint;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_preview_area(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    let Some(candidate) = page.workflow.candidate() else {
        return html! {};
    };
    let link = ctx.link().clone();

    html! {
        <div id="preview-container">
            {
                if let Some(url) = &candidate.preview {
                    html! { <img id="actual-image-preview" src={url.clone()} alt="Image Preview" /> }
                } else {
                    html! {
                        <div class="loading-preview">
                            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                            <p style="margin-left: 10px;">{"Loading preview..."}</p>
                        </div>
                    }
                }
            }
            <p class="file-details">
                { format!("{} ({})", candidate.meta.name, format_file_size(candidate.meta.size)) }
            </p>
            { render_threshold(page, ctx) }
            <div class="button-container">
                <button
                    id="clear-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Reset)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Remove"}
                </button>
                <button
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                    disabled={!page.workflow.is_ready()}
                >
                    { render_analyze_button_content(&candidate.meta.name) }
                </button>
            </div>
        </div>
    }
}

fn render_threshold(page: &UploadPage, ctx: &Context<UploadPage>) -> Html {
    if page.endpoint != Endpoint::CrackDetection {
        return html! {};
    }

    let on_input = ctx.link().callback(|e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetThreshold(input.value().parse().unwrap_or(0.5))
    });

    html! {
        <div class="threshold-control">
            <label for="threshold">{ format!("Detection threshold: {:.2}", page.threshold) }</label>
            <input
                id="threshold"
                type="range"
                min="0" max="1" step="0.05"
                value={page.threshold.to_string()}
                oninput={on_input}
            />
        </div>
    }
}

fn render_analyze_button_content(filename: &str) -> Html {
    let display_name = if filename.chars().count() > 20 {
        format!("{}...", filename.chars().take(17).collect::<String>())
    } else {
        filename.to_string()
    };

    html! { <><i class="fa-solid fa-magnifying-glass"></i>{ format!(" Analyze \"{}\"", display_name) }</> }
}
