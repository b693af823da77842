use shared::export::ExportFormat;
use shared::presentation::{ClinkerSummary, CrackSummary, ParticleSummary};
use shared::strength::strength_cards;
use shared::{PredictionResult, StrengthResponse};
use yew::prelude::*;

pub fn render_result(result: &PredictionResult, on_export: Callback<ExportFormat>) -> Html {
    let cards = match result {
        PredictionResult::ClinkerPhase(prediction) => {
            render_clinker(&ClinkerSummary::new(prediction))
        }
        PredictionResult::CrackDetection(detection) => render_crack(&CrackSummary::new(detection)),
        PredictionResult::ParticleCount(analysis) => {
            render_particles(&ParticleSummary::new(analysis))
        }
        PredictionResult::StrengthPrediction(response) => render_strength(response),
    };

    html! {
        <div class="results-container">
            { cards }
            { render_export(on_export) }
        </div>
    }
}

fn render_clinker(summary: &ClinkerSummary) -> Html {
    html! {
        <div class="results-grid">
            <div class="results-card status-card">
                <h2>{"Detected Phase"}</h2>
                <div class="phase-icon" style={format!("background-color: {}", summary.info.color)}>
                    <i class="fa-solid fa-check"></i>
                </div>
                <h3>{ &summary.phase }</h3>
                <p class="phase-full-name">{ &summary.name }</p>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div
                            class="meter-fill"
                            style={format!("width: {}%; background-color: {}", summary.confidence_width, summary.info.color)}
                        ></div>
                    </div>
                    <div class="meter-value">{ &summary.confidence }</div>
                </div>
            </div>

            <div class="results-card probabilities-card">
                <h2>{"All Phase Probabilities"}</h2>
                <div class="result-bars">
                    { for summary.probabilities.iter().map(|row| html! {
                        <div class="result-item" key={row.phase.clone()}>
                            <div class="result-label">
                                <span class="phase-dot" style={format!("background-color: {}", row.color)}></span>
                                { &row.phase }
                            </div>
                            <div class="result-bar-container">
                                <div
                                    class="result-bar"
                                    style={format!("width: {}%; background-color: {}", row.width, row.color)}
                                ></div>
                            </div>
                            <div class="result-value">{ &row.percent }</div>
                            <p class="phase-description">{ &row.name }</p>
                        </div>
                    })}
                </div>
            </div>

            <div class="results-card info-card">
                <h2>{"Phase Information"}</h2>
                <p>{ summary.info.description }</p>
                <dl class="info-stats">
                    <dt>{"Processing Time"}</dt>
                    <dd>{ &summary.processing_time }</dd>
                    if let Some(filename) = &summary.filename {
                        <dt>{"Filename"}</dt>
                        <dd>{ filename }</dd>
                    }
                    if let Some(time) = &summary.analysis_time {
                        <dt>{"Analysis Time"}</dt>
                        <dd>{ time }</dd>
                    }
                </dl>
            </div>

            if !summary.info.significance.is_empty() {
                <div class="results-card recommendations-card">
                    <h2>{"Clinical Significance"}</h2>
                    <ul class="recommendations-list">
                        { for summary.info.significance.iter().map(|note| html! {
                            <li><i class="fa-solid fa-check"></i>{ " " }{ *note }</li>
                        })}
                    </ul>
                </div>
            }
        </div>
    }
}

fn render_crack(summary: &CrackSummary) -> Html {
    html! {
        <div class="results-grid">
            <div class={classes!("results-card", "status-card", summary.severity.css_class())}>
                <h2>{ summary.status }</h2>
                <p class="severity">{ format!("Severity: {}", summary.severity.label()) }</p>
                <p>{ &summary.message }</p>
                <dl class="info-stats">
                    <dt>{"Crack Area"}</dt>
                    <dd>{ &summary.crack_percentage }</dd>
                    <dt>{"Crack Pixels"}</dt>
                    <dd>{ summary.crack_pixels }</dd>
                    if let Some(total) = summary.total_pixels {
                        <dt>{"Total Pixels"}</dt>
                        <dd>{ total }</dd>
                    }
                </dl>
            </div>
            <div class="results-card mask-card">
                <h2>{"Crack Mask"}</h2>
                <img class="crack-mask" src={summary.mask_url.clone()} alt="Detected crack mask" />
            </div>
        </div>
    }
}

fn render_particles(summary: &ParticleSummary) -> Html {
    html! {
        <div class="results-grid">
            { for summary.rows.iter().map(|row| html! {
                <div class={classes!("results-card", "particle-card", row.css_class)} key={row.label}>
                    <p class="particle-label">{ row.label }</p>
                    <p class="particle-count">{ row.count }</p>
                    <p class="particle-share">{ &row.share }</p>
                </div>
            })}
            <div class="results-card particle-card particle-total">
                <p class="particle-label">{"Total"}</p>
                <p class="particle-count">{ summary.total }</p>
            </div>
        </div>
    }
}

pub fn render_strength(response: &StrengthResponse) -> Html {
    let cards = strength_cards(&response.predictions);

    html! {
        <div class="strength-results">
            <div class="strength-grid">
                { for cards.iter().map(|card| html! {
                    <div
                        class={classes!("results-card", "strength-card", card.highlighted.then_some("highlight"))}
                        key={card.horizon.short_label()}
                    >
                        <p class="strength-label">{ &card.label }</p>
                        <p class="strength-value">{ card.strength.to_string() }</p>
                    </div>
                })}
            </div>

            <div class="results-card model-info">
                <dl class="info-stats">
                    <dt>{"Model"}</dt>
                    <dd>{ &response.predictions.model_used }</dd>
                    <dt>{"Confidence"}</dt>
                    <dd>{ response.predictions.confidence.as_deref().unwrap_or("N/A") }</dd>
                    <dt>{"Engineered Features"}</dt>
                    <dd>{ response.engineered_features_count }</dd>
                </dl>
            </div>

            <div class="results-card progression-card">
                <h2>{"Strength Development"}</h2>
                { for cards.iter().map(|card| html! {
                    <div class="progression-row" key={card.horizon.short_label()}>
                        <span class="progression-day">{ card.horizon.short_label() }</span>
                        <div class="result-bar-container">
                            <div class="result-bar" style={format!("width: {}%", card.share_of_final)}>
                                <span class="progression-value">{ card.strength.short() }</span>
                            </div>
                        </div>
                    </div>
                })}
            </div>
        </div>
    }
}

fn render_export(on_export: Callback<ExportFormat>) -> Html {
    let json = {
        let on_export = on_export.clone();
        Callback::from(move |_: MouseEvent| on_export.emit(ExportFormat::Json))
    };
    let text = Callback::from(move |_: MouseEvent| on_export.emit(ExportFormat::Text));

    html! {
        <div class="results-card export-card">
            <h2>{"Export Report"}</h2>
            <div class="button-container">
                <button class="analyze-btn secondary" onclick={json}>
                    <i class="fa-solid fa-file-code"></i>{" Download JSON"}
                </button>
                <button class="analyze-btn secondary" onclick={text}>
                    <i class="fa-solid fa-file-lines"></i>{" Download Report"}
                </button>
            </div>
        </div>
    }
}
