use crate::AppContext;
use crate::components::results::render_result;
use crate::components::utils::{now_ms, render_error_message, trigger_download};
use shared::export::{export, ExportFormat};
use shared::history::{HistoryFilter, HistorySummary};
use shared::{Endpoint, HistoryEntry, Route};
use std::str::FromStr;
use strum::IntoEnumIterator;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

#[function_component(HistoryPage)]
pub fn history_page() -> Html {
    let app = use_context::<AppContext>();
    let filter = use_state(HistoryFilter::default);
    let expanded = use_state(|| None::<usize>);
    let error = use_state(|| None::<String>);

    let Some(app) = app else {
        return render_error_message(Some("Application context unavailable"));
    };

    let on_kind = {
        let filter = filter.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            let mut next = (*filter).clone();
            next.kind = Endpoint::from_str(&select.value()).ok();
            filter.set(next);
        })
    };
    let on_search = {
        let filter = filter.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*filter).clone();
            next.search = input.value();
            filter.set(next);
        })
    };
    let on_clear = {
        let clear = app.clear_history.clone();
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Delete every saved prediction?").ok())
                .unwrap_or(false);
            if confirmed {
                expanded.set(None);
                clear.emit(());
            }
        })
    };

    let summary = HistorySummary::from_entries(&app.history);
    let visible: Vec<(usize, &HistoryEntry)> = filter.select(&app.history).collect();

    html! {
        <div class="history-page">
            { render_summary(&summary) }

            <div class="history-toolbar">
                <select class="history-kind" onchange={on_kind}>
                    <option value="" selected={filter.kind.is_none()}>{"All predictions"}</option>
                    { for Endpoint::iter().map(|endpoint| {
                        let value: &'static str = endpoint.into();
                        html! {
                            <option {value} selected={filter.kind == Some(endpoint)}>
                                { endpoint.label() }
                            </option>
                        }
                    })}
                </select>
                <input
                    type="search"
                    class="history-search"
                    placeholder="Search by date or result"
                    value={filter.search.clone()}
                    oninput={on_search}
                />
                <button
                    class="analyze-btn secondary"
                    onclick={on_clear}
                    disabled={app.history.is_empty()}
                >
                    <i class="fa-solid fa-trash"></i>{" Clear All"}
                </button>
            </div>

            { render_error_message(error.as_deref()) }

            if app.history.is_empty() {
                <p class="history-empty">{"No predictions yet. Results are saved here after each analysis."}</p>
            } else if visible.is_empty() {
                <p class="history-empty">{"No predictions match the current filter."}</p>
            } else {
                <div class="history-grid">
                    { for visible.into_iter().map(|(index, entry)| {
                        render_entry(&app, index, entry, *expanded == Some(index), &expanded, &error)
                    })}
                </div>
            }
        </div>
    }
}

fn render_summary(summary: &HistorySummary) -> Html {
    let average = summary
        .average_strength_28d
        .map(|mpa| format!("{:.2} MPa", mpa))
        .unwrap_or_else(|| "N/A".to_string());

    html! {
        <div class="history-summary">
            <div class="results-card summary-card">
                <p class="summary-label">{"Total Predictions"}</p>
                <p class="summary-value">{ summary.total }</p>
            </div>
            <div class="results-card summary-card">
                <p class="summary-label">{"Cracks Detected"}</p>
                <p class="summary-value">{ summary.cracks_detected }</p>
            </div>
            <div class="results-card summary-card">
                <p class="summary-label">{"Avg. 28-Day Strength"}</p>
                <p class="summary-value">{ average }</p>
            </div>
            <div class="results-card summary-card">
                <p class="summary-label">{"Particles Counted"}</p>
                <p class="summary-value">{ summary.particles_counted }</p>
            </div>
        </div>
    }
}

fn render_entry(
    app: &AppContext,
    index: usize,
    entry: &HistoryEntry,
    is_expanded: bool,
    expanded: &UseStateHandle<Option<usize>>,
    error: &UseStateHandle<Option<String>>,
) -> Html {
    let on_view = {
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| {
            expanded.set(if is_expanded { None } else { Some(index) });
        })
    };
    let on_delete = {
        let remove = app.remove_history.clone();
        let expanded = expanded.clone();
        Callback::from(move |_: MouseEvent| {
            expanded.set(None);
            remove.emit(index);
        })
    };
    let on_open = {
        let navigate = app.navigate.clone();
        let route = Route::for_endpoint(entry.kind());
        Callback::from(move |_: MouseEvent| navigate.emit(route))
    };
    let on_export = {
        let result = entry.result.clone();
        let error = error.clone();
        Callback::from(move |format: ExportFormat| {
            let outcome = export(&result, format, now_ms())
                .map_err(|e| e.to_string())
                .and_then(|file| trigger_download(&file).map_err(|e| format!("{:?}", e)));
            if let Err(e) = outcome {
                log::error!("Export from history failed: {}", e);
                error.set(Some("Could not export the prediction.".into()));
            }
        })
    };

    html! {
        <div class="history-item" key={entry.id.to_string()}>
            <div class="history-item-header">
                if let Some(image) = &entry.image {
                    <img class="history-thumb" src={image.clone()} alt="Analysed image" />
                } else {
                    <div class="history-thumb placeholder">{ "📈" }</div>
                }
                <div class="history-meta">
                    <span class="history-kind-label">{ entry.kind().label() }</span>
                    <span class="history-date">{ &entry.date }</span>
                    <p class="history-headline">{ entry.headline() }</p>
                </div>
            </div>
            <div class="button-container">
                <button class="analyze-btn secondary" onclick={on_view}>
                    { if is_expanded { "Hide" } else { "View" } }
                </button>
                <button class="analyze-btn secondary" onclick={on_open}>
                    {"New Analysis"}
                </button>
                <button class="analyze-btn danger" onclick={on_delete}>
                    <i class="fa-solid fa-trash"></i>{" Delete"}
                </button>
            </div>
            if is_expanded {
                { render_result(&entry.result, on_export) }
            }
        </div>
    }
}
