use crate::AppContext;
use crate::api::predict_strength;
use crate::components::results::render_strength;
use crate::components::utils::{local_timestamp, now_ms, render_error_message, trigger_download};
use shared::export::{export, ExportFormat};
use shared::strength::{FieldGroup, StrengthForm};
use shared::{HistoryEntry, PredictionResult};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

enum FormAction {
    Set(&'static str, String),
    LoadSample,
    Reset,
}

#[derive(Clone, PartialEq, Default)]
struct FormState {
    form: StrengthForm,
}

impl Reducible for FormState {
    type Action = FormAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut form = self.form.clone();
        match action {
            FormAction::Set(key, value) => {
                form.set(key, value);
            }
            FormAction::LoadSample => form.load_sample(),
            FormAction::Reset => form.reset(),
        }
        Rc::new(FormState { form })
    }
}

#[function_component(StrengthPage)]
pub fn strength_page() -> Html {
    let app = use_context::<AppContext>();
    let state = use_reducer(FormState::default);
    let loading = use_state(|| false);
    let error = use_state(|| None::<String>);
    let result = use_state(|| None::<PredictionResult>);
    // Bumped on submit and reset; a response for an older value is dropped.
    let generation = use_mut_ref(|| 0u64);

    let on_submit = {
        let state = state.clone();
        let loading = loading.clone();
        let error = error.clone();
        let result = result.clone();
        let app = app.clone();
        let generation = generation.clone();

        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if *loading {
                return;
            }
            let Some(app) = app.clone() else {
                error.set(Some("Application context unavailable".into()));
                return;
            };

            let input = state.form.to_input();
            let ticket = {
                let mut current = generation.borrow_mut();
                *current += 1;
                *current
            };
            let generation = generation.clone();
            let loading = loading.clone();
            let error = error.clone();
            let result = result.clone();
            loading.set(true);
            error.set(None);

            spawn_local(async move {
                let outcome = predict_strength(&app.endpoints, &input).await;
                loading.set(false);
                if *generation.borrow() != ticket {
                    log::debug!("Dropping stale strength prediction");
                    return;
                }
                match outcome {
                    Ok(prediction) => {
                        log::info!("Strength prediction received");
                        app.record
                            .emit(HistoryEntry::new(None, prediction.clone(), local_timestamp()));
                        result.set(Some(prediction));
                    }
                    Err(e) => {
                        log::error!("Strength prediction failed: {}", e);
                        error.set(Some(e.user_message(&app.endpoints.base_url)));
                    }
                }
            });
        })
    };

    let on_sample = {
        let state = state.clone();
        Callback::from(move |_: MouseEvent| state.dispatch(FormAction::LoadSample))
    };
    let on_reset = {
        let state = state.clone();
        let result = result.clone();
        let error = error.clone();
        let generation = generation.clone();
        Callback::from(move |_: MouseEvent| {
            *generation.borrow_mut() += 1;
            state.dispatch(FormAction::Reset);
            result.set(None);
            error.set(None);
        })
    };

    let on_export = {
        let result = result.clone();
        let error = error.clone();
        Callback::from(move |format: ExportFormat| {
            let Some(prediction) = (*result).as_ref() else {
                return;
            };
            let outcome = export(prediction, format, now_ms())
                .map_err(|e| e.to_string())
                .and_then(|file| trigger_download(&file).map_err(|e| format!("{:?}", e)));
            if let Err(e) = outcome {
                log::error!("Export failed: {}", e);
                error.set(Some("Could not export the prediction.".into()));
            }
        })
    };

    let on_json = {
        let on_export = on_export.clone();
        Callback::from(move |_: MouseEvent| on_export.emit(ExportFormat::Json))
    };
    let on_text = Callback::from(move |_: MouseEvent| on_export.emit(ExportFormat::Text));

    html! {
        <div class="strength-page">
            <p class="page-intro">
                {"Enter grinding parameters and chemical composition to predict compressive strength at 1, 2, 7, 28 and 56 days."}
            </p>
            <form class="strength-form" onsubmit={on_submit}>
                { render_group(&state, FieldGroup::Grinding) }
                { render_group(&state, FieldGroup::Chemical) }
                <div class="button-container">
                    <button type="button" class="analyze-btn secondary" onclick={on_sample}>
                        {"Load Sample Values"}
                    </button>
                    <button type="button" class="analyze-btn secondary" onclick={on_reset}>
                        {"Reset"}
                    </button>
                    <button type="submit" class="analyze-btn" disabled={*loading}>
                        if *loading {
                            <i class="fa-solid fa-spinner fa-spin"></i>{" Predicting..."}
                        } else {
                            <i class="fa-solid fa-chart-line"></i>{" Predict Strength"}
                        }
                    </button>
                </div>
            </form>

            { render_error_message(error.as_deref()) }

            if let Some(PredictionResult::StrengthPrediction(response)) = (*result).as_ref() {
                <div class="results-container">
                    { render_strength(response) }
                    <div class="button-container">
                        <button class="analyze-btn secondary" onclick={on_json}>
                            {"Download JSON"}
                        </button>
                        <button class="analyze-btn secondary" onclick={on_text}>
                            {"Download Report"}
                        </button>
                    </div>
                </div>
            }
        </div>
    }
}

fn render_group(state: &UseReducerHandle<FormState>, group: FieldGroup) -> Html {
    html! {
        <fieldset class="form-group">
            <legend>{ group.title() }</legend>
            <div class="form-grid">
                { for state.form.fields().filter(|(spec, _)| spec.group == group).map(|(spec, value)| {
                    let key = spec.key;
                    let oninput = {
                        let state = state.clone();
                        Callback::from(move |e: InputEvent| {
                            let input: HtmlInputElement = e.target_unchecked_into();
                            state.dispatch(FormAction::Set(key, input.value()));
                        })
                    };
                    html! {
                        <label class="form-field" key={key}>
                            <span>{ spec.label }</span>
                            <input
                                type="text"
                                inputmode="decimal"
                                name={key}
                                placeholder={spec.placeholder}
                                value={value.to_string()}
                                {oninput}
                            />
                        </label>
                    }
                })}
            </div>
        </fieldset>
    }
}
