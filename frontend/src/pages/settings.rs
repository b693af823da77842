use crate::AppContext;
use crate::components::theme_toggle::render_theme_toggle;
use crate::components::utils::render_error_message;
use shared::config::format_threshold;
use shared::Settings;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[function_component(SettingsPage)]
pub fn settings_page() -> Html {
    let app = use_context::<AppContext>();
    let saved = app.as_ref().map(|app| app.settings.clone());
    let draft = use_state(|| saved.clone());
    let error = use_state(|| None::<String>);
    let notice = use_state(|| None::<&'static str>);

    // Pick up changes made elsewhere, e.g. the header theme toggle.
    {
        let draft = draft.clone();
        use_effect_with(saved, move |saved| {
            draft.set(saved.clone());
        });
    }

    let (Some(app), Some(current)) = (app, (*draft).clone()) else {
        return render_error_message(Some("Application context unavailable"));
    };

    let update = {
        let draft = draft.clone();
        let notice = notice.clone();
        move |edit: fn(&mut Settings, String)| {
            let draft = draft.clone();
            let notice = notice.clone();
            Callback::from(move |e: InputEvent| {
                let input: HtmlInputElement = e.target_unchecked_into();
                if let Some(mut next) = (*draft).clone() {
                    edit(&mut next, input.value());
                    draft.set(Some(next));
                    notice.set(None);
                }
            })
        }
    };
    let on_url = update(|settings, value| settings.api_base_url = value);
    let on_threshold = update(|settings, value| {
        if let Ok(threshold) = value.parse::<f32>() {
            settings.crack_threshold = threshold;
        }
    });

    let on_theme = {
        let draft = draft.clone();
        Callback::from(move |_: MouseEvent| {
            if let Some(mut next) = (*draft).clone() {
                next.theme = next.theme.toggled();
                draft.set(Some(next));
            }
        })
    };

    let on_save = {
        let save = app.save_settings.clone();
        let draft = draft.clone();
        let error = error.clone();
        let notice = notice.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(settings) = (*draft).clone() else {
                return;
            };
            match settings.validate() {
                Ok(()) => {
                    error.set(None);
                    notice.set(Some("Settings saved."));
                    save.emit(settings);
                }
                Err(e) => {
                    log::warn!("Settings not saved: {}", e);
                    notice.set(None);
                    error.set(Some(e.to_string()));
                }
            }
        })
    };

    let on_defaults = {
        let defaults = app.defaults.clone();
        let draft = draft.clone();
        let error = error.clone();
        let notice = notice.clone();
        Callback::from(move |_: MouseEvent| {
            let mut next = defaults.clone();
            if let Some(current) = &*draft {
                next.theme = current.theme;
            }
            draft.set(Some(next));
            error.set(None);
            notice.set(Some("Defaults restored. Save to apply."));
        })
    };

    html! {
        <div class="settings-page">
            <form class="settings-form" onsubmit={on_save}>
                <label class="form-field">
                    <span>{"API Base URL"}</span>
                    <input
                        type="url"
                        value={current.api_base_url.clone()}
                        placeholder={app.defaults.api_base_url.clone()}
                        oninput={on_url}
                    />
                </label>

                <label class="form-field">
                    <span>{ format!("Default Crack Threshold: {}", format_threshold(current.crack_threshold)) }</span>
                    <input
                        type="range"
                        min="0"
                        max="1"
                        step="0.05"
                        value={current.crack_threshold.to_string()}
                        oninput={on_threshold}
                    />
                </label>

                <div class="form-field theme-field">
                    <span>{ if current.theme.is_dark() { "Dark theme" } else { "Light theme" } }</span>
                    { render_theme_toggle(current.theme, on_theme) }
                </div>

                { render_error_message(error.as_deref()) }
                if let Some(message) = *notice {
                    <p class="settings-notice">{ message }</p>
                }

                <div class="button-container">
                    <button type="button" class="analyze-btn secondary" onclick={on_defaults}>
                        {"Reset to Defaults"}
                    </button>
                    <button type="submit" class="analyze-btn">
                        <i class="fa-solid fa-floppy-disk"></i>{" Save Settings"}
                    </button>
                </div>
            </form>
            <p class="settings-hint">
                { format!("Requests currently go to {}", app.endpoints.base_url) }
            </p>
        </div>
    }
}
