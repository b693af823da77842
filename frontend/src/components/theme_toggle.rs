use shared::Theme;
use yew::prelude::*;

pub fn render_theme_toggle(theme: Theme, on_toggle: Callback<MouseEvent>) -> Html {
    html! {
        <button
            type="button"
            class="theme-toggle"
            onclick={on_toggle}
            title={ if theme.is_dark() { "Switch to Light Mode" } else { "Switch to Dark Mode" } }
        >
            { if theme.is_dark() {
                html! { <img src="https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/svg/1f319.svg" alt="Moon Icon" class="toggle-icon" /> }
            } else {
                html! { <img src="https://cdnjs.cloudflare.com/ajax/libs/twemoji/14.0.2/svg/2600.svg" alt="Sun Icon" class="toggle-icon" /> }
            }}
        </button>
    }
}

/// Mirrors the theme onto the `dark-mode` class of `<body>`.
pub fn apply_theme(theme: Theme) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        log::warn!("No document body to apply theme to");
        return;
    };

    let classes = body.class_list();
    let result = if theme.is_dark() {
        classes.add_1("dark-mode")
    } else {
        classes.remove_1("dark-mode")
    };
    if let Err(e) = result {
        log::error!("Failed to apply theme: {:?}", e);
    }
}
