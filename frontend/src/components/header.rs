use super::theme_toggle::render_theme_toggle;
use shared::{Route, Theme};
use yew::prelude::*;

/// Renders the page header with the theme switch on the right
pub fn render_header(route: Route, theme: Theme, on_toggle: Callback<MouseEvent>) -> Html {
    html! {
        <header class="app-header">
            <div>
                <h1>{ format!("{} {}", route.icon(), route.title()) }</h1>
                <p class="subtitle">{"Smart Cement Research Platform"}</p>
            </div>
            <div class="top-right">
                { render_theme_toggle(theme, on_toggle) }
            </div>
        </header>
    }
}
