use shared::{AppState, Route};
use strum::IntoEnumIterator;
use yew::prelude::*;

pub fn render_sidebar(state: &AppState, on_navigate: Callback<Route>) -> Html {
    let current = state.route;

    html! {
        <aside class="sidebar">
            <div class="sidebar-brand">
                <div class="brand-badge">{"SC"}</div>
                <div>
                    <div class="brand-title">{"Smart Cement"}</div>
                    <div class="brand-subtitle">{"Research Platform"}</div>
                </div>
            </div>
            <nav class="sidebar-nav">
                { for Route::iter().map(|route| {
                    let on_navigate = on_navigate.clone();
                    html! {
                        <a
                            key={route.slug()}
                            href={route.hash()}
                            class={classes!("nav-link", (route == current).then_some("active"))}
                            onclick={Callback::from(move |e: MouseEvent| {
                                e.prevent_default();
                                on_navigate.emit(route);
                            })}
                        >
                            <span class="nav-icon">{ route.icon() }</span>
                            <span>{ route.nav_label() }</span>
                        </a>
                    }
                })}
            </nav>
            <div class="sidebar-footer">
                if state.authenticated {
                    <span class="session-badge">{"Signed in"}</span>
                } else {
                    <span class="session-badge guest">{"Guest session"}</span>
                }
            </div>
        </aside>
    }
}
