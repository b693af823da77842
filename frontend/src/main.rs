mod api;
mod components;
mod pages;
mod storage;

use components::header::render_header;
use components::sidebar::render_sidebar;
use components::theme_toggle::apply_theme;
use gloo_events::EventListener;
use pages::history::HistoryPage;
use pages::home::HomePage;
use pages::settings::SettingsPage;
use pages::strength::StrengthPage;
use pages::upload::UploadPage;
use shared::{AppState, EndpointConfig, HistoryEntry, HistoryStore, Route, Settings};
use std::rc::Rc;
use storage::LocalHistory;
use yew::prelude::*;

/// Shared with every page through a `ContextProvider`.
#[derive(Clone, PartialEq)]
pub struct AppContext {
    pub state: AppState,
    pub settings: Settings,
    pub defaults: Settings,
    pub endpoints: Rc<EndpointConfig>,
    pub history: Rc<Vec<HistoryEntry>>,
    pub navigate: Callback<Route>,
    pub save_settings: Callback<Settings>,
    pub record: Callback<HistoryEntry>,
    pub remove_history: Callback<usize>,
    pub clear_history: Callback<()>,
}

pub enum Msg {
    Navigate(Route),
    HashChanged,
    SaveSettings(Settings),
    ToggleTheme,
    Record(HistoryEntry),
    RemoveHistory(usize),
    ClearHistory,
}

#[derive(Properties, PartialEq)]
pub struct AppProps {
    pub config: Rc<EndpointConfig>,
}

pub struct App {
    state: AppState,
    settings: Settings,
    endpoints: Rc<EndpointConfig>,
    history: HistoryStore<LocalHistory>,
    history_snapshot: Rc<Vec<HistoryEntry>>,
    _hash_listener: Option<EventListener>,
}

fn current_hash() -> String {
    web_sys::window()
        .and_then(|w| w.location().hash().ok())
        .unwrap_or_default()
}

impl Component for App {
    type Message = Msg;
    type Properties = AppProps;

    fn create(ctx: &Context<Self>) -> Self {
        let config = &ctx.props().config;
        let settings = storage::load_settings(config);
        let endpoints = match settings.resolve(config) {
            Ok(resolved) => Rc::new(resolved),
            Err(e) => {
                log::warn!("Falling back to bundled endpoints: {}", e);
                Rc::clone(config)
            }
        };
        apply_theme(settings.theme);

        let history = HistoryStore::open(LocalHistory);
        log::info!("Loaded {} history entries", history.len());
        let history_snapshot = Rc::new(history.list().to_vec());

        let link = ctx.link().clone();
        let hash_listener = web_sys::window().map(|window| {
            EventListener::new(&window, "hashchange", move |_| {
                link.send_message(Msg::HashChanged);
            })
        });

        Self {
            state: AppState::at(Route::from_hash(&current_hash())),
            settings,
            endpoints,
            history,
            history_snapshot,
            _hash_listener: hash_listener,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::Navigate(route) => {
                if let Some(window) = web_sys::window() {
                    if let Err(e) = window.location().set_hash(&route.hash()) {
                        log::warn!("Could not update location hash: {:?}", e);
                    }
                }
                self.state.navigate(route)
            }
            Msg::HashChanged => self.state.navigate(Route::from_hash(&current_hash())),
            Msg::SaveSettings(settings) => self.handle_save_settings(ctx, settings),
            Msg::ToggleTheme => {
                let mut settings = self.settings.clone();
                settings.theme = settings.theme.toggled();
                self.handle_save_settings(ctx, settings)
            }
            Msg::Record(entry) => {
                self.history.append(entry);
                self.refresh_history();
                true
            }
            Msg::RemoveHistory(index) => {
                if self.history.remove(index).is_none() {
                    return false;
                }
                self.refresh_history();
                true
            }
            Msg::ClearHistory => {
                self.history.clear();
                self.refresh_history();
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let app = AppContext {
            state: self.state.clone(),
            settings: self.settings.clone(),
            defaults: Settings::from_config(&ctx.props().config),
            endpoints: Rc::clone(&self.endpoints),
            history: Rc::clone(&self.history_snapshot),
            navigate: link.callback(Msg::Navigate),
            save_settings: link.callback(Msg::SaveSettings),
            record: link.callback(Msg::Record),
            remove_history: link.callback(Msg::RemoveHistory),
            clear_history: link.callback(|_| Msg::ClearHistory),
        };
        let route = self.state.route;

        html! {
            <ContextProvider<AppContext> context={app}>
                <div class="app-shell">
                    { render_sidebar(&self.state, link.callback(Msg::Navigate)) }
                    <div class="container">
                        { render_header(route, self.settings.theme, link.callback(|_| Msg::ToggleTheme)) }
                        <main class="main-content">
                            { render_page(route) }
                        </main>
                        <footer class="app-footer">
                            <p>{"Smart Cement Research Platform | Rust WASM"}</p>
                        </footer>
                    </div>
                </div>
            </ContextProvider<AppContext>>
        }
    }
}

impl App {
    fn handle_save_settings(&mut self, ctx: &Context<Self>, settings: Settings) -> bool {
        match settings.resolve(&ctx.props().config) {
            Ok(resolved) => {
                storage::save_settings(&settings);
                apply_theme(settings.theme);
                self.endpoints = Rc::new(resolved);
                self.settings = settings;
                log::info!("Settings saved, API base {}", self.endpoints.base_url);
                true
            }
            Err(e) => {
                log::error!("Rejected settings: {}", e);
                false
            }
        }
    }

    fn refresh_history(&mut self) {
        self.history_snapshot = Rc::new(self.history.list().to_vec());
    }
}

fn render_page(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::ClinkerAnalyser | Route::CrackDetection | Route::RawMealParticles => {
            match route.endpoint() {
                Some(endpoint) if endpoint.accepts_image() => {
                    html! { <UploadPage key={route.slug()} {endpoint} /> }
                }
                _ => html! {},
            }
        }
        Route::StrengthPrediction => html! { <StrengthPage /> },
        Route::History => html! { <HistoryPage /> },
        Route::Settings => html! { <SettingsPage /> },
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");

    match EndpointConfig::load() {
        Ok(config) => {
            yew::Renderer::<App>::with_props(AppProps {
                config: Rc::new(config),
            })
            .render();
        }
        Err(e) => {
            log::error!("Invalid bundled endpoint configuration: {}", e);
            gloo_console::error!(format!("Smart Cement dashboard cannot start: {}", e));
        }
    }
}
