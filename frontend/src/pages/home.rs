use crate::AppContext;
use shared::navigation::RESEARCH_CARDS;
use yew::prelude::*;

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let app = use_context::<AppContext>();
    let recent = app.as_ref().map(|app| app.history.len()).unwrap_or(0);

    html! {
        <div class="home-page">
            <p class="subtitle">{"Select a component to begin your analysis."}</p>
            <div class="research-grid">
                { for RESEARCH_CARDS.iter().map(|card| {
                    let navigate = app.as_ref().map(|app| app.navigate.clone());
                    let route = card.route;
                    let onclick = Callback::from(move |_: MouseEvent| {
                        if let Some(navigate) = &navigate {
                            navigate.emit(route);
                        }
                    });
                    html! {
                        <div class="research-card" key={card.title}>
                            <div class="research-card-header">
                                <div>
                                    <h3>{ card.title }</h3>
                                    <p>{ card.description }</p>
                                </div>
                                <div class="research-card-icon">{ route.icon() }</div>
                            </div>
                            <button class="analyze-btn" {onclick}>{"Open"}</button>
                        </div>
                    }
                })}
            </div>
            <p class="history-hint">{ format!("{} saved predictions in history", recent) }</p>
        </div>
    }
}
