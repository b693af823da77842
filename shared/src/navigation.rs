use crate::config::Endpoint;
use std::str::FromStr;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Pages of the dashboard. The kebab-case name doubles as the URL hash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum Route {
    #[default]
    Home,
    ClinkerAnalyser,
    CrackDetection,
    RawMealParticles,
    StrengthPrediction,
    History,
    Settings,
}

impl Route {
    pub fn slug(&self) -> &'static str {
        self.into()
    }

    pub fn hash(&self) -> String {
        format!("#/{}", self.slug())
    }

    /// Resolves `#/crack-detection` style hashes; anything unknown is Home.
    pub fn from_hash(hash: &str) -> Route {
        let slug = hash.trim_start_matches('#').trim_start_matches('/');
        Route::from_str(slug).unwrap_or_default()
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Research Components",
            Route::ClinkerAnalyser => "Cement Clinker Image Analyser",
            Route::CrackDetection => "Compressive Strength and Crack Detection",
            Route::RawMealParticles => "Raw Meal Color Particles",
            Route::StrengthPrediction => "Cement Strength Prediction",
            Route::History => "Prediction History",
            Route::Settings => "Settings",
        }
    }

    pub fn nav_label(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::ClinkerAnalyser => "Clinker Analyser",
            Route::CrackDetection => "Crack Detection",
            Route::RawMealParticles => "Raw Meal Particles",
            Route::StrengthPrediction => "Strength Prediction",
            Route::History => "History",
            Route::Settings => "Settings",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Route::Home => "🏠",
            Route::ClinkerAnalyser => "🔬",
            Route::CrackDetection => "🧱",
            Route::RawMealParticles => "🎨",
            Route::StrengthPrediction => "📈",
            Route::History => "🕘",
            Route::Settings => "⚙️",
        }
    }

    /// The prediction service a page submits to, if any.
    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            Route::ClinkerAnalyser => Some(Endpoint::ClinkerPhase),
            Route::CrackDetection => Some(Endpoint::CrackDetection),
            Route::RawMealParticles => Some(Endpoint::ParticleCount),
            Route::StrengthPrediction => Some(Endpoint::StrengthPrediction),
            _ => None,
        }
    }

    pub fn for_endpoint(endpoint: Endpoint) -> Route {
        match endpoint {
            Endpoint::ClinkerPhase => Route::ClinkerAnalyser,
            Endpoint::CrackDetection => Route::CrackDetection,
            Endpoint::ParticleCount => Route::RawMealParticles,
            Endpoint::StrengthPrediction => Route::StrengthPrediction,
        }
    }
}

/// Top-level UI state, owned by the root component and shared downwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub route: Route,
    pub authenticated: bool,
}

impl AppState {
    pub fn at(route: Route) -> Self {
        Self {
            route,
            authenticated: false,
        }
    }

    /// Returns true when the route actually changed.
    pub fn navigate(&mut self, route: Route) -> bool {
        if self.route == route {
            return false;
        }
        log::info!("Navigating to {}", route.slug());
        self.route = route;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResearchCard {
    pub title: &'static str,
    pub description: &'static str,
    pub route: Route,
}

pub const RESEARCH_CARDS: [ResearchCard; 4] = [
    ResearchCard {
        title: "Compressive Strength and Crack Detection",
        description: "Review compressive strength test results and utilize AI-powered crack detection for detailed structural integrity analysis.",
        route: Route::CrackDetection,
    },
    ResearchCard {
        title: "Cement Strength Prediction (Multi-Output)",
        description: "Predict cement compressive strength at 1D, 2D, 7D, 28D, and 56D using ensemble machine learning models (XGBoost + LightGBM).",
        route: Route::StrengthPrediction,
    },
    ResearchCard {
        title: "Cement Raw meals color particles identification",
        description: "Identify and analyze the color particles in cement raw meals to assess quality and consistency.",
        route: Route::RawMealParticles,
    },
    ResearchCard {
        title: "Cement Clinker Image Analyser",
        description: "Classify clinker micrographs into C2S, C3S, C3A and C4AF phases with a deep learning model.",
        route: Route::ClinkerAnalyser,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn hashes_round_trip() {
        for route in Route::iter() {
            assert_eq!(Route::from_hash(&route.hash()), route);
        }
        assert_eq!(Route::StrengthPrediction.hash(), "#/strength-prediction");
    }

    #[test]
    fn unknown_hash_is_home() {
        assert_eq!(Route::from_hash(""), Route::Home);
        assert_eq!(Route::from_hash("#/nope"), Route::Home);
        assert_eq!(Route::from_hash("raw-meal-particles"), Route::RawMealParticles);
    }

    #[test]
    fn endpoint_pages_map_both_ways() {
        for route in Route::iter() {
            if let Some(endpoint) = route.endpoint() {
                assert_eq!(Route::for_endpoint(endpoint), route);
            }
        }
        assert_eq!(Route::History.endpoint(), None);
    }

    #[test]
    fn navigate_reports_changes() {
        let mut state = AppState::default();
        assert!(!state.navigate(Route::Home));
        assert!(state.navigate(Route::Settings));
        assert_eq!(state.route, Route::Settings);
        assert!(!state.authenticated);
    }

    #[test]
    fn every_card_targets_a_prediction_page() {
        assert!(RESEARCH_CARDS
            .iter()
            .all(|card| card.route.endpoint().is_some()));
    }
}
