use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;
use url::Url;

const EMBEDDED_CONFIG: &str = include_str!("../../config/endpoints.yaml");

pub const SETTINGS_STORAGE_KEY: &str = "smart-cement.settings";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid endpoint configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid API base URL '{0}': expected an http(s) URL")]
    InvalidBaseUrl(String),
    #[error("Crack threshold must be between 0 and 1, got {0}")]
    ThresholdOutOfRange(f32),
}

/// The prediction services the dashboard talks to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter,
    EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Endpoint {
    ClinkerPhase,
    CrackDetection,
    ParticleCount,
    StrengthPrediction,
}

impl Endpoint {
    pub fn label(&self) -> &'static str {
        match self {
            Endpoint::ClinkerPhase => "Clinker phase",
            Endpoint::CrackDetection => "Crack detection",
            Endpoint::ParticleCount => "Raw meal particles",
            Endpoint::StrengthPrediction => "Strength prediction",
        }
    }

    /// Endpoints that take a multipart image upload rather than a JSON body.
    pub fn accepts_image(&self) -> bool {
        !matches!(self, Endpoint::StrengthPrediction)
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub path: String,
    #[serde(default)]
    pub fallback_path: Option<String>,
    #[serde(default)]
    pub file_field: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub clinker_phase: EndpointSpec,
    pub crack_detection: EndpointSpec,
    pub particle_count: EndpointSpec,
    pub strength_prediction: EndpointSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub version: u32,
    pub base_url: String,
    pub default_crack_threshold: f32,
    pub endpoints: Endpoints,
}

impl EndpointConfig {
    /// Loads the bundled `config/endpoints.yaml`, applying the
    /// `SMART_CEMENT_API_URL` build-time override when present.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::from_yaml(EMBEDDED_CONFIG)?;
        match option_env!("SMART_CEMENT_API_URL") {
            Some(base) if !base.trim().is_empty() => config.with_base_url(base),
            _ => Ok(config),
        }
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: EndpointConfig = serde_yaml::from_str(source)?;
        normalize_base_url(&config.base_url)?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        Ok(self)
    }

    pub fn spec(&self, endpoint: Endpoint) -> &EndpointSpec {
        match endpoint {
            Endpoint::ClinkerPhase => &self.endpoints.clinker_phase,
            Endpoint::CrackDetection => &self.endpoints.crack_detection,
            Endpoint::ParticleCount => &self.endpoints.particle_count,
            Endpoint::StrengthPrediction => &self.endpoints.strength_prediction,
        }
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        join_url(&self.base_url, &self.spec(endpoint).path)
    }

    pub fn fallback_url(&self, endpoint: Endpoint) -> Option<String> {
        self.spec(endpoint)
            .fallback_path
            .as_deref()
            .map(|path| join_url(&self.base_url, path))
    }

    pub fn file_field(&self, endpoint: Endpoint) -> &str {
        self.spec(endpoint).file_field.as_deref().unwrap_or("file")
    }

    /// Crack detection URL carrying the sensitivity threshold as a query
    /// parameter, which is where the segmentation service reads it from.
    pub fn crack_url(&self, threshold: f32) -> String {
        let raw = self.url(Endpoint::CrackDetection);
        match Url::parse(&raw) {
            Ok(mut url) => {
                url.query_pairs_mut()
                    .append_pair("threshold", &format_threshold(threshold));
                url.to_string()
            }
            Err(_) => raw,
        }
    }
}

pub fn format_threshold(threshold: f32) -> String {
    format!("{:.2}", threshold)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|_| ConfigError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }
}

/// User overrides persisted in browser storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub crack_threshold: f32,
    #[serde(default)]
    pub theme: Theme,
}

impl Settings {
    pub fn from_config(config: &EndpointConfig) -> Self {
        Self {
            api_base_url: config.base_url.clone(),
            crack_threshold: config.default_crack_threshold,
            theme: Theme::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_base_url(&self.api_base_url)?;
        if !(0.0..=1.0).contains(&self.crack_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.crack_threshold));
        }
        Ok(())
    }

    /// Endpoint map with the user's base URL applied.
    pub fn resolve(&self, config: &EndpointConfig) -> Result<EndpointConfig, ConfigError> {
        self.validate()?;
        config.clone().with_base_url(&self.api_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn bundled_config_covers_every_endpoint() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        for endpoint in Endpoint::iter() {
            assert!(config.url(endpoint).starts_with("http://localhost:8000/api/"));
        }
        assert_eq!(
            config.url(Endpoint::StrengthPrediction),
            "http://localhost:8000/api/hirumi/predict"
        );
        assert_eq!(
            config.fallback_url(Endpoint::ClinkerPhase).as_deref(),
            Some("http://localhost:8000/api/predict")
        );
        assert_eq!(config.fallback_url(Endpoint::ParticleCount), None);
        assert_eq!(config.file_field(Endpoint::CrackDetection), "file");
    }

    #[test]
    fn base_url_override_trims_trailing_slash() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG)
            .unwrap()
            .with_base_url("https://lab.example.org:9000/")
            .unwrap();
        assert_eq!(
            config.url(Endpoint::ParticleCount),
            "https://lab.example.org:9000/api/kanchana/predict"
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG).unwrap();
        assert!(matches!(
            config.clone().with_base_url("ftp://example.org"),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(config.with_base_url("localhost").is_err());
    }

    #[test]
    fn crack_url_carries_threshold_query() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG).unwrap();
        assert_eq!(
            config.crack_url(0.35),
            "http://localhost:8000/api/sanchitha/predict?threshold=0.35"
        );
    }

    #[test]
    fn settings_validate_threshold_range() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG).unwrap();
        let mut settings = Settings::from_config(&config);
        assert!(settings.validate().is_ok());
        settings.crack_threshold = 1.5;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ThresholdOutOfRange(_))
        ));
    }

    #[test]
    fn settings_resolve_applies_base_url() {
        let config = EndpointConfig::from_yaml(EMBEDDED_CONFIG).unwrap();
        let mut settings = Settings::from_config(&config);
        settings.api_base_url = "http://10.0.0.5:8000".into();
        let resolved = settings.resolve(&config).unwrap();
        assert_eq!(
            resolved.url(Endpoint::ClinkerPhase),
            "http://10.0.0.5:8000/api/chamudini/predict"
        );
    }

    #[test]
    fn endpoint_names_round_trip_through_strum() {
        use std::str::FromStr;
        let name: &'static str = Endpoint::CrackDetection.into();
        assert_eq!(name, "crack_detection");
        assert_eq!(
            Endpoint::from_str("particle_count").unwrap(),
            Endpoint::ParticleCount
        );
        assert!(!Endpoint::StrengthPrediction.accepts_image());
    }
}
