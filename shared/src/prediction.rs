use crate::config::Endpoint;
use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `POST /api/chamudini/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinkerPrediction {
    pub predicted_class: String,
    pub confidence: f64,
    pub all_probabilities: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackMetrics {
    pub has_crack: bool,
    pub crack_percentage: f64,
    pub crack_pixels: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pixels: Option<u64>,
}

/// `POST /api/sanchitha/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrackDetection {
    pub message: String,
    pub metrics: CrackMetrics,
    pub mask_base64: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParticleCounts {
    pub dark_red: u32,
    pub light_red: u32,
    pub white: u32,
}

impl ParticleCounts {
    /// Widened so three server-supplied `u32` counts cannot overflow.
    pub fn total(&self) -> u64 {
        u64::from(self.dark_red) + u64::from(self.light_red) + u64::from(self.white)
    }
}

/// `POST /api/kanchana/predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleAnalysis {
    pub counts: ParticleCounts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// JSON body of `POST /api/hirumi/predict`. Field names are the wire names.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StrengthInput {
    pub initial_min: f64,
    pub final_min: f64,
    pub residue_45um: f64,
    pub fineness: f64,
    pub loi: f64,
    pub sio2: f64,
    pub al2o3: f64,
    pub fe2o3: f64,
    pub cao: f64,
    pub mgo: f64,
    pub so3: f64,
    pub k2o: f64,
    pub na2o: f64,
    pub cl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthPredictions {
    pub strength_1d: f64,
    pub strength_2d: f64,
    pub strength_7d: f64,
    pub strength_28d: f64,
    pub strength_56d: f64,
    pub model_used: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrengthResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub predictions: StrengthPredictions,
    #[serde(default)]
    pub engineered_features_count: u32,
}

/// One received prediction, tagged by the service that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PredictionResult {
    ClinkerPhase(ClinkerPrediction),
    CrackDetection(CrackDetection),
    ParticleCount(ParticleAnalysis),
    StrengthPrediction(StrengthResponse),
}

impl PredictionResult {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            PredictionResult::ClinkerPhase(_) => Endpoint::ClinkerPhase,
            PredictionResult::CrackDetection(_) => Endpoint::CrackDetection,
            PredictionResult::ParticleCount(_) => Endpoint::ParticleCount,
            PredictionResult::StrengthPrediction(_) => Endpoint::StrengthPrediction,
        }
    }

    /// The response body as the service sent it, without the kind tag.
    pub fn raw_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            PredictionResult::ClinkerPhase(inner) => serde_json::to_value(inner),
            PredictionResult::CrackDetection(inner) => serde_json::to_value(inner),
            PredictionResult::ParticleCount(inner) => serde_json::to_value(inner),
            PredictionResult::StrengthPrediction(inner) => serde_json::to_value(inner),
        }
    }
}

/// Parses a 2xx body for `endpoint`.
///
/// A body that is not JSON is a `Parse` error; JSON missing the keys the
/// renderer needs is `Malformed`, so the page shows an explicit error
/// instead of a result card full of placeholders.
pub fn parse_response(endpoint: Endpoint, body: &str) -> Result<PredictionResult, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))?;

    let result = match endpoint {
        Endpoint::ClinkerPhase => PredictionResult::ClinkerPhase(shape(endpoint, value)?),
        Endpoint::CrackDetection => PredictionResult::CrackDetection(shape(endpoint, value)?),
        Endpoint::ParticleCount => PredictionResult::ParticleCount(shape(endpoint, value)?),
        Endpoint::StrengthPrediction => {
            let response: StrengthResponse = shape(endpoint, value)?;
            if !response.success {
                return Err(ApiError::Rejected(response.message.unwrap_or_else(|| {
                    "The strength model could not produce a prediction".to_string()
                })));
            }
            PredictionResult::StrengthPrediction(response)
        }
    };

    Ok(result)
}

fn shape<T: DeserializeOwned>(endpoint: Endpoint, value: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed {
        endpoint,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clinker_response() {
        let body = r#"{
            "success": true,
            "predicted_class": "C3S",
            "confidence": 0.8731,
            "all_probabilities": {"C2S": 0.05, "C3A": 0.04, "C3S": 0.8731, "C4AF": 0.0369},
            "processing_time_ms": 143.2
        }"#;
        let result = parse_response(Endpoint::ClinkerPhase, body).unwrap();
        let PredictionResult::ClinkerPhase(clinker) = result else {
            panic!("wrong variant");
        };
        assert_eq!(clinker.predicted_class, "C3S");
        assert_eq!(clinker.all_probabilities.len(), 4);
        assert_eq!(clinker.processing_time_ms, Some(143.2));
        assert_eq!(clinker.timestamp, None);
    }

    #[test]
    fn parses_crack_response_with_extra_fields() {
        let body = r#"{
            "success": true,
            "message": "Crack detected",
            "metrics": {"has_crack": true, "crack_percentage": 2.41, "crack_pixels": 1580, "total_pixels": 65536},
            "mask_base64": "iVBORw0KGgo=",
            "original_size": [640, 480],
            "threshold": 0.5,
            "filename": "slab.png"
        }"#;
        let PredictionResult::CrackDetection(crack) =
            parse_response(Endpoint::CrackDetection, body).unwrap()
        else {
            panic!("wrong variant");
        };
        assert!(crack.metrics.has_crack);
        assert_eq!(crack.metrics.total_pixels, Some(65536));
        assert_eq!(crack.filename.as_deref(), Some("slab.png"));
    }

    #[test]
    fn parses_particle_counts() {
        let body = r#"{"filename":"meal.jpg","counts":{"dark_red":12,"light_red":30,"white":8}}"#;
        let PredictionResult::ParticleCount(particles) =
            parse_response(Endpoint::ParticleCount, body).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(particles.counts.total(), 50);
    }

    #[test]
    fn particle_total_does_not_overflow() {
        let body = r#"{"counts":{"dark_red":4294967295,"light_red":1,"white":0}}"#;
        let PredictionResult::ParticleCount(particles) =
            parse_response(Endpoint::ParticleCount, body).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(particles.counts.total(), 4_294_967_296);
    }

    #[test]
    fn missing_keys_are_malformed_not_defaulted() {
        let err = parse_response(Endpoint::ParticleCount, r#"{"counts":{"dark_red":1}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Malformed {
                endpoint: Endpoint::ParticleCount,
                ..
            }
        ));

        let err = parse_response(Endpoint::ClinkerPhase, r#"{"confidence":0.9}"#).unwrap_err();
        assert!(matches!(err, ApiError::Malformed { .. }));
    }

    #[test]
    fn non_json_body_is_a_parse_error() {
        let err = parse_response(Endpoint::CrackDetection, "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn unsuccessful_strength_response_is_rejected() {
        let body = r#"{
            "success": false,
            "message": "Models not loaded",
            "predictions": {"strength_1d":0,"strength_2d":0,"strength_7d":0,"strength_28d":0,"strength_56d":0,"model_used":"none"}
        }"#;
        assert_eq!(
            parse_response(Endpoint::StrengthPrediction, body),
            Err(ApiError::Rejected("Models not loaded".into()))
        );
    }

    #[test]
    fn raw_json_drops_the_kind_tag() {
        let result = PredictionResult::ParticleCount(ParticleAnalysis {
            counts: ParticleCounts {
                dark_red: 1,
                light_red: 2,
                white: 3,
            },
            filename: None,
        });
        let raw = result.raw_json().unwrap();
        assert_eq!(raw["counts"]["white"], 3);
        assert!(raw.get("kind").is_none());

        let tagged = serde_json::to_value(&result).unwrap();
        assert_eq!(tagged["kind"], "particle_count");
    }

    #[test]
    fn strength_input_uses_wire_names() {
        let json = serde_json::to_value(StrengthInput::default()).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 14);
        for key in ["initial_min", "residue_45um", "al2o3", "na2o", "cl"] {
            assert!(object.contains_key(key), "missing {key}");
        }
    }
}
