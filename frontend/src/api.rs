use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use shared::config::format_threshold;
use shared::prediction::parse_response;
use shared::{ApiError, Endpoint, EndpointConfig, Milestone, PredictionResult, StrengthInput};
use web_sys::FormData;
use yew::Callback;

/// Uploads `file` to an image endpoint and parses the reply.
///
/// The clinker service also answers on a legacy path, tried once when the
/// primary path is missing (404).
pub async fn predict_image(
    config: &EndpointConfig,
    endpoint: Endpoint,
    file: &GlooFile,
    threshold: f32,
    progress: Callback<Milestone>,
) -> Result<PredictionResult, ApiError> {
    let url = match endpoint {
        Endpoint::CrackDetection => config.crack_url(threshold),
        _ => config.url(endpoint),
    };
    let field = config.file_field(endpoint);

    progress.emit(Milestone::Sending);
    log::info!("Uploading {} to {}", file.name(), url);
    let mut response = send_multipart(&url, field, file, endpoint, threshold).await?;

    if response.status() == 404 {
        if let Some(fallback) = config.fallback_url(endpoint) {
            log::warn!("{} returned 404, retrying at {}", url, fallback);
            response = send_multipart(&fallback, field, file, endpoint, threshold).await?;
        }
    }

    progress.emit(Milestone::InFlight);
    read_prediction(endpoint, response, &progress).await
}

pub async fn predict_strength(
    config: &EndpointConfig,
    input: &StrengthInput,
) -> Result<PredictionResult, ApiError> {
    let url = config.url(Endpoint::StrengthPrediction);
    log::info!("Requesting strength prediction from {}", url);

    let request = Request::post(&url)
        .json(input)
        .map_err(|e| ApiError::Request(e.to_string()))?;
    let response = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    read_prediction(Endpoint::StrengthPrediction, response, &Callback::noop()).await
}

async fn send_multipart(
    url: &str,
    field: &str,
    file: &GlooFile,
    endpoint: Endpoint,
    threshold: f32,
) -> Result<Response, ApiError> {
    let form_data = FormData::new().map_err(|e| ApiError::Request(format!("{:?}", e)))?;
    form_data
        .append_with_blob_and_filename(field, file.as_ref(), &file.name())
        .map_err(|e| ApiError::Request(format!("{:?}", e)))?;
    if endpoint == Endpoint::CrackDetection {
        form_data
            .append_with_str("threshold", &format_threshold(threshold))
            .map_err(|e| ApiError::Request(format!("{:?}", e)))?;
    }

    let request = Request::post(url)
        .body(form_data)
        .map_err(|e| ApiError::Request(e.to_string()))?;

    request.send().await.map_err(|e| {
        log::error!("Network error calling {}: {}", url, e);
        ApiError::Network(e.to_string())
    })
}

async fn read_prediction(
    endpoint: Endpoint,
    response: Response,
    progress: &Callback<Milestone>,
) -> Result<PredictionResult, ApiError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !response.ok() {
        log::error!("{} failed with status {}", endpoint, status);
        return Err(ApiError::from_status(status, &body));
    }

    progress.emit(Milestone::Parsing);
    let result = parse_response(endpoint, &body);
    if let Err(e) = &result {
        log::error!("{} returned an unusable body: {}", endpoint, e);
    }
    result
}
