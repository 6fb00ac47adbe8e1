//! Conversion routes: `POST /convert` and `POST /convert-url`.

use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use opusgate_core::{
    ConversionError, ConversionRequest, ConvertUrlResponse, ConvertedAudio, InputKind,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::ApiError;
use super::middleware::AuthUser;
use crate::metrics::{CONVERSIONS_TOTAL, TRANSCODE_DURATION};
use crate::state::AppState;

/// Multipart field carrying the audio file.
pub const AUDIO_FIELD: &str = "audio";

#[derive(Debug, Deserialize)]
pub struct ConvertUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// POST /convert
///
/// A body that is not multipart, or has no `audio` field, counts as a
/// missing upload.
pub async fn convert(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let request = match multipart {
        Ok(multipart) => read_upload(multipart).await?,
        Err(rejection) => {
            warn!(error = %rejection, "Request body is not multipart");
            None
        }
    };

    let Some(request) = request else {
        info!(%user, "No file uploaded");
        return Err(missing(InputKind::Upload));
    };

    let converted = run(&state, request).await?;
    stream_response(converted).await
}

/// POST /convert-url
///
/// The body is parsed leniently: anything that is not a JSON object with a
/// non-blank string `url` counts as a missing URL.
pub async fn convert_url(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<Response, ApiError> {
    let url = serde_json::from_slice::<ConvertUrlRequest>(&body)
        .ok()
        .and_then(|r| r.url);

    let Some(request) = ConversionRequest::from_url(url) else {
        info!(%user, "No URL provided");
        return Err(missing(InputKind::Url));
    };

    let converted = run(&state, request).await?;
    match state.config().convert_url.response {
        ConvertUrlResponse::Stream => stream_response(converted).await,
        ConvertUrlResponse::Metadata => {
            // The file is deleted when `converted` drops at the end of scope.
            Ok(Json(converted.metadata()).into_response())
        }
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<Option<ConversionRequest>, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(|s| s.to_string());
        let bytes = field.bytes().await?;
        return Ok(ConversionRequest::from_upload(Some(bytes), file_name));
    }
    Ok(None)
}

fn missing(kind: InputKind) -> ApiError {
    CONVERSIONS_TOTAL
        .with_label_values(&[kind.as_str(), "missing_input"])
        .inc();
    ApiError::from(ConversionError::MissingInput(kind))
}

async fn run(state: &AppState, request: ConversionRequest) -> Result<ConvertedAudio, ApiError> {
    let source = request.kind().as_str();

    match state.conversions().convert(request).await {
        Ok(converted) => {
            CONVERSIONS_TOTAL.with_label_values(&[source, "success"]).inc();
            TRANSCODE_DURATION
                .with_label_values(&[source])
                .observe(converted.report.duration_ms as f64 / 1000.0);
            Ok(converted)
        }
        Err(e) => {
            CONVERSIONS_TOTAL.with_label_values(&[source, e.kind()]).inc();
            Err(e.into())
        }
    }
}

/// Body that streams the artifact and deletes it once the body is dropped.
async fn stream_response(converted: ConvertedAudio) -> Result<Response, ApiError> {
    let job_id = converted.job_id;
    let mime_type = converted.profile.mime_type;
    let file_name = converted.file_name().to_string();
    let size = converted.report.output_size_bytes;

    let stream = converted.into_stream().await.map_err(|e| {
        warn!(%job_id, error = %e, "Could not open converted file");
        ApiError::from(ConversionError::Io(e))
    })?;

    info!(%job_id, artifact = %file_name, size_bytes = size, "Streaming converted file");

    Ok((
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
