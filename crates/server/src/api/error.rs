//! Mapping of conversion failures onto HTTP responses.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use opusgate_core::ConversionError;
use serde::Serialize;

/// JSON error body used by the auth gate.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body sent when a remote input cannot be downloaded.
pub const DOWNLOAD_FAILED: &str = "Failed to download or convert the file.";

/// Failure of a conversion route. Bodies are plain text.
#[derive(Debug)]
pub enum ApiError {
    Conversion(ConversionError),
    /// The multipart body could not be read (truncated, over the size limit).
    Upload(MultipartError),
}

impl From<ConversionError> for ApiError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Upload(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Conversion(ConversionError::MissingInput(_)) => StatusCode::BAD_REQUEST,
            Self::Conversion(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upload(e) => e.status(),
        }
    }

    fn body(&self) -> String {
        match self {
            Self::Conversion(ConversionError::Acquisition(_)) => DOWNLOAD_FAILED.to_string(),
            Self::Conversion(e) => e.to_string(),
            Self::Upload(e) => e.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.body()).into_response()
    }
}

pub fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use opusgate_core::{AcquireError, InputKind, TranscodeError};

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_missing_input_is_bad_request() {
        let response =
            ApiError::from(ConversionError::MissingInput(InputKind::Upload)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No file uploaded.");
    }

    #[tokio::test]
    async fn test_acquisition_failure_hides_details() {
        let err = ConversionError::Acquisition(AcquireError::Status {
            url: "http://internal.example/a.mp3".to_string(),
            status: 404,
        });
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, DOWNLOAD_FAILED);
    }

    #[tokio::test]
    async fn test_transcode_failure_passes_reason() {
        let err = ConversionError::Transcode(TranscodeError::failed(
            "ffmpeg exited with code 1: Invalid data found when processing input",
        ));
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "ffmpeg exited with code 1: Invalid data found when processing input"
        );
    }

    #[tokio::test]
    async fn test_unauthorized_is_json() {
        let response = unauthorized("Missing bearer token");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["error"], "Missing bearer token");
    }
}
