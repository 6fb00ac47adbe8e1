//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process router
//! with mock dependencies injected, so conversion routes can be exercised
//! without ffmpeg or network access.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use opusgate_core::config::{
    AuthConfig, ConvertUrlConfig, FetchConfig, ServerConfig, TranscoderConfig,
};
use opusgate_core::testing::{MockFetcher, MockTranscoder};
use opusgate_core::{
    ArtifactStore, AuthMethod, Authenticator, BearerAuthenticator, Config, ConversionService,
    ConvertUrlResponse, FfmpegTranscoder, HttpFetcher, InputAcquirer, NoneAuthenticator,
    RemoteFetcher, Transcoder,
};
use opusgate_server::{create_router, AppState};

/// Bearer secret every fixture is configured with.
pub const SECRET: &str = "test-secret";

const BOUNDARY: &str = "opusgate-test-boundary";

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.upload("clip.wav", b"RIFF...").await;
///
///     assert_eq!(response.status, StatusCode::OK);
///     assert!(fixture.artifact_files().is_empty());
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    pub state: Arc<AppState>,
    /// Mock transcoder, used unless `real_ffmpeg` was requested
    pub transcoder: Arc<MockTranscoder>,
    /// Mock fetcher, used unless `real_fetcher` was requested
    pub fetcher: Arc<MockFetcher>,
    /// Where artifacts are written
    pub artifact_dir: PathBuf,
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub auth_method: AuthMethod,
    pub convert_url_response: ConvertUrlResponse,
    pub max_upload_bytes: usize,
    /// Run the real ffmpeg instead of the mock transcoder
    pub real_ffmpeg: bool,
    /// Fetch URLs over the network instead of from the mock
    pub real_fetcher: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::Bearer,
            convert_url_response: ConvertUrlResponse::Stream,
            max_upload_bytes: 16 * 1024 * 1024,
            real_ffmpeg: false,
            real_fetcher: false,
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default mocks.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let artifact_dir = temp_dir.path().join("artifacts");

        let config = Config {
            auth: AuthConfig {
                method: test_config.auth_method,
                secret: Some(SECRET.to_string()),
            },
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 5000, // Not used for in-process testing
                max_upload_bytes: test_config.max_upload_bytes,
            },
            transcoder: TranscoderConfig::default().with_artifact_dir(artifact_dir.clone()),
            fetch: FetchConfig::default(),
            convert_url: ConvertUrlConfig {
                response: test_config.convert_url_response,
            },
        };

        let authenticator: Arc<dyn Authenticator> = match test_config.auth_method {
            AuthMethod::None => Arc::new(NoneAuthenticator::new()),
            AuthMethod::Bearer => Arc::new(BearerAuthenticator::new(SECRET.to_string())),
        };

        let transcoder = Arc::new(MockTranscoder::new());
        let fetcher = Arc::new(MockFetcher::new());

        let active_transcoder: Arc<dyn Transcoder> = if test_config.real_ffmpeg {
            Arc::new(FfmpegTranscoder::new(config.transcoder.clone()))
        } else {
            transcoder.clone()
        };
        let active_fetcher: Arc<dyn RemoteFetcher> = if test_config.real_fetcher {
            Arc::new(HttpFetcher::new(&config.fetch).expect("Failed to build HTTP client"))
        } else {
            fetcher.clone()
        };

        let artifacts = ArtifactStore::new(artifact_dir.clone(), "opus");
        artifacts
            .ensure_dir()
            .await
            .expect("Failed to create artifact dir");

        let conversions = ConversionService::new(
            InputAcquirer::new(active_fetcher),
            active_transcoder,
            artifacts,
        );

        let state = Arc::new(AppState::new(config, authenticator, conversions));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            transcoder,
            fetcher,
            artifact_dir,
            temp_dir,
        }
    }

    /// Files currently in the artifact directory.
    pub fn artifact_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(&self.artifact_dir)
            .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
            .unwrap_or_default()
    }

    /// Send a GET request without credentials.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Upload `bytes` as the `audio` field, with the valid bearer token.
    pub async fn upload(&self, file_name: &str, bytes: &[u8]) -> TestResponse {
        self.send(self.multipart_request("audio", file_name, bytes, Some(SECRET)))
            .await
    }

    /// Send a multipart body with a single field.
    pub fn multipart_request(
        &self,
        field: &str,
        file_name: &str,
        bytes: &[u8],
        token: Option<&str>,
    ) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let mut builder = Request::builder()
            .method("POST")
            .uri("/convert")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body)).unwrap()
    }

    /// POST a JSON body to `/convert-url` with the valid bearer token.
    pub async fn convert_url(&self, body: Value) -> TestResponse {
        self.send(self.json_request("/convert-url", &body.to_string(), Some(SECRET)))
            .await
    }

    pub fn json_request(&self, path: &str, body: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Send a request and collect the whole body.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status,
            $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text()
        );
    };
}
