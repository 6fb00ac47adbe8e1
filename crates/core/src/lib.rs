pub mod acquire;
pub mod artifact;
pub mod auth;
pub mod config;
pub mod conversion;
pub mod testing;
pub mod transcoder;

pub use acquire::{
    AcquireError, ConversionRequest, HttpFetcher, InputAcquirer, InputKind, RemoteFetcher,
};
pub use artifact::{Artifact, ArtifactStore, ArtifactStream};
pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, BearerAuthenticator, Identity,
    NoneAuthenticator,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, AuthMethod, Config,
    ConfigError, ConvertUrlResponse, SanitizedConfig,
};
pub use conversion::{ArtifactMetadata, ConversionError, ConversionService, ConvertedAudio};
pub use transcoder::{EncodingProfile, FfmpegTranscoder, TranscodeError, Transcoder};
