mod bearer;
mod none;
mod traits;
mod types;

pub use bearer::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::Bearer => {
            let secret = config
                .secret
                .clone()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "secret must be set when using bearer auth".to_string(),
                    )
                })?;
            Ok(Box::new(BearerAuthenticator::new(secret)))
        }
    }
}
