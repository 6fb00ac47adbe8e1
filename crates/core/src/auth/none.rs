use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Open gate for local development. Only reachable through an explicit
/// `auth.method = "none"`; there is no fallback to it.
#[derive(Debug, Default)]
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_ignores_authorization_header() {
        let auth = NoneAuthenticator::new();
        let request = AuthRequest {
            headers: HashMap::from([(
                "authorization".to_string(),
                "Bearer whatever".to_string(),
            )]),
            source_ip: "10.0.0.7".parse().unwrap(),
        };

        let identity = auth.authenticate(&request).await.unwrap();

        assert_eq!(identity, Identity::anonymous());
        assert_eq!(auth.method_name(), "none");
    }
}
