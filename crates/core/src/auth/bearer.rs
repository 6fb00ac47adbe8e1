//! Shared-secret bearer token authentication.

use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Authenticator that validates `Authorization: Bearer <secret>` against the
/// configured secret. The token must match exactly.
pub struct BearerAuthenticator {
    secret: String,
}

impl BearerAuthenticator {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Extract the token from the Authorization header.
    fn extract_token<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        let header = request.headers.get("authorization")?;
        header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = self
            .extract_token(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(token.as_bytes(), self.secret.as_bytes()) {
            Ok(Identity::bearer())
        } else {
            Err(AuthError::InvalidCredentials("Invalid bearer token".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "bearer"
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    fn make_request(headers: Vec<(&str, &str)>) -> AuthRequest {
        AuthRequest {
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.to_lowercase(), v.to_string()))
                .collect(),
            source_ip: "127.0.0.1".parse::<IpAddr>().unwrap(),
        }
    }

    #[tokio::test]
    async fn test_bearer_token_valid() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![("Authorization", "Bearer secret-key-123")]);

        let identity = auth.authenticate(&request).await.unwrap();

        assert_eq!(identity.user_id, "bearer_client");
        assert_eq!(identity.method, "bearer");
    }

    #[tokio::test]
    async fn test_bearer_lowercase_scheme() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![("Authorization", "bearer secret-key-123")]);

        assert!(auth.authenticate(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![("Authorization", "Bearer wrong-key")]);

        let result = auth.authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_token_is_not_trimmed() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![("Authorization", "Bearer secret-key-123 ")]);

        let result = auth.authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::InvalidCredentials(_))));
    }

    #[tokio::test]
    async fn test_missing_header() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![]);

        let result = auth.authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn test_other_scheme_is_not_authenticated() {
        let auth = BearerAuthenticator::new("secret-key-123".to_string());
        let request = make_request(vec![("Authorization", "Basic c2VjcmV0")]);

        let result = auth.authenticate(&request).await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_method_name() {
        let auth = BearerAuthenticator::new("test".to_string());
        assert_eq!(auth.method_name(), "bearer");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"hello", b"hell"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }
}
