/// Bearer-token authentication
///
/// [`authenticate`] validates `Authorization: Bearer <access token>` and
/// yields the [`AuthContext`] the API server inserts into request extensions.
/// Handlers read the caller's id from there and nowhere else.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use taskquest_shared::auth::jwt::{create_token, Claims, TokenType};
/// use taskquest_shared::auth::middleware::authenticate;
///
/// let secret = "your-jwt-secret-at-least-32-bytes-long";
/// let token = create_token(&Claims::new(5, TokenType::Access), secret).unwrap();
///
/// let mut headers = HeaderMap::new();
/// let value = HeaderValue::from_str(&format!("Bearer {}", token)).unwrap();
/// headers.insert(header::AUTHORIZATION, value);
///
/// assert_eq!(authenticate(&headers, secret).unwrap().user_id, 5);
/// ```

use axum::http::{header, HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_access_token, JwtError};

/// Authenticated caller, added to request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Owner id applied to every query the request makes
    pub user_id: i64,
}

impl AuthContext {
    pub fn from_jwt(user_id: i64) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials | AuthError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            AuthError::InvalidFormat(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn message(&self) -> String {
        match self {
            AuthError::MissingCredentials => "Missing credentials".to_string(),
            AuthError::InvalidFormat(msg) | AuthError::InvalidToken(msg) => msg.clone(),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Extracts and validates the bearer token from request headers
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_access_token(token, secret)?;
    Ok(AuthContext::from_jwt(claims.sub))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::{create_token, Claims, TokenType};
    use axum::http::HeaderValue;

    const SECRET: &str = "middleware-test-secret-at-least-32-bytes";

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_authenticate_valid_token() {
        let token = create_token(&Claims::new(17, TokenType::Access), SECRET).unwrap();

        let context = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap();
        assert_eq!(context, AuthContext::from_jwt(17));
    }

    #[test]
    fn test_authenticate_missing_header() {
        let err = authenticate(&HeaderMap::new(), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials));
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_authenticate_wrong_scheme() {
        let err = authenticate(&headers_with("Basic dXNlcjpwYXNz"), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = authenticate(&headers_with("Bearer "), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidFormat(_)));
    }

    #[test]
    fn test_authenticate_rejects_refresh_token() {
        let token = create_token(&Claims::new(17, TokenType::Refresh), SECRET).unwrap();

        let err = authenticate(&headers_with(&format!("Bearer {}", token)), SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
    }

    #[test]
    fn test_authenticate_expired_token() {
        let claims = Claims::with_expiration(1, TokenType::Access, chrono::Duration::seconds(-60));
        let token = create_token(&claims, SECRET).unwrap();

        match authenticate(&headers_with(&format!("Bearer {}", token)), SECRET) {
            Err(AuthError::InvalidToken(msg)) => assert_eq!(msg, "Token expired"),
            other => panic!("expected expired token error, got {:?}", other),
        }
    }

    #[test]
    fn test_auth_error_messages() {
        assert_eq!(AuthError::MissingCredentials.message(), "Missing credentials");
        assert_eq!(
            AuthError::InvalidToken("Token expired".to_string()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidFormat("Expected Bearer token".to_string()).message(),
            "Expected Bearer token"
        );
    }
}
