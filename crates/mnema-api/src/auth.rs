//! Bearer-token authentication against the opaque identity store.

use axum::http::{header, HeaderMap};
use uuid::Uuid;

use mnema_core::{Error, Result, TokenRepository};
use mnema_db::{hash_token, Database};

/// Pull the bearer token out of an Authorization header value.
fn parse_bearer(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the calling user from the request headers.
pub async fn bearer_user_id(db: &Database, headers: &HeaderMap) -> Result<Uuid> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| Error::Unauthorized("No authorization header".to_string()))?;

    let token = parse_bearer(value)
        .ok_or_else(|| Error::Unauthorized("Malformed authorization header".to_string()))?;

    db.tokens
        .resolve(&hash_token(token))
        .await?
        .ok_or_else(|| Error::Unauthorized("Invalid authentication".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123"));
        assert_eq!(parse_bearer("Bearer   abc123  "), Some("abc123"));
        assert_eq!(parse_bearer("Basic abc123"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer(""), None);
    }
}
