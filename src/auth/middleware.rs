//! Authentication middleware
//!
//! Extracts the bearer credential from the `Authorization: Token <key>`
//! header and resolves it to a member. A request without a credential stays
//! anonymous here; endpoints that require identity reject it at extraction
//! time. A presented-but-invalid credential always fails outright.

use crate::core::error::{ChatError, Result};
use crate::db::models::{Member, MemberToken};
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The scheme keyword expected in the Authorization header
const KEYWORD: &str = "Token";

/// Authenticated identity stored in request extensions
#[derive(Clone, Debug)]
pub struct AuthMember {
    pub member: Member,
    pub token: MemberToken,
}

/// Parse the Authorization header into a token key
///
/// Returns `Ok(None)` when no credential of ours is offered (absent header
/// or a different scheme), `Err` when a credential is offered but malformed.
fn parse_token_key(header: Option<&HeaderValue>) -> Result<Option<String>> {
    let Some(value) = header else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| {
        ChatError::AuthenticationError(
            "Invalid token header. Token string should not contain invalid characters."
                .to_string(),
        )
    })?;

    let parts: Vec<&str> = value.split_whitespace().collect();

    match parts.as_slice() {
        [] => Ok(None),
        [scheme, rest @ ..] if scheme.eq_ignore_ascii_case(KEYWORD) => match rest {
            [] => Err(ChatError::AuthenticationError(
                "Invalid token header. No credentials provided.".to_string(),
            )),
            [key] => Ok(Some((*key).to_string())),
            _ => Err(ChatError::AuthenticationError(
                "Invalid token header. Token string should not contain spaces.".to_string(),
            )),
        },
        // Some other scheme's credential; not ours to judge
        _ => Ok(None),
    }
}

/// Authentication middleware
///
/// Applied to every API route. Valid credentials attach an [`AuthMember`]
/// extension; absent credentials pass through anonymously.
pub async fn authenticate(
    State(state): State<crate::api::handlers::AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let key = match parse_token_key(request.headers().get(header::AUTHORIZATION)) {
        Ok(Some(key)) => key,
        Ok(None) => return next.run(request).await,
        Err(e) => return e.into_response(),
    };

    let resolved = match state.token_repo.resolve(&key).await {
        Ok(resolved) => resolved,
        Err(e) => return e.into_response(),
    };

    let Some((member, token)) = resolved else {
        return ChatError::AuthenticationError("Invalid token.".to_string()).into_response();
    };

    tracing::debug!(member_id = %member.id, username = %member.username, "Request authenticated");

    request.extensions_mut().insert(AuthMember { member, token });
    next.run(request).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthMember
where
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts.extensions.get::<AuthMember>().cloned().ok_or_else(|| {
            ChatError::AuthenticationError(
                "Authentication credentials were not provided.".to_string(),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(value: &str) -> HeaderValue {
        HeaderValue::from_str(value).unwrap()
    }

    #[test]
    fn test_absent_header_is_anonymous() {
        assert_eq!(parse_token_key(None).unwrap(), None);
    }

    #[test]
    fn test_other_scheme_is_anonymous() {
        let value = header("Bearer abc123");
        assert_eq!(parse_token_key(Some(&value)).unwrap(), None);
    }

    #[test]
    fn test_scheme_is_case_insensitive() {
        for raw in ["Token abc123", "token abc123", "TOKEN abc123"] {
            let value = header(raw);
            assert_eq!(
                parse_token_key(Some(&value)).unwrap(),
                Some("abc123".to_string())
            );
        }
    }

    #[test]
    fn test_missing_key_fails() {
        let value = header("Token");
        let err = parse_token_key(Some(&value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid token header. No credentials provided."
        );
    }

    #[test]
    fn test_extra_segments_fail() {
        let value = header("Token abc 123");
        let err = parse_token_key(Some(&value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid token header. Token string should not contain spaces."
        );
    }

    #[test]
    fn test_invalid_characters_fail() {
        let value = HeaderValue::from_bytes(b"Token \xff\xfe").unwrap();
        let err = parse_token_key(Some(&value)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid token header. Token string should not contain invalid characters."
        );
    }

    #[test]
    fn test_empty_header_is_anonymous() {
        let value = header("");
        assert_eq!(parse_token_key(Some(&value)).unwrap(), None);
    }
}
