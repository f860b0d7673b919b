//! Extract the caller identity from the request (`X-User-Id` header).

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};

/// Header carrying the opaque identity of the authenticated caller.
pub const CALLER_ID_HEADER: &str = "X-User-Id";

/// Caller identity supplied by the upstream authentication layer. Absent when the header is missing or blank.
#[derive(Clone, Debug)]
pub struct CallerId(pub Option<String>);

impl CallerId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(CALLER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        Ok(CallerId(value))
    }
}
