use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::ACCEPT, request::Parts, HeaderMap},
};
use std::convert::Infallible;

/// The client's `Accept` header, if it sent a readable one.
///
/// Several `Accept` headers are joined into one list, which is equivalent for
/// negotiation purposes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptHeader(pub Option<String>);

impl AcceptHeader {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AcceptHeader
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AcceptHeader(extract_accept(&parts.headers)))
    }
}

fn extract_accept(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}
