use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;

use crate::api::AcceptHeader;
use crate::logic::{MockEngine, RenderError};
use crate::model::Operation;

pub type AppState = Arc<MockEngine>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

impl IntoResponse for RenderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        log::warn!("Render failed: {}", self);
        (status, Json(ErrorResponse::new(&self.to_string()))).into_response()
    }
}

/// Serve the planned response for one described operation
pub async fn mock_response(
    State(engine): State<AppState>,
    accept: AcceptHeader,
    operation: Arc<Operation>,
) -> Result<Response, RenderError> {
    let rendered = engine.render(&operation, accept.as_deref())?;

    let mut response = (rendered.status, rendered.body).into_response();
    match rendered.content_type {
        Some(content_type) => {
            if let Ok(value) = HeaderValue::from_str(&content_type) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
        }
        None => {
            response.headers_mut().remove(CONTENT_TYPE);
        }
    }
    Ok(response)
}

pub async fn not_found() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("No described resource matches this request")),
    )
}
