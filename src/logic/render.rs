use axum::http::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::logic::negotiate::negotiate;
use crate::logic::sampling::{choose, Sampler};
use crate::model::{BodySchema, Example, Operation, Property, RouteKey};
use crate::store::PlanStore;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no response has been planned for {0}")]
    NotPlanned(RouteKey),

    #[error("planned response code '{code}' is not defined for {key}")]
    StalePlan { key: RouteKey, code: String },

    #[error("planned response code '{code}' for {key} is not a valid HTTP status")]
    InvalidStatus { key: RouteKey, code: String },

    #[error("none of the content types offered by {key} ({offered}) are acceptable")]
    NotAcceptable { key: RouteKey, offered: String },

    #[error("response '{code}' of {key} has neither examples nor properties for {content_type}")]
    EmptyBodySchema {
        key: RouteKey,
        code: String,
        content_type: String,
    },

    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl RenderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RenderError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A mock response ready to be written to the wire
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    pub status: StatusCode,
    /// Negotiated media type; `None` when the planned response defines no body
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// Render the currently planned response for `operation`.
///
/// Named examples are preferred when the plan pins one that exists; otherwise
/// an example is picked at random. Bodies that only declare properties are
/// synthesized with empty strings, or a random enum member where one is
/// declared.
pub fn render(
    operation: &Operation,
    accept: Option<&str>,
    store: &PlanStore,
    sampler: &dyn Sampler,
) -> Result<RenderedResponse, RenderError> {
    let key = &operation.key;

    let code = store
        .get_planned_code(key)
        .ok_or_else(|| RenderError::NotPlanned(key.clone()))?;

    let response = operation
        .method
        .response(&code)
        .ok_or_else(|| RenderError::StalePlan {
            key: key.clone(),
            code: code.clone(),
        })?;

    let status = StatusCode::from_bytes(code.as_bytes()).map_err(|_| RenderError::InvalidStatus {
        key: key.clone(),
        code: code.clone(),
    })?;

    if response.body.is_empty() {
        return Ok(RenderedResponse {
            status,
            content_type: None,
            body: Vec::new(),
        });
    }

    let content_type = negotiate(accept, response.body.keys().map(String::as_str)).ok_or_else(|| {
        RenderError::NotAcceptable {
            key: key.clone(),
            offered: response.body.keys().cloned().collect::<Vec<_>>().join(", "),
        }
    })?;

    let payload = match &response.body[content_type] {
        BodySchema::Examples(examples) => {
            let planned = store.get_planned_example_name(key);
            select_example(examples, planned.as_deref(), sampler)
                .map(|example| example.structured_value.clone())
                .unwrap_or(Value::Null)
        }
        BodySchema::Properties(properties) => synthesize(properties, sampler),
        BodySchema::Empty => {
            return Err(RenderError::EmptyBodySchema {
                key: key.clone(),
                code,
                content_type: content_type.to_string(),
            })
        }
    };

    Ok(RenderedResponse {
        status,
        content_type: Some(content_type.to_string()),
        body: serde_json::to_vec(&payload)?,
    })
}

/// The example named `planned`, or a random one when that name is unknown
fn select_example<'a>(
    examples: &'a [Example],
    planned: Option<&str>,
    sampler: &dyn Sampler,
) -> Option<&'a Example> {
    planned
        .and_then(|name| {
            examples
                .iter()
                .find(|example| example.name.as_deref() == Some(name))
        })
        .or_else(|| choose(sampler, examples))
}

fn synthesize(properties: &[Property], sampler: &dyn Sampler) -> Value {
    let object: Map<String, Value> = properties
        .iter()
        .map(|property| {
            let value = property
                .allowed_values
                .as_deref()
                .and_then(|allowed| choose(sampler, allowed))
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            (property.name.clone(), value)
        })
        .collect();
    Value::Object(object)
}
