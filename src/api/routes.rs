use axum::{
    extract::{Request, State},
    http::Method,
    middleware::{self, Next},
    response::Response,
    routing::{post, MethodFilter, MethodRouter},
    Router,
};
use itertools::Itertools;
use log::{info, warn};
use std::sync::Arc;

use crate::api::{control_handlers, handlers, AcceptHeader, AppState};
use crate::logic::MockEngine;
use crate::model::route_pattern;

/// Build the control endpoint plus one mock route per described operation.
///
/// Operations sharing a path template share a method router.
pub fn create_router(engine: &MockEngine) -> Router<AppState> {
    let mut router = Router::new().route(
        engine.control_path(),
        post(control_handlers::apply_scenario).get(control_handlers::list_plans),
    );

    let by_pattern = engine
        .operations()
        .iter()
        .filter_map(|operation| route_pattern(&operation.path).map(|pattern| (pattern, operation)))
        .into_group_map();

    for (pattern, operations) in by_pattern.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)) {
        let mut method_router = MethodRouter::new();
        for operation in operations {
            let Some(filter) = method_filter(operation.key.method()) else {
                warn!("{} uses an unsupported HTTP method, not mocking it", operation.key);
                continue;
            };
            info!("Mocking {}", operation.key);
            let operation = Arc::clone(operation);
            method_router = method_router.on(
                filter,
                move |state: State<AppState>, accept: AcceptHeader| {
                    handlers::mock_response(state, accept, Arc::clone(&operation))
                },
            );
        }
        router = router.route(&pattern, method_router);
    }

    router
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(log_request))
}

fn method_filter(method: &str) -> Option<MethodFilter> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes()).ok()?;
    MethodFilter::try_from(method).ok()
}

/// Access log line per request
async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let response = next.run(request).await;
    info!("{} {} -> {}", method, uri, response.status().as_u16());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::FixedSampler;
    use crate::model::Description;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let description: Description = serde_json::from_value(json!({
            "resources": [{
                "relativeUri": "/widgets",
                "methods": [
                    {"method": "get", "responses": {"200": {"body": {
                        "application/json": {"examples": [
                            {"name": "empty", "structuredValue": {"items": []}},
                            {"name": "full", "structuredValue": {"items": [1, 2]}}
                        ]},
                        "application/xml": {"properties": [{"name": "format", "enum": ["xml"]}]}
                    }}}},
                    {"method": "delete"}
                ],
                "resources": [{
                    "relativeUri": "/{id}",
                    "methods": [{"method": "put", "responses": {"204": {}}}]
                }]
            }, {
                "relativeUri": "/ramlizer",
                "methods": [{"method": "get", "responses": {"200": {}}}]
            }]
        }))
        .unwrap();

        let mut engine = MockEngine::new(Arc::new(FixedSampler(0)), "/ramlizer");
        engine.load("test", &description);
        let engine = Arc::new(engine);
        create_router(&engine).with_state(engine)
    }

    async fn send(app: &Router, request: axum::http::Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn get(uri: &str, accept: Option<&str>) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn control(body: Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method("POST")
            .uri("/ramlizer")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_mock_route_serves_planned_response() {
        let app = app();
        let (status, body) = send(&app, get("/widgets", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"items": []}));

        let (status, body) = send(&app, get("/widgets", Some("application/xml"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"format": "xml"}));

        let (status, _) = send(&app, get("/widgets", Some("text/html"))).await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    }

    #[tokio::test]
    async fn test_control_pins_example() {
        let app = app();
        let (status, body) = send(
            &app,
            control(json!({"method": "GET", "route": "/widgets", "nextExampleName": "full"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            serde_json::from_slice::<Value>(&body).unwrap(),
            json!({"route": "/widgets", "nextExampleName": "full", "oldExampleName": "none"})
        );

        let (_, body) = send(&app, get("/widgets", None)).await;
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"items": [1, 2]}));
    }

    #[tokio::test]
    async fn test_stale_and_unplanned_routes_fail() {
        let app = app();
        send(&app, control(json!({"method": "get", "route": "/widgets", "nextResponseCode": "503"}))).await;
        let (status, body) = send(&app, get("/widgets", None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(serde_json::from_slice::<Value>(&body).unwrap()["error"].is_string());

        let request = axum::http::Request::builder()
            .method("DELETE")
            .uri("/widgets")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_nested_route_and_empty_body() {
        let app = app();
        let request = axum::http::Request::builder()
            .method("PUT")
            .uri("/widgets/42")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_control_endpoint_lists_plans_and_wins_collisions() {
        let app = app();
        let (status, body) = send(&app, get("/ramlizer", None)).await;
        assert_eq!(status, StatusCode::OK);
        let plans: Value = serde_json::from_slice(&body).unwrap();
        let plans = plans.as_array().unwrap();
        assert!(plans.contains(&json!({"route": "/widgets", "method": "get", "responseCode": "200"})));
        assert!(plans.iter().all(|plan| plan["route"] != json!("/ramlizer")));
    }

    #[tokio::test]
    async fn test_unknown_route_and_bad_control_body() {
        let app = app();
        let (status, _) = send(&app, get("/gadgets", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, control(json!({"route": "/widgets"}))).await;
        assert!(status.is_client_error());
    }
}
