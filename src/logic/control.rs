use serde::{Deserialize, Serialize};

use crate::model::{ResponseCode, RouteKey};
use crate::store::PlanStore;

/// Control-channel request steering what a route returns next.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioRequest {
    pub method: String,
    pub route: String,
    #[serde(default)]
    pub next_response_code: Option<ResponseCode>,
    #[serde(default)]
    pub next_example_name: Option<String>,
}

/// Echo of a scenario change; only fields that were updated are present.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioResponse {
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_example_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_example_name: Option<String>,
}

/// Overwrite the plan of one route.
///
/// Values are not checked against the description: an unknown code surfaces
/// on the next render as a stale plan, an unknown example name falls back to a
/// random example.
pub fn apply_scenario(store: &PlanStore, request: ScenarioRequest) -> ScenarioResponse {
    let key = RouteKey::new(&request.method, &request.route);
    let mut response = ScenarioResponse {
        route: request.route,
        ..Default::default()
    };

    if let Some(code) = request.next_response_code.filter(|code| !code.as_str().is_empty()) {
        let old = store.set_planned_code(&key, code.as_str());
        log::info!("{} will now answer '{}' (was '{}')", key, code, old);
        response.next_response_code = Some(code.as_str().to_string());
        response.old_response_code = Some(old);
    }

    if let Some(name) = request.next_example_name.filter(|name| !name.is_empty()) {
        let old = store.set_planned_example_name(&key, name.as_str());
        log::info!("{} will now prefer example '{}' (was '{}')", key, name, old);
        response.old_example_name = Some(old);
        response.next_example_name = Some(name);
    }

    response
}
