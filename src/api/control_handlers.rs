use axum::{extract::State, Json};

use crate::api::handlers::AppState;
use crate::logic::{ScenarioRequest, ScenarioResponse};
use crate::store::PlanEntry;

/// Steer the next response of one route
pub async fn apply_scenario(
    State(engine): State<AppState>,
    Json(request): Json<ScenarioRequest>,
) -> Json<ScenarioResponse> {
    Json(engine.apply_scenario(request))
}

/// List the current plan of every route
pub async fn list_plans(State(engine): State<AppState>) -> Json<Vec<PlanEntry>> {
    Json(engine.plan_snapshot())
}
