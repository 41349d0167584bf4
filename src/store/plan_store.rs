use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;

use crate::model::RouteKey;

/// Reported as the previous value when a plan field had never been set.
pub const NO_PLAN: &str = "none";

/// Process-wide response plans, keyed by route.
///
/// The planned response code and the planned example name are independent
/// fields with last-write-wins semantics; neither is ever removed.
#[derive(Debug, Default)]
pub struct PlanStore {
    response_codes: RwLock<HashMap<RouteKey, String>>,
    example_names: RwLock<HashMap<RouteKey, String>>,
}

/// A read-only view of one route's plan
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub route: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example_name: Option<String>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_planned_code(&self, key: &RouteKey) -> Option<String> {
        self.response_codes.read().get(key).cloned()
    }

    /// Replace the planned response code, returning the previous one or [`NO_PLAN`]
    pub fn set_planned_code(&self, key: &RouteKey, code: impl Into<String>) -> String {
        swap(&self.response_codes, key, code.into())
    }

    pub fn get_planned_example_name(&self, key: &RouteKey) -> Option<String> {
        self.example_names.read().get(key).cloned()
    }

    /// Replace the planned example name, returning the previous one or [`NO_PLAN`]
    pub fn set_planned_example_name(&self, key: &RouteKey, name: impl Into<String>) -> String {
        swap(&self.example_names, key, name.into())
    }

    /// All routes with at least one planned field, ordered by key
    pub fn snapshot(&self) -> Vec<PlanEntry> {
        let codes = self.response_codes.read();
        let names = self.example_names.read();

        let mut keys: Vec<&RouteKey> = codes.keys().chain(names.keys()).collect();
        keys.sort();
        keys.dedup();

        keys.into_iter()
            .map(|key| PlanEntry {
                route: key.route().to_string(),
                method: key.method().to_string(),
                response_code: codes.get(key).cloned(),
                example_name: names.get(key).cloned(),
            })
            .collect()
    }
}

fn swap(map: &RwLock<HashMap<RouteKey, String>>, key: &RouteKey, value: String) -> String {
    map.write()
        .insert(key.clone(), value)
        .unwrap_or_else(|| NO_PLAN.to_string())
}
