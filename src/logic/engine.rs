use std::collections::HashSet;
use std::sync::Arc;

use log::warn;

use crate::logic::control::{apply_scenario, ScenarioRequest, ScenarioResponse};
use crate::logic::initialize::{initialize_plans, InitReport};
use crate::logic::render::{render, RenderError, RenderedResponse};
use crate::logic::sampling::Sampler;
use crate::model::{route_pattern, Description, Operation};
use crate::store::{PlanEntry, PlanStore};

/// Owns the plan store and the operations of every loaded description.
///
/// Descriptions are loaded before serving; afterwards the engine is shared
/// read-only between request handlers and only the plan store mutates.
pub struct MockEngine {
    plans: PlanStore,
    sampler: Arc<dyn Sampler>,
    control_path: String,
    operations: Vec<Arc<Operation>>,
    registered: HashSet<(String, String)>,
}

impl MockEngine {
    /// `control_path` is the route of the control endpoint, e.g. `/ramlizer`;
    /// described operations on that route are never mocked.
    pub fn new(sampler: Arc<dyn Sampler>, control_path: impl Into<String>) -> Self {
        Self {
            plans: PlanStore::new(),
            sampler,
            control_path: control_path.into(),
            operations: Vec::new(),
            registered: HashSet::new(),
        }
    }

    /// Register the operations of `description` and seed their plans.
    ///
    /// Operations whose path the router cannot express, that sit on the control
    /// endpoint, or that repeat a method and path shape already registered, are
    /// skipped.
    pub fn load(&mut self, source: &str, description: &Description) -> InitReport {
        let mut accepted = Vec::new();
        let mut rejected = 0;

        for operation in description.operations() {
            let Some(pattern) = route_pattern(&operation.path) else {
                warn!("{}: cannot route {}, skipping", source, operation.key);
                rejected += 1;
                continue;
            };
            if pattern.eq_ignore_ascii_case(&self.control_path) {
                warn!(
                    "{}: {} collides with the control endpoint, skipping",
                    source, operation.key
                );
                rejected += 1;
                continue;
            }
            let shape = (operation.key.method().to_string(), pattern);
            if !self.registered.insert(shape) {
                warn!("{}: {} is already defined, skipping", source, operation.key);
                rejected += 1;
                continue;
            }
            accepted.push(operation);
        }

        let mut report = initialize_plans(&accepted, &self.plans, self.sampler.as_ref());
        report.skipped += rejected;
        self.operations.extend(accepted.into_iter().map(Arc::new));
        report
    }

    pub fn control_path(&self) -> &str {
        &self.control_path
    }

    pub fn operations(&self) -> &[Arc<Operation>] {
        &self.operations
    }

    pub fn plans(&self) -> &PlanStore {
        &self.plans
    }

    pub fn render(
        &self,
        operation: &Operation,
        accept: Option<&str>,
    ) -> Result<RenderedResponse, RenderError> {
        render(operation, accept, &self.plans, self.sampler.as_ref())
    }

    pub fn apply_scenario(&self, request: ScenarioRequest) -> ScenarioResponse {
        apply_scenario(&self.plans, request)
    }

    pub fn plan_snapshot(&self) -> Vec<PlanEntry> {
        self.plans.snapshot()
    }
}
