use itertools::Itertools;
use log::{info, warn};

use crate::logic::sampling::{choose, Sampler};
use crate::model::{BodySchema, Operation, ResponseCode};
use crate::store::PlanStore;

/// The response code planned by default whenever a method defines it.
pub const PREFERRED_CODE: &str = "200";

/// Outcome of seeding plans for a set of operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitReport {
    /// Distinct resource paths discovered
    pub resources: usize,
    pub planned: usize,
    pub skipped: usize,
}

/// Seed a default response code for every operation and log what was found.
///
/// Operations without responses are skipped and stay unplanned. Example names
/// are never seeded; they only come from control requests.
pub fn initialize_plans(
    operations: &[Operation],
    store: &PlanStore,
    sampler: &dyn Sampler,
) -> InitReport {
    let mut report = InitReport::default();

    // Operations of one resource are contiguous in document order
    let by_resource = operations.iter().chunk_by(|operation| operation.path.clone());
    for (path, resource_operations) in &by_resource {
        info!("Discovering strategies for: {}", path);
        report.resources += 1;

        for operation in resource_operations {
            let key = &operation.key;
            info!("{} has method {}", path, operation.method.method);

            if !operation.method.has_responses() {
                warn!("{} has no responses, skipping", key);
                report.skipped += 1;
                continue;
            }

            for (code, response) in operation.method.responses() {
                info!("{} will produce a '{}' response code", key, code);
                log_body_discovery(operation, code, response.body.iter());
            }

            let Some(selected) = select_code(operation, sampler) else {
                warn!("{} has no selectable response code, skipping", key);
                report.skipped += 1;
                continue;
            };

            info!("The first call to {} will receive a '{}' response", key, selected);
            store.set_planned_code(key, selected.as_str());
            report.planned += 1;
        }
    }

    report
}

/// Prefer `200`; otherwise pick uniformly among the defined codes
fn select_code(operation: &Operation, sampler: &dyn Sampler) -> Option<ResponseCode> {
    if operation.method.response(PREFERRED_CODE).is_some() {
        return Some(ResponseCode::new(PREFERRED_CODE));
    }
    let codes: Vec<&ResponseCode> = operation.method.responses().map(|(code, _)| code).collect();
    choose(sampler, &codes).map(|code| (*code).clone())
}

// Discovery only looks at the first content type; negotiation at render time
// still considers every one of them.
fn log_body_discovery<'a>(
    operation: &Operation,
    code: &ResponseCode,
    mut bodies: impl ExactSizeIterator<Item = (&'a String, &'a BodySchema)>,
) {
    let key = &operation.key;
    if bodies.len() > 1 {
        warn!("{} has multiple body types, picking the first", key);
    }

    match bodies.next() {
        None => warn!("{}:{} has no body, responses will be empty", key, code),
        Some((_, BodySchema::Examples(examples))) => {
            for example in examples {
                info!(
                    "{}:{} contains an example named '{}'",
                    key,
                    code,
                    example.name.as_deref().unwrap_or("<unnamed>")
                );
            }
        }
        Some((_, BodySchema::Properties(properties))) => {
            warn!(
                "{}:{} has no examples, bodies will be synthesized from {} properties",
                key,
                code,
                properties.len()
            );
        }
        Some((content_type, BodySchema::Empty)) => {
            warn!(
                "{}:{} has neither examples nor properties for {}, rendering it will fail",
                key, code, content_type
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::sampling::{FixedSampler, ThreadRngSampler};
    use crate::model::{Description, RouteKey};
    use serde_json::json;

    fn operations() -> Vec<Operation> {
        let description: Description = serde_json::from_value(json!({
            "resources": [
                {
                    "relativeUri": "/widgets",
                    "methods": [
                        {"method": "get", "responses": {
                            "404": {"body": {"application/json": {"properties": [{"name": "error"}]}}},
                            "200": {"body": {"application/json": {"examples": [
                                {"name": "empty", "structuredValue": []}
                            ]}}}
                        }},
                        {"method": "post", "responses": {
                            "201": {"body": {"application/json": {"properties": []}}},
                            "400": {"body": {"application/json": {}}},
                            "409": {}
                        }},
                        {"method": "delete"}
                    ]
                }
            ]
        }))
        .unwrap();
        description.operations()
    }

    #[test]
    fn test_prefers_200() {
        let store = PlanStore::new();
        for _ in 0..20 {
            initialize_plans(&operations(), &store, &ThreadRngSampler);
            assert_eq!(
                store.get_planned_code(&RouteKey::new("get", "/widgets")).as_deref(),
                Some("200")
            );
        }
    }

    #[test]
    fn test_samples_from_defined_codes_without_200() {
        let store = PlanStore::new();
        let key = RouteKey::new("post", "/widgets");
        for _ in 0..50 {
            initialize_plans(&operations(), &store, &ThreadRngSampler);
            let code = store.get_planned_code(&key).unwrap();
            assert!(["201", "400", "409"].contains(&code.as_str()), "unexpected {}", code);
        }
    }

    #[test]
    fn test_sampling_goes_through_sampler() {
        let store = PlanStore::new();
        initialize_plans(&operations(), &store, &FixedSampler(2));
        assert_eq!(
            store.get_planned_code(&RouteKey::new("post", "/widgets")).as_deref(),
            Some("409")
        );
    }

    #[test]
    fn test_methods_without_responses_stay_unplanned() {
        let store = PlanStore::new();
        let report = initialize_plans(&operations(), &store, &FixedSampler(0));

        assert_eq!(report, InitReport { resources: 1, planned: 2, skipped: 1 });
        let key = RouteKey::new("delete", "/widgets");
        assert_eq!(store.get_planned_code(&key), None);
        assert_eq!(store.get_planned_example_name(&key), None);
    }

    #[test]
    fn test_discovery_counts_each_resource_once() {
        let description: Description = serde_json::from_value(json!({
            "resources": [{
                "relativeUri": "/widgets",
                "methods": [
                    {"method": "get", "responses": {"200": {}}},
                    {"method": "post", "responses": {"201": {}}}
                ],
                "resources": [{
                    "relativeUri": "/{id}",
                    "methods": [
                        {"method": "get", "responses": {"200": {}}},
                        {"method": "delete"}
                    ]
                }]
            }]
        }))
        .unwrap();

        let store = PlanStore::new();
        let report = initialize_plans(&description.operations(), &store, &FixedSampler(0));
        assert_eq!(report, InitReport { resources: 2, planned: 3, skipped: 1 });
    }
}
