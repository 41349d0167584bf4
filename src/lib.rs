pub mod api;
pub mod config;
pub mod loader;
pub mod logic;
pub mod model;
pub mod store;

// Export API types
pub use api::handlers;
pub use api::routes;

// Export logic types
pub use logic::{
    FixedSampler, InitReport, MockEngine, RenderError, RenderedResponse, Sampler, ScenarioRequest,
    ScenarioResponse, SeededSampler, ThreadRngSampler,
};

// Export all model types
pub use model::*;

// Export store types
pub use store::{PlanEntry, PlanStore, NO_PLAN};

use std::sync::Arc;

use crate::config::{AppConfig, DescriptionSource};

/// Load the configured descriptions into a fresh engine and seed its plans.
///
/// In folder mode every loadable document shares the one engine; documents
/// that fail to load are skipped.
pub fn build_engine(config: &AppConfig) -> anyhow::Result<MockEngine> {
    let sampler: Arc<dyn Sampler> = match config.mock.seed {
        Some(seed) => Arc::new(SeededSampler::new(seed)),
        None => Arc::new(ThreadRngSampler),
    };
    let mut engine = MockEngine::new(sampler, config.control_path()?);

    let documents = match config.description_source()? {
        DescriptionSource::File(path) => {
            log::info!("Loading {}", path.display());
            vec![(path.clone(), loader::load_file(&path)?)]
        }
        DescriptionSource::Folder(dir) => {
            log::info!("Loading descriptions from {}", dir.display());
            loader::load_folder(&dir)?
        }
    };

    for (path, description) in &documents {
        let source = path.display().to_string();
        log::info!(
            "Filling strategies for {}",
            description.title.as_deref().unwrap_or(&source)
        );
        let report = engine.load(&source, description);
        log::info!(
            "{}: {} resources, {} operations planned, {} skipped",
            source,
            report.resources,
            report.planned,
            report.skipped
        );
    }

    Ok(engine)
}

/// Router serving the mock routes and the control endpoint for `engine`
pub fn build_app(engine: MockEngine) -> axum::Router {
    let engine = Arc::new(engine);
    routes::create_router(&engine).with_state(engine)
}

pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    use axum::serve;
    use tokio::net::TcpListener;

    let engine = build_engine(&config)?;
    let control_path = engine.control_path().to_string();
    let app = build_app(engine);

    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    log::info!(
        "Listening for configuration requests on http://{}{}",
        bind_address,
        control_path
    );
    log::info!("Listening on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
