pub mod api; // REST surface
pub mod assessment; // Adaptive symptom questionnaire
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod report; // Recovery report data
pub mod risk_assessment; // Saved questionnaire outcomes
pub mod severity; // Mode severity & priority
pub mod taxonomy;
pub mod tracking; // Daily symptom logs
pub mod triage; // Clinician triage board

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::core_state::CoreState;
use crate::taxonomy::{DiseaseTaxonomy, TaxonomyError};

/// Initialise logging, load state and serve the API until Ctrl-C.
pub fn run() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("Carepath starting v{}", config::APP_VERSION);

    let taxonomy = load_taxonomy().map_err(|e| format!("Cannot load taxonomy: {e}"))?;
    let core = Arc::new(CoreState::new(taxonomy, config::database_path()));
    // Fail fast on an unusable database location.
    core.open_db().map_err(|e| format!("Cannot open database: {e}"))?;
    tracing::info!(db = %core.db_path.display(), "Database ready");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Cannot start runtime: {e}"))?;
    runtime.block_on(serve(core))
}

/// Taxonomy from `CAREPATH_TAXONOMY` when set, else the built-in one.
pub fn load_taxonomy() -> Result<DiseaseTaxonomy, TaxonomyError> {
    match config::taxonomy_path() {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading taxonomy file");
            DiseaseTaxonomy::load(&path)
        }
        None => Ok(DiseaseTaxonomy::builtin()),
    }
}

async fn serve(core: Arc<CoreState>) -> Result<(), String> {
    let mut server = api::start_api_server(core, config::bind_addr()).await?;
    tracing::info!(addr = %server.info.server_addr, "Carepath listening");

    match tokio::signal::ctrl_c().await {
        Ok(()) => server.shutdown(),
        Err(e) => tracing::warn!("Cannot listen for Ctrl-C, serving until killed: {e}"),
    }
    server.stopped().await;
    Ok(())
}
