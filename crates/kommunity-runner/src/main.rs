//! Process entry point for the Kommunity discussion simulator.
//!
//! Startup order:
//!
//! 1. Load `kommunity-config.yaml` (or `$KOMMUNITY_CONFIG`) and env overrides
//! 2. Initialize structured logging
//! 3. Seed the topic store if it is empty
//! 4. Spawn the read-only observer when `observer.enabled`
//! 5. Load the roster, build the LLM backend, and run the actor loop when
//!    `schedule.enabled`
//!
//! With the loop disabled the process only serves the observer. `Ctrl-C`
//! stops either mode.

mod error;
mod llm;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kommunity_core::config::{LoggingConfig, SimulationConfig};
use kommunity_core::{ActionPolicy, LoopSettings, PromptEngine, SimulationLoop, load_roster};
use kommunity_observer::{AppState, ServerConfig, spawn_observer};
use kommunity_store::{RecordStore, seed_if_empty};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::RunnerError;
use crate::llm::create_backend;

/// Config file read when `KOMMUNITY_CONFIG` is unset.
const DEFAULT_CONFIG_PATH: &str = "kommunity-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if any startup step fails. Loop iterations never
/// terminate the process.
#[tokio::main]
async fn main() -> Result<(), RunnerError> {
    let config_path = std::env::var("KOMMUNITY_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, from_file) = load_config(&config_path)?;

    init_tracing(&config.logging);
    info!("kommunity starting");
    if from_file {
        info!(path = %config_path.display(), "configuration loaded");
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
    }
    info!(
        store_root = config.store.root,
        roster = config.roster.path,
        backend = config.llm.backend,
        model = config.llm.model,
        observer = config.observer.enabled,
        schedule = config.schedule.enabled,
        "effective configuration"
    );

    // Store and one-shot seeding.
    let store = Arc::new(RecordStore::new(&config.store.root));
    let seeded = seed_if_empty(&store, Path::new(&config.store.seed_path))?;
    if seeded > 0 {
        info!(topics = seeded, "store seeded");
    }

    // Observer.
    let observer = if config.observer.enabled {
        let server = ServerConfig {
            host: config.observer.host.clone(),
            port: config.observer.port,
        };
        let state = Arc::new(AppState::new(Arc::clone(&store))?);
        let (addr, handle) = spawn_observer(&server, state).await?;
        info!(%addr, "observer started");
        Some(handle)
    } else {
        None
    };

    if !config.schedule.enabled {
        let Some(handle) = observer else {
            warn!("observer and schedule both disabled, nothing to run");
            return Ok(());
        };
        tokio::select! {
            _ = handle => warn!("observer task ended"),
            _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
        }
        return Ok(());
    }

    let sim = build_loop(&config, store).await?;
    tokio::select! {
        () = sim.run() => {}
        _ = tokio::signal::ctrl_c() => info!("shutdown requested"),
    }

    info!("kommunity shutdown complete");
    Ok(())
}

/// Read the config at `path`, or defaults if it does not exist.
///
/// Environment overrides are applied either way. The flag reports whether
/// the file was found.
fn load_config(path: &Path) -> Result<(SimulationConfig, bool), RunnerError> {
    if path.exists() {
        return Ok((SimulationConfig::from_file(path)?, true));
    }
    let mut config = SimulationConfig::default();
    config.apply_env_overrides();
    Ok((config, false))
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Assemble the actor loop from configuration.
async fn build_loop(
    config: &SimulationConfig,
    store: Arc<RecordStore>,
) -> Result<SimulationLoop<llm::LlmBackend, SmallRng>, RunnerError> {
    let roster = load_roster(Path::new(&config.roster.path))?;
    info!(actors = roster.len(), "roster loaded");

    let backend = create_backend(&config.llm)?;
    info!(backend = backend.name(), model = config.llm.model, "LLM backend configured");
    if let Err(e) = backend.health_check().await {
        warn!(
            backend = backend.name(),
            url = config.llm.api_url,
            error = %e,
            "LLM backend not reachable, iterations will fail until it is"
        );
    }

    let prompts = match &config.prompts.templates_dir {
        Some(dir) => PromptEngine::from_dir(Path::new(dir))?,
        None => PromptEngine::new()?,
    };
    let policy = ActionPolicy::new(config.policy.originate_probability)?;
    let rng = config
        .schedule
        .rng_seed
        .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);

    let sim = SimulationLoop::new(
        store,
        roster,
        policy,
        prompts,
        backend,
        rng,
        LoopSettings::from_config(&config.policy, &config.schedule),
    )?;
    Ok(sim)
}
