//! Configuration loading and typed config structures for the simulator.
//!
//! The canonical configuration lives in `kommunity-config.yaml` at the
//! project root. Every field has a default, so an empty or missing file
//! yields a runnable setup using the conventional layout (`data/community`
//! for topics, `data/config.json` for the seed, `data/agents.json` for the
//! roster, a local Ollama for text generation).
//!
//! The loaded [`SimulationConfig`] is passed by reference into every
//! constructor that needs a path or a tunable; nothing reads ambient state
//! after startup.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulator configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Topic store locations.
    #[serde(default)]
    pub store: StoreConfig,

    /// Actor roster location.
    #[serde(default)]
    pub roster: RosterConfig,

    /// Action policy tunables.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Loop pacing.
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Prompt template overrides.
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Text generator backend.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Read-only HTTP observer.
    #[serde(default)]
    pub observer: ObserverConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `KOMMUNITY_STORE_ROOT` overrides `store.root`
    /// - `KOMMUNITY_SEED_PATH` overrides `store.seed_path`
    /// - `KOMMUNITY_ROSTER_PATH` overrides `roster.path`
    /// - `LLM_BACKEND`, `LLM_API_URL`, `LLM_API_KEY`, `LLM_MODEL` override
    ///   the matching `llm` fields
    /// - `OBSERVER_PORT` overrides `observer.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("KOMMUNITY_STORE_ROOT") {
            self.store.root = val;
        }
        if let Ok(val) = std::env::var("KOMMUNITY_SEED_PATH") {
            self.store.seed_path = val;
        }
        if let Ok(val) = std::env::var("KOMMUNITY_ROSTER_PATH") {
            self.roster.path = val;
        }
        if let Ok(val) = std::env::var("LLM_BACKEND") {
            self.llm.backend = val;
        }
        if let Ok(val) = std::env::var("LLM_API_URL") {
            self.llm.api_url = val;
        }
        if let Ok(val) = std::env::var("LLM_API_KEY") {
            self.llm.api_key = val;
        }
        if let Ok(val) = std::env::var("LLM_MODEL") {
            self.llm.model = val;
        }
        if let Some(port) = std::env::var("OBSERVER_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.observer.port = port;
        }
    }
}

/// Where topics and the seed document live.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Store root directory.
    #[serde(default = "default_store_root")]
    pub root: String,

    /// Seed document applied to an empty store.
    #[serde(default = "default_seed_path")]
    pub seed_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
            seed_path: default_seed_path(),
        }
    }
}

/// Where the actor roster lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterConfig {
    /// JSON array of actors.
    #[serde(default = "default_roster_path")]
    pub path: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
        }
    }
}

/// Action policy tunables.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PolicyConfig {
    /// Chance (0.0 to 1.0) that an actor starts a new topic when topics exist.
    #[serde(default = "default_originate_probability")]
    pub originate_probability: f64,

    /// How many of the newest topics an actor looks at. `0` means all.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            originate_probability: default_originate_probability(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Loop pacing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScheduleConfig {
    /// Whether the actor loop runs at all (observer-only deployments set `false`).
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base pause between iterations in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Extra random pause, uniform in `0..=jitter_ms`.
    #[serde(default)]
    pub jitter_ms: u64,

    /// Fixed RNG seed for a reproducible actor/action sequence.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: default_interval_ms(),
            jitter_ms: 0,
            rng_seed: None,
        }
    }
}

/// Prompt template overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptConfig {
    /// Directory holding `originate.j2` and/or `respond.j2`. Built-in
    /// templates are used for any file that is absent.
    #[serde(default)]
    pub templates_dir: Option<String>,
}

/// Text generator backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmConfig {
    /// Backend type: `ollama`, `openai` (any compatible API), `anthropic`, or `stub`.
    #[serde(default = "default_llm_backend")]
    pub backend: String,

    /// Base API URL.
    #[serde(default = "default_llm_api_url")]
    pub api_url: String,

    /// API key (unused by Ollama).
    #[serde(default)]
    pub api_key: String,

    /// Model identifier.
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Response length cap passed to backends that accept one.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_llm_backend(),
            api_url: default_llm_api_url(),
            api_key: String::new(),
            model: default_llm_model(),
            request_timeout_ms: default_request_timeout_ms(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Read-only HTTP observer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ObserverConfig {
    /// Whether to serve the observer alongside the loop.
    #[serde(default)]
    pub enabled: bool,

    /// Bind host.
    #[serde(default = "default_observer_host")]
    pub host: String,

    /// Bind port.
    #[serde(default = "default_observer_port")]
    pub port: u16,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: default_observer_host(),
            port: default_observer_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_store_root() -> String {
    String::from("data/community")
}

fn default_seed_path() -> String {
    String::from("data/config.json")
}

fn default_roster_path() -> String {
    String::from("data/agents.json")
}

const fn default_originate_probability() -> f64 {
    crate::policy::DEFAULT_ORIGINATE_PROBABILITY
}

const fn default_recent_limit() -> usize {
    5
}

const fn default_interval_ms() -> u64 {
    5000
}

fn default_llm_backend() -> String {
    String::from("ollama")
}

fn default_llm_api_url() -> String {
    String::from("http://localhost:11434")
}

fn default_llm_model() -> String {
    String::from("llama3.1:8b")
}

const fn default_request_timeout_ms() -> u64 {
    120_000
}

const fn default_max_tokens() -> u32 {
    512
}

fn default_observer_host() -> String {
    String::from("0.0.0.0")
}

const fn default_observer_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}
