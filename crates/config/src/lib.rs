//! Configuration loading, validation, and env substitution.
//!
//! Config files: `quandary.toml`, `quandary.yaml`, or `quandary.json`
//! Searched in `./` then `~/.config/quandary/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        CacheScope, ChannelsConfig, FlowsConfig, MetricsConfig, NluConfig, QuandaryConfig,
        ServerConfig, SessionBackendKind, SessionsConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
