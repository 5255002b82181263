use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::QuandaryConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "quandary.toml",
    "quandary.yaml",
    "quandary.yml",
    "quandary.json",
];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<QuandaryConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./quandary.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/quandary/quandary.{toml,yaml,yml,json}` (user-global)
///
/// Returns `QuandaryConfig::default()` if no config file is found or the
/// file fails to parse.
pub fn discover_and_load() -> QuandaryConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    QuandaryConfig::default()
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    let local = CONFIG_FILENAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists());
    if local.is_some() {
        return local;
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/quandary/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "quandary").map(|d| d.config_dir().to_path_buf())
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<QuandaryConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quandary.toml");
        std::fs::write(&path, "[server]\nport = 9000\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn loads_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quandary.yaml");
        std::fs::write(&path, "nlu:\n  cache_scope: process\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.nlu.cache_scope, crate::CacheScope::Process);
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quandary.json");
        std::fs::write(&path, r#"{"sessions": {"backend": "sqlite"}}"#).unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.sessions.backend, crate::SessionBackendKind::Sqlite);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quandary.ini");
        std::fs::write(&path, "port=1").unwrap();

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Path::new("/nonexistent/quandary.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
