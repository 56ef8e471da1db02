//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.libris/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::ids::DEFAULT_MAX_ATTEMPTS;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LibrisConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub ids: IdsConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    pub data_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub file: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    pub recent_books: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct IdsConfig {
    pub max_attempts: Option<u32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_DATA_FILE: &str = "library.json";
pub const DEFAULT_LOG_FILE: &str = "libris.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_RECENT_BOOKS: usize = 5;

pub const ENV_DATA_FILE: &str = "LIBRIS_DATA_FILE";
pub const ENV_LOG_LEVEL: &str = "LIBRIS_LOG_LEVEL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
    pub recent_books: usize,
    pub id_max_attempts: u32,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.libris/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".libris").join("config.toml"))
}

/// Load config from `~/.libris/config.toml`.
pub fn load_config() -> Result<LibrisConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(LibrisConfig::default())
        }
    }
}

/// If the file doesn't exist, generates a commented-out default and
/// returns `LibrisConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<LibrisConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(LibrisConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: LibrisConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Libris Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [storage]
# data_file = "library.json"         # Or set LIBRIS_DATA_FILE, or pass --data-file

# [logging]
# file = "libris.log"
# level = "info"                     # "error", "warn", "info", "debug", "trace"

# [display]
# recent_books = 5                   # Rows in the `stats` recent-books table

# [ids]
# max_attempts = 64                  # Re-rolls allowed when a new id collides
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_data_file` is the `--data-file` flag (None = not specified).
pub fn resolve(config: &LibrisConfig, cli_data_file: Option<&Path>) -> ResolvedConfig {
    resolve_with_env(config, cli_data_file, |key| std::env::var(key).ok())
}

fn resolve_with_env<E>(config: &LibrisConfig, cli_data_file: Option<&Path>, env: E) -> ResolvedConfig
where
    E: Fn(&str) -> Option<String>,
{
    // Data file: CLI → env → config → default
    let data_file = cli_data_file
        .map(Path::to_path_buf)
        .or_else(|| env(ENV_DATA_FILE).map(PathBuf::from))
        .or_else(|| config.storage.data_file.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE));

    // Log level: env → config → default
    let log_level = env(ENV_LOG_LEVEL)
        .or_else(|| config.logging.level.clone())
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

    ResolvedConfig {
        data_file,
        log_file: config
            .logging
            .file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        log_level,
        recent_books: config.display.recent_books.unwrap_or(DEFAULT_RECENT_BOOKS),
        id_max_attempts: config.ids.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&LibrisConfig::default(), None, no_env);
        assert_eq!(resolved.data_file, PathBuf::from(DEFAULT_DATA_FILE));
        assert_eq!(resolved.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        assert_eq!(resolved.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(resolved.recent_books, DEFAULT_RECENT_BOOKS);
        assert_eq!(resolved.id_max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = LibrisConfig {
            storage: StorageConfig {
                data_file: Some("/srv/library.json".to_string()),
            },
            logging: LoggingConfig {
                file: Some("/var/log/libris.log".to_string()),
                level: Some("debug".to_string()),
            },
            display: DisplayConfig {
                recent_books: Some(10),
            },
            ids: IdsConfig {
                max_attempts: Some(8),
            },
        };
        let resolved = resolve_with_env(&config, None, no_env);
        assert_eq!(resolved.data_file, PathBuf::from("/srv/library.json"));
        assert_eq!(resolved.log_file, PathBuf::from("/var/log/libris.log"));
        assert_eq!(resolved.log_level, "debug");
        assert_eq!(resolved.recent_books, 10);
        assert_eq!(resolved.id_max_attempts, 8);
    }

    #[test]
    fn test_env_beats_config_and_cli_beats_env() {
        let config = LibrisConfig {
            storage: StorageConfig {
                data_file: Some("from-config.json".to_string()),
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            ENV_DATA_FILE => Some("from-env.json".to_string()),
            ENV_LOG_LEVEL => Some("trace".to_string()),
            _ => None,
        };

        let resolved = resolve_with_env(&config, None, env);
        assert_eq!(resolved.data_file, PathBuf::from("from-env.json"));
        assert_eq!(resolved.log_level, "trace");

        let resolved = resolve_with_env(&config, Some(Path::new("from-cli.json")), env);
        assert_eq!(resolved.data_file, PathBuf::from("from-cli.json"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[display]
recent_books = 3
"#;
        let config: LibrisConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.display.recent_books, Some(3));
        assert!(config.storage.data_file.is_none());
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".libris").join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.storage.data_file.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Libris Configuration"));

        // The generated file is all comments, so it loads as defaults too.
        let reloaded = load_config_from(&path).unwrap();
        assert!(reloaded.display.recent_books.is_none());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[storage\ndata_file = ").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
