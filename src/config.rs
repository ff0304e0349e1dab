//! Configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables (a `.env` file is honoured), then CLI flags (applied
//! by `app`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::SourceKind;

const CONFIG_FILE_NAME: &str = "fed-tracker.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Where view data comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_kind")]
    pub kind: SourceKind,

    /// Base URL of the dashboard REST API, including the `/api` prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Only needed for `kind = "fred"`. Usually supplied via `FRED_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fred_api_key: Option<String>,
}

fn default_source_kind() -> SourceKind {
    SourceKind::Api
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: default_source_kind(),
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            fred_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file used while the TUI owns the terminal.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "fed_tracker=info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("fed-tracker.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Simulated fallback data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Fixed RNG seed for simulated calendars/forecasts. Unset means fresh
    /// randomness on every load.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Settings plus what happened while loading them.
///
/// Loading runs before the log subscriber exists, so the caller logs `origin`
/// and `warnings` once logging is up.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    /// Config file the settings came from, if any.
    pub origin: Option<PathBuf>,
    pub warnings: Vec<String>,
}

impl LoadedSettings {
    /// Emit the collected messages through `tracing`.
    pub fn log(&self) {
        if let Some(origin) = &self.origin {
            tracing::debug!("Loaded config from {:?}", origin);
        }
        for warning in &self.warnings {
            tracing::warn!("{}", warning);
        }
    }
}

impl Settings {
    /// Load settings from `path` (must exist) or from the first config file
    /// found in the usual places, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<LoadedSettings, ConfigError> {
        dotenvy::dotenv().ok();
        let discovered = if path.is_none() { Self::discover() } else { None };
        Self::load_from(path, discovered, |key| std::env::var(key).ok())
    }

    /// [`Settings::load`] with the discovered file and environment injected.
    ///
    /// An explicit `path` that can't be read or parsed is an error; a broken
    /// discovered file is skipped with a warning.
    pub fn load_from(
        path: Option<&Path>,
        discovered: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadedSettings, ConfigError> {
        let mut warnings = Vec::new();
        let (mut settings, origin) = match (path, discovered) {
            (Some(path), _) => (Self::from_file(path)?, Some(path.to_path_buf())),
            (None, Some(found)) => match Self::from_file(&found) {
                Ok(settings) => (settings, Some(found)),
                Err(e) => {
                    warnings.push(format!("Ignoring config {:?}: {}", found, e));
                    (Self::default(), None)
                }
            },
            (None, None) => (Self::default(), None),
        };

        warnings.extend(settings.apply_env_overrides(lookup));
        Ok(LoadedSettings {
            settings,
            origin,
            warnings,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::from_toml(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("fed-tracker").join("config.toml"))
            .filter(|p| p.exists())
    }

    /// Apply `FED_TRACKER_*` / `FRED_API_KEY` overrides, returning a warning
    /// for each value that was ignored.
    ///
    /// The lookup is injected so tests don't have to mutate the process
    /// environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(kind) = lookup("FED_TRACKER_SOURCE") {
            match kind.trim().to_ascii_lowercase().as_str() {
                "api" => self.source.kind = SourceKind::Api,
                "fred" => self.source.kind = SourceKind::Fred,
                other => warnings.push(format!(
                    "Unknown FED_TRACKER_SOURCE '{}', keeping {:?}",
                    other, self.source.kind
                )),
            }
        }
        if let Some(url) = lookup("FED_TRACKER_API_URL") {
            self.source.api_url = url;
        }
        if let Some(secs) = lookup("FED_TRACKER_TIMEOUT_SECS") {
            match secs.trim().parse() {
                Ok(secs) => self.source.timeout_secs = secs,
                Err(_) => warnings.push(format!("Ignoring FED_TRACKER_TIMEOUT_SECS '{}'", secs)),
            }
        }
        if let Some(key) = lookup("FRED_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.source.fred_api_key = Some(key);
        }
        if let Some(level) = lookup("FED_TRACKER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(file) = lookup("FED_TRACKER_LOG_FILE") {
            self.logging.file = PathBuf::from(file);
        }
        if let Some(seed) = lookup("FED_TRACKER_SEED") {
            match seed.trim().parse() {
                Ok(seed) => self.simulation.seed = Some(seed),
                Err(_) => warnings.push(format!("Ignoring FED_TRACKER_SEED '{}'", seed)),
            }
        }
        warnings
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# fed-tracker configuration
#
# Environment variables override these settings:
# - FED_TRACKER_SOURCE        (api | fred)
# - FED_TRACKER_API_URL
# - FED_TRACKER_TIMEOUT_SECS
# - FRED_API_KEY
# - FED_TRACKER_LOG_LEVEL
# - FED_TRACKER_LOG_FILE
# - FED_TRACKER_SEED

[source]
# "api" talks to the dashboard REST backend, "fred" calls FRED directly.
kind = "api"

# Base URL of the REST backend (with the /api prefix).
api_url = "http://localhost:8000/api"

# Request timeout in seconds
timeout_secs = 15

[logging]
# tracing filter, e.g. "fed_tracker=debug"
level = "fed_tracker=info"

# Where the TUI writes its log (the terminal is taken by the UI).
file = "fed-tracker.log"

[simulation]
# Fix the seed of simulated calendar/forecast data.
# seed = 42
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let parsed = Settings::from_toml(&generate_default_config()).unwrap();
        assert_eq!(parsed.source.kind, SourceKind::Api);
        assert_eq!(parsed.source.api_url, "http://localhost:8000/api");
        assert_eq!(parsed.source.timeout_secs, 15);
        assert_eq!(parsed.simulation.seed, None);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed = Settings::from_toml("[source]\nkind = \"fred\"\n").unwrap();
        assert_eq!(parsed.source.kind, SourceKind::Fred);
        assert_eq!(parsed.source.timeout_secs, 15);
        assert_eq!(parsed.logging.level, "fed_tracker=info");
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("FED_TRACKER_SOURCE", "FRED"),
            ("FED_TRACKER_API_URL", "http://example.test/api"),
            ("FED_TRACKER_TIMEOUT_SECS", "3"),
            ("FRED_API_KEY", "abc"),
            ("FED_TRACKER_SEED", "7"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.source.kind, SourceKind::Fred);
        assert_eq!(settings.source.api_url, "http://example.test/api");
        assert_eq!(settings.source.timeout_secs, 3);
        assert_eq!(settings.source.fred_api_key.as_deref(), Some("abc"));
        assert_eq!(settings.simulation.seed, Some(7));
    }

    #[test]
    fn bad_env_values_are_ignored_with_a_warning() {
        let mut settings = Settings::default();
        let warnings = settings.apply_env_overrides(|k| match k {
            "FED_TRACKER_SOURCE" => Some("carrier-pigeon".to_string()),
            "FED_TRACKER_TIMEOUT_SECS" => Some("soon".to_string()),
            "FRED_API_KEY" => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(settings.source.kind, SourceKind::Api);
        assert_eq!(settings.source.timeout_secs, 15);
        assert_eq!(settings.source.fred_api_key, None);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Unknown FED_TRACKER_SOURCE 'carrier-pigeon'"));
        assert!(warnings[1].contains("FED_TRACKER_TIMEOUT_SECS"));
    }

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fed-tracker-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn broken_discovered_file_is_reported_and_skipped() {
        let path = scratch_file("broken.toml", "[source\nkind = ");
        let loaded = Settings::load_from(None, Some(path.clone()), |_| None).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.origin, None);
        assert_eq!(loaded.settings.source.kind, SourceKind::Api);
        assert_eq!(loaded.warnings.len(), 1);
        assert!(loaded.warnings[0].starts_with("Ignoring config"));
        assert!(loaded.warnings[0].contains("broken.toml"));
    }

    #[test]
    fn broken_explicit_file_is_an_error() {
        let path = scratch_file("explicit.toml", "[source\nkind = ");
        let result = Settings::load_from(Some(&path), None, |_| None);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn discovered_file_then_env() {
        let path = scratch_file("good.toml", "[source]\nkind = \"fred\"\ntimeout_secs = 5\n");
        let loaded = Settings::load_from(None, Some(path.clone()), |k| {
            (k == "FED_TRACKER_SOURCE").then(|| "bogus".to_string())
        })
        .unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.origin, Some(path));
        assert_eq!(loaded.settings.source.kind, SourceKind::Fred);
        assert_eq!(loaded.settings.source.timeout_secs, 5);
        assert_eq!(loaded.warnings, vec!["Unknown FED_TRACKER_SOURCE 'bogus', keeping Fred".to_string()]);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
