use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::catalog::PlanCatalog;
use crate::core::entitlements::{EntitlementResolver, DEFAULT_AGENT_ROSTER};
use crate::core::error::QuotaError;
use crate::core::window::{WindowClock, DEFAULT_WINDOW_MINUTES, MINUTES_PER_DAY};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Offset of the reference timezone east of UTC, in minutes
    #[serde(default)]
    pub day_origin_offset_minutes: i32,
}

fn default_duration() -> u32 {
    DEFAULT_WINDOW_MINUTES
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            duration_minutes: default_duration(),
            day_origin_offset_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON plan listing; the built-in catalog is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default = "default_agents")]
    pub agents: Vec<String>,
}

fn default_agents() -> Vec<String> {
    DEFAULT_AGENT_ROSTER.iter().map(|a| a.to_string()).collect()
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: None,
            agents: default_agents(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub window: WindowSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("planquota").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Build the window policy. Fails on a duration that does not divide a day.
    pub fn window_clock(&self) -> Result<WindowClock, QuotaError> {
        WindowClock::new(
            self.window.duration_minutes,
            self.window.day_origin_offset_minutes,
        )
    }

    /// The configured plan listing, or the built-in catalog.
    pub fn plan_catalog(&self) -> Result<PlanCatalog, QuotaError> {
        match &self.catalog.path {
            Some(path) => PlanCatalog::load(path),
            None => Ok(PlanCatalog::builtin()),
        }
    }

    pub fn entitlement_resolver(&self) -> EntitlementResolver {
        EntitlementResolver::new(self.catalog.agents.iter().cloned())
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        let duration = self.window.duration_minutes;
        if duration == 0 || MINUTES_PER_DAY % duration != 0 {
            issues.push(format!(
                "Invalid window duration_minutes: {} (must evenly divide {})",
                duration, MINUTES_PER_DAY
            ));
        }
        if self.window.day_origin_offset_minutes.unsigned_abs() >= MINUTES_PER_DAY {
            issues.push(format!(
                "Invalid day_origin_offset_minutes: {} (must be within ±1439)",
                self.window.day_origin_offset_minutes
            ));
        }
        if self.catalog.agents.is_empty() {
            issues.push("Agent roster is empty".to_string());
        }
        if let Some(path) = &self.catalog.path {
            if let Err(e) = PlanCatalog::load(path) {
                issues.push(format!("Plan catalog {}: {}", path.display(), e));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_window_is_two_hours() {
        let config = AppConfig::default();
        assert_eq!(config.window.duration_minutes, 120);
        assert_eq!(config.window.day_origin_offset_minutes, 0);
        assert!(config.window_clock().is_ok());
    }

    #[test]
    fn default_agents_match_roster() {
        let config = AppConfig::default();
        assert_eq!(config.catalog.agents.len(), DEFAULT_AGENT_ROSTER.len());
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_bad_duration() {
        let mut config = AppConfig::default();
        config.window.duration_minutes = 100;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("duration_minutes")));
        assert!(matches!(
            config.window_clock(),
            Err(QuotaError::Configuration(_))
        ));
    }

    #[test]
    fn validate_catches_bad_offset() {
        let mut config = AppConfig::default();
        config.window.day_origin_offset_minutes = -1440;
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("day_origin_offset_minutes")));
    }

    #[test]
    fn validate_catches_missing_catalog() {
        let mut config = AppConfig::default();
        config.catalog.path = Some(PathBuf::from("/nonexistent/plans.json"));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("Plan catalog")));
    }

    #[test]
    fn catalog_path_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let listing = serde_json::to_string(PlanCatalog::builtin().plans()).unwrap();
        file.write_all(format!(r#"{{"items": {}}}"#, listing).as_bytes()).unwrap();

        let mut config = AppConfig::default();
        config.catalog.path = Some(file.path().to_path_buf());
        let catalog = config.plan_catalog().unwrap();
        assert!(catalog.get("enterprise").is_ok());
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
default_format = "json"
color = "always"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.default_format, "json");
        assert_eq!(config.settings.color, "always");
        assert_eq!(config.window.duration_minutes, 120);
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn parse_window_and_catalog_toml() {
        let toml = r#"
[window]
duration_minutes = 60
day_origin_offset_minutes = -300

[catalog]
path = "/etc/planquota/plans.json"
agents = ["general", "coder"]
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.window.duration_minutes, 60);
        assert_eq!(config.window.day_origin_offset_minutes, -300);
        assert_eq!(
            config.catalog.path.as_deref(),
            Some(std::path::Path::new("/etc/planquota/plans.json"))
        );
        let resolver = config.entitlement_resolver();
        assert_eq!(resolver.roster().count(), 2);
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_format, "text");
        assert_eq!(config.settings.color, "auto");
        assert_eq!(config.window.duration_minutes, 120);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let content = toml::to_string_pretty(&AppConfig::default()).unwrap();
        let parsed: AppConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed.window.duration_minutes, 120);
        assert_eq!(parsed.catalog.agents, default_agents());
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(path, PathBuf::from("/tmp/test_xdg_config/planquota/config.toml"));
    }
}
