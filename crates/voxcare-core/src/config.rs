use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, VoxError};
use crate::types::RouteTable;

/// Top-level configuration for a VoxCare assistant session.
///
/// Typically loaded from a TOML file shipped with the portal. Every section
/// falls back to its defaults when omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub routes: RouteTable,
}

impl AssistantConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: AssistantConfig = toml::from_str(content)?;
        config.memory.capacity = config.memory.capacity.max(1);
        config.routes.normalize_keys();
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| VoxError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Text-to-speech channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Whether responses are spoken at all.
    pub enabled: bool,
    /// Base URL of the synthesis service; requests go to `{endpoint}/api/tts/{voice}`.
    pub endpoint: String,
    /// Voice name appended to the synthesis path.
    pub voice: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:3000".to_string(),
            voice: "nova".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Session memory configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    /// Maximum number of interactions retained, newest first.
    pub capacity: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}

/// Proactive suggestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Whether idle suggestions are offered.
    pub enabled: bool,
    /// Inactivity delay before a suggestion fires, in milliseconds.
    pub idle_delay_ms: u64,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            idle_delay_ms: 4_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn test_defaults() {
        let config = AssistantConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert!(config.speech.enabled);
        assert_eq!(config.speech.voice, "nova");
        assert_eq!(config.memory.capacity, 20);
        assert_eq!(config.suggestions.idle_delay_ms, 4000);
        assert_eq!(
            config.routes.lookup(Role::Patient, "labs"),
            Some("/patient/labs")
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AssistantConfig::from_toml_str(
            r#"
            [speech]
            voice = "alloy"

            [suggestions]
            idle_delay_ms = 2500
            "#,
        )
        .unwrap();
        assert_eq!(config.speech.voice, "alloy");
        assert_eq!(config.speech.endpoint, "http://localhost:3000");
        assert_eq!(config.suggestions.idle_delay_ms, 2500);
        assert!(config.suggestions.enabled);
        assert_eq!(config.memory.capacity, 20);
    }

    #[test]
    fn test_custom_routes_replace_role_table() {
        let config = AssistantConfig::from_toml_str(
            r#"
            [routes.patient]
            labs = "/p/results"
            "#,
        )
        .unwrap();
        assert_eq!(config.routes.lookup(Role::Patient, "labs"), Some("/p/results"));
        assert_eq!(config.routes.lookup(Role::Patient, "appointments"), None);
        // Roles not mentioned keep the compiled-in table.
        assert_eq!(
            config.routes.lookup(Role::Admin, "invoices"),
            Some("/admin/invoices")
        );
    }

    #[test]
    fn test_route_keywords_are_lowercased_on_load() {
        let config = AssistantConfig::from_toml_str(
            r#"
            [routes.patient]
            Labs = "/p/labs"
            "#,
        )
        .unwrap();
        assert_eq!(config.routes.lookup(Role::Patient, "labs"), Some("/p/labs"));
        assert_eq!(config.routes.lookup(Role::Patient, "Labs"), Some("/p/labs"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let config = AssistantConfig::from_toml_str("[memory]\ncapacity = 0\n").unwrap();
        assert_eq!(config.memory.capacity, 1);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AssistantConfig::from_toml_str("[speech\nvoice=").unwrap_err();
        assert!(matches!(err, VoxError::Config(_)));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("voxcare.toml");
        let mut config = AssistantConfig::default();
        config.speech.voice = "shimmer".to_string();
        config.memory.capacity = 5;
        config.save(&path).unwrap();

        let loaded = AssistantConfig::load(&path).unwrap();
        assert_eq!(loaded.speech.voice, "shimmer");
        assert_eq!(loaded.memory.capacity, 5);
        assert_eq!(loaded.routes, config.routes);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AssistantConfig::load_or_default(&dir.path().join("absent.toml"));
        assert_eq!(config.memory.capacity, 20);
    }
}
