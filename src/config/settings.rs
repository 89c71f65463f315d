//! User settings for the budget ledger

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::LedgerError;

/// User settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency assigned to newly created versions
    #[serde(default = "default_currency")]
    pub default_currency: String,

    /// Base name for synthesized default versions ("Budget" -> "Budget v1")
    #[serde(default = "default_version_name")]
    pub default_version_name: String,

    /// Key under which the legacy flat-encoded versions are stored
    #[serde(default = "default_legacy_key")]
    pub legacy_versions_key: String,

    /// Window used by the upcoming payments query
    #[serde(default = "default_upcoming_window")]
    pub upcoming_payment_window_days: i64,

    /// Fallback log filter when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Name recorded as the actor when a version is locked
    #[serde(default = "default_actor")]
    pub actor: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_version_name() -> String {
    "Budget".to_string()
}

fn default_legacy_key() -> String {
    "savedBudgetVersions".to_string()
}

fn default_upcoming_window() -> i64 {
    14
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_actor() -> String {
    "local user".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            default_currency: default_currency(),
            default_version_name: default_version_name(),
            legacy_versions_key: default_legacy_key(),
            upcoming_payment_window_days: default_upcoming_window(),
            log_filter: default_log_filter(),
            actor: default_actor(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, LedgerError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| LedgerError::Io(format!("Failed to read settings file: {}", e)))?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                LedgerError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &LedgerPaths) -> Result<(), LedgerError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| LedgerError::Config(format!("Failed to serialize settings: {}", e)))?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| LedgerError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Name given to the first synthesized version
    pub fn default_version_label(&self) -> String {
        format!("{} v1", self.default_version_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.default_currency, "USD");
        assert_eq!(settings.legacy_versions_key, "savedBudgetVersions");
        assert_eq!(settings.upcoming_payment_window_days, 14);
        assert_eq!(settings.default_version_label(), "Budget v1");
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = LedgerPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_currency = "EUR".into();
        settings.actor = "Line Producer".into();
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_currency, "EUR");
        assert_eq!(loaded.actor, "Line Producer");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"default_currency": "GBP"}"#).unwrap();
        assert_eq!(settings.default_currency, "GBP");
        assert_eq!(settings.default_version_name, "Budget");
        assert_eq!(settings.log_filter, "info");
    }
}
