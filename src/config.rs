//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pathtree/pathtree.toml`
//! 3. Project config: `<project_dir>/.pathtree.toml`
//! 4. Environment variables: `PATHTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::services::DocumentFormat;
use crate::application::ApplicationError;
use crate::domain::{ConflictPolicy, FoldOrder, DEFAULT_DELIMITER};

/// Raw settings for intermediate parsing (every field optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub delimiter: Option<String>,
    pub policy: Option<ConflictPolicy>,
    pub order: Option<FoldOrder>,
    pub format: Option<DocumentFormat>,
    pub json_pretty: Option<bool>,
}

/// Unified configuration for pathtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Path key delimiter (default: platform path separator)
    pub delimiter: String,
    /// Conflict policy for `merge` (default: strict)
    pub policy: ConflictPolicy,
    /// Fold order for `pack` (default: right-to-left)
    pub order: FoldOrder,
    /// Output format for stdout (default: yaml)
    pub format: DocumentFormat,
    /// Pretty-print JSON output (default: true)
    pub json_pretty: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            policy: ConflictPolicy::default(),
            order: FoldOrder::default(),
            format: DocumentFormat::default(),
            json_pretty: true,
        }
    }
}

/// Get the XDG config directory for pathtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pathtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pathtree.toml"))
}

/// Get the path to the project config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".pathtree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Merge overlay config onto self (base): overlay wins if Some.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            delimiter: overlay
                .delimiter
                .clone()
                .unwrap_or_else(|| self.delimiter.clone()),
            policy: overlay.policy.unwrap_or(self.policy),
            order: overlay.order.unwrap_or(self.order),
            format: overlay.format.unwrap_or(self.format),
            json_pretty: overlay.json_pretty.unwrap_or(self.json_pretty),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `project_dir` - Optional project directory for the local config
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/pathtree/pathtree.toml`
    /// 3. Project config: `<project_dir>/.pathtree.toml`
    /// 4. Environment variables: `PATHTREE_*` prefix
    pub fn load(project_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = project_dir {
            let local_path = project_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.validate()?;

        Ok(current)
    }

    /// Apply PATHTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("PATHTREE").separator("__"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("delimiter") {
            settings.delimiter = val;
        }
        if let Ok(val) = config.get_string("policy") {
            settings.policy = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PATHTREE_POLICY: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("order") {
            settings.order = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PATHTREE_ORDER: {e}"),
            })?;
        }
        if let Ok(val) = config.get_string("format") {
            settings.format = val.parse().map_err(|e| ApplicationError::Config {
                message: format!("PATHTREE_FORMAT: {e}"),
            })?;
        }
        if let Ok(val) = config.get_bool("json_pretty") {
            settings.json_pretty = val;
        }

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        if self.delimiter.is_empty() {
            return Err(ApplicationError::Config {
                message: "delimiter must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pathtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:  ~/.config/pathtree/pathtree.toml
#   Project: <project_dir>/.pathtree.toml
#   Env:     PATHTREE_* environment variables (explicit overrides)

# Delimiter joining path key components (default: platform path separator)
# delimiter = "/"

# Conflict policy for merge: "strict" (keep base), "overwrite", "append"
# policy = "strict"

# Fold order for pack: "right-to-left" or "left-to-right"
# order = "right-to-left"

# Output format for stdout: "yaml" or "json"
# format = "yaml"

# Pretty-print JSON output
# json_pretty = true
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_default_settings_when_created_then_uses_platform_separator() {
        let settings = Settings::default();
        assert_eq!(settings.delimiter, std::path::MAIN_SEPARATOR_STR);
        assert_eq!(settings.policy, ConflictPolicy::Strict);
        assert_eq!(settings.order, FoldOrder::RightToLeft);
        assert_eq!(settings.format, DocumentFormat::Yaml);
        assert!(settings.json_pretty);
    }

    #[test]
    fn given_partial_overlay_when_merging_then_only_specified_fields_change() {
        let base = Settings::default();
        let overlay = RawSettings {
            delimiter: Some(".".to_string()),
            policy: Some(ConflictPolicy::Append),
            ..RawSettings::default()
        };

        let result = base.merge_with(&overlay);

        assert_eq!(result.delimiter, ".");
        assert_eq!(result.policy, ConflictPolicy::Append);
        assert_eq!(result.order, base.order);
        assert_eq!(result.format, base.format);
    }

    #[test]
    fn given_template_when_parsed_then_is_valid_toml_with_no_values() {
        let raw: RawSettings = toml::from_str(&Settings::template()).expect("template parses");
        assert!(raw.delimiter.is_none());
        assert!(raw.policy.is_none());
    }

    #[test]
    fn given_boolean_policy_names_when_parsing_toml_then_match_cli_names() {
        let raw: RawSettings = toml::from_str("policy = \"true\"\n").unwrap();
        assert_eq!(raw.policy, Some(ConflictPolicy::Overwrite));

        let raw: RawSettings = toml::from_str("policy = \"false\"\n").unwrap();
        assert_eq!(raw.policy, Some(ConflictPolicy::Strict));
    }

    #[test]
    fn given_settings_when_to_toml_then_round_trips() {
        let settings = Settings {
            delimiter: ".".to_string(),
            policy: ConflictPolicy::Overwrite,
            order: FoldOrder::LeftToRight,
            format: DocumentFormat::Json,
            json_pretty: false,
        };
        let text = settings.to_toml().unwrap();
        assert!(text.contains("policy = \"overwrite\""));
        assert!(text.contains("order = \"left-to-right\""));
        let parsed: Settings = toml::from_str(&text).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn given_empty_delimiter_when_validating_then_config_error() {
        let settings = Settings {
            delimiter: String::new(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ApplicationError::Config { .. })
        ));
    }
}
