//! Configuration
//!
//! Read from `~/.config/kubeforge/config.yaml` when present. Every field has
//! a default, so an empty or partial file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::model::DEFAULT_NAMESPACE;
use crate::validate::Rule;

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeConfig {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default)]
    pub layout: LayoutConfig,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub defaults: Defaults,
}

fn default_api_version() -> String {
    "kubeforge.io/v1".to_string()
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            layout: LayoutConfig::default(),
            lint: LintConfig::default(),
            defaults: Defaults::default(),
        }
    }
}

impl ForgeConfig {
    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = if content.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Option<Self>>(&content)?.unwrap_or_default()
        };
        config.lint.check()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| CoreError::InvalidConfig {
            message: "Could not determine config directory".to_string(),
        })?;
        Ok(config_dir.join("kubeforge").join("config.yaml"))
    }
}

/// Graph layout constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Horizontal distance between layers
    pub column_width: f64,
    /// Vertical distance between nodes of one layer
    pub row_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            column_width: 300.0,
            row_height: 150.0,
        }
    }
}

/// Validator settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LintConfig {
    /// Heuristic rules whose warnings are dropped
    pub disabled_rules: Vec<Rule>,
    /// Treat warnings as failures
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Defaults {
    /// Namespace given to newly created resources
    pub namespace: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();
        assert_eq!(config.api_version, "kubeforge.io/v1");
        assert_eq!(config.layout.column_width, 300.0);
        assert_eq!(config.layout.row_height, 150.0);
        assert!(config.lint.disabled_rules.is_empty());
        assert_eq!(config.defaults.namespace, "default");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config(
            r#"
layout:
  rowHeight: 80
lint:
  disabledRules: [singleReplica, loadBalancerCost]
"#,
        );
        let config = ForgeConfig::load_from(file.path()).unwrap();
        assert_eq!(config.layout.column_width, 300.0);
        assert_eq!(config.layout.row_height, 80.0);
        assert_eq!(
            config.lint.disabled_rules,
            vec![Rule::SingleReplica, Rule::LoadBalancerCost]
        );
        assert!(!config.lint.strict);
        assert_eq!(config.defaults.namespace, "default");
    }

    #[test]
    fn test_empty_file() {
        let file = write_config("");
        assert_eq!(ForgeConfig::load_from(file.path()).unwrap(), ForgeConfig::default());
    }

    #[test]
    fn test_structural_rule_rejected() {
        let file = write_config("lint:\n  disabledRules: [consistency]\n");
        assert!(matches!(
            ForgeConfig::load_from(file.path()),
            Err(CoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_unknown_rule_rejected() {
        let file = write_config("lint:\n  disabledRules: [noSuchRule]\n");
        assert!(matches!(
            ForgeConfig::load_from(file.path()),
            Err(CoreError::YamlParse(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ForgeConfig::load_from(&dir.path().join("absent.yaml")),
            Err(CoreError::Io(_))
        ));
    }

    #[test]
    fn test_default_path() {
        if let Ok(path) = ForgeConfig::default_path() {
            assert!(path.ends_with("kubeforge/config.yaml"));
        }
    }
}
