use crate::entity::ValidationOptions;
use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CURRENT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Project settings from `.crumbler/config.yaml`. Every field has a default,
/// and a missing file is the same as an empty one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Run the fail-fast hierarchy walk before any status change.
    #[serde(default = "default_true")]
    pub validate_before_transition: bool,
    /// Treat a goal without a `name` file as a defect.
    #[serde(default = "default_true")]
    pub require_goal_names: bool,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            validate_before_transition: true,
            require_goal_names: true,
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::config_path(root), data.as_bytes())
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            require_goal_names: self.require_goal_names,
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.version != CURRENT_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "unsupported config version {} (expected {CURRENT_VERSION})",
                    self.version
                ),
            });
        }
        if !self.require_goal_names {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "require_goal_names is off: goals without a name file are not reported"
                    .to_string(),
            });
        }
        if !self.validate_before_transition {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "validate_before_transition is off: status changes will not check the rest of the tree"
                    .to_string(),
            });
        }
        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
