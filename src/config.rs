//! Tree model configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for how the tree presents entities.
///
/// Stored as JSON. Missing keys take their defaults, so a partial file such
/// as `{"class_field": "targetname"}` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Field shown in entity column 1 and grouped by the class histogram.
    pub class_field: String,
    /// Histogram label for entities without `class_field`.
    pub missing_class_label: String,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            class_field: "classname".to_string(),
            missing_class_label: "<no classname>".to_string(),
        }
    }
}

impl TreeConfig {
    /// Read config from a JSON file. Returns None if the file doesn't exist.
    pub fn read_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(Some(config))
    }

    /// Write config as pretty JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
