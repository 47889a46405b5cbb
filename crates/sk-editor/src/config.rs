//! Editor configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("`{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for `Editor`.
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Marks kept on the undo stack before the oldest step is dropped.
    /// Default: **100**.
    pub max_history: usize,

    /// Transitions an enter hook may chain before the machine reports a
    /// loop. Default: **16**.
    pub max_transition_chain: usize,

    /// Root-relative path entered on startup. Default: **`select.idle`**.
    pub initial_state: String,

    /// Squared page distance a press must travel to become a drag.
    /// Default: **16** (4 px).
    pub drag_distance: f64,

    /// Coarse pointer. Raises the drag distance to at least 36 (6 px).
    pub is_mobile: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_history: 100,
            max_transition_chain: 16,
            initial_state: "select.idle".to_string(),
            drag_distance: 16.0,
            is_mobile: false,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history == 0 {
            return Err(ConfigError::Invalid {
                field: "max_history",
                reason: "must be at least 1",
            });
        }
        if !self.drag_distance.is_finite() || self.drag_distance < 0.0 {
            return Err(ConfigError::Invalid {
                field: "drag_distance",
                reason: "must be a finite, non-negative number",
            });
        }
        if self.initial_state.is_empty() {
            return Err(ConfigError::Invalid {
                field: "initial_state",
                reason: "must name a state",
            });
        }
        Ok(())
    }

    /// Drag distance after applying the coarse-pointer minimum.
    pub fn drag_distance_squared(&self) -> f64 {
        if self.is_mobile {
            self.drag_distance.max(36.0)
        } else {
            self.drag_distance
        }
    }
}
