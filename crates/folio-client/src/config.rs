//! Editor configuration.
//!
//! Loaded from RON; every field has a default, so an empty file `()` is a
//! valid config.
//!
//! ```ron
//! (
//!     text_debounce_ms: 300,
//!     featured_relations_enabled: true,
//!     gateway_url: "http://127.0.0.1:47800",
//!     clear_stores_on_close: false,
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TEXT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:47800";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before a burst of keystrokes is sent as one update.
    pub text_debounce_ms: u64,
    /// Show the featured-relations strip under the title.
    pub featured_relations_enabled: bool,
    /// Base URL for image, thumbnail and file links.
    pub gateway_url: String,
    /// Drop the shared details/relation caches when the document closes.
    pub clear_stores_on_close: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            text_debounce_ms: DEFAULT_TEXT_DEBOUNCE_MS,
            featured_relations_enabled: true,
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            clear_stores_on_close: false,
        }
    }
}

impl EditorConfig {
    pub fn text_debounce(&self) -> Duration {
        Duration::from_millis(self.text_debounce_ms)
    }

    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron(&text)
    }
}

/// Errors that can occur when loading the editor config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}
