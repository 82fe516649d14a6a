//! Executor settings.
//!
//! Deserializable so a host can ship them alongside its own configuration;
//! every field has a default, so `{}` is a valid document.

use serde::Deserialize;

pub const DEFAULT_LOG_TARGET: &str = "fetch_state::executor";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// `log` target used for every record the executor emits.
    pub log_target: String,

    /// Swallow a panic inside the operation once it has been published as
    /// an `Error`. When false the panic resumes after that publication.
    pub capture_panics: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            log_target: DEFAULT_LOG_TARGET.to_string(),
            capture_panics: true,
        }
    }
}

impl ExecutorConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
