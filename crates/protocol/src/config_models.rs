//! Global configuration models for `.agent-pipeline/config.toml`.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Default model used for every stage.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default pause before each stage, in milliseconds.
pub const DEFAULT_STAGE_DELAY_MS: u64 = 500;

/// Default base URL of the generation API.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Represents global settings from `.agent-pipeline/config.toml`.
///
/// Every field is optional in the file.
///
/// # Example
///
/// ```toml
/// # .agent-pipeline/config.toml
/// model = "gemini-2.5-flash"
/// stage_delay_ms = 250
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct GlobalConfig {
    /// Model name passed to the generation backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// Pause inserted before each stage's backend call, for display pacing.
    #[serde(default = "default_stage_delay_ms")]
    #[ts(type = "number")]
    pub stage_delay_ms: u64,

    /// Base URL of the generation API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            stage_delay_ms: default_stage_delay_ms(),
            api_base: default_api_base(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_stage_delay_ms() -> u64 {
    DEFAULT_STAGE_DELAY_MS
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}
