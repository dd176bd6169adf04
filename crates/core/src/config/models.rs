//! Configuration models that aggregate all settings.

use crate::catalog::{CatalogEntry, CatalogError, PromptTemplate, StageCatalog};
use ap_protocol::config_models::GlobalConfig;
use ap_protocol::stage_models::StageDefinition;
use serde::Deserialize;
use std::path::PathBuf;

/// Front matter of a `stages/*.md` file.
#[derive(Debug, Clone, Deserialize)]
pub struct StageFrontMatter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Position in the pipeline; ties are broken by name.
    #[serde(default)]
    pub order: i64,
}

/// A stage loaded from `.agent-pipeline/stages/*.md`.
#[derive(Debug, Clone)]
pub struct StageConfig {
    pub name: String,
    pub description: String,
    pub order: i64,
    /// The Markdown body; `{prompt}` is replaced by the user's request.
    pub template: String,
    /// File the stage was loaded from.
    pub source: PathBuf,
}

/// Unified application configuration loaded from `.agent-pipeline/`.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `stages/*.md`: Custom stage definitions
///
/// # Example
///
/// ```rust,no_run
/// use ap_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Model: {}, custom stages: {}", config.global.model, config.stages.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Custom stages, already sorted by `(order, name)`.
    pub stages: Vec<StageConfig>,
}

impl AppConfig {
    /// The effective stage catalog.
    ///
    /// Falls back to the built-in catalog when no stages are configured.
    ///
    /// # Errors
    ///
    /// Returns an error if two configured stages share a name.
    pub fn catalog(&self) -> Result<StageCatalog, CatalogError> {
        if self.stages.is_empty() {
            return Ok(StageCatalog::builtin());
        }

        StageCatalog::new(
            self.stages
                .iter()
                .map(|stage| {
                    CatalogEntry::new(
                        StageDefinition::new(&stage.name, &stage.description),
                        PromptTemplate::Custom(stage.template.clone()),
                    )
                })
                .collect(),
        )
    }
}
