//! Pipeline definition: the ordered stage catalog and per-stage prompts.
//!
//! The catalog is loaded once at startup and never mutated afterwards.
//! Prompt selection is a table lookup keyed by stage name; names the table
//! does not know fall back to the user's prompt unchanged.

mod builtin;

pub use builtin::PromptBuilder;

use ap_protocol::stage_models::StageDefinition;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Placeholder substituted with the user's prompt in custom templates.
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Errors raised when assembling a catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("stage catalog must contain at least one stage")]
    Empty,
    #[error("duplicate stage name in catalog: {0}")]
    DuplicateStage(String),
}

/// How a stage turns the user's prompt into backend instructions.
#[derive(Clone)]
pub enum PromptTemplate {
    /// A compiled-in builder.
    Builtin(PromptBuilder),
    /// A text template containing `{prompt}`.
    ///
    /// A template without the placeholder gets the request appended.
    Custom(String),
    /// Send the user's prompt unchanged.
    Passthrough,
}

impl PromptTemplate {
    pub fn render(&self, user_prompt: &str) -> String {
        match self {
            Self::Builtin(build) => build(user_prompt),
            Self::Custom(template) if template.contains(PROMPT_PLACEHOLDER) => {
                template.replace(PROMPT_PLACEHOLDER, user_prompt)
            }
            Self::Custom(template) => {
                format!("{}\n\nUser request: \"{user_prompt}\"", template.trim_end())
            }
            Self::Passthrough => user_prompt.to_string(),
        }
    }
}

impl std::fmt::Debug for PromptTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(_) => f.write_str("Builtin"),
            Self::Custom(template) => f.debug_tuple("Custom").field(template).finish(),
            Self::Passthrough => f.write_str("Passthrough"),
        }
    }
}

/// A catalog entry: the stage plus its prompt rule.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub definition: StageDefinition,
    pub template: PromptTemplate,
}

impl CatalogEntry {
    pub fn new(definition: StageDefinition, template: PromptTemplate) -> Self {
        Self {
            definition,
            template,
        }
    }
}

/// The fixed, ordered set of stages a run walks through.
#[derive(Debug, Clone)]
pub struct StageCatalog {
    entries: Vec<CatalogEntry>,
    index: HashMap<String, usize>,
}

impl StageCatalog {
    /// Build a catalog from ordered entries.
    ///
    /// # Errors
    ///
    /// Returns an error if `entries` is empty or two entries share a name.
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.definition.name.clone(), i).is_some() {
                return Err(CatalogError::DuplicateStage(entry.definition.name.clone()));
            }
        }

        Ok(Self { entries, index })
    }

    /// The compiled-in seven-stage catalog.
    pub fn builtin() -> Self {
        let entries = builtin::BUILTIN_STAGES
            .iter()
            .map(|stage| CatalogEntry::new(stage.definition(), PromptTemplate::Builtin(stage.build)))
            .collect::<Vec<_>>();
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (entry.definition.name.clone(), i))
            .collect();
        Self { entries, index }
    }

    /// A catalog of stages that send the user prompt unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`StageCatalog::new`].
    pub fn passthrough(definitions: Vec<StageDefinition>) -> Result<Self, CatalogError> {
        Self::new(
            definitions
                .into_iter()
                .map(|d| CatalogEntry::new(d, PromptTemplate::Passthrough))
                .collect(),
        )
    }

    /// An independent copy of the ordered stage definitions.
    pub fn definitions(&self) -> Vec<StageDefinition> {
        self.entries.iter().map(|e| e.definition.clone()).collect()
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    /// Full instruction text for `stage_name`.
    ///
    /// Unknown stage names yield `user_prompt` unchanged.
    pub fn build_prompt(&self, stage_name: &str, user_prompt: &str) -> String {
        match self.get(stage_name) {
            Some(entry) => entry.template.render(user_prompt),
            None => user_prompt.to_string(),
        }
    }
}

impl Default for StageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_catalog() -> &'static StageCatalog {
    static CATALOG: OnceLock<StageCatalog> = OnceLock::new();
    CATALOG.get_or_init(StageCatalog::builtin)
}

/// The built-in stages, in execution order.
///
/// Every call returns a fresh copy.
pub fn stage_catalog() -> Vec<StageDefinition> {
    builtin_catalog().definitions()
}

/// Instruction text for a built-in stage.
///
/// Unknown stage names yield `user_prompt` unchanged.
pub fn build_prompt(stage_name: &str, user_prompt: &str) -> String {
    builtin_catalog().build_prompt(stage_name, user_prompt)
}
