//! Directory structure and file generation for `.agent-pipeline` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use crate::config::PROJECT_DIR;
use std::fs;
use std::path::{Path, PathBuf};

/// Options for initializing a `.agent-pipeline` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where `.agent-pipeline` will be created.
    pub target_dir: PathBuf,

    /// Overwrite the template files of an existing `.agent-pipeline` directory.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
        }
    }
}

/// Generate a `.agent-pipeline` directory holding the built-in stages as
/// editable files.
///
/// This function creates the following structure:
/// ```text
/// .agent-pipeline/
/// ├── config.toml
/// └── stages/
///     ├── 01-architect.md
///     ├── ...
///     └── 07-integration-specialist.md
/// ```
///
/// Files that exist in the directory but not among the templates are left
/// alone when `force` is set.
///
/// # Errors
/// Returns an `InitError` if:
/// - The `.agent-pipeline` directory already exists (without force flag)
/// - A template file cannot be found
/// - File system operations fail
///
/// Returns the path of the generated directory.
pub async fn generate_project_structure(options: InitOptions) -> InitResult<PathBuf> {
    let project_dir = options.target_dir.join(PROJECT_DIR);

    if project_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(project_dir));
    }

    let stages_dir = project_dir.join("stages");
    fs::create_dir_all(&stages_dir).map_err(|source| InitError::DirectoryCreate {
        path: stages_dir.clone(),
        source,
    })?;

    write_template_file(&project_dir, "config.toml")?;

    let stage_templates = list_templates("stages/");
    for stage_path in &stage_templates {
        write_template_file(&project_dir, stage_path)?;
    }

    tracing::info!(
        path = %project_dir.display(),
        stages = stage_templates.len(),
        "project directory initialized"
    );
    Ok(project_dir)
}

/// Write one embedded template below `project_dir`, creating parents as needed.
fn write_template_file(project_dir: &Path, template_path: &str) -> InitResult<()> {
    let content = get_template(template_path)
        .ok_or_else(|| InitError::TemplateNotFound(template_path.to_string()))?;

    let target_path = project_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::DirectoryCreate {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::FileWrite {
        path: target_path,
        source,
    })?;

    Ok(())
}
