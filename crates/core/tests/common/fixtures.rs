//! Test fixtures for creating sample catalogs and project directories.

use ap_core::catalog::StageCatalog;
use ap_core::config::PROJECT_DIR;
use ap_protocol::stage_models::StageDefinition;
use tempfile::TempDir;

/// A catalog whose stages send the user's prompt unchanged.
#[allow(dead_code)]
pub fn create_test_catalog(names: &[&str]) -> StageCatalog {
    let definitions = names
        .iter()
        .map(|name| StageDefinition::new(*name, format!("{name} stage")))
        .collect();
    StageCatalog::passthrough(definitions).expect("test catalog should be valid")
}

/// Create a temporary project directory with `.agent-pipeline` configuration.
///
/// This creates a test environment with:
/// - `.agent-pipeline/config.toml` with no pacing delay
/// - Two custom stages, `Planner` and `Builder`, declared out of file order
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let project_dir = temp_dir.path().join(PROJECT_DIR);
    let stages_dir = project_dir.join("stages");
    std::fs::create_dir_all(&stages_dir)?;

    std::fs::write(
        project_dir.join("config.toml"),
        "model = \"test-model\"\nstage_delay_ms = 0\n",
    )?;

    let planner_md = r#"---
name: Planner
description: Plans the work
order: 1
---
Write a plan for: {prompt}"#;
    std::fs::write(stages_dir.join("b-planner.md"), planner_md)?;

    let builder_md = r#"---
name: Builder
description: Builds the thing
order: 2
---
Build it."#;
    std::fs::write(stages_dir.join("a-builder.md"), builder_md)?;

    Ok(temp_dir)
}
