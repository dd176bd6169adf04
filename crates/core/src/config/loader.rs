//! Configuration file loader for the `.agent-pipeline/` directory structure.
//!
//! This module loads and parses:
//! - `config.toml`: Global settings
//! - `stages/*.md`: Custom stage definitions with YAML front matter

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::{AppConfig, StageConfig, StageFrontMatter};
use crate::config::PROJECT_DIR;
use ap_protocol::config_models::GlobalConfig;
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::path::Path;
use walkdir::WalkDir;

/// Loads all configuration from the `.agent-pipeline/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.agent-pipeline/` folder
///
/// # Returns
///
/// An `AppConfig` with everything that was found. Missing directories or
/// files yield defaults rather than an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or Markdown front matter)
/// - The configured stages do not form a valid catalog
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let project_dir = root.join(PROJECT_DIR);

    if !project_dir.exists() {
        tracing::debug!(path = %project_dir.display(), "no project directory, using defaults");
        return Ok(AppConfig::default());
    }

    let global = load_global_config(&project_dir)?;
    let stages = load_stages(&project_dir)?;

    let config = AppConfig { global, stages };

    // Reject duplicate names here so callers see the offending directory.
    config
        .catalog()
        .map_err(|source| ConfigError::InvalidCatalog {
            path: project_dir.join("stages"),
            source,
        })?;

    tracing::debug!(
        model = %config.global.model,
        stages = config.stages.len(),
        "configuration loaded"
    );
    Ok(config)
}

/// Loads global configuration from `config.toml`.
fn load_global_config(project_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = project_dir.join("config.toml");

    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
        path: config_path,
        source,
    })
}

/// Loads all stage definitions from `stages/*.md`, sorted by `(order, name)`.
fn load_stages(project_dir: &Path) -> ConfigResult<Vec<StageConfig>> {
    let stages_dir = project_dir.join("stages");

    if !stages_dir.exists() {
        return Ok(Vec::new());
    }

    let matter = Matter::<YAML>::new();
    let mut stages = Vec::new();

    for entry in WalkDir::new(&stages_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|source| ConfigError::DirectoryWalk {
            path: stages_dir.clone(),
            source,
        })?;

        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let parsed = matter.parse(&content);
        let front: StageFrontMatter = parsed
            .data
            .ok_or_else(|| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: "Missing YAML front matter".to_string(),
            })?
            .deserialize()
            .map_err(|e| ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: format!("Failed to deserialize front matter: {e}"),
            })?;

        if front.name.trim().is_empty() {
            return Err(ConfigError::MarkdownParse {
                path: path.to_path_buf(),
                reason: "Stage name must not be empty".to_string(),
            });
        }

        stages.push(StageConfig {
            name: front.name,
            description: front.description,
            order: front.order,
            template: parsed.content.trim().to_string(),
            source: path.to_path_buf(),
        });
    }

    stages.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
    Ok(stages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_stage(dir: &Path, file: &str, body: &str) {
        fs::write(dir.join(file), body).expect("Failed to write stage file");
    }

    #[tokio::test]
    async fn test_load_config_acceptance() {
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let project_dir = root.join(PROJECT_DIR);
        let stages_dir = project_dir.join("stages");
        fs::create_dir_all(&stages_dir).expect("Failed to create stages dir");

        fs::write(
            project_dir.join("config.toml"),
            "model = \"gemini-2.5-pro\"\nstage_delay_ms = 0\n",
        )
        .expect("Failed to write config.toml");

        write_stage(
            &stages_dir,
            "reviewer.md",
            r#"---
name: Reviewer
description: Reviews the plan
order: 2
---

Review the plan for "{prompt}"."#,
        );
        write_stage(
            &stages_dir,
            "planner.md",
            r#"---
name: Planner
description: Plans the work
order: 1
---
Plan "{prompt}"."#,
        );
        write_stage(&stages_dir, "notes.txt", "ignored");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.global.model, "gemini-2.5-pro");
        assert_eq!(config.global.stage_delay_ms, 0);
        assert_eq!(
            config.global.api_base,
            ap_protocol::config_models::DEFAULT_API_BASE
        );

        let names: Vec<&str> = config.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Planner", "Reviewer"]);
        assert_eq!(config.stages[1].description, "Reviews the plan");

        let catalog = config.catalog().expect("valid catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.build_prompt("Reviewer", "a login form"),
            "Review the plan for \"a login form\"."
        );
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .agent-pipeline");

        assert_eq!(config.global, GlobalConfig::default());
        assert!(config.stages.is_empty());
        assert_eq!(config.catalog().expect("builtin").len(), 7);
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let project_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        fs::write(project_dir.join("config.toml"), "stage_delay_ms = 25")
            .expect("Failed to write config.toml");

        let config = load_config(dir.path()).await.expect("Failed to load config");

        assert_eq!(config.global.stage_delay_ms, 25);
        assert_eq!(
            config.global.model,
            ap_protocol::config_models::DEFAULT_MODEL
        );
        assert!(config.stages.is_empty());
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let project_dir = dir.path().join(PROJECT_DIR);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");
        fs::write(project_dir.join("config.toml"), "stage_delay_ms = \"soon\"")
            .expect("Failed to write config.toml");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_missing_front_matter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let stages_dir = dir.path().join(PROJECT_DIR).join("stages");
        fs::create_dir_all(&stages_dir).expect("Failed to create stages dir");
        write_stage(&stages_dir, "plain.md", "Just a body, no front matter.");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::MarkdownParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_duplicate_stage_names() {
        let dir = tempdir().expect("Failed to create temp dir");
        let stages_dir = dir.path().join(PROJECT_DIR).join("stages");
        fs::create_dir_all(&stages_dir).expect("Failed to create stages dir");
        let stage = "---\nname: Twin\ndescription: same\n---\nbody";
        write_stage(&stages_dir, "a.md", stage);
        write_stage(&stages_dir, "b.md", stage);

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::InvalidCatalog { .. })));
    }
}
