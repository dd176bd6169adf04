//! Subcommand implementations.

use ap_core::backend::{GeminiBackend, GenerationBackend, MockBackend};
use ap_core::config::loader::load_config;
use ap_core::config::PROJECT_DIR;
use ap_core::engine::PipelineEngine;
use ap_core::init::{generate_project_structure, InitOptions};
use ap_protocol::{Event, RejectReason, RunOutcome, StageStatus};
use color_eyre::eyre::{bail, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

const LOG_FILE: &str = "agent-pipeline.log";

/// Log file for TUI sessions: inside the project directory when there is
/// one, otherwise in the system temp directory.
pub fn tui_log_path(root: &Path) -> PathBuf {
    let project_dir = root.join(PROJECT_DIR);
    if project_dir.is_dir() {
        project_dir.join(LOG_FILE)
    } else {
        std::env::temp_dir().join(LOG_FILE)
    }
}

/// Load the configuration under `root` and build an engine that reports
/// its events on the returned receiver.
///
/// `paced` applies the configured delay before each stage.
pub async fn build_engine(
    root: &Path,
    mock: bool,
    paced: bool,
) -> Result<(PipelineEngine, UnboundedReceiver<Event>)> {
    let config = load_config(root).await?;
    let catalog = config.catalog()?;

    let backend: Arc<dyn GenerationBackend> = if mock {
        Arc::new(MockBackend::success())
    } else {
        Arc::new(GeminiBackend::from_env(&config.global))
    };

    let (events_tx, events_rx) = unbounded_channel();
    let mut engine = PipelineEngine::new(backend, catalog).with_events(events_tx);
    if paced {
        engine = engine.with_stage_delay(Duration::from_millis(config.global.stage_delay_ms));
    }

    tracing::debug!(
        root = %root.display(),
        mock,
        stages = engine.catalog().len(),
        "engine ready"
    );
    Ok((engine, events_rx))
}

/// Run the pipeline once, printing transitions as they happen.
///
/// # Errors
///
/// Fails when the prompt was rejected or a stage failed, so the process
/// exits non-zero.
pub async fn run_headless(root: &Path, mock: bool, prompt: &str, json: bool) -> Result<()> {
    let (engine, mut events) = build_engine(root, mock, false).await?;
    let names: Vec<String> = engine
        .catalog()
        .definitions()
        .into_iter()
        .map(|d| d.name)
        .collect();

    let printer = tokio::spawn(async move {
        let mut rejected = None;
        while let Some(event) = events.recv().await {
            if let Event::RunRejected { reason } = &event {
                rejected = Some(*reason);
            }
            if !json {
                print_event(&event, &names);
            }
        }
        rejected
    });

    engine.start(prompt).await;
    let state = engine.snapshot();
    drop(engine);
    let rejected = printer.await?;

    if let Some(reason) = rejected {
        bail!("request rejected: {}", describe_rejection(reason));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        for stage in &state.stages {
            if let (StageStatus::Complete, Some(output)) = (stage.status, &stage.output) {
                println!();
                println!("{}", format!("## {}", stage.name).bold().cyan());
                println!("{output}");
            }
        }
    }

    if let Some(error) = state.run_error {
        bail!("pipeline halted: {error}");
    }
    Ok(())
}

fn print_event(event: &Event, names: &[String]) {
    let total = names.len();
    let label = |index: usize| {
        let name = names.get(index).map(String::as_str).unwrap_or("?");
        format!("[{}/{total}] {name}", index + 1)
    };

    match event {
        Event::RunStarted { prompt, .. } => {
            println!(
                "{} {total} stages for \"{prompt}\"",
                "Running".bold()
            );
        }
        Event::StageStatusUpdate {
            index,
            status,
            output,
            ..
        } => match status {
            StageStatus::Active => println!("{} {}", label(*index), "active".yellow()),
            StageStatus::Complete => println!("{} {}", label(*index), "complete".green()),
            StageStatus::Error => println!(
                "{} {} {}",
                label(*index),
                "error".red().bold(),
                output.as_deref().unwrap_or_default()
            ),
            StageStatus::Pending => {}
        },
        Event::RunError { .. } => {}
        Event::RunFinished { outcome, .. } => match outcome {
            RunOutcome::Completed => println!("{}", "Pipeline complete".green().bold()),
            RunOutcome::Failed => println!("{}", "Pipeline halted".red().bold()),
        },
        Event::RunRejected { reason } => {
            eprintln!("{} {}", "Rejected:".red(), describe_rejection(*reason));
        }
    }
}

fn describe_rejection(reason: RejectReason) -> &'static str {
    match reason {
        RejectReason::EmptyPrompt => "the prompt is empty",
        RejectReason::Busy => "a run is already in progress",
    }
}

/// Print the effective catalog and where it came from.
pub async fn list_stages(root: &Path) -> Result<()> {
    let config = load_config(root).await?;
    let catalog = config.catalog()?;

    let source = if config.stages.is_empty() {
        "built-in".to_string()
    } else {
        root.join(PROJECT_DIR).join("stages").display().to_string()
    };
    println!("{} ({source})", "Stages".bold().cyan());

    for (i, definition) in catalog.definitions().iter().enumerate() {
        println!(
            "  {}. {}  {}",
            i + 1,
            definition.name.bold(),
            definition.description.dimmed()
        );
    }
    Ok(())
}

/// Scaffold `.agent-pipeline/` under `root`.
pub async fn init_project(root: &Path, force: bool) -> Result<()> {
    let project_dir = generate_project_structure(InitOptions {
        target_dir: root.to_path_buf(),
        force,
    })
    .await?;

    println!(
        "{} {}",
        "Created".green().bold(),
        project_dir.display()
    );
    println!("Edit the files in stages/ to change prompts, then run `agent-pipeline`.");
    Ok(())
}
