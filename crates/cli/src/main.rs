use clap::{Parser, Subcommand};
use color_eyre::eyre::eyre;
use std::path::PathBuf;

mod commands;
mod logging;

use logging::LogTarget;

#[derive(Parser)]
#[command(name = "agent-pipeline")]
#[command(author, version, about = "Run a request through a fixed sequence of AI agent stages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Project root containing `.agent-pipeline/` (default: current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Use the offline mock backend instead of Gemini
    #[arg(long, global = true)]
    mock: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive pipeline dashboard (default)
    Tui,

    /// Run the pipeline once without the TUI
    Run {
        /// The user request every stage works on
        prompt: String,

        /// Print the final run state as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the stages of the effective catalog
    Stages,

    /// Create `.agent-pipeline/` with editable copies of the built-in stages
    Init {
        /// Overwrite the template files of an existing directory
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            logging::init(cli.verbose, LogTarget::File(commands::tui_log_path(&root)))?;
            let (engine, events) = commands::build_engine(&root, cli.mock, true).await?;
            ap_tui::run_app(std::sync::Arc::new(engine), events)
                .await
                .map_err(|e| eyre!(e))?;
        }
        Commands::Run { prompt, json } => {
            logging::init(cli.verbose, LogTarget::Stderr)?;
            commands::run_headless(&root, cli.mock, &prompt, json).await?;
        }
        Commands::Stages => {
            logging::init(cli.verbose, LogTarget::Stderr)?;
            commands::list_stages(&root).await?;
        }
        Commands::Init { force } => {
            logging::init(cli.verbose, LogTarget::Stderr)?;
            commands::init_project(&root, force).await?;
        }
    }

    Ok(())
}
