//! Initialization module for creating `.agent-pipeline` directory structures.
//!
//! Generates a project directory pre-populated with:
//! - Global configuration (`config.toml`)
//! - One editable stage definition per built-in stage (`stages/*.md`)
//!
//! # Example
//!
//! ```no_run
//! use ap_core::init::{InitOptions, generate_project_structure};
//! use std::path::PathBuf;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let options = InitOptions {
//!     target_dir: PathBuf::from("."),
//!     force: false,
//! };
//!
//! generate_project_structure(options).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod generator;
pub mod templates;

pub use error::{InitError, InitResult};
pub use generator::{generate_project_structure, InitOptions};
pub use templates::{get_template, list_templates};
