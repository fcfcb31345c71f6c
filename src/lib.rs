//! Streams MongoDB collections into MySQL tables.
//!
//! Each table runs as `mongoexport | transform | mysql`: exported JSON lines
//! are flattened into tab separated rows and bulk loaded with
//! `LOAD DATA LOCAL INFILE '/dev/stdin'`.

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliArgs;

pub use crate::app::pipelines::table_pipeline::TablePipeline;
pub use crate::config::AppConfig;
pub use crate::core::{etl::EtlEngine, pipeline::PipelineRunner, transform::LineTransformer};
pub use crate::utils::error::{EtlError, Result};
