//! Headless engine for the performance toolkit
//!
//! Drives a processor through its lifecycle without a GUI: enables the
//! requested tables, runs processing, then materializes every metadata table
//! and every enabled table into Arrow record batches.

pub mod config;
pub mod demo;
pub mod engine;
pub mod record_batch_builder;

use std::path::PathBuf;

use pt_processing::ProcessingError;
use thiserror::Error;

// Re-exports
pub use config::EngineConfig;
pub use demo::DemoTraceProcessor;
pub use engine::{Engine, EngineRequest, EngineRun, TableSelector};
pub use record_batch_builder::{BuiltTable, RecordBatchBuilderFactory, RecordBatchTableBuilder};

/// Errors that can occur while running the engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("no table matches '{0}'")]
    UnknownTable(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Processing(err) if err.is_cancelled())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
