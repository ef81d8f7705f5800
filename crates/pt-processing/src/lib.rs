//! Data processor contract for the performance toolkit
//!
//! A processor turns a data source into tables. This crate defines what a
//! processor must provide, how the host enables optional tables, and how table
//! construction is dispatched once processing completes.

pub mod builder;
pub mod descriptor;
pub mod environment;
pub mod processor;
pub mod progress;
pub mod source_info;

use thiserror::Error;
use uuid::Uuid;

// Re-exports
pub use builder::{
    BuildTableAction, CellValue, ColumnProjection, TableBuilder, TableBuilderFactory,
    TableBuilderWithRowCount,
};
pub use descriptor::{DataCookerPath, TableDescriptor};
pub use environment::{
    ApplicationEnvironment, DefaultProcessorEnvironment, ProcessorEnvironment,
    StaticApplicationEnvironment,
};
pub use processor::{
    CustomDataProcessor, ProcessingContext, ProcessingOutcome, ProcessorCore, ProcessorState,
};
pub use progress::{MonotonicProgress, NoProgress, Progress, ProgressFn};
pub use source_info::DataSourceInfo;
pub use tokio_util::sync::CancellationToken;

/// Errors that can occur while processing or building tables
#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("table '{name}' ({guid}) is not registered with this processor")]
    UnknownTable { guid: Uuid, name: String },

    #[error("the data source has not been processed yet")]
    NotYetProcessed,

    #[error("processing was cancelled")]
    ProcessingCancelled,

    #[error("processing failed: {0}")]
    ProcessingFailed(#[source] anyhow::Error),

    #[error("tables cannot be enabled once table building has started")]
    TablesLocked,

    #[error("this processor has already processed its data source")]
    AlreadyProcessed,

    #[error("invalid time range: first event {first}, last event {last}")]
    InvalidTimeRange { first: i64, last: i64 },
}

impl ProcessingError {
    /// Cancellation is an outcome the host asked for, not a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProcessingError::ProcessingCancelled)
    }
}
