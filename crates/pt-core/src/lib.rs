//! Core types for the performance toolkit
//!
//! This crate provides column identity, the table configuration model with its
//! column-sequence and role rules, processor options and the lifecycle event bus.

pub mod column;
pub mod events;
pub mod options;
pub mod table_config;

use thiserror::Error;

// Re-export commonly used types
pub use column::{
    AggregationMode, ColumnConfiguration, ColumnMetadata, ReservedColumn, SortOrder,
    TextAlignment, UiHints,
};
pub use events::{EventBus, ProcessingEvent};
pub use options::{OptionInstance, OptionSpec, PluginOption, PluginOptionValue, ProcessorOptions};
pub use table_config::{
    validate_columns, AggregationOverTime, ChartType, ColumnOrderViolation, HighlightEntry,
    TableConfiguration,
};

/// Errors raised while editing a table configuration.
///
/// These are always raised before any state changes, so the configuration
/// keeps its previous columns and roles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid column sequence at position {position}: {violation}")]
    InvalidColumnSequence {
        violation: ColumnOrderViolation,
        position: usize,
    },

    #[error("metadata column '{}' may not be assigned a role (role '{role}')", .column.name())]
    InvalidRoleAssignment {
        role: String,
        column: ReservedColumn,
    },

    #[error("column role name must not be blank")]
    BlankRoleName,
}

impl ConfigurationError {
    /// The ordering rule that rejected a column sequence, if any
    pub fn violation(&self) -> Option<ColumnOrderViolation> {
        match self {
            ConfigurationError::InvalidColumnSequence { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}
