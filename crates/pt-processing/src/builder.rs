//! Table builder contracts
//!
//! A build delegate receives a fresh builder and populates it: row count,
//! columns with their projections, and the table configurations that ship with
//! the table. Builders come from a host supplied factory.

use std::fmt;
use std::sync::Arc;

use pt_core::{ColumnConfiguration, TableConfiguration};

use crate::descriptor::TableDescriptor;

/// Delegate registered per table that populates a builder
pub type BuildTableAction = Arc<dyn Fn(&mut dyn TableBuilder) + Send + Sync>;

/// Projection from a row index to the cell shown in a column
pub type ColumnProjection = Arc<dyn Fn(usize) -> CellValue + Send + Sync>;

/// Wrap a closure as a build delegate
pub fn build_action<F>(action: F) -> BuildTableAction
where
    F: Fn(&mut dyn TableBuilder) + Send + Sync + 'static,
{
    Arc::new(action)
}

/// Wrap a closure as a column projection
pub fn project<F>(projection: F) -> ColumnProjection
where
    F: Fn(usize) -> CellValue + Send + Sync + 'static,
{
    Arc::new(projection)
}

/// Value of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Nanoseconds relative to the start of the trace
    TimestampNs(i64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(v) => write!(f, "{v}"),
            CellValue::Int(v) => write!(f, "{v}"),
            CellValue::UInt(v) => write!(f, "{v}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(v) => f.write_str(v),
            CellValue::TimestampNs(v) => write!(f, "{v}ns"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::UInt(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// Receives the shape and presets of a table
pub trait TableBuilder: Send {
    /// Add a configuration the table ships with
    fn add_table_configuration(&mut self, configuration: TableConfiguration);

    /// Configuration applied when the table is first opened
    fn set_default_table_configuration(&mut self, configuration: TableConfiguration);

    /// Fix the number of rows; columns are added on the returned builder
    fn set_row_count(&mut self, row_count: usize) -> &mut dyn TableBuilderWithRowCount;
}

/// Builder stage that accepts columns once the row count is known
pub trait TableBuilderWithRowCount {
    fn row_count(&self) -> usize;

    fn add_column(
        &mut self,
        column: ColumnConfiguration,
        projection: ColumnProjection,
    ) -> &mut dyn TableBuilderWithRowCount;
}

/// Hands out a fresh builder per table.
///
/// Each call must return a builder that has not been handed out before.
pub trait TableBuilderFactory {
    fn create(&mut self, descriptor: &TableDescriptor) -> &mut dyn TableBuilder;
}
