//! Table display configuration
//!
//! A named bundle of presentation settings for a table: which columns are
//! shown and in what order, which columns fill the named roles, the chart
//! type and the initial queries.

mod validation;

pub use validation::{validate_columns, ColumnOrderViolation};

use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::column::{ColumnConfiguration, ReservedColumn};
use crate::ConfigurationError;

/// Kind of chart drawn for the graphed columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ChartType {
    #[default]
    Line,
    StackedLine,
    StackedBars,
    Flame,
}

/// How graphed values accumulate over time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AggregationOverTime {
    #[default]
    Current,
    Rate,
    Cumulative,
    Outstanding,
    OutstandingPeak,
}

/// A query whose matching rows are highlighted
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HighlightEntry {
    pub highlight_query: String,
    pub start_time_column: Option<Uuid>,
    pub end_time_column: Option<Uuid>,
    pub duration_column: Option<Uuid>,
    /// Highlight color (RGBA)
    pub color: [u8; 4],
}

impl HighlightEntry {
    /// Highlight for `highlight_query` with no time columns bound
    pub fn new(highlight_query: impl Into<String>, color: [u8; 4]) -> Self {
        Self {
            highlight_query: highlight_query.into(),
            start_time_column: None,
            end_time_column: None,
            duration_column: None,
            color,
        }
    }
}

/// Configuration of a table: how columns are arranged and other details of
/// the presentation of its data.
///
/// Columns and roles are only changed through methods that enforce their
/// rules. A rejected change leaves the configuration untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfiguration {
    /// Identifies the configuration; may be empty
    pub name: String,

    pub chart_type: ChartType,

    pub aggregation_over_time: AggregationOverTime,

    pub initial_filter_query: Option<String>,

    pub initial_expansion_query: Option<String>,

    pub initial_selection_query: Option<String>,

    /// Whether rows matching the initial filter are kept (filter-in) or
    /// dropped (filter-out)
    pub initial_filter_should_keep: bool,

    pub graph_filter_top_value: i32,

    pub graph_filter_threshold_value: f64,

    pub graph_filter_column_name: Option<String>,

    pub graph_filter_column_guid: Option<Uuid>,

    pub description: Option<String>,

    columns: Vec<ColumnConfiguration>,

    highlight_entries: Vec<HighlightEntry>,

    column_roles: IndexMap<String, Uuid>,
}

impl Default for TableConfiguration {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl TableConfiguration {
    /// Create an empty configuration with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chart_type: ChartType::default(),
            aggregation_over_time: AggregationOverTime::default(),
            initial_filter_query: None,
            initial_expansion_query: None,
            initial_selection_query: None,
            initial_filter_should_keep: true,
            graph_filter_top_value: 0,
            graph_filter_threshold_value: 0.0,
            graph_filter_column_name: None,
            graph_filter_column_guid: None,
            description: None,
            columns: Vec::new(),
            highlight_entries: Vec::new(),
            column_roles: IndexMap::new(),
        }
    }

    /// Columns in the order they are displayed
    pub fn columns(&self) -> &[ColumnConfiguration] {
        &self.columns
    }

    /// Replace the column sequence.
    ///
    /// The whole sequence is rejected if it breaks a reserved column rule;
    /// the previous sequence then stays installed.
    pub fn set_columns<I>(&mut self, columns: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = ColumnConfiguration>,
    {
        let columns: Vec<ColumnConfiguration> = columns.into_iter().collect();
        if let Err(err) = validate_columns(&columns) {
            debug!(configuration = %self.name, error = %err, "rejected column sequence");
            return Err(err);
        }
        self.columns = columns;
        Ok(())
    }

    /// Builder-style variant of [`TableConfiguration::set_columns`]
    pub fn with_columns<I>(mut self, columns: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = ColumnConfiguration>,
    {
        self.set_columns(columns)?;
        Ok(self)
    }

    pub fn highlight_entries(&self) -> &[HighlightEntry] {
        &self.highlight_entries
    }

    pub fn set_highlight_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = HighlightEntry>,
    {
        self.highlight_entries = entries.into_iter().collect();
    }

    /// Role name to column GUID bindings, in insertion order
    pub fn column_roles(&self) -> &IndexMap<String, Uuid> {
        &self.column_roles
    }

    /// Column bound to a role, if any
    pub fn column_for_role(&self, role: &str) -> Option<Uuid> {
        self.column_roles.get(role).copied()
    }

    /// Place a column into a role. Only the base column is recorded; any
    /// variant on the configuration is ignored.
    pub fn add_column_role(
        &mut self,
        role: &str,
        column: &ColumnConfiguration,
    ) -> Result<(), ConfigurationError> {
        self.add_column_role_guid(role, column.guid())
    }

    /// Place the column with the given GUID into a role, replacing any
    /// previous owner of the role.
    pub fn add_column_role_guid(&mut self, role: &str, guid: Uuid) -> Result<(), ConfigurationError> {
        if let Some(column) = ReservedColumn::from_guid(&guid) {
            return Err(ConfigurationError::InvalidRoleAssignment {
                role: role.to_string(),
                column,
            });
        }
        if role.trim().is_empty() {
            return Err(ConfigurationError::BlankRoleName);
        }

        self.column_roles.insert(role.to_string(), guid);
        Ok(())
    }

    /// Remove whatever column fills the role. Does nothing if the role is unset.
    pub fn remove_column_role(&mut self, role: &str) {
        self.column_roles.shift_remove(role);
    }

    /// Reserved columns present in the column sequence, in order
    pub fn reserved_columns(&self) -> impl Iterator<Item = ReservedColumn> + '_ {
        self.columns.iter().filter_map(ColumnConfiguration::reserved)
    }
}
