//! Schema version 0.1
//!
//! The first published schema. Configurations carried `HelpText` instead of
//! a description, and column roles were keyed by a closed set of role kinds.
//! Column, hint and highlight layouts are the same as in 1.0.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use pt_core::ReservedColumn;

use super::v1_0::{self, ColumnConfiguration, ColumnRoleEntry, HighlightEntry};
use super::UpgradeToNext;

pub const VERSION: f64 = 0.1;

fn default_version() -> f64 {
    VERSION
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    #[default]
    Line,
    StackedLine,
    StackedBars,
    Flame,
}

impl From<ChartType> for v1_0::ChartType {
    fn from(chart_type: ChartType) -> Self {
        match chart_type {
            ChartType::Line => v1_0::ChartType::Line,
            ChartType::StackedLine => v1_0::ChartType::StackedLine,
            ChartType::StackedBars => v1_0::ChartType::StackedBars,
            ChartType::Flame => v1_0::ChartType::Flame,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationOverTime {
    #[default]
    Current,
    Rate,
    Cumulative,
    Outstanding,
    OutstandingPeak,
}

impl From<AggregationOverTime> for v1_0::AggregationOverTime {
    fn from(aggregation: AggregationOverTime) -> Self {
        match aggregation {
            AggregationOverTime::Current => v1_0::AggregationOverTime::Current,
            AggregationOverTime::Rate => v1_0::AggregationOverTime::Rate,
            AggregationOverTime::Cumulative => v1_0::AggregationOverTime::Cumulative,
            AggregationOverTime::Outstanding => v1_0::AggregationOverTime::Outstanding,
            AggregationOverTime::OutstandingPeak => v1_0::AggregationOverTime::OutstandingPeak,
        }
    }
}

/// Role kinds known to the 0.1 schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnRole {
    StartTime,
    EndTime,
    Duration,
    ResourceId,
    WaitDuration,
    WaitEndTime,
    SwitchInTime,
    NextSwitchOutTime,
    ViewportClipStartTime,
    ViewportClipEndTime,
}

impl ColumnRole {
    /// Name the role is stored under from 1.0 on
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnRole::StartTime => "StartTime",
            ColumnRole::EndTime => "EndTime",
            ColumnRole::Duration => "Duration",
            ColumnRole::ResourceId => "ResourceId",
            ColumnRole::WaitDuration => "WaitDuration",
            ColumnRole::WaitEndTime => "WaitEndTime",
            ColumnRole::SwitchInTime => "SwitchInTime",
            ColumnRole::NextSwitchOutTime => "NextSwitchOutTime",
            ColumnRole::ViewportClipStartTime => "ViewportClipStartTime",
            ColumnRole::ViewportClipEndTime => "ViewportClipEndTime",
        }
    }
}

/// Root of a 0.1 document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrebuiltConfigurations {
    #[serde(default = "default_version")]
    pub version: f64,
    #[serde(default)]
    pub tables: Vec<TableConfigurations>,
}

impl Default for PrebuiltConfigurations {
    fn default() -> Self {
        Self {
            version: VERSION,
            tables: Vec::new(),
        }
    }
}

impl UpgradeToNext for PrebuiltConfigurations {
    type Next = v1_0::PrebuiltConfigurations;

    fn upgrade(self) -> Self::Next {
        v1_0::PrebuiltConfigurations {
            version: v1_0::VERSION,
            tables: self.tables.into_iter().map(UpgradeToNext::upgrade).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableConfigurations {
    pub table_id: Uuid,
    #[serde(default)]
    pub default_configuration_name: Option<String>,
    #[serde(default)]
    pub configurations: Vec<TableConfiguration>,
}

impl UpgradeToNext for TableConfigurations {
    type Next = v1_0::TableConfigurations;

    fn upgrade(self) -> Self::Next {
        v1_0::TableConfigurations {
            table_id: self.table_id,
            default_configuration_name: self.default_configuration_name,
            configurations: self
                .configurations
                .into_iter()
                .map(UpgradeToNext::upgrade)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableConfiguration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub aggregation_over_time: AggregationOverTime,
    #[serde(default)]
    pub initial_filter_query: Option<String>,
    #[serde(default)]
    pub initial_expansion_query: Option<String>,
    #[serde(default)]
    pub initial_selection_query: Option<String>,
    #[serde(default = "default_true")]
    pub initial_filter_should_keep: bool,
    #[serde(default)]
    pub graph_filter_top_value: i32,
    #[serde(default)]
    pub graph_filter_threshold_value: f64,
    #[serde(default)]
    pub graph_filter_column_name: Option<String>,
    #[serde(default)]
    pub graph_filter_column_guid: Option<Uuid>,
    #[serde(default)]
    pub help_text: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfiguration>,
    #[serde(default)]
    pub highlight_entries: Vec<HighlightEntry>,
    #[serde(default)]
    pub column_roles: IndexMap<ColumnRole, ColumnRoleEntry>,
}

impl TableConfiguration {
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
            help_text: None,
            columns: Vec::new(),
            highlight_entries: Vec::new(),
            column_roles: IndexMap::new(),
        }
    }
}

impl UpgradeToNext for TableConfiguration {
    type Next = v1_0::TableConfiguration;

    /// `HelpText` becomes `Description` and role kinds become role names.
    ///
    /// Role entries pointing at a reserved metadata column are dropped: 0.1
    /// did not forbid them, but no 1.0 configuration can hold one.
    fn upgrade(self) -> Self::Next {
        let name = self.name;
        let column_roles = self
            .column_roles
            .into_iter()
            .filter_map(|(role, entry)| match ReservedColumn::from_guid(&entry.column_guid) {
                Some(reserved) => {
                    debug!(
                        configuration = %name,
                        role = role.as_str(),
                        column = %reserved,
                        "dropped role bound to a metadata column"
                    );
                    None
                }
                None => Some((role.as_str().to_string(), entry)),
            })
            .collect();

        v1_0::TableConfiguration {
            chart_type: self.chart_type.into(),
            aggregation_over_time: self.aggregation_over_time.into(),
            initial_filter_query: self.initial_filter_query,
            initial_expansion_query: self.initial_expansion_query,
            initial_selection_query: self.initial_selection_query,
            initial_filter_should_keep: self.initial_filter_should_keep,
            graph_filter_top_value: self.graph_filter_top_value,
            graph_filter_threshold_value: self.graph_filter_threshold_value,
            graph_filter_column_name: self.graph_filter_column_name,
            graph_filter_column_guid: self.graph_filter_column_guid,
            description: self.help_text,
            columns: self.columns,
            highlight_entries: self.highlight_entries,
            column_roles,
            name,
        }
    }
}
