//! Schema version 1.0, the current schema
//!
//! Column roles are keyed by role name, and each configuration carries a
//! `Description`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const VERSION: f64 = 1.0;

fn default_version() -> f64 {
    VERSION
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    80
}

/// Chart kinds written by 1.0 documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartType {
    #[default]
    Line,
    StackedLine,
    StackedBars,
    Flame,
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

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlignment {
    #[default]
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationMode {
    #[default]
    None,
    Sum,
    Average,
    Min,
    Max,
    Count,
    UniqueCount,
    Peak,
}

/// Root of a 1.0 document
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

/// Every saved configuration of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TableConfigurations {
    pub table_id: Uuid,
    #[serde(default)]
    pub default_configuration_name: Option<String>,
    #[serde(default)]
    pub configurations: Vec<TableConfiguration>,
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
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnConfiguration>,
    #[serde(default)]
    pub highlight_entries: Vec<HighlightEntry>,
    #[serde(default)]
    pub column_roles: IndexMap<String, ColumnRoleEntry>,
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
            description: None,
            columns: Vec::new(),
            highlight_entries: Vec::new(),
            column_roles: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnMetadata {
    pub guid: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UiHints {
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default)]
    pub text_alignment: TextAlignment,
    #[serde(default)]
    pub sort_priority: u32,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default)]
    pub aggregation_mode: AggregationMode,
    #[serde(default)]
    pub cell_format: Option<String>,
}

impl Default for UiHints {
    fn default() -> Self {
        Self {
            is_visible: true,
            width: default_width(),
            text_alignment: TextAlignment::default(),
            sort_priority: 0,
            sort_order: SortOrder::default(),
            aggregation_mode: AggregationMode::default(),
            cell_format: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnConfiguration {
    pub metadata: ColumnMetadata,
    #[serde(default)]
    pub variant_guid: Option<Uuid>,
    /// Absent hints mean the defaults
    #[serde(default)]
    pub display_hints: Option<UiHints>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HighlightEntry {
    pub highlight_query: String,
    #[serde(default)]
    pub start_time_column_guid: Option<Uuid>,
    #[serde(default)]
    pub end_time_column_guid: Option<Uuid>,
    #[serde(default)]
    pub duration_column_guid: Option<Uuid>,
    /// RGBA
    pub color: [u8; 4],
}

/// The column filling a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColumnRoleEntry {
    pub column_guid: Uuid,
    #[serde(default)]
    pub column_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let json = r#"{
            "Version": 1.0,
            "Tables": [{
                "TableId": "0b5f8a9e-3f0a-4f55-9d39-1c3c8f0f2a11",
                "Configurations": [{ "Name": "Minimal" }]
            }]
        }"#;

        let document: PrebuiltConfigurations = serde_json::from_str(json).unwrap();
        let configuration = &document.tables[0].configurations[0];
        assert_eq!(configuration.name, "Minimal");
        assert!(configuration.initial_filter_should_keep);
        assert_eq!(configuration.chart_type, ChartType::Line);
        assert!(configuration.column_roles.is_empty());
        assert_eq!(document.tables[0].default_configuration_name, None);
    }

    #[test]
    fn test_enum_names_are_fixed() {
        let json = r#"{
            "Name": "Names",
            "ChartType": "StackedBars",
            "AggregationOverTime": "OutstandingPeak",
            "Columns": [{
                "Metadata": { "Guid": "6f3f1c3e-5d2e-4a1b-9f43-0b7f1e2f4a03" },
                "DisplayHints": {
                    "TextAlignment": "Center",
                    "SortOrder": "Ascending",
                    "AggregationMode": "UniqueCount"
                }
            }]
        }"#;

        let configuration: TableConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(configuration.chart_type, ChartType::StackedBars);
        assert_eq!(configuration.aggregation_over_time, AggregationOverTime::OutstandingPeak);
        let hints = configuration.columns[0].display_hints.clone().unwrap();
        assert_eq!(hints.text_alignment, TextAlignment::Center);
        assert_eq!(hints.sort_order, SortOrder::Ascending);
        assert_eq!(hints.aggregation_mode, AggregationMode::UniqueCount);
        assert!(hints.is_visible);
        assert_eq!(hints.width, 80);

        let rejected = r#"{ "Name": "Unknown", "ChartType": "Pie" }"#;
        assert!(serde_json::from_str::<TableConfiguration>(rejected).is_err());
    }

    #[test]
    fn test_roles_keep_document_order() {
        let json = r#"{
            "Name": "Roles",
            "ColumnRoles": {
                "EndTime": { "ColumnGuid": "6f3f1c3e-5d2e-4a1b-9f43-0b7f1e2f4a01" },
                "StartTime": { "ColumnGuid": "6f3f1c3e-5d2e-4a1b-9f43-0b7f1e2f4a02" }
            }
        }"#;

        let configuration: TableConfiguration = serde_json::from_str(json).unwrap();
        let roles: Vec<&str> = configuration.column_roles.keys().map(String::as_str).collect();
        assert_eq!(roles, ["EndTime", "StartTime"]);
    }
}
