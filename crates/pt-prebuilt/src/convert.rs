//! Conversion between current schema documents and live configurations
//!
//! Going from a document to a [`pt_core::TableConfiguration`] validates the
//! column sequence and every role binding, so a document that loads cleanly
//! can still be rejected here.

use indexmap::IndexMap;
use uuid::Uuid;

use pt_core::{
    AggregationMode, AggregationOverTime, ChartType, ColumnConfiguration, ColumnMetadata,
    ConfigurationError, HighlightEntry, SortOrder, TextAlignment, UiHints,
};

use crate::dto::v1_0;
use crate::{Result, SchemaError};

/// Live configurations of one table, as loaded from a document
#[derive(Debug, Clone, PartialEq)]
pub struct PrebuiltTableConfigurations {
    pub table_id: Uuid,
    pub default_configuration_name: Option<String>,
    pub configurations: Vec<pt_core::TableConfiguration>,
}

impl PrebuiltTableConfigurations {
    /// The configuration named as default, or the first one
    pub fn default_configuration(&self) -> Option<&pt_core::TableConfiguration> {
        self.default_configuration_name
            .as_deref()
            .and_then(|name| self.configurations.iter().find(|c| c.name == name))
            .or_else(|| self.configurations.first())
    }
}

impl v1_0::PrebuiltConfigurations {
    /// Validate and convert every configuration in the document
    pub fn into_table_configurations(self) -> Result<Vec<PrebuiltTableConfigurations>> {
        self.tables
            .into_iter()
            .map(|table| {
                let table_id = table.table_id;
                let configurations = table
                    .configurations
                    .into_iter()
                    .map(|configuration| {
                        let name = configuration.name.clone();
                        pt_core::TableConfiguration::try_from(configuration).map_err(|source| {
                            SchemaError::InvalidConfiguration {
                                table: table_id,
                                configuration: name,
                                source,
                            }
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;

                Ok(PrebuiltTableConfigurations {
                    table_id,
                    default_configuration_name: table.default_configuration_name,
                    configurations,
                })
            })
            .collect()
    }
}

/// Maps a document enum onto its live counterpart and back, variant for variant
macro_rules! enum_conversions {
    ($($name:ident { $($variant:ident),+ $(,)? })+) => {
        $(
            impl From<v1_0::$name> for $name {
                fn from(value: v1_0::$name) -> Self {
                    match value {
                        $(v1_0::$name::$variant => $name::$variant,)+
                    }
                }
            }

            impl From<$name> for v1_0::$name {
                fn from(value: $name) -> Self {
                    match value {
                        $($name::$variant => v1_0::$name::$variant,)+
                    }
                }
            }
        )+
    };
}

enum_conversions! {
    ChartType { Line, StackedLine, StackedBars, Flame }
    AggregationOverTime { Current, Rate, Cumulative, Outstanding, OutstandingPeak }
    TextAlignment { Left, Right, Center }
    SortOrder { None, Ascending, Descending }
    AggregationMode { None, Sum, Average, Min, Max, Count, UniqueCount, Peak }
}

impl From<v1_0::UiHints> for UiHints {
    fn from(hints: v1_0::UiHints) -> Self {
        Self {
            is_visible: hints.is_visible,
            width: hints.width,
            text_alignment: hints.text_alignment.into(),
            sort_priority: hints.sort_priority,
            sort_order: hints.sort_order.into(),
            aggregation_mode: hints.aggregation_mode.into(),
            cell_format: hints.cell_format,
        }
    }
}

impl From<&UiHints> for v1_0::UiHints {
    fn from(hints: &UiHints) -> Self {
        Self {
            is_visible: hints.is_visible,
            width: hints.width,
            text_alignment: hints.text_alignment.into(),
            sort_priority: hints.sort_priority,
            sort_order: hints.sort_order.into(),
            aggregation_mode: hints.aggregation_mode.into(),
            cell_format: hints.cell_format.clone(),
        }
    }
}

impl From<v1_0::ColumnConfiguration> for ColumnConfiguration {
    fn from(column: v1_0::ColumnConfiguration) -> Self {
        let metadata = ColumnMetadata {
            guid: column.metadata.guid,
            name: column.metadata.name,
            description: column.metadata.description,
            short_description: column.metadata.short_description,
        };
        Self {
            metadata,
            variant_guid: column.variant_guid,
            display_hints: column.display_hints.map(Into::into).unwrap_or_default(),
        }
    }
}

impl From<&ColumnConfiguration> for v1_0::ColumnConfiguration {
    /// Default hints are left out of the document
    fn from(column: &ColumnConfiguration) -> Self {
        Self {
            metadata: v1_0::ColumnMetadata {
                guid: column.metadata.guid,
                name: column.metadata.name.clone(),
                description: column.metadata.description.clone(),
                short_description: column.metadata.short_description.clone(),
            },
            variant_guid: column.variant_guid,
            display_hints: (column.display_hints != UiHints::default())
                .then(|| (&column.display_hints).into()),
        }
    }
}

impl From<v1_0::HighlightEntry> for HighlightEntry {
    fn from(entry: v1_0::HighlightEntry) -> Self {
        Self {
            highlight_query: entry.highlight_query,
            start_time_column: entry.start_time_column_guid,
            end_time_column: entry.end_time_column_guid,
            duration_column: entry.duration_column_guid,
            color: entry.color,
        }
    }
}

impl From<&HighlightEntry> for v1_0::HighlightEntry {
    fn from(entry: &HighlightEntry) -> Self {
        Self {
            highlight_query: entry.highlight_query.clone(),
            start_time_column_guid: entry.start_time_column,
            end_time_column_guid: entry.end_time_column,
            duration_column_guid: entry.duration_column,
            color: entry.color,
        }
    }
}

impl TryFrom<v1_0::TableConfiguration> for pt_core::TableConfiguration {
    type Error = ConfigurationError;

    fn try_from(dto: v1_0::TableConfiguration) -> std::result::Result<Self, Self::Error> {
        let mut configuration = pt_core::TableConfiguration::new(dto.name);
        configuration.chart_type = dto.chart_type.into();
        configuration.aggregation_over_time = dto.aggregation_over_time.into();
        configuration.initial_filter_query = dto.initial_filter_query;
        configuration.initial_expansion_query = dto.initial_expansion_query;
        configuration.initial_selection_query = dto.initial_selection_query;
        configuration.initial_filter_should_keep = dto.initial_filter_should_keep;
        configuration.graph_filter_top_value = dto.graph_filter_top_value;
        configuration.graph_filter_threshold_value = dto.graph_filter_threshold_value;
        configuration.graph_filter_column_name = dto.graph_filter_column_name;
        configuration.graph_filter_column_guid = dto.graph_filter_column_guid;
        configuration.description = dto.description;

        configuration.set_columns(dto.columns.into_iter().map(ColumnConfiguration::from))?;
        configuration.set_highlight_entries(dto.highlight_entries.into_iter().map(HighlightEntry::from));
        for (role, entry) in dto.column_roles {
            configuration.add_column_role_guid(&role, entry.column_guid)?;
        }

        Ok(configuration)
    }
}

impl From<&pt_core::TableConfiguration> for v1_0::TableConfiguration {
    /// Role entries record the name of their column when the column is part
    /// of the configuration.
    fn from(configuration: &pt_core::TableConfiguration) -> Self {
        let column_roles: IndexMap<String, v1_0::ColumnRoleEntry> = configuration
            .column_roles()
            .iter()
            .map(|(role, guid)| {
                let column_name = configuration
                    .columns()
                    .iter()
                    .find(|c| c.guid() == *guid)
                    .map(|c| c.metadata.name.clone());
                (
                    role.clone(),
                    v1_0::ColumnRoleEntry {
                        column_guid: *guid,
                        column_name,
                    },
                )
            })
            .collect();

        Self {
            name: configuration.name.clone(),
            chart_type: configuration.chart_type.into(),
            aggregation_over_time: configuration.aggregation_over_time.into(),
            initial_filter_query: configuration.initial_filter_query.clone(),
            initial_expansion_query: configuration.initial_expansion_query.clone(),
            initial_selection_query: configuration.initial_selection_query.clone(),
            initial_filter_should_keep: configuration.initial_filter_should_keep,
            graph_filter_top_value: configuration.graph_filter_top_value,
            graph_filter_threshold_value: configuration.graph_filter_threshold_value,
            graph_filter_column_name: configuration.graph_filter_column_name.clone(),
            graph_filter_column_guid: configuration.graph_filter_column_guid,
            description: configuration.description.clone(),
            columns: configuration.columns().iter().map(Into::into).collect(),
            highlight_entries: configuration
                .highlight_entries()
                .iter()
                .map(Into::into)
                .collect(),
            column_roles,
        }
    }
}
