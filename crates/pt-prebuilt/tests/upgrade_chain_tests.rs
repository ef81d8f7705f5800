use proptest::prelude::*;
use pt_core::ReservedColumn;
use pt_prebuilt::dto::{pre_v1, v1_0};
use pt_prebuilt::{
    to_json_string, PrebuiltConfigurationsLoader, SchemaError, UpgradeToNext,
    VersionedPrebuiltConfigurations,
};
use uuid::Uuid;

const LEGACY_DOCUMENT: &str = r#"{
    "Version": 0.1,
    "Tables": [
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a10",
            "DefaultConfigurationName": "Utilization by Process",
            "Configurations": [
                {
                    "Name": "Utilization by Process",
                    "ChartType": "StackedLine",
                    "AggregationOverTime": "Rate",
                    "InitialFilterQuery": "[Process]:=\"Idle\"",
                    "InitialFilterShouldKeep": false,
                    "GraphFilterTopValue": 10,
                    "HelpText": "CPU time by process",
                    "Columns": [
                        { "Metadata": { "Guid": "11111111-0000-4000-8000-000000000001", "Name": "Process" } },
                        { "Metadata": { "Guid": "319e867f-245a-436e-9735-db620f844edc", "Name": "Pivot Column" } },
                        { "Metadata": { "Guid": "11111111-0000-4000-8000-000000000002", "Name": "Timestamp" } },
                        { "Metadata": { "Guid": "a5ce8faf-5668-49fc-82bc-d2c482086c06", "Name": "Graph Column" } },
                        {
                            "Metadata": { "Guid": "11111111-0000-4000-8000-000000000003", "Name": "Weight" },
                            "DisplayHints": { "Width": 120, "AggregationMode": "Sum", "SortOrder": "Descending" }
                        }
                    ],
                    "ColumnRoles": {
                        "StartTime": { "ColumnGuid": "11111111-0000-4000-8000-000000000002", "ColumnName": "Timestamp" },
                        "Duration": { "ColumnGuid": "11111111-0000-4000-8000-000000000003", "ColumnName": "Weight" }
                    }
                }
            ]
        },
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a11",
            "Configurations": [
                { "Name": "First", "HelpText": "one" },
                { "Name": "Second" }
            ]
        },
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a12",
            "Configurations": []
        }
    ]
}"#;

const CURRENT_DOCUMENT: &str = r#"{
    "Version": 1.0,
    "Tables": [
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a10",
            "DefaultConfigurationName": "Utilization by Process",
            "Configurations": [
                {
                    "Name": "Utilization by Process",
                    "ChartType": "StackedLine",
                    "AggregationOverTime": "Rate",
                    "InitialFilterQuery": "[Process]:=\"Idle\"",
                    "InitialFilterShouldKeep": false,
                    "GraphFilterTopValue": 10,
                    "Description": "CPU time by process",
                    "Columns": [
                        { "Metadata": { "Guid": "11111111-0000-4000-8000-000000000001", "Name": "Process" } },
                        { "Metadata": { "Guid": "319e867f-245a-436e-9735-db620f844edc", "Name": "Pivot Column" } },
                        { "Metadata": { "Guid": "11111111-0000-4000-8000-000000000002", "Name": "Timestamp" } },
                        { "Metadata": { "Guid": "a5ce8faf-5668-49fc-82bc-d2c482086c06", "Name": "Graph Column" } },
                        {
                            "Metadata": { "Guid": "11111111-0000-4000-8000-000000000003", "Name": "Weight" },
                            "DisplayHints": { "Width": 120, "AggregationMode": "Sum", "SortOrder": "Descending" }
                        }
                    ],
                    "ColumnRoles": {
                        "StartTime": { "ColumnGuid": "11111111-0000-4000-8000-000000000002", "ColumnName": "Timestamp" },
                        "Duration": { "ColumnGuid": "11111111-0000-4000-8000-000000000003", "ColumnName": "Weight" }
                    }
                }
            ]
        },
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a11",
            "Configurations": [
                { "Name": "First", "Description": "one" },
                { "Name": "Second" }
            ]
        },
        {
            "TableId": "5b6d4ad4-3f1d-4d7a-8f53-0c2a0d8e6a12",
            "Configurations": []
        }
    ]
}"#;

#[test]
fn legacy_document_upgrades_to_hand_written_current() {
    let loader = PrebuiltConfigurationsLoader::new();

    let upgraded = loader.load_str(LEGACY_DOCUMENT).unwrap();
    let current = loader.load_str(CURRENT_DOCUMENT).unwrap();

    assert_eq!(upgraded, current);
}

#[test]
fn legacy_tables_upgrade_one_for_one() {
    let legacy: pre_v1::PrebuiltConfigurations = serde_json::from_str(LEGACY_DOCUMENT).unwrap();
    let upgraded = legacy.clone().upgrade();

    assert_eq!(upgraded.tables.len(), legacy.tables.len());
    for (old, new) in legacy.tables.iter().zip(&upgraded.tables) {
        assert_eq!(new.table_id, old.table_id);
        assert_eq!(new.configurations.len(), old.configurations.len());
        for (old, new) in old.configurations.iter().zip(&new.configurations) {
            assert_eq!(new.description, old.help_text);
        }
    }
}

#[test]
fn upgraded_document_converts_to_live_configurations() {
    let loader = PrebuiltConfigurationsLoader::new();
    let tables = loader.load_table_configurations(LEGACY_DOCUMENT).unwrap();

    assert_eq!(tables.len(), 3);
    let utilization = tables[0].default_configuration().unwrap();
    assert_eq!(utilization.name, "Utilization by Process");
    assert_eq!(
        utilization.reserved_columns().collect::<Vec<_>>(),
        [ReservedColumn::Pivot, ReservedColumn::Graph]
    );
    assert_eq!(utilization.columns()[4].display_hints.width, 120);
    assert!(!utilization.initial_filter_should_keep);
    let roles: Vec<&str> = utilization.column_roles().keys().map(String::as_str).collect();
    assert_eq!(roles, ["StartTime", "Duration"]);
    assert!(tables[2].default_configuration().is_none());
}

#[test]
fn written_document_loads_back_unchanged() {
    let loader = PrebuiltConfigurationsLoader::new();
    let current = loader.load_str(LEGACY_DOCUMENT).unwrap();

    let json = to_json_string(&current).unwrap();

    assert!(json.trim_start().starts_with("{\n  \"Version\": 1.0"));
    assert_eq!(loader.load_str(&json).unwrap(), current);
}

#[test]
fn batch_failures_stay_with_their_artifact() {
    let loader = PrebuiltConfigurationsLoader::new();
    let artifacts = [
        LEGACY_DOCUMENT,
        r#"{ "Version": 3.5, "Tables": [] }"#,
        CURRENT_DOCUMENT,
        r#"{ "Tables": [] }"#,
        r#"{ "Version": 1.0, "Tables": [{ "Configurations": [] }] }"#,
    ];

    let results = loader.load_batch(artifacts);

    assert_eq!(results.len(), 5);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SchemaError::UnsupportedSchemaVersion(v)) if v == 3.5));
    assert!(results[2].is_ok());
    assert!(matches!(results[3], Err(SchemaError::MissingVersion)));
    assert!(matches!(results[4], Err(SchemaError::Malformed { .. })));
}

fn role_strategy() -> impl Strategy<Value = pre_v1::ColumnRole> {
    prop_oneof![
        Just(pre_v1::ColumnRole::StartTime),
        Just(pre_v1::ColumnRole::EndTime),
        Just(pre_v1::ColumnRole::Duration),
        Just(pre_v1::ColumnRole::ResourceId),
        Just(pre_v1::ColumnRole::WaitDuration),
        Just(pre_v1::ColumnRole::ViewportClipStartTime),
    ]
}

fn role_target_strategy() -> impl Strategy<Value = Uuid> {
    prop_oneof![
        3 => any::<u128>().prop_map(Uuid::from_u128),
        1 => (0..ReservedColumn::ALL.len()).prop_map(|i| ReservedColumn::ALL[i].guid()),
    ]
}

fn configuration_strategy() -> impl Strategy<Value = pre_v1::TableConfiguration> {
    (
        "[A-Za-z ]{0,12}",
        proptest::option::of("[a-z ]{0,20}"),
        proptest::collection::vec((role_strategy(), role_target_strategy()), 0..6),
    )
        .prop_map(|(name, help_text, roles)| {
            let mut configuration = pre_v1::TableConfiguration::new(name);
            configuration.help_text = help_text;
            for (role, guid) in roles {
                configuration.column_roles.insert(
                    role,
                    v1_0::ColumnRoleEntry {
                        column_guid: guid,
                        column_name: None,
                    },
                );
            }
            configuration
        })
}

fn document_strategy() -> impl Strategy<Value = pre_v1::PrebuiltConfigurations> {
    proptest::collection::vec(
        (
            any::<u128>(),
            proptest::collection::vec(configuration_strategy(), 0..4),
        ),
        0..5,
    )
    .prop_map(|tables| pre_v1::PrebuiltConfigurations {
        tables: tables
            .into_iter()
            .map(|(id, configurations)| pre_v1::TableConfigurations {
                table_id: Uuid::from_u128(id),
                default_configuration_name: None,
                configurations,
            })
            .collect(),
        ..Default::default()
    })
}

proptest! {
    #[test]
    fn upgrade_keeps_shape_and_drops_only_reserved_roles(legacy in document_strategy()) {
        let upgraded = VersionedPrebuiltConfigurations::from(legacy.clone()).into_current();

        prop_assert_eq!(upgraded.tables.len(), legacy.tables.len());
        for (old, new) in legacy.tables.iter().zip(&upgraded.tables) {
            prop_assert_eq!(new.table_id, old.table_id);
            prop_assert_eq!(new.configurations.len(), old.configurations.len());
            for (old, new) in old.configurations.iter().zip(&new.configurations) {
                prop_assert_eq!(&new.description, &old.help_text);
                let kept: Vec<(&str, Uuid)> = old
                    .column_roles
                    .iter()
                    .filter(|(_, entry)| !ReservedColumn::is_reserved(&entry.column_guid))
                    .map(|(role, entry)| (role.as_str(), entry.column_guid))
                    .collect();
                let actual: Vec<(&str, Uuid)> = new
                    .column_roles
                    .iter()
                    .map(|(role, entry)| (role.as_str(), entry.column_guid))
                    .collect();
                prop_assert_eq!(actual, kept);
            }
        }
    }

    #[test]
    fn serialized_legacy_loads_like_direct_upgrade(legacy in document_strategy()) {
        let json = serde_json::to_string(&legacy).unwrap();
        let loaded = PrebuiltConfigurationsLoader::new().load_str(&json).unwrap();
        prop_assert_eq!(loaded, legacy.upgrade());
    }

    #[test]
    fn upgraded_configurations_always_convert(legacy in document_strategy()) {
        let upgraded = legacy.upgrade();
        prop_assert!(upgraded.into_table_configurations().is_ok());
    }
}
