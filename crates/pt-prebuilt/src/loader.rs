//! Reading and writing prebuilt configuration documents

use std::io::{Read, Write};

use serde_json::Value;
use tracing::{debug, warn};

use crate::convert::PrebuiltTableConfigurations;
use crate::dto::{pre_v1, v1_0, VersionedPrebuiltConfigurations};
use crate::{Result, SchemaError};

/// Reads a document of one schema version
pub type VersionDeserializer =
    fn(Value) -> std::result::Result<VersionedPrebuiltConfigurations, serde_json::Error>;

fn deserialize_v0_1(
    value: Value,
) -> std::result::Result<VersionedPrebuiltConfigurations, serde_json::Error> {
    serde_json::from_value::<pre_v1::PrebuiltConfigurations>(value).map(Into::into)
}

fn deserialize_v1_0(
    value: Value,
) -> std::result::Result<VersionedPrebuiltConfigurations, serde_json::Error> {
    serde_json::from_value::<v1_0::PrebuiltConfigurations>(value).map(Into::into)
}

/// Known schema versions, oldest first
pub const SCHEMA_VERSIONS: &[(f64, VersionDeserializer)] = &[
    (pre_v1::VERSION, deserialize_v0_1 as VersionDeserializer),
    (v1_0::VERSION, deserialize_v1_0 as VersionDeserializer),
];

/// Loads documents of any known version and upgrades them to the current one
#[derive(Debug, Clone, Copy)]
pub struct PrebuiltConfigurationsLoader {
    versions: &'static [(f64, VersionDeserializer)],
}

impl Default for PrebuiltConfigurationsLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PrebuiltConfigurationsLoader {
    pub fn new() -> Self {
        Self {
            versions: SCHEMA_VERSIONS,
        }
    }

    pub fn supported_versions(&self) -> impl Iterator<Item = f64> + '_ {
        self.versions.iter().map(|(version, _)| *version)
    }

    /// Read a document in its own version without upgrading it
    pub fn load_versioned(&self, value: Value) -> Result<VersionedPrebuiltConfigurations> {
        let version = value
            .get("Version")
            .and_then(Value::as_f64)
            .ok_or(SchemaError::MissingVersion)?;

        let (_, deserialize) = self
            .versions
            .iter()
            .find(|(known, _)| *known == version)
            .ok_or(SchemaError::UnsupportedSchemaVersion(version))?;

        debug!(version, "reading prebuilt configurations");
        deserialize(value).map_err(|source| SchemaError::Malformed { version, source })
    }

    pub fn load_value(&self, value: Value) -> Result<v1_0::PrebuiltConfigurations> {
        Ok(self.load_versioned(value)?.into_current())
    }

    pub fn load_str(&self, json: &str) -> Result<v1_0::PrebuiltConfigurations> {
        self.load_value(serde_json::from_str(json)?)
    }

    pub fn load_slice(&self, json: &[u8]) -> Result<v1_0::PrebuiltConfigurations> {
        self.load_value(serde_json::from_slice(json)?)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<v1_0::PrebuiltConfigurations> {
        self.load_value(serde_json::from_reader(reader)?)
    }

    /// Load a document and convert it into live table configurations
    pub fn load_table_configurations(&self, json: &str) -> Result<Vec<PrebuiltTableConfigurations>> {
        self.load_str(json)?.into_table_configurations()
    }

    /// Load several documents. Each gets its own result; a bad document never
    /// affects the others.
    pub fn load_batch<I, S>(&self, artifacts: I) -> Vec<Result<v1_0::PrebuiltConfigurations>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        artifacts
            .into_iter()
            .enumerate()
            .map(|(index, json)| {
                let result = self.load_str(json.as_ref());
                if let Err(err) = &result {
                    warn!(index, error = %err, "failed to load prebuilt configurations");
                }
                result
            })
            .collect()
    }
}

/// Serialize a current document. `Version` is always written first.
pub fn to_json_string(configurations: &v1_0::PrebuiltConfigurations) -> Result<String> {
    Ok(serde_json::to_string_pretty(configurations)?)
}

pub fn to_writer<W: Write>(writer: W, configurations: &v1_0::PrebuiltConfigurations) -> Result<()> {
    serde_json::to_writer_pretty(writer, configurations)?;
    Ok(())
}
