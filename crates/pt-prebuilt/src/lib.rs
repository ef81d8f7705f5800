//! Prebuilt table configurations
//!
//! Table configurations saved to disk carry the schema version they were
//! written with. Every historical schema stays loadable: a payload is read
//! with the deserializer of its own version and then upgraded one version at
//! a time until it reaches the current schema.

pub mod convert;
pub mod dto;
pub mod loader;

use pt_core::ConfigurationError;
use thiserror::Error;
use uuid::Uuid;

// Re-exports
pub use convert::PrebuiltTableConfigurations;
pub use dto::{UpgradeToNext, VersionedPrebuiltConfigurations, CURRENT_VERSION};
pub use loader::{to_json_string, to_writer, PrebuiltConfigurationsLoader, SCHEMA_VERSIONS};

/// Errors that can occur while loading prebuilt configurations
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("payload has no numeric 'Version' field")]
    MissingVersion,

    #[error("unsupported schema version {0}")]
    UnsupportedSchemaVersion(f64),

    #[error("payload is not a valid version {version} document: {source}")]
    Malformed {
        version: f64,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration '{configuration}' of table {table} is invalid: {source}")]
    InvalidConfiguration {
        table: Uuid,
        configuration: String,
        #[source]
        source: ConfigurationError,
    },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
