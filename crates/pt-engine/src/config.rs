//! Engine configuration
//!
//! Read from a JSON file; every field is optional and falls back to its
//! default. Command line flags override what the file says.

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pt_core::{OptionInstance, OptionSpec, PluginOption, PluginOptionValue, ProcessorOptions};

use crate::{EngineError, Result};

/// An option passed through to the processor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredOption {
    #[serde(default)]
    pub short_name: Option<char>,
    pub long_name: String,
    #[serde(default)]
    pub value: String,
}

/// A plugin option value; its JSON type picks the kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfiguredPluginValue {
    Boolean(bool),
    Field(String),
    FieldArray(Vec<String>),
}

impl From<&ConfiguredPluginValue> for PluginOptionValue {
    fn from(value: &ConfiguredPluginValue) -> Self {
        match value {
            ConfiguredPluginValue::Boolean(value) => PluginOptionValue::Boolean(*value),
            ConfiguredPluginValue::Field(value) => PluginOptionValue::Field(value.clone()),
            ConfiguredPluginValue::FieldArray(values) => PluginOptionValue::FieldArray(values.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredPluginOption {
    pub guid: Uuid,
    pub value: ConfiguredPluginValue,
}

/// Configuration for a headless run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reported to processors as the host application name
    pub application_name: String,

    /// Number of synthetic samples the demo processor generates
    pub sample_count: usize,

    /// Optional tables to build, by name or GUID
    pub enabled_tables: Vec<String>,

    /// Progress is logged each time it advances by this many percent
    pub progress_step: u8,

    /// Options handed to the processor
    pub options: Vec<ConfiguredOption>,

    /// Plugin option values, keyed by GUID
    pub plugin_options: Vec<ConfiguredPluginOption>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            application_name: "ptengine".to_string(),
            sample_count: 1_000,
            enabled_tables: Vec::new(),
            progress_step: 10,
            options: Vec::new(),
            plugin_options: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| EngineError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// The file's configuration if a path is given, the defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.progress_step) {
            return Err(EngineError::InvalidConfig(format!(
                "progress_step must be between 1 and 100, got {}",
                self.progress_step
            )));
        }
        if let Some(option) = self.options.iter().find(|o| o.long_name.trim().is_empty()) {
            return Err(EngineError::InvalidConfig(format!(
                "option with value '{}' has no long name",
                option.value
            )));
        }
        Ok(())
    }

    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions::new(self.options.iter().map(|option| {
            let spec = match option.short_name {
                Some(short) => OptionSpec::new(short, option.long_name.clone()),
                None => OptionSpec::long(option.long_name.clone()),
            };
            OptionInstance::new(spec, option.value.clone())
        }))
        .with_plugin_options(
            self.plugin_options
                .iter()
                .map(|option| PluginOption::new(option.guid, (&option.value).into())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: EngineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "sample_count": 25, "enabled_tables": ["CPU Usage (Sampled)"] }"#,
        )
        .unwrap();
        assert_eq!(config.sample_count, 25);
        assert_eq!(config.enabled_tables, ["CPU Usage (Sampled)"]);
        assert_eq!(config.progress_step, 10);
    }

    #[test]
    fn test_rejects_zero_progress_step() {
        let config = EngineConfig {
            progress_step: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_processor_options() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "options": [
                { "short_name": "s", "long_name": "symbols", "value": "/tmp/sym" },
                { "long_name": "verbose" }
            ] }"#,
        )
        .unwrap();

        let options = config.processor_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options.get_short('s'), Some("/tmp/sym"));
        assert_eq!(options.get("verbose"), Some(""));
    }

    #[test]
    fn test_plugin_options_take_their_json_type() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "plugin_options": [
                { "guid": "8d6b0a52-9d1e-4f3a-a5c2-4b1e7f0c9d01", "value": true },
                { "guid": "8d6b0a52-9d1e-4f3a-a5c2-4b1e7f0c9d02", "value": "srv*" },
                { "guid": "8d6b0a52-9d1e-4f3a-a5c2-4b1e7f0c9d03", "value": ["a", "b"] }
            ] }"#,
        )
        .unwrap();

        let options = config.processor_options();
        let guid = |n: u128| Uuid::from_u128(0x8d6b0a52_9d1e_4f3a_a5c2_4b1e7f0c9d00 + n);
        assert_eq!(options.plugin_bool(guid(1)), Some(true));
        assert_eq!(options.plugin_field(guid(2)), Some("srv*"));
        assert_eq!(
            options.plugin_field_array(guid(3)),
            Some(&["a".to_string(), "b".to_string()][..])
        );
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/ptengine.json")).unwrap_err();
        assert!(matches!(err, EngineError::ConfigRead { .. }));
    }
}
