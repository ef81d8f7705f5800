//! Processor options
//!
//! Options are parsed by the host and handed to a processor once, at
//! construction. The bag is immutable afterwards; clones share storage.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

/// A command line style option: optional short flag and a long name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionSpec {
    pub short_name: Option<char>,
    pub long_name: String,
}

impl OptionSpec {
    /// Option with both a short flag and a long name
    pub fn new(short_name: char, long_name: impl Into<String>) -> Self {
        Self {
            short_name: Some(short_name),
            long_name: long_name.into(),
        }
    }

    /// Option with only a long name
    pub fn long(long_name: impl Into<String>) -> Self {
        Self {
            short_name: None,
            long_name: long_name.into(),
        }
    }
}

impl fmt::Display for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.short_name {
            Some(short) => write!(f, "-{short}/--{}", self.long_name),
            None => write!(f, "--{}", self.long_name),
        }
    }
}

/// An option together with the value it was given
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionInstance {
    pub option: OptionSpec,
    pub value: String,
}

impl OptionInstance {
    /// Bind `value` to `option`
    pub fn new(option: OptionSpec, value: impl Into<String>) -> Self {
        Self {
            option,
            value: value.into(),
        }
    }
}

/// Typed value of a plugin option
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PluginOptionValue {
    Boolean(bool),
    Field(String),
    FieldArray(Vec<String>),
}

impl fmt::Display for PluginOptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginOptionValue::Boolean(value) => write!(f, "{value}"),
            PluginOptionValue::Field(value) => f.write_str(value),
            PluginOptionValue::FieldArray(values) => f.write_str(&values.join(", ")),
        }
    }
}

/// A plugin option value, keyed by the GUID the plugin declared it under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PluginOption {
    pub guid: Uuid,
    pub value: PluginOptionValue,
}

impl PluginOption {
    pub fn new(guid: Uuid, value: PluginOptionValue) -> Self {
        Self { guid, value }
    }
}

/// Immutable set of parsed options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorOptions {
    instances: Arc<[OptionInstance]>,
    plugin_options: Arc<[PluginOption]>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ProcessorOptions {
    /// Collect instances in the order they were given; repeats are kept
    pub fn new<I>(instances: I) -> Self
    where
        I: IntoIterator<Item = OptionInstance>,
    {
        Self {
            instances: instances.into_iter().collect(),
            plugin_options: Vec::new().into(),
        }
    }

    /// Attach plugin option values. A GUID given twice keeps its last value.
    pub fn with_plugin_options<I>(mut self, plugin_options: I) -> Self
    where
        I: IntoIterator<Item = PluginOption>,
    {
        let mut options: Vec<PluginOption> = Vec::new();
        for option in plugin_options {
            match options.iter_mut().find(|existing| existing.guid == option.guid) {
                Some(existing) => existing.value = option.value,
                None => options.push(option),
            }
        }
        self.plugin_options = options.into();
        self
    }

    pub fn plugin_options(&self) -> &[PluginOption] {
        &self.plugin_options
    }

    pub fn plugin_option(&self, guid: Uuid) -> Option<&PluginOptionValue> {
        self.plugin_options
            .iter()
            .find(|option| option.guid == guid)
            .map(|option| &option.value)
    }

    /// Value of a boolean plugin option; `None` if unset or of another type
    pub fn plugin_bool(&self, guid: Uuid) -> Option<bool> {
        match self.plugin_option(guid)? {
            PluginOptionValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn plugin_field(&self, guid: Uuid) -> Option<&str> {
        match self.plugin_option(guid)? {
            PluginOptionValue::Field(value) => Some(value),
            _ => None,
        }
    }

    pub fn plugin_field_array(&self, guid: Uuid) -> Option<&[String]> {
        match self.plugin_option(guid)? {
            PluginOptionValue::FieldArray(values) => Some(values),
            _ => None,
        }
    }

    /// Every instance, in the order given
    pub fn iter(&self) -> impl Iterator<Item = &OptionInstance> {
        self.instances.iter()
    }

    /// Number of instances, counting repeats
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// First value given for the option with this long name
    pub fn get(&self, long_name: &str) -> Option<&str> {
        self.instances
            .iter()
            .find(|instance| instance.option.long_name == long_name)
            .map(|instance| instance.value.as_str())
    }

    /// First value given for the option with this short flag
    pub fn get_short(&self, short_name: char) -> Option<&str> {
        self.instances
            .iter()
            .find(|instance| instance.option.short_name == Some(short_name))
            .map(|instance| instance.value.as_str())
    }

    /// Every value given for the option, in order
    pub fn values_of<'a>(&'a self, long_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.instances
            .iter()
            .filter(move |instance| instance.option.long_name == long_name)
            .map(|instance| instance.value.as_str())
    }

    /// Whether two bags share the same storage
    pub fn ptr_eq(&self, other: &ProcessorOptions) -> bool {
        Arc::ptr_eq(&self.instances, &other.instances)
    }
}

impl<'a> IntoIterator for &'a ProcessorOptions {
    type Item = &'a OptionInstance;
    type IntoIter = std::slice::Iter<'a, OptionInstance>;

    fn into_iter(self) -> Self::IntoIter {
        self.instances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_long_and_short_name() {
        let options = ProcessorOptions::new(vec![
            OptionInstance::new(OptionSpec::new('r', "test"), "face"),
            OptionInstance::new(OptionSpec::long("symbols"), "C:\\symbols"),
        ]);

        assert_eq!(options.len(), 2);
        assert_eq!(options.get("test"), Some("face"));
        assert_eq!(options.get_short('r'), Some("face"));
        assert_eq!(options.get("symbols"), Some("C:\\symbols"));
        assert_eq!(options.get("missing"), None);
    }

    #[test]
    fn test_clones_share_storage() {
        let options = ProcessorOptions::new(vec![OptionInstance::new(
            OptionSpec::new('v', "verbose"),
            "true",
        )]);
        let copy = options.clone();
        assert!(copy.ptr_eq(&options));
        assert_eq!(copy, options);
    }

    #[test]
    fn test_repeated_option_values() {
        let options = ProcessorOptions::new(vec![
            OptionInstance::new(OptionSpec::long("table"), "a"),
            OptionInstance::new(OptionSpec::long("table"), "b"),
        ]);
        assert_eq!(options.values_of("table").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_plugin_options_are_typed() {
        let verbose = Uuid::new_v4();
        let symbols = Uuid::new_v4();
        let paths = Uuid::new_v4();
        let options = ProcessorOptions::default().with_plugin_options([
            PluginOption::new(verbose, PluginOptionValue::Boolean(true)),
            PluginOption::new(symbols, PluginOptionValue::Field("srv*".to_string())),
            PluginOption::new(
                paths,
                PluginOptionValue::FieldArray(vec!["a".to_string(), "b".to_string()]),
            ),
        ]);

        assert_eq!(options.plugin_bool(verbose), Some(true));
        assert_eq!(options.plugin_field(symbols), Some("srv*"));
        assert_eq!(options.plugin_field_array(paths).map(<[String]>::len), Some(2));
        assert_eq!(options.plugin_field(verbose), None);
        assert_eq!(options.plugin_option(Uuid::new_v4()), None);
        assert!(options.is_empty());
    }

    #[test]
    fn test_last_plugin_value_wins() {
        let guid = Uuid::new_v4();
        let options = ProcessorOptions::default().with_plugin_options([
            PluginOption::new(guid, PluginOptionValue::Boolean(false)),
            PluginOption::new(guid, PluginOptionValue::Boolean(true)),
        ]);

        assert_eq!(options.plugin_options().len(), 1);
        assert_eq!(options.plugin_bool(guid), Some(true));
        assert_eq!(options.plugin_options()[0].value.to_string(), "true");
    }
}
