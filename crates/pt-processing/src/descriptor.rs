//! Table descriptors
//!
//! A descriptor names a table a processor can build. Descriptors are compared
//! by GUID only.

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

/// Path to a data cooker: the source parser it hangs off and its own id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataCookerPath {
    pub source_parser_id: String,
    pub data_cooker_id: String,
}

impl DataCookerPath {
    /// Cooker that consumes events straight from a source parser
    pub fn for_source(source_parser_id: impl Into<String>, data_cooker_id: impl Into<String>) -> Self {
        Self {
            source_parser_id: source_parser_id.into(),
            data_cooker_id: data_cooker_id.into(),
        }
    }
}

impl fmt::Display for DataCookerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source_parser_id, self.data_cooker_id)
    }
}

/// Describes a table that a processor is able to build
#[derive(Debug, Clone)]
pub struct TableDescriptor {
    pub guid: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,

    /// Metadata tables are always built; other tables only when enabled
    pub is_metadata_table: bool,

    /// Cookers whose output the table reads
    pub required_data_cookers: Vec<DataCookerPath>,
}

impl TableDescriptor {
    pub fn new(
        guid: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            guid,
            name: name.into(),
            description: description.into(),
            category: category.into(),
            is_metadata_table: false,
            required_data_cookers: Vec::new(),
        }
    }

    /// Mark the table as a metadata table
    pub fn metadata(mut self) -> Self {
        self.is_metadata_table = true;
        self
    }

    pub fn with_required_cooker(mut self, path: DataCookerPath) -> Self {
        self.required_data_cookers.push(path);
        self
    }
}

impl PartialEq for TableDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid
    }
}

impl Eq for TableDescriptor {}

impl Hash for TableDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid.hash(state);
    }
}

impl fmt::Display for TableDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.guid)
    }
}
