//! Column identity and presentation metadata
//!
//! A table configuration refers to columns by their GUID, never by position.
//! Names and descriptions are cosmetic.

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

/// Identity and descriptive metadata for a column.
///
/// Two metadata values describe the same column iff their GUIDs match.
#[derive(Debug, Clone)]
pub struct ColumnMetadata {
    /// Stable identifier of the column
    pub guid: Uuid,

    /// Display name
    pub name: String,

    /// Longer description shown as help text
    pub description: Option<String>,

    /// Short description used in narrow headers
    pub short_description: Option<String>,
}

impl ColumnMetadata {
    /// Create metadata for a column
    pub fn new(guid: Uuid, name: impl Into<String>) -> Self {
        Self {
            guid,
            name: name.into(),
            description: None,
            short_description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl PartialEq for ColumnMetadata {
    fn eq(&self, other: &Self) -> bool {
        self.guid == other.guid
    }
}

impl Eq for ColumnMetadata {}

impl Hash for ColumnMetadata {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.guid.hash(state);
    }
}

/// Horizontal alignment of cell text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    #[default]
    Left,
    Right,
    Center,
}

/// Sort direction of a column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

/// How values are combined when rows are grouped under a pivot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
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

/// Presentation hints for a column
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UiHints {
    pub is_visible: bool,
    pub width: u32,
    pub text_alignment: TextAlignment,
    pub sort_priority: u32,
    pub sort_order: SortOrder,
    pub aggregation_mode: AggregationMode,
    pub cell_format: Option<String>,
}

impl Default for UiHints {
    fn default() -> Self {
        Self {
            is_visible: true,
            width: 80,
            text_alignment: TextAlignment::Left,
            sort_priority: 0,
            sort_order: SortOrder::None,
            aggregation_mode: AggregationMode::None,
            cell_format: None,
        }
    }
}

/// A column as it appears in a table configuration.
///
/// The optional variant GUID selects an alternate projection of the same base
/// column. It does not change the column's identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnConfiguration {
    pub metadata: ColumnMetadata,
    pub variant_guid: Option<Uuid>,
    pub display_hints: UiHints,
}

impl ColumnConfiguration {
    /// Create a column with default display hints
    pub fn new(metadata: ColumnMetadata) -> Self {
        Self {
            metadata,
            variant_guid: None,
            display_hints: UiHints::default(),
        }
    }

    /// Replace the display hints
    pub fn with_hints(mut self, hints: UiHints) -> Self {
        self.display_hints = hints;
        self
    }

    /// Select a variant projection of this column
    pub fn with_variant(mut self, variant_guid: Uuid) -> Self {
        self.variant_guid = Some(variant_guid);
        self
    }

    /// Base identity of the column
    pub fn guid(&self) -> Uuid {
        self.metadata.guid
    }

    /// Whether both configurations refer to the same base column
    pub fn same_column(&self, other: &ColumnConfiguration) -> bool {
        self.metadata.guid == other.metadata.guid
    }

    /// The reserved column this entry marks, if it is one
    pub fn reserved(&self) -> Option<ReservedColumn> {
        ReservedColumn::from_guid(&self.metadata.guid)
    }
}

impl From<ColumnMetadata> for ColumnConfiguration {
    fn from(metadata: ColumnMetadata) -> Self {
        Self::new(metadata)
    }
}

/// Sentinel columns that mark layout boundaries instead of carrying data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedColumn {
    /// Columns to the left of this column are pivoted
    Pivot,
    /// Columns to the right of this column are graphed
    Graph,
    /// Columns to the left of this column stay in place while scrolling
    LeftFreeze,
    /// Columns to the right of this column stay in place while scrolling
    RightFreeze,
}

impl ReservedColumn {
    /// Every reserved column, in declaration order
    pub const ALL: [ReservedColumn; 4] = [
        ReservedColumn::Pivot,
        ReservedColumn::Graph,
        ReservedColumn::LeftFreeze,
        ReservedColumn::RightFreeze,
    ];

    /// Fixed GUID shared by every configuration that places this column
    pub const fn guid(self) -> Uuid {
        match self {
            ReservedColumn::Pivot => Uuid::from_u128(0x319e867f_245a_436e_9735_db620f844edc),
            ReservedColumn::Graph => Uuid::from_u128(0xa5ce8faf_5668_49fc_82bc_d2c482086c06),
            ReservedColumn::LeftFreeze => Uuid::from_u128(0x4d35a44e_804b_454e_9375_568543e198c2),
            ReservedColumn::RightFreeze => Uuid::from_u128(0xa755cec5_bbc4_4e9f_bdb3_cb78b56ddcfa),
        }
    }

    /// Display name, as written into saved configurations
    pub const fn name(self) -> &'static str {
        match self {
            ReservedColumn::Pivot => "Pivot Column",
            ReservedColumn::Graph => "Graph Column",
            ReservedColumn::LeftFreeze => "Left Freeze Column",
            ReservedColumn::RightFreeze => "Right Freeze Column",
        }
    }

    /// Column entry to place in a column sequence
    pub fn column(self) -> ColumnConfiguration {
        ColumnConfiguration::new(ColumnMetadata::new(self.guid(), self.name()))
    }

    /// Look up the reserved column with the given GUID
    pub fn from_guid(guid: &Uuid) -> Option<Self> {
        Self::ALL.into_iter().find(|reserved| reserved.guid() == *guid)
    }

    /// Whether `guid` belongs to one of the reserved columns. Variant GUIDs
    /// never match; callers pass the base GUID.
    pub fn is_reserved(guid: &Uuid) -> bool {
        Self::from_guid(guid).is_some()
    }
}

impl fmt::Display for ReservedColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
