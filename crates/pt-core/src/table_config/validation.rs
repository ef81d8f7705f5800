//! Column sequence rules
//!
//! Reserved columns mark layout boundaries, so their count and relative order
//! are constrained. Data columns are unrestricted.

use std::fmt;

use crate::column::{ColumnConfiguration, ReservedColumn};
use crate::ConfigurationError;

/// A broken column ordering rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnOrderViolation {
    PivotAfterGraph,
    DuplicatePivot,
    LeftFreezeAfterRightFreeze,
    DuplicateLeftFreeze,
    DuplicateRightFreeze,
    DuplicateGraph,
}

impl ColumnOrderViolation {
    /// The reserved column whose placement broke the rule
    pub fn column(self) -> ReservedColumn {
        match self {
            ColumnOrderViolation::PivotAfterGraph | ColumnOrderViolation::DuplicatePivot => {
                ReservedColumn::Pivot
            }
            ColumnOrderViolation::LeftFreezeAfterRightFreeze
            | ColumnOrderViolation::DuplicateLeftFreeze => ReservedColumn::LeftFreeze,
            ColumnOrderViolation::DuplicateRightFreeze => ReservedColumn::RightFreeze,
            ColumnOrderViolation::DuplicateGraph => ReservedColumn::Graph,
        }
    }
}

impl fmt::Display for ColumnOrderViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            ColumnOrderViolation::PivotAfterGraph => {
                "the pivot column cannot appear after the graph column"
            }
            ColumnOrderViolation::DuplicatePivot => "the pivot column can only be added at most once",
            ColumnOrderViolation::LeftFreezeAfterRightFreeze => {
                "the left freeze column cannot appear after the right freeze column"
            }
            ColumnOrderViolation::DuplicateLeftFreeze => {
                "the left freeze column can only be added at most once"
            }
            ColumnOrderViolation::DuplicateRightFreeze => {
                "the right freeze column can only be added at most once"
            }
            ColumnOrderViolation::DuplicateGraph => "the graph column can only be added at most once",
        };
        f.write_str(message)
    }
}

#[derive(Default)]
struct ReservedSeen {
    pivot: usize,
    graph: usize,
    left_freeze: usize,
    right_freeze: usize,
}

impl ReservedSeen {
    fn visit(&mut self, reserved: ReservedColumn) -> Result<(), ColumnOrderViolation> {
        match reserved {
            ReservedColumn::Pivot => {
                if self.graph > 0 {
                    return Err(ColumnOrderViolation::PivotAfterGraph);
                }
                if self.pivot > 0 {
                    return Err(ColumnOrderViolation::DuplicatePivot);
                }
                self.pivot += 1;
            }
            ReservedColumn::LeftFreeze => {
                if self.right_freeze > 0 {
                    return Err(ColumnOrderViolation::LeftFreezeAfterRightFreeze);
                }
                if self.left_freeze > 0 {
                    return Err(ColumnOrderViolation::DuplicateLeftFreeze);
                }
                self.left_freeze += 1;
            }
            ReservedColumn::RightFreeze => {
                if self.right_freeze > 0 {
                    return Err(ColumnOrderViolation::DuplicateRightFreeze);
                }
                self.right_freeze += 1;
            }
            ReservedColumn::Graph => {
                if self.graph > 0 {
                    return Err(ColumnOrderViolation::DuplicateGraph);
                }
                self.graph += 1;
            }
        }
        Ok(())
    }
}

/// Check a column sequence against the reserved column rules.
///
/// Fails on the first violation and reports its position in the sequence.
pub fn validate_columns<'a, I>(columns: I) -> Result<(), ConfigurationError>
where
    I: IntoIterator<Item = &'a ColumnConfiguration>,
{
    let mut seen = ReservedSeen::default();
    for (position, column) in columns.into_iter().enumerate() {
        if let Some(reserved) = column.reserved() {
            seen.visit(reserved)
                .map_err(|violation| ConfigurationError::InvalidColumnSequence {
                    violation,
                    position,
                })?;
        }
    }
    Ok(())
}
