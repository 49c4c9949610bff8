//! Line spans recognized during the classification pass.

use serde::{Deserialize, Serialize};

/// A display-math block, identified by its opening and closing line.
///
/// Both indices are inclusive and refer to the numbering in effect during
/// the classification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathRegion {
    /// Index of the opening line
    pub start: usize,
    /// Index of the closing line
    pub end: usize,
}

impl MathRegion {
    /// Create a new region.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Check if a line lies within the region, delimiters included.
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }

    /// Check if a line lies strictly between the delimiters.
    pub fn strictly_contains(&self, index: usize) -> bool {
        index > self.start && index < self.end
    }
}

/// Check whether `index` falls inside any of `regions`.
pub fn in_any_region(regions: &[MathRegion], index: usize) -> bool {
    regions.iter().any(|region| region.contains(index))
}

/// A pipe table anchored on its separator row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    /// Index of the separator row
    pub anchor: usize,
    /// Column count declared by the separator row
    pub columns: usize,
    /// Number of body rows below the separator
    pub body_rows: usize,
}

impl TableBlock {
    /// Index of the header row.
    pub fn header(&self) -> usize {
        self.anchor - 1
    }

    /// Index of the last line belonging to the table.
    pub fn last_line(&self) -> usize {
        self.anchor + self.body_rows
    }

    /// Build the `c|c|...` column spec.
    pub fn column_spec(&self) -> String {
        vec!["c"; self.columns.max(1)].join("|")
    }
}
