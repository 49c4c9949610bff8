//! Statistics collected while converting a note.

use serde::{Deserialize, Serialize};

/// Counts of the constructs converted in one note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertStats {
    /// Lines in the note after front matter was removed
    pub source_lines: u32,

    /// Lines in the LaTeX output
    pub output_lines: u32,

    /// Headings converted to sectioning commands
    pub heading_count: u32,

    /// Display-math regions (bare or environment)
    pub math_region_count: u32,

    /// Pipe tables converted to `tabular`
    pub table_count: u32,

    /// Image embeds converted to figures
    pub image_count: u32,

    /// Drawing embeds converted to figures
    pub drawing_count: u32,

    /// Lines carrying a chemistry equation
    pub chemistry_count: u32,

    /// Lines dropped (math delimiters, blank lines inside math)
    pub deleted_lines: u32,
}

impl ConvertStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment heading count.
    pub fn add_heading(&mut self) {
        self.heading_count += 1;
    }

    /// Increment table count.
    pub fn add_table(&mut self) {
        self.table_count += 1;
    }

    /// Increment image count.
    pub fn add_image(&mut self) {
        self.image_count += 1;
    }

    /// Increment drawing count.
    pub fn add_drawing(&mut self) {
        self.drawing_count += 1;
    }

    /// Increment chemistry line count.
    pub fn add_chemistry(&mut self) {
        self.chemistry_count += 1;
    }

    /// Total figures emitted.
    pub fn figure_count(&self) -> u32 {
        self.image_count + self.drawing_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_counters() {
        let mut stats = ConvertStats::new();
        stats.add_heading();
        stats.add_table();
        stats.add_image();
        stats.add_image();
        stats.add_drawing();
        stats.add_chemistry();

        assert_eq!(stats.heading_count, 1);
        assert_eq!(stats.table_count, 1);
        assert_eq!(stats.figure_count(), 3);
        assert_eq!(stats.chemistry_count, 1);
    }
}
