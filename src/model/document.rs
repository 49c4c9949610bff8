//! Document-level types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of line indices queued for removal in the current pass.
pub type DeletionSet = BTreeSet<usize>;

/// A note as an ordered, mutable sequence of lines.
///
/// Deletions are deferred: [`Document::mark_deleted`] only records an index,
/// and [`Document::apply_deletions`] rebuilds the sequence in one pass. Every
/// decision for index `i` is therefore made against the line numbering that
/// was in effect when the pass started.
#[derive(Debug, Clone, Default)]
pub struct Document {
    lines: Vec<String>,
    /// 1-based source line number of every entry in `lines`
    origins: Vec<usize>,
    deletions: DeletionSet,
}

impl Document {
    /// Split raw note text into lines.
    ///
    /// A trailing `\r` is stripped from every line so CRLF notes behave like
    /// LF notes.
    pub fn from_text(text: &str) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        let origins = (1..=lines.len()).collect();
        Self {
            lines,
            origins,
            deletions: DeletionSet::new(),
        }
    }

    /// Number of lines currently in the document.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Get a line by index.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    /// All lines in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Replace the line at `index`. Out-of-range indices are ignored.
    pub fn set_line(&mut self, index: usize, line: impl Into<String>) {
        if let Some(slot) = self.lines.get_mut(index) {
            *slot = line.into();
        }
    }

    /// 1-based source line number of the line at `index`.
    pub fn source_line(&self, index: usize) -> usize {
        self.origins
            .get(index)
            .copied()
            .or_else(|| self.origins.last().map(|last| last + 1))
            .unwrap_or(index + 1)
    }

    /// Queue a line for deletion.
    pub fn mark_deleted(&mut self, index: usize) {
        if index < self.lines.len() {
            self.deletions.insert(index);
        }
    }

    /// Check whether a line is queued for deletion.
    pub fn is_deleted(&self, index: usize) -> bool {
        self.deletions.contains(&index)
    }

    /// Lines queued for deletion.
    pub fn deletions(&self) -> &DeletionSet {
        &self.deletions
    }

    /// Remove every queued line, returning how many were dropped.
    pub fn apply_deletions(&mut self) -> usize {
        if self.deletions.is_empty() {
            return 0;
        }

        let deletions = std::mem::take(&mut self.deletions);
        let lines = std::mem::take(&mut self.lines);
        let origins = std::mem::take(&mut self.origins);

        for (index, (line, origin)) in lines.into_iter().zip(origins).enumerate() {
            if !deletions.contains(&index) {
                self.lines.push(line);
                self.origins.push(origin);
            }
        }

        deletions.len()
    }

    /// Join the lines back into a single string.
    pub fn join(&self) -> String {
        self.lines.join("\n")
    }
}

/// Note metadata read from the front-matter block.
///
/// Only the recognized keys are kept; absent keys stay `None` and are never
/// defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Note title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Note author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Note date, verbatim
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Metadata {
    /// Keys recognized in front matter.
    pub const KEYS: [&'static str; 3] = ["title", "author", "date"];

    /// Set a recognized key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        let slot = match key {
            "title" => &mut self.title,
            "author" => &mut self.author,
            "date" => &mut self.date,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Get a recognized key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "title" => self.title.as_deref(),
            "author" => self.author.as_deref(),
            "date" => self.date.as_deref(),
            _ => None,
        }
    }

    /// Check if no key was set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.date.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_text() {
        let doc = Document::from_text("a\r\nb\nc");
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.line(0), Some("a"));
        assert_eq!(doc.line(2), Some("c"));
        assert_eq!(doc.join(), "a\nb\nc");
    }

    #[test]
    fn test_deferred_deletion_keeps_indices() {
        let mut doc = Document::from_text("0\n1\n2\n3\n4");
        doc.mark_deleted(1);
        doc.mark_deleted(3);
        // Indices still refer to the original numbering until applied
        assert_eq!(doc.line(4), Some("4"));
        assert!(doc.is_deleted(3));

        assert_eq!(doc.apply_deletions(), 2);
        assert_eq!(doc.lines(), &["0", "2", "4"]);
        assert_eq!(doc.source_line(1), 3);
        assert_eq!(doc.source_line(2), 5);
        assert!(doc.deletions().is_empty());
    }

    #[test]
    fn test_mark_deleted_out_of_range() {
        let mut doc = Document::from_text("only");
        doc.mark_deleted(5);
        assert_eq!(doc.apply_deletions(), 0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_metadata_keys() {
        let mut metadata = Metadata::default();
        assert!(metadata.is_empty());
        assert!(metadata.set("title", "Notes"));
        assert!(!metadata.set("tags", "math"));
        assert_eq!(metadata.get("title"), Some("Notes"));
        assert_eq!(metadata.get("author"), None);
        assert!(!metadata.is_empty());
    }

    #[test]
    fn test_metadata_serialization_omits_absent_keys() {
        let mut metadata = Metadata::default();
        metadata.set("author", "Ada");
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"author":"Ada"}"#);
    }
}
