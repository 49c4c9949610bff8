//! Front-matter block at the very start of a note.

use crate::model::{Document, Metadata};

const DELIMITER: &str = "---";

/// Parse and strip an optional front-matter block.
///
/// The block must open on line 0. When no closing delimiter exists the block
/// is treated as absent and the document is left untouched. Only the keys in
/// [`Metadata::KEYS`] are kept.
pub fn extract_front_matter(doc: &mut Document) -> Metadata {
    let mut metadata = Metadata::default();

    if !doc.line(0).is_some_and(is_delimiter) {
        return metadata;
    }

    let Some(close) = (1..doc.len()).find(|&i| doc.line(i).is_some_and(is_delimiter)) else {
        log::debug!("Front matter is not terminated, treating it as body text");
        return metadata;
    };

    for line in &doc.lines()[1..close] {
        if let Some((key, value)) = line.split_once(": ") {
            let key = key.trim();
            if metadata.set(key, unquote(value.trim())) {
                log::debug!("Front matter: {} = {:?}", key, metadata.get(key));
            }
        }
    }

    for index in 0..=close {
        doc.mark_deleted(index);
    }
    doc.apply_deletions();

    metadata
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
