//! Pipe-table reflow into `tabular` blocks.

use lazy_static::lazy_static;
use regex::Regex;

use super::classify::{is_table_row, is_table_separator};
use super::ErrorMode;
use crate::error::{Error, Result};
use crate::model::{Document, TableBlock};
use crate::render::escape_ampersands;

lazy_static! {
    static ref RE_WHITESPACE_RUN: Regex = Regex::new(r"\s{2,}").unwrap();
}

const TABLE_OPEN: &str = "\\begin{table}[h]\\centering\\begin{tabular}";
const TABLE_CLOSE: &str = "\\end{tabular}\\end{table}";

/// Detect a table anchored on the separator row at `anchor`.
///
/// The row above the anchor is the header and must contain a pipe. Body
/// rows are the consecutive lines below the anchor that end with a pipe.
pub fn detect(doc: &Document, anchor: usize) -> Option<TableBlock> {
    if anchor == 0 {
        return None;
    }
    let separator = doc.line(anchor)?;
    let header = doc.line(anchor - 1)?;
    if !is_table_separator(separator) || !header.contains('|') {
        return None;
    }

    let columns = split_row(separator).len();
    let body_rows = (anchor + 1..doc.len())
        .take_while(|&i| doc.line(i).is_some_and(is_table_row))
        .count();

    Some(TableBlock {
        anchor,
        columns,
        body_rows,
    })
}

/// Rewrite the lines of `table` into a `tabular` block.
///
/// The header row becomes the table opening, the separator row carries the
/// header cells, and each body row stays on its own line. Rows with fewer
/// cells are padded; rows with more cells are an error in strict mode and
/// truncated otherwise.
pub fn reflow(doc: &mut Document, table: &TableBlock, mode: ErrorMode) -> Result<()> {
    let header = row_cells(doc, table.header(), table.columns, mode)?;

    let mut rows = Vec::with_capacity(table.body_rows + 1);
    rows.push(format!("{} \\\\ \\hline", header.join(" & ")));
    for index in table.anchor + 1..=table.last_line() {
        let cells = row_cells(doc, index, table.columns, mode)?;
        rows.push(format!("{} \\\\", cells.join(" & ")));
    }
    if let Some(last) = rows.last_mut() {
        last.push_str(TABLE_CLOSE);
    }

    doc.set_line(
        table.header(),
        format!("{}{{{}}}", TABLE_OPEN, table.column_spec()),
    );
    for (offset, row) in rows.into_iter().enumerate() {
        doc.set_line(table.anchor + offset, row);
    }

    log::debug!(
        "Table at line {}: {} columns, {} body rows",
        doc.source_line(table.anchor),
        table.columns,
        table.body_rows
    );
    Ok(())
}

fn row_cells(doc: &Document, index: usize, columns: usize, mode: ErrorMode) -> Result<Vec<String>> {
    let mut cells: Vec<String> = split_row(doc.line(index).unwrap_or_default())
        .into_iter()
        .map(clean_cell)
        .collect();

    if cells.len() > columns {
        let line = doc.source_line(index);
        if mode == ErrorMode::Strict {
            return Err(Error::JaggedTable {
                line,
                expected: columns,
                found: cells.len(),
            });
        }
        log::warn!(
            "Table row at line {} has {} cells, dropping {} extra",
            line,
            cells.len(),
            cells.len() - columns
        );
        cells.truncate(columns);
    }
    cells.resize(columns, String::new());
    Ok(cells)
}

/// Split a pipe row into raw cells.
///
/// Leading and trailing pipes are optional; `\|` is kept inside its cell.
pub fn split_row(line: &str) -> Vec<&str> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = match trimmed.strip_suffix('|') {
        Some(rest) if !rest.ends_with('\\') => rest,
        _ => trimmed,
    };

    let mut cells = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in trimmed.char_indices() {
        if c == '|' && !escaped {
            cells.push(&trimmed[start..i]);
            start = i + 1;
        }
        escaped = c == '\\' && !escaped;
    }
    cells.push(&trimmed[start..]);
    cells
}

fn clean_cell(cell: &str) -> String {
    let collapsed = RE_WHITESPACE_RUN.replace_all(cell.trim(), " ");
    escape_ampersands(&collapsed)
}
