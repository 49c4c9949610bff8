//! Stateless line predicates.
//!
//! Each predicate looks at one line in isolation. Embed detection depends on
//! the configured extensions and lives in [`super::assets::AssetMatcher`].

use lazy_static::lazy_static;
use regex::Regex;

use super::assets::AssetMatcher;

lazy_static! {
    static ref RE_TABLE_SEPARATOR: Regex = Regex::new(r"^\s*\|?\s*:?-+:?\s*\|").unwrap();
    static ref RE_ENVIRONMENT: Regex =
        Regex::new(r"^\s*\\(?P<tag>begin|end)\{(?P<name>[A-Za-z]+)(?P<star>\*?)\}").unwrap();
}

/// Marker opening and closing display math.
pub const DISPLAY_MATH: &str = "$$";

/// Macro that marks a chemistry equation.
pub const CHEMISTRY_MACRO: &str = "\\ce{";

/// Environments that are complete display equations on their own.
pub const DISPLAY_ENVIRONMENTS: [&str; 7] = [
    "align", "equation", "gather", "multline", "flalign", "alignat", "eqnarray",
];

/// Environments that are only valid inside math mode.
pub const INNER_ENVIRONMENTS: [&str; 4] = ["aligned", "gathered", "split", "alignedat"];

/// Category of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace only
    Blank,
    /// Sectioning heading
    Heading(HeadingLevel),
    /// Line starting with `$$`
    DisplayMath,
    /// `\begin{..}` or `\end{..}` of an equation environment
    Environment,
    /// `|---|---|` row below a table header
    TableSeparator,
    /// `![[name.png]]`
    ImageEmbed,
    /// `![[name.excalidraw]]`
    DrawingEmbed,
    /// Line with a `\ce{..}` chemistry equation
    Chemistry,
    /// Anything else
    Prose,
}

/// Classify a line. Categories are checked in a fixed order and are
/// mutually exclusive.
pub fn classify(line: &str, assets: &AssetMatcher) -> LineKind {
    if line.trim().is_empty() {
        LineKind::Blank
    } else if let Some((level, _)) = heading(line) {
        LineKind::Heading(level)
    } else if is_display_math(line) {
        LineKind::DisplayMath
    } else if environment(line).is_some() {
        LineKind::Environment
    } else if is_table_separator(line) {
        LineKind::TableSeparator
    } else if assets.is_drawing_embed(line) {
        LineKind::DrawingEmbed
    } else if assets.is_image_embed(line) {
        LineKind::ImageEmbed
    } else if is_chemistry(line) {
        LineKind::Chemistry
    } else {
        LineKind::Prose
    }
}

/// Heading depth, from `#` to `####`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    Section,
    Subsection,
    Subsubsection,
    Paragraph,
}

impl HeadingLevel {
    fn from_markers(count: usize) -> Option<Self> {
        match count {
            1 => Some(HeadingLevel::Section),
            2 => Some(HeadingLevel::Subsection),
            3 => Some(HeadingLevel::Subsubsection),
            4 => Some(HeadingLevel::Paragraph),
            _ => None,
        }
    }

    /// LaTeX sectioning command name.
    pub fn command(self) -> &'static str {
        match self {
            HeadingLevel::Section => "section",
            HeadingLevel::Subsection => "subsection",
            HeadingLevel::Subsubsection => "subsubsection",
            HeadingLevel::Paragraph => "paragraph",
        }
    }

    /// Render a heading with the given title.
    pub fn render(self, title: &str, numbered: bool) -> String {
        let star = if numbered { "" } else { "*" };
        format!("\\{}{}{{{}}}", self.command(), star, title)
    }
}

/// Detect a heading and return its level and title.
///
/// The marker run must be followed by a space or the end of the line, so
/// `#tag` is not a heading. Only the markers and one following space are
/// removed from the title.
pub fn heading(line: &str) -> Option<(HeadingLevel, &str)> {
    let markers = line.bytes().take_while(|&b| b == b'#').count();
    let level = HeadingLevel::from_markers(markers)?;
    let rest = &line[markers..];
    if rest.is_empty() {
        return Some((level, rest));
    }
    rest.strip_prefix(' ').map(|title| (level, title))
}

/// Check if a line opens or closes display math.
pub fn is_display_math(line: &str) -> bool {
    line.starts_with(DISPLAY_MATH)
}

/// Check if a line holds a complete `$$ .. $$` block.
pub fn is_single_line_display_math(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.len() >= 2 * DISPLAY_MATH.len()
        && trimmed.starts_with(DISPLAY_MATH)
        && trimmed.ends_with(DISPLAY_MATH)
}

/// A `\begin{name}` or `\end{name}` tag at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentTag<'a> {
    /// `true` for `\begin`, `false` for `\end`
    pub begin: bool,
    /// Environment name without the star
    pub name: &'a str,
    /// Whether the starred variant was used
    pub starred: bool,
}

impl EnvironmentTag<'_> {
    /// Check if the environment is a complete display equation.
    pub fn is_display(&self) -> bool {
        DISPLAY_ENVIRONMENTS.contains(&self.name)
    }

    /// Top-level environment an inner environment is promoted to when it
    /// loses its surrounding math delimiters.
    pub fn promoted(&self) -> Option<&'static str> {
        match self.name {
            "aligned" => Some("align*"),
            "gathered" => Some("gather*"),
            "alignedat" => Some("alignat*"),
            _ => None,
        }
    }
}

/// Parse an equation-environment tag at the start of a line.
pub fn environment(line: &str) -> Option<EnvironmentTag<'_>> {
    let caps = RE_ENVIRONMENT.captures(line)?;
    let name = caps.name("name")?.as_str();
    if !DISPLAY_ENVIRONMENTS.contains(&name) && !INNER_ENVIRONMENTS.contains(&name) {
        return None;
    }
    Some(EnvironmentTag {
        begin: &caps["tag"] == "begin",
        name,
        starred: !caps["star"].is_empty(),
    })
}

/// Check if a line is a table separator row.
pub fn is_table_separator(line: &str) -> bool {
    RE_TABLE_SEPARATOR.is_match(line)
}

/// Check if a line continues a pipe table.
pub fn is_table_row(line: &str) -> bool {
    line.trim_end().ends_with('|')
}

/// Check if a line contains a chemistry equation.
pub fn is_chemistry(line: &str) -> bool {
    line.contains(CHEMISTRY_MACRO)
}

/// Check if a prose line should end with an explicit line break.
///
/// Candidates end in a word character, inline math, sentence punctuation,
/// or an emphasis closer.
pub fn needs_line_break(line: &str) -> bool {
    let trimmed = line.trim_end();
    if trimmed.ends_with("\\\\") {
        return false;
    }
    match trimmed.chars().last() {
        Some(c) => c.is_alphanumeric() || "$.,;:!?)*_'\"".contains(c),
        None => false,
    }
}
