//! Note-to-LaTeX conversion driver.
//!
//! The driver runs the line pipeline in a fixed order:
//!
//! 1. strip the front-matter block
//! 2. one classification pass that feeds the math tracker and rewrites
//!    headings, tables, embeds and prose lines in place
//! 3. region-aware cleanup (blank lines inside math are queued for deletion,
//!    `&` outside math is escaped)
//! 4. batched deletion and join
//! 5. the inline substitution pass over the joined body
//!
//! # Example
//!
//! ```
//! use obsidian2tex::convert::Converter;
//! use obsidian2tex::ConvertOptions;
//!
//! let converter = Converter::new(ConvertOptions::default());
//! let result = converter.convert("# Heading\n\nSome **bold**.")?;
//! assert!(result.content.contains("\\section*{Heading}"));
//! # Ok::<(), obsidian2tex::Error>(())
//! ```

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    in_any_region, AssetKind, AssetReference, Document, DrawingAsset, MathRegion, Metadata,
};
use crate::parser::classify::{classify, heading, needs_line_break, LineKind, DISPLAY_MATH};
use crate::parser::frontmatter::extract_front_matter;
use crate::parser::math::{MathAction, MathTracker};
use crate::parser::{table, AssetMatcher, ConvertOptions};
use crate::render::{escape_ampersands, render_inline, ConvertStats};

/// Result of converting one note.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvertResult {
    /// LaTeX body text
    pub content: String,

    /// Front-matter metadata
    pub metadata: Metadata,

    /// Image file names referenced by the body, first-seen order
    pub images: Vec<String>,

    /// Drawings referenced by the body, first-seen order
    pub drawings: Vec<DrawingAsset>,

    /// Whether any chemistry equation was found
    pub uses_chemistry: bool,

    /// Conversion statistics
    pub stats: ConvertStats,
}

impl ConvertResult {
    /// Every file name the LaTeX output includes.
    pub fn included_files(&self) -> Vec<&str> {
        self.images
            .iter()
            .map(String::as_str)
            .chain(self.drawings.iter().map(|d| d.rendered_file.as_str()))
            .collect()
    }

    /// Check if the note references any asset.
    pub fn has_assets(&self) -> bool {
        !self.images.is_empty() || !self.drawings.is_empty()
    }
}

/// Converts notes with a fixed set of options.
#[derive(Debug, Clone)]
pub struct Converter {
    options: ConvertOptions,
    matcher: AssetMatcher,
}

/// Outcome of the line pass over one document.
struct LinePass {
    regions: Vec<MathRegion>,
    /// Lines built verbatim (tables, chemistry) that cleanup must not touch
    verbatim: BTreeSet<usize>,
    assets: Vec<AssetReference>,
    uses_chemistry: bool,
    stats: ConvertStats,
}

impl Converter {
    /// Create a converter.
    pub fn new(options: ConvertOptions) -> Self {
        let matcher = AssetMatcher::new(&options);
        Self { options, matcher }
    }

    /// Options in use.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert note text into LaTeX body text.
    pub fn convert(&self, text: &str) -> Result<ConvertResult> {
        let mut base = Document::from_text(text);
        let metadata = extract_front_matter(&mut base);

        // Openers of unterminated math that lenient mode keeps as text
        let mut literal = BTreeSet::new();
        let (mut doc, pass) = loop {
            let mut doc = base.clone();
            match self.line_pass(&mut doc, &literal)? {
                Ok(pass) => break (doc, pass),
                Err(start) => {
                    let line = doc.source_line(start);
                    if self.options.is_strict() {
                        return Err(Error::UnterminatedMath { line });
                    }
                    log::warn!(
                        "Display math opened at line {} is never closed, keeping it as text",
                        line
                    );
                    literal.insert(start);
                }
            }
        };

        self.cleanup(&mut doc, &pass);

        let mut stats = pass.stats;
        stats.source_lines = base.len() as u32;
        stats.math_region_count = pass.regions.len() as u32;
        stats.deleted_lines = doc.apply_deletions() as u32;

        let body = doc.join();
        let content = render_inline(&body, &self.options).map_err(|e| remap_line(e, &doc))?;
        stats.output_lines = content.lines().count() as u32;

        let (images, drawings) = collect_assets(pass.assets);

        log::debug!(
            "Converted {} lines into {}: {} headings, {} math regions, {} tables, {} figures",
            stats.source_lines,
            stats.output_lines,
            stats.heading_count,
            stats.math_region_count,
            stats.table_count,
            stats.figure_count()
        );

        Ok(ConvertResult {
            content,
            metadata,
            images,
            drawings,
            uses_chemistry: pass.uses_chemistry,
            stats,
        })
    }

    /// Classify and rewrite every line.
    ///
    /// The outer result carries hard errors; the inner one the start index
    /// of a display-math block that never closed.
    fn line_pass(
        &self,
        doc: &mut Document,
        literal: &BTreeSet<usize>,
    ) -> Result<std::result::Result<LinePass, usize>> {
        let mut tracker = MathTracker::new();
        let mut pass = LinePass {
            regions: Vec::new(),
            verbatim: BTreeSet::new(),
            assets: Vec::new(),
            uses_chemistry: false,
            stats: ConvertStats::new(),
        };

        let mut i = 0;
        while i < doc.len() {
            let line = doc.line(i).unwrap_or_default().to_string();

            if literal.contains(&i) {
                if let Some(rest) = line.strip_prefix(DISPLAY_MATH) {
                    doc.set_line(i, format!("\\$\\${}", rest));
                }
                i += 1;
                continue;
            }

            let next = next_nonblank(doc, i + 1);
            if let Some(action) = tracker.step(i, &line, next.as_deref()) {
                match action {
                    MathAction::Keep => {}
                    MathAction::Replace(replacement) => doc.set_line(i, replacement),
                    MathAction::Delete => doc.mark_deleted(i),
                }
                i += 1;
                continue;
            }

            if let Some(block) = table::detect(doc, i + 1) {
                table::reflow(doc, &block, self.options.error_mode)?;
                pass.verbatim.extend(block.header()..=block.last_line());
                pass.stats.add_table();
                i = block.last_line() + 1;
                continue;
            }

            match classify(&line, &self.matcher) {
                LineKind::Heading(level) => {
                    let title = heading(&line).map_or("", |(_, title)| title);
                    doc.set_line(i, level.render(title, self.options.table_of_contents));
                    pass.stats.add_heading();
                }
                LineKind::DrawingEmbed | LineKind::ImageEmbed => {
                    let before = pass.assets.len();
                    let rewritten = self.matcher.rewrite_drawings(&line, &mut pass.assets);
                    let rewritten = self.matcher.rewrite_images(&rewritten, &mut pass.assets);
                    for asset in &pass.assets[before..] {
                        if asset.is_image() {
                            pass.stats.add_image();
                        } else {
                            pass.stats.add_drawing();
                        }
                    }
                    doc.set_line(i, rewritten);
                }
                LineKind::Chemistry => {
                    pass.verbatim.insert(i);
                    pass.uses_chemistry = true;
                    pass.stats.add_chemistry();
                }
                LineKind::Prose => {
                    if self.options.hard_line_breaks && needs_line_break(&line) {
                        // `\\[` would read the next line as a skip length
                        let opens_bracket = doc
                            .line(i + 1)
                            .is_some_and(|next| next.trim_start().starts_with('['));
                        let brk = if opens_bracket { " \\\\{}" } else { " \\\\" };
                        doc.set_line(i, format!("{}{}", line.trim_end(), brk));
                    }
                }
                LineKind::Blank
                | LineKind::DisplayMath
                | LineKind::Environment
                | LineKind::TableSeparator => {}
            }
            i += 1;
        }

        Ok(match tracker.finish() {
            Ok(regions) => {
                pass.regions = regions;
                Ok(pass)
            }
            Err((start, _)) => Err(start),
        })
    }

    /// Delete blank lines inside math and escape ampersands outside it.
    fn cleanup(&self, doc: &mut Document, pass: &LinePass) {
        for i in 0..doc.len() {
            if doc.is_deleted(i) || pass.verbatim.contains(&i) {
                continue;
            }
            let Some(line) = doc.line(i) else {
                continue;
            };

            if pass.regions.iter().any(|region| region.strictly_contains(i)) {
                if line.trim().is_empty() {
                    doc.mark_deleted(i);
                }
            } else if !in_any_region(&pass.regions, i) && line.contains('&') {
                let escaped = escape_ampersands(line);
                doc.set_line(i, escaped);
            }
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConvertOptions::default())
    }
}

fn next_nonblank(doc: &Document, from: usize) -> Option<String> {
    (from..doc.len())
        .filter_map(|i| doc.line(i))
        .find(|line| !line.trim().is_empty())
        .map(str::to_string)
}

/// Split asset references into unique image names and drawings.
fn collect_assets(assets: Vec<AssetReference>) -> (Vec<String>, Vec<DrawingAsset>) {
    let mut images: Vec<String> = Vec::new();
    let mut drawings: Vec<DrawingAsset> = Vec::new();
    for asset in assets {
        match asset.kind {
            AssetKind::Image => {
                if !images.contains(&asset.filename) {
                    images.push(asset.filename);
                }
            }
            AssetKind::Drawing(drawing) => {
                if !drawings.contains(&drawing) {
                    drawings.push(drawing);
                }
            }
        }
    }
    (images, drawings)
}

/// Map an inline-pass line number back to the source note.
fn remap_line(error: Error, doc: &Document) -> Error {
    match error {
        Error::UnbalancedEmphasis { marker, line } => Error::UnbalancedEmphasis {
            marker,
            line: doc.source_line(line.saturating_sub(1)),
        },
        Error::UnterminatedInlineMath { line } => Error::UnterminatedInlineMath {
            line: doc.source_line(line.saturating_sub(1)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorMode;

    fn convert(text: &str) -> Result<ConvertResult> {
        Converter::default().convert(text)
    }

    fn lenient(text: &str) -> Result<ConvertResult> {
        Converter::new(ConvertOptions::new().lenient()).convert(text)
    }

    #[test]
    fn test_heading_and_bold() {
        let result = convert("# Heading\n\nSome **bold**.").unwrap();
        assert_eq!(
            result.content,
            "\\section*{Heading}\n\nSome \\textbf{bold}. \\\\"
        );
        assert_eq!(result.stats.heading_count, 1);
    }

    #[test]
    fn test_numbered_headings() {
        let converter = Converter::new(ConvertOptions::new().with_table_of_contents(true));
        let result = converter.convert("## Methods").unwrap();
        assert_eq!(result.content, "\\subsection{Methods}");
    }

    #[test]
    fn test_front_matter_only_body() {
        let result = convert("---\ntitle: Notes\nauthor: A. B.\n---\nBody").unwrap();
        assert_eq!(result.metadata.title.as_deref(), Some("Notes"));
        assert_eq!(result.metadata.author.as_deref(), Some("A. B."));
        assert_eq!(result.metadata.date, None);
        assert_eq!(result.content, "Body \\\\");
    }

    #[test]
    fn test_bare_display_math() {
        let result = convert("Before\n$$\na + b\n\n= c\n$$\nAfter").unwrap();
        assert_eq!(
            result.content,
            "Before \\\\\n\\[\na + b\n= c\n\\]\nAfter \\\\"
        );
        assert_eq!(result.stats.math_region_count, 1);
        assert_eq!(result.stats.deleted_lines, 1);
    }

    #[test]
    fn test_wrapped_align_keeps_ampersands() {
        let text = "$$\n\\begin{align}\na &= b \\\\\nc &= d\n\\end{align}\n$$";
        let result = convert(text).unwrap();
        assert_eq!(
            result.content,
            "\\begin{align*}\na &= b \\\\\nc &= d\n\\end{align*}"
        );
    }

    #[test]
    fn test_wrapped_align_keeps_trailing_text() {
        let text = "$$\n\\begin{align}\na &= b\n\\end{align}\n$$ .";
        let result = convert(text).unwrap();
        assert_eq!(
            result.content,
            "\\begin{align*}\na &= b\n\\end{align*}\n."
        );
    }

    #[test]
    fn test_line_break_before_bracket() {
        let result = convert("text\n[1] ref").unwrap();
        assert_eq!(result.content, "text \\\\{}\n[1] ref \\\\");

        let result = convert("text\n  [a, b] interval").unwrap();
        assert!(result.content.starts_with("text \\\\{}\n"));
    }

    #[test]
    fn test_ampersand_outside_math_escaped() {
        let result = convert("Salt & pepper").unwrap();
        assert_eq!(result.content, "Salt \\& pepper \\\\");
        let result = convert("Already \\& escaped").unwrap();
        assert_eq!(result.content, "Already \\& escaped \\\\");
    }

    #[test]
    fn test_table() {
        let result = convert("|A|B|\n|---|---|\n|1|2|").unwrap();
        assert_eq!(
            result.content,
            "\\begin{table}[h]\\centering\\begin{tabular}{c|c}\nA & B \\\\ \\hline\n1 & 2 \\\\\\end{tabular}\\end{table}"
        );
        assert_eq!(result.stats.table_count, 1);
    }

    #[test]
    fn test_images_deduplicated() {
        let result = convert("![[a.png]]\n![[dir/a.png]]\n![[b.jpg|300]]").unwrap();
        assert_eq!(result.images, vec!["a.png", "b.jpg"]);
        assert_eq!(result.stats.image_count, 3);
        assert!(result.content.contains("\\includegraphics[width=0.5\\textwidth]{a.png}"));
    }

    #[test]
    fn test_drawing_embed() {
        let result = convert("![[Pendulum.excalidraw]]").unwrap();
        assert_eq!(result.drawings, vec![DrawingAsset::new("Pendulum", "excalidraw")]);
        assert!(result.images.is_empty());
        assert!(result.content.contains("{Pendulum.svg.png}"));
        assert_eq!(result.included_files(), vec!["Pendulum.svg.png"]);
    }

    #[test]
    fn test_chemistry_line_kept() {
        let result = convert("$\\ce{A & B -> C}$").unwrap();
        assert!(result.uses_chemistry);
        assert_eq!(result.content, "$\\ce{A & B -> C}$");
    }

    #[test]
    fn test_unterminated_math() {
        let err = convert("Intro\n$$\nx = 1").unwrap_err();
        assert!(matches!(err, Error::UnterminatedMath { line: 2 }));

        let result = lenient("Intro\n$$\nx = 1").unwrap();
        assert_eq!(result.content, "Intro \\\\\n\\$\\$\nx = 1 \\\\");
        assert_eq!(result.stats.math_region_count, 0);
    }

    #[test]
    fn test_unterminated_math_line_after_front_matter() {
        let err = convert("---\ntitle: T\n---\n$$\nx").unwrap_err();
        assert!(matches!(err, Error::UnterminatedMath { line: 4 }));
    }

    #[test]
    fn test_unbalanced_emphasis_reports_source_line() {
        let err = convert("---\ntitle: T\n---\nok\n\nsome **bold").unwrap_err();
        match err {
            Error::UnbalancedEmphasis { marker, line } => {
                assert_eq!(marker, "**");
                assert_eq!(line, 6);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let result = lenient("some **bold").unwrap();
        assert_eq!(result.content, "some **bold \\\\");
    }

    #[test]
    fn test_unclosed_inline_math() {
        let err = convert("---\ntitle: T\n---\nPrice $5 and **bold**").unwrap_err();
        assert!(matches!(err, Error::UnterminatedInlineMath { line: 4 }));

        let result = lenient("Price $5 and **bold**").unwrap();
        assert_eq!(result.content, "Price \\$5 and \\textbf{bold} \\\\");
    }

    #[test]
    fn test_jagged_table_modes() {
        let text = "|A|B|\n|---|---|\n|1|2|3|";
        assert!(matches!(convert(text), Err(Error::JaggedTable { line: 3, .. })));
        let options = ConvertOptions::new().with_error_mode(ErrorMode::Lenient);
        assert!(Converter::new(options).convert(text).is_ok());
    }

    #[test]
    fn test_hard_line_breaks_disabled() {
        let converter = Converter::new(ConvertOptions::new().with_hard_line_breaks(false));
        let result = converter.convert("One\nTwo").unwrap();
        assert_eq!(result.content, "One\nTwo");
    }

    #[test]
    fn test_empty_input() {
        let result = convert("").unwrap();
        assert_eq!(result.content, "");
        assert!(result.metadata.is_empty());
        assert!(!result.has_assets());
    }
}
