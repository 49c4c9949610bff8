//! # obsidian2tex
//!
//! Conversion of Obsidian-flavored Markdown notes into LaTeX.
//!
//! The engine turns a note's text into LaTeX body text and reports the
//! front-matter metadata and the assets the body refers to. It never
//! touches the filesystem; [`vault`] and [`render::Template`] are the thin
//! layers that place the body into a document and gather its attachments.
//!
//! ## Quick Start
//!
//! ```
//! use obsidian2tex::convert;
//!
//! let result = convert("# Heading\n\nSome **bold**.")?;
//! assert!(result.content.contains("\\section*{Heading}"));
//! assert!(result.content.contains("\\textbf{bold}"));
//! # Ok::<(), obsidian2tex::Error>(())
//! ```
//!
//! ## Features
//!
//! - **Headings**: `#` to `####` become sectioning commands
//! - **Emphasis**: `**bold**`, `*italic*`, `_underline_`
//! - **Display math**: `$$` blocks and `align`/`equation` environments
//! - **Tables**: pipe tables become `tabular` blocks
//! - **Embeds**: `![[image.png]]` and `![[drawing.excalidraw]]` become figures
//! - **Chemistry**: `\ce{..}` lines pass through for `mhchem`

pub mod convert;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod vault;

// Re-export commonly used types
pub use convert::{ConvertResult, Converter};
pub use error::{Error, Result};
pub use model::{AssetKind, AssetReference, Document, DrawingAsset, Metadata};
pub use parser::{ConvertOptions, ErrorMode, UnderscoreStyle};
pub use render::{ConvertStats, JsonFormat, Template, TemplateVars};
pub use vault::{stage_assets, AssetLocator, StagedAssets, VaultLocator};

use std::fs;
use std::path::Path;

/// Convert note text with default options.
///
/// # Example
///
/// ```
/// use obsidian2tex::convert;
///
/// let result = convert("---\ntitle: Notes\n---\nBody")?;
/// assert_eq!(result.metadata.title.as_deref(), Some("Notes"));
/// assert_eq!(result.content, "Body \\\\");
/// # Ok::<(), obsidian2tex::Error>(())
/// ```
pub fn convert(text: &str) -> Result<ConvertResult> {
    Converter::default().convert(text)
}

/// Convert note text with custom options.
///
/// # Example
///
/// ```
/// use obsidian2tex::{convert_with_options, ConvertOptions, UnderscoreStyle};
///
/// let options = ConvertOptions::new()
///     .lenient()
///     .with_underscore_style(UnderscoreStyle::Italic);
/// let result = convert_with_options("_slanted_", &options)?;
/// assert_eq!(result.content, "\\textit{slanted} \\\\");
/// # Ok::<(), obsidian2tex::Error>(())
/// ```
pub fn convert_with_options(text: &str, options: &ConvertOptions) -> Result<ConvertResult> {
    Converter::new(options.clone()).convert(text)
}

/// Read and convert a note file.
///
/// # Example
///
/// ```no_run
/// use obsidian2tex::{convert_file, ConvertOptions};
///
/// let result = convert_file("Lecture 1.md", &ConvertOptions::default()).unwrap();
/// println!("{}", result.content);
/// ```
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<ConvertResult> {
    let text = fs::read_to_string(path)?;
    convert_with_options(&text, options)
}

/// Convert a note file into JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let result = convert_file(path, &ConvertOptions::default())?;
    render::to_json(&result, format)
}

/// Builder for converting notes into complete LaTeX documents.
///
/// # Example
///
/// ```no_run
/// use obsidian2tex::Obsidian2Tex;
///
/// let tex = Obsidian2Tex::new()
///     .lenient()
///     .with_table_of_contents()
///     .with_author("Ada Lovelace")
///     .convert_file("Lecture 1.md")?
///     .to_document();
/// # Ok::<(), obsidian2tex::Error>(())
/// ```
pub struct Obsidian2Tex {
    options: ConvertOptions,
    template: Template,
    vars: TemplateVars,
}

impl Obsidian2Tex {
    /// Create a new builder with default options and template.
    pub fn new() -> Self {
        Self {
            options: ConvertOptions::default(),
            template: Template::default(),
            vars: TemplateVars::default(),
        }
    }

    /// Enable lenient error mode.
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Number headings and emit a table of contents.
    pub fn with_table_of_contents(mut self) -> Self {
        self.options = self.options.with_table_of_contents(true);
        self.vars = self.vars.with_table_of_contents(true);
        self
    }

    /// Set the underscore emphasis style.
    pub fn with_underscore_style(mut self, style: UnderscoreStyle) -> Self {
        self.options = self.options.with_underscore_style(style);
        self
    }

    /// Replace all conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.vars = self.vars.with_table_of_contents(options.table_of_contents);
        self.options = options;
        self
    }

    /// Use a custom document template.
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    /// Set the default title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.vars = self.vars.with_title(title);
        self
    }

    /// Set the default author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.vars = self.vars.with_author(author);
        self
    }

    /// Set the default date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.vars = self.vars.with_date(date);
        self
    }

    /// Convert note text.
    pub fn convert(self, text: &str) -> Result<Obsidian2TexResult> {
        let result = Converter::new(self.options).convert(text)?;
        Ok(Obsidian2TexResult {
            result,
            template: self.template,
            vars: self.vars,
        })
    }

    /// Read and convert a note file.
    ///
    /// Without an explicit title, the file stem is used.
    pub fn convert_file<P: AsRef<Path>>(mut self, path: P) -> Result<Obsidian2TexResult> {
        let path = path.as_ref();
        if self.vars.title.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                self.vars = self.vars.with_title(stem);
            }
        }
        let text = fs::read_to_string(path)?;
        self.convert(&text)
    }
}

impl Default for Obsidian2Tex {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a builder conversion.
pub struct Obsidian2TexResult {
    /// The conversion result
    pub result: ConvertResult,
    template: Template,
    vars: TemplateVars,
}

impl Obsidian2TexResult {
    /// Render the complete LaTeX document.
    pub fn to_document(&self) -> String {
        self.template.render(&self.result, &self.vars)
    }

    /// LaTeX body text only.
    pub fn body(&self) -> &str {
        &self.result.content
    }

    /// Convert to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.result, format)
    }

    /// Front-matter metadata.
    pub fn metadata(&self) -> &Metadata {
        &self.result.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let builder = Obsidian2Tex::default();
        assert!(builder.options.is_strict());
        assert!(!builder.options.table_of_contents);
        assert!(!builder.vars.table_of_contents);
    }

    #[test]
    fn test_builder_chained() {
        let builder = Obsidian2Tex::new()
            .lenient()
            .with_table_of_contents()
            .with_underscore_style(UnderscoreStyle::Italic)
            .with_author("Ada");

        assert_eq!(builder.options.error_mode, ErrorMode::Lenient);
        assert!(builder.options.table_of_contents);
        assert!(builder.vars.table_of_contents);
        assert_eq!(builder.options.underscore_style, UnderscoreStyle::Italic);
        assert_eq!(builder.vars.author, "Ada");
    }

    #[test]
    fn test_builder_document() {
        let output = Obsidian2Tex::new()
            .with_title("Fallback")
            .with_date("today")
            .convert("# Intro\n\nText")
            .unwrap();

        let tex = output.to_document();
        assert!(tex.starts_with("\\documentclass"));
        assert!(tex.contains("\\title{Fallback}"));
        assert!(tex.contains("\\section*{Intro}"));
        assert_eq!(output.body(), "\\section*{Intro}\n\nText \\\\");
        assert!(output.metadata().is_empty());
    }

    #[test]
    fn test_builder_file_title_from_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Lecture 3.md");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "Body").unwrap();

        let output = Obsidian2Tex::new().convert_file(&path).unwrap();
        assert!(output.to_document().contains("\\title{Lecture 3}"));
    }

    #[test]
    fn test_convert_file_missing() {
        let result = convert_file("does-not-exist.md", &ConvertOptions::default());
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_to_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "---\ndate: 2024-05-01\n---\n![[x.png]]").unwrap();
        let json = to_json(file.path(), JsonFormat::Compact).unwrap();
        assert!(json.contains("\"date\":\"2024-05-01\""));
        assert!(json.contains("\"images\":[\"x.png\"]"));
    }
}
