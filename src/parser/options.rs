//! Conversion options and configuration.

/// Image extensions recognized in embeds by default.
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "bmp", "pdf"];

/// Extension of drawing scene files recognized in embeds by default.
pub const DEFAULT_DRAWING_EXTENSION: &str = "excalidraw";

/// Options for converting a note.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Emit numbered sectioning commands (for a table of contents)
    /// instead of starred ones
    pub table_of_contents: bool,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// How `_span_` emphasis is rendered
    pub underscore_style: UnderscoreStyle,

    /// Append explicit line breaks to prose lines
    pub hard_line_breaks: bool,

    /// Image extensions recognized in embeds (lowercase, no dot)
    pub image_extensions: Vec<String>,

    /// Drawing scene extension recognized in embeds (no dot)
    pub drawing_extension: String,

    /// Figure width as a fraction of `\textwidth`
    pub figure_width: f32,
}

impl ConvertOptions {
    /// Create new conversion options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable numbered headings.
    pub fn with_table_of_contents(mut self, enabled: bool) -> Self {
        self.table_of_contents = enabled;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (degrade instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the underscore emphasis style.
    pub fn with_underscore_style(mut self, style: UnderscoreStyle) -> Self {
        self.underscore_style = style;
        self
    }

    /// Enable or disable explicit line breaks.
    pub fn with_hard_line_breaks(mut self, enabled: bool) -> Self {
        self.hard_line_breaks = enabled;
        self
    }

    /// Replace the recognized image extensions.
    pub fn with_image_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.image_extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    /// Set the drawing scene extension.
    pub fn with_drawing_extension(mut self, extension: impl AsRef<str>) -> Self {
        self.drawing_extension = extension.as_ref().trim_start_matches('.').to_string();
        self
    }

    /// Set figure width as a fraction of the text width.
    pub fn with_figure_width(mut self, fraction: f32) -> Self {
        self.figure_width = fraction.clamp(0.05, 1.0);
        self
    }

    /// Check if the options ask for reported errors.
    pub fn is_strict(&self) -> bool {
        self.error_mode == ErrorMode::Strict
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            table_of_contents: false,
            error_mode: ErrorMode::Strict,
            underscore_style: UnderscoreStyle::Underline,
            hard_line_breaks: true,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            drawing_extension: DEFAULT_DRAWING_EXTENSION.to_string(),
            figure_width: 0.5,
        }
    }
}

/// Error handling mode during conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Report structural problems (unterminated math, unbalanced emphasis,
    /// jagged tables) as errors
    #[default]
    Strict,
    /// Log a warning and degrade gracefully
    Lenient,
}

/// Rendering of underscore-delimited emphasis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderscoreStyle {
    /// `_text_` becomes `\underline{text}`
    #[default]
    Underline,
    /// `_text_` becomes `\textit{text}`
    Italic,
}

impl UnderscoreStyle {
    /// LaTeX command used for the span.
    pub fn command(self) -> &'static str {
        match self {
            UnderscoreStyle::Underline => "underline",
            UnderscoreStyle::Italic => "textit",
        }
    }
}
