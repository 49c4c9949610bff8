//! Substitution of a converted note into a full LaTeX document.
//!
//! Templates use `{{title}}`, `{{author}}`, `{{date}}`, `{{packages}}`,
//! `{{toc}}` and `{{content}}` placeholders. Unknown placeholders are left
//! as they are.

use std::fs;
use std::path::Path;

use chrono::Local;

use crate::convert::ConvertResult;
use crate::error::{Error, Result};

const CONTENT: &str = "{{content}}";

const DEFAULT_TEMPLATE: &str = r"\documentclass[11pt]{article}
\usepackage[utf8]{inputenc}
\usepackage[T1]{fontenc}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{graphicx}
\usepackage{siunitx}
\usepackage[hidelinks]{hyperref}
{{packages}}
\title{{{title}}}
\author{{{author}}}
\date{{{date}}}

\begin{document}
\maketitle
{{toc}}
{{content}}

\end{document}
";

/// A LaTeX document template.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
}

impl Template {
    /// Create a template from source text.
    ///
    /// Fails when the source has no `{{content}}` placeholder.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        if !source.contains(CONTENT) {
            return Err(Error::Template(format!(
                "template has no {} placeholder",
                CONTENT
            )));
        }
        Ok(Self { source })
    }

    /// Load a template file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        Self::new(source)
    }

    /// Template source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render a full document for `result`.
    pub fn render(&self, result: &ConvertResult, vars: &TemplateVars) -> String {
        let metadata = &result.metadata;
        let pick = |own: &str, from_metadata: Option<&str>| -> String {
            match from_metadata {
                Some(value) if vars.use_metadata => escape_text(value),
                _ => escape_text(own),
            }
        };

        let mut packages = String::new();
        if result.uses_chemistry {
            packages.push_str("\\usepackage[version=4]{mhchem}\n");
        }
        let toc = if vars.table_of_contents {
            "\\tableofcontents\n\\newpage\n"
        } else {
            ""
        };

        self.source
            .replace("{{title}}", &pick(&vars.title, metadata.title.as_deref()))
            .replace("{{author}}", &pick(&vars.author, metadata.author.as_deref()))
            .replace("{{date}}", &pick(&vars.date, metadata.date.as_deref()))
            .replace("{{packages}}", packages.trim_end())
            .replace("{{toc}}", toc.trim_end())
            .replace(CONTENT, &result.content)
    }
}

impl Default for Template {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Caller-side values for the template placeholders.
#[derive(Debug, Clone)]
pub struct TemplateVars {
    /// Default title
    pub title: String,

    /// Default author
    pub author: String,

    /// Default date
    pub date: String,

    /// Let front-matter values override the defaults above
    pub use_metadata: bool,

    /// Emit `\tableofcontents`
    pub table_of_contents: bool,
}

impl TemplateVars {
    /// Create variables with today's date and empty title/author.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the default author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Set the default date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Enable or disable front-matter overrides.
    pub fn with_metadata_override(mut self, enabled: bool) -> Self {
        self.use_metadata = enabled;
        self
    }

    /// Enable or disable the table of contents.
    pub fn with_table_of_contents(mut self, enabled: bool) -> Self {
        self.table_of_contents = enabled;
        self
    }
}

impl Default for TemplateVars {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            date: Local::now().format("%B %-d, %Y").to_string(),
            use_metadata: true,
            table_of_contents: false,
        }
    }
}

/// Escape characters that are special in LaTeX text.
fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
