//! Inline substitution pass over the reassembled LaTeX body.
//!
//! A single left-to-right scan tracks whether it is in text or math and
//! pairs emphasis markers with an explicit stack. Markers never pair across
//! a blank line. Math content, verbatim command arguments, and escape
//! sequences are copied through untouched apart from the global renames.

use crate::error::{Error, Result};
use crate::parser::classify::{DISPLAY_ENVIRONMENTS, INNER_ENVIRONMENTS};
use crate::parser::ConvertOptions;

/// Commands whose arguments are copied without any inline processing.
const VERBATIM_COMMANDS: [&str; 9] = [
    "includegraphics",
    "label",
    "ref",
    "eqref",
    "url",
    "href",
    "cite",
    "ce",
    "pu",
];

/// Macro names renamed to their LaTeX package equivalent.
const MACRO_RENAMES: [(&str, &str); 1] = [("units", "si")];

/// Non-ASCII glyphs and the math command they map to.
const GLYPHS: [(char, &str); 11] = [
    ('≤', "\\leq"),
    ('≥', "\\geq"),
    ('≠', "\\neq"),
    ('≈', "\\approx"),
    ('±', "\\pm"),
    ('→', "\\rightarrow"),
    ('←', "\\leftarrow"),
    ('↔', "\\leftrightarrow"),
    ('⇒', "\\Rightarrow"),
    ('⇐', "\\Leftarrow"),
    ('⇔', "\\Leftrightarrow"),
];

/// Apply emphasis pairing, escaping, and global renames to `text`.
///
/// Line numbers in errors are 1-based lines of `text`.
pub fn render_inline(text: &str, options: &ConvertOptions) -> Result<String> {
    InlineRenderer::new(options).render(text)
}

/// Escape every `&` that is not already escaped.
pub fn escape_ampersands(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 4);
    let mut escaped = false;
    for c in line.chars() {
        if c == '&' && !escaped {
            out.push('\\');
        }
        out.push(c);
        escaped = c == '\\' && !escaped;
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Text,
    /// Math closed by the given delimiter (`$`, `$$`, `\]`, `\)`)
    Math { close: &'static str },
    /// Inside a math environment, `depth` levels of `\begin` deep
    Environment { depth: usize },
}

#[derive(Debug)]
struct Frame {
    marker: &'static str,
    /// Byte offset of the opening command in the output
    position: usize,
    open_len: usize,
    line: usize,
}

/// Where an inline `$` opened, so an unclosed one can be rescanned as text.
#[derive(Debug, Clone, Copy)]
struct MathOpen {
    source: usize,
    position: usize,
    line: usize,
}

struct InlineRenderer<'a> {
    options: &'a ConvertOptions,
    out: String,
    stack: Vec<Frame>,
    mode: Mode,
    inline_math: Option<MathOpen>,
    line: usize,
}

impl<'a> InlineRenderer<'a> {
    fn new(options: &'a ConvertOptions) -> Self {
        Self {
            options,
            out: String::new(),
            stack: Vec::new(),
            mode: Mode::Text,
            inline_math: None,
            line: 1,
        }
    }

    fn render(mut self, text: &str) -> Result<String> {
        self.out.reserve(text.len() + text.len() / 8);
        let mut i = 0;

        loop {
            let Some(c) = text[i..].chars().next() else {
                match self.unclosed_math()? {
                    Some(resume) => {
                        i = resume;
                        continue;
                    }
                    None => break,
                }
            };

            if c == '\n' {
                let paragraph_end = starts_blank_line(&text[i + 1..]);
                if paragraph_end {
                    if let Some(resume) = self.unclosed_math()? {
                        i = resume;
                        continue;
                    }
                }
                self.out.push('\n');
                self.line += 1;
                i += 1;
                if paragraph_end {
                    self.close_paragraph()?;
                }
                continue;
            }

            i += match self.mode {
                Mode::Text => self.text_step(text, i, c),
                Mode::Math { close } => self.math_step(text, i, c, close),
                Mode::Environment { .. } => self.math_char(text, i, c),
            };
        }

        self.close_paragraph()?;
        Ok(self.out)
    }

    fn text_step(&mut self, text: &str, i: usize, c: char) -> usize {
        match c {
            '\\' => self.backslash(text, i),
            '$' => {
                if text[i..].starts_with("$$") {
                    self.out.push_str("\\[");
                    self.mode = Mode::Math { close: "$$" };
                    2
                } else {
                    self.inline_math = Some(MathOpen {
                        source: i,
                        position: self.out.len(),
                        line: self.line,
                    });
                    self.out.push('$');
                    self.mode = Mode::Math { close: "$" };
                    1
                }
            }
            '*' | '_' => self.emphasis(text, i),
            '#' => {
                self.out.push_str("\\#");
                1
            }
            '%' => {
                self.out.push_str("\\%");
                1
            }
            _ => {
                match glyph(c) {
                    Some(command) => {
                        self.out.push('$');
                        self.out.push_str(command);
                        self.out.push('$');
                    }
                    None => self.out.push(c),
                }
                c.len_utf8()
            }
        }
    }

    fn math_step(&mut self, text: &str, i: usize, c: char, close: &'static str) -> usize {
        if text[i..].starts_with(close) {
            self.out.push_str(if close == "$$" { "\\]" } else { close });
            self.mode = Mode::Text;
            self.inline_math = None;
            return close.len();
        }
        self.math_char(text, i, c)
    }

    fn math_char(&mut self, text: &str, i: usize, c: char) -> usize {
        match c {
            '\\' => self.backslash(text, i),
            '%' => {
                self.out.push_str("\\%");
                1
            }
            _ => {
                match glyph(c) {
                    Some(command) => {
                        self.out.push_str(command);
                        self.out.push(' ');
                    }
                    None => self.out.push(c),
                }
                c.len_utf8()
            }
        }
    }

    /// Handle a backslash: escape sequences, commands, environment tags.
    fn backslash(&mut self, text: &str, i: usize) -> usize {
        let after = &text[i + 1..];
        let name_len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphabetic())
            .count();

        if name_len == 0 {
            return 1 + self.escape_sequence(after);
        }

        let name = &after[..name_len];
        let mut consumed = 1 + name_len;

        if name == "begin" || name == "end" {
            if let Some((environment, len)) = braced_name(&after[name_len..]) {
                self.environment_tag(name == "begin", environment);
                return consumed + len;
            }
        }

        let renamed = MACRO_RENAMES
            .iter()
            .find(|(from, _)| *from == name)
            .map_or(name, |(_, to)| *to);
        self.out.push('\\');
        self.out.push_str(renamed);

        if after[name_len..].starts_with('*') {
            self.out.push('*');
            consumed += 1;
        }

        if VERBATIM_COMMANDS.contains(&name) {
            let args = argument_span(&text[i + consumed..]);
            self.out.push_str(&text[i + consumed..i + consumed + args]);
            consumed += args;
        }

        consumed
    }

    /// Copy `\` plus one non-letter character. Returns bytes consumed after
    /// the backslash.
    fn escape_sequence(&mut self, after: &str) -> usize {
        let Some(c) = after.chars().next() else {
            self.out.push('\\');
            return 0;
        };

        match (self.mode, c) {
            (Mode::Text, '[') => {
                self.out.push_str("\\[");
                self.mode = Mode::Math { close: "\\]" };
            }
            (Mode::Text, '(') => {
                self.out.push_str("\\(");
                self.mode = Mode::Math { close: "\\)" };
            }
            (Mode::Text, '*') => self.out.push('*'),
            _ => {
                self.out.push('\\');
                self.out.push(c);
            }
        }
        c.len_utf8()
    }

    fn environment_tag(&mut self, begin: bool, environment: &str) {
        let (base, starred) = match environment.strip_suffix('*') {
            Some(base) => (base, true),
            None => (environment, false),
        };
        let display = DISPLAY_ENVIRONMENTS.contains(&base);
        let math = display || INNER_ENVIRONMENTS.contains(&base);

        let verb = if begin { "begin" } else { "end" };
        let star = if display || starred { "*" } else { "" };
        self.out.push_str(&format!("\\{}{{{}{}}}", verb, base, star));

        if !math {
            return;
        }
        match self.mode {
            Mode::Text if begin => self.mode = Mode::Environment { depth: 1 },
            Mode::Environment { depth } => {
                let depth = if begin { depth + 1 } else { depth - 1 };
                self.mode = if depth == 0 {
                    Mode::Text
                } else {
                    Mode::Environment { depth }
                };
            }
            _ => {}
        }
    }

    fn emphasis(&mut self, text: &str, i: usize) -> usize {
        let rest = &text[i..];
        let underscore = rest.starts_with('_');
        let mut marker: &'static str = if rest.starts_with("**") {
            "**"
        } else if rest.starts_with("__") {
            "__"
        } else if underscore {
            "_"
        } else {
            "*"
        };

        let prev = text[..i].chars().next_back();
        let top = self.stack.last().map(|frame| frame.marker);
        // `***a***`: close the inner single marker first
        if marker.len() == 2
            && top == Some(&marker[..1])
            && prev.is_some_and(|c| !c.is_whitespace())
        {
            marker = &marker[..1];
        }

        let next = text[i + marker.len()..].chars().next();

        if underscore && marker == "_" && next == Some('{') {
            self.out.push('_');
            return 1;
        }

        let (can_open, can_close) = if underscore {
            (
                prev.map_or(true, |c| !is_word(c))
                    && next.is_some_and(|c| !c.is_whitespace() && c != '{'),
                prev.is_some_and(|c| !c.is_whitespace()) && next.map_or(true, |c| !is_word(c)),
            )
        } else {
            (
                next.is_some_and(|c| !c.is_whitespace()),
                prev.is_some_and(|c| !c.is_whitespace()),
            )
        };

        if can_close && top == Some(marker) {
            self.stack.pop();
            self.out.push('}');
        } else if can_open {
            let open = self.open_command(marker);
            self.stack.push(Frame {
                marker,
                position: self.out.len(),
                open_len: open.len(),
                line: self.line,
            });
            self.out.push_str(&open);
        } else {
            self.out.push_str(&literal_marker(marker));
        }
        marker.len()
    }

    fn open_command(&self, marker: &str) -> String {
        let command = match marker {
            "**" | "__" => "textbf",
            "*" => "textit",
            _ => self.options.underscore_style.command(),
        };
        format!("\\{}{{", command)
    }

    /// Deal with an inline `$` still open at a paragraph end.
    ///
    /// Returns the source offset to resume scanning from once the `$` is
    /// kept as a literal dollar sign.
    fn unclosed_math(&mut self) -> Result<Option<usize>> {
        let Some(open) = self.inline_math.take() else {
            return Ok(None);
        };

        if self.options.is_strict() {
            return Err(Error::UnterminatedInlineMath { line: open.line });
        }

        log::warn!(
            "Inline math opened at line {} is never closed, keeping '$' literally",
            open.line
        );
        self.out.truncate(open.position);
        self.out.push_str("\\$");
        self.mode = Mode::Text;
        self.line = open.line;
        Ok(Some(open.source + 1))
    }

    /// Resolve markers left open at the end of a paragraph.
    fn close_paragraph(&mut self) -> Result<()> {
        if self.stack.is_empty() {
            return Ok(());
        }

        if self.options.is_strict() {
            let frame = &self.stack[0];
            return Err(Error::UnbalancedEmphasis {
                marker: frame.marker.to_string(),
                line: frame.line,
            });
        }

        // Positions grow with stack depth, so splicing from the top keeps
        // the remaining positions valid.
        while let Some(frame) = self.stack.pop() {
            log::warn!(
                "Unbalanced emphasis marker '{}' at line {}, keeping it literally",
                frame.marker,
                frame.line
            );
            self.out.replace_range(
                frame.position..frame.position + frame.open_len,
                &literal_marker(frame.marker),
            );
        }
        Ok(())
    }
}

fn glyph(c: char) -> Option<&'static str> {
    GLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == c)
        .map(|(_, command)| *command)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric()
}

fn literal_marker(marker: &str) -> String {
    marker.replace('_', "\\_")
}

fn starts_blank_line(rest: &str) -> bool {
    rest.split('\n').next().map_or(true, |line| line.trim().is_empty())
}

/// Parse `{name}` at the start of `s`, returning the name and bytes used.
fn braced_name(s: &str) -> Option<(&str, usize)> {
    let inner = s.strip_prefix('{')?;
    let len = inner
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic() || *b == b'*')
        .count();
    if len == 0 || !inner[len..].starts_with('}') {
        return None;
    }
    Some((&inner[..len], len + 2))
}

/// Length of the `[..]` and `{..}` argument groups at the start of `s`.
fn argument_span(s: &str) -> usize {
    let mut consumed = 0;
    loop {
        let rest = &s[consumed..];
        let (open, close) = match rest.chars().next() {
            Some('[') => ('[', ']'),
            Some('{') => ('{', '}'),
            _ => return consumed,
        };

        let mut depth = 0usize;
        let mut end = None;
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            if !escaped {
                if c == open {
                    depth += 1;
                } else if c == close {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i + c.len_utf8());
                        break;
                    }
                }
            }
            escaped = c == '\\' && !escaped;
        }

        match end {
            Some(len) => consumed += len,
            None => return consumed,
        }
    }
}
