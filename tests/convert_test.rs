//! Integration tests for note conversion.

use obsidian2tex::{
    convert, convert_with_options, ConvertOptions, DrawingAsset, Error, ErrorMode,
    UnderscoreStyle,
};

#[test]
fn test_heading_trims_one_space() {
    for (input, expected) in [
        ("# Heading", "\\section*{Heading}"),
        ("## Two words", "\\subsection*{Two words}"),
        ("### Deep  spaced", "\\subsubsection*{Deep  spaced}"),
        ("#  Leading", "\\section*{ Leading}"),
    ] {
        let result = convert(input).unwrap();
        assert_eq!(result.content, expected, "input: {:?}", input);
    }
}

#[test]
fn test_tag_is_not_a_heading() {
    let result = convert("#project notes").unwrap();
    assert_eq!(result.content, "\\#project notes \\\\");
}

#[test]
fn test_bold_and_second_conversion_idempotent() {
    let once = convert("Some **bold text** here.").unwrap().content;
    assert_eq!(once, "Some \\textbf{bold text} here. \\\\");
    let twice = convert(&once).unwrap().content;
    assert_eq!(twice, once);
}

#[test]
fn test_heading_scenario() {
    let result = convert("# Heading\n\nSome **bold**.").unwrap();
    assert!(result.content.contains("\\section*{Heading}"));
    assert!(result.content.contains("\\textbf{bold}"));
    assert!(result.content.ends_with("bold}. \\\\"));
}

#[test]
fn test_front_matter_scenario() {
    let result = convert("---\ntitle: X\n---\nBody").unwrap();
    assert_eq!(result.metadata.title.as_deref(), Some("X"));
    assert_eq!(result.metadata.author, None);
    assert_eq!(result.content.lines().collect::<Vec<_>>(), vec!["Body \\\\"]);

    let options = ConvertOptions::new().with_hard_line_breaks(false);
    let result = convert_with_options("---\ntitle: X\n---\nBody", &options).unwrap();
    assert_eq!(result.content, "Body");
}

#[test]
fn test_display_math_brackets_alternate() {
    let text = "$$\na = 1\n$$\ntext\n$$\nb = 2\n\n$$";
    let result = convert(text).unwrap();
    let brackets: Vec<&str> = result
        .content
        .lines()
        .filter(|line| line.starts_with("\\[") || line.starts_with("\\]"))
        .collect();
    assert_eq!(brackets, vec!["\\[", "\\]", "\\[", "\\]"]);
    assert_eq!(result.stats.math_region_count, 2);
    assert!(!result.content.contains("$$"));
}

#[test]
fn test_single_line_display_math() {
    let result = convert("$$E = mc^2$$").unwrap();
    assert_eq!(result.content, "\\[E = mc^2\\]");
}

#[test]
fn test_aligned_environment_drops_delimiters() {
    let text = "Intro\n$$\n\\begin{aligned}\nx &= 1 \\\\\n\ny &= 2\n\\end{aligned}\n$$\nOutro";
    let result = convert(text).unwrap();
    assert_eq!(
        result.content,
        "Intro \\\\\n\\begin{align*}\nx &= 1 \\\\\ny &= 2\n\\end{align*}\nOutro \\\\"
    );
}

#[test]
fn test_bare_align_environment_protected() {
    let text = "\\begin{align}\na &= b\n\\end{align}\nFish & chips";
    let result = convert(text).unwrap();
    assert_eq!(
        result.content,
        "\\begin{align*}\na &= b\n\\end{align*}\nFish \\& chips \\\\"
    );
}

#[test]
fn test_table_scenario() {
    let result = convert("| A | B |\n|---|---|\n| 1 | 2 |").unwrap();
    let lines: Vec<&str> = result.content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("\\begin{tabular}{c|c}"));
    assert_eq!(lines[1], "A & B \\\\ \\hline");
    assert_eq!(lines[2], "1 & 2 \\\\\\end{tabular}\\end{table}");
    assert_eq!(result.content.matches("\\hline").count(), 1);
}

#[test]
fn test_table_between_prose() {
    let text = "Before\n\n|A|B|\n|--|--|\n|1|2|\n\nAfter";
    let result = convert(text).unwrap();
    assert!(result.content.starts_with("Before \\\\\n\n\\begin{table}"));
    assert!(result.content.ends_with("\\end{table}\n\nAfter \\\\"));
}

#[test]
fn test_image_scenario() {
    let result = convert("![[diagram.png]]\n\nSee ![[diagram.png|200]] again").unwrap();
    assert_eq!(result.images, vec!["diagram.png"]);
    assert_eq!(result.content.matches("{diagram.png}").count(), 2);
    assert!(result
        .content
        .starts_with("\\begin{figure}[h]\\includegraphics[width=0.5\\textwidth]{diagram.png}"));
}

#[test]
fn test_image_with_underscore_name() {
    let result = convert("![[my_plot_1.png]]").unwrap();
    assert!(result.content.contains("{my_plot_1.png}"));
    assert_eq!(result.images, vec!["my_plot_1.png"]);
}

#[test]
fn test_drawing_embed() {
    let result = convert("![[Circuit.excalidraw.md|400]]").unwrap();
    assert_eq!(result.drawings, vec![DrawingAsset::new("Circuit", "excalidraw")]);
    assert!(result.content.contains("{Circuit.svg.png}"));
}

#[test]
fn test_custom_image_extensions() {
    let options = ConvertOptions::new().with_image_extensions(["svg"]);
    let result = convert_with_options("![[a.png]]\n![[b.svg]]", &options).unwrap();
    assert_eq!(result.images, vec!["b.svg"]);
}

#[test]
fn test_chemistry() {
    let result = convert("Reaction:\n$\\ce{CO2 + C -> 2 CO}$").unwrap();
    assert!(result.uses_chemistry);
    assert!(result.content.ends_with("$\\ce{CO2 + C -> 2 CO}$"));
    assert_eq!(result.stats.chemistry_count, 1);
}

#[test]
fn test_underscore_style_option() {
    let options = ConvertOptions::new().with_underscore_style(UnderscoreStyle::Italic);
    let result = convert_with_options("an _important_ point", &options).unwrap();
    assert_eq!(result.content, "an \\textit{important} point \\\\");
}

#[test]
fn test_glyphs_and_units() {
    let result = convert("x ≤ y and $a ≠ b$ with \\units{m/s}").unwrap();
    assert_eq!(
        result.content,
        "x $\\leq$ y and $a \\neq  b$ with \\si{m/s}"
    );
}

#[test]
fn test_errors_in_strict_mode() {
    assert!(matches!(
        convert("$$\nx"),
        Err(Error::UnterminatedMath { line: 1 })
    ));
    assert!(matches!(
        convert("a *b"),
        Err(Error::UnbalancedEmphasis { line: 1, .. })
    ));
    assert!(matches!(
        convert("|A|\n|-|\n|1|2|"),
        Err(Error::JaggedTable { line: 3, expected: 1, found: 2 })
    ));
}

#[test]
fn test_lenient_mode_never_fails_on_structure() {
    let options = ConvertOptions::new().with_error_mode(ErrorMode::Lenient);
    for text in ["$$\nx", "a *b", "|A|\n|-|\n|1|2|", "**x\n\ny**"] {
        assert!(convert_with_options(text, &options).is_ok(), "input: {:?}", text);
    }
}

#[test]
fn test_crlf_input() {
    let result = convert("---\r\ntitle: Win\r\n---\r\n# Head\r\n").unwrap();
    assert_eq!(result.metadata.title.as_deref(), Some("Win"));
    assert_eq!(result.content, "\\section*{Head}\n");
}
