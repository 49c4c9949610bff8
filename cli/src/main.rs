//! o2t CLI - Obsidian note to LaTeX converter

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use obsidian2tex::{
    convert_file, stage_assets, AssetLocator, ConvertOptions, ConvertResult, ErrorMode,
    JsonFormat, Template, TemplateVars, UnderscoreStyle, VaultLocator,
};

#[derive(Parser)]
#[command(name = "o2t")]
#[command(author = "obsidian2tex contributors")]
#[command(version)]
#[command(about = "Convert Obsidian notes into LaTeX documents", long_about = None)]
struct Cli {
    /// Input note
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(flatten)]
    convert: ConvertArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a note into a LaTeX document
    Convert {
        /// Input note
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        args: ConvertArgs,
    },

    /// Print the LaTeX body, metadata and assets as JSON
    Json {
        /// Input note
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Degrade gracefully instead of failing on malformed input
        #[arg(long)]
        lenient: bool,
    },

    /// Show note information
    Info {
        /// Input note
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
struct ConvertArgs {
    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Output file name without extension (defaults to the note name)
    #[arg(long)]
    name: Option<String>,

    /// LaTeX template with {{content}} placeholder
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Title used when the note has none
    #[arg(long)]
    title: Option<String>,

    /// Author used when the note has none
    #[arg(long, env = "O2T_AUTHOR")]
    author: Option<String>,

    /// Date used when the note has none (defaults to today)
    #[arg(long)]
    date: Option<String>,

    /// Number headings and emit a table of contents
    #[arg(long)]
    toc: bool,

    /// Rendering of _underscore_ emphasis
    #[arg(long, value_enum)]
    underscore: Option<UnderscoreMode>,

    /// Vault searched for embedded images and drawings
    #[arg(long, value_name = "DIR", env = "O2T_VAULT")]
    vault: Option<PathBuf>,

    /// Degrade gracefully instead of failing on malformed input
    #[arg(long)]
    lenient: bool,

    /// Run pdflatex on the result
    #[arg(long)]
    compile: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum UnderscoreMode {
    /// \underline{..}
    Underline,
    /// \textit{..}
    Italic,
}

impl From<UnderscoreMode> for UnderscoreStyle {
    fn from(mode: UnderscoreMode) -> Self {
        match mode {
            UnderscoreMode::Underline => UnderscoreStyle::Underline,
            UnderscoreMode::Italic => UnderscoreStyle::Italic,
        }
    }
}

impl ConvertArgs {
    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::new().with_table_of_contents(self.toc);
        if self.lenient {
            options = options.lenient();
        }
        if let Some(mode) = self.underscore {
            options = options.with_underscore_style(mode.into());
        }
        options
    }

    fn vars(&self, input: &Path) -> TemplateVars {
        let mut vars = TemplateVars::new().with_table_of_contents(self.toc);
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| file_stem(input).to_string());
        vars = vars.with_title(title);
        if let Some(author) = &self.author {
            vars = vars.with_author(author.clone());
        }
        if let Some(date) = &self.date {
            vars = vars.with_date(date.clone());
        }
        vars
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert { input, args }) => cmd_convert(&input, &args),
        Some(Commands::Json {
            input,
            output,
            compact,
            lenient,
        }) => cmd_json(&input, output.as_deref(), compact, lenient),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, &cli.convert)
            } else {
                println!("{}", "Usage: o2t <FILE> [-o DIR]".yellow());
                println!("       o2t --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_convert(input: &Path, args: &ConvertArgs) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = args.output.clone().unwrap_or_else(|| PathBuf::from("output"));
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| file_stem(input).to_string());
    fs::create_dir_all(&output_dir)?;

    let steps = if args.compile { 4 } else { 3 };
    let pb = ProgressBar::new(steps);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Converting note...");
    let options = args.options();
    let result = convert_file(input, &options)?;
    pb.inc(1);

    pb.set_message("Staging attachments...");
    let missing = match &args.vault {
        Some(vault) => {
            let locator = VaultLocator::open(vault)?;
            stage(&locator, &result, &output_dir, options.error_mode)?
        }
        None => {
            let note_dir = input.parent().unwrap_or_else(|| Path::new("."));
            stage(note_dir, &result, &output_dir, options.error_mode)?
        }
    };
    pb.inc(1);

    pb.set_message("Writing LaTeX...");
    let template = match &args.template {
        Some(path) => Template::from_file(path)?,
        None => Template::default(),
    };
    let tex = template.render(&result, &args.vars(input));
    let tex_file = format!("{}.tex", name);
    fs::write(output_dir.join(&tex_file), tex)?;
    pb.inc(1);

    let mut pdf_file = None;
    if args.compile {
        pb.set_message("Running pdflatex...");
        compile(&output_dir, &tex_file)?;
        pdf_file = Some(format!("{}.pdf", name));
        pb.inc(1);
    }

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), tex_file);
    for file in result.included_files() {
        println!("  {} {}", "├─".dimmed(), file);
    }
    if let Some(pdf) = pdf_file {
        println!("  {} {}", "├─".dimmed(), pdf);
    }
    println!("  {} {}", "└─".dimmed(), output_dir.display());

    for file in missing {
        println!("{} {}", "Missing asset:".yellow(), file);
    }

    Ok(())
}

fn stage<L: AssetLocator + ?Sized>(
    locator: &L,
    result: &ConvertResult,
    output_dir: &Path,
    mode: ErrorMode,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let staged = stage_assets(locator, result, output_dir, mode)?;
    log::debug!("Staged {} assets", staged.copied.len());
    Ok(staged.missing)
}

fn compile(output_dir: &Path, tex_file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let status = Command::new("pdflatex")
        .arg("-interaction=nonstopmode")
        .arg(tex_file)
        .current_dir(output_dir)
        .status()
        .map_err(|e| format!("Failed to run pdflatex: {}", e))?;

    if !status.success() {
        return Err(format!("pdflatex exited with {}", status).into());
    }
    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    lenient: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ConvertOptions::new();
    if lenient {
        options = options.lenient();
    }
    let result = convert_file(input, &options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = obsidian2tex::render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    // Lenient so that a malformed note still shows its metadata
    let options = ConvertOptions::new().lenient();
    let result = convert_file(input, &options)?;

    println!("{}", "Note Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    if let Some(ref title) = result.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = result.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref date) = result.metadata.date {
        println!("{}: {}", "Date".bold(), date);
    }
    println!(
        "{}: {}",
        "Chemistry".bold(),
        if result.uses_chemistry { "Yes" } else { "No" }
    );

    println!();
    println!("{}", "Assets".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for image in &result.images {
        println!("{}: {}", "Image".bold(), image);
    }
    for drawing in &result.drawings {
        println!(
            "{}: {} -> {}",
            "Drawing".bold(),
            drawing.scene_file,
            drawing.rendered_file
        );
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if let serde_json::Value::Object(stats) = serde_json::to_value(&result.stats)? {
        for (key, value) in stats {
            println!("{}: {}", key.replace('_', " ").bold(), value);
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "o2t".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Obsidian note to LaTeX converter");
    println!();
    println!("License: MIT");
}

fn file_stem(path: &Path) -> &str {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("note")
}
