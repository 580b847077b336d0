//! doxman CLI - render Doxygen XML output as manual pages

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use doxman::{
    parse_dir_with_options, Document, IncludePath, JsonFormat, ManRenderer, ParseOptions,
    ReferenceIndex, RenderOptions, RenderResult,
};

#[derive(Parser)]
#[command(name = "doxman")]
#[command(author = "doxman contributors")]
#[command(version)]
#[command(about = "Render Doxygen XML output as roff manual pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one manual page per documented entity
    Render {
        /// Doxygen XML output directory
        #[arg(value_name = "XML_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "man")]
        output: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Dump the documentation model as JSON
    Json {
        /// Doxygen XML output directory
        #[arg(value_name = "XML_DIR")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show project information and page names
    Info {
        /// Doxygen XML output directory
        #[arg(value_name = "XML_DIR")]
        input: PathBuf,

        /// Manual section
        #[arg(long, default_value = "3")]
        section: u8,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Default)]
struct ParseArgs {
    /// Header path shown in #include lines
    #[arg(long, value_enum, default_value = "short")]
    include_path: IncludeStyle,

    /// Skip XML files whose names match this pattern
    #[arg(long, value_name = "REGEX")]
    exclude: Option<String>,

    /// Skip unparsable XML files instead of failing
    #[arg(long)]
    lenient: bool,
}

impl ParseArgs {
    fn to_options(&self) -> Result<ParseOptions, Box<dyn std::error::Error>> {
        let mut options = ParseOptions::new().with_include_path(self.include_path.into());
        if let Some(pattern) = self.exclude.as_deref() {
            options = options.with_exclude(pattern)?;
        }
        if self.lenient {
            options = options.lenient();
        }
        Ok(options)
    }
}

#[derive(Args)]
struct RenderArgs {
    /// Manual section (1-9)
    #[arg(long, default_value = "3")]
    section: u8,

    /// Render PARAMETERS for functions
    #[arg(long)]
    function_parameters: bool,

    /// Render PARAMETERS for function-like macros
    #[arg(long)]
    macro_parameters: bool,

    /// Render FIELDS for structs and unions
    #[arg(long)]
    composite_fields: bool,

    /// Keep bold, italic and strikethrough markup
    #[arg(long)]
    preserve_styles: bool,

    /// Render documentation sections as subsections
    #[arg(long)]
    subsections: bool,

    /// Title override for the .TH macro
    #[arg(long)]
    topic: Option<String>,

    /// Center footer text
    #[arg(long)]
    footer_middle: Option<String>,

    /// Inside footer text
    #[arg(long)]
    footer_inside: Option<String>,

    /// Center header text
    #[arg(long)]
    header_middle: Option<String>,

    /// Fill missing footers with today's date and the project version
    #[arg(long)]
    autofill: bool,

    /// File whose content is written before the title macro
    #[arg(long, value_name = "FILE")]
    preamble: Option<PathBuf>,

    /// File whose content is written after the page body
    #[arg(long, value_name = "FILE")]
    epilogue: Option<PathBuf>,

    /// LIBRARY section label (defaults to the project brief)
    #[arg(long, value_name = "TEXT")]
    library: Option<String>,

    /// Render pages in parallel
    #[arg(short, long)]
    jobs: bool,
}

impl Default for RenderArgs {
    fn default() -> Self {
        Self {
            section: 3,
            function_parameters: false,
            macro_parameters: false,
            composite_fields: false,
            preserve_styles: false,
            subsections: false,
            topic: None,
            footer_middle: None,
            footer_inside: None,
            header_middle: None,
            autofill: false,
            preamble: None,
            epilogue: None,
            library: None,
            jobs: false,
        }
    }
}

impl RenderArgs {
    fn to_options(&self, doc: &Document) -> Result<RenderOptions, Box<dyn std::error::Error>> {
        let mut options = RenderOptions::new()
            .with_section(self.section)
            .with_function_parameters(self.function_parameters)
            .with_macro_parameters(self.macro_parameters)
            .with_composite_fields(self.composite_fields)
            .with_preserve_styles(self.preserve_styles)
            .with_subsections(self.subsections)
            .with_parallel(self.jobs);

        if let Some(topic) = &self.topic {
            options = options.with_topic(topic.as_str());
        }
        if let Some(text) = &self.footer_middle {
            options = options.with_footer_middle(text.as_str());
        }
        if let Some(text) = &self.footer_inside {
            options = options.with_footer_inside(text.as_str());
        }
        if let Some(text) = &self.header_middle {
            options = options.with_header_middle(text.as_str());
        }
        if self.autofill {
            options = options.with_autofill(chrono::Local::now().date_naive());
        }
        if let Some(path) = &self.preamble {
            options = options.with_preamble(fs::read_to_string(path)?);
        }
        if let Some(path) = &self.epilogue {
            options = options.with_epilogue(fs::read_to_string(path)?);
        }

        let library = self
            .library
            .clone()
            .or_else(|| doc.project.brief.clone())
            .filter(|l| !l.is_empty());
        if let Some(library) = library {
            options = options.with_library(library);
        }

        options.validate()?;
        Ok(options)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
enum IncludeStyle {
    /// Header file name only
    #[default]
    Short,
    /// Full header path as recorded by Doxygen
    Full,
}

impl From<IncludeStyle> for IncludePath {
    fn from(style: IncludeStyle) -> Self {
        match style {
            IncludeStyle::Short => IncludePath::Short,
            IncludeStyle::Full => IncludePath::Full,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Render {
            input,
            output,
            parse,
            render,
        }) => cmd_render(&input, &output, &parse, &render),
        Some(Commands::Json {
            input,
            output,
            compact,
            parse,
        }) => cmd_json(&input, output.as_deref(), compact, &parse),
        Some(Commands::Info {
            input,
            section,
            parse,
        }) => cmd_info(&input, section, &parse),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            println!("{}", "Usage: doxman render <XML_DIR> [-o DIR]".yellow());
            println!("       doxman --help for more information");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_render(
    input: &Path,
    output: &Path,
    parse: &ParseArgs,
    render: &RenderArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Parsing XML...");
    let doc = parse_dir_with_options(input, parse.to_options()?)?;
    pb.inc(1);

    pb.set_message("Rendering pages...");
    let options = render.to_options(&doc)?;
    let result = ManRenderer::new(options).render(&doc)?;
    pb.inc(1);

    pb.set_message("Writing pages...");
    let written = write_pages(&result, output)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!(
        "\n{} {} pages written to {}",
        "Done!".green().bold(),
        written,
        output.display()
    );
    print_warnings(&result);

    Ok(())
}

/// Write every page as `<name>.<section>` into a directory.
fn write_pages(result: &RenderResult, output: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    fs::create_dir_all(output)?;
    for page in &result.pages {
        fs::write(output.join(page.file_name()), &page.content)?;
    }
    Ok(result.pages.len())
}

fn print_warnings(result: &RenderResult) {
    if !result.has_warnings() {
        return;
    }
    println!(
        "\n{} ({})",
        "Warnings".yellow().bold(),
        result.warnings.len()
    );
    for warning in &result.warnings {
        println!("  {} {}", "-".dimmed(), warning);
    }
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    parse: &ParseArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_dir_with_options(input, parse.to_options()?)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = doxman::render::to_json(&doc, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path, section: u8, parse: &ParseArgs) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_dir_with_options(input, parse.to_options()?)?;
    let index = ReferenceIndex::build(&doc, section)?;

    println!("{}", "Project Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Directory".bold(), input.display());
    if let Some(ref name) = doc.project.name {
        println!("{}: {}", "Name".bold(), name);
    }
    if let Some(ref brief) = doc.project.brief {
        println!("{}: {}", "Brief".bold(), brief);
    }
    if let Some(ref version) = doc.project.version {
        println!("{}: {}", "Version".bold(), version);
    }

    println!();
    println!("{}", "Entities".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (kind, count) in doc.count_by_kind() {
        println!("{}: {}", kind.to_string().bold(), count);
    }
    println!("{}: {}", "Examples".bold(), doc.examples.len());

    println!();
    println!("{}", "Pages".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for (entity, page) in doc.entities.iter().zip(index.pages()) {
        println!(
            "  {} {} {}",
            page.file_name(),
            "←".dimmed(),
            entity.describe().dimmed()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "doxman".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Doxygen XML to manual page renderer");
    println!();
    println!("Repository: {}", "https://github.com/doxman/doxman".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use doxman::{Entity, EntityKind};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_render_args_parse() {
        let cli = Cli::try_parse_from([
            "doxman",
            "render",
            "xml",
            "-o",
            "out",
            "--section",
            "7",
            "--composite-fields",
            "--include-path",
            "full",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Render {
                input,
                output,
                parse,
                render,
            }) => {
                assert_eq!(input, PathBuf::from("xml"));
                assert_eq!(output, PathBuf::from("out"));
                assert!(parse.include_path == IncludeStyle::Full);
                assert_eq!(render.section, 7);
                assert!(render.composite_fields);
                assert!(!render.function_parameters);
            }
            _ => panic!("expected render command"),
        }
    }

    #[test]
    fn test_library_defaults_to_project_brief() {
        let mut doc = Document::new();
        doc.project.brief = Some("Frobnication library".to_string());

        let options = RenderArgs::default().to_options(&doc).unwrap();
        assert_eq!(options.library.as_deref(), Some("Frobnication library"));

        let args = RenderArgs {
            library: Some("libfrob, -lfrob".to_string()),
            ..RenderArgs::default()
        };
        let options = args.to_options(&doc).unwrap();
        assert_eq!(options.library.as_deref(), Some("libfrob, -lfrob"));
    }

    #[test]
    fn test_invalid_section_rejected() {
        let args = RenderArgs {
            section: 12,
            ..RenderArgs::default()
        };
        assert!(args.to_options(&Document::new()).is_err());
    }

    #[test]
    fn test_bad_exclude_rejected() {
        let args = ParseArgs {
            exclude: Some("[".to_string()),
            ..ParseArgs::default()
        };
        assert!(args.to_options().is_err());
    }

    #[test]
    fn test_write_pages() {
        let mut doc = Document::new();
        doc.add_entity(Entity::new("f1", EntityKind::Function, "frob").with_header("frob.h"));
        let result = doxman::render::to_man_pages(&doc, &RenderOptions::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let written = write_pages(&result, &dir.path().join("man")).unwrap();
        assert_eq!(written, 1);

        let content = fs::read_to_string(dir.path().join("man").join("frob.3")).unwrap();
        assert!(content.starts_with(".TH \"FROB\" \"3\""));
    }
}
