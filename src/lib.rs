//! # doxman
//!
//! Render Doxygen-extracted C API documentation as roff manual pages.
//!
//! The input is the XML output directory of Doxygen (`GENERATE_XML=YES`).
//! It is read into a [`Document`], a typed model of files, groups,
//! functions, macros, structures, unions, enumerations, typedefs and
//! variables. Each entity is then rendered to one manual page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use doxman::{parse_dir, render};
//!
//! fn main() -> doxman::Result<()> {
//!     // Read the Doxygen XML output
//!     let doc = parse_dir("build/xml")?;
//!
//!     // Render one page per entity
//!     let options = render::RenderOptions::default().with_section(3);
//!     let result = render::to_man_pages(&doc, &options)?;
//!     for page in &result.pages {
//!         println!("{}", page.file_name());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Fixed section order**: NAME, LIBRARY, SYNOPSIS, DESCRIPTION, FIELDS,
//!   PARAMETERS, RETURN VALUE, BUGS, AUTHORS, SEE ALSO
//! - **Cross references**: links render as `name(3)` and feed SEE ALSO
//! - **Collision-free page names** across entity kinds
//! - **Deterministic output**: the same model always renders the same bytes
//! - **Parallel rendering**: uses Rayon when enabled

pub mod error;
pub mod index;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use index::{PageTarget, ReferenceIndex};
pub use model::{
    Block, Document, Entity, EntityKind, Inline, Member, MemberKind, ProjectInfo, Table,
    TableCell, TableRow,
};
pub use parser::{DoxygenParser, ErrorMode, IncludePath, ParseOptions};
pub use render::{
    JsonFormat, ManPage, ManRenderer, RenderOptions, RenderResult, RenderStats, Warning,
};

use std::path::Path;

/// Parse a Doxygen XML output directory.
///
/// # Arguments
///
/// * `dir` - Directory holding `index.xml` and the compound files
///
/// # Example
///
/// ```no_run
/// use doxman::parse_dir;
///
/// let doc = parse_dir("build/xml").unwrap();
/// println!("Entities: {}", doc.entity_count());
/// ```
pub fn parse_dir<P: AsRef<Path>>(dir: P) -> Result<Document> {
    DoxygenParser::parse_dir(dir, ParseOptions::default())
}

/// Parse a Doxygen XML output directory with custom options.
///
/// # Example
///
/// ```no_run
/// use doxman::{parse_dir_with_options, ParseOptions};
///
/// let options = ParseOptions::new().lenient();
/// let doc = parse_dir_with_options("build/xml", options).unwrap();
/// ```
pub fn parse_dir_with_options<P: AsRef<Path>>(dir: P, options: ParseOptions) -> Result<Document> {
    DoxygenParser::parse_dir(dir, options)
}

/// Parse Doxygen XML documents held in memory.
///
/// Each item is a `(source name, xml)` pair; the source name only appears
/// in error messages.
pub fn parse_xml<'a, I>(documents: I, options: ParseOptions) -> Result<Document>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut parser = DoxygenParser::new(options);
    for (source, xml) in documents {
        parser.add_xml(source, xml)?;
    }
    Ok(parser.finish())
}

/// Parse a Doxygen XML directory and render every page.
///
/// # Example
///
/// ```no_run
/// use doxman::{render_dir, RenderOptions};
///
/// let result = render_dir("build/xml", &RenderOptions::default()).unwrap();
/// for warning in &result.warnings {
///     eprintln!("warning: {}", warning);
/// }
/// ```
pub fn render_dir<P: AsRef<Path>>(dir: P, options: &RenderOptions) -> Result<RenderResult> {
    let doc = parse_dir(dir)?;
    render::to_man_pages(&doc, options)
}

/// Builder for parsing and rendering with custom options.
///
/// # Example
///
/// ```no_run
/// use doxman::Doxman;
///
/// let result = Doxman::new()
///     .lenient()
///     .with_section(3)
///     .with_composite_fields()
///     .parse("build/xml")?
///     .to_man_pages()?;
/// # Ok::<(), doxman::Error>(())
/// ```
pub struct Doxman {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Doxman {
    /// Create a new Doxman builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Skip unparsable XML files instead of failing.
    pub fn lenient(mut self) -> Self {
        self.parse_options = self.parse_options.lenient();
        self
    }

    /// Show full header paths in `#include` lines.
    pub fn with_full_include_paths(mut self) -> Self {
        self.parse_options = self.parse_options.with_include_path(IncludePath::Full);
        self
    }

    /// Skip XML files whose names match a pattern.
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self> {
        self.parse_options = self.parse_options.with_exclude(pattern)?;
        Ok(self)
    }

    /// Set the manual section.
    pub fn with_section(mut self, section: u8) -> Self {
        self.render_options = self.render_options.with_section(section);
        self
    }

    /// Render FIELDS for structs and unions.
    pub fn with_composite_fields(mut self) -> Self {
        self.render_options = self.render_options.with_composite_fields(true);
        self
    }

    /// Render PARAMETERS for functions and function-like macros.
    pub fn with_parameters(mut self) -> Self {
        self.render_options = self
            .render_options
            .with_function_parameters(true)
            .with_macro_parameters(true);
        self
    }

    /// Keep bold and italic markup.
    pub fn with_preserve_styles(mut self) -> Self {
        self.render_options = self.render_options.with_preserve_styles(true);
        self
    }

    /// Render pages on the rayon pool.
    pub fn parallel(mut self) -> Self {
        self.render_options = self.render_options.with_parallel(true);
        self
    }

    /// Replace the render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    /// Parse a Doxygen XML directory and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, dir: P) -> Result<DoxmanResult> {
        let document = DoxygenParser::parse_dir(dir, self.parse_options)?;
        Ok(DoxmanResult {
            document,
            render_options: self.render_options,
        })
    }

    /// Wrap an already built document.
    pub fn load(self, document: Document) -> DoxmanResult {
        DoxmanResult {
            document,
            render_options: self.render_options,
        }
    }
}

impl Default for Doxman {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed documentation model ready to render.
pub struct DoxmanResult {
    /// The parsed document
    pub document: Document,
    /// Render options to use
    render_options: RenderOptions,
}

impl DoxmanResult {
    /// Render every page.
    pub fn to_man_pages(&self) -> Result<RenderResult> {
        render::to_man_pages(&self.document, &self.render_options)
    }

    /// Dump the model as JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Build the reference index, e.g. to list page targets.
    pub fn index(&self) -> Result<ReferenceIndex<'_>> {
        ReferenceIndex::build(&self.document, self.render_options.section)
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
