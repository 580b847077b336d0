//! Rendering options and configuration.

use chrono::{Datelike, NaiveDate};

use crate::error::{Error, Result};

/// Options for rendering manual pages.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Manual section for file names, the title macro and references (1-9)
    pub section: u8,

    /// Render a PARAMETERS section for functions
    pub function_parameters: bool,

    /// Render a PARAMETERS section for function-like macros
    pub macro_parameters: bool,

    /// Render a FIELDS section for structs and unions
    pub composite_fields: bool,

    /// Keep bold, italic and strikethrough markup; when off they degrade to plain text
    pub preserve_styles: bool,

    /// Render description sections as `.SS` subsections instead of flattening them
    pub subsections: bool,

    /// Title macro topic; defaults to the upper-cased entity name
    pub topic: Option<String>,

    /// Title macro footer-middle text
    pub footer_middle: Option<String>,

    /// Title macro footer-inside text
    pub footer_inside: Option<String>,

    /// Title macro header-middle text
    pub header_middle: Option<String>,

    /// Fill missing footers from `date` and the project version
    pub autofill: bool,

    /// Date used by autofill
    pub date: Option<NaiveDate>,

    /// LIBRARY section text
    pub library: Option<String>,

    /// Raw text written before the title macro
    pub preamble: Option<String>,

    /// Raw text written after the page body
    pub epilogue: Option<String>,

    /// Render pages on the rayon thread pool
    pub parallel: bool,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the manual section.
    pub fn with_section(mut self, section: u8) -> Self {
        self.section = section;
        self
    }

    /// Enable or disable PARAMETERS for functions.
    pub fn with_function_parameters(mut self, enable: bool) -> Self {
        self.function_parameters = enable;
        self
    }

    /// Enable or disable PARAMETERS for function-like macros.
    pub fn with_macro_parameters(mut self, enable: bool) -> Self {
        self.macro_parameters = enable;
        self
    }

    /// Enable or disable FIELDS for structs and unions.
    pub fn with_composite_fields(mut self, enable: bool) -> Self {
        self.composite_fields = enable;
        self
    }

    /// Enable or disable style preservation.
    pub fn with_preserve_styles(mut self, preserve: bool) -> Self {
        self.preserve_styles = preserve;
        self
    }

    /// Enable or disable `.SS` subsections.
    pub fn with_subsections(mut self, enable: bool) -> Self {
        self.subsections = enable;
        self
    }

    /// Set the title macro topic.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Set the footer-middle text.
    pub fn with_footer_middle(mut self, text: impl Into<String>) -> Self {
        self.footer_middle = Some(text.into());
        self
    }

    /// Set the footer-inside text.
    pub fn with_footer_inside(mut self, text: impl Into<String>) -> Self {
        self.footer_inside = Some(text.into());
        self
    }

    /// Set the header-middle text.
    pub fn with_header_middle(mut self, text: impl Into<String>) -> Self {
        self.header_middle = Some(text.into());
        self
    }

    /// Enable autofill of the footers, using `date` for footer-middle.
    pub fn with_autofill(mut self, date: NaiveDate) -> Self {
        self.autofill = true;
        self.date = Some(date);
        self
    }

    /// Set the LIBRARY text.
    pub fn with_library(mut self, library: impl Into<String>) -> Self {
        self.library = Some(library.into());
        self
    }

    /// Set the preamble.
    pub fn with_preamble(mut self, text: impl Into<String>) -> Self {
        self.preamble = Some(text.into());
        self
    }

    /// Set the epilogue.
    pub fn with_epilogue(mut self, text: impl Into<String>) -> Self {
        self.epilogue = Some(text.into());
        self
    }

    /// Enable or disable parallel rendering.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check the options before rendering.
    pub fn validate(&self) -> Result<()> {
        if !(1..=9).contains(&self.section) {
            return Err(Error::InvalidSection(self.section));
        }
        Ok(())
    }
}

impl Default for RenderOptions {
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
            date: None,
            library: None,
            preamble: None,
            epilogue: None,
            parallel: false,
        }
    }
}

/// Format a date as `Oct 19th 2026`.
pub fn format_date(date: NaiveDate) -> String {
    let day = date.day();
    let suffix = if (11..=13).contains(&(day % 100)) {
        "th"
    } else {
        match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        }
    };
    format!("{} {}{} {}", date.format("%b"), day, suffix, date.year())
}
