//! Parsing options and configuration.

use crate::error::Result;
use regex::Regex;

/// Options for reading extractor output.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// How header paths appear in `#include` lines
    pub include_path: IncludePath,

    /// XML file names matching this pattern are skipped
    pub exclude: Option<Regex>,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unparsable files).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set the include path style.
    pub fn with_include_path(mut self, style: IncludePath) -> Self {
        self.include_path = style;
        self
    }

    /// Skip XML files whose name matches `pattern`.
    pub fn with_exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Check whether a file name is excluded.
    pub fn is_excluded(&self, file_name: &str) -> bool {
        self.exclude
            .as_ref()
            .map(|re| re.is_match(file_name))
            .unwrap_or(false)
    }

    /// Format a source location as shown in `#include <...>`.
    pub fn header_path(&self, location: &str) -> String {
        match self.include_path {
            IncludePath::Full => location.to_string(),
            IncludePath::Short => location
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(location)
                .to_string(),
        }
    }
}

/// Error handling mode during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any unparsable file
    #[default]
    Strict,
    /// Skip unparsable files and continue
    Lenient,
}

/// Header path style in synopsis `#include` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IncludePath {
    /// File name only (`foo.h`)
    #[default]
    Short,
    /// Location as recorded by the extractor (`include/lib/foo.h`)
    Full,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .with_include_path(IncludePath::Full)
            .with_exclude("^dir_")
            .unwrap();

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.include_path, IncludePath::Full);
        assert!(options.is_excluded("dir_abc.xml"));
        assert!(!options.is_excluded("foo_8h.xml"));
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.include_path, IncludePath::Short);
        assert!(!options.is_excluded("anything.xml"));
    }

    #[test]
    fn test_header_path() {
        let short = ParseOptions::new();
        assert_eq!(short.header_path("include/lib/foo.h"), "foo.h");
        assert_eq!(short.header_path("foo.h"), "foo.h");

        let full = ParseOptions::new().with_include_path(IncludePath::Full);
        assert_eq!(full.header_path("include/lib/foo.h"), "include/lib/foo.h");
    }

    #[test]
    fn test_invalid_exclude_pattern() {
        let result = ParseOptions::new().with_exclude("(unclosed");
        assert!(matches!(result, Err(Error::InvalidPattern(_))));
    }
}
