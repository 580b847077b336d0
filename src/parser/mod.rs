//! Extractor output parsing module.

mod content;
mod doxygen;
mod options;
mod xml;

pub use doxygen::DoxygenParser;
pub use options::{ErrorMode, IncludePath, ParseOptions};
