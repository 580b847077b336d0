//! Recoverable rendering defects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A defect found while rendering a page.
///
/// Warnings never stop a run; the affected content degrades to plain text
/// (or, for tables, is padded) and the warning is returned alongside the
/// rendered pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A link names nothing in the index
    UnresolvedReference { page: String, target: String },

    /// A link names several targets and none is an exact qualified match
    AmbiguousReference {
        page: String,
        target: String,
        candidates: usize,
    },

    /// Markup with no man page rendering; its payload was kept as text
    UnsupportedCommand { page: String, command: String },

    /// A table row has fewer cells than the widest row
    MalformedTable {
        page: String,
        row: usize,
        cells: usize,
        columns: usize,
    },
}

impl Warning {
    /// File name of the page the warning was raised on.
    pub fn page(&self) -> &str {
        match self {
            Warning::UnresolvedReference { page, .. }
            | Warning::AmbiguousReference { page, .. }
            | Warning::UnsupportedCommand { page, .. }
            | Warning::MalformedTable { page, .. } => page,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedReference { page, target } => {
                write!(f, "{}: unresolved reference to '{}'", page, target)
            }
            Warning::AmbiguousReference {
                page,
                target,
                candidates,
            } => write!(
                f,
                "{}: reference to '{}' matches {} targets",
                page, target, candidates
            ),
            Warning::UnsupportedCommand { page, command } => {
                write!(f, "{}: ignoring \\{} command", page, command)
            }
            Warning::MalformedTable {
                page,
                row,
                cells,
                columns,
            } => write!(
                f,
                "{}: table row {} has {} of {} cells; padded",
                page, row, cells, columns
            ),
        }
    }
}

/// Warnings collected for one page.
#[derive(Debug, Clone, Default)]
pub(crate) struct Report {
    page: String,
    warnings: Vec<Warning>,
}

impl Report {
    pub(crate) fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn unresolved(&mut self, target: &str) {
        self.push(Warning::UnresolvedReference {
            page: self.page.clone(),
            target: target.to_string(),
        });
    }

    pub(crate) fn ambiguous(&mut self, target: &str, candidates: usize) {
        self.push(Warning::AmbiguousReference {
            page: self.page.clone(),
            target: target.to_string(),
            candidates,
        });
    }

    pub(crate) fn unsupported(&mut self, command: &str) {
        self.push(Warning::UnsupportedCommand {
            page: self.page.clone(),
            command: command.to_string(),
        });
    }

    pub(crate) fn malformed_table(&mut self, row: usize, cells: usize, columns: usize) {
        self.push(Warning::MalformedTable {
            page: self.page.clone(),
            row,
            cells,
            columns,
        });
    }

    fn push(&mut self, warning: Warning) {
        log::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
