//! Block-level content nodes.

use super::{Inline, Table};
use serde::{Deserialize, Serialize};

/// Kind of list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    /// Bulleted list
    Bullet,
    /// Numbered list, starting at 1
    Ordered,
}

/// Kind of admonition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmonitionKind {
    /// `\note`
    Note,
    /// `\warning`
    Warning,
    /// `\attention`
    Attention,
}

impl AdmonitionKind {
    /// Label that introduces the admonition in rendered output.
    pub fn label(&self) -> &'static str {
        match self {
            AdmonitionKind::Note => "Note:",
            AdmonitionKind::Warning => "Warning:",
            AdmonitionKind::Attention => "Attention:",
        }
    }
}

/// Block-level content of a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Paragraph of inline content
    Paragraph { content: Vec<Inline> },

    /// Bulleted or numbered list; each item is a sequence of blocks
    List {
        kind: ListKind,
        items: Vec<Vec<Block>>,
    },

    /// Table
    Table { table: Table },

    /// Literal source code
    Code {
        language: Option<String>,
        lines: Vec<String>,
    },

    /// Note, warning or attention block
    Admonition {
        kind: AdmonitionKind,
        body: Vec<Block>,
    },

    /// Titled section of a description (`\section`, `\par`, headings)
    Section {
        title: String,
        level: u8,
        body: Vec<Block>,
    },
}

impl Block {
    /// Create a paragraph from inline nodes.
    pub fn paragraph(content: Vec<Inline>) -> Self {
        Block::Paragraph { content }
    }

    /// Create a paragraph of plain text.
    pub fn text(text: impl Into<String>) -> Self {
        Block::Paragraph {
            content: vec![Inline::text(text)],
        }
    }

    /// Create a code block from source text.
    pub fn code(language: Option<&str>, source: &str) -> Self {
        Block::Code {
            language: language.map(str::to_string),
            lines: source.lines().map(str::to_string).collect(),
        }
    }

    /// Get plain text content of the block.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Paragraph { content } => super::plain_text(content),
            Block::List { items, .. } => items
                .iter()
                .map(|item| blocks_plain_text(item))
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Table { table } => table.plain_text(),
            Block::Code { lines, .. } => lines.join("\n"),
            Block::Admonition { body, .. } => blocks_plain_text(body),
            Block::Section { title, body, .. } => {
                format!("{}\n{}", title, blocks_plain_text(body))
            }
        }
    }
}

/// Plain text of a block sequence, one block per line.
pub fn blocks_plain_text(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(Block::plain_text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_lines() {
        let block = Block::code(Some("c"), "int x;\n\nreturn x;");
        match block {
            Block::Code { language, lines } => {
                assert_eq!(language.as_deref(), Some("c"));
                assert_eq!(lines, vec!["int x;", "", "return x;"]);
            }
            _ => panic!("expected code block"),
        }
    }

    #[test]
    fn test_admonition_labels() {
        assert_eq!(AdmonitionKind::Note.label(), "Note:");
        assert_eq!(AdmonitionKind::Warning.label(), "Warning:");
        assert_eq!(AdmonitionKind::Attention.label(), "Attention:");
    }

    #[test]
    fn test_block_plain_text() {
        let list = Block::List {
            kind: ListKind::Bullet,
            items: vec![vec![Block::text("one")], vec![Block::text("two")]],
        };
        assert_eq!(list.plain_text(), "one\ntwo");
    }
}
