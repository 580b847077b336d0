//! Inline content nodes.

use serde::{Deserialize, Serialize};

/// Character styling applied to a run of inline content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// Bold text
    Bold,
    /// Italic text
    Italic,
    /// Inline code span
    Code,
    /// Struck-through text
    Strikethrough,
}

/// Typographic characters the extractor reports as named entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralEntity {
    /// En dash
    EnDash,
    /// Em dash
    EmDash,
    /// Opening double quotation mark
    LeftDoubleQuote,
    /// Closing double quotation mark
    RightDoubleQuote,
    /// Opening single quotation mark
    LeftSingleQuote,
    /// Closing single quotation mark
    RightSingleQuote,
    /// Non-breaking space
    NonBreakingSpace,
}

impl LiteralEntity {
    /// Map an extractor element name (e.g. `ndash`) to an entity.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ndash" => Some(Self::EnDash),
            "mdash" => Some(Self::EmDash),
            "ldquo" => Some(Self::LeftDoubleQuote),
            "rdquo" => Some(Self::RightDoubleQuote),
            "lsquo" => Some(Self::LeftSingleQuote),
            "rsquo" => Some(Self::RightSingleQuote),
            "nonbreakablespace" => Some(Self::NonBreakingSpace),
            _ => None,
        }
    }
}

/// The target of a cross reference, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkTarget {
    /// Extractor reference id, when the extractor resolved the link itself
    pub refid: Option<String>,

    /// Identifier as written in the documentation (`foo`, `Frob::nop`)
    pub name: String,
}

impl LinkTarget {
    /// Create a target that is looked up by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            refid: None,
            name: name.into(),
        }
    }

    /// Create a target carrying an extractor reference id.
    pub fn with_refid(refid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            refid: Some(refid.into()),
            name: name.into(),
        }
    }
}

/// Inline content within a paragraph, cell, or brief.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    /// Plain text
    Text { text: String },

    /// Styled run; styles may nest
    Styled { style: Style, content: Vec<Inline> },

    /// Cross reference to another documented entity or member
    Link {
        target: LinkTarget,
        content: Vec<Inline>,
    },

    /// External hyperlink
    Url { url: String, content: Vec<Inline> },

    /// Named typographic character
    Entity { entity: LiteralEntity },

    /// Forced line break
    LineBreak,

    /// Extractor command without a rendering rule; only its payload survives
    Unsupported { command: String, payload: String },
}

impl Inline {
    /// Create a plain text node.
    pub fn text(text: impl Into<String>) -> Self {
        Inline::Text { text: text.into() }
    }

    /// Create a styled run.
    pub fn styled(style: Style, content: Vec<Inline>) -> Self {
        Inline::Styled { style, content }
    }

    /// Create a bold run of plain text.
    pub fn bold(text: impl Into<String>) -> Self {
        Self::styled(Style::Bold, vec![Self::text(text)])
    }

    /// Create an italic run of plain text.
    pub fn italic(text: impl Into<String>) -> Self {
        Self::styled(Style::Italic, vec![Self::text(text)])
    }

    /// Create an inline code span.
    pub fn code(text: impl Into<String>) -> Self {
        Self::styled(Style::Code, vec![Self::text(text)])
    }

    /// Create a link by name whose display text is the name itself.
    pub fn link(name: impl Into<String>) -> Self {
        let name = name.into();
        Inline::Link {
            content: vec![Self::text(name.clone())],
            target: LinkTarget::named(name),
        }
    }

    /// Create a link with custom display text.
    pub fn link_with_text(target: LinkTarget, text: impl Into<String>) -> Self {
        Inline::Link {
            target,
            content: vec![Self::text(text)],
        }
    }

    /// Get the plain text of this node, without any markup.
    pub fn plain_text(&self) -> String {
        match self {
            Inline::Text { text } => text.clone(),
            Inline::Styled { content, .. }
            | Inline::Link { content, .. }
            | Inline::Url { content, .. } => plain_text(content),
            Inline::Entity { entity } => match entity {
                LiteralEntity::EnDash => "\u{2013}".to_string(),
                LiteralEntity::EmDash => "\u{2014}".to_string(),
                LiteralEntity::LeftDoubleQuote | LiteralEntity::RightDoubleQuote => {
                    "\"".to_string()
                }
                LiteralEntity::LeftSingleQuote | LiteralEntity::RightSingleQuote => {
                    "'".to_string()
                }
                LiteralEntity::NonBreakingSpace => " ".to_string(),
            },
            Inline::LineBreak => "\n".to_string(),
            Inline::Unsupported { payload, .. } => payload.clone(),
        }
    }
}

/// Concatenate the plain text of a sequence of inline nodes.
pub fn plain_text(nodes: &[Inline]) -> String {
    nodes.iter().map(Inline::plain_text).collect()
}

/// Normalize an inline sequence.
///
/// Adjacent text nodes are joined, empty text nodes are dropped, and
/// neighbouring runs of the same style are folded into one run so the
/// renderer never emits an off/on pair between them.
pub fn merge_runs(nodes: Vec<Inline>) -> Vec<Inline> {
    let mut merged: Vec<Inline> = Vec::with_capacity(nodes.len());

    for node in nodes {
        let node = match node {
            Inline::Styled { style, content } => Inline::Styled {
                style,
                content: merge_runs(content),
            },
            Inline::Link { target, content } => Inline::Link {
                target,
                content: merge_runs(content),
            },
            Inline::Url { url, content } => Inline::Url {
                url,
                content: merge_runs(content),
            },
            Inline::Text { ref text } if text.is_empty() => continue,
            other => other,
        };

        let leftover = match merged.last_mut() {
            Some(prev) => absorb(prev, node),
            None => Some(node),
        };
        if let Some(node) = leftover {
            merged.push(node);
        }
    }

    merged
}

/// Fold `node` into `prev` when both are text or share a style.
/// Returns the node back when it cannot be folded.
fn absorb(prev: &mut Inline, node: Inline) -> Option<Inline> {
    match (prev, node) {
        (Inline::Text { text: prev }, Inline::Text { text }) => {
            prev.push_str(&text);
            None
        }
        (
            Inline::Styled {
                style: prev_style,
                content: prev_content,
            },
            Inline::Styled { style, content },
        ) => {
            if *prev_style != style {
                return Some(Inline::Styled { style, content });
            }
            prev_content.extend(content);
            let joined = merge_runs(std::mem::take(prev_content));
            *prev_content = joined;
            None
        }
        (_, node) => Some(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let nodes = vec![
            Inline::text("call "),
            Inline::code("foo()"),
            Inline::text(" now"),
        ];
        assert_eq!(plain_text(&nodes), "call foo() now");
    }

    #[test]
    fn test_merge_adjacent_text() {
        let merged = merge_runs(vec![Inline::text("a"), Inline::text(""), Inline::text("b")]);
        assert_eq!(merged, vec![Inline::text("ab")]);
    }

    #[test]
    fn test_merge_adjacent_same_style() {
        let merged = merge_runs(vec![Inline::bold("one "), Inline::bold("two")]);
        assert_eq!(merged, vec![Inline::bold("one two")]);
    }

    #[test]
    fn test_merge_keeps_different_styles() {
        let merged = merge_runs(vec![Inline::bold("one"), Inline::italic("two")]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_merge_nested() {
        let nested = Inline::styled(
            Style::Italic,
            vec![Inline::text("x"), Inline::text("y")],
        );
        let merged = merge_runs(vec![nested]);
        assert_eq!(merged, vec![Inline::italic("xy")]);
    }

    #[test]
    fn test_literal_entity_from_tag() {
        assert_eq!(LiteralEntity::from_tag("ndash"), Some(LiteralEntity::EnDash));
        assert_eq!(LiteralEntity::from_tag("mdash"), Some(LiteralEntity::EmDash));
        assert_eq!(LiteralEntity::from_tag("bold"), None);
    }
}
