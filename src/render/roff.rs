//! Roff output buffer.
//!
//! Renderers append three kinds of elements: running text, verbatim lines
//! and macro requests. Text is kept in one flow and only broken into lines
//! when serialized, one sentence per line. Every line that does not start a
//! request is guarded so a leading `.` or `'` cannot be read as one.

use std::fmt;

use super::sentence::segment;

/// One element of a roff document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Running text, already escaped; whitespace is collapsed on output
    Text(String),
    /// A line written as-is (code, table rows)
    Line(String),
    /// A request such as `.PP` or `.SH NAME`
    Macro {
        name: String,
        arg: Option<String>,
    },
}

/// A buffer of roff elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roff {
    elements: Vec<Element>,
}

impl Roff {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append running text, joining it to preceding text.
    pub fn text(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            return;
        }
        if let Some(Element::Text(prev)) = self.elements.last_mut() {
            prev.push_str(text);
        } else {
            self.elements.push(Element::Text(text.to_string()));
        }
    }

    /// Append a verbatim line.
    pub fn line(&mut self, line: impl Into<String>) {
        self.elements.push(Element::Line(line.into()));
    }

    /// Append a request without arguments.
    pub fn request(&mut self, name: &str) {
        self.elements.push(Element::Macro {
            name: name.to_string(),
            arg: None,
        });
    }

    /// Append a request with an argument.
    pub fn request_with(&mut self, name: &str, arg: impl Into<String>) {
        self.elements.push(Element::Macro {
            name: name.to_string(),
            arg: Some(arg.into()),
        });
    }

    /// Append another buffer.
    pub fn append(&mut self, other: Roff) {
        for element in other.elements {
            match element {
                Element::Text(text) => self.text(text),
                other => self.elements.push(other),
            }
        }
    }

    /// Elements in order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Check whether the buffer holds no visible content.
    pub fn is_empty(&self) -> bool {
        self.elements.iter().all(|element| match element {
            Element::Text(text) => text.trim().is_empty(),
            _ => false,
        })
    }

    /// Check whether the buffer is only running text.
    pub fn is_text(&self) -> bool {
        self.elements
            .iter()
            .all(|element| matches!(element, Element::Text(_)))
    }

    /// Running text of a text-only buffer, whitespace collapsed.
    pub fn plain(&self) -> String {
        let mut out = String::new();
        for element in &self.elements {
            if let Element::Text(text) = element {
                out.push_str(text);
            }
        }
        collapse(&out)
    }

    /// Rename every request `from` to `to`.
    pub fn rename_requests(&mut self, from: &str, to: &str) {
        for element in &mut self.elements {
            if let Element::Macro { name, .. } = element {
                if name == from {
                    *name = to.to_string();
                }
            }
        }
    }

    /// Remove every request named `name`.
    pub fn remove_requests(&mut self, name: &str) {
        self.elements
            .retain(|element| !matches!(element, Element::Macro { name: n, .. } if n == name));
        self.coalesce();
    }

    fn coalesce(&mut self) {
        let elements = std::mem::take(&mut self.elements);
        for element in elements {
            match element {
                Element::Text(text) => self.text(text),
                other => self.elements.push(other),
            }
        }
    }

    /// Normalize paragraph requests and link punctuation.
    ///
    /// Blank text is dropped, as are leading, repeated and trailing `.PP`
    /// and a `.PP` directly after a heading.
    /// Punctuation directly after `.UE` moves into its argument so it stays
    /// attached to the link.
    pub fn simplify(&mut self) {
        let mut kept: Vec<Element> = Vec::with_capacity(self.elements.len());

        for element in std::mem::take(&mut self.elements) {
            if matches!(&element, Element::Text(text) if text.trim().is_empty()) {
                continue;
            }
            if matches!(&element, Element::Macro { name, .. } if name == "PP") {
                let redundant = match kept.last() {
                    None => true,
                    Some(Element::Macro { name, .. }) => matches!(name.as_str(), "PP" | "SH" | "SS"),
                    _ => false,
                };
                if redundant {
                    continue;
                }
            }
            kept.push(element);
        }

        for i in 1..kept.len() {
            let (head, tail) = kept.split_at_mut(i);
            let (Element::Macro { name, arg }, Element::Text(text)) = (&mut head[i - 1], &mut tail[0])
            else {
                continue;
            };
            if name.as_str() != "UE" {
                continue;
            }
            let moved: String = text
                .chars()
                .take_while(|c| matches!(c, '.' | ',' | '!' | '?'))
                .collect();
            if !moved.is_empty() {
                arg.get_or_insert_with(String::new).push_str(&moved);
                text.replace_range(..moved.len(), "");
            }
        }
        kept.retain(|element| !matches!(element, Element::Text(text) if text.trim().is_empty()));

        while matches!(kept.last(), Some(Element::Macro { name, .. }) if name == "PP") {
            kept.pop();
        }

        self.elements = kept;
        self.coalesce();
    }
}

impl fmt::Display for Roff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::new();
        for element in &self.elements {
            match element {
                Element::Macro { name, arg } => match arg {
                    Some(arg) if !arg.is_empty() => lines.push(format!(".{} {}", name, arg)),
                    _ => lines.push(format!(".{}", name)),
                },
                Element::Line(line) => lines.push(guard(line)),
                Element::Text(text) => {
                    for sentence in segment(&collapse(text)) {
                        if !sentence.is_empty() {
                            lines.push(guard(&sentence));
                        }
                    }
                }
            }
        }
        f.write_str(&lines.join("\n"))
    }
}

/// Collapse runs of whitespace to one space.
pub fn collapse(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            space = true;
        } else {
            if space && !out.is_empty() {
                out.push(' ');
            }
            space = false;
            out.push(c);
        }
    }
    if space && !out.is_empty() {
        out.push(' ');
    }
    out
}

/// Neutralize a leading control character on a text line.
fn guard(line: &str) -> String {
    if let Some(rest) = line.strip_prefix('.') {
        format!("\\[char46]{}", rest)
    } else if let Some(rest) = line.strip_prefix('\'') {
        format!("\\[char39]{}", rest)
    } else {
        line.to_string()
    }
}

/// Escape literal text for running text: backslashes and curly quotes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\e"),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            other => out.push(other),
        }
    }
    out
}

/// Escape text placed inside a macro argument, where `"` delimits arguments.
pub fn macro_arg(text: &str) -> String {
    escape(text).replace('"', "\\[dq]")
}

/// Normalize curly quotes only, for text that must keep its backslashes.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}
