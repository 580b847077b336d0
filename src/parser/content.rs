//! Conversion of description markup into model content nodes.
//!
//! Paragraph elements mix inline text with block-level constructs (lists,
//! listings, tables, tagged sections). A paragraph is split wherever a
//! block construct appears, so the inline runs around it become separate
//! paragraphs. Tagged sections that belong to the page rather than the
//! description (`\return`, `\param`, `\bug`, ...) are routed into the
//! [`Documentation`] sink instead of the block list.

use sxd_document::dom::{ChildOfElement, Element};

use crate::model::{
    merge_runs, AdmonitionKind, Block, Documentation, Inline, LinkTarget, ListKind, LiteralEntity,
    ParamDoc, ReturnValue, Style, Table, TableCell, TableRow,
};

use super::xml::{child, child_text, elements_named, tag, text};

/// Elements that start a new block inside a paragraph.
const BLOCK_TAGS: &[&str] = &[
    "itemizedlist",
    "orderedlist",
    "programlisting",
    "verbatim",
    "preformatted",
    "table",
    "simplesect",
    "parameterlist",
    "xrefsect",
    "heading",
    "blockquote",
    "hruler",
    "details",
];

fn is_block(name: &str) -> bool {
    BLOCK_TAGS.contains(&name)
}

fn section_level(name: &str) -> Option<u8> {
    name.strip_prefix("sect")
        .and_then(|n| n.parse::<u8>().ok())
        .filter(|n| (1..=6).contains(n))
}

/// Convert a `briefdescription`-like element into inline content.
pub(crate) fn brief(element: Option<Element<'_>>) -> Vec<Inline> {
    let Some(element) = element else {
        return Vec::new();
    };
    let mut out = Vec::new();
    collect_inline(element, &mut out);
    trim(merge_runs(out))
}

/// Convert a `detaileddescription`-like element into blocks, routing
/// page-level sections into `docs`.
pub(crate) fn description(element: Option<Element<'_>>, docs: &mut Documentation) -> Vec<Block> {
    element.map(|e| blocks(e, docs)).unwrap_or_default()
}

/// Convert the children of a container element into blocks.
pub(crate) fn blocks(container: Element<'_>, docs: &mut Documentation) -> Vec<Block> {
    let mut out = Vec::new();
    let mut pending = Vec::new();

    for node in container.children() {
        match node {
            ChildOfElement::Text(t) => pending.push(Inline::text(t.text())),
            ChildOfElement::Element(e) => {
                let name = tag(e);
                if name == "para" || name == "internal" {
                    flush(&mut pending, &mut out);
                    out.extend(blocks(e, docs));
                } else if name == "title" {
                    continue;
                } else if let Some(level) = section_level(name) {
                    flush(&mut pending, &mut out);
                    out.push(Block::Section {
                        title: child_text(e, "title"),
                        level,
                        body: blocks(e, docs),
                    });
                } else if is_block(name) {
                    flush(&mut pending, &mut out);
                    block(e, docs, &mut out);
                } else {
                    inline(e, &mut pending);
                }
            }
            _ => {}
        }
    }

    flush(&mut pending, &mut out);
    out
}

/// Close the current paragraph, dropping it when it holds only whitespace.
fn flush(pending: &mut Vec<Inline>, out: &mut Vec<Block>) {
    let content = trim(merge_runs(std::mem::take(pending)));
    if !content.is_empty() {
        out.push(Block::Paragraph { content });
    }
}

/// Strip leading and trailing whitespace from an inline sequence.
fn trim(mut nodes: Vec<Inline>) -> Vec<Inline> {
    if let Some(Inline::Text { text }) = nodes.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(Inline::Text { text }) = nodes.last_mut() {
        *text = text.trim_end().to_string();
    }
    nodes.retain(|n| !matches!(n, Inline::Text { text } if text.is_empty()));
    nodes
}

fn block(e: Element<'_>, docs: &mut Documentation, out: &mut Vec<Block>) {
    match tag(e) {
        "itemizedlist" | "orderedlist" => {
            let kind = if tag(e) == "orderedlist" {
                ListKind::Ordered
            } else {
                ListKind::Bullet
            };
            let items = elements_named(e, "listitem")
                .map(|item| blocks(item, docs))
                .collect();
            out.push(Block::List { kind, items });
        }
        "programlisting" => {
            let language = e
                .attribute_value("filename")
                .map(|f| f.trim_start_matches('.').to_string())
                .filter(|f| !f.is_empty());
            let lines = elements_named(e, "codeline").map(text).collect();
            out.push(Block::Code { language, lines });
        }
        "verbatim" | "preformatted" => {
            let source = text(e);
            out.push(Block::code(None, source.trim_matches('\n')));
        }
        "table" => out.push(Block::Table { table: table(e) }),
        "simplesect" => simplesect(e, docs, out),
        "parameterlist" => parameterlist(e, docs),
        "xrefsect" => xrefsect(e, docs),
        "heading" => out.push(Block::Section {
            title: text(e).trim().to_string(),
            level: e
                .attribute_value("level")
                .and_then(|l| l.parse().ok())
                .unwrap_or(1),
            body: Vec::new(),
        }),
        "blockquote" | "details" => out.extend(blocks(e, docs)),
        _ => {}
    }
}

fn simplesect(e: Element<'_>, docs: &mut Documentation, out: &mut Vec<Block>) {
    let kind = e.attribute_value("kind").unwrap_or("");
    let admonition = match kind {
        "note" => Some(AdmonitionKind::Note),
        "warning" => Some(AdmonitionKind::Warning),
        "attention" => Some(AdmonitionKind::Attention),
        _ => None,
    };
    if let Some(kind) = admonition {
        out.push(Block::Admonition {
            kind,
            body: blocks(e, docs),
        });
        return;
    }

    match kind {
        "return" => {
            let body = blocks(e, docs);
            docs.returns.extend(body);
        }
        "see" => {
            let mut refs = Vec::new();
            collect_inline(e, &mut refs);
            if !docs.see_also.is_empty() {
                docs.see_also.push(Inline::text(", "));
            }
            docs.see_also.extend(refs);
        }
        "author" | "authors" => {
            let body = blocks(e, docs);
            docs.authors.push(body);
        }
        "par" => {
            let title = child_text(e, "title");
            let body = blocks(e, docs);
            if title.is_empty() {
                out.extend(body);
            } else {
                out.push(Block::Section {
                    title,
                    level: 2,
                    body,
                });
            }
        }
        other => out.push(Block::paragraph(vec![Inline::Unsupported {
            command: other.to_string(),
            payload: collapse(&text(e)),
        }])),
    }
}

fn parameterlist(e: Element<'_>, docs: &mut Documentation) {
    let kind = e.attribute_value("kind").unwrap_or("param");
    for item in elements_named(e, "parameteritem") {
        let names: Vec<String> = elements_named(item, "parameternamelist")
            .flat_map(|list| elements_named(list, "parametername"))
            .map(|name| text(name).trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        let description = child(item, "parameterdescription")
            .map(|d| blocks(d, docs))
            .unwrap_or_default();

        match kind {
            "param" => docs.params.push(ParamDoc { names, description }),
            "retval" => docs.return_values.push(ReturnValue {
                value: names.join(", "),
                description,
            }),
            other => log::debug!("Ignoring {} parameter list", other),
        }
    }
}

fn xrefsect(e: Element<'_>, docs: &mut Documentation) {
    let title = child_text(e, "xreftitle");
    let body = child(e, "xrefdescription")
        .map(|d| blocks(d, docs))
        .unwrap_or_default();
    match title.as_str() {
        "Bug" => docs.bugs.push(body),
        "Deprecated" => docs.deprecated.push(body),
        _ => log::warn!("Unsupported section '{}' dropped", title),
    }
}

fn table(e: Element<'_>) -> Table {
    let mut table = Table::new();
    for row in elements_named(e, "row") {
        let entries: Vec<Element<'_>> = elements_named(row, "entry").collect();
        let is_header = entries
            .iter()
            .any(|entry| entry.attribute_value("thead") == Some("yes"));
        let cells = entries
            .into_iter()
            .map(|entry| TableCell::new(brief(Some(entry))))
            .collect();
        table.add_row(TableRow { cells, is_header });
    }
    table
}

/// Append the inline content of an element, skipping block constructs.
/// Paragraph boundaries become a single space.
fn collect_inline(element: Element<'_>, out: &mut Vec<Inline>) {
    for node in element.children() {
        match node {
            ChildOfElement::Text(t) => out.push(Inline::text(t.text())),
            ChildOfElement::Element(e) => match tag(e) {
                "para" => {
                    if !out.is_empty() {
                        out.push(Inline::text(" "));
                    }
                    collect_inline(e, out);
                }
                "title" => {}
                name if is_block(name) || section_level(name).is_some() => {}
                _ => inline(e, out),
            },
            _ => {}
        }
    }
}

fn children(element: Element<'_>) -> Vec<Inline> {
    let mut out = Vec::new();
    collect_inline(element, &mut out);
    out
}

fn inline(e: Element<'_>, out: &mut Vec<Inline>) {
    let name = tag(e);
    if let Some(entity) = LiteralEntity::from_tag(name) {
        out.push(Inline::Entity { entity });
        return;
    }

    let node = match name {
        "bold" => Inline::styled(Style::Bold, children(e)),
        "emphasis" | "underline" | "ins" => Inline::styled(Style::Italic, children(e)),
        "computeroutput" | "tt" => Inline::styled(Style::Code, children(e)),
        "strike" | "s" | "del" => Inline::styled(Style::Strikethrough, children(e)),
        "ref" => {
            let label = text(e).trim().to_string();
            let target = match e.attribute_value("refid") {
                Some(refid) => LinkTarget::with_refid(refid, label),
                None => LinkTarget::named(label),
            };
            Inline::Link {
                target,
                content: children(e),
            }
        }
        "ulink" => Inline::Url {
            url: e.attribute_value("url").unwrap_or_default().to_string(),
            content: children(e),
        },
        "sp" => Inline::text(" "),
        "linebreak" => Inline::LineBreak,
        "highlight" => {
            collect_inline(e, out);
            return;
        }
        "anchor" | "indexentry" => return,
        "emoji" => Inline::Unsupported {
            command: name.to_string(),
            payload: e.attribute_value("name").unwrap_or_default().to_string(),
        },
        "image" => {
            let caption = collapse(&text(e));
            let payload = if caption.is_empty() {
                e.attribute_value("name").unwrap_or_default().to_string()
            } else {
                caption
            };
            Inline::Unsupported {
                command: name.to_string(),
                payload,
            }
        }
        _ => Inline::Unsupported {
            command: name.to_string(),
            payload: collapse(&text(e)),
        },
    };
    out.push(node);
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sxd_document::dom::ChildOfRoot;
    use sxd_document::parser;

    fn with_root<T>(xml: &str, f: impl FnOnce(Element<'_>) -> T) -> T {
        let package = parser::parse(xml).unwrap();
        let doc = package.as_document();
        let root = doc
            .root()
            .children()
            .into_iter()
            .find_map(|c| match c {
                ChildOfRoot::Element(e) => Some(e),
                _ => None,
            })
            .unwrap();
        f(root)
    }

    #[test]
    fn test_brief_is_trimmed_inline() {
        let content = with_root(
            "<briefdescription><para>Does <bold>foo</bold> things. </para></briefdescription>",
            |e| brief(Some(e)),
        );
        assert_eq!(
            content,
            vec![
                Inline::text("Does "),
                Inline::bold("foo"),
                Inline::text(" things.")
            ]
        );
    }

    #[test]
    fn test_paragraph_split_around_list() {
        let mut docs = Documentation::default();
        let body = with_root(
            "<detaileddescription><para>Before <itemizedlist><listitem><para>one</para></listitem>\
             <listitem><para>two</para></listitem></itemizedlist> after.</para></detaileddescription>",
            |e| blocks(e, &mut docs),
        );
        assert_eq!(body.len(), 3);
        assert_eq!(body[0], Block::text("Before"));
        match &body[1] {
            Block::List { kind, items } => {
                assert_eq!(*kind, ListKind::Bullet);
                assert_eq!(items.len(), 2);
            }
            other => panic!("expected list, got {:?}", other),
        }
        assert_eq!(body[2], Block::text("after."));
    }

    #[test]
    fn test_special_sections_routed_to_docs() {
        let mut docs = Documentation::default();
        let body = with_root(
            r#"<detaileddescription><para>Text.
<simplesect kind="return"><para>Zero on success.</para></simplesect>
<parameterlist kind="param"><parameteritem><parameternamelist><parametername>a</parametername><parametername>b</parametername></parameternamelist><parameterdescription><para>Inputs.</para></parameterdescription></parameteritem></parameterlist>
<parameterlist kind="retval"><parameteritem><parameternamelist><parametername>-1</parametername></parameternamelist><parameterdescription><para>Failure.</para></parameterdescription></parameteritem></parameterlist>
<xrefsect id="bug_1"><xreftitle>Bug</xreftitle><xrefdescription><para>Leaks.</para></xrefdescription></xrefsect>
<xrefsect id="todo_1"><xreftitle>Todo</xreftitle><xrefdescription><para>Later.</para></xrefdescription></xrefsect>
<simplesect kind="author"><para>Jane</para></simplesect>
</para></detaileddescription>"#,
            |e| blocks(e, &mut docs),
        );
        assert_eq!(body, vec![Block::text("Text.")]);
        assert_eq!(docs.returns, vec![Block::text("Zero on success.")]);
        assert_eq!(docs.params.len(), 1);
        assert_eq!(docs.params[0].names, vec!["a", "b"]);
        assert_eq!(docs.return_values[0].value, "-1");
        assert_eq!(docs.bugs, vec![vec![Block::text("Leaks.")]]);
        assert_eq!(docs.authors.len(), 1);
        assert!(docs.deprecated.is_empty());
    }

    #[test]
    fn test_admonitions_and_unsupported_sections() {
        let mut docs = Documentation::default();
        let body = with_root(
            r#"<d><para><simplesect kind="note"><para>One.</para></simplesect><simplesect kind="note"><para>Two.</para></simplesect><simplesect kind="since"><para>1.2</para></simplesect></para></d>"#,
            |e| blocks(e, &mut docs),
        );
        assert_eq!(body.len(), 3);
        assert!(matches!(
            body[0],
            Block::Admonition {
                kind: AdmonitionKind::Note,
                ..
            }
        ));
        assert!(matches!(body[1], Block::Admonition { .. }));
        assert_eq!(
            body[2],
            Block::paragraph(vec![Inline::Unsupported {
                command: "since".to_string(),
                payload: "1.2".to_string()
            }])
        );
    }

    #[test]
    fn test_program_listing() {
        let mut docs = Documentation::default();
        let body = with_root(
            r#"<d><para><programlisting filename=".c"><codeline><highlight class="normal">int<sp/>x;</highlight></codeline><codeline></codeline><codeline><highlight class="keyword">return</highlight><sp/>x;</codeline></programlisting></para></d>"#,
            |e| blocks(e, &mut docs),
        );
        assert_eq!(
            body,
            vec![Block::Code {
                language: Some("c".to_string()),
                lines: vec!["int x;".to_string(), String::new(), "return x;".to_string()],
            }]
        );
    }

    #[test]
    fn test_table_header_and_cells() {
        let mut docs = Documentation::default();
        let body = with_root(
            r#"<d><para><table rows="2" cols="2"><row><entry thead="yes"><para>A</para></entry><entry thead="yes"><para>B</para></entry></row><row><entry thead="no"><para>1</para></entry><entry thead="no"><para><computeroutput>x|y</computeroutput></para></entry></row></table></para></d>"#,
            |e| blocks(e, &mut docs),
        );
        match &body[0] {
            Block::Table { table } => {
                assert_eq!(table.row_count(), 2);
                assert!(table.rows[0].is_header);
                assert!(!table.rows[1].is_header);
                assert_eq!(table.rows[1].cells[1].content, vec![Inline::code("x|y")]);
            }
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_inline_nodes() {
        let content = with_root(
            r#"<b><para>See <ref refid="a1" kindref="member">foo</ref><ndash/><ulink url="https://x.org">site</ulink><linebreak/><emoji name=":smile:" unicode="&amp;#x1f604;"/><foo>bar</foo></para></b>"#,
            |e| brief(Some(e)),
        );
        assert_eq!(content[0], Inline::text("See "));
        assert_eq!(
            content[1],
            Inline::link_with_text(LinkTarget::with_refid("a1", "foo"), "foo")
        );
        assert_eq!(
            content[2],
            Inline::Entity {
                entity: LiteralEntity::EnDash
            }
        );
        assert!(matches!(content[3], Inline::Url { .. }));
        assert_eq!(content[4], Inline::LineBreak);
        assert_eq!(
            content[5],
            Inline::Unsupported {
                command: "emoji".to_string(),
                payload: ":smile:".to_string()
            }
        );
        assert_eq!(
            content[6],
            Inline::Unsupported {
                command: "foo".to_string(),
                payload: "bar".to_string()
            }
        );
    }

    #[test]
    fn test_sections_nest() {
        let mut docs = Documentation::default();
        let body = with_root(
            r#"<d><sect1 id="s"><title>Usage</title><para>Call it.</para></sect1></d>"#,
            |e| blocks(e, &mut docs),
        );
        assert_eq!(
            body,
            vec![Block::Section {
                title: "Usage".to_string(),
                level: 1,
                body: vec![Block::text("Call it.")],
            }]
        );
    }
}
