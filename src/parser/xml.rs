//! Small helpers over the `sxd_document` DOM.

use sxd_document::dom::{ChildOfElement, Element};

/// Local name of an element.
pub(crate) fn tag<'d>(element: Element<'d>) -> &'d str {
    element.name().local_part()
}

/// Child elements, skipping text and comments.
pub(crate) fn elements<'d>(element: Element<'d>) -> impl Iterator<Item = Element<'d>> {
    element.children().into_iter().filter_map(|child| match child {
        ChildOfElement::Element(e) => Some(e),
        _ => None,
    })
}

/// Child elements with the given name.
pub(crate) fn elements_named<'d>(
    element: Element<'d>,
    name: &'static str,
) -> impl Iterator<Item = Element<'d>> {
    elements(element).filter(move |e| tag(*e) == name)
}

/// First child element with the given name.
pub(crate) fn child<'d>(element: Element<'d>, name: &str) -> Option<Element<'d>> {
    elements(element).find(|e| tag(*e) == name)
}

/// Concatenated text of an element and its descendants.
pub(crate) fn text(element: Element<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: Element<'_>, out: &mut String) {
    for node in element.children() {
        match node {
            ChildOfElement::Text(t) => out.push_str(t.text()),
            ChildOfElement::Element(e) if tag(e) == "sp" => out.push(' '),
            ChildOfElement::Element(e) => collect_text(e, out),
            _ => {}
        }
    }
}

/// Trimmed text of the named child, empty when the child is missing.
pub(crate) fn child_text(element: Element<'_>, name: &str) -> String {
    child(element, name)
        .map(|e| text(e).trim().to_string())
        .unwrap_or_default()
}

/// Extractor id of the first `<ref>` below an element.
pub(crate) fn first_ref(element: Element<'_>) -> Option<String> {
    for e in elements(element) {
        if tag(e) == "ref" {
            if let Some(refid) = e.attribute_value("refid") {
                return Some(refid.to_string());
            }
        }
        if let Some(found) = first_ref(e) {
            return Some(found);
        }
    }
    None
}
