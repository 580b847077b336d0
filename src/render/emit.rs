//! Page emission: title macro, boilerplate and final text.

use crate::model::{Entity, ProjectInfo};

use super::options::format_date;
use super::roff::{macro_arg, Roff};
use super::RenderOptions;

/// Build the `.TH` title macro for an entity.
///
/// Arguments are topic, section, footer-middle, footer-inside and
/// header-middle. Trailing empty arguments are dropped; an empty argument
/// followed by a present one is written as `""`.
pub fn title_macro(entity: &Entity, project: &ProjectInfo, options: &RenderOptions) -> String {
    let topic = options
        .topic
        .clone()
        .unwrap_or_else(|| entity.name.to_uppercase());

    let footer_middle = options.footer_middle.clone().or_else(|| {
        options
            .date
            .filter(|_| options.autofill)
            .map(format_date)
    });

    let footer_inside = options.footer_inside.clone().or_else(|| {
        if !options.autofill {
            return None;
        }
        let version = project.version.as_deref()?;
        Some(match project.name.as_deref() {
            Some(name) => format!("{} {}", name, version),
            None => version.to_string(),
        })
    });

    let mut args = vec![
        Some(topic),
        Some(options.section.to_string()),
        footer_middle,
        footer_inside,
        options.header_middle.clone(),
    ];
    while matches!(args.last(), Some(None)) {
        args.pop();
    }

    let args: Vec<String> = args
        .into_iter()
        .map(|arg| format!("\"{}\"", macro_arg(&arg.unwrap_or_default())))
        .collect();
    format!(".TH {}", args.join(" "))
}

/// Serialize a page body with its title macro, preamble and epilogue.
pub fn emit(body: &Roff, entity: &Entity, project: &ProjectInfo, options: &RenderOptions) -> String {
    let mut out = String::new();

    if let Some(preamble) = options.preamble.as_deref().filter(|p| !p.is_empty()) {
        out.push_str(preamble);
        if !preamble.ends_with('\n') {
            out.push('\n');
        }
    }

    out.push_str(&title_macro(entity, project, options));
    out.push('\n');

    let body = body.to_string();
    if !body.is_empty() {
        out.push_str(&body);
        out.push('\n');
    }

    if let Some(epilogue) = options.epilogue.as_deref().filter(|e| !e.is_empty()) {
        out.push_str(epilogue);
        if !epilogue.ends_with('\n') {
            out.push('\n');
        }
    }

    out
}
