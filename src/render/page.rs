//! Entity page assembly.
//!
//! A [`PageRenderer`] builds one page in the fixed man-pages(7) order:
//! NAME, LIBRARY, SYNOPSIS, DESCRIPTION, the per-kind member sections,
//! RETURN VALUE, DEPRECATION, BUGS, EXAMPLES, AUTHORS and SEE ALSO.
//! References met while rendering content are collected on the renderer
//! and become the SEE ALSO list once every other section is done.

use crate::error::{Error, Result};
use crate::index::{Lookup, PageTarget, ReferenceIndex};
use crate::model::{
    Block, Entity, EntityKind, Example, LinkTarget, Member, MemberKind, ParamDoc, ReturnValue,
    Style,
};

use super::emit::emit;
use super::report::Report;
use super::result::{ManPage, RenderStats};
use super::roff::{escape, macro_arg, Roff};
use super::{RenderOptions, Warning};

/// Overview table categories for file and group pages.
const CATEGORIES: [(&str, EntityKind); 6] = [
    ("Functions", EntityKind::Function),
    ("Defines", EntityKind::Macro),
    ("Enumerations", EntityKind::Enum),
    ("Structures", EntityKind::Struct),
    ("Unions", EntityKind::Union),
    ("Variables", EntityKind::Variable),
];

/// A rendered page with what was found while rendering it.
#[derive(Debug)]
pub(crate) struct RenderedPage {
    pub(crate) page: ManPage,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) stats: RenderStats,
}

/// Renders the page of one entity.
pub(crate) struct PageRenderer<'a> {
    pub(super) index: &'a ReferenceIndex<'a>,
    pub(super) options: &'a RenderOptions,
    pub(super) entity: &'a Entity,
    page: &'a PageTarget,
    /// Identifiers shown in italics inside code spans
    pub(super) params: Vec<&'a str>,
    pub(super) styles: Vec<Style>,
    pub(super) in_code: bool,
    pub(super) references: Vec<&'a Entity>,
    pub(super) examples: Vec<&'a Example>,
    pub(super) report: Report,
    pub(super) stats: RenderStats,
}

impl<'a> PageRenderer<'a> {
    /// Create a renderer for an entity of the indexed document.
    pub(crate) fn new(
        index: &'a ReferenceIndex<'a>,
        options: &'a RenderOptions,
        entity: &'a Entity,
    ) -> Result<Self> {
        let page = index
            .page(entity)
            .ok_or_else(|| Error::Render(format!("no page target for {}", entity.describe())))?;

        let mut params: Vec<&'a str> = entity.parameter_names().collect();
        if entity.kind == EntityKind::Typedef {
            params.extend(documented_params(&entity.docs.params));
        }

        Ok(Self {
            index,
            options,
            entity,
            page,
            params,
            styles: Vec::new(),
            in_code: false,
            references: Vec::new(),
            examples: Vec::new(),
            report: Report::new(page.file_name()),
            stats: RenderStats::new(),
        })
    }

    /// Render the complete page.
    pub(crate) fn render(mut self) -> RenderedPage {
        let body = self.body();
        let content = emit(&body, self.entity, &self.index.document().project, self.options);

        self.stats.add_page();
        self.stats.count_output(&content);
        log::debug!("Rendered {} ({} bytes)", self.page.file_name(), content.len());

        RenderedPage {
            page: ManPage {
                name: self.page.name.clone(),
                section: self.page.section,
                entity_id: self.entity.id.clone(),
                kind: self.entity.kind,
                content,
            },
            warnings: self.report.into_warnings(),
            stats: self.stats,
        }
    }

    /// Assemble the page body, everything after the title macro.
    pub(crate) fn body(&mut self) -> Roff {
        let entity = self.entity;
        let mut roff = Roff::new();

        let brief = self.inline_roff(&entity.brief);
        self.name_section(&mut roff, &brief);

        if let Some(library) = self.options.library.as_deref().map(str::trim) {
            if !library.is_empty() {
                roff.request_with("SH", "LIBRARY");
                roff.text(escape(library));
            }
        }

        self.synopsis(&mut roff);
        self.description(&mut roff, &brief);

        match entity.kind {
            EntityKind::Struct | EntityKind::Union if self.options.composite_fields => {
                self.member_section(&mut roff, "FIELDS", MemberKind::Field);
            }
            EntityKind::Enum => self.member_section(&mut roff, "CONSTANTS", MemberKind::Enumerator),
            EntityKind::Function if self.options.function_parameters => {
                self.parameters(&mut roff);
            }
            EntityKind::Macro if self.options.macro_parameters => self.parameters(&mut roff),
            _ => {}
        }

        if matches!(entity.kind, EntityKind::Function | EntityKind::Macro) {
            self.return_value(&mut roff);
        }

        // \see only contributes references.
        let _ = self.inline_roff(&entity.docs.see_also);

        let deprecated = self.collection(&entity.docs.deprecated);
        let bugs = self.inherited(|e| &e.docs.bugs);
        let authors = self.inherited(|e| &e.docs.authors);
        let examples = self.examples_roff();

        push_section(&mut roff, "DEPRECATION", deprecated);
        push_section(&mut roff, "BUGS", bugs);
        push_section(&mut roff, "EXAMPLES", examples);
        push_section(&mut roff, "AUTHORS", authors);
        self.see_also(&mut roff);

        roff
    }

    fn name_section(&mut self, roff: &mut Roff, brief: &Roff) {
        let name = match self.entity.kind {
            EntityKind::Group => self.page.name.as_str(),
            _ => self.entity.name.as_str(),
        };
        let mut summary = brief.plain();
        if summary.trim().is_empty() && self.entity.kind == EntityKind::Group {
            summary = escape(self.entity.display_name());
        }
        let summary = briefify(summary.trim());

        roff.request_with("SH", "NAME");
        if summary.is_empty() {
            roff.text(escape(name));
        } else {
            roff.text(format!("{} \\- {}", escape(name), summary));
        }
    }

    fn synopsis(&mut self, roff: &mut Roff) {
        let entity = self.entity;
        if entity.kind == EntityKind::Group {
            return;
        }

        roff.request_with("SH", "SYNOPSIS");
        roff.request("nf");

        // a file is its own header; anything else without one gets no include line
        let header = match (entity.header.as_deref(), entity.kind) {
            (Some(header), _) => Some(header),
            (None, EntityKind::File) => Some(entity.name.as_str()),
            (None, _) => None,
        };
        if let Some(header) = header {
            roff.request_with("B", format!("#include <{}>", macro_arg(header)));
        }
        if entity.kind == EntityKind::File {
            roff.request("fi");
            return;
        }
        if header.is_some() {
            roff.request("PP");
        }

        let declaration = &entity.declaration;
        match entity.kind {
            EntityKind::Function => {
                roff.request_with("BI", function_signature(entity));
            }
            EntityKind::Macro if declaration.function_like => {
                let params: Vec<String> = entity
                    .parameter_names()
                    .map(|name| format!("\" {} \"", macro_arg(name)))
                    .collect();
                roff.request_with(
                    "BI",
                    format!("\"#define {}({});\"", macro_arg(&entity.name), params.join(", ")),
                );
            }
            EntityKind::Macro => {
                let mut signature = format!("#define {}", macro_arg(&entity.name));
                if let Some(value) = declaration.initializer.as_deref() {
                    signature.push(' ');
                    signature.push_str(&macro_arg(value));
                }
                roff.request_with("B", signature);
            }
            EntityKind::Struct | EntityKind::Union | EntityKind::Enum => {
                roff.request_with(
                    "B",
                    format!("{} {} {{", entity.kind.as_str(), macro_arg(&entity.name)),
                );
                if !entity.members.is_empty() {
                    roff.request("RS");
                    for member in &entity.members {
                        roff.request_with("B", member_declaration(member));
                    }
                    roff.request("RE");
                }
                roff.request_with("B", "};");
                for alias in &declaration.aliases {
                    roff.request_with(
                        "B",
                        format!(
                            "typedef {} {} {};",
                            entity.kind.as_str(),
                            macro_arg(&entity.name),
                            macro_arg(alias)
                        ),
                    );
                }
            }
            EntityKind::Typedef => {
                let documented: Vec<&str> = documented_params(&entity.docs.params).collect();
                let mut signature = format!("\"typedef {}", macro_arg(&declaration.type_spelling));
                push_declarator(&mut signature, &macro_arg(&entity.name));
                for token in tokens(&declaration.args) {
                    if documented.contains(&token) {
                        signature.push_str(&format!("\" {} \"", macro_arg(token)));
                    } else {
                        signature.push_str(&macro_arg(token));
                    }
                }
                signature.push_str(";\"");
                roff.request_with("BI", signature);
            }
            EntityKind::Variable => {
                let mut signature = macro_arg(&declaration.type_spelling);
                push_declarator(&mut signature, &macro_arg(&entity.name));
                signature.push_str(&macro_arg(&declaration.args));
                signature.push(';');
                roff.request_with("B", signature);
            }
            EntityKind::File | EntityKind::Group => {}
        }

        roff.request("fi");
    }

    fn description(&mut self, roff: &mut Roff, brief: &Roff) {
        let entity = self.entity;
        let mut section = if entity.docs.description.is_empty() {
            let mut fallback = Roff::new();
            if !brief.is_empty() {
                fallback.append(brief.clone());
            }
            fallback
        } else {
            self.blocks_roff(&entity.docs.description)
        };

        if matches!(entity.kind, EntityKind::File | EntityKind::Group) {
            let overview = self.overview();
            if !overview.is_empty() {
                section.request("PP");
                section.append(overview);
                section.simplify();
            }
        }

        if !section.is_empty() {
            roff.request_with("SH", "DESCRIPTION");
            roff.append(section);
        }
    }

    fn member_section(&mut self, roff: &mut Roff, title: &str, kind: MemberKind) {
        let entity = self.entity;
        let members: Vec<&'a Member> = entity
            .members
            .iter()
            .filter(|m| m.kind == kind && !m.name.is_empty())
            .collect();
        if members.is_empty() {
            return;
        }

        roff.request_with("SH", title);
        for member in members {
            roff.request("TP");
            roff.request_with("BR", macro_arg(&member.name));
            if !member.description.is_empty() {
                let body = self.indented_roff(&member.description);
                roff.append(body);
            } else if !member.brief.is_empty() {
                let body = self.inline_roff(&member.brief);
                roff.append(body);
            }
        }
    }

    fn parameters(&mut self, roff: &mut Roff) {
        let entity = self.entity;
        let params = &entity.docs.params;
        if params.is_empty() {
            return;
        }
        roff.request_with("SH", "PARAMETERS");
        for param in params {
            roff.request("TP");
            roff.line(escape(&param.names.join(", ")));
            let body = self.indented_roff(&param.description);
            roff.append(body);
        }
    }

    fn return_value(&mut self, roff: &mut Roff) {
        let entity = self.entity;
        let docs = &entity.docs;
        let values: &[ReturnValue] = &docs.return_values;
        if docs.returns.is_empty() && values.is_empty() {
            return;
        }
        roff.request_with("SH", "RETURN VALUE");
        let returns = self.blocks_roff(&docs.returns);
        roff.append(returns);
        for value in values {
            roff.request("TP");
            roff.line(escape(&value.value));
            let body = self.indented_roff(&value.description);
            roff.append(body);
        }
    }

    /// Render block collections separated by paragraph breaks.
    fn collection(&mut self, entries: &[Vec<Block>]) -> Roff {
        let mut out = Roff::new();
        for (position, entry) in entries.iter().enumerate() {
            if position > 0 {
                out.request("PP");
            }
            let body = self.blocks_roff(entry);
            out.append(body);
        }
        out
    }

    /// Entries of the entity followed by those of its enclosing groups,
    /// without duplicates.
    fn inherited(&mut self, select: impl Fn(&'a Entity) -> &'a Vec<Vec<Block>>) -> Roff {
        let mut entries: Vec<Vec<Block>> = Vec::new();
        let owners = std::iter::once(self.entity).chain(self.index.ancestors(self.entity));
        for owner in owners {
            for entry in select(owner) {
                if !entries.contains(entry) {
                    entries.push(entry.clone());
                }
            }
        }
        self.collection(&entries)
    }

    fn examples_roff(&mut self) -> Roff {
        let mut out = Roff::new();
        let examples = self.examples.clone();
        for (position, example) in examples.into_iter().enumerate() {
            if position > 0 {
                out.request("PP");
            }
            let body = if !example.description.is_empty() {
                self.blocks_roff(&example.description)
            } else {
                self.inline_roff(&example.brief)
            };
            out.append(body);
        }
        out
    }

    fn see_also(&mut self, roff: &mut Roff) {
        let entity = self.entity;
        let index = self.index;

        if let Some(group) = entity.group.as_deref() {
            for sibling in index.group_members(group) {
                self.refer(sibling);
            }
        }
        if entity.kind == EntityKind::Function {
            for param in &entity.members {
                let Some(type_ref) = param.type_ref.as_deref() else {
                    continue;
                };
                if let Lookup::Resolved(resolution) =
                    index.resolve(&LinkTarget::with_refid(type_ref, ""))
                {
                    if let Some(owner) = resolution.owner() {
                        self.refer(owner);
                    }
                }
            }
        }

        let mut pages: Vec<&PageTarget> = self
            .references
            .iter()
            .filter_map(|referenced| index.page(referenced))
            .collect();
        pages.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.name.cmp(&b.name)));
        pages.dedup_by(|a, b| a.name == b.name);
        if pages.is_empty() {
            return;
        }

        roff.request_with("SH", "SEE ALSO");
        let last = pages.len() - 1;
        for (position, page) in pages.into_iter().enumerate() {
            let trailing = if position < last { "," } else { "" };
            roff.request_with(
                "BR",
                format!("{} ({}){}", escape(&page.label), page.section, trailing),
            );
        }
    }

    /// `tbl` overview of the entities declared in a file or group.
    fn overview(&mut self) -> Roff {
        let entity = self.entity;
        let index = self.index;
        let mut out = Roff::new();

        let listed = |e: &&'a Entity| e.kind.is_listed() && e.id != entity.id;

        if entity.kind == EntityKind::Group {
            let members: Vec<&'a Entity> = index.group_members(&entity.id).into_iter().filter(listed).collect();
            self.overview_table(&mut out, &members);
            return out;
        }

        let members: Vec<&'a Entity> = entity
            .contents
            .iter()
            .filter_map(|id| index.entity(id))
            .filter(listed)
            .collect();

        let ungrouped: Vec<&'a Entity> = members.iter().copied().filter(|e| e.group.is_none()).collect();
        self.overview_table(&mut out, &ungrouped);

        for group_id in &index.document().group_order {
            let grouped: Vec<&'a Entity> = members
                .iter()
                .copied()
                .filter(|e| e.group.as_deref() == Some(group_id.as_str()))
                .collect();
            if grouped.is_empty() {
                continue;
            }
            let Some(group) = index.entity(group_id) else {
                continue;
            };

            out.request_with("SS", macro_arg(group.display_name()));
            let intro = if !group.docs.description.is_empty() {
                self.blocks_roff(&group.docs.description)
            } else {
                self.inline_roff(&group.brief)
            };
            out.append(intro);
            self.overview_table(&mut out, &grouped);
        }

        out
    }

    fn overview_table(&mut self, out: &mut Roff, members: &[&'a Entity]) {
        if members.is_empty() {
            return;
        }
        self.stats.add_table();
        let index = self.index;

        out.request("TS");
        out.line("tab(;);");
        let mut emitted = false;
        for (title, kind) in CATEGORIES {
            let rows: Vec<&'a Entity> = members.iter().copied().filter(|e| e.kind == kind).collect();
            if rows.is_empty() {
                continue;
            }
            if emitted {
                out.request("T&");
            }
            out.line("l l.");
            out.line(format!("\\f[B]{}\\f[R];\\f[B]Description\\f[R]", title));
            out.line("_");
            for row in rows {
                let Some(page) = index.page(row) else {
                    continue;
                };
                out.line(format!("\\f[B]{}\\f[R]({});T{{", escape(&page.label), page.section));
                let mut brief = self.inline_roff(&row.brief).plain().trim().to_string();
                if brief.starts_with("T}") {
                    brief.insert_str(0, "\\&");
                }
                out.line(brief);
                out.line("T}");
            }
            emitted = true;
        }
        out.request("TE");
    }
}

fn push_section(roff: &mut Roff, title: &str, body: Roff) {
    if body.is_empty() {
        return;
    }
    roff.request_with("SH", title);
    roff.append(body);
}

fn documented_params(params: &[ParamDoc]) -> impl Iterator<Item = &str> {
    params
        .iter()
        .flat_map(|param| param.names.iter().map(String::as_str))
}

/// Lower-case the first letter unless the text begins with an acronym.
pub(crate) fn lowerify(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && !second.is_uppercase() => {
            first.to_lowercase().chain(text.chars().skip(1)).collect()
        }
        _ => text.to_string(),
    }
}

/// NAME line form of a brief: lowerified, without trailing periods.
pub(crate) fn briefify(brief: &str) -> String {
    lowerify(brief).trim_end_matches('.').to_string()
}


/// Append a declarator, with no space after a pointer star.
fn push_declarator(signature: &mut String, declarator: &str) {
    if !signature.is_empty() && !signature.ends_with('*') && !signature.ends_with('"') {
        signature.push(' ');
    }
    signature.push_str(declarator);
}

fn function_signature(entity: &Entity) -> String {
    let mut signature = format!("\"{}", macro_arg(&entity.declaration.type_spelling));
    push_declarator(&mut signature, &macro_arg(&entity.name));
    signature.push('(');

    let params: Vec<&Member> = entity
        .members
        .iter()
        .filter(|m| m.kind == MemberKind::Parameter)
        .collect();
    for (position, param) in params.iter().enumerate() {
        signature.push_str(&macro_arg(&param.type_spelling));
        if (!param.name.is_empty() || !param.suffix.is_empty())
            && !param.type_spelling.is_empty()
            && !signature.ends_with('*')
        {
            signature.push(' ');
        }
        if !param.name.is_empty() {
            signature.push_str(&format!("\" {} \"", macro_arg(&param.name)));
        }
        signature.push_str(&macro_arg(&param.suffix));
        if position + 1 < params.len() {
            signature.push_str(", ");
        }
    }

    signature.push_str(");\"");
    signature
}

fn member_declaration(member: &Member) -> String {
    match member.kind {
        MemberKind::Enumerator => {
            let mut line = macro_arg(&member.name);
            if let Some(value) = member.initializer.as_deref() {
                let value = value.trim().trim_start_matches('=').trim();
                if !value.is_empty() {
                    line.push_str(" = ");
                    line.push_str(&macro_arg(value));
                }
            }
            line.push(',');
            line
        }
        _ => format!("{};", macro_arg(&member.declaration())),
    }
}

/// Split a C argument list into identifiers and single punctuation
/// characters, keeping whitespace runs as tokens.
fn tokens(text: &str) -> Vec<&str> {
    #[derive(PartialEq)]
    enum Class {
        Word,
        Space,
        Other,
    }
    let class = |c: char| {
        if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else if c.is_whitespace() {
            Class::Space
        } else {
            Class::Other
        }
    };

    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        let kind = class(c);
        let mut end = start + c.len_utf8();
        if kind != Class::Other {
            while let Some(&(position, next)) = chars.peek() {
                if class(next) != kind {
                    break;
                }
                end = position + next.len_utf8();
                chars.next();
            }
        }
        tokens.push(&text[start..end]);
    }
    tokens
}
