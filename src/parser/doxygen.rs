//! Doxygen XML reader.
//!
//! Builds a [`Document`] from the XML output directory of the extractor:
//! one `compounddef` per file, group, struct, union and example, plus
//! `index.xml` (group order) and `doxyfile.xml` (project metadata).
//! Files can be added in any order; cross-file relations (fields of grouped
//! structs, group membership, typedef aliases) are settled in
//! [`DoxygenParser::finish`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use sxd_document::dom::{ChildOfRoot, Element};

use crate::error::{Error, Result};
use crate::model::{Document, Documentation, Entity, EntityKind, Example, Member};

use super::content::{brief, description};
use super::options::{ErrorMode, ParseOptions};
use super::xml::{child, child_text, elements, elements_named, first_ref, tag, text};

/// Incremental builder of a [`Document`] from extractor XML.
pub struct DoxygenParser {
    options: ParseOptions,
    document: Document,
    seen: HashSet<String>,
    /// Field definitions found outside their struct, keyed by member id
    field_defs: HashMap<String, Member>,
    /// (entity id, group id) pairs learned from group compounds
    group_links: Vec<(String, String)>,
}

impl DoxygenParser {
    /// Create an empty builder.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            document: Document::new(),
            seen: HashSet::new(),
            field_defs: HashMap::new(),
            group_links: Vec::new(),
        }
    }

    /// Read every `*.xml` file of an extractor output directory.
    pub fn parse_dir<P: AsRef<Path>>(dir: P, options: ParseOptions) -> Result<Document> {
        let dir = dir.as_ref();
        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().map(|ext| ext == "xml").unwrap_or(false))
            .collect();
        files.sort();

        let mut parser = Self::new(options);
        let mut parsed = 0usize;
        for path in &files {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            if parser.options.is_excluded(file_name) {
                log::debug!("Excluded {}", file_name);
                continue;
            }
            parser.add_file(path)?;
            parsed += 1;
        }

        if parsed == 0 {
            return Err(Error::Other(format!(
                "No extractor XML files found in {}",
                dir.display()
            )));
        }

        Ok(parser.finish())
    }

    /// Add one XML file.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let xml = std::fs::read_to_string(path)?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.add_xml(&source, &xml)
    }

    /// Add one XML document held in memory; `source` names it in errors.
    pub fn add_xml(&mut self, source: &str, xml: &str) -> Result<()> {
        let package = match sxd_document::parser::parse(xml) {
            Ok(package) => package,
            Err(e) => {
                let err = Error::Xml {
                    file: source.to_string(),
                    message: format!("{:?}", e),
                };
                return match self.options.error_mode {
                    ErrorMode::Strict => Err(err),
                    ErrorMode::Lenient => {
                        log::warn!("Skipping {}", err);
                        Ok(())
                    }
                };
            }
        };

        let doc = package.as_document();
        for node in doc.root().children() {
            let ChildOfRoot::Element(root) = node else {
                continue;
            };
            match tag(root) {
                "doxygen" => {
                    for compound in elements_named(root, "compounddef") {
                        self.compound(compound)?;
                    }
                }
                "doxygenindex" => self.index(root),
                "doxyfile" => self.doxyfile(root),
                other => log::debug!("Ignoring <{}> in {}", other, source),
            }
        }

        log::debug!("Parsed {}", source);
        Ok(())
    }

    /// Settle cross-file relations and return the document.
    pub fn finish(mut self) -> Document {
        self.fill_fields();
        self.link_groups();
        self.fold_aliases();

        let groups: Vec<String> = self
            .document
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Group)
            .map(|e| e.id.clone())
            .collect();
        for id in groups {
            if !self.document.group_order.contains(&id) {
                self.document.group_order.push(id);
            }
        }

        log::debug!(
            "Built document with {} entities and {} examples",
            self.document.entity_count(),
            self.document.examples.len()
        );
        self.document
    }

    fn index(&mut self, root: Element<'_>) {
        for compound in elements_named(root, "compound") {
            if compound.attribute_value("kind") != Some("group") {
                continue;
            }
            if let Some(refid) = compound.attribute_value("refid") {
                if !self.document.group_order.iter().any(|g| g == refid) {
                    self.document.group_order.push(refid.to_string());
                }
            }
        }
    }

    fn doxyfile(&mut self, root: Element<'_>) {
        for option in elements_named(root, "option") {
            let value = elements_named(option, "value")
                .map(|v| text(v))
                .collect::<Vec<_>>()
                .join(" ");
            let value = dequote(value.trim());
            if value.is_empty() {
                continue;
            }
            let project = &mut self.document.project;
            match option.attribute_value("id") {
                Some("PROJECT_NAME") => project.name = Some(value),
                Some("PROJECT_BRIEF") => project.brief = Some(value),
                Some("PROJECT_NUMBER") => project.version = Some(value),
                _ => {}
            }
        }
    }

    fn compound(&mut self, c: Element<'_>) -> Result<()> {
        match c.attribute_value("kind").unwrap_or("") {
            "file" => self.file(c),
            "struct" => self.composite(c, EntityKind::Struct),
            "union" => self.composite(c, EntityKind::Union),
            "group" => self.group(c),
            "example" => self.example(c),
            other => {
                log::debug!("Skipping {} compound", other);
                Ok(())
            }
        }
    }

    fn file(&mut self, c: Element<'_>) -> Result<()> {
        let (id, name) = identity(c, "file")?;
        if !name.to_ascii_lowercase().ends_with(".h") {
            log::debug!("Skipping non-header file {}", name);
            return Ok(());
        }

        let location = location(c).unwrap_or_else(|| name.clone());
        let mut entity =
            Entity::new(id, EntityKind::File, name).with_header(self.options.header_path(&location));
        documented(&mut entity, c);

        for section in elements_named(c, "sectiondef") {
            for m in elements(section) {
                let member = match tag(m) {
                    "memberdef" => self.memberdef(m, None)?,
                    "member" => m.attribute_value("refid").map(str::to_string),
                    _ => None,
                };
                entity.contents.extend(member);
            }
        }
        for inner in elements_named(c, "innerclass") {
            if let Some(refid) = inner.attribute_value("refid") {
                entity.contents.push(refid.to_string());
            }
        }

        self.register(entity);
        Ok(())
    }

    fn composite(&mut self, c: Element<'_>, kind: EntityKind) -> Result<()> {
        let (id, name) = identity(c, kind.as_str())?;
        let mut entity = Entity::new(id, kind, name);
        entity.header = self.header(c);
        documented(&mut entity, c);

        for section in elements_named(c, "sectiondef") {
            for m in elements(section) {
                if m.attribute_value("kind") != Some("variable") {
                    continue;
                }
                match tag(m) {
                    "memberdef" => entity.add_member(field(m)),
                    "member" => {
                        let mut member = Member::field("", child_text(m, "name"));
                        member.id = m.attribute_value("refid").map(str::to_string);
                        entity.add_member(member);
                    }
                    _ => {}
                }
            }
        }

        self.register(entity);
        Ok(())
    }

    fn group(&mut self, c: Element<'_>) -> Result<()> {
        let (id, name) = identity(c, "group")?;
        let mut entity = Entity::new(id.clone(), EntityKind::Group, name);
        entity.title = Some(child_text(c, "title")).filter(|t| !t.is_empty());
        documented(&mut entity, c);

        for inner in elements_named(c, "innergroup") {
            if let Some(refid) = inner.attribute_value("refid") {
                self.group_links.push((refid.to_string(), id.clone()));
            }
        }
        for inner in elements_named(c, "innerclass") {
            if let Some(refid) = inner.attribute_value("refid") {
                self.group_links.push((refid.to_string(), id.clone()));
                entity.contents.push(refid.to_string());
            }
        }
        for section in elements_named(c, "sectiondef") {
            for m in elements(section) {
                match tag(m) {
                    "memberdef" => {
                        if let Some(member) = self.memberdef(m, Some(&id))? {
                            entity.contents.push(member);
                        }
                    }
                    "member" => {
                        if let Some(refid) = m.attribute_value("refid") {
                            self.group_links.push((refid.to_string(), id.clone()));
                            entity.contents.push(refid.to_string());
                        }
                    }
                    _ => {}
                }
            }
        }

        self.register(entity);
        Ok(())
    }

    fn example(&mut self, c: Element<'_>) -> Result<()> {
        let (id, name) = identity(c, "example")?;
        if !self.seen.insert(id.clone()) {
            return Ok(());
        }
        let mut docs = Documentation::default();
        let example = Example {
            id,
            name,
            brief: brief(child(c, "briefdescription")),
            description: description(child(c, "detaileddescription"), &mut docs),
        };
        self.document.examples.push(example);
        Ok(())
    }

    /// Read a `memberdef` as an entity; returns the id when it names one.
    fn memberdef(&mut self, m: Element<'_>, group: Option<&str>) -> Result<Option<String>> {
        let raw_kind = m.attribute_value("kind").unwrap_or("");
        let kind = match raw_kind {
            "function" => EntityKind::Function,
            "define" => EntityKind::Macro,
            "typedef" => EntityKind::Typedef,
            "variable" => EntityKind::Variable,
            "enum" => EntityKind::Enum,
            other => {
                log::debug!("Skipping {} member", other);
                return Ok(None);
            }
        };

        let id = m.attribute_value("id").unwrap_or_default().to_string();
        let name = child_text(m, "name");
        if id.is_empty() || name.is_empty() {
            return Err(Error::MissingIdentity {
                id,
                kind: raw_kind.to_string(),
            });
        }
        if name.starts_with('@') {
            log::debug!("Skipping anonymous {} {}", raw_kind, id);
            return Ok(None);
        }
        if kind == EntityKind::Variable && child_text(m, "definition").contains("::") {
            self.field_defs.insert(id, field(m));
            return Ok(None);
        }
        if self.seen.contains(&id) {
            if let Some(group) = group {
                self.group_links.push((id.clone(), group.to_string()));
            }
            return Ok(Some(id));
        }

        let mut entity = Entity::new(id.clone(), kind, name);
        entity.header = self.header(m);
        entity.group = group.map(str::to_string).or_else(|| group_from_id(&id));
        documented(&mut entity, m);

        match kind {
            EntityKind::Function => {
                entity.declaration.type_spelling = child_text(m, "type");
                entity.declaration.args = child_text(m, "argsstring");
                for p in elements_named(m, "param") {
                    let mut param = Member::parameter(child_text(p, "type"), child_text(p, "declname"))
                        .with_suffix(child_text(p, "array"));
                    param.type_ref = child(p, "type").and_then(first_ref);
                    entity.add_member(param);
                }
            }
            EntityKind::Macro => {
                let params: Vec<Element<'_>> = elements_named(m, "param").collect();
                entity.declaration.function_like = !params.is_empty();
                entity.declaration.initializer =
                    Some(child_text(m, "initializer")).filter(|i| !i.is_empty());
                let names: Vec<String> = params.iter().map(|p| child_text(*p, "defname")).collect();
                // `#define F()` carries one empty param
                if names.iter().all(|n| !n.is_empty()) {
                    for name in names {
                        entity.add_member(Member::parameter("", name));
                    }
                }
            }
            EntityKind::Typedef | EntityKind::Variable => {
                entity.declaration.type_spelling = child_text(m, "type");
                entity.declaration.args = child_text(m, "argsstring");
                entity.declaration.type_ref = child(m, "type").and_then(first_ref);
            }
            EntityKind::Enum => {
                for v in elements_named(m, "enumvalue") {
                    let mut value = Member::enumerator(child_text(v, "name"));
                    value.id = v.attribute_value("id").map(str::to_string);
                    value.initializer =
                        Some(child_text(v, "initializer")).filter(|i| !i.is_empty());
                    value.brief = brief(child(v, "briefdescription"));
                    value.description =
                        description(child(v, "detaileddescription"), &mut Documentation::default());
                    entity.add_member(value);
                }
            }
            _ => {}
        }

        self.register(entity);
        Ok(Some(id))
    }

    fn header(&self, element: Element<'_>) -> Option<String> {
        location(element).map(|path| self.options.header_path(&path))
    }

    fn register(&mut self, entity: Entity) {
        if self.seen.insert(entity.id.clone()) {
            self.document.add_entity(entity);
        } else {
            log::debug!("Duplicate definition of {} ignored", entity.describe());
        }
    }

    /// Complete fields that a struct only lists by reference.
    fn fill_fields(&mut self) {
        let defs = &self.field_defs;
        for entity in self.document.entities.iter_mut() {
            if !entity.kind.is_composite() {
                continue;
            }
            for member in entity.members.iter_mut() {
                let Some(def) = member.id.as_ref().and_then(|id| defs.get(id)) else {
                    continue;
                };
                if member.type_spelling.is_empty() {
                    member.type_spelling = def.type_spelling.clone();
                    member.suffix = def.suffix.clone();
                }
                if member.brief.is_empty() {
                    member.brief = def.brief.clone();
                }
                if member.description.is_empty() {
                    member.description = def.description.clone();
                }
            }
        }
    }

    fn link_groups(&mut self) {
        for (entity_id, group_id) in std::mem::take(&mut self.group_links) {
            if entity_id == group_id {
                continue;
            }
            if let Some(entity) = self
                .document
                .entities
                .iter_mut()
                .find(|e| e.id == entity_id)
            {
                if entity.group.is_none() {
                    entity.group = Some(group_id);
                }
            }
        }
    }

    /// Fold `typedef struct Frob Frob;` into the page of `struct Frob`.
    fn fold_aliases(&mut self) {
        let entities = &self.document.entities;
        let folds: Vec<(usize, usize)> = entities
            .iter()
            .enumerate()
            .filter(|(_, e)| e.kind == EntityKind::Typedef)
            .filter_map(|(alias, typedef)| {
                let target = entities.iter().position(|t| {
                    t.kind.is_aliasable()
                        && t.name == typedef.name
                        && match &typedef.declaration.type_ref {
                            Some(refid) => *refid == t.id,
                            None => typedef
                                .declaration
                                .type_spelling
                                .split_whitespace()
                                .last()
                                == Some(t.name.as_str()),
                        }
                })?;
                Some((alias, target))
            })
            .collect();

        for &(alias, target) in &folds {
            let typedef = self.document.entities[alias].clone();
            let owner = &mut self.document.entities[target];
            owner.declaration.aliases.push(typedef.name.clone());
            if owner.brief.is_empty() {
                owner.brief = typedef.brief;
            }
            if owner.docs.is_empty() {
                owner.docs = typedef.docs;
            }
            if owner.group.is_none() {
                owner.group = typedef.group;
            }
            self.document
                .aliases
                .insert(typedef.id.clone(), owner.id.clone());
            log::debug!("Folded typedef {} into {}", typedef.name, owner.describe());
        }

        let mut removed: Vec<usize> = folds.into_iter().map(|(alias, _)| alias).collect();
        removed.sort_unstable();
        for index in removed.into_iter().rev() {
            self.document.entities.remove(index);
        }
    }
}

/// Id and name of a compound; both are required.
fn identity(c: Element<'_>, kind: &str) -> Result<(String, String)> {
    let id = c.attribute_value("id").unwrap_or_default().to_string();
    let name = child_text(c, "compoundname");
    if id.is_empty() || name.is_empty() {
        return Err(Error::MissingIdentity {
            id,
            kind: kind.to_string(),
        });
    }
    Ok((id, name))
}

fn location(element: Element<'_>) -> Option<String> {
    child(element, "location")
        .and_then(|l| l.attribute_value("file"))
        .map(str::to_string)
}

fn documented(entity: &mut Entity, element: Element<'_>) {
    entity.brief = brief(child(element, "briefdescription"));
    let mut docs = Documentation::default();
    let body = description(child(element, "detaileddescription"), &mut docs);
    docs.description = body;
    entity.docs = docs;
}

fn field(m: Element<'_>) -> Member {
    let mut suffix = child_text(m, "argsstring");
    let bitfield = child_text(m, "bitfield");
    if !bitfield.is_empty() {
        suffix.push_str(" : ");
        suffix.push_str(&bitfield);
    }
    let mut member = Member::field(child_text(m, "type"), child_text(m, "name")).with_suffix(suffix);
    member.id = m.attribute_value("id").map(str::to_string);
    member.brief = brief(child(m, "briefdescription"));
    member.description =
        description(child(m, "detaileddescription"), &mut Documentation::default());
    member
}

/// Group id encoded in a grouped member id (`group__io_1ga...` -> `group__io`).
fn group_from_id(id: &str) -> Option<String> {
    if !id.starts_with("group__") {
        return None;
    }
    id.rfind("_1").map(|end| id[..end].to_string())
}

fn dequote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}
