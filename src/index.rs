//! Cross-reference index.
//!
//! The index is built once from a complete [`Document`] and is read-only
//! afterwards. It assigns every entity its page target and resolves link
//! targets by extractor id, by qualified name (`Frob::nop`, `group::foo`)
//! and finally by bare name.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::model::{Document, Entity, EntityKind, Example, LinkTarget, Member, MemberKind};

/// Where a page lives and how references to it are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTarget {
    /// Page name without section (`foo`, `frob_struct`)
    pub name: String,

    /// Manual section
    pub section: u8,

    /// Text shown in references to the page
    pub label: String,
}

impl PageTarget {
    /// File name of the page, e.g. `foo.3`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.section)
    }

    /// Reference in `label(section)` form.
    pub fn reference(&self) -> String {
        format!("{}({})", self.label, self.section)
    }
}

/// A successfully resolved link.
#[derive(Debug, Clone, Copy)]
pub enum Resolution<'a> {
    /// The link names an entity with its own page
    Entity {
        entity: &'a Entity,
        page: &'a PageTarget,
    },
    /// The link names a field or enumerator, documented on its owner's page
    Member {
        owner: &'a Entity,
        member: &'a Member,
        page: &'a PageTarget,
    },
    /// The link names an example program
    Example(&'a Example),
}

impl<'a> Resolution<'a> {
    /// The entity whose page documents the target, if any.
    pub fn owner(&self) -> Option<&'a Entity> {
        match *self {
            Resolution::Entity { entity, .. } => Some(entity),
            Resolution::Member { owner, .. } => Some(owner),
            Resolution::Example(_) => None,
        }
    }
}

/// Outcome of a lookup.
#[derive(Debug, Clone, Copy)]
pub enum Lookup<'a> {
    /// Exactly one target matched
    Resolved(Resolution<'a>),
    /// Several targets matched the name; carries the candidate count
    Ambiguous(usize),
    /// Nothing matched
    Unresolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Address {
    Entity(usize),
    Member(usize, usize),
    Example(usize),
}

/// Read-only lookup table from identifiers to page targets.
#[derive(Debug)]
pub struct ReferenceIndex<'d> {
    document: &'d Document,
    section: u8,
    pages: Vec<PageTarget>,
    positions: HashMap<&'d str, usize>,
    by_id: HashMap<&'d str, Address>,
    by_qualified: HashMap<String, Vec<Address>>,
    by_bare: HashMap<&'d str, Vec<Address>>,
    group_members: HashMap<&'d str, Vec<usize>>,
}

impl<'d> ReferenceIndex<'d> {
    /// Build the index for a document.
    ///
    /// Fails when the section is not 1-9, when an entity lacks an id or
    /// name, or when two entities of the same kind claim the same page.
    pub fn build(document: &'d Document, section: u8) -> Result<Self> {
        if !(1..=9).contains(&section) {
            return Err(Error::InvalidSection(section));
        }

        for entity in &document.entities {
            if entity.id.trim().is_empty() || entity.name.trim().is_empty() {
                return Err(Error::MissingIdentity {
                    id: entity.id.clone(),
                    kind: entity.kind.to_string(),
                });
            }
        }

        let pages = assign_pages(document, section)?;

        let mut index = Self {
            document,
            section,
            pages,
            positions: HashMap::new(),
            by_id: HashMap::new(),
            by_qualified: HashMap::new(),
            by_bare: HashMap::new(),
            group_members: HashMap::new(),
        };

        for (position, entity) in document.entities.iter().enumerate() {
            index.positions.entry(entity.id.as_str()).or_insert(position);
        }

        for (position, entity) in document.entities.iter().enumerate() {
            index.register_entity(position, entity);
        }

        for (alias, target) in &document.aliases {
            if let Some(&position) = index.positions.get(target.as_str()) {
                index
                    .by_id
                    .entry(alias.as_str())
                    .or_insert(Address::Entity(position));
            }
        }

        for (position, example) in document.examples.iter().enumerate() {
            index
                .by_id
                .entry(example.id.as_str())
                .or_insert(Address::Example(position));
        }

        log::debug!(
            "Indexed {} entities, {} identifiers",
            document.entities.len(),
            index.by_id.len()
        );

        Ok(index)
    }

    fn register_entity(&mut self, position: usize, entity: &'d Entity) {
        let document = self.document;
        let address = Address::Entity(position);
        self.by_id.entry(entity.id.as_str()).or_insert(address);
        push_unique(
            self.by_qualified.entry(entity.name.clone()).or_default(),
            address,
        );
        push_unique(
            self.by_bare.entry(entity.name.as_str()).or_default(),
            address,
        );

        if entity.kind == EntityKind::Group {
            if let Some(title) = entity.title.as_deref().filter(|t| !t.is_empty()) {
                push_unique(
                    self.by_qualified.entry(title.to_string()).or_default(),
                    address,
                );
            }
        }

        if let Some(group_id) = entity.group.as_deref() {
            self.group_members.entry(group_id).or_default().push(position);
            if let Some(group) = document.entity(group_id) {
                push_unique(
                    self.by_qualified
                        .entry(format!("{}::{}", group.name, entity.name))
                        .or_default(),
                    address,
                );
            }
        }

        for (slot, member) in entity.members.iter().enumerate() {
            if member.kind == MemberKind::Parameter || member.name.is_empty() {
                continue;
            }
            let address = Address::Member(position, slot);
            if let Some(id) = member.id.as_deref() {
                self.by_id.entry(id).or_insert(address);
            }
            push_unique(
                self.by_qualified
                    .entry(format!("{}::{}", entity.name, member.name))
                    .or_default(),
                address,
            );
            push_unique(
                self.by_bare.entry(member.name.as_str()).or_default(),
                address,
            );
        }
    }

    /// The document this index was built from.
    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Manual section used for every page target.
    pub fn section(&self) -> u8 {
        self.section
    }

    /// Page target of an entity.
    pub fn page(&self, entity: &Entity) -> Option<&PageTarget> {
        self.positions
            .get(entity.id.as_str())
            .and_then(|&position| self.pages.get(position))
    }

    /// Page targets in entity order.
    pub fn pages(&self) -> &[PageTarget] {
        &self.pages
    }

    /// Get an entity by extractor id.
    pub fn entity(&self, id: &str) -> Option<&'d Entity> {
        self.positions
            .get(id)
            .map(|&position| &self.document.entities[position])
    }

    /// Entities declared in a group, in document order.
    pub fn group_members(&self, group_id: &str) -> Vec<&'d Entity> {
        self.group_members
            .get(group_id)
            .map(|members| {
                members
                    .iter()
                    .map(|&position| &self.document.entities[position])
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Groups enclosing an entity, innermost first.
    pub fn ancestors(&self, entity: &Entity) -> Vec<&'d Entity> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(entity.id.as_str());
        let mut next = entity.group.as_deref();
        while let Some(group_id) = next {
            let group = match self.entity(group_id) {
                Some(group) => group,
                None => break,
            };
            if !seen.insert(group.id.as_str()) {
                break;
            }
            chain.push(group);
            next = group.group.as_deref();
        }
        chain
    }

    /// Resolve a link target.
    ///
    /// An extractor id wins outright. Otherwise an exact qualified-name
    /// match is preferred over a bare-name match; any name matching more
    /// than one target is ambiguous.
    pub fn resolve(&self, target: &LinkTarget) -> Lookup<'_> {
        if let Some(address) = target
            .refid
            .as_deref()
            .and_then(|refid| self.by_id.get(refid))
        {
            return Lookup::Resolved(self.materialize(*address));
        }

        let name = target.name.trim();
        if name.is_empty() {
            return Lookup::Unresolved;
        }

        if let Some(found) = self.by_qualified.get(name) {
            match found.as_slice() {
                [address] => return Lookup::Resolved(self.materialize(*address)),
                [] => {}
                many => return Lookup::Ambiguous(many.len()),
            }
        }

        let bare = name.rsplit("::").next().unwrap_or(name);
        match self.by_bare.get(bare).map(Vec::as_slice) {
            Some([address]) => Lookup::Resolved(self.materialize(*address)),
            Some([]) | None => Lookup::Unresolved,
            Some(many) => Lookup::Ambiguous(many.len()),
        }
    }

    fn materialize(&self, address: Address) -> Resolution<'_> {
        match address {
            Address::Entity(position) => Resolution::Entity {
                entity: &self.document.entities[position],
                page: &self.pages[position],
            },
            Address::Member(position, slot) => {
                let owner = &self.document.entities[position];
                Resolution::Member {
                    owner,
                    member: &owner.members[slot],
                    page: &self.pages[position],
                }
            }
            Address::Example(position) => Resolution::Example(&self.document.examples[position]),
        }
    }
}

fn push_unique(addresses: &mut Vec<Address>, address: Address) {
    if !addresses.contains(&address) {
        addresses.push(address);
    }
}

/// Base page name of an entity: the lowercased name, without the
/// extension for files.
pub fn base_page_name(entity: &Entity) -> String {
    let name = match entity.kind {
        EntityKind::File => match entity.name.rfind('.') {
            Some(dot) if dot > 0 => &entity.name[..dot],
            _ => entity.name.as_str(),
        },
        _ => entity.name.as_str(),
    };
    name.trim().to_lowercase()
}

/// Assign page targets.
///
/// Entities sharing a base name are ordered by kind precedence; the first
/// keeps the base name and the rest become `<base>_<kind>`. A qualified name
/// that is already in use, including as another entity's base name, gets a
/// numeric suffix (`frob_struct_2`). Only two entities with the same kind and
/// the same spelling are rejected.
fn assign_pages(document: &Document, section: u8) -> Result<Vec<PageTarget>> {
    let mut by_base: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (position, entity) in document.entities.iter().enumerate() {
        by_base
            .entry(base_page_name(entity))
            .or_default()
            .push(position);
    }

    let mut names: Vec<Option<String>> = vec![None; document.entities.len()];
    let mut qualified = vec![false; document.entities.len()];
    let mut taken: HashSet<String> = by_base.keys().cloned().collect();

    for (base, positions) in by_base.iter_mut() {
        positions.sort_by_key(|&p| (document.entities[p].kind, p));

        for (rank, &position) in positions.iter().enumerate() {
            let entity = &document.entities[position];
            if let Some(&earlier) = positions[..rank].iter().find(|&&other| {
                let other = &document.entities[other];
                other.kind == entity.kind && other.name.trim() == entity.name.trim()
            }) {
                return Err(Error::DuplicatePage {
                    page: format!("{}.{}", base, section),
                    first: document.entities[earlier].describe(),
                    second: entity.describe(),
                });
            }
        }

        names[positions[0]] = Some(base.clone());
    }

    for (base, positions) in &by_base {
        for &position in &positions[1..] {
            let candidate = format!("{}_{}", base, document.entities[position].kind.as_str());
            let name = free_name(&taken, candidate);
            taken.insert(name.clone());
            names[position] = Some(name);
            qualified[position] = true;
        }
    }

    let mut pages = Vec::with_capacity(names.len());

    for (position, name) in names.into_iter().enumerate() {
        let entity = &document.entities[position];
        let name = name.unwrap_or_else(|| base_page_name(entity));

        let label = if qualified[position]
            || matches!(entity.kind, EntityKind::File | EntityKind::Group)
        {
            name.clone()
        } else {
            entity.name.clone()
        };

        if qualified[position] {
            log::debug!(
                "Page name for {} qualified as '{}'",
                entity.describe(),
                name
            );
        }

        pages.push(PageTarget {
            name,
            section,
            label,
        });
    }

    Ok(pages)
}

fn free_name(taken: &HashSet<String>, candidate: String) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let name = format!("{}_{}", candidate, n);
        if !taken.contains(&name) {
            return name;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, kind: EntityKind, name: &str) -> Entity {
        Entity::new(id, kind, name)
    }

    #[test]
    fn test_base_page_name() {
        assert_eq!(
            base_page_name(&entity("f", EntityKind::File, "Widget.h")),
            "widget"
        );
        assert_eq!(
            base_page_name(&entity("s", EntityKind::Struct, "Frob")),
            "frob"
        );
    }

    #[test]
    fn test_invalid_section() {
        let doc = Document::new();
        assert!(matches!(
            ReferenceIndex::build(&doc, 0),
            Err(Error::InvalidSection(0))
        ));
        assert!(matches!(
            ReferenceIndex::build(&doc, 10),
            Err(Error::InvalidSection(10))
        ));
    }

    #[test]
    fn test_missing_identity_is_fatal() {
        let doc = Document::new().with_entity(entity("x", EntityKind::Function, ""));
        assert!(matches!(
            ReferenceIndex::build(&doc, 3),
            Err(Error::MissingIdentity { .. })
        ));
    }

    #[test]
    fn test_resolve_by_refid_and_name() {
        let doc = Document::new().with_entity(entity("func_1", EntityKind::Function, "foo"));
        let index = ReferenceIndex::build(&doc, 3).unwrap();

        let by_id = index.resolve(&LinkTarget::with_refid("func_1", "whatever"));
        assert!(matches!(by_id, Lookup::Resolved(Resolution::Entity { .. })));

        let by_name = index.resolve(&LinkTarget::named("foo"));
        match by_name {
            Lookup::Resolved(Resolution::Entity { page, .. }) => {
                assert_eq!(page.reference(), "foo(3)")
            }
            other => panic!("unexpected lookup {:?}", other),
        }

        assert!(matches!(
            index.resolve(&LinkTarget::named("nothing")),
            Lookup::Unresolved
        ));
    }

    #[test]
    fn test_member_resolution() {
        let doc = Document::new().with_entity(
            entity("s", EntityKind::Struct, "Frob")
                .with_member(Member::field("int", "nop").with_id("s_nop")),
        );
        let index = ReferenceIndex::build(&doc, 3).unwrap();

        for target in [
            LinkTarget::named("Frob::nop"),
            LinkTarget::named("nop"),
            LinkTarget::with_refid("s_nop", "nop"),
        ] {
            match index.resolve(&target) {
                Lookup::Resolved(Resolution::Member { owner, member, .. }) => {
                    assert_eq!(owner.name, "Frob");
                    assert_eq!(member.name, "nop");
                }
                other => panic!("unexpected lookup {:?}", other),
            }
        }
    }

    #[test]
    fn test_qualified_match_beats_bare() {
        let doc = Document::new()
            .with_entity(
                entity("a", EntityKind::Struct, "A").with_member(Member::field("int", "len")),
            )
            .with_entity(
                entity("b", EntityKind::Struct, "B").with_member(Member::field("int", "len")),
            );
        let index = ReferenceIndex::build(&doc, 3).unwrap();

        assert!(matches!(
            index.resolve(&LinkTarget::named("len")),
            Lookup::Ambiguous(2)
        ));
        match index.resolve(&LinkTarget::named("B::len")) {
            Lookup::Resolved(Resolution::Member { owner, .. }) => assert_eq!(owner.name, "B"),
            other => panic!("unexpected lookup {:?}", other),
        }
    }

    #[test]
    fn test_group_qualified_name() {
        let doc = Document::new()
            .with_entity(entity("group__io", EntityKind::Group, "io"))
            .with_entity(entity("f", EntityKind::Function, "read_all").with_group("group__io"));
        let index = ReferenceIndex::build(&doc, 3).unwrap();

        for name in ["read_all", "io::read_all"] {
            match index.resolve(&LinkTarget::named(name)) {
                Lookup::Resolved(Resolution::Entity { entity, .. }) => {
                    assert_eq!(entity.id, "f")
                }
                other => panic!("unexpected lookup for {}: {:?}", name, other),
            }
        }
        assert_eq!(index.group_members("group__io").len(), 1);
    }

    #[test]
    fn test_alias_resolves_to_target() {
        let mut doc = Document::new().with_entity(entity("struct_frob", EntityKind::Struct, "Frob"));
        doc.aliases
            .insert("typedef_frob".to_string(), "struct_frob".to_string());
        let index = ReferenceIndex::build(&doc, 3).unwrap();

        match index.resolve(&LinkTarget::with_refid("typedef_frob", "Frob")) {
            Lookup::Resolved(Resolution::Entity { entity, .. }) => {
                assert_eq!(entity.id, "struct_frob")
            }
            other => panic!("unexpected lookup {:?}", other),
        }
    }

    #[test]
    fn test_ancestors_stop_on_cycle() {
        let doc = Document::new()
            .with_entity(entity("g1", EntityKind::Group, "outer").with_group("g2"))
            .with_entity(entity("g2", EntityKind::Group, "inner").with_group("g1"))
            .with_entity(entity("f", EntityKind::Function, "f").with_group("g2"));
        let index = ReferenceIndex::build(&doc, 3).unwrap();
        let f = doc.entity("f").unwrap();
        let names: Vec<_> = index.ancestors(f).iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["inner", "outer"]);
    }
}
