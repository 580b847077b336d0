//! Page naming and cross-reference resolution tests.

use doxman::index::{Lookup, Resolution};
use doxman::model::{Block, Document, Entity, EntityKind, Inline, LinkTarget, Member};
use doxman::{render, Error, ReferenceIndex, RenderOptions};

fn colliding() -> Document {
    let mut file = Entity::new("frob_8h", EntityKind::File, "frob.h").with_header("frob.h");
    file.contents = vec!["structfrob".to_string(), "frob_8h_1a1".to_string()];

    Document::new()
        .with_entity(file)
        .with_entity(
            Entity::new("structfrob", EntityKind::Struct, "frob")
                .with_header("frob.h")
                .with_brief("Frob state.")
                .with_member(Member::field("int", "level").with_id("structfrob_1alevel")),
        )
        .with_entity(
            Entity::new("frob_8h_1a1", EntityKind::Function, "frob")
                .with_header("frob.h")
                .with_type("int")
                .with_brief("Frobnicate.")
                .with_description(vec![Block::paragraph(vec![
                    Inline::text("Updates "),
                    Inline::link_with_text(LinkTarget::with_refid("structfrob", "frob"), "frob"),
                    Inline::text("."),
                ])]),
        )
}

#[test]
fn test_collisions_get_kind_qualified_names() {
    let doc = colliding();
    let index = ReferenceIndex::build(&doc, 3).unwrap();
    let names: Vec<&str> = index.pages().iter().map(|p| p.name.as_str()).collect();

    // function beats struct beats file
    assert_eq!(names, vec!["frob_file", "frob_struct", "frob"]);

    let struct_page = index.page(&doc.entities[1]).unwrap();
    assert_eq!(struct_page.label, "frob_struct");
    assert_eq!(struct_page.reference(), "frob_struct(3)");

    let function_page = index.page(&doc.entities[2]).unwrap();
    assert_eq!(function_page.label, "frob");
    assert_eq!(function_page.file_name(), "frob.3");
}

#[test]
fn test_references_name_qualified_pages() {
    let doc = colliding();
    let result = render::to_man_pages(&doc, &RenderOptions::default()).unwrap();

    let names: Vec<String> = result.pages.iter().map(|p| p.file_name()).collect();
    assert_eq!(names, vec!["frob_file.3", "frob_struct.3", "frob.3"]);

    let function = result.page("frob").unwrap();
    assert!(function.content.contains("\nUpdates \\f[B]frob_struct\\f[R](3).\n"));
    assert!(function.content.contains(".SH SEE ALSO\n.BR frob_struct (3)\n"));
}

#[test]
fn test_qualified_name_skips_names_already_in_use() {
    let doc = Document::new()
        .with_entity(Entity::new("f1", EntityKind::Function, "frob").with_header("frob.h"))
        .with_entity(Entity::new("s1", EntityKind::Struct, "frob").with_header("frob.h"))
        .with_entity(Entity::new("f2", EntityKind::Function, "frob_struct").with_header("frob.h"));

    let index = ReferenceIndex::build(&doc, 3).unwrap();
    let names: Vec<&str> = index.pages().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["frob", "frob_struct_2", "frob_struct"]);

    let struct_page = index.page(&doc.entities[1]).unwrap();
    assert_eq!(struct_page.reference(), "frob_struct_2(3)");

    let result = render::to_man_pages(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(result.pages.len(), 3);
}

#[test]
fn test_same_kind_case_variants_are_qualified() {
    let doc = Document::new()
        .with_entity(Entity::new("s1", EntityKind::Struct, "Frob"))
        .with_entity(Entity::new("s2", EntityKind::Struct, "frob"))
        .with_entity(Entity::new("f1", EntityKind::Function, "frob"));

    let index = ReferenceIndex::build(&doc, 3).unwrap();
    let names: Vec<&str> = index.pages().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["frob_struct", "frob_struct_2", "frob"]);
}

#[test]
fn test_identical_same_kind_entities_are_fatal() {
    let doc = Document::new()
        .with_entity(Entity::new("a_8h_1a1", EntityKind::Function, "frob"))
        .with_entity(Entity::new("b_8h_1a1", EntityKind::Function, "frob"));

    match ReferenceIndex::build(&doc, 3) {
        Err(Error::DuplicatePage { page, .. }) => assert_eq!(page, "frob.3"),
        other => panic!("expected duplicate page error, got {:?}", other.map(|_| ())),
    }
    assert!(render::to_man_pages(&doc, &RenderOptions::default()).is_err());
}

#[test]
fn test_missing_identity_is_fatal() {
    let doc = Document::new().with_entity(Entity::new("", EntityKind::Function, "frob"));
    assert!(matches!(
        ReferenceIndex::build(&doc, 3),
        Err(Error::MissingIdentity { .. })
    ));
}

#[test]
fn test_invalid_section() {
    let doc = colliding();
    assert!(matches!(
        ReferenceIndex::build(&doc, 10),
        Err(Error::InvalidSection(10))
    ));
}

#[test]
fn test_resolution_by_id_qualified_and_bare_name() {
    let doc = colliding();
    let index = ReferenceIndex::build(&doc, 3).unwrap();

    match index.resolve(&LinkTarget::with_refid("structfrob", "")) {
        Lookup::Resolved(Resolution::Entity { entity, .. }) => assert_eq!(entity.kind, EntityKind::Struct),
        other => panic!("unexpected lookup {:?}", other),
    }

    match index.resolve(&LinkTarget::named("frob::level")) {
        Lookup::Resolved(Resolution::Member { owner, member, .. }) => {
            assert_eq!(owner.id, "structfrob");
            assert_eq!(member.name, "level");
        }
        other => panic!("unexpected lookup {:?}", other),
    }

    match index.resolve(&LinkTarget::named("level")) {
        Lookup::Resolved(resolution) => {
            assert_eq!(resolution.owner().map(|e| e.id.as_str()), Some("structfrob"));
        }
        other => panic!("unexpected lookup {:?}", other),
    }

    assert!(matches!(
        index.resolve(&LinkTarget::named("frob")),
        Lookup::Ambiguous(2)
    ));
    assert!(matches!(
        index.resolve(&LinkTarget::named("nothing")),
        Lookup::Unresolved
    ));
}

#[test]
fn test_ambiguous_reference_warns() {
    let doc = Document::new()
        .with_entity(
            Entity::new("f1", EntityKind::Function, "user")
                .with_header("u.h")
                .with_description(vec![Block::paragraph(vec![
                    Inline::text("See "),
                    Inline::link("frob"),
                    Inline::text("."),
                ])]),
        )
        .with_entity(Entity::new("f2", EntityKind::Function, "frob").with_header("u.h"))
        .with_entity(Entity::new("s1", EntityKind::Struct, "frob").with_header("u.h"));

    let result = render::to_man_pages(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].page(), "user.3");
    assert!(result.page("user").unwrap().content.contains("\nSee frob.\n"));
}

#[test]
fn test_group_members_and_ancestors() {
    let mut outer = Entity::new("group__outer", EntityKind::Group, "outer");
    outer.title = Some("Outer group".to_string());
    let inner = Entity::new("group__inner", EntityKind::Group, "inner").with_group("group__outer");
    let doc = Document::new()
        .with_entity(outer)
        .with_entity(inner)
        .with_entity(
            Entity::new("f1", EntityKind::Function, "one")
                .with_header("g.h")
                .with_group("group__inner"),
        )
        .with_entity(
            Entity::new("f2", EntityKind::Function, "two")
                .with_header("g.h")
                .with_group("group__inner"),
        );
    let index = ReferenceIndex::build(&doc, 3).unwrap();

    let members: Vec<&str> = index
        .group_members("group__inner")
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(members, vec!["one", "two"]);

    let ancestors: Vec<&str> = index
        .ancestors(&doc.entities[2])
        .iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ancestors, vec!["group__inner", "group__outer"]);

    match index.resolve(&LinkTarget::named("Outer group")) {
        Lookup::Resolved(Resolution::Entity { entity, .. }) => assert_eq!(entity.id, "group__outer"),
        other => panic!("unexpected lookup {:?}", other),
    }
    match index.resolve(&LinkTarget::named("inner::two")) {
        Lookup::Resolved(Resolution::Entity { entity, .. }) => assert_eq!(entity.id, "f2"),
        other => panic!("unexpected lookup {:?}", other),
    }
}
