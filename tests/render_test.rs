//! End-to-end rendering tests built through the public model API.

use doxman::model::{Block, Document, Entity, EntityKind, Inline, Member, Table, TableCell, TableRow};
use doxman::{render, ManRenderer, RenderOptions};

fn page_of(doc: &Document, options: &RenderOptions, name: &str) -> String {
    let result = render::to_man_pages(doc, options).expect("render failed");
    result
        .page(name)
        .unwrap_or_else(|| panic!("no page named {}", name))
        .content
        .clone()
}

fn section_names(content: &str) -> Vec<&str> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix(".SH "))
        .collect()
}

#[test]
fn test_struct_fields_listing() {
    let doc = Document::new().with_entity(
        Entity::new("structFrob", EntityKind::Struct, "Frob")
            .with_header("frob.h")
            .with_member(Member::field("const void *", "nop").with_brief("Useless field.")),
    );
    let options = RenderOptions::default().with_composite_fields(true);
    let content = page_of(&doc, &options, "frob");

    let fields = content
        .split(".SH FIELDS\n")
        .nth(1)
        .expect("FIELDS section missing");
    let fields = fields.split("\n.SH ").next().unwrap_or(fields);
    assert_eq!(fields.trim_end(), ".TP\n.BR nop\nUseless field.");
    assert_eq!(fields.matches(".TP").count(), 1);
}

#[test]
fn test_see_also_excludes_self() {
    let doc = Document::new()
        .with_entity(
            Entity::new("foo_8h_1afoo", EntityKind::Function, "foo")
                .with_header("foo.h")
                .with_type("void")
                .with_member(Member::parameter("void", ""))
                .with_description(vec![Block::paragraph(vec![
                    Inline::text("Pairs with "),
                    Inline::link("bar"),
                    Inline::text("."),
                ])]),
        )
        .with_entity(
            Entity::new("foo_8h_1abar", EntityKind::Function, "bar")
                .with_header("foo.h")
                .with_type("void")
                .with_description(vec![Block::paragraph(vec![
                    Inline::text("Undoes "),
                    Inline::link("foo"),
                    Inline::text("."),
                ])]),
        );

    let content = page_of(&doc, &RenderOptions::default(), "foo");
    let see_also = content.split(".SH SEE ALSO\n").nth(1).expect("SEE ALSO missing");
    assert!(see_also.contains(".BR bar (3)"));
    assert!(!see_also.contains("foo (3)"));
    assert!(content.contains(".BI \"void foo(void);\""));

    let content = page_of(&doc, &RenderOptions::default(), "bar");
    assert!(content.contains(".SH SEE ALSO\n.BR foo (3)\n"));
}

#[test]
fn test_punctuation_stays_after_link() {
    let doc = Document::new()
        .with_entity(
            Entity::new("f1", EntityKind::Function, "frob")
                .with_header("frob.h")
                .with_description(vec![Block::paragraph(vec![
                    Inline::text("a period after a link to "),
                    Inline::link("foobar"),
                    Inline::text("."),
                ])]),
        )
        .with_entity(Entity::new("f2", EntityKind::Function, "foobar").with_header("frob.h"));

    let content = page_of(&doc, &RenderOptions::default(), "frob");
    assert!(content.contains("\na period after a link to \\f[B]foobar\\f[R](3).\n"));
    assert!(!content.lines().any(|line| line == "."));
}

#[test]
fn test_table_cells_escaped_without_drift() {
    let mut table = Table::new();
    table.add_row(TableRow::from_strings(["a|b", "c;d", "say \"hi\""]));
    table.add_row(TableRow::from_strings(["|", ";", "\""]));

    let doc = Document::new().with_entity(
        Entity::new("f1", EntityKind::Function, "frob")
            .with_header("frob.h")
            .with_description(vec![Block::Table { table }]),
    );
    let result = render::to_man_pages(&doc, &RenderOptions::default()).unwrap();
    assert!(!result.has_warnings());
    let content = &result.pages[0].content;

    let start = content.find(".TS\n").expect("table missing");
    let end = content.find(".TE").expect("table end missing");
    let table = &content[start..end];

    assert!(table.contains("allbox tab(|);\nl l l.\n"));
    assert_eq!(table.matches("T{").count(), 6);
    assert_eq!(table.matches("T}|T{").count(), 4);
    assert!(table.contains("\na\\[ba]b\n"));
    assert!(table.contains("\nc\\[char59]d\n"));
    assert!(table.contains("\nsay \\[dq]hi\\[dq]\n"));
    assert!(table.contains("\n\\[ba]\nT}|T{\n\\[char59]\nT}|T{\n\\[dq]\nT}\n"));
    assert_eq!(result.stats.table_count, 1);
}

#[test]
fn test_empty_enum_has_name_and_synopsis_only() {
    let doc = Document::new().with_entity(
        Entity::new("enumnothing", EntityKind::Enum, "nothing").with_header("nothing.h"),
    );
    let content = page_of(&doc, &RenderOptions::default(), "nothing");

    assert_eq!(section_names(&content), vec!["NAME", "SYNOPSIS"]);
    assert!(content.contains(".B enum nothing {\n.B };\n.fi\n"));
    assert!(!content.to_lowercase().contains("no members"));
}

#[test]
fn test_rendering_is_deterministic() {
    let mut doc = Document::new();
    for n in 0..20 {
        doc.add_entity(
            Entity::new(format!("f{}", n), EntityKind::Function, format!("fn_{}", n))
                .with_header("many.h")
                .with_type("int")
                .with_brief("Does a thing. Then another, e.g. this.")
                .with_description(vec![Block::paragraph(vec![
                    Inline::link(format!("fn_{}", (n + 1) % 20)),
                    Inline::text(" and "),
                    Inline::link(format!("fn_{}", (n + 7) % 20)),
                ])]),
        );
    }

    let first = ManRenderer::new(RenderOptions::default()).render(&doc).unwrap();
    let second = ManRenderer::new(RenderOptions::default()).render(&doc).unwrap();
    let parallel = ManRenderer::new(RenderOptions::default().with_parallel(true))
        .render(&doc)
        .unwrap();

    assert_eq!(first.pages, second.pages);
    assert_eq!(first.pages, parallel.pages);
    assert_eq!(first.stats, parallel.stats);
}

#[test]
fn test_text_lines_never_start_with_control_characters() {
    let doc = Document::new().with_entity(
        Entity::new("f1", EntityKind::Function, "frob")
            .with_header("frob.h")
            .with_brief("Frobs.")
            .with_description(vec![
                Block::text(".hidden request? 'quoted too. .again"),
                Block::code(None, ".not a macro\n'nor this"),
            ]),
    );
    let content = page_of(&doc, &RenderOptions::default(), "frob");

    assert!(content.contains("\n\\[char46]hidden request?\n"));
    assert!(content.contains("\n\\[char39]quoted too.\n"));
    assert!(content.contains("\n\\[char46]again\n"));
    assert!(content.contains("\n\\[char46]not a macro\n\\[char39]nor this\n"));

    let requests = [
        "TH", "SH", "SS", "PP", "TP", "IP", "RS", "RE", "B", "BI", "BR", "nf", "fi", "in", "EX",
        "EE", "TS", "TE", "T&", "UR", "UE", "br",
    ];
    for line in content.lines().filter(|l| l.starts_with('.')) {
        let name = line[1..].split(' ').next().unwrap_or_default();
        assert!(requests.contains(&name), "unexpected request line {:?}", line);
    }
}

#[test]
fn test_backslashes_are_escaped() {
    let doc = Document::new().with_entity(
        Entity::new("f1", EntityKind::Function, "frob")
            .with_header("frob.h")
            .with_description(vec![Block::text("Use C:\\temp as the path.")]),
    );
    let content = page_of(&doc, &RenderOptions::default(), "frob");
    assert!(content.contains("Use C:\\etemp as the path."));
}

#[test]
fn test_file_page_overview() {
    let mut file = Entity::new("frob_8h", EntityKind::File, "frob.h")
        .with_header("frob.h")
        .with_brief("Frobnication API.");
    file.contents = vec!["f1".to_string(), "structfrob_state".to_string()];

    let doc = Document::new()
        .with_entity(file)
        .with_entity(
            Entity::new("f1", EntityKind::Function, "frob_run")
                .with_header("frob.h")
                .with_brief("Run the frobnicator."),
        )
        .with_entity(
            Entity::new("structfrob_state", EntityKind::Struct, "frob_state")
                .with_header("frob.h")
                .with_brief("Frobnicator state."),
        );

    let content = page_of(&doc, &RenderOptions::default(), "frob");
    assert!(content.contains(".SH SYNOPSIS\n.nf\n.B #include <frob.h>\n.fi\n"));
    assert!(content.contains(
        ".TS\ntab(;);\nl l.\n\\f[B]Functions\\f[R];\\f[B]Description\\f[R]\n_\n\\f[B]frob_run\\f[R](3);T{\nRun the frobnicator.\nT}\n.T&\nl l.\n\\f[B]Structures\\f[R];\\f[B]Description\\f[R]\n_\n\\f[B]frob_state\\f[R](3);T{\nFrobnicator state.\nT}\n.TE"
    ));
}

#[test]
fn test_title_and_boilerplate() {
    let doc = Document::new().with_entity(
        Entity::new("f1", EntityKind::Function, "frob").with_header("frob.h"),
    );
    let options = RenderOptions::default()
        .with_section(7)
        .with_header_middle("Frob Manual")
        .with_preamble(".\\\" Generated file")
        .with_library("libfrob, -lfrob");
    let result = render::to_man_pages(&doc, &options).unwrap();
    let page = &result.pages[0];

    assert_eq!(page.file_name(), "frob.7");
    assert!(page.content.starts_with(
        ".\\\" Generated file\n.TH \"FROB\" \"7\" \"\" \"\" \"Frob Manual\"\n.SH NAME\nfrob\n.SH LIBRARY\nlibfrob, -lfrob\n"
    ));
    assert!(page.content.ends_with('\n'));
}

#[test]
fn test_unresolved_references_reported() {
    let doc = Document::new().with_entity(
        Entity::new("f1", EntityKind::Function, "frob")
            .with_header("frob.h")
            .with_description(vec![Block::paragraph(vec![
                Inline::text("See "),
                Inline::link("nowhere"),
                Inline::text("."),
            ])]),
    );
    let result = render::to_man_pages(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(
        result.warnings[0].to_string(),
        "frob.3: unresolved reference to 'nowhere'"
    );
    assert!(result.pages[0].content.contains("\nSee nowhere.\n"));
    assert!(!result.pages[0].content.contains("SEE ALSO"));
}

#[test]
fn test_font_switches_balance_across_nesting() {
    use doxman::model::Style;

    let doc = Document::new()
        .with_entity(
            Entity::new("f1", EntityKind::Function, "frob")
                .with_header("frob.h")
                .with_member(Member::parameter("int", "count"))
                .with_description(vec![Block::paragraph(vec![
                    Inline::styled(
                        Style::Bold,
                        vec![
                            Inline::text("Calls "),
                            Inline::link("bar"),
                            Inline::text(" with "),
                            Inline::italic("care"),
                            Inline::text("."),
                        ],
                    ),
                    Inline::text(" Then "),
                    Inline::code("count"),
                    Inline::text(" and "),
                    Inline::styled(Style::Code, vec![Inline::text("x = "), Inline::link("widget")]),
                    Inline::text(" or "),
                    Inline::styled(Style::Italic, vec![Inline::code("count")]),
                    Inline::text("."),
                ])]),
        )
        .with_entity(Entity::new("f2", EntityKind::Function, "bar").with_header("frob.h"))
        .with_entity(Entity::new("s1", EntityKind::Struct, "widget").with_header("frob.h"));

    let options = RenderOptions::default().with_preserve_styles(true);
    let content = page_of(&doc, &options, "frob");

    // every switch either opens a font or restores the one before it
    let mut stack = vec!["R".to_string()];
    let (mut opened, mut restored) = (0, 0);
    for piece in content.split("\\f[").skip(1) {
        let font = piece.split(']').next().unwrap_or_default().to_string();
        if stack.len() >= 2 && stack[stack.len() - 2] == font {
            stack.pop();
            restored += 1;
        } else {
            stack.push(font);
            opened += 1;
        }
    }
    assert!(opened >= 6, "expected nested switches in {:?}", content);
    assert_eq!(opened, restored);
    assert_eq!(stack, vec!["R"]);
}
