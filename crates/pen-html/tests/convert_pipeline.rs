//! Integration tests: `.pen` JSON → Document → `{ html, css }`.
//!
//! Exercises the full `pen-html` pipeline against fixture documents.

use pen_html::pen_core::Document;
use pen_html::{ConvertConfig, ConvertError, convert_document, convert_document_with, convert_file, convert_str};
use pretty_assertions::assert_eq;

fn fixture_path(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

fn parse(input: &str) -> Document {
    Document::from_json(input).expect("fixture should parse")
}

// ─── Escaping ───────────────────────────────────────────────────────────

#[test]
fn text_content_is_escaped() {
    let c = convert_str(include_str!("fixtures/untrusted.pen")).unwrap();
    assert!(
        c.html
            .contains("<p class=\"pen-t\">&lt;script&gt;x&lt;/script&gt;</p>"),
        "{}",
        c.html
    );
    assert!(!c.html.contains("<script>"));
    assert!(!c.html.contains("<b>"));
}

#[test]
fn styled_runs_are_escaped_spans() {
    let c = convert_str(include_str!("fixtures/untrusted.pen")).unwrap();
    assert!(
        c.html.contains(
            "<p class=\"pen-runs\"><span>Tom &amp; Jerry </span>\
             <span class=\"pen-runs-run-1\">&lt;b&gt;bold&lt;/b&gt;</span></p>"
        ),
        "{}",
        c.html
    );
}

// ─── Shapes ─────────────────────────────────────────────────────────────

#[test]
fn rectangle_gets_fill_and_border() {
    let c = convert_str(include_str!("fixtures/untrusted.pen")).unwrap();
    assert!(c.html.contains("<div class=\"pen-box\"></div>"));
    assert!(
        c.css.contains(
            ".pen-box {\n  background-color: #FF0000;\n  border: 1px solid #000000;\n  \
             width: 100px;\n  height: 50px;\n}\n"
        ),
        "{}",
        c.css
    );
}

// ─── Components ─────────────────────────────────────────────────────────

#[test]
fn nested_override_reaches_leaf_through_two_refs() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(c.html.contains("© 2026 Pen"), "{}", c.html);
    assert!(!c.html.contains("© Default"), "{}", c.html);
    assert!(
        c.html.contains(
            "<footer class=\"pen-footer\"><div class=\"pen-footer-left\">\
             <p class=\"pen-footer-copyright\">© 2026 Pen</p></div>"
        ),
        "{}",
        c.html
    );
}

#[test]
fn reusable_components_only_render_through_refs() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(c.html.starts_with("<main class=\"pen-page\">"), "{}", c.html);
    assert!(!c.html.contains("pen-site-footer"));
    assert!(!c.html.contains("pen-copyright-block"));
    assert!(!c.css.contains(".pen-site-footer"));
}

#[test]
fn disabled_subtree_is_pruned() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(!c.html.contains("Secret draft"));
    assert!(!c.html.contains("draft-"));
    assert!(!c.css.contains("draft-"));
    assert!(!c.css.contains("#FFCC00"));
}

#[test]
fn heading_tag_and_variable_styles() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(c.html.contains("<h1 class=\"pen-hero-title\">Welcome</h1>"));
    assert!(
        c.css.contains(
            ".pen-hero-title {\n  font-family: var(--font-heading);\n  font-size: 32px;\n  \
             font-weight: 700;\n  color: var(--brand);\n}\n"
        ),
        "{}",
        c.css
    );
}

#[test]
fn sibling_instances_do_not_share_overrides() {
    let c = convert_document(&parse(include_str!("fixtures/cards.pen")));
    assert_eq!(
        c.html,
        "<div class=\"pen-grid\">\
         <div class=\"pen-card-a\"><p class=\"pen-card-title\">First</p></div>\
         <div class=\"pen-card-b\"><p class=\"pen-card-title\">Card title</p></div>\
         <div class=\"pen-card-c\"><p class=\"pen-card-title\">Card title</p></div>\
         </div>"
    );
    assert!(c.css.contains(".pen-card-title {\n  font-size: 18px;\n}\n"), "{}", c.css);
    assert!(
        c.css
            .contains(".pen-card-c .pen-card-title {\n  font-size: 18px;\n  color: #FF0000;\n}\n"),
        "{}",
        c.css
    );
    assert_eq!(c.css.matches(".pen-card-title {").count(), 1);
}

fn plain_rule_count(css: &str, selector: &str) -> usize {
    css.lines().filter(|line| *line == format!("{selector} {{")).count()
}

#[test]
fn instance_markup_follows_its_own_overrides() {
    let c = convert_document(&parse(include_str!("fixtures/instances.pen")));
    assert_eq!(
        c.html,
        "<div class=\"pen-shelf\">\
         <div class=\"pen-badge-a\"><p class=\"pen-badge-label\">New</p><div class=\"pen-badge-dot\"></div></div>\
         <div class=\"pen-badge-b\"><p class=\"pen-badge-label\">New</p><div class=\"pen-badge-dot\"></div></div>\
         <div class=\"pen-badge-c\"><div class=\"pen-badge-dot\"></div></div>\
         <div class=\"pen-panel-1\"><div class=\"pen-panel-badge\">\
         <p class=\"pen-badge-label\">Deep</p><div class=\"pen-badge-dot\"></div></div></div>\
         <div class=\"pen-panel-2\"><div class=\"pen-panel-badge\">\
         <p class=\"pen-badge-label\">New</p><div class=\"pen-badge-dot\"></div></div></div>\
         </div>"
    );
}

#[test]
fn disabled_component_children_never_render() {
    let c = convert_document(&parse(include_str!("fixtures/instances.pen")));
    assert!(!c.html.contains("Hidden note"), "{}", c.html);
    assert!(!c.html.contains("badge-note"), "{}", c.html);
    assert!(!c.css.contains("badge-note"), "{}", c.css);
    assert!(!c.css.contains("#ABCDEF"), "{}", c.css);
}

#[test]
fn first_instance_override_does_not_reach_later_instances() {
    let c = convert_document(&parse(include_str!("fixtures/instances.pen")));
    // badge-a comes first and owns the plain rule; badge-b is put back.
    assert!(c.css.contains(".pen-badge-label {\n  color: #FF0000;\n}\n"), "{}", c.css);
    assert!(
        c.css.contains(".pen-badge-b .pen-badge-label {\n  color: #000000;\n}\n"),
        "{}",
        c.css
    );
    assert_eq!(plain_rule_count(&c.css, ".pen-badge-label"), 1, "{}", c.css);
}

#[test]
fn override_of_an_unstyled_node_is_scoped() {
    let c = convert_document(&parse(include_str!("fixtures/instances.pen")));
    assert!(
        c.css.contains(".pen-badge-c .pen-badge-dot {\n  background-color: #00FF00;\n}\n"),
        "{}",
        c.css
    );
    assert_eq!(plain_rule_count(&c.css, ".pen-badge-dot"), 0, "{}", c.css);
}

#[test]
fn nested_ref_overrides_are_scoped_by_the_outer_instance() {
    let c = convert_document(&parse(include_str!("fixtures/instances.pen")));
    assert!(
        c.css.contains(".pen-panel-1 .pen-panel-badge .pen-badge-label {\n  color: #0000FF;\n}\n"),
        "{}",
        c.css
    );
    assert!(
        c.css.contains(".pen-panel-2 .pen-panel-badge .pen-badge-label {\n  color: #000000;\n}\n"),
        "{}",
        c.css
    );
    assert_eq!(plain_rule_count(&c.css, ".pen-panel-badge .pen-badge-label"), 0, "{}", c.css);
}

#[test]
fn repeated_conversion_is_identical() {
    let doc = parse(include_str!("fixtures/cards.pen"));
    assert_eq!(convert_document(&doc), convert_document(&doc));
}

// ─── Termination ────────────────────────────────────────────────────────

#[test]
fn cyclic_refs_terminate_with_markers() {
    let c = convert_document(&parse(include_str!("fixtures/cycles.pen")));
    assert_eq!(
        c.html,
        "<div class=\"pen-ping-1\"><div class=\"pen-ping-pong\">\
         <!-- cyclic ref pong-ping -&gt; ping --></div></div>\n\
         <div class=\"pen-self-1\"><!-- cyclic ref self-again -&gt; self-loop --></div>"
    );
}

#[test]
fn cycle_markers_can_be_disabled() {
    let config = ConvertConfig {
        cycle_comments: false,
        ..ConvertConfig::default()
    };
    let c = convert_document_with(&parse(include_str!("fixtures/cycles.pen")), &config);
    assert_eq!(
        c.html,
        "<div class=\"pen-ping-1\"><div class=\"pen-ping-pong\"></div></div>\n\
         <div class=\"pen-self-1\"></div>"
    );
}

#[test]
fn depth_limit_cuts_long_chains() {
    let doc = parse(
        r#"{ "children": [
            { "type": "frame", "id": "level-a", "reusable": true,
              "children": [{ "type": "ref", "id": "to-b", "ref": "level-b" }] },
            { "type": "frame", "id": "level-b", "reusable": true,
              "children": [{ "type": "ref", "id": "to-c", "ref": "level-c" }] },
            { "type": "frame", "id": "level-c", "reusable": true,
              "children": [{ "type": "text", "id": "deepest", "content": "bottom" }] },
            { "type": "ref", "id": "chain", "ref": "level-a" }
        ] }"#,
    );
    assert!(convert_document(&doc).html.contains("bottom"));

    let shallow = ConvertConfig {
        max_ref_depth: 2,
        ..ConvertConfig::default()
    };
    let c = convert_document_with(&doc, &shallow);
    assert!(!c.html.contains("bottom"), "{}", c.html);
    assert!(c.html.contains("<!-- ref depth limit at to-c -->"), "{}", c.html);
}

// ─── CSS assembly ───────────────────────────────────────────────────────

#[test]
fn imports_then_single_root_block() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(
        c.css.starts_with(
            "@import url(\"https://fonts.googleapis.com/css2?family=Material+Symbols+Outlined\");\n\
             :root {\n  --brand: #0A84FF;\n  --font-heading: Inter;\n  --space-m: 16px;\n}\n"
        ),
        "{}",
        c.css
    );
    assert_eq!(c.css.matches("@import").count(), 1);
    assert_eq!(c.css.matches(":root").count(), 1);
}

#[test]
fn icon_family_is_imported_once() {
    let c = convert_document(&parse(include_str!("fixtures/landing.pen")));
    assert!(c.html.contains(
        "<span class=\"material-symbols-outlined pen-hero-icon\" aria-hidden=\"true\">home</span>"
    ));
    assert!(c.html.contains(
        "<span class=\"material-symbols-outlined pen-footer-icon\" aria-hidden=\"true\">favorite</span>"
    ));
    assert_eq!(c.css.matches("Material+Symbols+Outlined").count(), 1);
}

// ─── Errors ─────────────────────────────────────────────────────────────

#[test]
fn file_entry_point_matches_in_memory() {
    let from_file = convert_file(fixture_path("landing.pen")).unwrap();
    let in_memory = convert_str(include_str!("fixtures/landing.pen")).unwrap();
    assert_eq!(from_file, in_memory);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = convert_file(fixture_path("does-not-exist.pen")).unwrap_err();
    assert!(matches!(err, ConvertError::Io { .. }), "{err:?}");
    assert!(err.to_string().contains("does-not-exist.pen"));
}

#[test]
fn malformed_files_are_parse_errors() {
    for name in ["broken.pen", "no_children.pen"] {
        let err = convert_file(fixture_path(name)).unwrap_err();
        assert!(matches!(err, ConvertError::Parse { .. }), "{name}: {err:?}");
    }
    assert!(matches!(
        convert_str("[1, 2, 3]"),
        Err(ConvertError::Json(_))
    ));
}

// ─── Concurrency ────────────────────────────────────────────────────────

#[test]
fn independent_conversions_run_in_parallel() {
    let doc = parse(include_str!("fixtures/cards.pen"));
    let expected = convert_document(&doc);
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| convert_document(&doc))).collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
