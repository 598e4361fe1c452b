//! Integration tests: `.pen` JSON → Document → lint diagnostics.

use pen_core::{ComponentGraph, Document, LintSeverity, Node, lint_document};
use pretty_assertions::assert_eq;

fn design_system() -> Document {
    Document::from_json(include_str!("fixtures/design_system.pen")).expect("fixture should parse")
}

// ─── Parsing ────────────────────────────────────────────────────────────

#[test]
fn components_are_collected_in_document_order() {
    let doc = design_system();
    let ids: Vec<&str> = doc
        .components()
        .iter()
        .filter_map(|n| n.id())
        .map(|id| id.as_str())
        .collect();
    assert_eq!(ids, vec!["button", "toolbar", "menu"]);
}

#[test]
fn walk_visits_every_node_without_following_refs() {
    let doc = design_system();
    let mut kinds = Vec::new();
    doc.walk(&mut |node: &Node| kinds.push(node.kind_name()));
    assert_eq!(kinds.len(), 11);
    assert_eq!(kinds.iter().filter(|k| **k == "ref").count(), 5);
}

// ─── Component graph ────────────────────────────────────────────────────

#[test]
fn graph_has_one_edge_per_component_reference() {
    let graph = ComponentGraph::build(&design_system());
    assert_eq!(graph.graph.node_count(), 3);
    assert_eq!(graph.graph.edge_count(), 3);
    let toolbar = graph.index_of("toolbar").unwrap();
    let button = graph.index_of("button").unwrap();
    assert!(graph.graph.contains_edge(toolbar, button));
}

#[test]
fn mutual_references_form_one_cycle() {
    let cycles = ComponentGraph::build(&design_system()).cycles();
    assert_eq!(cycles.len(), 1);
    let mut members: Vec<&str> = cycles[0].iter().map(|id| id.as_str()).collect();
    members.sort_unstable();
    assert_eq!(members, vec!["menu", "toolbar"]);
}

// ─── Lint ───────────────────────────────────────────────────────────────

#[test]
fn lint_reports_each_rule_once() {
    let diags = lint_document(&design_system());
    let rules: Vec<(&str, &str)> = diags
        .iter()
        .map(|d| (d.rule, d.node_id.as_str()))
        .collect();
    assert_eq!(
        rules,
        vec![
            ("duplicate-id", "page"),
            ("missing-component", "page-banner"),
            ("component-cycle", rules[2].1),
            ("undefined-variable", "button-label"),
        ]
    );
    assert!(diags[3].message.contains("$on-primary"));
    assert_eq!(diags[3].severity, LintSeverity::Info);
}
