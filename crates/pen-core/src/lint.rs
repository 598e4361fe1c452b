//! Lint diagnostics for `.pen` documents.
//!
//! Reports structural issues without modifying the document. Conversion
//! never depends on lint: a document with warnings still converts, with
//! broken references rendering as nothing.

use crate::id::NodeId;
use crate::model::{Document, Node, variable_name};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LintSeverity {
    /// Produces visibly incomplete output.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic for a document node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LintDiagnostic {
    /// The node this diagnostic refers to.
    pub node_id: NodeId,
    /// Human-readable message.
    pub message: String,
    /// Severity level.
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "missing-component").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over the document and return diagnostics.
#[must_use]
pub fn lint_document(doc: &Document) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_duplicate_ids(doc, &mut diags);
    lint_missing_components(doc, &mut diags);
    lint_component_cycles(doc, &mut diags);
    lint_undefined_variables(doc, &mut diags);
    diags
}

/// Component dependency graph: an edge `a → b` means component `a`
/// contains a `ref` to component `b`.
pub struct ComponentGraph {
    pub graph: DiGraph<NodeId, ()>,
    index: HashMap<NodeId, NodeIndex>,
}

impl ComponentGraph {
    pub fn build(doc: &Document) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        let components = doc.components();

        for component in &components {
            if let Some(id) = component.id() {
                index
                    .entry(id.clone())
                    .or_insert_with(|| graph.add_node(id.clone()));
            }
        }

        for component in &components {
            let Some(from) = component.id().and_then(|id| index.get(id).copied()) else {
                continue;
            };
            component.walk(&mut |node| {
                if let Node::Ref(r) = node
                    && let Some(&to) = index.get(&r.target)
                    && !graph.contains_edge(from, to)
                {
                    graph.add_edge(from, to, ());
                }
            });
        }

        Self { graph, index }
    }

    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Groups of components that reference each other, directly or
    /// transitively. Self-references form a group of one.
    pub fn cycles(&self) -> Vec<Vec<NodeId>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.iter().any(|&n| self.graph.contains_edge(n, n))
            })
            .map(|scc| scc.into_iter().map(|n| self.graph[n].clone()).collect())
            .collect()
    }
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Node ids must be unique; registry lookups and override paths rely on it.
fn lint_duplicate_ids(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    doc.walk(&mut |node| {
        let Some(id) = node.id() else { return };
        if !seen.insert(id) && reported.insert(id) {
            diags.push(LintDiagnostic {
                node_id: id.clone(),
                message: format!("Node id `{id}` is used more than once."),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    });
}

fn lint_missing_components(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    let components: HashSet<&NodeId> = doc.components().iter().filter_map(|n| n.id()).collect();
    doc.walk(&mut |node| {
        if let Node::Ref(r) = node
            && !components.contains(&r.target)
        {
            diags.push(LintDiagnostic {
                node_id: r.common.id.clone(),
                message: format!(
                    "`{}` references component `{}`, which is not a reusable node in this document.",
                    r.common.id, r.target
                ),
                severity: LintSeverity::Warning,
                rule: "missing-component",
            });
        }
    });
}

fn lint_component_cycles(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    for cycle in ComponentGraph::build(doc).cycles() {
        let names: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
        diags.push(LintDiagnostic {
            node_id: cycle[0].clone(),
            message: format!(
                "Components reference each other in a cycle: {}. Expansion stops at the repeat.",
                names.join(" → ")
            ),
            severity: LintSeverity::Warning,
            rule: "component-cycle",
        });
    }
}

fn lint_undefined_variables(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    doc.walk(&mut |node| {
        let Some(id) = node.id() else { return };
        let Ok(mut value) = serde_json::to_value(node) else {
            return;
        };
        // Children are linted on their own visit.
        if let Value::Object(fields) = &mut value {
            fields.remove("children");
        }
        let mut missing = Vec::new();
        collect_variable_refs(&value, &mut |name| {
            if !doc.has_variable(name) && !missing.contains(&name.to_string()) {
                missing.push(name.to_string());
            }
        });
        for name in missing {
            diags.push(LintDiagnostic {
                node_id: id.clone(),
                message: format!("`{id}` uses `${name}`, which is not declared in `variables`."),
                severity: LintSeverity::Info,
                rule: "undefined-variable",
            });
        }
    });
}

fn collect_variable_refs(value: &Value, found: &mut impl FnMut(&str)) {
    match value {
        Value::String(s) => {
            if let Some(name) = variable_name(s) {
                found(name);
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_variable_refs(v, found)),
        Value::Object(fields) => fields.values().for_each(|v| collect_variable_refs(v, found)),
        _ => {}
    }
}
