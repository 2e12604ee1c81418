use crate::ir::{Group, Node, TreeGraph};
use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;

// Ids end up as SVG element ids and dump keys; the double-underscore
// prefix is reserved for synthesized routing waypoints.
static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*$").unwrap());

#[derive(Debug, Deserialize)]
struct TreeDoc {
    title: Option<String>,
    #[serde(default)]
    nodes: Vec<NodeDoc>,
    #[serde(default)]
    groups: Vec<GroupDoc>,
}

#[derive(Debug, Deserialize)]
struct NodeDoc {
    id: String,
    label: Option<String>,
    column: Option<i32>,
    #[serde(default)]
    parents: Vec<String>,
    offset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct GroupDoc {
    id: String,
    label: Option<String>,
    #[serde(default)]
    members: Vec<String>,
    #[serde(default)]
    parents: Vec<String>,
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub graph: TreeGraph,
    /// Non-fatal document defects (odd-looking ids and the like).
    pub warnings: Vec<String>,
}

/// Parse a YAML tree document. Duplicate ids are hard errors; everything
/// else that can degrade gracefully is left for the layout pass to warn
/// about.
pub fn parse_document(input: &str) -> Result<ParseOutput> {
    let doc: TreeDoc = serde_yaml::from_str(input).context("invalid tree document")?;

    let mut graph = TreeGraph::new();
    graph.title = doc.title;
    let mut warnings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for node in doc.nodes {
        check_id(&node.id, &mut seen, &mut warnings)?;
        graph.add_node(Node {
            label: node.label.unwrap_or_else(|| node.id.clone()),
            id: node.id,
            column: node.column,
            parents: node.parents,
            offset: node.offset,
        });
    }

    for group in doc.groups {
        check_id(&group.id, &mut seen, &mut warnings)?;
        graph.add_group(Group {
            label: group.label.unwrap_or_else(|| group.id.clone()),
            id: group.id,
            members: group.members,
            parents: group.parents,
        });
    }

    Ok(ParseOutput { graph, warnings })
}

fn check_id(id: &str, seen: &mut HashSet<String>, warnings: &mut Vec<String>) -> Result<()> {
    if id.is_empty() {
        bail!("empty id in tree document");
    }
    if !seen.insert(id.to_string()) {
        bail!("duplicate id `{id}` in tree document");
    }
    if !ID_RE.is_match(id) {
        warnings.push(format!(
            "id `{id}` contains characters outside [A-Za-z0-9_-]; downstream anchors may misbehave"
        ));
    }
    Ok(())
}
