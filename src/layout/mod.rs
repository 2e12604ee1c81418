mod columns;
mod groups;
mod heights;
mod position;
mod routing;
mod types;
mod waypoints;

pub use types::{EdgeLayout, GroupLayout, LayoutError, LayoutWarning, NodeKind, NodeLayout};

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::LayoutConfig;
use crate::ir::TreeGraph;

use types::{Item, ItemKind, Membership, StructEdge};
use waypoints::Synthesis;

/// The finished layout: every box, every group container, every routed
/// edge, plus the warnings gathered while degrading around input defects.
/// A pure function of the document and config: the input is never
/// touched, and identical input yields identical output.
#[derive(Debug, Clone)]
pub struct Layout {
    pub title: Option<String>,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub groups: Vec<GroupLayout>,
    pub edges: Vec<EdgeLayout>,
    pub warnings: Vec<LayoutWarning>,
    pub width: f32,
    pub height: f32,
}

/// Run the whole pipeline: columns, group membership, waypoint synthesis,
/// subtree heights (right-to-left), vertical placement with the collision
/// sweep (left-to-right), then orthogonal edge routing.
pub fn compute_layout(graph: &TreeGraph, config: &LayoutConfig) -> Result<Layout, LayoutError> {
    let mut warnings = Vec::new();

    let membership = groups::resolve_membership(graph, &mut warnings);
    let columns = columns::resolve_columns(graph, &membership, &mut warnings)?;
    let edges = structural_edges(graph, &membership, &columns, &mut warnings);
    let synthesis = waypoints::synthesize(&edges, &visible_rows(graph, &membership, &columns));
    let items = build_items(graph, &membership, &columns, &edges, &synthesis);

    let heights = heights::compute_heights(&items, &membership, config);
    let centers = position::assign_centers(&items, &heights, &membership, config);

    let pitch = config.box_width + config.column_gap;
    let mut nodes = BTreeMap::new();
    for item in &items {
        if item.kind == ItemKind::Group {
            continue;
        }
        let center_y = centers.get(&item.id).copied().unwrap_or(0.0);
        nodes.insert(
            item.id.clone(),
            NodeLayout {
                id: item.id.clone(),
                label: item.label.clone(),
                kind: if item.kind == ItemKind::Waypoint {
                    NodeKind::Waypoint
                } else {
                    NodeKind::Entity
                },
                column: item.column,
                x: item.column as f32 * pitch,
                y: center_y - config.box_height / 2.0,
                width: config.box_width,
                height: config.box_height,
                center_y,
            },
        );
    }

    let mut group_layouts = Vec::new();
    for group in &graph.groups {
        if membership.skipped.contains(&group.id) {
            continue;
        }
        let Some(members) = membership.members.get(&group.id) else {
            continue;
        };
        let Some(column) = columns.get(&group.id).copied() else {
            continue;
        };
        if let Some(layout) =
            groups::aggregate_box(&group.id, &group.label, column, members, &nodes, config)
        {
            group_layouts.push(layout);
        }
    }

    let mut edge_layouts =
        routing::route_edges(&edges, &synthesis.chains, &nodes, &group_layouts, config);
    normalize(&mut nodes, &mut group_layouts, &mut edge_layouts, config);
    let (max_x, max_y) = content_bounds(&nodes, &group_layouts, &edge_layouts);

    Ok(Layout {
        title: graph.title.clone(),
        nodes,
        groups: group_layouts,
        edges: edge_layouts,
        warnings,
        width: max_x + config.margin_x,
        height: max_y + config.margin_y,
    })
}

/// Validate declared parent references into structural edges. Unknown ids
/// warn and drop; edges that do not advance at least one column (possible
/// with explicit columns) warn and drop. Child-major, declaration order.
fn structural_edges(
    graph: &TreeGraph,
    membership: &Membership,
    columns: &HashMap<String, u32>,
    warnings: &mut Vec<LayoutWarning>,
) -> Vec<StructEdge> {
    let mut edges = Vec::new();
    let group_base = graph.nodes.len();

    let children = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.id.as_str(), node.parents.as_slice(), idx))
        .chain(
            graph
                .groups
                .iter()
                .enumerate()
                .filter(|(_, group)| !membership.skipped.contains(&group.id))
                .map(|(idx, group)| {
                    (group.id.as_str(), group.parents.as_slice(), group_base + idx)
                }),
        );

    for (child, parents, child_input) in children {
        let Some(to_col) = columns.get(child).copied() else {
            continue;
        };
        let mut seen: HashSet<&str> = HashSet::new();
        for parent in parents {
            if !seen.insert(parent.as_str()) {
                continue;
            }
            let known = graph.contains_id(parent) && !membership.skipped.contains(parent.as_str());
            if !known {
                warnings.push(LayoutWarning::MissingReference {
                    from: child.to_string(),
                    to: parent.clone(),
                });
                continue;
            }
            let from_col = columns.get(parent.as_str()).copied().unwrap_or(0);
            if to_col <= from_col {
                warnings.push(LayoutWarning::UnroutableEdge {
                    from: parent.clone(),
                    to: child.to_string(),
                });
                continue;
            }
            edges.push(StructEdge {
                from: parent.clone(),
                to: child.to_string(),
                from_col,
                to_col,
                to_input: child_input,
            });
        }
    }
    edges
}

/// Declaration indices of the visible items in each column, sorted.
/// Waypoint lane splitting needs these to spot interleaved real boxes.
fn visible_rows(
    graph: &TreeGraph,
    membership: &Membership,
    columns: &HashMap<String, u32>,
) -> HashMap<u32, Vec<usize>> {
    let mut rows: HashMap<u32, Vec<usize>> = HashMap::new();
    for (idx, node) in graph.nodes.iter().enumerate() {
        if let Some(column) = columns.get(&node.id) {
            rows.entry(*column).or_default().push(idx);
        }
    }
    for (idx, group) in graph.groups.iter().enumerate() {
        if membership.skipped.contains(&group.id) {
            continue;
        }
        if let Some(column) = columns.get(&group.id) {
            rows.entry(*column).or_default().push(graph.nodes.len() + idx);
        }
    }
    // Nodes come first and in order, groups after; each bucket is sorted.
    rows
}

/// Fold nodes, groups and synthesized waypoints into the single item
/// table the height and position passes run over. Layout parents are the
/// waypoint-substituted ones: the last routing stop before the child, or
/// the declared parent when the edge is adjacent.
fn build_items(
    graph: &TreeGraph,
    membership: &Membership,
    columns: &HashMap<String, u32>,
    edges: &[StructEdge],
    synthesis: &Synthesis,
) -> Vec<Item> {
    let mut proxies: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in edges {
        let proxy = synthesis
            .chains
            .get(&(edge.from.clone(), edge.to.clone()))
            .and_then(|chain| chain.last().cloned())
            .unwrap_or_else(|| edge.from.clone());
        proxies.entry(edge.to.as_str()).or_default().push(proxy);
    }

    let mut items = Vec::new();
    for (idx, node) in graph.nodes.iter().enumerate() {
        let Some(column) = columns.get(&node.id).copied() else {
            continue;
        };
        // Members are carried by their group's stack, not by their parents.
        let layout_parents = if membership.group_of.contains_key(&node.id) {
            Vec::new()
        } else {
            proxies.remove(node.id.as_str()).unwrap_or_default()
        };
        items.push(Item {
            id: node.id.clone(),
            label: node.label.clone(),
            kind: ItemKind::Entity,
            column,
            input_index: idx,
            layout_parents,
        });
    }
    for (idx, group) in graph.groups.iter().enumerate() {
        if membership.skipped.contains(&group.id) {
            continue;
        }
        let Some(column) = columns.get(&group.id).copied() else {
            continue;
        };
        items.push(Item {
            id: group.id.clone(),
            label: group.label.clone(),
            kind: ItemKind::Group,
            column,
            input_index: graph.nodes.len() + idx,
            layout_parents: proxies.remove(group.id.as_str()).unwrap_or_default(),
        });
    }
    for waypoint in &synthesis.waypoints {
        items.push(Item {
            id: waypoint.id.clone(),
            label: String::new(),
            kind: ItemKind::Waypoint,
            column: waypoint.column,
            input_index: waypoint.input_index,
            layout_parents: vec![waypoint.layout_parent.clone()],
        });
    }
    items
}

/// Shift everything so the top-left of the content sits exactly at the
/// configured margins. Edge points travel with their boxes.
fn normalize(
    nodes: &mut BTreeMap<String, NodeLayout>,
    groups: &mut [GroupLayout],
    edges: &mut [EdgeLayout],
    config: &LayoutConfig,
) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for node in nodes.values() {
        min_x = min_x.min(node.x);
        min_y = min_y.min(node.y);
    }
    for group in groups.iter() {
        min_x = min_x.min(group.x);
        min_y = min_y.min(group.y);
    }
    for edge in edges.iter() {
        for point in &edge.points {
            min_x = min_x.min(point.0);
            min_y = min_y.min(point.1);
        }
    }
    if min_x == f32::MAX {
        return;
    }

    let shift_x = config.margin_x - min_x;
    let shift_y = config.margin_y - min_y;
    for node in nodes.values_mut() {
        node.x += shift_x;
        node.y += shift_y;
        node.center_y += shift_y;
    }
    for group in groups.iter_mut() {
        group.x += shift_x;
        group.y += shift_y;
        group.center_y += shift_y;
    }
    for edge in edges.iter_mut() {
        for point in edge.points.iter_mut() {
            point.0 += shift_x;
            point.1 += shift_y;
        }
    }
}

fn content_bounds(
    nodes: &BTreeMap<String, NodeLayout>,
    groups: &[GroupLayout],
    edges: &[EdgeLayout],
) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for node in nodes.values() {
        max_x = max_x.max(node.right());
        max_y = max_y.max(node.bottom());
    }
    for group in groups {
        max_x = max_x.max(group.right());
        max_y = max_y.max(group.bottom());
    }
    for edge in edges {
        for point in &edge.points {
            max_x = max_x.max(point.0);
            max_y = max_y.max(point.1);
        }
    }
    (max_x, max_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Group, Node, TreeGraph};

    fn config() -> LayoutConfig {
        LayoutConfig::default()
    }

    #[test]
    fn two_children_stack_below_their_root() {
        // Scenario: A root, B and C both children of A.
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]));
        graph.add_node(Node::new("c").with_parents(["a"]));
        let layout = compute_layout(&graph, &config()).unwrap();

        assert_eq!(layout.nodes["a"].column, 0);
        assert_eq!(layout.nodes["b"].column, 1);
        assert_eq!(layout.nodes["c"].column, 1);
        let gap = layout.nodes["c"].y - layout.nodes["b"].bottom();
        assert_eq!(gap, config().row_gap);
        // B and C straddle A's center.
        let mid = (layout.nodes["b"].center_y + layout.nodes["c"].center_y) / 2.0;
        assert!((mid - layout.nodes["a"].center_y).abs() < 1e-3);
    }

    #[test]
    fn offset_two_routes_through_one_waypoint() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]).with_offset(2));
        let layout = compute_layout(&graph, &config()).unwrap();

        assert_eq!(layout.nodes["b"].column, 2);
        let waypoints: Vec<&NodeLayout> =
            layout.nodes.values().filter(|n| n.is_waypoint()).collect();
        assert_eq!(waypoints.len(), 1);
        assert_eq!(waypoints[0].column, 1);
        let edge = &layout.edges[0];
        assert!(
            edge.points
                .contains(&(waypoints[0].center_x(), waypoints[0].center_y))
        );
    }

    #[test]
    fn fan_in_centers_between_parents() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]));
        graph.add_node(Node::new("c").with_parents(["a"]));
        graph.add_node(Node::new("d").with_parents(["b", "c"]));
        let layout = compute_layout(&graph, &config()).unwrap();
        let expected = (layout.nodes["b"].center_y + layout.nodes["c"].center_y) / 2.0;
        assert!((layout.nodes["d"].center_y - expected).abs() < 1e-3);
    }

    #[test]
    fn group_box_contains_padded_members() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("m1"));
        graph.add_node(Node::new("m2"));
        graph.add_group(
            Group::new("g")
                .with_members(["m1", "m2"])
                .with_parents(["a"]),
        );
        let layout = compute_layout(&graph, &config()).unwrap();
        let group = &layout.groups[0];
        let pad = config().group_padding;
        for member in ["m1", "m2"] {
            let node = &layout.nodes[member];
            assert!(group.x <= node.x - pad + 1e-3);
            assert!(group.right() >= node.right() + pad - 1e-3);
            assert!(group.y <= node.y - pad + 1e-3);
            assert!(group.bottom() >= node.bottom() + pad - 1e-3);
        }
        assert_eq!(layout.nodes["m1"].column, group.column);
        assert_eq!(layout.nodes["m2"].column, group.column);
    }

    #[test]
    fn missing_parent_degrades_to_root_with_warning() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("b").with_parents(["ghost"]));
        let layout = compute_layout(&graph, &config()).unwrap();
        assert_eq!(layout.nodes["b"].column, 0);
        assert!(layout.edges.is_empty());
        assert!(
            layout
                .warnings
                .iter()
                .any(|w| matches!(w, LayoutWarning::MissingReference { to, .. } if to == "ghost"))
        );
    }

    #[test]
    fn backward_explicit_columns_skip_the_edge() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("late").with_column(3));
        graph.add_node(Node::new("early").with_column(1).with_parents(["late"]));
        let layout = compute_layout(&graph, &config()).unwrap();
        assert!(layout.edges.is_empty());
        assert!(
            layout
                .warnings
                .iter()
                .any(|w| matches!(w, LayoutWarning::UnroutableEdge { .. }))
        );
    }

    #[test]
    fn content_starts_at_the_margins() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]));
        let layout = compute_layout(&graph, &config()).unwrap();
        let min_x = layout.nodes.values().map(|n| n.x).fold(f32::MAX, f32::min);
        let min_y = layout.nodes.values().map(|n| n.y).fold(f32::MAX, f32::min);
        assert_eq!(min_x, config().margin_x);
        assert_eq!(min_y, config().margin_y);
        assert!(layout.width > layout.nodes["b"].right());
    }

    #[test]
    fn empty_documents_lay_out_to_nothing() {
        let layout = compute_layout(&TreeGraph::new(), &config()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn input_is_not_mutated() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]).with_offset(2));
        let before = format!("{graph:?}");
        let _ = compute_layout(&graph, &config()).unwrap();
        assert_eq!(format!("{graph:?}"), before);
    }

    #[test]
    fn cycles_abort_with_a_typed_error() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a").with_parents(["b"]));
        graph.add_node(Node::new("b").with_parents(["a"]));
        assert!(matches!(
            compute_layout(&graph, &config()),
            Err(LayoutError::CyclicParentage { .. })
        ));
    }
}
