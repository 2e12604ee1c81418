use std::collections::{BTreeMap, HashMap};

use crate::config::LayoutConfig;

use super::types::{EdgeLayout, GroupLayout, NodeLayout, StructEdge};

/// Emit an orthogonal polyline for every structural edge.
///
/// A path starts at the parent's right-mid edge (a group's box boundary
/// when the parent is a group) and ends at the child's left-mid edge.
/// Between adjacent columns it elbows once through the middle of the
/// inter-column gap; a skip-column edge chains such elbows through each
/// of its waypoint centers in column order.
pub(super) fn route_edges(
    edges: &[StructEdge],
    chains: &HashMap<(String, String), Vec<String>>,
    nodes: &BTreeMap<String, NodeLayout>,
    groups: &[GroupLayout],
    config: &LayoutConfig,
) -> Vec<EdgeLayout> {
    let group_by_id: HashMap<&str, &GroupLayout> =
        groups.iter().map(|group| (group.id.as_str(), group)).collect();

    let mut routed = Vec::with_capacity(edges.len());
    for edge in edges {
        let Some((start_x, start_y)) = right_port(&edge.from, nodes, &group_by_id) else {
            continue;
        };
        let Some((end_x, end_y)) = left_port(&edge.to, nodes, &group_by_id) else {
            continue;
        };

        let mut points: Vec<(f32, f32)> = vec![(start_x, start_y)];
        let mut prev_col = edge.from_col;
        let mut prev_y = start_y;

        let chain = chains
            .get(&(edge.from.clone(), edge.to.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for waypoint_id in chain {
            let Some(waypoint) = nodes.get(waypoint_id) else {
                continue;
            };
            let mid = gap_mid_x(prev_col, config);
            push_point(&mut points, (mid, prev_y));
            push_point(&mut points, (mid, waypoint.center_y));
            push_point(&mut points, (waypoint.center_x(), waypoint.center_y));
            prev_col = waypoint.column;
            prev_y = waypoint.center_y;
        }

        let mid = gap_mid_x(prev_col, config);
        push_point(&mut points, (mid, prev_y));
        push_point(&mut points, (mid, end_y));
        push_point(&mut points, (end_x, end_y));

        routed.push(EdgeLayout {
            from: edge.from.clone(),
            to: edge.to.clone(),
            points,
        });
    }
    routed
}

/// Horizontal middle of the gap between `column` and the next one, in
/// pre-normalized coordinates where column k starts at k * pitch.
fn gap_mid_x(column: u32, config: &LayoutConfig) -> f32 {
    column as f32 * (config.box_width + config.column_gap) + config.box_width
        + config.column_gap / 2.0
}

fn right_port(
    id: &str,
    nodes: &BTreeMap<String, NodeLayout>,
    groups: &HashMap<&str, &GroupLayout>,
) -> Option<(f32, f32)> {
    if let Some(group) = groups.get(id) {
        return Some((group.right(), group.center_y));
    }
    nodes.get(id).map(|node| (node.right(), node.center_y))
}

fn left_port(
    id: &str,
    nodes: &BTreeMap<String, NodeLayout>,
    groups: &HashMap<&str, &GroupLayout>,
) -> Option<(f32, f32)> {
    if let Some(group) = groups.get(id) {
        return Some((group.x, group.center_y));
    }
    nodes.get(id).map(|node| (node.x, node.center_y))
}

fn push_point(points: &mut Vec<(f32, f32)>, point: (f32, f32)) {
    if points.last() != Some(&point) {
        points.push(point);
    }
}
