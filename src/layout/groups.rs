use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::TreeGraph;

use super::types::{GroupLayout, LayoutWarning, Membership, NodeLayout};

/// Validate group membership: unknown members are dropped, a node claimed
/// twice stays with its first group, and a group left with no usable
/// members is skipped entirely.
pub(super) fn resolve_membership(
    graph: &TreeGraph,
    warnings: &mut Vec<LayoutWarning>,
) -> Membership {
    let mut membership = Membership::default();

    for group in &graph.groups {
        let mut usable: Vec<String> = Vec::with_capacity(group.members.len());
        for member in &group.members {
            if graph.node(member).is_none() {
                warnings.push(LayoutWarning::MissingReference {
                    from: group.id.clone(),
                    to: member.clone(),
                });
                continue;
            }
            if let Some(first) = membership.group_of.get(member) {
                warnings.push(LayoutWarning::DuplicateMember {
                    id: member.clone(),
                    first: first.clone(),
                    second: group.id.clone(),
                });
                continue;
            }
            membership
                .group_of
                .insert(member.clone(), group.id.clone());
            usable.push(member.clone());
        }

        if usable.is_empty() {
            warnings.push(LayoutWarning::EmptyGroup {
                id: group.id.clone(),
            });
            // Drop any claims made before the group turned out empty.
            membership.group_of.retain(|_, owner| owner != &group.id);
            membership.skipped.insert(group.id.clone());
            continue;
        }
        membership.members.insert(group.id.clone(), usable);
    }

    membership
}

/// Build the aggregate box around a group's placed members: the member
/// extent padded on every side, plus a label band on top. Runs after the
/// collision sweep so shifted members are contained.
pub(super) fn aggregate_box(
    group_id: &str,
    label: &str,
    column: u32,
    members: &[String],
    nodes: &BTreeMap<String, NodeLayout>,
    config: &LayoutConfig,
) -> Option<GroupLayout> {
    let mut top = f32::MAX;
    let mut bottom = f32::MIN;
    let mut left = f32::MAX;
    let mut right = f32::MIN;
    let mut seen = false;
    for member in members {
        let Some(node) = nodes.get(member) else {
            continue;
        };
        top = top.min(node.y);
        bottom = bottom.max(node.bottom());
        left = left.min(node.x);
        right = right.max(node.right());
        seen = true;
    }
    if !seen {
        return None;
    }

    let pad = config.group_padding;
    let x = left - pad;
    let y = top - pad - config.group_label_band;
    let width = (right + pad) - x;
    let height = (bottom + pad) - y;
    Some(GroupLayout {
        id: group_id.to_string(),
        label: label.to_string(),
        members: members.to_vec(),
        column,
        x,
        y,
        width,
        height,
        center_y: (top + bottom) / 2.0,
    })
}
