use std::collections::HashMap;

use crate::config::LayoutConfig;

use super::types::{Item, ItemKind, Membership};

/// Compute every item's vertical footprint, right-to-left by column.
///
/// An item reserves one box height unless it has children for which it is
/// the sole layout parent; those stack beneath it, so it reserves their
/// summed footprints plus the gaps between them. Fan-in children are
/// excluded (the centroid places them), waypoints always count as one box
/// no matter what routes through them, and a group reserves its member
/// stack.
pub(super) fn compute_heights(
    items: &[Item],
    membership: &Membership,
    config: &LayoutConfig,
) -> HashMap<String, f32> {
    let mut sole_children: HashMap<&str, Vec<&str>> = HashMap::new();
    for item in items {
        if let [parent] = item.layout_parents.as_slice() {
            sole_children
                .entry(parent.as_str())
                .or_default()
                .push(item.id.as_str());
        }
    }

    let max_column = items.iter().map(|item| item.column).max().unwrap_or(0);
    let mut by_column: Vec<Vec<&Item>> = vec![Vec::new(); max_column as usize + 1];
    for item in items {
        by_column[item.column as usize].push(item);
    }

    let mut heights: HashMap<String, f32> = HashMap::with_capacity(items.len());
    for column in by_column.iter().rev() {
        // Entities and waypoints first; groups read their members' results
        // from this same column afterwards.
        for item in column {
            if item.kind == ItemKind::Group {
                continue;
            }
            let height = match item.kind {
                ItemKind::Waypoint => config.box_height,
                _ => stacked_height(
                    sole_children.get(item.id.as_str()).map(Vec::as_slice),
                    &heights,
                    config,
                ),
            };
            heights.insert(item.id.clone(), height);
        }
        for item in column {
            if item.kind != ItemKind::Group {
                continue;
            }
            let members = membership
                .members
                .get(&item.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let total = members
                .iter()
                .map(|member| heights.get(member).copied().unwrap_or(config.box_height))
                .sum::<f32>()
                + config.row_gap * members.len().saturating_sub(1) as f32;
            heights.insert(item.id.clone(), total.max(config.box_height));
        }
    }

    heights
}

fn stacked_height(
    children: Option<&[&str]>,
    heights: &HashMap<String, f32>,
    config: &LayoutConfig,
) -> f32 {
    let Some(children) = children else {
        return config.box_height;
    };
    if children.is_empty() {
        return config.box_height;
    }
    let sum: f32 = children
        .iter()
        .map(|child| heights.get(*child).copied().unwrap_or(config.box_height))
        .sum();
    sum + config.row_gap * (children.len() - 1) as f32
}
