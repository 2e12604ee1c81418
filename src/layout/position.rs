use std::collections::HashMap;

use crate::config::LayoutConfig;

use super::types::{Item, ItemKind, Membership};

/// Assign a vertical center to every item, left-to-right by column.
///
/// Within a column: group member stacks go first, centered on the
/// centroid of the group's parents; sole-layout-parent items stack
/// centered on their parent; items with no usable parent stack as one
/// run centered on 0; fan-in items sit on the arithmetic mean of their
/// parents' centers. A forward collision sweep then restores the minimum
/// gap in declaration order, and group centers are refreshed from their
/// shifted members.
pub(super) fn assign_centers(
    items: &[Item],
    heights: &HashMap<String, f32>,
    membership: &Membership,
    config: &LayoutConfig,
) -> HashMap<String, f32> {
    let max_column = items.iter().map(|item| item.column).max().unwrap_or(0);
    let mut by_column: Vec<Vec<&Item>> = vec![Vec::new(); max_column as usize + 1];
    for item in items {
        by_column[item.column as usize].push(item);
    }
    for column in &mut by_column {
        column.sort_by(|a, b| {
            a.input_index
                .cmp(&b.input_index)
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    let mut centers: HashMap<String, f32> = HashMap::with_capacity(items.len());

    for column in &by_column {
        // 1. Member stacks, centered on the owning group's parent centroid.
        for item in column {
            if item.kind != ItemKind::Group {
                continue;
            }
            let centroid = parent_centroid(&item.layout_parents, &centers);
            let members = membership
                .members
                .get(&item.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            for (id, center) in stack_run(members.iter().map(String::as_str), centroid, heights, config) {
                centers.insert(id, center);
            }
        }

        // 2. Sole-parent stacks, one run per parent in first-appearance
        //    order, plus one run for items with no usable parent.
        let mut parent_order: Vec<&str> = Vec::new();
        let mut runs: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut rootless: Vec<&str> = Vec::new();
        for item in column {
            if item.kind == ItemKind::Group || membership.group_of.contains_key(&item.id) {
                continue;
            }
            match item.layout_parents.as_slice() {
                [] => rootless.push(item.id.as_str()),
                [parent] => {
                    if !runs.contains_key(parent.as_str()) {
                        parent_order.push(parent.as_str());
                    }
                    runs.entry(parent.as_str()).or_default().push(item.id.as_str());
                }
                _ => {}
            }
        }
        for parent in parent_order {
            let anchor = centers.get(parent).copied().unwrap_or(0.0);
            for (id, center) in stack_run(runs[parent].iter().copied(), anchor, heights, config) {
                centers.insert(id, center);
            }
        }
        if !rootless.is_empty() {
            for (id, center) in stack_run(rootless.into_iter(), 0.0, heights, config) {
                centers.insert(id, center);
            }
        }

        // 3. Fan-in items on their parents' centroid.
        for item in column {
            if item.kind == ItemKind::Group
                || membership.group_of.contains_key(&item.id)
                || item.layout_parents.len() < 2
            {
                continue;
            }
            centers.insert(item.id.clone(), parent_centroid(&item.layout_parents, &centers));
        }

        // 4. Collision sweep over the column's boxes in declaration order.
        let mut swept: Vec<(String, f32)> = column
            .iter()
            .filter(|item| item.kind != ItemKind::Group)
            .map(|item| (item.id.clone(), centers[&item.id]))
            .collect();
        collision_sweep(&mut swept, config.box_height, config.row_gap);
        for (id, center) in swept {
            centers.insert(id, center);
        }

        // 5. Group centers follow their (possibly shifted) members.
        for item in column {
            if item.kind != ItemKind::Group {
                continue;
            }
            let members = membership
                .members
                .get(&item.id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let mut low = f32::MAX;
            let mut high = f32::MIN;
            for member in members {
                let Some(center) = centers.get(member) else {
                    continue;
                };
                low = low.min(*center);
                high = high.max(*center);
            }
            let center = if low <= high { (low + high) / 2.0 } else { 0.0 };
            centers.insert(item.id.clone(), center);
        }
    }

    centers
}

/// Stack a run of items around `anchor`: each sits half its footprint
/// below the previous one's half, plus the gap.
fn stack_run<'a>(
    ids: impl Iterator<Item = &'a str>,
    anchor: f32,
    heights: &HashMap<String, f32>,
    config: &LayoutConfig,
) -> Vec<(String, f32)> {
    let sized: Vec<(&str, f32)> = ids
        .map(|id| (id, heights.get(id).copied().unwrap_or(config.box_height)))
        .collect();
    if sized.is_empty() {
        return Vec::new();
    }
    let total: f32 = sized.iter().map(|(_, height)| height).sum::<f32>()
        + config.row_gap * (sized.len() - 1) as f32;
    let mut cursor = anchor - total / 2.0;
    let mut out = Vec::with_capacity(sized.len());
    for (id, height) in sized {
        out.push((id.to_string(), cursor + height / 2.0));
        cursor += height + config.row_gap;
    }
    out
}

fn parent_centroid(parents: &[String], centers: &HashMap<String, f32>) -> f32 {
    let resolved: Vec<f32> = parents
        .iter()
        .filter_map(|parent| centers.get(parent).copied())
        .collect();
    if resolved.is_empty() {
        return 0.0;
    }
    resolved.iter().sum::<f32>() / resolved.len() as f32
}

/// Forward collision pass over one column, sorted by declaration order.
///
/// When an item's fixed-size box would sit closer than `min_gap` below
/// its predecessor's, it shifts down by the overlap, and so does
/// everything after it. Relative declaration order is preserved by
/// policy; total height is not minimized.
pub(crate) fn collision_sweep(entries: &mut [(String, f32)], box_height: f32, min_gap: f32) {
    for i in 1..entries.len() {
        let floor = entries[i - 1].1 + box_height + min_gap;
        if entries[i].1 < floor {
            let shift = floor - entries[i].1;
            for entry in entries[i..].iter_mut() {
                entry.1 += shift;
            }
        }
    }
}
