use std::collections::{HashMap, HashSet};

use super::types::StructEdge;

/// An invisible routing stop synthesized for a skip-column edge. One box
/// high, one per crossed column, chained left-to-right.
#[derive(Debug, Clone)]
pub(crate) struct Waypoint {
    pub id: String,
    pub column: u32,
    /// Copied from the first child that required this stop.
    pub input_index: usize,
    /// Previous waypoint in the lane, or the true parent at the first
    /// crossed column.
    pub layout_parent: String,
}

#[derive(Debug, Default)]
pub(crate) struct Synthesis {
    pub waypoints: Vec<Waypoint>,
    /// (parent, child) -> waypoint ids, leftmost column first. Empty for
    /// adjacent-column edges.
    pub chains: HashMap<(String, String), Vec<String>>,
}

fn waypoint_id(parent: &str, column: u32, lane: usize) -> String {
    format!("__via__{parent}_{column}_{lane}")
}

/// Synthesize waypoints for every edge that skips columns.
///
/// Edges from one parent crossing the same column share a lane, walked in
/// child declaration order; the lane splits whenever a real (visible) item
/// at that column sits strictly between two consecutive children in that
/// order. Sharing keeps parallel long edges merged into one line where
/// that reads well; splitting keeps them from appearing to pass through
/// unrelated boxes.
///
/// `real_rows` maps each column to the sorted declaration indices of the
/// visible items occupying it.
pub(super) fn synthesize(
    edges: &[StructEdge],
    real_rows: &HashMap<u32, Vec<usize>>,
) -> Synthesis {
    // Parent-major, preserving first-seen order for deterministic output.
    let mut parent_order: Vec<&str> = Vec::new();
    let mut by_parent: HashMap<&str, Vec<&StructEdge>> = HashMap::new();
    for edge in edges {
        if edge.span() <= 1 {
            continue;
        }
        if !by_parent.contains_key(edge.from.as_str()) {
            parent_order.push(edge.from.as_str());
        }
        by_parent.entry(edge.from.as_str()).or_default().push(edge);
    }

    let mut synthesis = Synthesis::default();

    for parent in parent_order {
        let long = &by_parent[parent];
        let from_col = long[0].from_col;
        let max_to = long.iter().map(|edge| edge.to_col).max().unwrap_or(from_col);

        // Lane of each child at each crossed column.
        let mut lane_at: HashMap<(u32, &str), usize> = HashMap::new();
        let mut created: HashSet<(u32, usize)> = HashSet::new();

        for column in (from_col + 1)..max_to {
            let rows = real_rows.get(&column).map(Vec::as_slice).unwrap_or(&[]);
            let mut lane = 0usize;
            let mut prev_input: Option<usize> = None;

            for edge in long.iter().filter(|edge| column < edge.to_col) {
                if let Some(prev) = prev_input
                    && has_real_between(rows, prev, edge.to_input)
                {
                    lane += 1;
                }
                prev_input = Some(edge.to_input);
                lane_at.insert((column, edge.to.as_str()), lane);

                if created.insert((column, lane)) {
                    let layout_parent = if column == from_col + 1 {
                        parent.to_string()
                    } else {
                        let prev_lane = lane_at[&(column - 1, edge.to.as_str())];
                        waypoint_id(parent, column - 1, prev_lane)
                    };
                    synthesis.waypoints.push(Waypoint {
                        id: waypoint_id(parent, column, lane),
                        column,
                        input_index: edge.to_input,
                        layout_parent,
                    });
                }
            }
        }

        for edge in long {
            let chain: Vec<String> = ((from_col + 1)..edge.to_col)
                .map(|column| waypoint_id(parent, column, lane_at[&(column, edge.to.as_str())]))
                .collect();
            synthesis
                .chains
                .insert((edge.from.clone(), edge.to.clone()), chain);
        }
    }

    synthesis
}

fn has_real_between(rows: &[usize], low: usize, high: usize) -> bool {
    // `rows` is sorted; find any declaration index strictly inside (low, high).
    let start = rows.partition_point(|&idx| idx <= low);
    start < rows.len() && rows[start] < high
}
