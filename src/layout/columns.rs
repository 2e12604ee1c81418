use std::collections::HashMap;

use crate::ir::{Group, Node, TreeGraph};

use super::types::{LayoutError, LayoutWarning, Membership};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done(i64),
}

/// What an item's column is derived from, if anything.
enum Dependency {
    None(i64),
    Follow { dep: String, offset: i64 },
    GroupOf(String),
}

struct Index<'a> {
    nodes: HashMap<&'a str, &'a Node>,
    groups: HashMap<&'a str, &'a Group>,
    membership: &'a Membership,
}

impl Index<'_> {
    fn known(&self, id: &str) -> bool {
        !self.membership.skipped.contains(id)
            && (self.nodes.contains_key(id) || self.groups.contains_key(id))
    }
}

/// Resolve a column for every node and group.
///
/// Explicit columns win. Otherwise a node follows its first parent plus
/// its offset (default 1); roots land in column 0. Group members always
/// take their group's column. Resolution walks an explicit stack with a
/// visit-state map, so a parent chain that loops is reported as
/// [`LayoutError::CyclicParentage`] instead of overflowing the stack.
pub(super) fn resolve_columns(
    graph: &TreeGraph,
    membership: &Membership,
    warnings: &mut Vec<LayoutWarning>,
) -> Result<HashMap<String, u32>, LayoutError> {
    let index = Index {
        nodes: graph
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node))
            .collect(),
        groups: graph
            .groups
            .iter()
            .map(|group| (group.id.as_str(), group))
            .collect(),
        membership,
    };

    let mut states: HashMap<String, Visit> = HashMap::new();
    for node in &graph.nodes {
        resolve(&node.id, &index, &mut states)?;
    }
    for group in &graph.groups {
        if membership.skipped.contains(&group.id) {
            continue;
        }
        resolve(&group.id, &index, &mut states)?;
    }

    // Emit warnings in declaration order so repeated runs are identical.
    let mut columns = HashMap::with_capacity(states.len());
    let node_ids = graph.nodes.iter().map(|node| node.id.as_str());
    let group_ids = graph.groups.iter().map(|group| group.id.as_str());
    for id in node_ids.chain(group_ids) {
        let Some(Visit::Done(column)) = states.get(id) else {
            continue;
        };
        if *column < 0 {
            warnings.push(LayoutWarning::NegativeColumn { id: id.to_string() });
        }
        columns.insert(id.to_string(), (*column).max(0) as u32);
    }
    Ok(columns)
}

fn resolve(
    id: &str,
    index: &Index<'_>,
    states: &mut HashMap<String, Visit>,
) -> Result<(), LayoutError> {
    if matches!(states.get(id), Some(Visit::Done(_))) {
        return Ok(());
    }

    let mut stack: Vec<String> = vec![id.to_string()];
    while let Some(current) = stack.last().cloned() {
        if matches!(states.get(&current), Some(Visit::Done(_))) {
            stack.pop();
            continue;
        }

        let (dep, offset) = match dependency_of(&current, index) {
            Dependency::None(column) => {
                states.insert(current, Visit::Done(column));
                stack.pop();
                continue;
            }
            Dependency::Follow { dep, offset } => (dep, offset),
            Dependency::GroupOf(group_id) => (group_id, 0),
        };

        match states.get(&dep) {
            Some(Visit::Done(parent_col)) => {
                states.insert(current, Visit::Done(parent_col + offset));
                stack.pop();
            }
            Some(Visit::InProgress) => {
                return Err(LayoutError::CyclicParentage { id: dep });
            }
            None => {
                states.insert(current, Visit::InProgress);
                stack.push(dep);
            }
        }
    }
    Ok(())
}

fn dependency_of(id: &str, index: &Index<'_>) -> Dependency {
    // Members are column-atomic with their group, whatever else they declare.
    if let Some(group_id) = index.membership.group_of.get(id) {
        return Dependency::GroupOf(group_id.clone());
    }

    if let Some(node) = index.nodes.get(id) {
        if let Some(column) = node.column {
            return Dependency::None(column as i64);
        }
        // Only the first parent drives the column; a dangling first parent
        // degrades to a root (the edge pass warns about the reference).
        match node.parents.first() {
            Some(parent) if index.known(parent) => Dependency::Follow {
                dep: parent.clone(),
                offset: node.offset.unwrap_or(1) as i64,
            },
            _ => Dependency::None(0),
        }
    } else if let Some(group) = index.groups.get(id) {
        match group.parents.first() {
            Some(parent) if index.known(parent) => Dependency::Follow {
                dep: parent.clone(),
                offset: 1,
            },
            _ => Dependency::None(0),
        }
    } else {
        Dependency::None(0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::groups::resolve_membership;
    use super::*;
    use crate::ir::{Group, Node, TreeGraph};

    fn resolve_all(graph: &TreeGraph) -> Result<HashMap<String, u32>, LayoutError> {
        let mut warnings = Vec::new();
        let membership = resolve_membership(graph, &mut warnings);
        resolve_columns(graph, &membership, &mut warnings)
    }

    #[test]
    fn roots_land_in_column_zero() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["a"], 0);
    }

    #[test]
    fn follows_first_parent_plus_offset() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]));
        graph.add_node(Node::new("c").with_parents(["a"]).with_offset(2));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["b"], 1);
        assert_eq!(columns["c"], 2);
    }

    #[test]
    fn explicit_column_wins_over_parents() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]).with_column(5));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["b"], 5);
    }

    #[test]
    fn only_first_parent_drives_column() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("far").with_column(7));
        graph.add_node(Node::new("b").with_parents(["a", "far"]));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["b"], 1);
    }

    #[test]
    fn dangling_first_parent_degrades_to_root() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("b").with_parents(["ghost"]));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["b"], 0);
    }

    #[test]
    fn members_take_their_groups_column() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("m").with_column(9));
        graph.add_group(Group::new("g").with_members(["m"]).with_parents(["a"]));
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["g"], 1);
        // Column-atomic: the member's explicit column is ignored.
        assert_eq!(columns["m"], 1);
    }

    #[test]
    fn deep_chains_resolve_without_recursion() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("n0"));
        for i in 1..500 {
            graph.add_node(Node::new(format!("n{i}")).with_parents([format!("n{}", i - 1)]));
        }
        let columns = resolve_all(&graph).unwrap();
        assert_eq!(columns["n499"], 499);
    }

    #[test]
    fn negative_columns_clamp_with_warning() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a"));
        graph.add_node(Node::new("b").with_parents(["a"]).with_offset(-3));
        let mut warnings = Vec::new();
        let membership = resolve_membership(&graph, &mut warnings);
        let columns = resolve_columns(&graph, &membership, &mut warnings).unwrap();
        assert_eq!(columns["b"], 0);
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, LayoutWarning::NegativeColumn { id } if id == "b"))
        );
    }

    #[test]
    fn reports_cycles_instead_of_diverging() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a").with_parents(["c"]));
        graph.add_node(Node::new("b").with_parents(["a"]));
        graph.add_node(Node::new("c").with_parents(["b"]));
        let err = resolve_all(&graph).unwrap_err();
        assert!(matches!(err, LayoutError::CyclicParentage { .. }));
    }

    #[test]
    fn self_parentage_is_a_cycle() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("a").with_parents(["a"]));
        let err = resolve_all(&graph).unwrap_err();
        assert!(matches!(err, LayoutError::CyclicParentage { id } if id == "a"));
    }

    #[test]
    fn cycle_through_group_membership_is_reported() {
        let mut graph = TreeGraph::new();
        graph.add_node(Node::new("m"));
        graph.add_group(Group::new("g").with_members(["m"]).with_parents(["m"]));
        let err = resolve_all(&graph).unwrap_err();
        assert!(matches!(err, LayoutError::CyclicParentage { .. }));
    }
}
