use std::collections::BTreeMap;

/// A positionable entry in the tree: one box in one column.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    /// Explicit column override. Wins over any parent-derived column.
    pub column: Option<i32>,
    /// Declared parents, in order. The first one drives column inference;
    /// the rest only participate in vertical centering.
    pub parents: Vec<String>,
    /// Column distance from the first parent when the column is inferred.
    pub offset: Option<i32>,
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            column: None,
            parents: Vec::new(),
            offset: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_column(mut self, column: i32) -> Self {
        self.column = Some(column);
        self
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_offset(mut self, offset: i32) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// A compound block of member nodes sharing one column.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: String,
    pub label: String,
    /// Member node ids, in stacking order. A group with no usable members
    /// is a configuration defect and is skipped with a warning.
    pub members: Vec<String>,
    /// Parents of the group as a whole, distinct from per-member parents.
    pub parents: Vec<String>,
}

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            members: Vec::new(),
            parents: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }
}

/// The whole input document. Declaration order of `nodes` and `groups` is
/// load-bearing: every tie-break and the collision sweep follow it.
#[derive(Debug, Clone, Default)]
pub struct TreeGraph {
    pub title: Option<String>,
    pub nodes: Vec<Node>,
    pub groups: Vec<Group>,
}

impl TreeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_group(&mut self, group: Group) -> &mut Self {
        self.groups.push(group);
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    /// Declaration index of every id, nodes first, then groups.
    pub fn input_order(&self) -> BTreeMap<&str, usize> {
        let mut order = BTreeMap::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            order.insert(node.id.as_str(), idx);
        }
        for (idx, group) in self.groups.iter().enumerate() {
            order.insert(group.id.as_str(), self.nodes.len() + idx);
        }
        order
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
            || self.groups.iter().any(|group| group.id == id)
    }
}
