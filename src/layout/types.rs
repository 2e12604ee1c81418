use std::collections::{HashMap, HashSet};

use serde::Serialize;
use thiserror::Error;

/// What a positioned box actually is. Waypoints are synthesized routing
/// stops and are never painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Entity,
    Waypoint,
}

#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub column: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_y: f32,
}

impl NodeLayout {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_waypoint(&self) -> bool {
        self.kind == NodeKind::Waypoint
    }
}

/// Aggregate box around a group's members. Recomputed after the collision
/// sweep, so it always contains the members' final boxes plus padding.
#[derive(Debug, Clone)]
pub struct GroupLayout {
    pub id: String,
    pub label: String,
    pub members: Vec<String>,
    pub column: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_y: f32,
}

impl GroupLayout {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    /// Orthogonal polyline from the parent's right edge to the child's
    /// left edge, passing through every synthesized waypoint center.
    pub points: Vec<(f32, f32)>,
}

/// Recoverable input defects. The layout degrades and keeps going; these
/// surface on the finished [`super::Layout`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutWarning {
    #[error("`{from}` references unknown id `{to}`")]
    MissingReference { from: String, to: String },
    #[error("group `{id}` has no usable members and was skipped")]
    EmptyGroup { id: String },
    #[error("edge `{from}` -> `{to}` does not advance a column and was skipped")]
    UnroutableEdge { from: String, to: String },
    #[error("`{id}` is already a member of `{first}`; membership in `{second}` ignored")]
    DuplicateMember {
        id: String,
        first: String,
        second: String,
    },
    #[error("`{id}` resolved to a negative column and was clamped to 0")]
    NegativeColumn { id: String },
}

/// Unrecoverable input defects. A cycle in the parent chains would make
/// column resolution diverge, so it aborts the whole call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("cyclic parentage detected at `{id}`")]
    CyclicParentage { id: String },
}

// ── Internal pipeline types ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Entity,
    Group,
    Waypoint,
}

/// One positionable unit flowing through the height/position passes:
/// a real node, a group acting as an atomic block, or a routing waypoint.
#[derive(Debug, Clone)]
pub(crate) struct Item {
    pub id: String,
    pub label: String,
    pub kind: ItemKind,
    pub column: u32,
    pub input_index: usize,
    /// Parents used for stacking and centroids, after waypoint
    /// substitution: the nearest routing stop, not the declared parent.
    /// Empty for group members (the group stack places them) and roots.
    pub layout_parents: Vec<String>,
}

/// Group membership after validation: who belongs where, with duplicate
/// and dangling member ids already resolved away.
#[derive(Debug, Default)]
pub(crate) struct Membership {
    /// member id -> owning group id (first claim wins).
    pub group_of: HashMap<String, String>,
    /// group id -> usable members in declared order.
    pub members: HashMap<String, Vec<String>>,
    /// Groups skipped for having no usable members.
    pub skipped: HashSet<String>,
}

/// A validated structural edge: the child's column strictly exceeds the
/// parent's.
#[derive(Debug, Clone)]
pub(crate) struct StructEdge {
    pub from: String,
    pub to: String,
    pub from_col: u32,
    pub to_col: u32,
    /// Child's declaration index; drives waypoint grouping.
    pub to_input: usize,
}

impl StructEdge {
    pub fn span(&self) -> u32 {
        self.to_col - self.from_col
    }
}
