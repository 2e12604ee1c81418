use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use techtree_renderer::layout::{Layout, NodeLayout};
use techtree_renderer::{
    LayoutConfig, LayoutDump, Theme, compute_layout, parse_document, render_svg,
};

fn fixture_path(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(rel)
}

fn layout_fixture(rel: &str) -> Layout {
    let input = std::fs::read_to_string(fixture_path(rel)).expect("fixture read failed");
    let parsed = parse_document(&input).expect("parse failed");
    compute_layout(&parsed.graph, &LayoutConfig::default()).expect("layout failed")
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
}

/// Within a column, visible boxes sorted by y must keep at least the
/// configured row gap between them. This is the collision sweep's contract.
fn assert_column_spacing(layout: &Layout, fixture: &str) {
    let config = LayoutConfig::default();
    let mut by_column: BTreeMap<u32, Vec<&NodeLayout>> = BTreeMap::new();
    for node in layout.nodes.values() {
        if node.is_waypoint() {
            continue;
        }
        by_column.entry(node.column).or_default().push(node);
    }
    for (column, mut nodes) in by_column {
        nodes.sort_by(|a, b| a.y.partial_cmp(&b.y).unwrap());
        for pair in nodes.windows(2) {
            let gap = pair[1].y - pair[0].bottom();
            assert!(
                gap >= config.row_gap - 0.01,
                "{fixture}: column {column} boxes `{}` and `{}` only {gap} apart",
                pair[0].id,
                pair[1].id
            );
        }
    }
}

fn column_of(layout: &Layout, id: &str) -> u32 {
    if let Some(node) = layout.nodes.get(id) {
        return node.column;
    }
    layout
        .groups
        .iter()
        .find(|group| group.id == id)
        .map(|group| group.column)
        .unwrap_or_else(|| panic!("unknown edge endpoint `{id}`"))
}

/// An edge spanning k columns must pass through exactly k - 1 waypoint
/// centers, one per skipped column.
fn assert_waypoint_counts(layout: &Layout, fixture: &str) {
    let waypoint_centers: Vec<(f32, f32)> = layout
        .nodes
        .values()
        .filter(|node| node.is_waypoint())
        .map(|node| (node.center_x(), node.center_y))
        .collect();
    for edge in &layout.edges {
        let span = column_of(layout, &edge.to) - column_of(layout, &edge.from);
        let crossed = edge
            .points
            .iter()
            .filter(|point| waypoint_centers.contains(point))
            .count();
        assert_eq!(
            crossed,
            span as usize - 1,
            "{fixture}: edge {} -> {} spans {span} columns but crosses {crossed} waypoints",
            edge.from,
            edge.to
        );
    }
}

#[test]
fn render_all_fixtures() {
    // Keep this list explicit so new fixtures must be added intentionally.
    let candidates = [
        "basic.yaml",
        "skip_columns.yaml",
        "fan_in.yaml",
        "groups.yaml",
        "warnings.yaml",
        "protocol_tree.yaml",
    ];

    for rel in candidates {
        assert!(fixture_path(rel).exists(), "fixture missing: {rel}");
        let layout = layout_fixture(rel);
        let svg = render_svg(&layout, &Theme::default_light(), &LayoutConfig::default());
        assert_valid_svg(&svg, rel);
        assert_column_spacing(&layout, rel);
        assert_waypoint_counts(&layout, rel);
    }
}

#[test]
fn basic_children_stack_with_the_configured_gap() {
    let config = LayoutConfig::default();
    let layout = layout_fixture("basic.yaml");
    assert_eq!(layout.nodes["a"].column, 0);
    assert_eq!(layout.nodes["b"].column, 1);
    assert_eq!(layout.nodes["c"].column, 1);
    assert_eq!(layout.nodes["c"].y - layout.nodes["b"].bottom(), config.row_gap);
    let straddle = (layout.nodes["b"].center_y + layout.nodes["c"].center_y) / 2.0;
    assert!((straddle - layout.nodes["a"].center_y).abs() < 1e-3);
}

#[test]
fn skip_edges_route_one_waypoint_per_skipped_column() {
    let layout = layout_fixture("skip_columns.yaml");
    assert_eq!(layout.nodes["b"].column, 2);
    assert_eq!(layout.nodes["c"].column, 3);
    let to_b = layout.edges.iter().find(|e| e.to == "b").unwrap();
    let to_c = layout.edges.iter().find(|e| e.to == "c").unwrap();
    let centers: Vec<(f32, f32)> = layout
        .nodes
        .values()
        .filter(|node| node.is_waypoint())
        .map(|node| (node.center_x(), node.center_y))
        .collect();
    assert_eq!(to_b.points.iter().filter(|p| centers.contains(p)).count(), 1);
    assert_eq!(to_c.points.iter().filter(|p| centers.contains(p)).count(), 2);
    // The interloper declared between b and c forces separate lanes in
    // the first skipped column.
    let column_one_waypoints = layout
        .nodes
        .values()
        .filter(|node| node.is_waypoint() && node.column == 1)
        .count();
    assert_eq!(column_one_waypoints, 2);
}

#[test]
fn fan_in_sits_between_its_parents() {
    let layout = layout_fixture("fan_in.yaml");
    let expected = (layout.nodes["b"].center_y + layout.nodes["c"].center_y) / 2.0;
    assert!((layout.nodes["d"].center_y - expected).abs() < 1e-3);
}

#[test]
fn group_members_share_the_group_column_inside_its_box() {
    let config = LayoutConfig::default();
    let layout = layout_fixture("groups.yaml");
    let group = layout
        .groups
        .iter()
        .find(|group| group.id == "cluster")
        .unwrap();
    for member in ["m1", "m2", "m3"] {
        let node = &layout.nodes[member];
        assert_eq!(node.column, group.column, "{member} left the group column");
        assert!(group.x <= node.x - config.group_padding + 1e-3);
        assert!(group.right() >= node.right() + config.group_padding - 1e-3);
        assert!(group.y <= node.y - config.group_padding + 1e-3);
        assert!(group.bottom() >= node.bottom() + config.group_padding - 1e-3);
    }
    // The group's only child centers on the group.
    assert!((layout.nodes["downstream"].center_y - group.center_y).abs() < 1e-3);
    // A member's own child stacks under the member, one column over.
    assert_eq!(layout.nodes["member-child"].column, group.column + 1);
}

#[test]
fn defective_documents_degrade_with_warnings() {
    let layout = layout_fixture("warnings.yaml");
    let warnings: Vec<String> = layout.warnings.iter().map(|w| w.to_string()).collect();
    assert!(warnings.iter().any(|w| w.contains("ghost")));
    assert!(warnings.iter().any(|w| w.contains("nobody")));
    assert!(warnings.iter().any(|w| w.contains("hollow")));
    assert!(warnings.iter().any(|w| w.contains("late") && w.contains("early")));
    // The rest of the tree still lays out.
    assert_eq!(layout.nodes["b"].column, 0);
    assert!(layout.groups.is_empty());
    assert!(layout.edges.is_empty());
}

#[test]
fn cyclic_documents_fail_with_a_typed_error() {
    let input = std::fs::read_to_string(fixture_path("cycle.yaml")).unwrap();
    let parsed = parse_document(&input).unwrap();
    let err = compute_layout(&parsed.graph, &LayoutConfig::default()).unwrap_err();
    assert!(err.to_string().contains("cyclic parentage"));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let input = std::fs::read_to_string(fixture_path("protocol_tree.yaml")).unwrap();
    let config = LayoutConfig::default();
    let theme = Theme::default_light();

    let mut dumps = Vec::new();
    let mut svgs = Vec::new();
    for _ in 0..2 {
        let parsed = parse_document(&input).unwrap();
        let layout = compute_layout(&parsed.graph, &config).unwrap();
        dumps.push(LayoutDump::from_layout(&layout).to_json().unwrap());
        svgs.push(render_svg(&layout, &theme, &config));
    }
    assert_eq!(dumps[0], dumps[1]);
    assert_eq!(svgs[0], svgs[1]);
}

#[test]
fn columns_follow_first_parents_in_the_showcase_tree() {
    let layout = layout_fixture("protocol_tree.yaml");
    assert_eq!(layout.nodes["http"].column, 0);
    assert_eq!(layout.nodes["json-rpc"].column, 1);
    assert_eq!(layout.nodes["lsp"].column, 2);
    assert_eq!(layout.nodes["mcp"].column, 3);
    assert_eq!(layout.nodes["a2a"].column, 4);
    assert_eq!(layout.nodes["agents"].column, 5);
    // sse -> a2a skips columns 2 and 3.
    let sse_edge = layout
        .edges
        .iter()
        .find(|edge| edge.from == "sse" && edge.to == "a2a")
        .unwrap();
    let centers: Vec<(f32, f32)> = layout
        .nodes
        .values()
        .filter(|node| node.is_waypoint())
        .map(|node| (node.center_x(), node.center_y))
        .collect();
    assert_eq!(
        sse_edge.points.iter().filter(|p| centers.contains(p)).count(),
        2
    );
}
