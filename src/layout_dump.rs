use crate::layout::Layout;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Machine-readable snapshot of a finished layout. Also the surface the
/// determinism tests byte-compare.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub title: Option<String>,
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub groups: Vec<GroupDump>,
    pub edges: Vec<EdgeDump>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub kind: crate::layout::NodeKind,
    pub column: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub center_y: f32,
}

#[derive(Debug, Serialize)]
pub struct GroupDump {
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

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub from: String,
    pub to: String,
    pub points: Vec<[f32; 2]>,
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                column: node.column,
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                center_y: node.center_y,
            })
            .collect();

        let groups = layout
            .groups
            .iter()
            .map(|group| GroupDump {
                id: group.id.clone(),
                label: group.label.clone(),
                members: group.members.clone(),
                column: group.column,
                x: group.x,
                y: group.y,
                width: group.width,
                height: group.height,
                center_y: group.center_y,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                from: edge.from.clone(),
                to: edge.to.clone(),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            title: layout.title.clone(),
            width: layout.width,
            height: layout.height,
            nodes,
            groups,
            edges,
            warnings: layout.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_layout_dump(path: &Path, layout: &Layout) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &LayoutDump::from_layout(layout))?;
    Ok(())
}
