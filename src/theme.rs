use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_size: f32,
    pub background: String,
    pub box_fill: String,
    pub box_border: String,
    pub box_text: String,
    pub line_color: String,
    pub group_fill: String,
    pub group_border: String,
    pub group_text: String,
    pub title_color: String,
}

impl Theme {
    pub fn default_light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            title_size: 20.0,
            background: "#FFFFFF".to_string(),
            box_fill: "#F8FAFF".to_string(),
            box_border: "#C7D2E5".to_string(),
            box_text: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            group_fill: "#F7FAFF".to_string(),
            group_border: "#D7E0F0".to_string(),
            group_text: "#46546B".to_string(),
            title_color: "#1C2430".to_string(),
        }
    }

    pub fn slate() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            title_size: 20.0,
            background: "#0F141B".to_string(),
            box_fill: "#1A2230".to_string(),
            box_border: "#33415C".to_string(),
            box_text: "#E4EAF4".to_string(),
            line_color: "#5A6B8C".to_string(),
            group_fill: "#151C27".to_string(),
            group_border: "#2A3650".to_string(),
            group_text: "#9FB0CC".to_string(),
            title_color: "#E4EAF4".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_light()
    }
}
