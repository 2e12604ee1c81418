#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use ir::{Group, Node, TreeGraph};
pub use layout::{Layout, LayoutError, LayoutWarning, compute_layout};
pub use layout_dump::LayoutDump;
pub use parser::{ParseOutput, parse_document};
pub use render::render_svg;
pub use theme::Theme;
