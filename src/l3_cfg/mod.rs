//! Component E: control-flow graph construction (spec.md §4.5).

pub mod builder;
pub mod model;

pub use builder::build_cfg;
pub use model::{BlockType, CFGBlock, CFGEdge, CFGInfo, EdgeType};
