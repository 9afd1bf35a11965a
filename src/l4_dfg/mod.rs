//! Component F: data-flow graph construction (spec.md §4.6).

pub mod builder;
pub mod model;

pub use builder::build_dfg;
pub use model::{DFGInfo, DefUseEdge, RefType, VarRef};
