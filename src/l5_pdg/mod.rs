//! Component G: program dependence graph construction and slicing
//! (spec.md §4.7).

pub mod builder;
pub mod model;
pub mod slicer;

pub use builder::build_pdg;
pub use model::{PDGEdge, PDGEdgeType, PDGInfo, PDGNode, PDGNodeType};
pub use slicer::{backward_slice, forward_slice};
