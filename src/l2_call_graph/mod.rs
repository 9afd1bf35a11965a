//! Components C and D: the per-file call scan and the project-wide call
//! graph builder with its bounded impact query (spec.md §4.3, §4.4).

pub mod builder;
pub mod call_scan;
pub mod impact;
pub mod model;

pub use builder::{build_call_graph, build_call_graph_cancellable, build_call_graph_with_excludes, BuildReport};
pub use impact::get_callers;
pub use model::{CallEdge, CallSite, CallType, FunctionLocation, ImpactedCaller, ProjectCallGraph};
