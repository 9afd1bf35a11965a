//! A layered static analysis engine for TypeScript and JavaScript.
//!
//! Five representations are built from an external parse tree (component
//! A, [`parsing`]), each layered on the one below:
//!
//! - **L1** [`l1_module`] — per-file module structure: imports, exports,
//!   functions, classes, interfaces.
//! - **L2** [`l2_call_graph`] — a project-wide call graph resolved across
//!   files, plus a bounded impact query.
//! - **L3** [`l3_cfg`] — a control-flow graph for one function.
//! - **L4** [`l4_dfg`] — a data-flow graph (def/use/update/capture) for one
//!   function.
//! - **L5** [`l5_pdg`] — a program dependence graph unioning control and
//!   data dependence, with backward/forward slicing.
//!
//! [`pipeline::Pipeline`] wires all five together so callers don't have to
//! hand-assemble builders; [`config::AnalysisConfig`] holds the ambient
//! knobs (worker threads, exclusion lists, query depth bounds) that the
//! pipeline and its builders read.

pub mod config;
pub mod l1_module;
pub mod l2_call_graph;
pub mod l3_cfg;
pub mod l4_dfg;
pub mod l5_pdg;
pub mod parsing;
pub mod pipeline;
pub mod shared;

pub use config::AnalysisConfig;
pub use pipeline::Pipeline;
pub use shared::{AnalysisError, Result};
