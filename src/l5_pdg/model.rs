//! L5 value model (spec.md §3): `PDGNode`, `PDGEdge`, `PDGInfo`.

use serde::{Deserialize, Serialize};

use crate::l3_cfg::CFGInfo;
use crate::l4_dfg::DFGInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PDGNodeType {
    Entry,
    Predicate,
    Statement,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PDGNode {
    pub id: u32,
    #[serde(rename = "type")]
    pub node_type: PDGNodeType,
    pub line: u32,
    pub defines: Vec<String>,
    pub uses: Vec<String>,
    pub statement: String,
    /// The CFG block this node was built from. One PDG node per CFG block
    /// (spec.md §4.7), so this always equals `id`; kept as its own field
    /// since spec.md §3 models it as a separate, optional pointer back to
    /// the CFG rather than reusing the PDG's own id space.
    pub cfg_block_id: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PDGEdgeType {
    Control,
    Data,
    /// Reserved for future extension (spec.md §4.7).
    Anti,
    /// Reserved for future extension (spec.md §4.7).
    Output,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PDGEdge {
    pub from: u32,
    pub to: u32,
    #[serde(rename = "type")]
    pub edge_type: PDGEdgeType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PDGInfo {
    pub function_name: String,
    pub file_path: String,
    pub nodes: Vec<PDGNode>,
    pub edges: Vec<PDGEdge>,
    pub entry_node: u32,
    pub exit_nodes: Vec<u32>,
    /// The CFG this PDG was built from (spec.md §3 Lifecycle: "a PDG...
    /// holds a reference to the CFG and DFG used to build it"). Owned
    /// rather than borrowed — `CFGInfo`/`DFGInfo` are immutable once built,
    /// so an owned copy observes the same invariant a shared reference
    /// would without fighting Rust's lifetimes on a value meant to outlive
    /// its builder call.
    pub cfg: CFGInfo,
    pub dfg: DFGInfo,
    pub control_edge_count: usize,
    pub data_edge_count: usize,
}

impl PDGInfo {
    pub(super) fn assemble(
        function_name: String,
        file_path: String,
        nodes: Vec<PDGNode>,
        edges: Vec<PDGEdge>,
        entry_node: u32,
        exit_nodes: Vec<u32>,
        cfg: CFGInfo,
        dfg: DFGInfo,
    ) -> Self {
        let control_edge_count = edges.iter().filter(|e| e.edge_type == PDGEdgeType::Control).count();
        let data_edge_count = edges.iter().filter(|e| e.edge_type == PDGEdgeType::Data).count();
        Self {
            function_name,
            file_path,
            nodes,
            edges,
            entry_node,
            exit_nodes,
            cfg,
            dfg,
            control_edge_count,
            data_edge_count,
        }
    }
}
