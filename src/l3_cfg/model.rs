//! L3 value model (spec.md §3): `CFGBlock`, `CFGEdge`, `CFGInfo`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::shared::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Entry,
    Exit,
    Body,
    Branch,
    LoopHeader,
    LoopBody,
    Try,
    Catch,
    Finally,
    Return,
    Throw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFGBlock {
    pub id: u32,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub lines: (u32, u32),
    pub span: Span,
    pub statements: Vec<String>,
    pub calls: Vec<String>,
    pub defines: Vec<String>,
    pub uses: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Unconditional,
    True,
    False,
    Case,
    Default,
    Break,
    Continue,
    Return,
    Throw,
    BackEdge,
    Fallthrough,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CFGEdge {
    pub from: u32,
    pub to: u32,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub is_back_edge: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CFGInfo {
    pub function_name: String,
    pub file_path: String,
    pub blocks: Vec<CFGBlock>,
    pub edges: Vec<CFGEdge>,
    pub entry_block: u32,
    pub exit_blocks: Vec<u32>,
    pub cyclomatic_complexity: u32,
    pub max_nesting_depth: u32,
    pub decision_points: u32,
    pub nested_functions: HashMap<String, CFGInfo>,
}

impl CFGInfo {
    /// spec.md §8 invariant 3.
    pub fn expected_cyclomatic_complexity(&self) -> u32 {
        (self.edges.len() as i64 - self.blocks.len() as i64 + 2).max(1) as u32
    }
}
