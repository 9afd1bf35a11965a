//! L2 value model (spec.md §3): `FunctionLocation`, `CallEdge`, and the
//! `ProjectCallGraph` that owns both plus its forward/backward indices.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FunctionLocation {
    pub file: String,
    pub name: String,
    pub qualified_name: String,
    pub line: u32,
    pub is_exported: bool,
}

impl FunctionLocation {
    /// spec.md §3 / GLOSSARY: `<moduleName>.(Class.method | name)`.
    pub fn qualify(module_name: &str, class: Option<&str>, name: &str) -> String {
        match class {
            Some(class) => format!("{module_name}.{class}.{name}"),
            None => format!("{module_name}.{name}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallType {
    Direct,
    Method,
    Constructor,
    Callback,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    pub file: String,
    pub caller: String,
    pub line: u32,
    pub column: u32,
    pub is_method_call: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub argument_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: FunctionLocation,
    pub callee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_location: Option<FunctionLocation>,
    pub call_site: CallSite,
    pub is_dynamic: bool,
    pub call_type: CallType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectCallGraph {
    pub project_root: String,
    pub files: Vec<String>,
    pub functions: HashMap<String, FunctionLocation>,
    pub edges: Vec<CallEdge>,
    pub forward_index: HashMap<String, Vec<usize>>,
    pub backward_index: HashMap<String, Vec<usize>>,
    pub built_at: String,
}

impl ProjectCallGraph {
    pub fn new(project_root: impl Into<String>, built_at: impl Into<String>) -> Self {
        Self {
            project_root: project_root.into(),
            files: Vec::new(),
            functions: HashMap::new(),
            edges: Vec::new(),
            forward_index: HashMap::new(),
            backward_index: HashMap::new(),
            built_at: built_at.into(),
        }
    }

    /// Indices store edge positions rather than owned/borrowed `CallEdge`
    /// values, per spec.md §3's "indices hold borrowed references to the
    /// owning list" ownership note; `usize` is the allocation-free analogue
    /// that sidesteps self-referential borrows against `self.edges`.
    pub fn forward_edges(&self, qualified_name: &str) -> Vec<&CallEdge> {
        self.forward_index
            .get(qualified_name)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
            .collect()
    }

    pub fn backward_edges(&self, qualified_name: &str) -> Vec<&CallEdge> {
        self.backward_index
            .get(qualified_name)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
            .collect()
    }

    pub(crate) fn push_edge(&mut self, edge: CallEdge) {
        let idx = self.edges.len();
        self.forward_index
            .entry(edge.caller.qualified_name.clone())
            .or_default()
            .push(idx);
        if let Some(callee) = &edge.callee_location {
            self.backward_index
                .entry(callee.qualified_name.clone())
                .or_default()
                .push(idx);
        }
        self.edges.push(edge);
    }
}

/// spec.md §4.4 step 5's impact-query result: a caller edge annotated with
/// the BFS depth at which it was discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactedCaller {
    pub edge: CallEdge,
    pub depth: u32,
}
