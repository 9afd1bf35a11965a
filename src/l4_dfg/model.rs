//! L4 value model (spec.md §3): `VarRef`, `DefUseEdge`, `DFGInfo`.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::shared::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefType {
    Param,
    Def,
    Use,
    Update,
    Capture,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarRef {
    pub name: String,
    #[serde(rename = "type")]
    pub ref_type: RefType,
    pub line: u32,
    pub column: u32,
    pub span: Span,
    /// Qualified name of the function this ref was recorded against — the
    /// enclosing function even for a `capture` ref (spec.md §4.6 step 2: "a
    /// capture VarRef on the enclosing function").
    pub scope: String,
    /// True for `capture` refs, which live inside a nested arrow/function
    /// expression rather than the scope's own body.
    pub is_in_closure: bool,
    /// Source text of the assigned/returned expression, where one is
    /// readily at hand at the point of recording; `None` otherwise (spec.md
    /// §3 marks this field optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl VarRef {
    pub fn new(name: impl Into<String>, ref_type: RefType, span: Span, scope: impl Into<String>, is_in_closure: bool) -> Self {
        Self {
            name: name.into(),
            ref_type,
            line: span.start_line,
            column: span.start_column,
            span,
            scope: scope.into(),
            is_in_closure,
            expression: None,
        }
    }

    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefUseEdge {
    pub variable: String,
    pub def: VarRef,
    #[serde(rename = "use")]
    pub use_: VarRef,
    /// spec.md §4.6 step 3: there exists some definition (possibly this one)
    /// that may reach this use along some path through the function.
    pub is_may_reach: bool,
    /// Another definition of the same variable lies strictly between `def`
    /// and `use` in source order.
    pub has_intervening_def: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DFGInfo {
    pub function_name: String,
    pub file_path: String,
    pub defs: Vec<VarRef>,
    pub uses: Vec<VarRef>,
    pub updates: Vec<VarRef>,
    pub captures: Vec<VarRef>,
    pub returns: Vec<VarRef>,
    pub edges: Vec<DefUseEdge>,
    /// Every ref recorded for this function, `defs ++ uses ++ updates ++
    /// captures` in recording order (spec.md §3's unified `refs[]`); `defs`
    /// etc. stay as their own fields too since builders and call sites here
    /// already key off each kind directly.
    pub refs: Vec<VarRef>,
    /// Distinct declared/referenced local names, builtins excluded (spec.md
    /// §8 scenario 1: "`dfg.variables` contains `a` and `b` but not `Math`").
    pub variables: Vec<String>,
    /// The subset of `defs` seeded from the function's parameter list.
    pub parameters: Vec<VarRef>,
    /// Reaching-definitions lattice result, keyed by line. Empty: this
    /// engine approximates reaching definitions with the line-order
    /// heuristic on `DefUseEdge` instead of a dominance fixpoint (spec.md
    /// §4.6 "Precision note"), so no per-line lattice is computed.
    pub reaching_defs: HashMap<u32, Vec<String>>,
    /// Live-variable lattice result, keyed by line. Empty for the same
    /// reason as `reaching_defs` — both are optional per spec.md §3.
    pub live_vars: HashMap<u32, Vec<String>>,
}

impl DFGInfo {
    /// Builds `refs`, `variables`, and `parameters` from the already
    /// populated `defs`/`uses`/`updates`/`captures` fields.
    pub(super) fn assemble(
        function_name: String,
        file_path: String,
        defs: Vec<VarRef>,
        uses: Vec<VarRef>,
        updates: Vec<VarRef>,
        captures: Vec<VarRef>,
        returns: Vec<VarRef>,
        edges: Vec<DefUseEdge>,
    ) -> Self {
        let parameters: Vec<VarRef> = defs.iter().filter(|d| d.ref_type == RefType::Param).cloned().collect();

        let mut seen = HashSet::new();
        let mut variables = Vec::new();
        for r in defs.iter().chain(uses.iter()).chain(updates.iter()).chain(captures.iter()) {
            if seen.insert(r.name.clone()) {
                variables.push(r.name.clone());
            }
        }

        let mut refs = Vec::with_capacity(defs.len() + uses.len() + updates.len() + captures.len());
        refs.extend(defs.iter().cloned());
        refs.extend(uses.iter().cloned());
        refs.extend(updates.iter().cloned());
        refs.extend(captures.iter().cloned());

        Self {
            function_name,
            file_path,
            defs,
            uses,
            updates,
            captures,
            returns,
            edges,
            refs,
            variables,
            parameters,
            reaching_defs: HashMap::new(),
            live_vars: HashMap::new(),
        }
    }
}
