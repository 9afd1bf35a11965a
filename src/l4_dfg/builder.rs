//! DFG builder (component F, spec.md §4.6). Scope: one function body.
//!
//! Reaching definitions are approximated by source order rather than a
//! dominance-based fixpoint over the CFG (spec.md §4.6 "Precision note");
//! for a given use, the nearest preceding same-name definition is the one
//! marked `is_may_reach`, every earlier one is marked `has_intervening_def`.

use std::collections::HashSet;

use crate::parsing::Node;
use crate::shared::{BuiltinSet, Span};

use super::model::{DFGInfo, DefUseEdge, RefType, VarRef};

fn statement_children(node: Node<'_>) -> Vec<Node<'_>> {
    node.named_children().into_iter().filter(|c| c.kind() != "comment").collect()
}

fn record_pattern_names(node: Node<'_>, out: &mut HashSet<String>) {
    match node.kind() {
        "identifier" => {
            out.insert(node.text().to_string());
        }
        "object_pattern" => {
            for child in node.named_children() {
                match child.kind() {
                    "shorthand_property_identifier_pattern" => {
                        out.insert(child.text().to_string());
                    }
                    "pair_pattern" => {
                        if let Some(v) = child.child_by_field_name("value") {
                            record_pattern_names(v, out);
                        }
                    }
                    "rest_pattern" => {
                        if let Some(id) = child.find_child("identifier") {
                            out.insert(id.text().to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        "array_pattern" => {
            for child in node.named_children() {
                if child.kind() == "identifier" {
                    out.insert(child.text().to_string());
                }
            }
        }
        _ => {}
    }
}

/// Every name declared anywhere inside a function's parameter list or body,
/// recursing into nested blocks and nested functions. Used as the "is this
/// locally bound" test when deciding whether an identifier inside a nested
/// arrow/function expression is a capture of the enclosing scope; coarser
/// than a real scope chain (it doesn't distinguish which nesting level a
/// name belongs to) but sound enough for "captured or not".
fn local_names_of_function(node: Node<'_>) -> HashSet<String> {
    let mut out = HashSet::new();
    if let Some(params) = node.child_by_field_name("parameters") {
        if params.kind() == "identifier" {
            out.insert(params.text().to_string());
        } else {
            for child in params.children() {
                match child.kind() {
                    "required_parameter" | "optional_parameter" | "rest_parameter" => {
                        if let Some(pattern) = child.child_by_field_name("pattern").or_else(|| child.find_child("identifier")) {
                            record_pattern_names(pattern, &mut out);
                        }
                    }
                    "identifier" => {
                        out.insert(child.text().to_string());
                    }
                    _ => {}
                }
            }
        }
    }
    if let Some(body) = node.child_by_field_name("body") {
        declared_names(body, &mut out);
    }
    out
}

fn declared_names(node: Node<'_>, out: &mut HashSet<String>) {
    match node.kind() {
        "variable_declarator" => {
            if let Some(name) = node.child_by_field_name("name") {
                record_pattern_names(name, out);
            }
        }
        "required_parameter" | "optional_parameter" | "rest_parameter" => {
            if let Some(pattern) = node.child_by_field_name("pattern").or_else(|| node.find_child("identifier")) {
                record_pattern_names(pattern, out);
            }
        }
        "catch_clause" => {
            if let Some(param) = node.child_by_field_name("parameter") {
                record_pattern_names(param, out);
            }
        }
        _ => {}
    }
    for child in node.named_children() {
        declared_names(child, out);
    }
}

/// Identifier leaves under `node` that are not bound in `locals` and are
/// not built-ins (spec.md §6.3), skipping property-name positions.
fn collect_free_identifiers(node: Node<'_>, locals: &HashSet<String>, builtins: &BuiltinSet, out: &mut Vec<(String, Span)>) {
    match node.kind() {
        "identifier" => {
            let name = node.text();
            if !locals.contains(name) && !builtins.contains(name) {
                out.push((name.to_string(), node.span()));
            }
            return;
        }
        "member_expression" => {
            if let Some(obj) = node.child_by_field_name("object") {
                collect_free_identifiers(obj, locals, builtins, out);
            }
            return;
        }
        "property_identifier" | "shorthand_property_identifier_pattern" => return,
        _ => {}
    }
    for child in node.named_children() {
        collect_free_identifiers(child, locals, builtins, out);
    }
}

struct DfgBuilder {
    builtins: BuiltinSet,
    scope: String,
    defs: Vec<VarRef>,
    uses: Vec<VarRef>,
    updates: Vec<VarRef>,
    captures: Vec<VarRef>,
    returns: Vec<VarRef>,
    known_names: HashSet<String>,
}

impl DfgBuilder {
    fn record_def(&mut self, name: &str, span: Span) {
        self.record_def_with_expr(name, span, None);
    }

    fn record_def_with_expr(&mut self, name: &str, span: Span, expression: Option<String>) {
        self.known_names.insert(name.to_string());
        let mut var_ref = VarRef::new(name, RefType::Def, span, self.scope.clone(), false);
        if let Some(expr) = expression {
            var_ref = var_ref.with_expression(expr);
        }
        self.defs.push(var_ref);
    }

    fn record_use(&mut self, name: &str, span: Span) {
        if self.builtins.contains(name) {
            return;
        }
        self.uses.push(VarRef::new(name, RefType::Use, span, self.scope.clone(), false));
    }

    fn record_pattern_defs(&mut self, node: Node<'_>) {
        match node.kind() {
            "identifier" => self.record_def(node.text(), node.span()),
            "object_pattern" => {
                for child in node.named_children() {
                    match child.kind() {
                        "shorthand_property_identifier_pattern" => self.record_def(child.text(), child.span()),
                        "pair_pattern" => {
                            if let Some(v) = child.child_by_field_name("value") {
                                self.record_pattern_defs(v);
                            }
                        }
                        "rest_pattern" => {
                            if let Some(id) = child.find_child("identifier") {
                                self.record_def(id.text(), id.span());
                            }
                        }
                        _ => {}
                    }
                }
            }
            "array_pattern" => {
                for child in node.named_children() {
                    if child.kind() == "identifier" {
                        self.record_def(child.text(), child.span());
                    }
                }
            }
            _ => {}
        }
    }

    fn walk_statements(&mut self, stmts: &[Node<'_>]) {
        for s in stmts {
            self.walk_statement(*s);
        }
    }

    fn walk_statement(&mut self, node: Node<'_>) {
        match node.kind() {
            "statement_block" => self.walk_statements(&statement_children(node)),
            "lexical_declaration" | "variable_declaration" => {
                for decl in node.named_children() {
                    if decl.kind() != "variable_declarator" {
                        continue;
                    }
                    let init = decl.child_by_field_name("value");
                    if let Some(init) = init {
                        self.walk_expr(init);
                    }
                    if let Some(name) = decl.child_by_field_name("name") {
                        match (name.kind(), init) {
                            ("identifier", Some(init)) => self.record_def_with_expr(name.text(), name.span(), Some(init.text().to_string())),
                            _ => self.record_pattern_defs(name),
                        }
                    }
                }
            }
            "if_statement" => {
                if let Some(c) = node.child_by_field_name("condition") {
                    self.walk_expr(c);
                }
                if let Some(c) = node.child_by_field_name("consequence") {
                    self.walk_statement(c);
                }
                if let Some(alt) = node.child_by_field_name("alternative") {
                    for child in alt.named_children() {
                        self.walk_statement(child);
                    }
                }
            }
            "for_statement" => {
                if let Some(init) = node.child_by_field_name("initializer") {
                    match init.kind() {
                        "lexical_declaration" | "variable_declaration" => self.walk_statement(init),
                        _ => self.walk_expr(init),
                    }
                }
                if let Some(cond) = node.child_by_field_name("condition") {
                    self.walk_expr(cond);
                }
                if let Some(inc) = node.child_by_field_name("increment") {
                    self.walk_expr(inc);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_statement(body);
                }
            }
            "for_in_statement" | "for_of_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.record_pattern_defs(left);
                }
                if let Some(right) = node.child_by_field_name("right") {
                    self.walk_expr(right);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    self.walk_statement(body);
                }
            }
            "while_statement" => {
                if let Some(c) = node.child_by_field_name("condition") {
                    self.walk_expr(c);
                }
                if let Some(b) = node.child_by_field_name("body") {
                    self.walk_statement(b);
                }
            }
            "do_statement" => {
                if let Some(b) = node.child_by_field_name("body") {
                    self.walk_statement(b);
                }
                if let Some(c) = node.child_by_field_name("condition") {
                    self.walk_expr(c);
                }
            }
            "switch_statement" => {
                if let Some(v) = node.child_by_field_name("value") {
                    self.walk_expr(v);
                }
                if let Some(body) = node.child_by_field_name("body") {
                    for case_node in body.children() {
                        if !matches!(case_node.kind(), "switch_case" | "switch_default") {
                            continue;
                        }
                        let case_value = case_node.child_by_field_name("value");
                        if let Some(v) = case_value {
                            self.walk_expr(v);
                        }
                        for child in case_node.named_children() {
                            if child.kind() == "comment" {
                                continue;
                            }
                            if let Some(v) = case_value {
                                if child.span() == v.span() {
                                    continue;
                                }
                            }
                            self.walk_statement(child);
                        }
                    }
                }
            }
            "try_statement" => {
                if let Some(b) = node.child_by_field_name("body") {
                    self.walk_statement(b);
                }
                if let Some(handler) = node.find_child("catch_clause") {
                    if let Some(param) = handler.child_by_field_name("parameter") {
                        self.record_pattern_defs(param);
                    }
                    if let Some(b) = handler.child_by_field_name("body") {
                        self.walk_statement(b);
                    }
                }
                if let Some(finalizer) = node.find_child("finally_clause") {
                    if let Some(b) = finalizer.child_by_field_name("body") {
                        self.walk_statement(b);
                    }
                }
            }
            "return_statement" => {
                for child in node.named_children() {
                    if child.kind() == "identifier" {
                        self.returns.push(VarRef::new(child.text(), RefType::Use, child.span(), self.scope.clone(), false));
                    }
                    self.walk_expr(child);
                }
            }
            "throw_statement" | "expression_statement" => {
                for child in node.named_children() {
                    self.walk_expr(child);
                }
            }
            "function_declaration" | "generator_function_declaration" | "class_declaration" => {
                self.walk_nested_function(node);
            }
            "break_statement" | "continue_statement" => {}
            _ => {
                for child in node.named_children() {
                    self.walk_expr(child);
                }
            }
        }
    }

    fn walk_expr(&mut self, node: Node<'_>) {
        match node.kind() {
            "identifier" => self.record_use(node.text(), node.span()),
            "assignment_expression" => {
                if let Some(right) = node.child_by_field_name("right") {
                    self.walk_expr(right);
                }
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        self.record_def_with_expr(left.text(), left.span(), Some(node.text().to_string()));
                    } else {
                        self.walk_expr(left);
                    }
                }
            }
            "update_expression" => {
                if let Some(operand) = node.named_children().into_iter().next() {
                    if operand.kind() == "identifier" {
                        self.known_names.insert(operand.text().to_string());
                        self.updates
                            .push(VarRef::new(operand.text(), RefType::Update, operand.span(), self.scope.clone(), false));
                    } else {
                        self.walk_expr(operand);
                    }
                }
            }
            "arrow_function" | "function_expression" => self.walk_nested_function(node),
            "call_expression" => {
                if let Some(callee) = node.child_by_field_name("function") {
                    self.walk_expr(callee);
                }
                if let Some(args) = node.child_by_field_name("arguments") {
                    for a in args.named_children() {
                        self.walk_expr(a);
                    }
                }
            }
            "member_expression" => {
                if let Some(obj) = node.child_by_field_name("object") {
                    self.walk_expr(obj);
                }
            }
            _ => {
                for child in node.named_children() {
                    self.walk_expr(child);
                }
            }
        }
    }

    /// spec.md §4.6 step 2, `arrow_function` / `function_expression` bullet:
    /// a sub-walk computes the nested function's own locals, then every
    /// free identifier it uses that is already known in this scope is
    /// recorded as a `capture` — the walker does not descend further for
    /// def/use bookkeeping.
    fn walk_nested_function(&mut self, node: Node<'_>) {
        let locals = local_names_of_function(node);
        let mut free = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            collect_free_identifiers(body, &locals, &self.builtins, &mut free);
        }
        for (name, span) in free {
            if self.known_names.contains(&name) {
                self.captures.push(VarRef::new(name, RefType::Capture, span, self.scope.clone(), true));
            }
        }
    }
}

fn extract_param_seed(params_node: Node<'_>, scope: &str) -> Vec<VarRef> {
    let mut names = HashSet::new();
    let mut out = Vec::new();
    if params_node.kind() == "identifier" {
        names.insert(params_node.text().to_string());
        out.push(VarRef::new(params_node.text(), RefType::Param, params_node.span(), scope, false));
        return out;
    }
    for child in params_node.children() {
        match child.kind() {
            "required_parameter" | "optional_parameter" | "rest_parameter" => {
                let pattern = child.child_by_field_name("pattern").or_else(|| child.find_child("identifier"));
                if let Some(pattern) = pattern {
                    let mut found = HashSet::new();
                    record_pattern_names(pattern, &mut found);
                    for name in found {
                        if names.insert(name.clone()) {
                            out.push(VarRef::new(name, RefType::Param, pattern.span(), scope, false));
                        }
                    }
                }
            }
            "identifier" => {
                if names.insert(child.text().to_string()) {
                    out.push(VarRef::new(child.text(), RefType::Param, child.span(), scope, false));
                }
            }
            _ => {}
        }
    }
    out
}

fn key(span: &Span) -> (u32, u32) {
    (span.start_line, span.start_column)
}

fn build_edges(defs: &[VarRef], uses_in_order: &[&VarRef]) -> Vec<DefUseEdge> {
    let mut edges = Vec::new();
    for use_ref in uses_in_order {
        let use_key = key(&use_ref.span);
        let mut candidates: Vec<&VarRef> = defs.iter().filter(|d| d.name == use_ref.name && key(&d.span) <= use_key).collect();
        candidates.sort_by_key(|d| key(&d.span));
        for (i, def) in candidates.iter().enumerate() {
            let has_intervening_def = i + 1 < candidates.len();
            edges.push(DefUseEdge {
                variable: use_ref.name.clone(),
                def: (*def).clone(),
                use_: (*use_ref).clone(),
                is_may_reach: !has_intervening_def,
                has_intervening_def,
            });
        }
    }
    edges
}

/// Build the DFG for a single function given its `parameters` and `body`
/// fields (spec.md §4.6). `function_node` is whatever node kind exposes
/// those two fields: `function_declaration`, `function_expression`,
/// `arrow_function`, or `method_definition`.
pub fn build_dfg(function_name: &str, file_path: &str, function_node: Node<'_>) -> DFGInfo {
    let mut builder = DfgBuilder {
        builtins: BuiltinSet::javascript(),
        scope: function_name.to_string(),
        defs: Vec::new(),
        uses: Vec::new(),
        updates: Vec::new(),
        captures: Vec::new(),
        returns: Vec::new(),
        known_names: HashSet::new(),
    };

    if let Some(params) = function_node.child_by_field_name("parameters") {
        for seed in extract_param_seed(params, function_name) {
            builder.known_names.insert(seed.name.clone());
            builder.defs.push(seed);
        }
    }

    if let Some(body) = function_node.child_by_field_name("body") {
        match body.kind() {
            "statement_block" => builder.walk_statements(&statement_children(body)),
            _ => builder.walk_expr(body),
        }
    }

    let mut uses_in_order: Vec<&VarRef> = Vec::new();
    uses_in_order.extend(builder.uses.iter());
    uses_in_order.extend(builder.updates.iter());
    uses_in_order.extend(builder.captures.iter());

    let edges = build_edges(&builder.defs, &uses_in_order);

    DFGInfo::assemble(
        function_name.to_string(),
        file_path.to_string(),
        builder.defs,
        builder.uses,
        builder.updates,
        builder.captures,
        builder.returns,
        edges,
    )
}
