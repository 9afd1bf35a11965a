//! CFG builder (component E, spec.md §4.5).
//!
//! Follows spec.md §9's redesign guidance directly: an explicit builder
//! value owns the block list, edge list, and nesting depth, and recursive
//! descent over statements passes and returns the current predecessor
//! frontier rather than hiding that state on a closure.

use std::collections::HashMap;

use crate::parsing::Node;
use crate::shared::Span;

use super::model::{BlockType, CFGBlock, CFGEdge, CFGInfo, EdgeType};

/// spec.md §4.5 "Variable extraction per block": written identifiers into
/// `defines`, everything else into `uses`, textual callee names into
/// `calls`. Shared with the CFG builder's per-block bookkeeping; the DFG
/// builder (component F) tracks the richer def/use/update/capture model
/// separately over the same syntax.
fn collect_block_vars(node: Node<'_>) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut defines = Vec::new();
    let mut uses = Vec::new();
    let mut calls = Vec::new();
    walk_vars(node, &mut defines, &mut uses, &mut calls);
    uses.retain(|u| !defines.contains(u));
    (defines, uses, calls)
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

fn walk_vars(node: Node<'_>, defines: &mut Vec<String>, uses: &mut Vec<String>, calls: &mut Vec<String>) {
    match node.kind() {
        "variable_declarator" => {
            if let Some(name) = node.child_by_field_name("name") {
                if name.kind() == "identifier" {
                    push_unique(defines, name.text().to_string());
                }
            }
            if let Some(value) = node.child_by_field_name("value") {
                walk_vars(value, defines, uses, calls);
            }
            return;
        }
        "assignment_expression" => {
            if let Some(left) = node.child_by_field_name("left") {
                if left.kind() == "identifier" {
                    push_unique(defines, left.text().to_string());
                } else {
                    walk_vars(left, defines, uses, calls);
                }
            }
            if let Some(right) = node.child_by_field_name("right") {
                walk_vars(right, defines, uses, calls);
            }
            return;
        }
        "call_expression" => {
            if let Some(callee) = node.child_by_field_name("function") {
                match callee.kind() {
                    "identifier" => push_unique(calls, callee.text().to_string()),
                    "member_expression" => {
                        if let Some(p) = callee.child_by_field_name("property") {
                            push_unique(calls, p.text().to_string());
                        }
                        if let Some(o) = callee.child_by_field_name("object") {
                            walk_vars(o, defines, uses, calls);
                        }
                    }
                    _ => walk_vars(callee, defines, uses, calls),
                }
            }
            if let Some(args) = node.child_by_field_name("arguments") {
                walk_vars(args, defines, uses, calls);
            }
            return;
        }
        "identifier" => {
            push_unique(uses, node.text().to_string());
            return;
        }
        // Function/class bodies nested inside a statement get their own CFG
        // (nested_functions); don't pull their internals into this block.
        "arrow_function" | "function_expression" | "function_declaration" | "class_declaration" => {
            return;
        }
        _ => {}
    }
    for child in node.named_children() {
        walk_vars(child, defines, uses, calls);
    }
}

/// Named, non-comment children — spec.md §4.1's "builders tolerate missing
/// children by skipping" applied to statement lists.
fn statement_children(node: Node<'_>) -> Vec<Node<'_>> {
    node.named_children().into_iter().filter(|c| c.kind() != "comment").collect()
}

/// Text and variables for a loop/switch header: every direct child except
/// the `body` field (works uniformly for `for`/`for_in`/`for_of`/`while`,
/// whose only structural difference from each other is what precedes
/// `body`).
fn header_vars_excluding_body(node: Node<'_>) -> (String, Vec<String>, Vec<String>, Vec<String>) {
    let body = node.child_by_field_name("body");
    let mut defines = Vec::new();
    let mut uses = Vec::new();
    let mut calls = Vec::new();
    let mut texts = Vec::new();
    for child in node.children() {
        if let Some(b) = body {
            if child.span() == b.span() {
                continue;
            }
        }
        if matches!(child.kind(), "for" | "while" | "(" | ")" | ";") {
            continue;
        }
        let (d, u, c) = collect_block_vars(child);
        for x in d {
            push_unique(&mut defines, x);
        }
        for x in u {
            push_unique(&mut uses, x);
        }
        for x in c {
            push_unique(&mut calls, x);
        }
        texts.push(child.text().to_string());
    }
    (texts.join(" "), defines, uses, calls)
}

struct CfgBuilder {
    blocks: Vec<CFGBlock>,
    edges: Vec<CFGEdge>,
    decision_points: u32,
    nesting_depth: u32,
    max_nesting_depth: u32,
    continue_stack: Vec<usize>,
    break_stack: Vec<Vec<usize>>,
}

impl CfgBuilder {
    fn new() -> Self {
        Self {
            blocks: Vec::new(),
            edges: Vec::new(),
            decision_points: 0,
            nesting_depth: 0,
            max_nesting_depth: 0,
            continue_stack: Vec::new(),
            break_stack: Vec::new(),
        }
    }

    fn reserve_block(&mut self) -> usize {
        let id = self.blocks.len();
        self.blocks.push(CFGBlock {
            id: id as u32,
            block_type: BlockType::Body,
            lines: (0, 0),
            span: Span::point(0, 0),
            statements: Vec::new(),
            calls: Vec::new(),
            defines: Vec::new(),
            uses: Vec::new(),
        });
        id
    }

    fn fill_block(
        &mut self,
        id: usize,
        block_type: BlockType,
        span: Span,
        text: String,
        vars: (Vec<String>, Vec<String>, Vec<String>),
    ) {
        let block = &mut self.blocks[id];
        block.block_type = block_type;
        block.lines = (span.start_line, span.end_line);
        block.span = span;
        block.statements = if text.is_empty() { Vec::new() } else { vec![text] };
        block.defines = vars.0;
        block.uses = vars.1;
        block.calls = vars.2;
    }

    fn new_block_raw(
        &mut self,
        block_type: BlockType,
        span: Span,
        text: String,
        vars: (Vec<String>, Vec<String>, Vec<String>),
    ) -> usize {
        let id = self.reserve_block();
        self.fill_block(id, block_type, span, text, vars);
        id
    }

    fn new_block_from_node(&mut self, block_type: BlockType, node: Node<'_>) -> usize {
        let vars = collect_block_vars(node);
        self.new_block_raw(block_type, node.span(), node.text().to_string(), vars)
    }

    fn new_header_block(&mut self, block_type: BlockType, node: Node<'_>) -> usize {
        let (text, d, u, c) = header_vars_excluding_body(node);
        self.new_block_raw(block_type, node.span(), text, (d, u, c))
    }

    fn connect(&mut self, from: &[usize], to: usize, edge_type: EdgeType) {
        for &f in from {
            self.edges.push(CFGEdge {
                from: f as u32,
                to: to as u32,
                edge_type,
                condition: None,
                is_back_edge: false,
            });
        }
    }

    fn back_edge(&mut self, from: usize, to: usize, edge_type: EdgeType) {
        self.edges.push(CFGEdge {
            from: from as u32,
            to: to as u32,
            edge_type,
            condition: None,
            is_back_edge: true,
        });
    }

    fn enter_nesting(&mut self) {
        self.nesting_depth += 1;
        self.max_nesting_depth = self.max_nesting_depth.max(self.nesting_depth);
    }

    fn exit_nesting(&mut self) {
        self.nesting_depth -= 1;
    }

    fn process_statements(&mut self, stmts: &[Node<'_>], frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let mut current = frontier;
        let mut edge_type = entry_edge_type;
        for stmt in stmts {
            current = self.process_statement(*stmt, current, edge_type);
            edge_type = EdgeType::Unconditional;
        }
        current
    }

    fn body_statements(node: Node<'_>) -> Vec<Node<'_>> {
        if node.kind() == "statement_block" {
            statement_children(node)
        } else {
            vec![node]
        }
    }

    fn process_statement(&mut self, stmt: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        match stmt.kind() {
            "statement_block" => self.process_statements(&statement_children(stmt), frontier, entry_edge_type),
            "if_statement" => self.process_if(stmt, frontier, entry_edge_type),
            "for_statement" | "for_in_statement" | "for_of_statement" | "while_statement" => {
                self.process_loop(stmt, frontier, entry_edge_type)
            }
            "do_statement" => self.process_do_while(stmt, frontier, entry_edge_type),
            "switch_statement" => self.process_switch(stmt, frontier, entry_edge_type),
            "try_statement" => self.process_try(stmt, frontier, entry_edge_type),
            "return_statement" => self.process_terminal(stmt, frontier, entry_edge_type, BlockType::Return),
            "throw_statement" => self.process_terminal(stmt, frontier, entry_edge_type, BlockType::Throw),
            "break_statement" => {
                self.process_break(stmt, frontier, entry_edge_type);
                Vec::new()
            }
            "continue_statement" => {
                self.process_continue(stmt, frontier, entry_edge_type);
                Vec::new()
            }
            _ => {
                let id = self.new_block_from_node(BlockType::Body, stmt);
                self.connect(&frontier, id, entry_edge_type);
                vec![id]
            }
        }
    }

    fn process_if(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let condition = node.child_by_field_name("condition").unwrap_or(node);
        let branch_id = self.new_block_from_node(BlockType::Branch, condition);
        self.connect(&frontier, branch_id, entry_edge_type);
        self.decision_points += 1;
        self.enter_nesting();

        let mut exits = Vec::new();
        if let Some(consequence) = node.child_by_field_name("consequence") {
            let stmts = Self::body_statements(consequence);
            exits.extend(self.process_statements(&stmts, vec![branch_id], EdgeType::True));
        }

        match node.child_by_field_name("alternative") {
            Some(alt) => {
                if let Some(alt_body) = alt.named_children().into_iter().next() {
                    if alt_body.kind() == "if_statement" {
                        exits.extend(self.process_statement(alt_body, vec![branch_id], EdgeType::False));
                    } else {
                        let stmts = Self::body_statements(alt_body);
                        exits.extend(self.process_statements(&stmts, vec![branch_id], EdgeType::False));
                    }
                }
            }
            None => exits.push(branch_id),
        }

        self.exit_nesting();
        exits
    }

    fn process_loop(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let header_id = self.new_header_block(BlockType::LoopHeader, node);
        self.connect(&frontier, header_id, entry_edge_type);
        self.decision_points += 1;
        self.enter_nesting();
        self.continue_stack.push(header_id);
        self.break_stack.push(Vec::new());

        if let Some(body) = node.child_by_field_name("body") {
            let before = self.blocks.len();
            let stmts = Self::body_statements(body);
            let body_exit = self.process_statements(&stmts, vec![header_id], EdgeType::True);
            if self.blocks.len() > before {
                if let Some(first) = self.blocks.get_mut(before) {
                    if first.block_type == BlockType::Body {
                        first.block_type = BlockType::LoopBody;
                    }
                }
            }
            for exit in body_exit {
                self.back_edge(exit, header_id, EdgeType::BackEdge);
            }
        }

        self.continue_stack.pop();
        let breaks = self.break_stack.pop().unwrap_or_default();
        self.exit_nesting();

        let mut exits = vec![header_id];
        exits.extend(breaks);
        exits
    }

    fn process_do_while(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let header_id = self.reserve_block();
        self.continue_stack.push(header_id);
        self.break_stack.push(Vec::new());
        self.enter_nesting();
        self.decision_points += 1;

        let before = self.blocks.len();
        let body_exit = if let Some(body) = node.child_by_field_name("body") {
            let stmts = Self::body_statements(body);
            self.process_statements(&stmts, frontier, entry_edge_type)
        } else {
            frontier
        };
        let body_entry = (self.blocks.len() > before).then_some(before);

        let (text, d, u, c) = match node.child_by_field_name("condition") {
            Some(cond) => {
                let (d, u, c) = collect_block_vars(cond);
                (cond.text().to_string(), d, u, c)
            }
            None => (String::new(), Vec::new(), Vec::new(), Vec::new()),
        };
        self.fill_block(header_id, BlockType::LoopHeader, node.span(), text, (d, u, c));
        self.connect(&body_exit, header_id, EdgeType::Unconditional);
        if let Some(entry) = body_entry {
            self.back_edge(header_id, entry, EdgeType::BackEdge);
        }

        self.continue_stack.pop();
        let breaks = self.break_stack.pop().unwrap_or_default();
        self.exit_nesting();

        let mut exits = vec![header_id];
        exits.extend(breaks);
        exits
    }

    fn process_switch(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let value = node.child_by_field_name("value");
        let (text, d, u, c) = match value {
            Some(v) => {
                let (d, u, c) = collect_block_vars(v);
                (v.text().to_string(), d, u, c)
            }
            None => (String::new(), Vec::new(), Vec::new(), Vec::new()),
        };
        let branch_id = self.new_block_raw(BlockType::Branch, node.span(), text, (d, u, c));
        self.connect(&frontier, branch_id, entry_edge_type);
        self.decision_points += 1;
        self.enter_nesting();
        self.break_stack.push(Vec::new());

        let mut fallthrough: Vec<usize> = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            for case_node in body.children() {
                if !matches!(case_node.kind(), "switch_case" | "switch_default") {
                    continue;
                }
                self.decision_points += 1;
                let is_default = case_node.kind() == "switch_default";
                let case_value = case_node.child_by_field_name("value");
                let stmts: Vec<Node<'_>> = case_node
                    .children()
                    .into_iter()
                    .filter(|c| {
                        if let Some(v) = case_value {
                            if c.span() == v.span() {
                                return false;
                            }
                        }
                        !matches!(c.kind(), "case" | "default" | ":" | "comment")
                    })
                    .collect();

                let before = self.blocks.len();
                let edge_type = if is_default { EdgeType::Default } else { EdgeType::Case };
                let this_exit = self.process_statements(&stmts, vec![branch_id], edge_type);

                if !fallthrough.is_empty() && self.blocks.len() > before {
                    self.connect(&fallthrough, before, EdgeType::Fallthrough);
                }
                fallthrough = this_exit;
            }
        }

        let breaks = self.break_stack.pop().unwrap_or_default();
        self.exit_nesting();

        let mut exits = breaks;
        exits.extend(fallthrough);
        exits
    }

    fn process_try(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) -> Vec<usize> {
        let mut try_exit = Vec::new();
        let mut try_entry = None;
        if let Some(body) = node.child_by_field_name("body") {
            let before = self.blocks.len();
            try_exit = self.process_statements(&statement_children(body), frontier, entry_edge_type);
            if self.blocks.len() > before {
                self.blocks[before].block_type = BlockType::Try;
                try_entry = Some(before);
            }
        }

        let mut catch_exit = Vec::new();
        if let Some(handler) = node.find_child("catch_clause") {
            if let Some(body) = handler.child_by_field_name("body") {
                let preds: Vec<usize> = try_entry.into_iter().collect();
                let before = self.blocks.len();
                catch_exit = self.process_statements(&statement_children(body), preds, EdgeType::Throw);
                if self.blocks.len() > before {
                    self.blocks[before].block_type = BlockType::Catch;
                }
            }
        }

        if let Some(finalizer) = node.find_child("finally_clause") {
            if let Some(body) = finalizer.child_by_field_name("body") {
                let mut preds = try_exit;
                preds.extend(catch_exit);
                let before = self.blocks.len();
                let finally_exit = self.process_statements(&statement_children(body), preds, EdgeType::Unconditional);
                if self.blocks.len() > before {
                    self.blocks[before].block_type = BlockType::Finally;
                }
                return finally_exit;
            }
        }

        let mut exits = try_exit;
        exits.extend(catch_exit);
        exits
    }

    fn process_terminal(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType, block_type: BlockType) -> Vec<usize> {
        let id = self.new_block_from_node(block_type, node);
        self.connect(&frontier, id, entry_edge_type);
        Vec::new()
    }

    fn process_break(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) {
        let id = self.new_block_from_node(BlockType::Body, node);
        self.connect(&frontier, id, entry_edge_type);
        if let Some(targets) = self.break_stack.last_mut() {
            targets.push(id);
        }
    }

    fn process_continue(&mut self, node: Node<'_>, frontier: Vec<usize>, entry_edge_type: EdgeType) {
        let id = self.new_block_from_node(BlockType::Body, node);
        self.connect(&frontier, id, entry_edge_type);
        if let Some(&header) = self.continue_stack.last() {
            self.back_edge(id, header, EdgeType::Continue);
        }
    }
}

/// spec.md §4.5: build a CFG for one function body. `body` is the
/// function's block or expression node (entry point).
pub fn build_cfg(function_name: &str, file_path: &str, body: Node<'_>) -> CFGInfo {
    let mut builder = CfgBuilder::new();
    let entry_id = builder.new_block_raw(BlockType::Entry, Span::point(body.span().start_line, body.span().start_column), String::new(), (Vec::new(), Vec::new(), Vec::new()));

    let stmts = CfgBuilder::body_statements(body);
    let final_frontier = builder.process_statements(&stmts, vec![entry_id], EdgeType::Unconditional);

    let mut exit_blocks: Vec<usize> = builder
        .blocks
        .iter()
        .filter(|b| matches!(b.block_type, BlockType::Return | BlockType::Throw))
        .map(|b| b.id as usize)
        .collect();

    if !final_frontier.is_empty() {
        let exit_id = builder.new_block_raw(
            BlockType::Exit,
            Span::point(body.span().end_line, body.span().end_column),
            String::new(),
            (Vec::new(), Vec::new(), Vec::new()),
        );
        builder.connect(&final_frontier, exit_id, EdgeType::Unconditional);
        exit_blocks.push(exit_id);
    }

    if exit_blocks.is_empty() {
        let exit_id = builder.new_block_raw(
            BlockType::Exit,
            Span::point(body.span().end_line, body.span().end_column),
            String::new(),
            (Vec::new(), Vec::new(), Vec::new()),
        );
        exit_blocks.push(exit_id);
    }

    let edges = builder.edges.len();
    let blocks = builder.blocks.len();

    CFGInfo {
        function_name: function_name.to_string(),
        file_path: file_path.to_string(),
        blocks: builder.blocks,
        edges: builder.edges,
        entry_block: entry_id as u32,
        exit_blocks: exit_blocks.into_iter().map(|x| x as u32).collect(),
        cyclomatic_complexity: (edges as i64 - blocks as i64 + 2).max(1) as u32,
        max_nesting_depth: builder.max_nesting_depth,
        decision_points: builder.decision_points,
        nested_functions: collect_nested_functions(body, file_path),
    }
}

fn collect_nested_functions(body: Node<'_>, file_path: &str) -> HashMap<String, CFGInfo> {
    let mut out = HashMap::new();
    for child in body.named_children() {
        collect_nested_rec(child, file_path, &mut out);
    }
    out
}

fn collect_nested_rec(node: Node<'_>, file_path: &str, out: &mut HashMap<String, CFGInfo>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" | "function_expression" => {
            let name = node
                .child_by_field_name("name")
                .map(|n| n.text().to_string())
                .unwrap_or_else(|| "anonymous".to_string());
            if let Some(b) = node.child_by_field_name("body") {
                out.insert(name.clone(), build_cfg(&name, file_path, b));
            }
            return;
        }
        "variable_declarator" => {
            if let Some(value) = node.child_by_field_name("value") {
                if matches!(value.kind(), "arrow_function" | "function_expression") {
                    let name = node.child_by_field_name("name").map(|n| n.text().to_string()).unwrap_or_default();
                    if let Some(b) = value.child_by_field_name("body") {
                        out.insert(name.clone(), build_cfg(&name, file_path, b));
                    }
                    return;
                }
            }
        }
        _ => {}
    }
    for child in node.named_children() {
        collect_nested_rec(child, file_path, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::{Language, Parser, TreeSitterParser};

    fn cfg_for(source: &str, function_name: &str) -> CFGInfo {
        let parser = TreeSitterParser::new();
        let tree = parser.parse(source, Language::TypeScript).unwrap();
        let root = tree.root();
        let func = root
            .find_descendant("function_declaration")
            .expect("source should contain a function declaration");
        let body = func.child_by_field_name("body").expect("function has a body");
        build_cfg(function_name, "src/sample.ts", body)
    }

    #[test]
    fn simple_function_has_complexity_one() {
        let cfg = cfg_for("function add(a:number,b:number):number{return a+b;}", "add");
        assert_eq!(cfg.cyclomatic_complexity, 1);
        assert!(cfg.blocks.iter().any(|b| b.block_type == BlockType::Entry));
        assert!(cfg.blocks.iter().any(|b| b.block_type == BlockType::Return));
        assert_eq!(cfg.exit_blocks.len(), 1);
    }

    #[test]
    fn branch_complexity_counts_decision_points() {
        let cfg = cfg_for(
            "function check(x:number){ if(x>0) return 'p'; else if(x<0) return 'n'; else return 'z'; }",
            "check",
        );
        assert_eq!(cfg.decision_points, 2);
        assert!(cfg.cyclomatic_complexity >= 3);
    }

    #[test]
    fn loop_produces_a_back_edge() {
        let cfg = cfg_for(
            "function sum(a:number[]){ let t=0; for(const n of a) t+=n; return t; }",
            "sum",
        );
        assert!(cfg.edges.iter().any(|e| e.is_back_edge));
    }

    #[test]
    fn entry_has_no_incoming_edges() {
        let cfg = cfg_for("function f(){ let x = 1; return x; }", "f");
        assert!(!cfg.edges.iter().any(|e| e.to == cfg.entry_block));
    }

    #[test]
    fn cyclomatic_complexity_matches_formula() {
        let cfg = cfg_for(
            "function f(x:number){ if(x>0){ return 1; } return 0; }",
            "f",
        );
        assert_eq!(cfg.cyclomatic_complexity, cfg.expected_cyclomatic_complexity());
    }
}
