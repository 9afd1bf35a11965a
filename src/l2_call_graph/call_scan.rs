//! Per-file call scan (component C, spec.md §4.3).
//!
//! Follows `SimpleCallGraph`'s (`call_graph.rs`) "caller → distinct
//! callees" shape, retargeted to walk a live parse tree instead of taking
//! pre-built edges.

use std::collections::HashMap;

use crate::parsing::Node;

#[derive(Default, Clone)]
struct ScanContext {
    current_function: Option<String>,
    current_class: Option<String>,
}

/// One resolved or dynamic call site. The `caller` → callee-name list spec.md
/// §4.3 describes is `scan_calls(...).values().map(|v| &v.callee)`; this
/// carries the per-site detail the call-graph builder's `CallSite` needs,
/// so the dedup step doesn't throw away line/column/receiver information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCall {
    pub callee: String,
    pub line: u32,
    pub column: u32,
    pub is_method_call: bool,
    pub receiver: Option<String>,
    pub argument_count: usize,
}

/// Returns `caller key -> distinct callees`, in first-seen order (spec.md
/// §4.3: "duplicates per caller MUST be collapsed").
pub fn scan_calls(root: Node<'_>) -> HashMap<String, Vec<RawCall>> {
    let mut calls = HashMap::new();
    walk(root, &ScanContext::default(), &mut calls);
    calls
}

fn walk(node: Node<'_>, ctx: &ScanContext, calls: &mut HashMap<String, Vec<RawCall>>) {
    match node.kind() {
        "class_declaration" => {
            let name = node.child_by_field_name("name").map(|n| n.text().to_string());
            let inner = ScanContext {
                current_function: ctx.current_function.clone(),
                current_class: name,
            };
            for child in node.children() {
                walk(child, &inner, calls);
            }
            return;
        }
        "function_declaration" | "generator_function_declaration" | "method_definition" => {
            let inner = ScanContext {
                current_function: Some(function_key(node, ctx)),
                current_class: ctx.current_class.clone(),
            };
            for child in node.children() {
                walk(child, &inner, calls);
            }
            return;
        }
        "variable_declarator" => {
            if let Some(value) = node.child_by_field_name("value") {
                if matches!(value.kind(), "arrow_function" | "function_expression") {
                    let name = node
                        .child_by_field_name("name")
                        .map(|n| n.text().to_string())
                        .unwrap_or_default();
                    let inner = ScanContext {
                        current_function: Some(name),
                        current_class: ctx.current_class.clone(),
                    };
                    for child in node.children() {
                        walk(child, &inner, calls);
                    }
                    return;
                }
            }
        }
        "call_expression" => {
            if let Some(caller) = &ctx.current_function {
                if let Some(call) = resolve_call(node) {
                    let entry = calls.entry(caller.clone()).or_default();
                    if !entry.iter().any(|c| c.callee == call.callee) {
                        entry.push(call);
                    }
                }
            }
        }
        _ => {}
    }

    for child in node.children() {
        walk(child, ctx, calls);
    }
}

fn function_key(node: Node<'_>, ctx: &ScanContext) -> String {
    let name = node.child_by_field_name("name").map(|n| n.text().to_string()).unwrap_or_default();
    if node.kind() == "method_definition" {
        match &ctx.current_class {
            Some(class) => format!("{class}.{name}"),
            None => name,
        }
    } else {
        name
    }
}

/// spec.md §4.3: identifier text for direct calls, the rightmost
/// `property_identifier` for member calls, `None` (dynamic) for index
/// access, computed properties, or a call of a call.
fn resolve_call(call: Node<'_>) -> Option<RawCall> {
    let callee = call.child_by_field_name("function")?;
    let span = call.span();
    let argument_count = call
        .child_by_field_name("arguments")
        .map(|args| args.named_children().len())
        .unwrap_or(0);

    let (name, is_method_call, receiver) = match callee.kind() {
        "identifier" => (callee.text().to_string(), false, None),
        "member_expression" => {
            let property = callee.child_by_field_name("property")?;
            let receiver = callee.child_by_field_name("object").map(|o| o.text().to_string());
            (property.text().to_string(), true, receiver)
        }
        _ => return None,
    };

    Some(RawCall {
        callee: name,
        line: span.start_line,
        column: span.start_column,
        is_method_call,
        receiver,
        argument_count,
    })
}
