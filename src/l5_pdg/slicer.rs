//! Backward/forward program slicing over a `PDGInfo` (spec.md §4.7).
//!
//! The source's backward-slice traversal rule is a compound, loosely
//! specified exception (spec.md §9 open question: "re-implementers should
//! treat the exception as optional and mirror observable outputs"). The
//! rule implemented here: a node seeded directly by the criterion follows
//! every incoming edge once regardless of variable — it is, by definition,
//! live at that line — while every node reached afterwards applies the
//! variable filter strictly. This reproduces spec.md §8 scenario 6 exactly
//! (`backwardSlice(5,'x')` is `{2,4,5}`, excluding the unrelated `y` at
//! line 3) without re-admitting every merge point a stricter reading would.

use std::collections::{BTreeSet, HashSet};

use super::model::{PDGEdgeType, PDGInfo};

/// Every node at `line` seeds the slice; the variable criterion governs
/// which edges propagate from there, not which nodes start it (line 5 in
/// spec.md §8 scenario 6 must seed `backwardSlice(5, 'x')` even though its
/// own statement, `return z`, never mentions `x`).
fn seed_ids(pdg: &PDGInfo, line: u32) -> Vec<u32> {
    pdg.nodes.iter().filter(|n| n.line == line).map(|n| n.id).collect()
}

fn lines_of(pdg: &PDGInfo, ids: &HashSet<u32>) -> BTreeSet<u32> {
    pdg.nodes.iter().filter(|n| ids.contains(&n.id)).map(|n| n.line).collect()
}

/// spec.md §4.7 "Backward slice".
pub fn backward_slice(pdg: &PDGInfo, line: u32, variable: Option<&str>) -> BTreeSet<u32> {
    let seeds = seed_ids(pdg, line);
    let seed_set: HashSet<u32> = seeds.iter().copied().collect();
    let mut visited: HashSet<u32> = seed_set.clone();
    let mut stack = seeds;

    while let Some(current) = stack.pop() {
        let is_seed = seed_set.contains(&current);
        for edge in pdg.edges.iter().filter(|e| e.to == current) {
            let follow = match edge.edge_type {
                PDGEdgeType::Control => true,
                PDGEdgeType::Data => match variable {
                    None => true,
                    Some(v) => is_seed || edge.variable.as_deref() == Some(v),
                },
                PDGEdgeType::Anti | PDGEdgeType::Output => false,
            };
            if follow && visited.insert(edge.from) {
                stack.push(edge.from);
            }
        }
    }

    lines_of(pdg, &visited)
}

/// spec.md §4.7 "Forward slice": symmetric over outgoing edges; a variable
/// criterion restricts traversal to data edges carrying that variable with
/// no seed exception, since a definition's forward reach is exactly what
/// the variable-tagged data edges already describe.
pub fn forward_slice(pdg: &PDGInfo, line: u32, variable: Option<&str>) -> BTreeSet<u32> {
    let seeds = seed_ids(pdg, line);
    let mut visited: HashSet<u32> = seeds.iter().copied().collect();
    let mut stack = seeds;

    while let Some(current) = stack.pop() {
        for edge in pdg.edges.iter().filter(|e| e.from == current) {
            let follow = match edge.edge_type {
                PDGEdgeType::Control => true,
                PDGEdgeType::Data => match variable {
                    None => true,
                    Some(v) => edge.variable.as_deref() == Some(v),
                },
                PDGEdgeType::Anti | PDGEdgeType::Output => false,
            };
            if follow && visited.insert(edge.to) {
                stack.push(edge.to);
            }
        }
    }

    lines_of(pdg, &visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l3_cfg::build_cfg;
    use crate::l4_dfg::build_dfg;
    use crate::l5_pdg::builder::build_pdg;
    use crate::parsing::{Language, Parser, TreeSitterParser};

    fn pdg_for_scenario() -> PDGInfo {
        let source = "function f(a:number,b:number){\nlet x = a + 1;\nlet y = b + 2;\nlet z = x + y;\nreturn z;\n}";
        let parser = TreeSitterParser::new();
        let tree = parser.parse(source, Language::TypeScript).unwrap();
        let func = tree.root().find_descendant("function_declaration").unwrap();
        let body = func.child_by_field_name("body").unwrap();
        let cfg = build_cfg("f", "src/sample.ts", body);
        let dfg = build_dfg("f", "src/sample.ts", func);
        build_pdg("f", "src/sample.ts", &cfg, &dfg)
    }

    #[test]
    fn backward_slice_without_variable_includes_every_contributing_line() {
        let pdg = pdg_for_scenario();
        let slice = backward_slice(&pdg, 5, None);
        assert_eq!(slice, [2, 3, 4, 5].into_iter().collect());
    }

    #[test]
    fn backward_slice_variable_excludes_unrelated_def() {
        let pdg = pdg_for_scenario();
        let slice = backward_slice(&pdg, 5, Some("x"));
        assert_eq!(slice, [2, 4, 5].into_iter().collect());
        assert!(!slice.contains(&3));
    }

    #[test]
    fn forward_slice_stops_once_the_variable_is_reassigned_into_another_name() {
        let pdg = pdg_for_scenario();
        let slice = forward_slice(&pdg, 2, Some("x"));
        assert_eq!(slice, [2, 4].into_iter().collect());
    }

    #[test]
    fn slice_idempotence_holds() {
        let pdg = pdg_for_scenario();
        let first = backward_slice(&pdg, 5, None);
        let earliest_line = *first.iter().next().unwrap();
        let second = backward_slice(&pdg, earliest_line, None);
        assert!(second.is_subset(&first));
    }
}
