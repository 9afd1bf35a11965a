//! Bounded transitive impact query (spec.md §4.4 "Impact query").

use std::collections::HashSet;

use super::model::{ImpactedCaller, ProjectCallGraph};

/// Breadth-first walk over `backwardIndex`, visiting each qualified name at
/// most once. `maxDepth` bounds how many hops of indirection are explored;
/// depth 1 is a direct caller of `qualified_name`.
pub fn get_callers(graph: &ProjectCallGraph, qualified_name: &str, max_depth: u32) -> Vec<ImpactedCaller> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(qualified_name.to_string());

    let mut frontier = vec![qualified_name.to_string()];
    let mut out = Vec::new();
    let mut depth = 1;

    while !frontier.is_empty() && depth <= max_depth {
        let mut next_frontier = Vec::new();
        for name in &frontier {
            for edge in graph.backward_edges(name) {
                out.push(ImpactedCaller {
                    edge: edge.clone(),
                    depth,
                });
                if visited.insert(edge.caller.qualified_name.clone()) {
                    next_frontier.push(edge.caller.qualified_name.clone());
                }
            }
        }
        frontier = next_frontier;
        depth += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l2_call_graph::builder::build_call_graph;
    use crate::parsing::{LanguageRegistry, TreeSitterParser};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_transitive_callers_up_to_max_depth() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("chain.ts"),
            "function a() { b(); }\nfunction b() { c(); }\nfunction c() {}",
        )
        .unwrap();

        let parser = TreeSitterParser::new();
        let report = build_call_graph(dir.path(), &LanguageRegistry::default(), &parser, "test");

        let direct = get_callers(&report.graph, "chain.c", 1);
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].edge.caller.qualified_name, "chain.b");
        assert_eq!(direct[0].depth, 1);

        let transitive = get_callers(&report.graph, "chain.c", 2);
        assert!(transitive.iter().any(|c| c.edge.caller.qualified_name == "chain.a" && c.depth == 2));
    }

    #[test]
    fn cycles_terminate_via_visited_set() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("cycle.ts"), "function a() { b(); }\nfunction b() { a(); }").unwrap();
        let parser = TreeSitterParser::new();
        let report = build_call_graph(dir.path(), &LanguageRegistry::default(), &parser, "test");
        let callers = get_callers(&report.graph, "cycle.a", 10);
        assert!(callers.len() < 10);
    }
}
