//! Property tests for the universal invariants (spec.md §8) that hold over
//! a randomly generated slice of the surface syntax rather than one fixed
//! example.

use std::fs;

use layergraph::config::AnalysisConfig;
use layergraph::parsing::TreeSitterParser;
use layergraph::Pipeline;
use proptest::prelude::*;
use tempfile::tempdir;

/// A small grammar of well-formed function bodies, generated so every
/// variable is both defined and consumed — `name` ranges over three fixed
/// identifiers to keep shrinking readable.
fn function_source() -> impl Strategy<Value = String> {
    prop::collection::vec(1u32..=9, 1..6).prop_map(|ops| {
        let mut body = String::from("function gen(a:number,b:number):number{\n");
        body.push_str("let acc = a + b;\n");
        for op in ops {
            match op % 3 {
                0 => body.push_str("acc = acc + a;\n"),
                1 => body.push_str("if (acc > 0) { acc = acc - 1; }\n"),
                _ => body.push_str("acc = acc + b;\n"),
            }
        }
        body.push_str("return acc;\n}");
        body
    })
}

/// A chain of `n` top-level functions, each calling the one before it, used
/// to exercise the call graph's forward/backward indices over a varying
/// number of functions and edges.
fn call_chain_source() -> impl Strategy<Value = (usize, String)> {
    (2usize..6).prop_map(|n| {
        let mut body = String::from("function fn0(){ return 0; }\n");
        for i in 1..n {
            body.push_str(&format!("function fn{i}(){{ return fn{}(); }}\n", i - 1));
        }
        (n, body)
    })
}

proptest! {
    /// Invariant 2: every edge index position is reachable from the index
    /// that claims it, and no two functions share a qualified name.
    #[test]
    fn call_graph_indices_stay_consistent((n, source) in call_chain_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("chain.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let report = pipeline.build_call_graph(dir.path(), "test");
        let graph = &report.graph;

        prop_assert_eq!(graph.functions.len(), n);

        for (idx, edge) in graph.edges.iter().enumerate() {
            let forward = graph.forward_index.get(&edge.caller.qualified_name);
            prop_assert!(forward.is_some_and(|positions| positions.contains(&idx)));
            if let Some(callee) = &edge.callee_location {
                let backward = graph.backward_index.get(&callee.qualified_name);
                prop_assert!(backward.is_some_and(|positions| positions.contains(&idx)));
            }
        }

        let mut names: Vec<&String> = graph.functions.keys().collect();
        let before = names.len();
        names.sort();
        names.dedup();
        prop_assert_eq!(names.len(), before);
    }

    /// Invariant 3: cyclomatic complexity always matches the edge/block formula.
    #[test]
    fn cyclomatic_complexity_matches_formula(source in function_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gen.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let report = pipeline.build_call_graph(dir.path(), "test");
        let loc = report.graph.functions.get("gen.gen").unwrap().clone();
        let (cfg, _, _) = pipeline.analyze_function(dir.path(), &loc).unwrap();

        prop_assert_eq!(cfg.cyclomatic_complexity, cfg.expected_cyclomatic_complexity());
        prop_assert!(cfg.edges.iter().all(|e| e.to != cfg.entry_block));
        for exit in &cfg.exit_blocks {
            prop_assert!(cfg.edges.iter().all(|e| e.from != *exit));
        }
    }

    /// Invariant 4: every def-use edge keeps `def.line <= use.line`.
    #[test]
    fn def_use_edges_never_point_backward(source in function_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gen.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let report = pipeline.build_call_graph(dir.path(), "test");
        let loc = report.graph.functions.get("gen.gen").unwrap().clone();
        let (_, dfg, _) = pipeline.analyze_function(dir.path(), &loc).unwrap();

        for edge in &dfg.edges {
            prop_assert!(edge.def.line <= edge.use_.line);
        }
    }

    /// Invariant 5: every PDG data edge's variable is in the source's
    /// `defines` and the target's `uses`.
    #[test]
    fn pdg_data_edges_respect_defines_and_uses(source in function_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gen.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let report = pipeline.build_call_graph(dir.path(), "test");
        let loc = report.graph.functions.get("gen.gen").unwrap().clone();
        let (_, _, pdg) = pipeline.analyze_function(dir.path(), &loc).unwrap();

        use layergraph::l5_pdg::PDGEdgeType;
        for edge in &pdg.edges {
            if edge.edge_type == PDGEdgeType::Data {
                let variable = edge.variable.as_ref().expect("data edges always carry a variable");
                let source_node = pdg.nodes.iter().find(|n| n.id == edge.from).unwrap();
                let target_node = pdg.nodes.iter().find(|n| n.id == edge.to).unwrap();
                prop_assert!(source_node.defines.contains(variable));
                prop_assert!(target_node.uses.contains(variable));
            }
        }
    }

    /// Invariant 6: re-slicing from any line in a backward slice yields a subset.
    #[test]
    fn slice_idempotence_holds(source in function_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gen.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let report = pipeline.build_call_graph(dir.path(), "test");
        let loc = report.graph.functions.get("gen.gen").unwrap().clone();
        let (_, _, pdg) = pipeline.analyze_function(dir.path(), &loc).unwrap();

        let last_line = pdg.nodes.iter().map(|n| n.line).max().unwrap_or(1);
        let first = pipeline.backward_slice(&pdg, last_line, None);
        if let Some(&any_line) = first.iter().next() {
            let second = pipeline.backward_slice(&pdg, any_line, None);
            prop_assert!(second.is_subset(&first));
        }
    }

    /// Invariant 8: two builds over identical source produce byte-equal
    /// serialisations of the call graph.
    #[test]
    fn call_graph_build_is_deterministic(source in function_source()) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("gen.ts"), &source).unwrap();

        let parser = TreeSitterParser::new();
        let pipeline = Pipeline::new(&parser, AnalysisConfig::default());
        let first = pipeline.build_call_graph(dir.path(), "test");
        let second = pipeline.build_call_graph(dir.path(), "test");

        let first_json = serde_json::to_string(&first.graph).unwrap();
        let second_json = serde_json::to_string(&second.graph).unwrap();
        prop_assert_eq!(first_json, second_json);
    }
}
