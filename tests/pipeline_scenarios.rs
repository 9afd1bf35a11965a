//! End-to-end scenarios exercising the full A→E→F→G and A→(B,C)→D paths
//! through `Pipeline`, one file tree at a time.

use std::fs;

use layergraph::config::AnalysisConfig;
use layergraph::l2_call_graph::CallType;
use layergraph::parsing::TreeSitterParser;
use layergraph::Pipeline;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn pipeline(parser: &TreeSitterParser) -> Pipeline<'_> {
    Pipeline::new(parser, AnalysisConfig::default())
}

#[test]
fn simple_function_reports_one_cyclomatic_complexity_and_two_params() {
    let _ = tracing_subscriber::fmt::try_init();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("add.ts"), "function add(a:number,b:number):number{return a+b;}").unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");
    assert!(report.errors.is_empty());

    let loc = report.graph.functions.get("add.add").expect("add should be registered").clone();
    let (cfg, dfg, _pdg) = pipeline.analyze_function(dir.path(), &loc).unwrap();

    assert_eq!(cfg.cyclomatic_complexity, 1);
    assert!(cfg.blocks.iter().any(|b| b.block_type == layergraph::l3_cfg::BlockType::Entry));
    assert!(cfg.blocks.iter().any(|b| b.block_type == layergraph::l3_cfg::BlockType::Return));
    assert_eq!(dfg.defs.len(), 2, "a and b are seeded as parameter defs");
    assert!(dfg.defs.iter().any(|d| d.name == "a"));
    assert!(dfg.defs.iter().any(|d| d.name == "b"));
}

#[test]
fn branch_chain_has_two_decision_points() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("check.ts"),
        "function check(x:number){ if(x>0) return 'p'; else if(x<0) return 'n'; else return 'z'; }",
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");
    let loc = report.graph.functions.get("check.check").unwrap().clone();
    let (cfg, _, _) = pipeline.analyze_function(dir.path(), &loc).unwrap();

    assert_eq!(cfg.decision_points, 2);
    assert!(cfg.cyclomatic_complexity >= 3);
}

#[test]
fn for_of_loop_produces_a_back_edge_and_an_intervening_def() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("sum.ts"),
        "function sum(a:number[]){ let t=0; for(const n of a) t+=n; return t; }",
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");
    let loc = report.graph.functions.get("sum.sum").unwrap().clone();
    let (cfg, dfg, _) = pipeline.analyze_function(dir.path(), &loc).unwrap();

    assert!(cfg.edges.iter().any(|e| e.is_back_edge));
    assert!(dfg.updates.iter().any(|u| u.name == "t"));
    assert!(dfg.edges.iter().any(|e| e.variable == "t" && e.has_intervening_def));
}

#[test]
fn cross_file_call_resolves_to_a_direct_edge() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "export function helper(){}").unwrap();
    fs::write(
        dir.path().join("b.ts"),
        "import {helper} from './a'; function main(){ helper(); }",
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");

    let edge = report
        .graph
        .edges
        .iter()
        .find(|e| e.caller.qualified_name == "b.main")
        .expect("b.main should call helper");
    assert_eq!(edge.callee_location.as_ref().unwrap().qualified_name, "a.helper");
    assert!(!edge.is_dynamic);
}

#[test]
fn ambiguous_helper_across_two_files_is_dynamic() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.ts"), "export function helper(){}").unwrap();
    fs::write(dir.path().join("c.ts"), "export function helper(){}").unwrap();
    fs::write(dir.path().join("d.ts"), "function main(){ helper(); }").unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");

    let edge = report
        .graph
        .edges
        .iter()
        .find(|e| e.caller.qualified_name == "d.main")
        .unwrap();
    assert!(edge.callee_location.is_none());
    assert!(edge.is_dynamic);
    assert_eq!(edge.call_type, CallType::Dynamic);
}

#[test]
fn backward_slice_excludes_the_unrelated_variable() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("f.ts"),
        "function f(a:number,b:number){\nlet x = a + 1;\nlet y = b + 2;\nlet z = x + y;\nreturn z;\n}",
    )
    .unwrap();

    let parser = TreeSitterParser::new();
    let pipeline = pipeline(&parser);
    let report = pipeline.build_call_graph(dir.path(), "test");
    let loc = report.graph.functions.get("f.f").unwrap().clone();
    let (_, _, pdg) = pipeline.analyze_function(dir.path(), &loc).unwrap();

    let full = pipeline.backward_slice(&pdg, 5, None);
    assert_eq!(full, [2, 3, 4, 5].into_iter().collect());

    let narrowed = pipeline.backward_slice(&pdg, 5, Some("x"));
    assert_eq!(narrowed, [2, 4, 5].into_iter().collect());
    assert!(!narrowed.contains(&3));
}
