//! PDG builder (component G, spec.md §4.7). Built from an already-computed
//! CFG and DFG for the same function; one node per CFG block, control edges
//! from predicate blocks, data edges from DFG def-use edges matched back to
//! PDG nodes by line and variable.

use crate::l3_cfg::{BlockType, CFGInfo};
use crate::l4_dfg::DFGInfo;

use super::model::{PDGEdge, PDGEdgeType, PDGInfo, PDGNode, PDGNodeType};

fn classify(cfg: &CFGInfo, block_id: u32, block_type: BlockType) -> PDGNodeType {
    if block_id == cfg.entry_block {
        PDGNodeType::Entry
    } else if cfg.exit_blocks.contains(&block_id) {
        PDGNodeType::Exit
    } else if matches!(block_type, BlockType::Branch | BlockType::LoopHeader) {
        PDGNodeType::Predicate
    } else {
        PDGNodeType::Statement
    }
}

pub fn build_pdg(function_name: &str, file_path: &str, cfg: &CFGInfo, dfg: &DFGInfo) -> PDGInfo {
    let nodes: Vec<PDGNode> = cfg
        .blocks
        .iter()
        .map(|block| PDGNode {
            id: block.id,
            node_type: classify(cfg, block.id, block.block_type),
            line: block.lines.0,
            defines: block.defines.clone(),
            uses: block.uses.clone(),
            statement: block.statements.join(";"),
            cfg_block_id: Some(block.id),
        })
        .collect();

    let mut edges = Vec::new();

    for node in &nodes {
        if node.node_type != PDGNodeType::Predicate {
            continue;
        }
        let mut seen_targets: Vec<u32> = Vec::new();
        for cfg_edge in cfg.edges.iter().filter(|e| e.from == node.id) {
            if seen_targets.contains(&cfg_edge.to) {
                continue;
            }
            seen_targets.push(cfg_edge.to);
            let label = cfg_edge
                .condition
                .clone()
                .unwrap_or_else(|| format!("{:?}", cfg_edge.edge_type).to_lowercase());
            edges.push(PDGEdge {
                from: node.id,
                to: cfg_edge.to,
                edge_type: PDGEdgeType::Control,
                label,
                variable: None,
            });
        }
    }

    for def_use in &dfg.edges {
        let source = nodes.iter().find(|n| n.line == def_use.def.line && n.defines.contains(&def_use.variable));
        let target = nodes.iter().find(|n| n.line == def_use.use_.line && n.uses.contains(&def_use.variable));
        if let (Some(source), Some(target)) = (source, target) {
            if source.id != target.id {
                edges.push(PDGEdge {
                    from: source.id,
                    to: target.id,
                    edge_type: PDGEdgeType::Data,
                    label: format!("{}: {}→{}", def_use.variable, def_use.def.line, def_use.use_.line),
                    variable: Some(def_use.variable.clone()),
                });
            }
        }
    }

    PDGInfo::assemble(
        function_name.to_string(),
        file_path.to_string(),
        nodes,
        edges,
        cfg.entry_block,
        cfg.exit_blocks.clone(),
        cfg.clone(),
        dfg.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::l3_cfg::build_cfg;
    use crate::l4_dfg::build_dfg;
    use crate::parsing::{Language, Parser, TreeSitterParser};

    fn build_for(source: &str) -> PDGInfo {
        let parser = TreeSitterParser::new();
        let tree = parser.parse(source, Language::TypeScript).unwrap();
        let func = tree.root().find_descendant("function_declaration").unwrap();
        let body = func.child_by_field_name("body").unwrap();
        let cfg = build_cfg("f", "src/sample.ts", body);
        let dfg = build_dfg("f", "src/sample.ts", func);
        build_pdg("f", "src/sample.ts", &cfg, &dfg)
    }

    #[test]
    fn data_edges_connect_definitions_to_uses() {
        let pdg = build_for(
            "function f(a:number,b:number){\nlet x = a + 1;\nlet y = b + 2;\nlet z = x + y;\nreturn z;\n}",
        );
        assert!(pdg.edges.iter().any(|e| e.edge_type == PDGEdgeType::Data && e.variable.as_deref() == Some("x")));
        assert!(pdg.edges.iter().any(|e| e.edge_type == PDGEdgeType::Data && e.variable.as_deref() == Some("z")));
    }

    #[test]
    fn branch_produces_control_edges() {
        let pdg = build_for("function f(x:number){ if(x>0){ return 1; } return 0; }");
        assert!(pdg.edges.iter().any(|e| e.edge_type == PDGEdgeType::Control));
        assert!(pdg.nodes.iter().any(|n| n.node_type == PDGNodeType::Predicate));
        assert!(pdg.control_edge_count > 0);
        assert_eq!(pdg.control_edge_count, pdg.edges.iter().filter(|e| e.edge_type == PDGEdgeType::Control).count());
    }

    #[test]
    fn entry_and_exit_nodes_mirror_the_source_cfg() {
        let pdg = build_for("function f(x:number){ if(x>0){ return 1; } return 0; }");
        assert!(pdg.nodes.iter().any(|n| n.id == pdg.entry_node && n.node_type == PDGNodeType::Entry));
        assert!(!pdg.exit_nodes.is_empty());
        for exit_id in &pdg.exit_nodes {
            assert!(pdg.nodes.iter().any(|n| n.id == *exit_id && n.node_type == PDGNodeType::Exit));
        }
    }

    #[test]
    fn holds_the_cfg_and_dfg_it_was_built_from() {
        let pdg = build_for("function f(a:number,b:number){\nlet x = a + 1;\nreturn x;\n}");
        assert_eq!(pdg.cfg.function_name, "f");
        assert_eq!(pdg.dfg.function_name, "f");
        assert_eq!(pdg.data_edge_count, pdg.edges.iter().filter(|e| e.edge_type == PDGEdgeType::Data).count());
        assert!(pdg.nodes.iter().all(|n| n.cfg_block_id == Some(n.id)));
    }
}
