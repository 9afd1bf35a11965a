//! Orchestration facade (SPEC_FULL.md §2 component L) wiring
//! A→(B,C)→D for the project-wide call graph and A→E→F→G for a single
//! function's CFG/DFG/PDG and slices, so callers don't hand-assemble the
//! individual builders themselves.

use std::collections::BTreeSet;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::l2_call_graph::{build_call_graph_cancellable, get_callers, BuildReport, FunctionLocation, ImpactedCaller};
use crate::l3_cfg::{build_cfg, CFGInfo};
use crate::l4_dfg::{build_dfg, DFGInfo};
use crate::l5_pdg::{backward_slice, build_pdg, forward_slice, PDGInfo};
use crate::parsing::{Node, Parser};
use crate::shared::{AnalysisError, CancellationToken, Result};

pub struct Pipeline<'p> {
    parser: &'p dyn Parser,
    config: AnalysisConfig,
    cancellation: CancellationToken,
}

impl<'p> Pipeline<'p> {
    pub fn new(parser: &'p dyn Parser, config: AnalysisConfig) -> Self {
        Self {
            parser,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// The token checked between files in `build_call_graph` and before
    /// each function analyzed by `analyze_function`. Cloning it and calling
    /// `cancel()` from another thread stops an in-flight build at the next
    /// checkpoint.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// A→(B,C)→D: discover source files, extract L1 module structure and
    /// scan calls per file, resolve and merge into a project-wide L2 call
    /// graph.
    pub fn build_call_graph(&self, project_root: &Path, built_at: impl Into<String>) -> BuildReport {
        build_call_graph_cancellable(
            project_root,
            &self.config.languages,
            self.parser,
            built_at,
            &self.config.exclude_dirs,
            &self.config.exclude_files,
            Some(&self.cancellation),
        )
    }

    /// spec.md §4.4 "Impact query", bounded by `AnalysisConfig::max_impact_depth`
    /// unless `max_depth` overrides it.
    pub fn impact(&self, report: &BuildReport, qualified_name: &str, max_depth: Option<u32>) -> Vec<ImpactedCaller> {
        get_callers(&report.graph, qualified_name, max_depth.unwrap_or(self.config.max_impact_depth))
    }

    /// A→E→F→G for one function: re-read and re-parse its source file,
    /// locate its syntax node, and build CFG, DFG, and PDG in sequence.
    pub fn analyze_function(&self, project_root: &Path, loc: &FunctionLocation) -> Result<(CFGInfo, DFGInfo, PDGInfo)> {
        if self.cancellation.is_cancelled() {
            return Err(AnalysisError::Internal {
                message: format!("analysis of {} cancelled before it started", loc.qualified_name),
            });
        }
        tracing::debug!("analyzing {}", loc.qualified_name);
        let (path, language) = self.resolve_source_file(project_root, &loc.file)?;
        let source = std::fs::read_to_string(&path).map_err(|e| AnalysisError::Internal {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        let tree = self.parser.parse(&source, language)?;
        let root = tree.root();

        let class = class_of(loc);
        let function_node = locate_function_node(root, class.as_deref(), &loc.name).ok_or_else(|| {
            tracing::warn!("could not locate syntax node for {}", loc.qualified_name);
            AnalysisError::FunctionNotFound {
                qualified_name: loc.qualified_name.clone(),
            }
        })?;
        let body = function_node.child_by_field_name("body").ok_or_else(|| AnalysisError::FunctionNotFound {
            qualified_name: loc.qualified_name.clone(),
        })?;

        let cfg = build_cfg(&loc.qualified_name, &loc.file, body);
        let dfg = build_dfg(&loc.qualified_name, &loc.file, function_node);
        let pdg = build_pdg(&loc.qualified_name, &loc.file, &cfg, &dfg);
        Ok((cfg, dfg, pdg))
    }

    /// `FunctionLocation` carries `file` as an extension-stripped module name
    /// (spec.md §3 / GLOSSARY), so the real file has to be recovered by
    /// probing each registered extension in turn. A mixed TS/JS project (the
    /// registry registers both, per spec.md §3's `language` tag) needs this
    /// to resolve `.js`-resident functions, not just `.ts` ones.
    fn resolve_source_file(&self, project_root: &Path, module_name: &str) -> Result<(std::path::PathBuf, crate::parsing::Language)> {
        for ext in self.config.languages.extensions() {
            let candidate = project_root.join(module_name).with_extension(ext);
            if candidate.is_file() {
                let language = self.config.languages.language_for_extension(ext).expect("ext came from the registry itself");
                return Ok((candidate, language));
            }
        }
        Err(AnalysisError::Internal {
            message: format!("no source file found for module {module_name} under {}", project_root.display()),
        })
    }

    pub fn backward_slice(&self, pdg: &PDGInfo, line: u32, variable: Option<&str>) -> BTreeSet<u32> {
        let slice = backward_slice(pdg, line, variable);
        tracing::debug!("backward_slice({line}, {variable:?}) -> {} nodes", slice.len());
        slice
    }

    pub fn forward_slice(&self, pdg: &PDGInfo, line: u32, variable: Option<&str>) -> BTreeSet<u32> {
        let slice = forward_slice(pdg, line, variable);
        tracing::debug!("forward_slice({line}, {variable:?}) -> {} nodes", slice.len());
        slice
    }
}

fn class_of(loc: &FunctionLocation) -> Option<String> {
    let prefix = format!("{}.", loc.file);
    let remainder = loc.qualified_name.strip_prefix(&prefix)?;
    let suffix = format!(".{}", loc.name);
    let class_part = remainder.strip_suffix(&suffix)?;
    if class_part.is_empty() {
        None
    } else {
        Some(class_part.to_string())
    }
}

fn locate_function_node<'a>(root: Node<'a>, class_name: Option<&str>, function_name: &str) -> Option<Node<'a>> {
    match class_name {
        Some(class_name) => locate_method_node(root, class_name, function_name),
        None => locate_top_level_function(root, function_name),
    }
}

fn locate_top_level_function<'a>(root: Node<'a>, function_name: &str) -> Option<Node<'a>> {
    for child in root.children() {
        let declaration = if child.kind() == "export_statement" {
            child.children().into_iter().next_back()
        } else {
            Some(child)
        };
        let Some(declaration) = declaration else { continue };

        if matches!(declaration.kind(), "function_declaration" | "generator_function_declaration")
            && declaration.child_by_field_name("name").map(|n| n.text()) == Some(function_name)
        {
            return Some(declaration);
        }

        if matches!(declaration.kind(), "lexical_declaration" | "variable_declaration") {
            for decl in declaration.named_children() {
                if decl.kind() != "variable_declarator" {
                    continue;
                }
                if decl.child_by_field_name("name").map(|n| n.text()) != Some(function_name) {
                    continue;
                }
                if let Some(value) = decl.child_by_field_name("value") {
                    if matches!(value.kind(), "arrow_function" | "function_expression") {
                        return Some(value);
                    }
                }
            }
        }
    }
    None
}

fn locate_method_node<'a>(root: Node<'a>, class_name: &str, method_name: &str) -> Option<Node<'a>> {
    for child in root.children() {
        let class_node = if child.kind() == "class_declaration" {
            Some(child)
        } else if child.kind() == "export_statement" {
            child.find_child("class_declaration")
        } else {
            None
        };
        let Some(class_node) = class_node else { continue };
        if class_node.child_by_field_name("name").map(|n| n.text()) != Some(class_name) {
            continue;
        }
        let Some(body) = class_node.find_child("class_body") else { continue };
        for member in body.children() {
            if member.kind() == "method_definition" && member.child_by_field_name("name").map(|n| n.text()) == Some(method_name) {
                return Some(member);
            }
        }
    }
    None
}
