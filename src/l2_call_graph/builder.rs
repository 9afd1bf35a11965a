//! Call-graph builder (component D, spec.md §4.4).
//!
//! Follows `call_graph_builder.rs`'s shape of a project-wide build pass
//! over many files; per-file work here fans out
//! through `rayon` (spec.md §5: "implementations MAY run per-file parse +
//! L1 + call-scan in parallel... results merge under a single-writer
//! policy") while the merge into `ProjectCallGraph` stays single-threaded.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::l1_module::{extract_module, Module};
use crate::parsing::{discover_source_files_with_excludes, Language, LanguageRegistry, Parser};
use crate::shared::{AnalysisError, CancellationToken, Result};

use super::call_scan::{scan_calls, RawCall};
use super::model::{CallEdge, CallSite, CallType, FunctionLocation, ProjectCallGraph};

struct FileAnalysis {
    module_name: String,
    module: Module,
    calls: HashMap<String, Vec<RawCall>>,
}

fn analyze_file(root: &Path, path: &Path, language: Language, parser: &dyn Parser) -> Result<FileAnalysis> {
    let source = std::fs::read_to_string(path)
        .map_err(|e| AnalysisError::Internal {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
    let tree = parser.parse(&source, language)?;
    let file_path = path.to_string_lossy().replace('\\', "/");
    let module = extract_module(&tree, &file_path);
    let calls = scan_calls(tree.root());
    Ok(FileAnalysis {
        module_name: module_name(root, path),
        module,
        calls,
    })
}

/// GLOSSARY: "file path relative to project root with the extension
/// stripped and separators normalised to `/`".
fn module_name(root: &Path, file: &Path) -> String {
    let relative = file.strip_prefix(root).unwrap_or(file);
    relative.with_extension("").to_string_lossy().replace('\\', "/")
}

/// spec.md §7 "Propagation policy": per-file errors are collected and
/// reported alongside the graph rather than aborting the whole build.
pub struct BuildReport {
    pub graph: ProjectCallGraph,
    pub errors: Vec<(PathBuf, AnalysisError)>,
}

pub fn build_call_graph(
    project_root: &Path,
    registry: &LanguageRegistry,
    parser: &dyn Parser,
    built_at: impl Into<String>,
) -> BuildReport {
    build_call_graph_with_excludes(project_root, registry, parser, built_at, &[], &[])
}

/// Same as `build_call_graph`, additionally honoring `AnalysisConfig`'s
/// overridable exclusion lists (SPEC_FULL.md §12) on top of spec.md §6.2's
/// built-in tables.
pub fn build_call_graph_with_excludes(
    project_root: &Path,
    registry: &LanguageRegistry,
    parser: &dyn Parser,
    built_at: impl Into<String>,
    exclude_dirs: &[String],
    exclude_files: &[String],
) -> BuildReport {
    build_call_graph_cancellable(project_root, registry, parser, built_at, exclude_dirs, exclude_files, None)
}

/// Same as `build_call_graph_with_excludes`, additionally honoring a
/// cooperative `CancellationToken` (spec.md §5), checked once per file
/// between files in the merge loop below.
pub fn build_call_graph_cancellable(
    project_root: &Path,
    registry: &LanguageRegistry,
    parser: &dyn Parser,
    built_at: impl Into<String>,
    exclude_dirs: &[String],
    exclude_files: &[String],
    cancellation: Option<&CancellationToken>,
) -> BuildReport {
    let files = discover_source_files_with_excludes(project_root, registry, exclude_dirs, exclude_files);

    let results: Vec<Result<FileAnalysis>> = files
        .par_iter()
        .map(|(path, language)| analyze_file(project_root, path, *language, parser))
        .collect();

    let mut graph = ProjectCallGraph::new(project_root.to_string_lossy().to_string(), built_at.into());
    let mut errors = Vec::new();
    let mut analyses = Vec::new();

    for ((path, _), result) in files.iter().zip(results.into_iter()) {
        match result {
            Ok(analysis) => analyses.push(analysis),
            Err(e) => {
                tracing::warn!("skipping {}: {e}", path.display());
                errors.push((path.clone(), e));
            }
        }
    }
    tracing::debug!("{} files analyzed, {} failed", analyses.len(), errors.len());

    // Pass 1: register every `FunctionLocation` and build the name/file
    // indices (spec.md §4.4 steps 2-4) before any call is resolved.
    let mut name_index: HashMap<String, Vec<FunctionLocation>> = HashMap::new();
    let mut file_index: HashMap<String, HashMap<String, FunctionLocation>> = HashMap::new();

    for analysis in &analyses {
        if cancellation.is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!("build cancelled after {} files", graph.files.len());
            return BuildReport { graph, errors };
        }
        graph.files.push(analysis.module_name.clone());
        let mut local: HashMap<String, FunctionLocation> = HashMap::new();

        for f in &analysis.module.functions {
            let loc = FunctionLocation {
                file: analysis.module_name.clone(),
                name: f.name.clone(),
                qualified_name: FunctionLocation::qualify(&analysis.module_name, None, &f.name),
                line: f.line,
                is_exported: f.is_exported,
            };
            local.entry(f.name.clone()).or_insert_with(|| loc.clone());
            name_index.entry(f.name.clone()).or_default().push(loc.clone());
            graph.functions.insert(loc.qualified_name.clone(), loc);
        }

        for class in &analysis.module.classes {
            for method in &class.methods {
                let short = format!("{}.{}", class.name, method.name);
                let loc = FunctionLocation {
                    file: analysis.module_name.clone(),
                    name: method.name.clone(),
                    qualified_name: FunctionLocation::qualify(&analysis.module_name, Some(&class.name), &method.name),
                    line: method.line,
                    is_exported: class.is_exported,
                };
                local.entry(short.clone()).or_insert_with(|| loc.clone());
                name_index.entry(short).or_default().push(loc.clone());
                graph.functions.insert(loc.qualified_name.clone(), loc);
            }
        }

        file_index.insert(analysis.module_name.clone(), local);
    }

    // Pass 2: resolve every recorded call and emit an edge (spec.md §4.4
    // steps 5-7). Caller keys are processed in sorted order so that edge
    // insertion order — and thus the forward/backward indices — stays
    // deterministic across builds (spec.md §5, §8 item 8).
    for analysis in &analyses {
        let local = &file_index[&analysis.module_name];
        let mut caller_keys: Vec<&String> = analysis.calls.keys().collect();
        caller_keys.sort();

        for caller_key in caller_keys {
            let Some(caller_loc) = local.get(caller_key) else {
                continue;
            };
            for raw in &analysis.calls[caller_key] {
                let resolved = local.get(&raw.callee).cloned().or_else(|| {
                    name_index
                        .get(&raw.callee)
                        .filter(|matches| matches.len() == 1)
                        .map(|matches| matches[0].clone())
                });

                let call_type = match &resolved {
                    None => CallType::Dynamic,
                    Some(_) if raw.is_method_call => CallType::Method,
                    Some(_) => CallType::Direct,
                };

                let edge = CallEdge {
                    caller: caller_loc.clone(),
                    callee: raw.callee.clone(),
                    is_dynamic: resolved.is_none(),
                    callee_location: resolved,
                    call_site: CallSite {
                        file: analysis.module_name.clone(),
                        caller: caller_loc.qualified_name.clone(),
                        line: raw.line,
                        column: raw.column,
                        is_method_call: raw.is_method_call,
                        receiver: raw.receiver.clone(),
                        argument_count: raw.argument_count,
                    },
                    call_type,
                };
                graph.push_edge(edge);
            }
        }
    }

    BuildReport { graph, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::TreeSitterParser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn resolves_cross_file_call() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "export function helper() {}").unwrap();
        fs::write(
            dir.path().join("b.ts"),
            "import {helper} from './a';\nfunction main() { helper(); }",
        )
        .unwrap();

        let parser = TreeSitterParser::new();
        let report = build_call_graph(dir.path(), &LanguageRegistry::default(), &parser, "test");
        assert!(report.errors.is_empty());

        let edge = report
            .graph
            .edges
            .iter()
            .find(|e| e.caller.qualified_name == "b.main")
            .expect("b.main should have a recorded call");
        assert_eq!(
            edge.callee_location.as_ref().map(|l| l.qualified_name.as_str()),
            Some("a.helper")
        );
        assert!(!edge.is_dynamic);
    }

    #[test]
    fn ambiguous_callee_is_marked_dynamic() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "export function helper() {}").unwrap();
        fs::write(dir.path().join("c.ts"), "export function helper() {}").unwrap();
        fs::write(dir.path().join("d.ts"), "function main() { helper(); }").unwrap();

        let parser = TreeSitterParser::new();
        let report = build_call_graph(dir.path(), &LanguageRegistry::default(), &parser, "test");
        let edge = report
            .graph
            .edges
            .iter()
            .find(|e| e.caller.qualified_name == "d.main")
            .expect("d.main should have a recorded call");
        assert!(edge.is_dynamic);
        assert!(edge.callee_location.is_none());
        assert_eq!(edge.call_type, CallType::Dynamic);
    }

    #[test]
    fn every_function_has_a_unique_qualified_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.ts"), "export function helper() {}\nfunction helper2() {}").unwrap();
        let parser = TreeSitterParser::new();
        let report = build_call_graph(dir.path(), &LanguageRegistry::default(), &parser, "test");
        let mut names: Vec<_> = report.graph.functions.keys().cloned().collect();
        let before = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), before);
    }
}
