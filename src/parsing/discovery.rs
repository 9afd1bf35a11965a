//! File enumeration policy (spec.md §6.2).
//!
//! This is deliberately the one place the engine touches the filesystem
//! tree directly; everything above it operates on already-read source
//! text. Treated as a thin, swappable boundary per spec.md §1's "file-tree
//! traversal... is out of scope" — callers that already have a file list
//! from an external front-end can skip this module entirely and hand
//! `(PathBuf, Language)` pairs straight to the call-graph builder.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::parsing::domain::Language;

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    ".next",
    ".nuxt",
    "coverage",
    ".tox",
    "venv",
    ".venv",
    "__pycache__",
    ".cache",
];

const EXCLUDED_FILES: &[&str] = &[".DS_Store", "Thumbs.db", ".gitkeep"];

/// Extension → language table. Per spec.md §6.2, an extension with no
/// working grammar behind it must never appear here.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    entries: Vec<(&'static str, Language)>,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                ("ts", Language::TypeScript),
                ("tsx", Language::TypeScript),
                ("js", Language::JavaScript),
                ("jsx", Language::JavaScript),
                ("mjs", Language::JavaScript),
                ("cjs", Language::JavaScript),
            ],
        }
    }
}

impl LanguageRegistry {
    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        self.entries
            .iter()
            .find(|(e, _)| e.eq_ignore_ascii_case(ext))
            .map(|(_, lang)| *lang)
    }

    /// Every registered extension, in registration order — used by callers
    /// that only know a module name (no extension) and need to probe the
    /// filesystem for the file that produced it.
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(ext, _)| *ext)
    }

    /// `.tsx`/`.jsx` files need the JSX-flavored grammar; everything else
    /// uses the plain grammar (see `TreeSitterParser::grammar_for`).
    pub fn is_jsx_extension(ext: &str) -> bool {
        matches!(ext.to_ascii_lowercase().as_str(), "tsx" | "jsx")
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn is_excluded_dir(path: &Path, extra: &[String]) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| EXCLUDED_DIRS.contains(&n) || extra.iter().any(|e| e == n))
        .unwrap_or(false)
}

/// Recursively walk `root`, applying spec.md §6.2's exclusion rules, and
/// return `(path, language)` pairs sorted by path (spec.md §4.4 step 1:
/// "Sort deterministically by path for reproducibility").
pub fn discover_source_files(root: &Path, registry: &LanguageRegistry) -> Vec<(PathBuf, Language)> {
    discover_source_files_with_excludes(root, registry, &[], &[])
}

/// Same as `discover_source_files`, additionally skipping directory/file
/// names listed in `extra_exclude_dirs`/`extra_exclude_files` on top of the
/// built-in §6.2 tables (`AnalysisConfig`'s overridable exclusion lists).
pub fn discover_source_files_with_excludes(
    root: &Path,
    registry: &LanguageRegistry,
    extra_exclude_dirs: &[String],
    extra_exclude_files: &[String],
) -> Vec<(PathBuf, Language)> {
    let mut found = Vec::new();

    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let path = entry.path();
        if path == root {
            return true;
        }
        if is_hidden(path) {
            return false;
        }
        if entry.file_type().is_dir() && is_excluded_dir(path, extra_exclude_dirs) {
            return false;
        }
        true
    });

    for entry in walker.filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if EXCLUDED_FILES.contains(&file_name) || extra_exclude_files.iter().any(|f| f == file_name) {
            continue;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if let Some(language) = registry.language_for_extension(ext) {
            found.push((path.to_path_buf(), language));
        }
    }

    found.sort_by(|(a, _), (b, _)| a.cmp(b));
    found
}
