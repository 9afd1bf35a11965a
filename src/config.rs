//! Ambient configuration (SPEC_FULL.md §12).
//!
//! A plain value, not global state, mirroring `stage_configs.rs`'s
//! plain-struct-with-defaults shape rather than its full preset/YAML
//! machinery — that machinery belongs to the CLI layer, out of scope per
//! spec.md §1.

use crate::parsing::LanguageRegistry;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// `None` lets `rayon` pick its default (available parallelism).
    pub worker_threads: Option<usize>,
    /// Default bound for `get_callers` (spec.md §4.4's bounded BFS).
    pub max_impact_depth: u32,
    /// Default depth used by slice-exploring callers that don't pass an
    /// explicit bound of their own.
    pub default_slice_depth: u32,
    pub languages: LanguageRegistry,
    /// Directory names skipped on top of spec.md §6.2's built-in table.
    pub exclude_dirs: Vec<String>,
    /// File names skipped on top of spec.md §6.2's built-in table.
    pub exclude_files: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            max_impact_depth: 5,
            default_slice_depth: 10,
            languages: LanguageRegistry::default(),
            exclude_dirs: Vec::new(),
            exclude_files: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_worker_threads(mut self, n: usize) -> Self {
        self.worker_threads = Some(n);
        self
    }

    pub fn with_max_impact_depth(mut self, depth: u32) -> Self {
        self.max_impact_depth = depth;
        self
    }

    pub fn with_default_slice_depth(mut self, depth: u32) -> Self {
        self.default_slice_depth = depth;
        self
    }

    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    pub fn exclude_dir(mut self, name: impl Into<String>) -> Self {
        self.exclude_dirs.push(name.into());
        self
    }

    pub fn exclude_file(mut self, name: impl Into<String>) -> Self {
        self.exclude_files.push(name.into());
        self
    }

    /// Builds the `rayon` pool described by `worker_threads`, falling back
    /// to the global default pool when unset.
    pub fn build_thread_pool(&self) -> crate::shared::Result<Option<rayon::ThreadPool>> {
        match self.worker_threads {
            None => Ok(None),
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map(Some)
                .map_err(|e| crate::shared::AnalysisError::Internal {
                    message: format!("failed to build worker pool: {e}"),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_bounds() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_impact_depth, 5);
        assert!(config.worker_threads.is_none());
    }

    #[test]
    fn builder_methods_compose() {
        let config = AnalysisConfig::default()
            .with_worker_threads(4)
            .with_max_impact_depth(2)
            .exclude_dir("fixtures");
        assert_eq!(config.worker_threads, Some(4));
        assert_eq!(config.max_impact_depth, 2);
        assert_eq!(config.exclude_dirs, vec!["fixtures".to_string()]);
    }
}
