//! Built-in identifier filter injected into the DFG builder (spec.md §6.3,
//! §9 re-architecture guidance: "Model as an injected set so other language
//! frontends can supply their own.").

/// Identifiers the DFG builder must never record as a `use` (spec.md §6.3).
pub const JS_TS_BUILTINS: &[&str] = &[
    "true", "false", "null", "undefined", "this", "super", "console", "Math", "Object", "Array",
    "String", "Number", "Boolean", "Error", "Promise", "JSON", "Date", "RegExp",
];

/// A set of identifiers excluded from data-flow `use` tracking.
///
/// A thin wrapper rather than a bare slice so call sites read as a named
/// policy (`BuiltinSet::javascript()`) instead of a magic constant, and so a
/// future language frontend can supply `BuiltinSet::custom(&[...])`.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSet {
    names: &'static [&'static str],
}

impl BuiltinSet {
    pub fn javascript() -> Self {
        Self {
            names: JS_TS_BUILTINS,
        }
    }

    pub fn custom(names: &'static [&'static str]) -> Self {
        Self { names }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_known_builtins() {
        let set = BuiltinSet::javascript();
        assert!(set.contains("Math"));
        assert!(set.contains("undefined"));
        assert!(!set.contains("myVariable"));
    }
}
