//! Unified error model (spec.md §7).
//!
//! Every layer returns `Result<T, AnalysisError>` instead of panicking.
//! `ParserLoad` is the only variant meant to be fatal to a whole session;
//! everything else is a recoverable value collected alongside partial
//! results (§7 propagation policy).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to initialize parser: {message}")]
    ParserLoad { message: String },

    #[error("unsupported file: {path}")]
    UnsupportedFile { path: PathBuf },

    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("function not found: {qualified_name}")]
    FunctionNotFound { qualified_name: String },

    #[error("slice criterion out of range: line {line} in {function_name}")]
    SliceCriterionOutOfRange { function_name: String, line: u32 },

    #[error("internal invariant violation: {message}")]
    Internal { message: String },
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::ParserLoad { .. } => ErrorKind::ParserLoad,
            AnalysisError::UnsupportedFile { .. } => ErrorKind::UnsupportedFile,
            AnalysisError::Parse { .. } => ErrorKind::Parse,
            AnalysisError::FunctionNotFound { .. } => ErrorKind::FunctionNotFound,
            AnalysisError::SliceCriterionOutOfRange { .. } => ErrorKind::SliceCriterionOutOfRange,
            AnalysisError::Internal { .. } => ErrorKind::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ParserLoad,
    UnsupportedFile,
    Parse,
    FunctionNotFound,
    SliceCriterionOutOfRange,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ParserLoad => "parser_load",
            ErrorKind::UnsupportedFile => "unsupported_file",
            ErrorKind::Parse => "parse",
            ErrorKind::FunctionNotFound => "function_not_found",
            ErrorKind::SliceCriterionOutOfRange => "slice_criterion_out_of_range",
            ErrorKind::Internal => "internal",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = AnalysisError::Parse {
            path: PathBuf::from("a.ts"),
            message: "unexpected token".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("a.ts"));
    }
}
