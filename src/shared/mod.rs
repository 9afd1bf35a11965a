//! Shared value types used across every layer: spans, the unified error
//! model, content hashing, and the injected built-in identifier filter.

pub mod builtins;
pub mod cancellation;
pub mod error;
pub mod hash;
pub mod span;

pub use builtins::BuiltinSet;
pub use cancellation::CancellationToken;
pub use error::{AnalysisError, ErrorKind, Result};
pub use span::Span;
