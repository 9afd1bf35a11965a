//! Component A: the parse-tree adapter (spec.md §4.1) plus the file
//! enumeration policy (spec.md §6.2) that component D's builder depends on.

pub mod discovery;
pub mod domain;
pub mod ports;
pub mod tree_sitter_adapter;

pub use discovery::{discover_source_files, discover_source_files_with_excludes, LanguageRegistry};
pub use domain::{Language, Node};
pub use ports::{ParsedTree, Parser};
pub use tree_sitter_adapter::TreeSitterParser;
