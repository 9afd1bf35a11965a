//! Parse-tree provider contract (spec.md §4.1, §6.1).

use crate::parsing::domain::{Language, Node};
use crate::shared::Result;

/// A successfully (possibly partially) parsed file.
///
/// Owns the tree-sitter tree and the source text it was built from, so
/// every `Node` borrowed from `root()` stays valid for as long as this
/// value is alive.
pub struct ParsedTree {
    tree: tree_sitter::Tree,
    source: String,
    language: Language,
}

impl ParsedTree {
    pub(crate) fn new(tree: tree_sitter::Tree, source: String, language: Language) -> Self {
        Self {
            tree,
            source,
            language,
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node::new(self.tree.root_node(), &self.source)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// spec.md §4.1: "per-file parse errors produce a tree with a root node
    /// of the same conventions (partial parses are acceptable)".
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Port: an external parser provider (spec.md §6.1's `parse(source,
/// language) -> tree`).
pub trait Parser: Send + Sync {
    fn parse(&self, source: &str, language: Language) -> Result<ParsedTree>;
}
