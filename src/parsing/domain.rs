//! Language-neutral parse-tree adapter (component A, spec.md §4.1).
//!
//! The engine never touches `tree_sitter` types outside this module and
//! `tree_sitter_adapter`. Every higher layer walks a `Node`, which exposes
//! exactly the contract spec.md §4.1 describes: a kind string, the node's
//! source text, its span, and an ordered list of children.

use crate::shared::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
        }
    }
}

/// Read-only view over a single parse-tree node.
///
/// Borrows the underlying `tree_sitter::Tree` and source text for the
/// lifetime of one analysis pass; per spec.md §5's memory discipline, the
/// owning `ParsedTree` (and thus every `Node` into it) is dropped once a
/// layer has produced its value records.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    inner: tree_sitter::Node<'a>,
    source: &'a str,
}

impl<'a> Node<'a> {
    pub(crate) fn new(inner: tree_sitter::Node<'a>, source: &'a str) -> Self {
        Self { inner, source }
    }

    /// The tree-sitter grammar kind string (spec.md §6.1), e.g.
    /// `"function_declaration"`.
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    pub fn span(&self) -> Span {
        let start = self.inner.start_position();
        let end = self.inner.end_position();
        Span::new(
            start.row as u32 + 1,
            start.column as u32,
            end.row as u32 + 1,
            end.column as u32,
        )
    }

    pub fn text(&self) -> &'a str {
        self.inner
            .utf8_text(self.source.as_bytes())
            .unwrap_or_default()
    }

    pub fn is_error(&self) -> bool {
        self.inner.is_error() || self.inner.is_missing()
    }

    /// All children in source order, including comments. Comments are
    /// `extra` nodes in the TypeScript grammar but the L1 extractor needs
    /// them to recover a declaration's leading docstring.
    pub fn children(&self) -> Vec<Node<'a>> {
        let mut cursor = self.inner.walk();
        self.inner
            .children(&mut cursor)
            .map(|c| Node::new(c, self.source))
            .collect()
    }

    pub fn named_children(&self) -> Vec<Node<'a>> {
        let mut cursor = self.inner.walk();
        self.inner
            .named_children(&mut cursor)
            .map(|c| Node::new(c, self.source))
            .collect()
    }

    pub fn child_by_field_name(&self, field: &str) -> Option<Node<'a>> {
        self.inner
            .child_by_field_name(field)
            .map(|c| Node::new(c, self.source))
    }

    /// First child whose `kind()` equals `kind`.
    pub fn find_child(&self, kind: &str) -> Option<Node<'a>> {
        self.children().into_iter().find(|c| c.kind() == kind)
    }

    /// All children whose `kind()` equals `kind`.
    pub fn find_children(&self, kind: &str) -> Vec<Node<'a>> {
        self.children().into_iter().filter(|c| c.kind() == kind).collect()
    }

    /// First descendant (depth-first, including self) whose `kind()`
    /// equals `kind`. Does not cross into nested function bodies, since
    /// callers that need "direct contents only" walk `children()` instead.
    pub fn find_descendant(&self, kind: &str) -> Option<Node<'a>> {
        if self.kind() == kind {
            return Some(*self);
        }
        for child in self.children() {
            if let Some(found) = child.find_descendant(kind) {
                return Some(found);
            }
        }
        None
    }
}
