use std::collections::HashSet;

use crate::ast::Ast;

/// A back end consumes a checked AST and renders it as target-language
/// source text. Implementations live outside the front end.
pub trait Builder {
    fn build(&mut self, ast: &Ast) -> Result<String, String>;
}

/// The tags attached to a single vertex.
pub type TagSet = HashSet<String>;

/// A vertex predicate as compiled from the predicate algebra.
pub type TagPred = dyn Fn(&TagSet) -> bool;

/// The tagged-graph API that compiled graph operations map onto 1:1. The
/// runtime stores connectivity as an adjacency matrix indexed by vertex
/// insertion order, boolean or weighted depending on graph variant.
pub trait GraphRuntime {
    /// Add `count` vertices, each carrying the given tags.
    fn add_vertices(&mut self, tags: &[String], count: usize);

    /// Remove all vertices whose tag set matches the predicate.
    fn remove_vertices(&mut self, pred: &TagPred);

    /// Connect every pair of vertices matching the two predicates.
    fn connect(&mut self, left: &TagPred, right: &TagPred, weight: f64, bidirectional: bool);

    /// Disconnect every pair of vertices matching the two predicates.
    fn disconnect(&mut self, left: &TagPred, right: &TagPred);

    /// Add tags to all vertices matching the predicate.
    fn add_tags(&mut self, pred: &TagPred, tags: &[String]);

    /// Remove tags from all vertices matching the predicate.
    fn remove_tags(&mut self, pred: &TagPred, tags: &[String]);

    /// Replace one exact tag with another across all vertices. A None
    /// replacement removes the tag.
    fn retag(&mut self, old: &str, new: Option<&str>);
}
