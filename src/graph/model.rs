// src/graph/model.rs
//! The directed film graph and its query interface.

use std::collections::{HashMap, HashSet};

use super::node::{Level, Node};
use crate::error::{ReelError, Result};

/// Adjacency-list directed graph keyed by unique node labels.
///
/// Nodes keep insertion order. Edges iterate grouped by source in node
/// order, then by the order the successor was attached.
#[derive(Debug, Clone, Default)]
pub struct FilmGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    succ: Vec<Vec<usize>>,
    pred: Vec<Vec<usize>>,
}

impl FilmGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node, or replaces the level and metadata of the node that
    /// already carries this label. Returns the node's index.
    pub fn upsert(&mut self, node: Node) -> usize {
        if let Some(&idx) = self.index.get(&node.label) {
            if let Some(slot) = self.nodes.get_mut(idx) {
                *slot = node;
            }
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.label.clone(), idx);
        self.nodes.push(node);
        self.succ.push(Vec::new());
        self.pred.push(Vec::new());
        idx
    }

    /// Adds `from -> to` by index. Returns false if the edge already existed.
    pub(crate) fn link(&mut self, from: usize, to: usize) -> bool {
        let Some(out) = self.succ.get_mut(from) else {
            return false;
        };
        if out.contains(&to) {
            return false;
        }
        out.push(to);
        if let Some(incoming) = self.pred.get_mut(to) {
            incoming.push(from);
        }
        true
    }

    /// Adds `from -> to` between two existing labels.
    ///
    /// # Errors
    /// Returns `Invariant` if either label is unknown.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool> {
        let f = self.require(from)?;
        let t = self.require(to)?;
        Ok(self.link(f, t))
    }

    fn require(&self, label: &str) -> Result<usize> {
        self.index
            .get(label)
            .copied()
            .ok_or_else(|| ReelError::Invariant(format!("unknown node '{label}'")))
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    #[must_use]
    pub fn node(&self, label: &str) -> Option<&Node> {
        self.index_of(label).and_then(|i| self.nodes.get(i))
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges as `(source, target)` index pairs in iteration order.
    #[must_use]
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        self.succ
            .iter()
            .enumerate()
            .flat_map(|(from, targets)| targets.iter().map(move |&to| (from, to)))
            .collect()
    }

    /// Edges as node pairs in iteration order.
    pub fn edges(&self) -> impl Iterator<Item = (&Node, &Node)> + '_ {
        self.succ.iter().enumerate().flat_map(move |(from, targets)| {
            targets
                .iter()
                .filter_map(move |&to| Some((self.nodes.get(from)?, self.nodes.get(to)?)))
        })
    }

    /// Direct successors of a label, in attachment order.
    #[must_use]
    pub fn successors(&self, label: &str) -> Vec<&Node> {
        self.neighbours(label, &self.succ)
    }

    /// Direct predecessors of a label.
    #[must_use]
    pub fn predecessors(&self, label: &str) -> Vec<&Node> {
        self.neighbours(label, &self.pred)
    }

    fn neighbours<'a>(&'a self, label: &str, lists: &'a [Vec<usize>]) -> Vec<&'a Node> {
        let Some(idx) = self.index_of(label) else {
            return Vec::new();
        };
        lists
            .get(idx)
            .map(|l| l.iter().filter_map(|&i| self.nodes.get(i)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn successor_indices(&self, idx: usize) -> &[usize] {
        self.succ.get(idx).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn out_degree(&self, label: &str) -> usize {
        self.index_of(label)
            .and_then(|i| self.succ.get(i))
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn in_degree(&self, label: &str) -> usize {
        self.index_of(label)
            .and_then(|i| self.pred.get(i))
            .map_or(0, Vec::len)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.succ.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes at the given level, in insertion order.
    pub fn at_level(&self, level: Level) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(move |n| n.level == level)
    }

    /// The unique root, if the graph has exactly one level-0 node.
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        let mut roots = self.at_level(Level::Root);
        let first = roots.next()?;
        roots.next().is_none().then_some(first)
    }

    /// Verifies the rooted three-level hierarchy shape.
    ///
    /// # Errors
    /// Returns `Invariant` describing the first violation found.
    pub fn check_hierarchy(&self) -> Result<()> {
        let root = self
            .root()
            .ok_or_else(|| ReelError::Invariant("expected exactly one root".into()))?;
        if self.in_degree(&root.label) != 0 {
            return Err(ReelError::Invariant(format!(
                "root '{}' has incoming edges",
                root.label
            )));
        }

        for node in &self.nodes {
            self.check_parentage(node)?;
        }

        for (from, to) in self.edges() {
            check_edge_levels(from, to)?;
        }
        Ok(())
    }

    fn check_parentage(&self, node: &Node) -> Result<()> {
        let parents = self.predecessors(&node.label);
        let expected = match node.level {
            Level::Root => return Ok(()),
            Level::Category => Level::Root,
            Level::Item => Level::Category,
        };
        match parents.as_slice() {
            [parent] if parent.level == expected => Ok(()),
            _ => Err(ReelError::Invariant(format!(
                "{} '{}' must have exactly one {} parent, found {}",
                node.level,
                node.label,
                expected,
                parents.len()
            ))),
        }
    }
}

fn check_edge_levels(from: &Node, to: &Node) -> Result<()> {
    let ok = matches!(
        (from.level, to.level),
        (Level::Root, Level::Category) | (Level::Category, Level::Item)
    );
    if ok {
        Ok(())
    } else {
        Err(ReelError::Invariant(format!(
            "edge {} '{}' -> {} '{}' skips or reverses a level",
            from.level, from.label, to.level, to.label
        )))
    }
}

/// Structural equality: same labelled nodes with equal attributes and the
/// same edge set, regardless of insertion order.
impl PartialEq for FilmGraph {
    fn eq(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let same_nodes = self
            .nodes
            .iter()
            .all(|n| other.node(&n.label).is_some_and(|o| o == n));
        if !same_nodes {
            return false;
        }
        let theirs: HashSet<(&str, &str)> = other
            .edges()
            .map(|(a, b)| (a.label.as_str(), b.label.as_str()))
            .collect();
        self.edges()
            .all(|(a, b)| theirs.contains(&(a.label.as_str(), b.label.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::FilmMeta;

    fn small() -> FilmGraph {
        let mut g = FilmGraph::new();
        let r = g.upsert(Node::root("R"));
        let c = g.upsert(Node::category("C"));
        let i = g.upsert(Node::item("I", FilmMeta::default()));
        g.link(r, c);
        g.link(c, i);
        g
    }

    #[test]
    fn test_upsert_replaces_attributes_in_place() {
        let mut g = small();
        let mut meta = FilmMeta::default();
        meta.budget = 5.0;
        let idx = g.upsert(Node::item("I", meta));
        assert_eq!(idx, 2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.node("I").and_then(|n| n.meta.as_ref()).map(|m| m.budget), Some(5.0));
    }

    #[test]
    fn test_duplicate_edges_are_ignored() {
        let mut g = small();
        assert!(!g.add_edge("R", "C").unwrap());
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn test_valid_hierarchy_passes() {
        assert!(small().check_hierarchy().is_ok());
    }

    #[test]
    fn test_level_skipping_edge_is_rejected() {
        let mut g = small();
        g.upsert(Node::item("J", FilmMeta::default()));
        g.add_edge("R", "J").unwrap();
        assert!(matches!(g.check_hierarchy(), Err(ReelError::Invariant(_))));
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = FilmGraph::new();
        a.upsert(Node::category("X"));
        a.upsert(Node::category("Y"));
        let mut b = FilmGraph::new();
        b.upsert(Node::category("Y"));
        b.upsert(Node::category("X"));
        assert_eq!(a, b);
        b.add_edge("X", "Y").unwrap();
        assert_ne!(a, b);
    }
}
