//! The call graph forest.
//!
//! A [`Graph`] is an arena: it owns every node ever created during a read,
//! and nodes refer to each other only through [`NodeId`] handles. Nodes are
//! never removed, only relabeled by callpath correction.

use super::node::{Callpath, Node, NodeId};
use crate::utils::error::GraphError;
use std::collections::HashSet;

/// Arena of call graph nodes plus the list of roots
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node.
    ///
    /// With a parent, the provisional callpath is `parent.callpath ++ (segment,)`
    /// and the parent/child link is registered both ways. Without one the node
    /// is a tentative root with callpath `(segment,)`.
    pub fn add_node(&mut self, segment: impl Into<String>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let parent_callpath = parent.map(|p| self.nodes[p.0].callpath());
        let node = Node::new(segment.into(), parent_callpath);
        self.nodes.push(node);

        if let Some(parent) = parent {
            self.add_edge(parent, id);
        }
        id
    }

    /// Register `parent -> child`. Repeating an edge changes nothing.
    ///
    /// Callpaths are not touched; that is left to
    /// [`correct_callpaths`](super::correct_callpaths).
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].add_parent(parent);
        self.nodes[parent.0].add_child(child);
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Look up a handle that may come from another graph
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn set_callpath(&mut self, id: NodeId, callpath: Callpath) {
        self.nodes[id.0].set_callpath(callpath);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Recompute the root list: every node without parents, in creation order
    pub fn collect_roots(&mut self) -> &[NodeId] {
        self.roots = self
            .iter()
            .filter(|(_, node)| node.is_root())
            .map(|(id, _)| id)
            .collect();
        &self.roots
    }

    /// Depth-first, pre-order walk from `start`.
    ///
    /// Children are visited in registration order. A node reachable along
    /// several paths is yielded once per walk, so recursion cannot loop.
    pub fn traverse(&self, start: NodeId) -> Traverse<'_> {
        Traverse {
            graph: self,
            stack: vec![start],
            visited: HashSet::new(),
        }
    }

    /// Fail if any node cannot be reached from the root list
    pub fn check_reachable(&self) -> Result<(), GraphError> {
        if self.roots.is_empty() && !self.nodes.is_empty() {
            return Err(GraphError::NoRoots);
        }

        let mut reached = vec![false; self.nodes.len()];
        for &root in &self.roots {
            for id in self.traverse(root) {
                reached[id.0] = true;
            }
        }

        let stranded: Vec<String> = reached
            .iter()
            .enumerate()
            .filter(|(_, seen)| !**seen)
            .map(|(i, _)| self.nodes[i].segment().to_string())
            .collect();

        if stranded.is_empty() {
            Ok(())
        } else {
            Err(GraphError::Unreachable(stranded))
        }
    }
}

/// Iterator returned by [`Graph::traverse`]
pub struct Traverse<'a> {
    graph: &'a Graph,
    stack: Vec<NodeId>,
    visited: HashSet<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        while let Some(id) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            // Reverse so the first-registered child is popped first
            self.stack
                .extend(self.graph.node(id).children().iter().rev().copied());
            return Some(id);
        }
        None
    }
}
