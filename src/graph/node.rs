//! Call graph vertices and their call-path identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a node owned by a [`Graph`](super::Graph).
///
/// Parent and child links are `NodeId`s, never owning pointers, so a node
/// reached through recursion or a shared callee can sit under several parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node in its graph's arena
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Ordered frame names from a root down to a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Callpath(Vec<String>);

impl Callpath {
    /// A single-frame callpath
    pub fn root(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// This callpath extended by one frame
    pub fn child(&self, segment: &str) -> Self {
        let mut frames = Vec::with_capacity(self.0.len() + 1);
        frames.extend(self.0.iter().cloned());
        frames.push(segment.to_string());
        Self(frames)
    }

    pub fn frames(&self) -> &[String] {
        &self.0
    }

    /// The innermost frame
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for Callpath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Callpath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))
    }
}

/// One call graph vertex
#[derive(Debug, Clone)]
pub struct Node {
    /// Frame name this node contributes to its callpath
    segment: String,
    callpath: Callpath,
    parents: Vec<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Create a node whose provisional callpath hangs off `parent_callpath`,
    /// or is just `(segment,)` when there is no parent.
    pub(crate) fn new(segment: String, parent_callpath: Option<&Callpath>) -> Self {
        let callpath = match parent_callpath {
            Some(path) => path.child(&segment),
            None => Callpath::root(segment.clone()),
        };
        Self {
            segment,
            callpath,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn callpath(&self) -> &Callpath {
        &self.callpath
    }

    /// Parents in registration order; the first one drives callpath correction
    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Returns false if `parent` was already registered
    pub(crate) fn add_parent(&mut self, parent: NodeId) -> bool {
        if self.parents.contains(&parent) {
            return false;
        }
        self.parents.push(parent);
        true
    }

    /// Returns false if `child` was already registered
    pub(crate) fn add_child(&mut self, child: NodeId) -> bool {
        if self.children.contains(&child) {
            return false;
        }
        self.children.push(child);
        true
    }

    pub(crate) fn set_callpath(&mut self, callpath: Callpath) {
        self.callpath = callpath;
    }
}
