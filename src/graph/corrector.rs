//! Callpath correction.
//!
//! Readers create nodes as soon as a name is first seen, often before the
//! node's real parent is known. Once the whole input is consumed this pass
//! rebuilds every callpath from the roots down.

use super::forest::Graph;
use super::node::NodeId;
use crate::utils::error::GraphError;
use log::debug;

/// Rebuild every callpath reachable from the graph's roots.
///
/// Each non-root node gets `first_parent.callpath ++ (segment,)`. Only the
/// first-registered parent is used when a node has several; the other
/// incoming paths are not represented in the callpath.
///
/// Pre-order traversal corrects a parent before its children, except where a
/// node's first parent is one of its own descendants (recursion). There the
/// parent's callpath at the time of the visit is used as-is.
///
/// # Errors
/// * `GraphError::NoRoots` - nodes exist but none is a root
/// * `GraphError::Unreachable` - some nodes cannot be reached from any root
pub fn correct_callpaths(graph: &mut Graph) -> Result<(), GraphError> {
    graph.check_reachable()?;

    let roots = graph.roots().to_vec();
    let mut corrected = 0usize;

    for root in roots {
        let order: Vec<NodeId> = graph.traverse(root).collect();
        for id in order {
            let node = graph.node(id);
            let Some(&first_parent) = node.parents().first() else {
                continue;
            };
            let callpath = graph.node(first_parent).callpath().child(node.segment());
            graph.set_callpath(id, callpath);
            corrected += 1;
        }
    }

    debug!(
        "Corrected {} callpath(s) across {} root(s)",
        corrected,
        graph.roots().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_corrects_node_created_before_parent() {
        let mut graph = Graph::new();
        // "bar" is seen first as an edge target of "foo", before "main -> foo"
        let foo = graph.add_node("foo", None);
        let bar = graph.add_node("bar", Some(foo));
        let main = graph.add_node("main", None);
        graph.add_edge(main, foo);
        graph.collect_roots();

        correct_callpaths(&mut graph).unwrap();

        assert_eq!(graph.roots(), [main]);
        assert_eq!(graph.node(foo).callpath().frames(), ["main", "foo"]);
        assert_eq!(graph.node(bar).callpath().frames(), ["main", "foo", "bar"]);
    }

    #[test]
    fn test_first_registered_parent_wins() {
        let mut graph = Graph::new();
        let main = graph.add_node("main", None);
        let a = graph.add_node("a", Some(main));
        let b = graph.add_node("b", Some(main));
        let shared = graph.add_node("shared", Some(b));
        graph.add_edge(a, shared);
        graph.collect_roots();

        correct_callpaths(&mut graph).unwrap();

        assert_eq!(
            graph.node(shared).callpath().frames(),
            ["main", "b", "shared"]
        );
    }

    #[test]
    fn test_correction_is_repeatable() {
        let mut graph = Graph::new();
        let main = graph.add_node("main", None);
        let a = graph.add_node("a", Some(main));
        graph.add_node("b", Some(a));
        graph.collect_roots();

        correct_callpaths(&mut graph).unwrap();
        let first: Vec<_> = graph.iter().map(|(_, n)| n.callpath().clone()).collect();
        correct_callpaths(&mut graph).unwrap();
        let second: Vec<_> = graph.iter().map(|(_, n)| n.callpath().clone()).collect();

        assert_eq!(first, second);
    }

    #[test]
    fn test_fails_without_roots() {
        let mut graph = Graph::new();
        let a = graph.add_node("a", None);
        graph.add_edge(a, a);
        graph.collect_roots();

        assert_eq!(correct_callpaths(&mut graph), Err(GraphError::NoRoots));
    }
}
