//! Indented text rendering of a graph frame.

use crate::frame::GraphFrame;
use crate::graph::NodeId;
use std::collections::HashSet;
use std::fmt::Write;

const INDENT: &str = "    ";

/// Render every root's subtree, one node per line, as `<value> <name>`.
///
/// `metric` names a numeric column; HPCToolkit frames show the first
/// process element. Missing values print as `NaN`. A node shared by several
/// parents is printed once per root, under the parent that reaches it first.
///
/// **Public** - used by the read command with `--tree`
pub fn render_tree(frame: &GraphFrame, metric: &str) -> String {
    let mut out = String::new();

    for &root in frame.graph.roots() {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![(root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let node = frame.graph.node(id);
            let value = frame
                .metric(id, metric)
                .map_or_else(|| "NaN".to_string(), |v| format!("{v:.3}"));

            // Writing to a String cannot fail
            let _ = writeln!(out, "{}{} {}", INDENT.repeat(depth), value, node.segment());

            stack.extend(node.children().iter().rev().map(|&child| (child, depth + 1)));
        }
    }

    out
}
