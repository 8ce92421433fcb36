use callpath_graph::graph::{Graph, NodeId};
use callpath_graph::parser::parse_gprof_dot;
use callpath_graph::utils::error::{DotError, GraphError};
use callpath_graph::{GraphFrame, RowKey, Value};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use tempfile::NamedTempFile;

const MAIN: &str = "\t\"main\" [color=\"#ff3300\", label=\"prog\\nmain\\n50.0%\\n(10.0%)\\n1×\"];";
const FOO: &str = "\t\"foo\" [color=\"#0033ff\", label=\"prog\\nfoo\\n30.0%\\n(20.0%)\\n2×\"];";
const BAR: &str = "\t\"bar\" [color=\"#0033ff\", label=\"libm.so\\nbar\\n15.0%\\n(15.0%)\\n4×\"];";
const MAIN_FOO: &str = "\t\"main\" -> \"foo\" [arrowsize=\"0.35\", label=\"30.0%\\n2×\"];";
const FOO_BAR: &str = "\t\"foo\" -> \"bar\" [arrowsize=\"0.35\", label=\"15.0%\\n4×\"];";

fn dot(lines: &[&str]) -> String {
    let mut text = String::from("digraph {\n\tgraph [fontname=Arial, nodesep=0.125];\n");
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("}\n");
    text
}

fn frame(lines: &[&str]) -> GraphFrame {
    GraphFrame::from_gprof_dot_reader(dot(lines).as_bytes()).unwrap()
}

/// Callpath -> (child callpaths, inclusive time); independent of node ids
fn shape(frame: &GraphFrame) -> BTreeMap<String, (BTreeSet<String>, Option<f64>)> {
    let graph = &frame.graph;
    graph
        .iter()
        .map(|(id, node)| {
            let children = node
                .children()
                .iter()
                .map(|&c| graph.node(c).callpath().to_string())
                .collect();
            (
                node.callpath().to_string(),
                (children, frame.metric(id, "inc-time")),
            )
        })
        .collect()
}

fn assert_roots_complete(graph: &Graph) {
    let roots: BTreeSet<NodeId> = graph.roots().iter().copied().collect();
    for (id, node) in graph.iter() {
        assert_eq!(node.parents().is_empty(), roots.contains(&id));
    }
    let reached: BTreeSet<NodeId> = roots.iter().flat_map(|&r| graph.traverse(r)).collect();
    assert_eq!(reached.len(), graph.len());
}

fn assert_callpaths_follow_first_parent(graph: &Graph) {
    for (_, node) in graph.iter() {
        if let Some(&parent) = node.parents().first() {
            let expected = graph.node(parent).callpath().child(node.segment());
            assert_eq!(node.callpath(), &expected);
        }
    }
}

#[test]
fn test_worked_example() {
    let frame = frame(&[MAIN, MAIN_FOO]);
    let graph = &frame.graph;

    assert_eq!(graph.roots().len(), 1);
    let root = graph.node(graph.roots()[0]);
    assert_eq!(root.callpath().frames(), ["main"]);

    let foo = graph.node(root.children()[0]);
    assert_eq!(foo.callpath().frames(), ["main", "foo"]);

    let main = frame.find("main")[0];
    assert_eq!(frame.metric(main, "inc-time"), Some(50.0));
    assert_eq!(frame.metric(main, "exc-time"), Some(10.0));
    assert_eq!(
        frame.table.value(&RowKey::node(main), "module"),
        Some(&Value::Text("prog".to_string()))
    );
}

#[test]
fn test_order_independence() {
    let declared_first = frame(&[MAIN, FOO, BAR, MAIN_FOO, FOO_BAR]);
    let edges_first = frame(&[FOO_BAR, MAIN_FOO, BAR, FOO, MAIN]);
    let interleaved = frame(&[FOO, FOO_BAR, MAIN, BAR, MAIN_FOO]);

    assert_eq!(shape(&declared_first), shape(&edges_first));
    assert_eq!(shape(&declared_first), shape(&interleaved));
    assert!(shape(&edges_first).contains_key("main -> foo -> bar"));
}

#[test]
fn test_edges_before_parent_known() {
    // "foo" is created as a root by the first edge and later gains a parent
    let frame = frame(&[FOO_BAR, MAIN_FOO]);
    let graph = &frame.graph;

    assert_eq!(graph.roots().len(), 1);
    assert_roots_complete(graph);
    assert_callpaths_follow_first_parent(graph);

    let bar = frame.find("bar")[0];
    assert_eq!(graph.node(bar).callpath().frames(), ["main", "foo", "bar"]);
}

#[test]
fn test_duplicate_edges_are_idempotent() {
    let once = frame(&[MAIN_FOO]);
    let twice = frame(&[MAIN_FOO, MAIN_FOO, MAIN_FOO]);

    for frame in [&once, &twice] {
        let foo = frame.find("foo")[0];
        let main = frame.find("main")[0];
        assert_eq!(frame.graph.node(foo).parents(), [main]);
        assert_eq!(frame.graph.node(main).children(), [foo]);
    }
    assert_eq!(shape(&once), shape(&twice));
}

#[test]
fn test_shared_callee_takes_first_parent() {
    let frame = frame(&[
        MAIN_FOO,
        "\t\"main\" -> \"baz\" [label=\"5.0%\\n1×\"];",
        "\t\"baz\" -> \"bar\" [label=\"1.0%\\n1×\"];",
        FOO_BAR,
    ]);
    let graph = &frame.graph;

    let bar = frame.find("bar")[0];
    assert_eq!(graph.node(bar).parents().len(), 2);
    assert_eq!(graph.node(bar).callpath().frames(), ["main", "baz", "bar"]);
    assert_callpaths_follow_first_parent(graph);
    assert_roots_complete(graph);
}

#[test]
fn test_recursion_does_not_loop() {
    let frame = frame(&[
        MAIN_FOO,
        "\t\"foo\" -> \"foo\" [label=\"10.0%\\n8×\"];",
    ]);
    let foo = frame.find("foo")[0];

    assert_eq!(frame.graph.node(foo).parents().len(), 2);
    assert_eq!(frame.graph.node(foo).callpath().frames(), ["main", "foo"]);
    assert_eq!(frame.graph.traverse(frame.graph.roots()[0]).count(), 2);
}

#[test]
fn test_pure_cycle_is_fatal() {
    let text = dot(&[
        "\t\"a\" -> \"b\" [label=\"1.0%\\n1×\"];",
        "\t\"b\" -> \"a\" [label=\"1.0%\\n1×\"];",
    ]);
    let err = parse_gprof_dot(text.as_bytes()).unwrap_err();
    assert!(matches!(err, DotError::Graph(GraphError::NoRoots)));
}

#[test]
fn test_malformed_records_are_skipped() {
    let text = dot(&[
        MAIN,
        "\t\"foo\" [label=\"prog\\nfoo\\nn/a\\n(20.0%)\\n2×\"];",
        "\t\"lost\" [label=\"prog\\nlost\\n1×\"];",
        MAIN_FOO,
        "this line is neither a node nor an edge",
    ]);
    let dot = parse_gprof_dot(text.as_bytes()).unwrap();

    assert_eq!(dot.stats.skipped.len(), 2);
    assert_eq!(dot.stats.nodes, 1);
    assert_eq!(dot.stats.edges, 1);
    // "foo" still exists through the edge, "lost" never appears
    assert_eq!(dot.graph.len(), 2);

    let foo = dot.records.iter().find(|r| r.name == "foo").unwrap();
    assert_eq!(foo.inc_time, None);
    assert_eq!(foo.module, None);
}

#[test]
fn test_join_has_one_row_per_node() {
    let frame = frame(&[MAIN, FOO_BAR, MAIN_FOO, "\t\"bar\" -> \"qux\" [label=\"1.0%\\n1×\"];"]);

    assert_eq!(frame.table.len(), frame.graph.len());
    for (id, _) in frame.graph.iter() {
        let row = frame.table.get(&RowKey::node(id)).unwrap();
        assert_eq!(row.values().last(), Some(&Value::Node(id)));
    }
    assert_eq!(
        frame.table.columns(),
        ["module", "name", "inc-time", "exc-time", "node"]
    );
}

#[test]
fn test_invalid_utf8_only_affects_its_line() {
    let mut bytes = dot(&[MAIN, MAIN_FOO]).into_bytes();
    bytes.extend_from_slice(b"\t\"\xff\xfe\" -> \"foo\" [label=\"1%\\n1\xd7\"];\n");

    let frame = GraphFrame::from_gprof_dot_reader(bytes.as_slice()).unwrap();
    assert_eq!(frame.graph.len(), 2);
}

#[test]
fn test_read_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(dot(&[MAIN, FOO, MAIN_FOO]).as_bytes()).unwrap();

    let frame = GraphFrame::from_gprof_dot(file.path()).unwrap();
    assert_eq!(frame.graph.len(), 2);

    let phases: Vec<&str> = frame
        .timer()
        .phases()
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();
    assert_eq!(phases, ["graph construction", "data frame"]);
}

#[test]
fn test_missing_file() {
    let err = GraphFrame::from_gprof_dot("/nonexistent/callgraph.dot").unwrap_err();
    assert!(matches!(err, DotError::Io { .. }));
}
