use byteorder::{BigEndian, WriteBytesExt};
use callpath_graph::commands::{execute_read, InputFormat, ReadArgs};
use callpath_graph::output::{read_report, render_tree, write_report, GraphFrameReport};
use callpath_graph::{GraphFrame, SourceFormat};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

const EXPERIMENT: &str = r#"<?xml version="1.0"?>
<HPCToolkitExperiment version="2.2">
  <SecCallPathProfile i="0" n="app">
    <SecHeader>
      <MetricDBTable><MetricDB i="0" n="cycles"/></MetricDBTable>
      <LoadModuleTable><LoadModule i="1" n="/bin/app"/></LoadModuleTable>
      <FileTable><File i="2" n="src/app.c"/></FileTable>
      <ProcedureTable>
        <Procedure i="3" n="main"/>
        <Procedure i="4" n="work"/>
      </ProcedureTable>
    </SecHeader>
    <SecCallPathProfileData>
      <PF i="1" n="3" f="2" l="5" lm="1">
        <C i="9" l="7">
          <PF i="2" n="4" f="2" l="20" lm="1">
            <S i="3" l="21"/>
          </PF>
        </C>
      </PF>
    </SecCallPathProfileData>
  </SecCallPathProfile>
</HPCToolkitExperiment>
"#;

fn database(pe_count: usize) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("experiment.xml"), EXPERIMENT).unwrap();
    for pe in 0..pe_count {
        let mut bytes = b"HPCPROF-metricdb__02.00b".to_vec();
        bytes.write_i32::<BigEndian>(3).unwrap();
        bytes.write_i32::<BigEndian>(1).unwrap();
        for node in 0..3 {
            bytes.write_f64::<BigEndian>((pe * 10 + node) as f64).unwrap();
        }
        fs::write(dir.path().join(format!("app-{pe:06}.metric-db")), bytes).unwrap();
    }
    dir
}

#[test]
fn test_hpctoolkit_report_round_trip() {
    let db = database(2);
    let frame = GraphFrame::from_hpctoolkit(db.path()).unwrap();
    let report = GraphFrameReport::from_frame(&frame);

    assert_eq!(report.format, SourceFormat::Hpctoolkit);
    assert_eq!(report.nodes.len(), 3);
    assert_eq!(report.rows.len(), 6);
    let ranks: Vec<Option<u32>> = report.rows.iter().map(|r| r.rank).collect();
    assert_eq!(ranks, [Some(0), Some(0), Some(0), Some(1), Some(1), Some(1)]);

    let out = tempfile::tempdir().unwrap();
    let path = out.path().join("report.json");
    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded, report);
    loaded.validate().unwrap();
}

#[test]
fn test_report_node_links() {
    let db = database(1);
    let frame = GraphFrame::from_hpctoolkit(db.path()).unwrap();
    let report = GraphFrameReport::from_frame(&frame);

    let stmt = report
        .nodes
        .iter()
        .find(|n| n.name == "Stmt1@app.c:21")
        .unwrap();
    assert_eq!(
        stmt.callpath.to_string(),
        "main -> work -> Stmt1@app.c:21"
    );
    let parent = &report.nodes[stmt.parents[0].index()];
    assert_eq!(parent.name, "work");
    assert!(parent.children.contains(&stmt.id));
}

#[test]
fn test_tree_shows_first_process_element() {
    let db = database(2);
    let frame = GraphFrame::from_hpctoolkit(db.path()).unwrap();

    assert_eq!(
        render_tree(&frame, "cycles"),
        "0.000 main\n    1.000 work\n        2.000 Stmt1@app.c:21\n"
    );
}

#[test]
fn test_read_command_on_database() {
    let db = database(1);
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("nested").join("report.json");

    let frame = execute_read(ReadArgs {
        input: db.path().to_path_buf(),
        format: InputFormat::Hpctoolkit,
        output_json: Some(output.clone()),
        print_tree: true,
        ..Default::default()
    })
    .unwrap();

    assert_eq!(frame.format, SourceFormat::Hpctoolkit);
    let report = read_report(&output).unwrap();
    assert_eq!(report.columns[0], "cycles");
}
