//! Join of per-node records onto metric tables.

use super::table::{MetricTable, RowKey, Value};
use crate::parser::metric_db::MetricStore;
use crate::parser::schema::{DotNodeRecord, HpcNodeRecord};
use crate::utils::config::{
    EXCLUSIVE_TIME_COLUMN, FILE_COLUMN, INCLUSIVE_TIME_COLUMN, LINE_COLUMN, MODULE_COLUMN,
    NAME_COLUMN, NODE_COLUMN, TYPE_COLUMN,
};
use crate::utils::error::HpcError;
use log::debug;

/// One row per gprof2dot node, keyed by node.
///
/// Columns: `module`, `name`, `inc-time`, `exc-time`, `node`.
pub fn join_dot(records: &[DotNodeRecord]) -> MetricTable {
    let columns = [
        MODULE_COLUMN,
        NAME_COLUMN,
        INCLUSIVE_TIME_COLUMN,
        EXCLUSIVE_TIME_COLUMN,
        NODE_COLUMN,
    ];
    let mut table = MetricTable::new(columns.iter().map(|c| c.to_string()).collect());

    for record in records {
        table.push(
            RowKey::node(record.node),
            vec![
                Value::from(record.module.clone()),
                Value::Text(record.name.clone()),
                Value::from(record.inc_time),
                Value::from(record.exc_time),
                Value::Node(record.node),
            ],
        );
    }

    debug!("Joined {} gprof2dot rows", table.len());
    table
}

/// Inner join of the metric store with the call tree records on `nid`.
///
/// Produces one row per (node, process element), keyed by both. Columns are
/// the store's (metrics, `nid`, `rank`) followed by `name`, `type`, `file`,
/// `line`, `module`, `node`.
///
/// # Errors
/// * `HpcError::NidOutOfRange` - a record names a node the store has no rows for
pub fn join_hpctoolkit(
    store: &MetricStore,
    records: &[HpcNodeRecord],
) -> Result<MetricTable, HpcError> {
    let mut columns = store.columns().to_vec();
    columns.extend(
        [
            NAME_COLUMN,
            TYPE_COLUMN,
            FILE_COLUMN,
            LINE_COLUMN,
            MODULE_COLUMN,
            NODE_COLUMN,
        ]
        .iter()
        .map(|c| c.to_string()),
    );
    let mut table = MetricTable::new(columns);
    let metrics = store.metric_count();

    for pe in 0..store.pe_count() {
        for record in records {
            let row = store
                .row_for(record.nid, pe)
                .ok_or(HpcError::NidOutOfRange {
                    nid: record.nid,
                    node_count: store.node_count(),
                })?;

            let mut values: Vec<Value> = row[..metrics].iter().map(|v| Value::Float(*v)).collect();
            values.push(Value::Int(record.nid as i64));
            values.push(Value::Int(pe as i64));
            values.push(Value::Text(record.name.clone()));
            values.push(Value::Text(record.node_type.to_string()));
            values.push(Value::Text(record.file.clone()));
            values.push(Value::Text(record.line.clone()));
            values.push(Value::from(record.module.clone()));
            values.push(Value::Node(record.node));

            table.push(RowKey::ranked(record.node, pe as u32), values);
        }
    }

    debug!(
        "Joined {} HPCToolkit rows ({} nodes x {} PEs)",
        table.len(),
        records.len(),
        store.pe_count()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::parser::schema::NodeType;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Cursor;
    use std::path::Path;

    fn store(node_count: usize, pe_count: usize) -> MetricStore {
        let mut store = MetricStore::new(vec!["time".to_string()], node_count, pe_count).unwrap();
        for pe in 0..pe_count {
            let mut bytes = vec![0u8; 32];
            for node in 0..node_count {
                bytes
                    .write_f64::<BigEndian>((pe * 10 + node) as f64)
                    .unwrap();
            }
            store
                .fill_block(pe, Path::new("test.metric-db"), &mut Cursor::new(bytes))
                .unwrap();
        }
        store
    }

    fn record(graph: &mut Graph, nid: u64, name: &str) -> HpcNodeRecord {
        HpcNodeRecord {
            nid,
            name: name.to_string(),
            node_type: NodeType::ProcedureFrame,
            file: "main.c".to_string(),
            line: "1".to_string(),
            module: Some("app".to_string()),
            node: graph.add_node(name, None),
        }
    }

    #[test]
    fn test_join_hpctoolkit_rows_per_pe() {
        let mut graph = Graph::new();
        let records = vec![record(&mut graph, 1, "main"), record(&mut graph, 2, "solve")];
        let table = join_hpctoolkit(&store(2, 3), &records).unwrap();

        assert_eq!(table.len(), 6);
        assert_eq!(
            table.columns(),
            ["time", "nid", "rank", "name", "type", "file", "line", "module", "node"]
        );
        let key = RowKey::ranked(records[1].node, 2);
        assert_eq!(table.value(&key, "time"), Some(&Value::Float(21.0)));
        assert_eq!(table.value(&key, "nid"), Some(&Value::Int(2)));
        assert_eq!(table.value(&key, "type"), Some(&Value::Text("PF".to_string())));
    }

    #[test]
    fn test_join_hpctoolkit_drops_unreferenced_metric_rows() {
        let mut graph = Graph::new();
        let records = vec![record(&mut graph, 2, "solve")];
        let table = join_hpctoolkit(&store(3, 1), &records).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_join_hpctoolkit_rejects_unknown_nid() {
        let mut graph = Graph::new();
        let records = vec![record(&mut graph, 7, "ghost")];
        let err = join_hpctoolkit(&store(3, 1), &records).unwrap_err();
        assert!(matches!(err, HpcError::NidOutOfRange { nid: 7, node_count: 3 }));
    }

    #[test]
    fn test_join_dot_null_metrics() {
        let mut graph = Graph::new();
        let node = graph.add_node("foo", None);
        let table = join_dot(&[DotNodeRecord {
            module: None,
            name: "foo".to_string(),
            inc_time: None,
            exc_time: None,
            node,
        }]);

        let key = RowKey::node(node);
        assert!(table.value(&key, "inc-time").unwrap().is_null());
        assert_eq!(table.value(&key, "node"), Some(&Value::Node(node)));
    }
}
