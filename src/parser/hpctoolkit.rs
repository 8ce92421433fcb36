//! Reader for HPCToolkit experiment databases.
//!
//! A database directory holds one `experiment.xml` and one `*.metric-db`
//! file per process element. The XML call path profile is walked depth-first
//! into a call graph; the binary files are decoded separately and joined
//! later on the node id (`nid`).
//!
//! Element tags of the call path profile:
//!
//! | Tag | Callpath segment | Node created |
//! |---|---|---|
//! | `PF`, `Pr` | procedure name | yes, unless a `Pr` name is empty |
//! | `L` | `Loop@<file basename>:<line>` | yes |
//! | `S` | `Stmt<n>@<file basename>:<line>` | yes |
//! | `C` and anything else | - | no, children attach to the enclosing node |
//! | `M` | metric value, ignored | no |
//!
//! Any missing id, table section or attribute aborts the whole read.

use super::experiment::{attribute, find_section, LookupTables, Table};
use super::schema::{HpcNodeRecord, NodeType};
use crate::graph::{correct_callpaths, Graph, NodeId};
use crate::utils::config::{EXPERIMENT_FILE, FIRST_STATEMENT_NUMBER};
use crate::utils::error::HpcError;
use log::debug;
use roxmltree::{Document, Node};
use std::path::Path;

/// Call graph and node records of one call path profile
#[derive(Debug, Clone)]
pub struct CallTree {
    pub graph: Graph,
    /// One record per created node, in walk order
    pub records: Vec<HpcNodeRecord>,
}

/// Read `experiment.xml` from a database directory
pub fn load_experiment(dir: &Path) -> Result<String, HpcError> {
    let path = dir.join(EXPERIMENT_FILE);
    debug!("Reading experiment document: {}", path.display());
    std::fs::read_to_string(&path).map_err(|source| HpcError::Io { path, source })
}

/// Walk the call path profile of a parsed document into a call graph
///
/// # Errors
/// * `HpcError::MissingSection` - no `SecCallPathProfileData`
/// * `HpcError::MissingRoot` - no top-level `PF` element
/// * `HpcError::UnknownId` / `HpcError::MissingAttribute` - unresolvable element
pub fn build_tree(doc: &Document<'_>, tables: &LookupTables) -> Result<CallTree, HpcError> {
    let profile = find_section(doc, "SecCallPathProfileData")?;
    let root = profile
        .children()
        .find(|n| n.has_tag_name("PF"))
        .ok_or(HpcError::MissingRoot)?;

    let mut walk = TreeWalk::new(tables);
    walk.walk_root(root)?;

    let TreeWalk {
        mut graph, records, ..
    } = walk;
    graph.collect_roots();
    correct_callpaths(&mut graph)?;

    debug!(
        "Built call tree: {} nodes, {} statements",
        graph.len(),
        records
            .iter()
            .filter(|r| r.node_type == NodeType::Statement)
            .count()
    );
    Ok(CallTree { graph, records })
}

/// Last component of a `/`-separated path
fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

/// Attributes shared by `PF` and `Pr` elements, resolved through the tables
struct ProcedureAttrs<'t, 'a> {
    name: &'t str,
    file: &'t str,
    line: &'a str,
    module: &'t str,
}

/// Mutable state of one depth-first walk.
///
/// The statement counter lives here, not in a global, so every read numbers
/// its statements from the start and reads can run side by side.
///
/// `file` is the source file most recently named by a `PF`, `Pr` or `L` in
/// document order. It is never restored on the way back up, so a statement
/// that follows a closed loop or procedure keeps that element's file.
struct TreeWalk<'t> {
    tables: &'t LookupTables,
    graph: Graph,
    records: Vec<HpcNodeRecord>,
    next_statement: u64,
    file: &'t str,
}

impl<'t> TreeWalk<'t> {
    fn new(tables: &'t LookupTables) -> Self {
        Self {
            tables,
            graph: Graph::new(),
            records: Vec::new(),
            next_statement: FIRST_STATEMENT_NUMBER,
            file: "",
        }
    }

    fn walk_root(&mut self, pf: Node<'_, '_>) -> Result<(), HpcError> {
        let attrs = self.procedure_attrs(pf)?;
        self.file = attrs.file;

        let nid = nid(pf)?;
        let id = self.graph.add_node(attrs.name, None);
        self.records.push(HpcNodeRecord {
            nid,
            name: attrs.name.to_string(),
            node_type: NodeType::ProcedureFrame,
            file: attrs.file.to_string(),
            line: attrs.line.to_string(),
            module: Some(attrs.module.to_string()),
            node: id,
        });
        self.walk_children(pf, id)
    }

    fn walk_children(&mut self, xml: Node<'_, '_>, parent: NodeId) -> Result<(), HpcError> {
        for child in xml.children().filter(|n| n.is_element()) {
            if child.has_tag_name("M") {
                continue;
            }
            self.walk_node(child, parent)?;
        }
        Ok(())
    }

    fn walk_node(&mut self, xml: Node<'_, '_>, parent: NodeId) -> Result<(), HpcError> {
        match xml.tag_name().name() {
            tag @ ("PF" | "Pr") => {
                // resolved even when the element turns out to be transparent
                let attrs = self.procedure_attrs(xml)?;
                self.file = attrs.file;
                if tag == "Pr" && attrs.name.is_empty() {
                    return self.walk_children(xml, parent);
                }
                let node_type = if tag == "PF" {
                    NodeType::ProcedureFrame
                } else {
                    NodeType::Procedure
                };
                let id = self.create(
                    xml,
                    attrs.name.to_string(),
                    node_type,
                    attrs.file,
                    attrs.line,
                    Some(attrs.module),
                    parent,
                )?;
                self.walk_children(xml, id)
            }
            "L" => {
                let tables = self.tables;
                let file = tables.lookup(Table::File, attribute(xml, "f")?)?;
                let line = attribute(xml, "l")?;
                self.file = file;
                let name = format!("Loop@{}:{}", basename(file), line);
                let id = self.create(xml, name, NodeType::Loop, file, line, None, parent)?;
                self.walk_children(xml, id)
            }
            "S" => {
                let file = self.file;
                let line = attribute(xml, "l")?;
                let name = format!("Stmt{}@{}:{}", self.next_statement, basename(file), line);
                self.next_statement += 1;
                let id = self.create(xml, name, NodeType::Statement, file, line, None, parent)?;
                self.walk_children(xml, id)
            }
            other => {
                if other != "C" {
                    debug!("Treating <{}> as a call site", other);
                }
                self.walk_children(xml, parent)
            }
        }
    }

    /// **Private** - resolve `n`, `f`, `l` and `lm` of a `PF` or `Pr`
    fn procedure_attrs<'a>(&self, xml: Node<'a, '_>) -> Result<ProcedureAttrs<'t, 'a>, HpcError> {
        let tables = self.tables;
        Ok(ProcedureAttrs {
            name: tables.lookup(Table::Procedure, attribute(xml, "n")?)?,
            file: tables.lookup(Table::File, attribute(xml, "f")?)?,
            line: attribute(xml, "l")?,
            module: tables.lookup(Table::LoadModule, attribute(xml, "lm")?)?,
        })
    }

    /// **Private** - add a node under `parent` and record its metadata
    #[allow(clippy::too_many_arguments)]
    fn create(
        &mut self,
        xml: Node<'_, '_>,
        name: String,
        node_type: NodeType,
        file: &str,
        line: &str,
        module: Option<&str>,
        parent: NodeId,
    ) -> Result<NodeId, HpcError> {
        let nid = nid(xml)?;
        let id = self.graph.add_node(name.as_str(), Some(parent));
        self.records.push(HpcNodeRecord {
            nid,
            name,
            node_type,
            file: file.to_string(),
            line: line.to_string(),
            module: module.map(str::to_string),
            node: id,
        });
        Ok(id)
    }
}

/// **Private** - the element's `i` attribute as a node id
fn nid(xml: Node<'_, '_>) -> Result<u64, HpcError> {
    let value = attribute(xml, "i")?;
    value.parse().map_err(|_| HpcError::InvalidAttribute {
        tag: xml.tag_name().name().to_string(),
        attr: "i",
        value: value.to_string(),
    })
}
