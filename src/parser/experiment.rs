//! Lookup tables of an HPCToolkit `experiment.xml` document.
//!
//! Four flat sections map string ids to names:
//! `LoadModuleTable/LoadModule`, `FileTable/File`, `ProcedureTable/Procedure`
//! and `MetricDBTable/MetricDB`, each entry carrying `i` (id) and `n` (name).

use crate::utils::error::HpcError;
use log::debug;
use roxmltree::{Document, Node};
use std::collections::HashMap;

/// Which id→name table a lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    LoadModule,
    File,
    Procedure,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Self::LoadModule => "load module",
            Self::File => "file",
            Self::Procedure => "procedure",
        }
    }
}

/// id→name mappings of one experiment
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    pub load_modules: HashMap<String, String>,
    pub src_files: HashMap<String, String>,
    pub procedure_names: HashMap<String, String>,
    /// Metric names in document order; this is the metric column order
    pub metric_names: Vec<(String, String)>,
}

impl LookupTables {
    /// Build all four tables from a parsed document
    ///
    /// # Errors
    /// * `HpcError::MissingSection` - one of the table sections is absent
    /// * `HpcError::MissingAttribute` - an entry lacks `i` or `n`
    pub fn from_document(doc: &Document<'_>) -> Result<Self, HpcError> {
        let tables = Self {
            load_modules: collect(doc, "LoadModuleTable", "LoadModule")?.into_iter().collect(),
            src_files: collect(doc, "FileTable", "File")?.into_iter().collect(),
            procedure_names: collect(doc, "ProcedureTable", "Procedure")?.into_iter().collect(),
            metric_names: collect(doc, "MetricDBTable", "MetricDB")?,
        };

        debug!(
            "Lookup tables: {} load modules, {} files, {} procedures, {} metrics",
            tables.load_modules.len(),
            tables.src_files.len(),
            tables.procedure_names.len(),
            tables.metric_names.len()
        );
        Ok(tables)
    }

    /// Resolve `id` in `table`; an unknown id is fatal
    pub fn lookup(&self, table: Table, id: &str) -> Result<&str, HpcError> {
        let map = match table {
            Table::LoadModule => &self.load_modules,
            Table::File => &self.src_files,
            Table::Procedure => &self.procedure_names,
        };
        map.get(id).map(String::as_str).ok_or_else(|| HpcError::UnknownId {
            table: table.name(),
            id: id.to_string(),
        })
    }

    /// Metric column names, in document order
    pub fn metric_columns(&self) -> Vec<String> {
        self.metric_names.iter().map(|(_, n)| n.clone()).collect()
    }
}

/// First element named `tag` anywhere in the document
pub fn find_section<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'static str,
) -> Result<Node<'a, 'input>, HpcError> {
    doc.descendants()
        .find(|n| n.has_tag_name(tag))
        .ok_or(HpcError::MissingSection(tag))
}

/// Required attribute of an element
pub fn attribute<'a>(node: Node<'a, '_>, attr: &'static str) -> Result<&'a str, HpcError> {
    node.attribute(attr).ok_or_else(|| HpcError::MissingAttribute {
        tag: node.tag_name().name().to_string(),
        attr,
    })
}

/// **Private** - `(i, n)` pairs of every `entry` under `section`
fn collect(
    doc: &Document<'_>,
    section: &'static str,
    entry: &str,
) -> Result<Vec<(String, String)>, HpcError> {
    find_section(doc, section)?
        .descendants()
        .filter(|n| n.has_tag_name(entry))
        .map(|n| -> Result<(String, String), HpcError> {
            Ok((attribute(n, "i")?.to_string(), attribute(n, "n")?.to_string()))
        })
        .collect()
}
