//! Decoder for HPCToolkit `*.metric-db` files.
//!
//! One file per process element (PE). Layout:
//!
//! ```text
//! offset  size  field
//!      0    18  format tag
//!     18     5  version
//!     23     1  endianness ('b' = big-endian, nothing else is supported)
//!     24     4  node count   (i32, big-endian)
//!     28     4  metric count (i32, big-endian)
//!     32     -  node_count x metric_count f64, big-endian, node-major
//! ```

use crate::utils::config::{
    BIG_ENDIAN_TAG, METRIC_DB_EXTENSION, METRIC_DB_HEADER_LEN, METRIC_DB_TAG_LEN,
    METRIC_DB_VERSION_LEN, NID_COLUMN, RANK_COLUMN,
};
use crate::utils::error::HpcError;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use log::debug;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Fixed header at the start of every metric-db file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDbHeader {
    pub tag: String,
    pub version: String,
    pub endian: u8,
    pub node_count: usize,
    pub metric_count: usize,
}

/// Read and validate a metric-db header
///
/// # Errors
/// * `HpcError::Io` - short or unreadable header
/// * `HpcError::UnsupportedEndianness` - endianness byte is not `'b'`
/// * `HpcError::InvalidHeader` - negative node or metric count
pub fn read_header<R: Read>(path: &Path, reader: &mut R) -> Result<MetricDbHeader, HpcError> {
    let io_err = |source| HpcError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tag = [0u8; METRIC_DB_TAG_LEN];
    reader.read_exact(&mut tag).map_err(io_err)?;
    let mut version = [0u8; METRIC_DB_VERSION_LEN];
    reader.read_exact(&mut version).map_err(io_err)?;

    let endian = reader.read_u8().map_err(io_err)?;
    if endian != BIG_ENDIAN_TAG {
        return Err(HpcError::UnsupportedEndianness {
            path: path.to_path_buf(),
            tag: endian,
        });
    }

    let node_count = reader.read_i32::<BigEndian>().map_err(io_err)?;
    let metric_count = reader.read_i32::<BigEndian>().map_err(io_err)?;

    Ok(MetricDbHeader {
        tag: String::from_utf8_lossy(&tag).trim_end_matches('\0').to_string(),
        version: String::from_utf8_lossy(&version).to_string(),
        endian,
        node_count: count(path, "node count", node_count)?,
        metric_count: count(path, "metric count", metric_count)?,
    })
}

/// **Private** - header counts must be non-negative
fn count(path: &Path, field: &'static str, value: i32) -> Result<usize, HpcError> {
    usize::try_from(value).map_err(|_| HpcError::InvalidHeader {
        path: path.to_path_buf(),
        field,
        value,
    })
}

/// Dense table of metric values for all process elements.
///
/// Shape is `(pe_count * node_count) x (metric_count + 2)`. The two trailing
/// columns hold the node id (1-based) and the PE index; they are synthesized,
/// not read from disk. Row `pe * node_count + (nid - 1)` belongs to `(nid, pe)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStore {
    columns: Vec<String>,
    node_count: usize,
    pe_count: usize,
    data: Vec<f64>,
}

impl MetricStore {
    /// Pre-allocate a zeroed store for `metric_names`
    ///
    /// # Errors
    /// * `HpcError::StoreTooLarge` - the cell count does not fit in memory
    pub fn new(
        metric_names: Vec<String>,
        node_count: usize,
        pe_count: usize,
    ) -> Result<Self, HpcError> {
        let mut columns = metric_names;
        columns.push(NID_COLUMN.to_string());
        columns.push(RANK_COLUMN.to_string());

        let cells = node_count
            .checked_mul(pe_count)
            .and_then(|rows| rows.checked_mul(columns.len()))
            .ok_or(HpcError::StoreTooLarge {
                node_count,
                metric_count: columns.len() - 2,
                pe_count,
            })?;

        Ok(Self {
            columns,
            node_count,
            pe_count,
            data: vec![0.0; cells],
        })
    }

    /// Metric names followed by `nid` and `rank`
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn metric_count(&self) -> usize {
        self.columns.len() - 2
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn pe_count(&self) -> usize {
        self.pe_count
    }

    pub fn rows(&self) -> usize {
        self.node_count * self.pe_count
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.width();
        &self.data[index * width..(index + 1) * width]
    }

    /// Row holding the metrics of node `nid` (1-based) on process element `pe`
    pub fn row_for(&self, nid: u64, pe: usize) -> Option<&[f64]> {
        let nid = usize::try_from(nid).ok()?;
        if nid == 0 || nid > self.node_count || pe >= self.pe_count {
            return None;
        }
        Some(self.row(pe * self.node_count + nid - 1))
    }

    /// All values of one column, top to bottom
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let col = self.columns.iter().position(|c| c == name)?;
        Some((0..self.rows()).map(|r| self.row(r)[col]).collect())
    }

    /// Decode the payload of one PE's file into its block of rows.
    ///
    /// # Errors
    /// * `HpcError::Io` - seek or read failure
    /// * `HpcError::Truncated` - fewer than `node_count * metric_count` values
    pub fn fill_block<R: Read + Seek>(
        &mut self,
        pe: usize,
        path: &Path,
        reader: &mut R,
    ) -> Result<(), HpcError> {
        let io_err = |source| HpcError::Io {
            path: path.to_path_buf(),
            source,
        };

        let metrics = self.metric_count();
        let expected = check_payload(path, reader, self.node_count, metrics)?;

        reader
            .seek(SeekFrom::Start(METRIC_DB_HEADER_LEN))
            .map_err(io_err)?;
        let mut bytes = Vec::with_capacity(expected * 8);
        reader
            .by_ref()
            .take((expected * 8) as u64)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
        if bytes.len() < expected * 8 {
            return Err(HpcError::Truncated {
                path: path.to_path_buf(),
                expected,
                found: bytes.len() / 8,
            });
        }

        let mut values = vec![0.0; expected];
        BigEndian::read_f64_into(&bytes, &mut values);

        let width = self.width();
        let offset = pe * self.node_count;
        for node in 0..self.node_count {
            let start = (offset + node) * width;
            let row = &mut self.data[start..start + width];
            row[..metrics].copy_from_slice(&values[node * metrics..(node + 1) * metrics]);
            row[metrics] = (node + 1) as f64;
            row[metrics + 1] = pe as f64;
        }
        Ok(())
    }
}

/// Check that a file holds the payload its header declares, before anything
/// is sized from the header counts. Returns the number of values.
///
/// **Private** - shared by `read_metric_dbs` and `fill_block`
fn check_payload<R: Seek>(
    path: &Path,
    reader: &mut R,
    node_count: usize,
    metric_count: usize,
) -> Result<usize, HpcError> {
    let values = node_count
        .checked_mul(metric_count)
        .filter(|v| v.checked_mul(8).is_some())
        .ok_or(HpcError::StoreTooLarge {
            node_count,
            metric_count,
            pe_count: 1,
        })?;

    let len = reader.seek(SeekFrom::End(0)).map_err(|source| HpcError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let available = len.saturating_sub(METRIC_DB_HEADER_LEN);
    if available < (values as u64).saturating_mul(8) {
        return Err(HpcError::Truncated {
            path: path.to_path_buf(),
            expected: values,
            found: (available / 8) as usize,
        });
    }
    Ok(values)
}

/// All `*.metric-db` files in `dir`.
///
/// Returned in glob order (lexicographic by file name), which is taken to be
/// process element order. Nothing re-sorts by the rank embedded in the names.
pub fn find_metric_dbs(dir: &Path) -> Result<Vec<PathBuf>, HpcError> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        METRIC_DB_EXTENSION
    );

    let paths = glob::glob(&pattern)?
        .map(|entry| {
            entry.map_err(|e| HpcError::Io {
                path: e.path().to_path_buf(),
                source: std::io::Error::from(e),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if paths.is_empty() {
        return Err(HpcError::NoMetricFiles(dir.to_path_buf()));
    }
    debug!("Found {} metric-db file(s) in {}", paths.len(), dir.display());
    Ok(paths)
}

/// Decode every metric-db file into one store.
///
/// The header is read from the first file only; every file is assumed to
/// share its node and metric counts. `paths[pe]` fills process element `pe`.
///
/// # Errors
/// Any unreadable, truncated or unsupported file aborts the whole decode.
pub fn read_metric_dbs(
    paths: &[PathBuf],
    metric_names: Vec<String>,
) -> Result<(MetricDbHeader, MetricStore), HpcError> {
    let first = paths
        .first()
        .ok_or_else(|| HpcError::NoMetricFiles(PathBuf::new()))?;
    let mut reader = open(first)?;
    let header = read_header(first, &mut reader)?;

    if header.metric_count != metric_names.len() {
        return Err(HpcError::MetricCountMismatch {
            path: first.clone(),
            stored: header.metric_count,
            named: metric_names.len(),
        });
    }

    debug!(
        "metric-db header: tag '{}', version '{}', {} nodes x {} metrics, {} PE(s)",
        header.tag,
        header.version,
        header.node_count,
        header.metric_count,
        paths.len()
    );

    check_payload(first, &mut reader, header.node_count, header.metric_count)?;
    drop(reader);

    let mut store = MetricStore::new(metric_names, header.node_count, paths.len())?;
    for (pe, path) in paths.iter().enumerate() {
        store.fill_block(pe, path, &mut open(path)?)?;
    }

    Ok((header, store))
}

/// **Private** - buffered handle, released when the caller's scope ends
fn open(path: &Path) -> Result<BufReader<File>, HpcError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| HpcError::Io {
            path: path.to_path_buf(),
            source,
        })
}
