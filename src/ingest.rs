//! Line-oriented loaders.
//!
//! Edge files hold one edge per line. Coreference files hold one pair per
//! line, written as a two-element hyperedge `(a b)`. Blank lines are ignored
//! and malformed lines are logged and skipped so one bad line does not stop
//! a batch.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{info, warn};

use crate::coref::CorefEngine;
use crate::edge::Edge;
use crate::error::{CorefError, CorefResult};
use crate::storage::{HypergraphStore, StorageError};

/// Counts for a loader run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Lines applied to the store or engine.
    pub added: usize,
    /// Non-blank lines that could not be parsed.
    pub skipped: usize,
}

fn io_err(e: &std::io::Error) -> CorefError {
    CorefError::Storage(StorageError::BackendError(format!("read failed: {e}")))
}

fn open(path: &Path) -> CorefResult<BufReader<File>> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| CorefError::Storage(StorageError::BackendError(format!(
            "cannot open {}: {e}",
            path.display()
        ))))
}

/// Parses one edge per non-blank line. Returns the parsed edges and the
/// number of skipped lines.
///
/// # Errors
/// Returns an error only if reading fails.
pub fn read_edges(reader: impl BufRead) -> CorefResult<(Vec<Edge>, usize)> {
    let mut edges = Vec::new();
    let mut skipped = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(&e))?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        match Edge::parse(text) {
            Ok(edge) => edges.push(edge),
            Err(err) => {
                warn!(line = i + 1, error = %err, "skipping unparsable edge");
                skipped += 1;
            }
        }
    }
    Ok((edges, skipped))
}

/// Adds every edge read from `reader` to the store as a primary edge.
///
/// # Errors
/// Propagates read and store failures.
pub fn load_edges(store: &dyn HypergraphStore, reader: impl BufRead) -> CorefResult<IngestReport> {
    let (edges, skipped) = read_edges(reader)?;
    for edge in &edges {
        store.add(edge, true)?;
    }
    let report = IngestReport {
        added: edges.len(),
        skipped,
    };
    info!(added = report.added, skipped = report.skipped, "loaded edges");
    Ok(report)
}

/// [`load_edges`] from a file.
///
/// # Errors
/// Propagates open, read and store failures.
pub fn load_edges_file(store: &dyn HypergraphStore, path: impl AsRef<Path>) -> CorefResult<IngestReport> {
    load_edges(store, open(path.as_ref())?)
}

/// Applies `make_corefs` for every `(a b)` pair read from `reader`.
///
/// # Errors
/// Propagates read failures and the first engine failure.
pub fn apply_corefs(engine: &CorefEngine, reader: impl BufRead) -> CorefResult<IngestReport> {
    let (pairs, mut skipped) = read_edges(reader)?;
    let mut added = 0;

    for pair in &pairs {
        let [a, b] = pair.elements() else {
            warn!(%pair, "coref line must hold exactly two edges");
            skipped += 1;
            continue;
        };
        engine.make_corefs(a, b)?;
        added += 1;
    }

    info!(added, skipped, "applied corefs");
    Ok(IngestReport { added, skipped })
}

/// [`apply_corefs`] from a file.
///
/// # Errors
/// Propagates open, read and engine failures.
pub fn apply_corefs_file(engine: &CorefEngine, path: impl AsRef<Path>) -> CorefResult<IngestReport> {
    apply_corefs(engine, open(path.as_ref())?)
}
