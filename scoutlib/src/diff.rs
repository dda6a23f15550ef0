use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Per-run snapshot written to the working directory, truncated each run.
/// Concurrent invocations racing on this path are a known hazard.
pub const SNAPSHOT_FILE: &str = ".scout-snapshot";

/// What the compare step produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Lines unique to the designated side, in that side's order.
    Diff(Vec<String>),
    /// The reference file is absent; the diff step was skipped.
    ReferenceMissing,
}

/// Persist the aggregated output and line-diff it against `reference`.
///
/// The snapshot is written before the reference file is checked, so a run
/// with a missing reference still leaves a snapshot behind. Non-reverse
/// reports lines of the current output absent from the reference;
/// `reverse` flips the sides.
///
/// # Errors
///
/// `Error::SnapshotWrite` when the snapshot cannot be created or written.
pub fn run_diff(
    snapshot_path: &Path,
    aggregate: &str,
    reference: &Path,
    reverse: bool,
) -> Result<DiffOutcome> {
    fs::write(snapshot_path, aggregate).map_err(|source| Error::SnapshotWrite {
        path: snapshot_path.to_path_buf(),
        source,
    })?;

    if !reference.exists() {
        return Ok(DiffOutcome::ReferenceMissing);
    }
    let reference_text = match fs::read_to_string(reference) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %reference.display(), %err, "reference file unreadable");
            return Ok(DiffOutcome::ReferenceMissing);
        }
    };

    let lines = if reverse {
        line_set_diff(&reference_text, aggregate)
    } else {
        line_set_diff(aggregate, &reference_text)
    };
    Ok(DiffOutcome::Diff(lines))
}

/// Lines of `side` absent (by exact match) from `other`. Set semantics:
/// order follows `side`, duplicates collapse to one occurrence.
pub fn line_set_diff(side: &str, other: &str) -> Vec<String> {
    let known: HashSet<&str> = other.lines().collect();
    let mut seen: HashSet<&str> = HashSet::new();
    side.lines()
        .filter(|line| !known.contains(line) && seen.insert(line))
        .map(str::to_string)
        .collect()
}
