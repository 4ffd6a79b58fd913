//! Manifest parsing: one `name:url` record per line.
//!
//! Two entry points with deliberately different failure policies:
//!
//! - [`parse`] is fail-fast: the first malformed line aborts the whole run
//!   before any download starts.
//! - [`scan`] is collect-all: every violation is gathered with its line
//!   number so the URL self-test can report diagnostic completeness.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{BatchdlError, ConfigError, ValidationError};

/// One named URL from the manifest. Immutable for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Output file stem; never empty, never contains a path separator.
    pub name: String,
    /// Source URL handed to the fetch tool; never empty.
    pub url: String,
}

/// Result of a collect-all manifest scan.
#[derive(Debug)]
pub struct ManifestScan {
    /// Records from the well-formed lines, in file order.
    pub records: Vec<Record>,
    /// Shape violations, in file order.
    pub issues: Vec<ValidationError>,
}

/// Split one trimmed, non-empty, non-comment line into a record.
///
/// The split happens at the first `:` so URLs keep their scheme colon.
fn parse_line(line: &str, line_no: usize) -> Result<Record, ValidationError> {
    let Some((name, url)) = line.split_once(':') else {
        return Err(ValidationError::MalformedLine {
            line: line_no,
            reason: "missing ':' separator".to_string(),
        });
    };

    let name = name.trim();
    let url = url.trim();
    if name.is_empty() || url.is_empty() {
        return Err(ValidationError::MalformedLine {
            line: line_no,
            reason: "empty video name or URL".to_string(),
        });
    }
    if name.contains(['/', '\\']) {
        return Err(ValidationError::UnsafeName {
            line: line_no,
            name: name.to_string(),
        });
    }

    Ok(Record {
        name: name.to_string(),
        url: url.to_string(),
    })
}

/// Iterate the manifest's meaningful lines as `(line_number, content)` pairs.
///
/// Blank lines and `#` comments are skipped; line numbers are 1-based
/// positions in the file, not positions among the surviving lines.
fn meaningful_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Read the manifest file, or the typed error for a missing/unreadable file.
fn read_manifest(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::InputNotFound(path.display().to_string()));
    }
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parse the manifest fail-fast, preserving file order.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file is missing, unreadable, or yields
/// zero records; [`ValidationError`] on the first malformed line or on a
/// duplicate record name (two lines that would write the same output file).
pub fn parse(path: &Path) -> Result<Vec<Record>, BatchdlError> {
    let text = read_manifest(path)?;

    let mut records = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (line_no, line) in meaningful_lines(&text) {
        let record = parse_line(line, line_no)?;
        if let Some(&first) = seen.get(&record.name) {
            return Err(ValidationError::DuplicateName {
                name: record.name,
                first,
                second: line_no,
            }
            .into());
        }
        seen.insert(record.name.clone(), line_no);
        records.push(record);
    }

    if records.is_empty() {
        return Err(ConfigError::EmptyManifest(path.display().to_string()).into());
    }
    Ok(records)
}

/// Scan the manifest collecting every violation instead of aborting.
///
/// Used by the URL self-test, which wants a complete diagnostic report.
/// Well-formed lines still yield records so their URLs can be probed.
///
/// # Errors
///
/// Returns [`ConfigError`] only for a missing or unreadable file; shape
/// violations land in [`ManifestScan::issues`].
pub fn scan(path: &Path) -> Result<ManifestScan, ConfigError> {
    let text = read_manifest(path)?;

    let mut records = Vec::new();
    let mut issues = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    for (line_no, line) in meaningful_lines(&text) {
        match parse_line(line, line_no) {
            Ok(record) => {
                if let Some(&first) = seen.get(&record.name) {
                    issues.push(ValidationError::DuplicateName {
                        name: record.name.clone(),
                        first,
                        second: line_no,
                    });
                } else {
                    seen.insert(record.name.clone(), line_no);
                }
                records.push(record);
            }
            Err(issue) => issues.push(issue),
        }
    }

    Ok(ManifestScan { records, issues })
}
