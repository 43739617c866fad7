//! File-eligibility heuristics gating the preview flow
//!
//! All predicates fail toward permissiveness: an unreadable or unknown
//! resource takes the normal text path, because a wrong "excluded" answer
//! silently breaks a legitimate use case while a wrong "not excluded"
//! answer only yields a momentarily incorrect preview.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::doc::Document;

/// Host language identifier for markdown documents
pub const MARKDOWN_LANGUAGE: &str = "markdown";

/// URI schemes the host uses for non-editable diff buffers
const DIFF_SCHEMES: [&str; 2] = ["git", "diff"];

/// How many leading lines are sampled for conflict markers
const CONFLICT_SAMPLE_LINES: usize = 500;

/// How many leading bytes are sampled for binary detection
const BINARY_SAMPLE_SIZE: u64 = 8 * 1024;

/// True when the document's declared language is markdown
pub fn is_markdown_file(doc: &Document) -> bool {
    doc.language_id == MARKDOWN_LANGUAGE
}

/// True when the document is a diff view rather than a regular buffer
pub fn is_diff_view(doc: &Document) -> bool {
    DIFF_SCHEMES.contains(&doc.uri.scheme())
}

/// Detect git merge-conflict markers in the leading lines.
///
/// Samples at most the first 500 lines; a marker past the sample window
/// is a tolerated false negative. This is a heuristic, not a parser.
pub fn has_conflict_markers(doc: &Document) -> bool {
    if doc.is_empty() {
        return false;
    }

    let sample_lines = doc.line_count().min(CONFLICT_SAMPLE_LINES);
    (0..sample_lines).any(|idx| {
        let prefix: String = doc.rope.line(idx).chars().take(7).collect();
        matches!(prefix.as_str(), "<<<<<<<" | "=======" | ">>>>>>>")
    })
}

/// True when the file's reported size strictly exceeds `max_bytes`.
///
/// A stat failure (missing file, permissions, unsupported scheme) reads
/// as "not large".
pub fn is_large_file(path: &Path, max_bytes: u64) -> bool {
    stat_size(path).map(|size| size > max_bytes).unwrap_or(false)
}

/// True when the file's leading bytes look binary.
///
/// Any zero byte in the first 8 KiB is binary; otherwise the sample must
/// decode as strict UTF-8. A read failure reads as "not binary".
pub fn is_binary_file(path: &Path) -> bool {
    read_sample(path)
        .map(|sample| {
            sample.contains(&0) || std::str::from_utf8(&sample).is_err()
        })
        .unwrap_or(false)
}

fn stat_size(path: &Path) -> io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

fn read_sample(path: &Path) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    let mut sample = Vec::with_capacity(BINARY_SAMPLE_SIZE as usize);
    file.take(BINARY_SAMPLE_SIZE).read_to_end(&mut sample)?;
    Ok(sample)
}
