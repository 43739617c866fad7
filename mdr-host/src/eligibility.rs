//! Preview eligibility gate
//!
//! Composes the configuration checks and validation predicates that decide
//! whether the custom preview is offered for a document. The individual
//! predicates fail permissive; only a positive signal excludes a document.

use log::debug;
use mdr_core::config::ConfigCache;
use mdr_core::doc::{Document, FILE_SCHEME};
use mdr_core::validate::{
    has_conflict_markers, is_binary_file, is_diff_view, is_large_file, is_markdown_file,
};

/// True when the document qualifies for the rendered preview
pub fn preview_eligible(doc: &Document, cache: &mut ConfigCache) -> bool {
    if !cache.enabled(Some(&doc.uri)) {
        debug!("{}: preview disabled for scope", doc.uri);
        return false;
    }
    if cache.is_excluded(&doc.uri) {
        debug!("{}: matches an exclude pattern", doc.uri);
        return false;
    }
    if !is_markdown_file(doc) {
        return false;
    }
    if is_diff_view(doc) {
        debug!("{}: diff view", doc.uri);
        return false;
    }
    if has_conflict_markers(doc) {
        debug!("{}: conflict markers present", doc.uri);
        return false;
    }

    // Size and binary heuristics only apply to file-backed resources
    if doc.uri.scheme() == FILE_SCHEME {
        let max_file_size = cache.max_file_size(Some(&doc.uri));
        if is_large_file(doc.uri.path(), max_file_size) {
            debug!("{}: exceeds {max_file_size} bytes", doc.uri);
            return false;
        }
        if is_binary_file(doc.uri.path()) {
            debug!("{}: looks binary", doc.uri);
            return false;
        }
    }

    true
}
