//! Host editor collaborator interfaces
//!
//! The extension consumes the host editor through these narrow seams and
//! reimplements none of them. Edit and view-switch failures bubble out as
//! `Err` untouched; the host's generic error reporting surfaces them.

use anyhow::Result;
use mdr_core::{Document, DocumentUri, Position};
use serde_json::Value;
use std::collections::HashMap;

/// Text-editing surface over one live editor
pub trait TextEditor {
    fn document(&self) -> &Document;

    /// Surround the selection, inserting the placeholder when it is empty
    fn wrap_selection(&mut self, prefix: &str, suffix: &str, placeholder: &str) -> Result<()>;

    /// Wrap the selection as a fenced block
    fn wrap_block(&mut self, fence: &str, placeholder: &str) -> Result<()>;

    /// Toggle a prefix on every line the selection touches
    fn toggle_line_prefix(&mut self, prefix: &str) -> Result<()>;

    /// Insert a markdown link construct at the cursor
    fn insert_link(&mut self) -> Result<()>;
}

/// The host's window: which documents are focused and visible
pub trait EditorWindow {
    fn active_document(&self) -> Option<Document>;
    fn visible_documents(&self) -> Vec<Document>;
    /// Cursor position in the focused editor, if any
    fn active_cursor(&self) -> Option<Position>;
}

/// Switches a document between rendered preview and raw editable text
pub trait PreviewSurface {
    /// Show the raw-text editable view, restoring the cursor when given
    fn show_editable(&mut self, uri: &DocumentUri, restore: Option<Position>) -> Result<()>;

    /// Show the rendered preview
    fn show_preview(&mut self, uri: &DocumentUri) -> Result<()>;
}

/// Transient status messages and command-enablement context flags
pub trait StatusSurface {
    fn set_status_message(&mut self, message: &str);
    fn set_context(&mut self, key: &str, value: bool);
}

/// Memento-style per-workspace persisted state
pub trait WorkspaceState {
    fn get(&self, key: &str) -> Option<Value>;
    /// Update a key; `None` removes it
    fn update(&mut self, key: &str, value: Option<Value>) -> Result<()>;
}

/// The host's persisted filename-pattern → view-handler mapping
pub trait AssociationStore {
    fn current(&self) -> Value;
    fn update(&mut self, value: Value) -> Result<()>;
}

/// In-memory [`WorkspaceState`] for hosts without persistence and tests
#[derive(Default)]
pub struct MemoryWorkspaceState {
    values: HashMap<String, Value>,
}

impl MemoryWorkspaceState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WorkspaceState for MemoryWorkspaceState {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn update(&mut self, key: &str, value: Option<Value>) -> Result<()> {
        match value {
            Some(value) => {
                self.values.insert(key.to_string(), value);
            }
            None => {
                self.values.remove(key);
            }
        }
        Ok(())
    }
}
