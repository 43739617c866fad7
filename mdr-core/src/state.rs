//! Per-document view-mode state table

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::doc::DocumentUri;
use crate::selection::Position;

/// How a document is currently shown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    Preview,
    Edit,
}

/// Tracked state for one open document
#[derive(Clone, Debug)]
pub struct FileState {
    pub uri: String,
    pub mode: ViewMode,
    /// Milliseconds since epoch of the most recent mode transition
    pub last_mode_change: u64,
    pub editor_visible: bool,
    pub last_selection: Option<Position>,
}

/// Receives the side effects of an actual mode change.
///
/// The host implements this over its status bar and command-enablement
/// context; [`NullNotifier`] is for hosts and tests that want neither.
pub trait ModeNotifier {
    /// Show a transient status message
    fn status_message(&self, message: &str);
    /// Signal whether the document is in edit mode
    fn set_edit_context(&self, edit_mode: bool);
}

/// Notifier that drops all notifications
pub struct NullNotifier;

impl ModeNotifier for NullNotifier {
    fn status_message(&self, _message: &str) {}
    fn set_edit_context(&self, _edit_mode: bool) {}
}

/// State table keyed by document identity.
///
/// Entries are created lazily on first access and removed explicitly when
/// the host closes the document; a removed key recreates defaults on the
/// next access with no memory of prior values.
pub struct StateTable {
    states: HashMap<String, FileState>,
    notifier: Box<dyn ModeNotifier>,
}

impl StateTable {
    /// Create a table that emits no notifications
    pub fn new() -> Self {
        Self::with_notifier(Box::new(NullNotifier))
    }

    /// Create a table that reports mode changes to the given notifier
    pub fn with_notifier(notifier: Box<dyn ModeNotifier>) -> Self {
        Self {
            states: HashMap::new(),
            notifier,
        }
    }

    /// Get the state for a URI, if it has been seen
    pub fn get_existing_state(&self, uri: &DocumentUri) -> Option<&FileState> {
        self.states.get(&uri.to_key())
    }

    /// Get or create state for a URI
    pub fn get_state(&mut self, uri: &DocumentUri) -> &FileState {
        self.entry(uri)
    }

    /// Update the view mode for a URI and announce the change.
    ///
    /// The timestamp refreshes on every call; the notification and the
    /// edit context flag fire only when the mode actually changed.
    pub fn set_mode(&mut self, uri: &DocumentUri, mode: ViewMode) {
        let state = self.entry(uri);
        let previous_mode = state.mode;
        state.mode = mode;
        state.last_mode_change = now_millis();

        if previous_mode != mode {
            self.notifier.set_edit_context(mode == ViewMode::Edit);
            let message = match mode {
                ViewMode::Edit => "Edit mode enabled",
                ViewMode::Preview => "Preview mode enabled",
            };
            self.notifier.status_message(message);
        }
    }

    /// Update editor visibility for a URI
    pub fn set_editor_visible(&mut self, uri: &DocumentUri, visible: bool) {
        self.entry(uri).editor_visible = visible;
    }

    /// Store the last cursor position for a URI
    pub fn set_last_selection(&mut self, uri: &DocumentUri, position: Position) {
        self.entry(uri).last_selection = Some(position);
    }

    /// Retrieve the last cursor position for a URI, if any was stored
    pub fn get_last_selection(&self, uri: &DocumentUri) -> Option<Position> {
        self.get_existing_state(uri)
            .and_then(|state| state.last_selection)
    }

    /// Remove all state for a URI
    pub fn clear(&mut self, uri: &DocumentUri) {
        self.states.remove(&uri.to_key());
    }

    fn entry(&mut self, uri: &DocumentUri) -> &mut FileState {
        let key = uri.to_key();
        self.states.entry(key.clone()).or_insert_with(|| FileState {
            uri: key,
            mode: ViewMode::Preview,
            last_mode_change: now_millis(),
            editor_visible: false,
            last_selection: None,
        })
    }
}

impl Default for StateTable {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
