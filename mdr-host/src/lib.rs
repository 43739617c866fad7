//! MDR Host - Adapter layer between the core and the host editor
//!
//! This crate contains everything that touches the host editor seams:
//! - Collaborator traits (text editing, preview surface, status/context,
//!   workspace state)
//! - Mode-transition and formatting command handlers
//! - Preview eligibility gate
//! - Workspace editor-association sync
//! - Settings-file watching for config cache invalidation
//! - Localization lookup

pub mod associations;
pub mod commands;
pub mod eligibility;
pub mod host;
pub mod l10n;
pub mod status;
pub mod watcher;

// Re-export main types
pub use host::{
    AssociationStore, EditorWindow, MemoryWorkspaceState, PreviewSurface, StatusSurface,
    TextEditor, WorkspaceState,
};
pub use status::{HostNotifier, EDIT_MODE_CONTEXT};
pub use watcher::{ConfigWatcher, SettingsChange, SettingsTier};
