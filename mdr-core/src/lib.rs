//! MDR Core - Per-document view-mode tracking, validation, and configuration
//!
//! This crate contains the host-independent logic of the markdown reader
//! extension:
//! - Document model with Rope-based text storage
//! - Per-document view-mode state table
//! - File-eligibility validation predicates
//! - Configuration resolution, caching, and glob exclusion
//! - Formatting operation dispatch table

pub mod config;
pub mod doc;
pub mod format;
pub mod selection;
pub mod state;
pub mod validate;

// Re-export commonly used types
pub use config::{
    ConfigCache, ConfigProvider, FileConfigProvider, ReaderConfig, WORKSPACE_CONFIG_FILE,
};
pub use doc::{Document, DocumentUri};
pub use format::{FormatAction, FormatOp};
pub use selection::{Position, Selection};
pub use state::{FileState, ModeNotifier, StateTable, ViewMode};
