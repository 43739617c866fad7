//! Mode-transition and formatting command handlers
//!
//! Every handler is a guard plus a delegation: commands invoked without a
//! qualifying markdown editor are silent no-ops, not errors. Failures from
//! the host collaborators propagate untouched.

use anyhow::Result;
use log::debug;
use mdr_core::validate::is_markdown_file;
use mdr_core::{Document, FormatAction, FormatOp, StateTable, ViewMode};

use crate::host::{EditorWindow, PreviewSurface, TextEditor};

/// Prefer the focused editor when its document is markdown; otherwise the
/// first visible markdown document.
fn resolve_markdown_document(window: &dyn EditorWindow) -> Option<Document> {
    window
        .active_document()
        .filter(is_markdown_file)
        .or_else(|| {
            window
                .visible_documents()
                .into_iter()
                .find(is_markdown_file)
        })
}

/// Switch the active markdown document into the editable view
pub fn enter_edit_mode(
    window: &dyn EditorWindow,
    preview: &mut dyn PreviewSurface,
    states: &mut StateTable,
) -> Result<()> {
    let Some(doc) = resolve_markdown_document(window) else {
        debug!("enter_edit_mode: no markdown editor to act on");
        return Ok(());
    };

    let restore = states.get_last_selection(&doc.uri);
    preview.show_editable(&doc.uri, restore)?;
    states.set_mode(&doc.uri, ViewMode::Edit);
    Ok(())
}

/// Switch the active markdown document back to the rendered preview
pub fn exit_edit_mode(
    window: &dyn EditorWindow,
    preview: &mut dyn PreviewSurface,
    states: &mut StateTable,
) -> Result<()> {
    let Some(doc) = resolve_markdown_document(window) else {
        debug!("exit_edit_mode: no markdown editor to act on");
        return Ok(());
    };

    // Preserve the user's place so re-entering edit mode restores it.
    // The window cursor belongs to the focused editor, so only record it
    // when that editor holds the resolved document.
    let focused_here = window
        .active_document()
        .is_some_and(|active| active.uri == doc.uri);
    if focused_here {
        if let Some(cursor) = window.active_cursor() {
            states.set_last_selection(&doc.uri, cursor);
        }
    }

    preview.show_preview(&doc.uri)?;
    states.set_mode(&doc.uri, ViewMode::Preview);
    Ok(())
}

/// Toggle between edit and preview for the active markdown document
pub fn toggle_edit_mode(
    window: &dyn EditorWindow,
    preview: &mut dyn PreviewSurface,
    states: &mut StateTable,
) -> Result<()> {
    let Some(doc) = resolve_markdown_document(window) else {
        return Ok(());
    };

    match states.get_state(&doc.uri).mode {
        ViewMode::Edit => exit_edit_mode(window, preview, states),
        ViewMode::Preview => enter_edit_mode(window, preview, states),
    }
}

/// Apply a formatting operation to the editor's selection.
///
/// No-op when the document is not markdown; the operation is simply
/// inapplicable in that context.
pub fn apply_format(editor: &mut dyn TextEditor, op: FormatOp) -> Result<()> {
    if !is_markdown_file(editor.document()) {
        debug!("apply_format: ignoring {op:?} on non-markdown document");
        return Ok(());
    }

    match op.action() {
        FormatAction::Wrap {
            prefix,
            suffix,
            placeholder,
        } => editor.wrap_selection(prefix, suffix, placeholder),
        FormatAction::WrapBlock { fence, placeholder } => editor.wrap_block(fence, placeholder),
        FormatAction::TogglePrefix { prefix } => editor.toggle_line_prefix(prefix),
        FormatAction::InsertLink => editor.insert_link(),
    }
}
