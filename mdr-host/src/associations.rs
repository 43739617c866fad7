//! Workspace editor-association sync
//!
//! Opts markdown files into the custom preview by writing a fixed pair of
//! filename patterns into the host's persisted association mapping. The
//! host stores that mapping either as an array of
//! `{filenamePattern, viewType}` objects or as a pattern → view object;
//! both shapes are handled and preserved. Patterns this extension added
//! are tracked in per-workspace state so disabling removes only those.

use anyhow::Result;
use log::{debug, info};
use serde_json::{json, Map, Value};

use crate::host::{AssociationStore, WorkspaceState};

/// Filename patterns opted into the custom preview
pub const ASSOCIATION_PATTERNS: [&str; 2] = ["*.md", "*.markdown"];

/// View handler the patterns are associated with
pub const ASSOCIATION_VIEW: &str = "mdr.preview";

/// Workspace-state key tracking the patterns this extension added
pub const ADDED_PATTERNS_KEY: &str = "mdr.addedAssociations";

/// Outcome of an association mutation
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationUpdate {
    pub updated: bool,
    pub added_patterns: Vec<String>,
    pub value: Value,
}

/// True when an existing pattern covers ours, including the `**/`
/// workspace variant some hosts write.
pub fn matches_association_pattern(ours: &str, existing: &str) -> bool {
    existing == ours || existing == format!("**/{ours}")
}

/// True when the association container holds no entries
pub fn associations_empty(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => true,
    }
}

fn entries(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let pattern = item.get("filenamePattern")?.as_str()?;
                let view = item.get("viewType")?.as_str()?;
                Some((pattern.to_string(), view.to_string()))
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter_map(|(pattern, view)| {
                view.as_str().map(|v| (pattern.clone(), v.to_string()))
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Add the markdown patterns that are not already covered.
///
/// Idempotent: when every pattern is present (in either variant form) the
/// result reports no update.
pub fn add_markdown_associations(current: &Value) -> AssociationUpdate {
    let existing = entries(current);
    let missing: Vec<&str> = ASSOCIATION_PATTERNS
        .iter()
        .copied()
        .filter(|ours| {
            !existing
                .iter()
                .any(|(pattern, _)| matches_association_pattern(ours, pattern))
        })
        .collect();

    if missing.is_empty() {
        return AssociationUpdate {
            updated: false,
            added_patterns: Vec::new(),
            value: current.clone(),
        };
    }

    let value = match current {
        Value::Array(items) => {
            let mut items = items.clone();
            for pattern in &missing {
                items.push(json!({
                    "filenamePattern": pattern,
                    "viewType": ASSOCIATION_VIEW,
                }));
            }
            Value::Array(items)
        }
        Value::Object(map) => {
            let mut map = map.clone();
            for pattern in &missing {
                map.insert(
                    pattern.to_string(),
                    Value::String(ASSOCIATION_VIEW.to_string()),
                );
            }
            Value::Object(map)
        }
        _ => {
            let mut map = Map::new();
            for pattern in &missing {
                map.insert(
                    pattern.to_string(),
                    Value::String(ASSOCIATION_VIEW.to_string()),
                );
            }
            Value::Object(map)
        }
    };

    AssociationUpdate {
        updated: true,
        added_patterns: missing.iter().map(|s| s.to_string()).collect(),
        value,
    }
}

/// Remove tracked patterns, but only where the view handler is ours; an
/// association the user repointed elsewhere stays untouched.
pub fn remove_markdown_associations(current: &Value, tracked: &[String]) -> AssociationUpdate {
    let should_remove = |pattern: &str, view: &str| {
        view == ASSOCIATION_VIEW
            && tracked
                .iter()
                .any(|ours| matches_association_pattern(ours, pattern))
    };

    let value = match current {
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|item| {
                    let pattern = item.get("filenamePattern").and_then(Value::as_str);
                    let view = item.get("viewType").and_then(Value::as_str);
                    match (pattern, view) {
                        (Some(pattern), Some(view)) => !should_remove(pattern, view),
                        _ => true,
                    }
                })
                .cloned()
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(pattern, view)| {
                    !view
                        .as_str()
                        .is_some_and(|view| should_remove(pattern.as_str(), view))
                })
                .map(|(pattern, view)| (pattern.clone(), view.clone()))
                .collect(),
        ),
        other => other.clone(),
    };

    AssociationUpdate {
        updated: value != *current,
        added_patterns: Vec::new(),
        value,
    }
}

/// Bring the host's associations in line with the enabled flag.
///
/// Enabled: add missing patterns and record them. Disabled: remove only
/// the recorded patterns, then clear the record. Both directions are
/// idempotent.
pub fn sync_associations(
    enabled: bool,
    store: &mut dyn AssociationStore,
    state: &mut dyn WorkspaceState,
) -> Result<()> {
    let current = store.current();

    if enabled {
        let update = add_markdown_associations(&current);
        if !update.updated {
            debug!("markdown associations already present");
            return Ok(());
        }

        store.update(update.value)?;

        let mut tracked = tracked_patterns(state);
        for pattern in update.added_patterns {
            if !tracked.contains(&pattern) {
                tracked.push(pattern);
            }
        }
        state.update(
            ADDED_PATTERNS_KEY,
            Some(Value::Array(
                tracked.into_iter().map(Value::String).collect(),
            )),
        )?;
        info!("registered markdown preview associations");
    } else {
        let tracked = tracked_patterns(state);
        if tracked.is_empty() {
            return Ok(());
        }

        let update = remove_markdown_associations(&current, &tracked);
        if update.updated {
            let value = if associations_empty(&update.value) {
                Value::Null
            } else {
                update.value
            };
            store.update(value)?;
        }
        state.update(ADDED_PATTERNS_KEY, None)?;
        info!("removed previously added markdown preview associations");
    }

    Ok(())
}

fn tracked_patterns(state: &dyn WorkspaceState) -> Vec<String> {
    match state.get(ADDED_PATTERNS_KEY) {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
