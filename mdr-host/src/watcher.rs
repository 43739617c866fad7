//! Settings-file watching for cache invalidation
//!
//! The configuration cache never invalidates itself. The host loop owns a
//! `ConfigWatcher` over both settings tiers and calls [`ConfigWatcher::invalidate`]
//! each tick; a settled change drops every cached scope so the next read
//! re-layers the tier files.

use anyhow::{Context, Result};
use crossbeam_channel::Receiver;
use mdr_core::{ConfigCache, FileConfigProvider, WORKSPACE_CONFIG_FILE};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Which settings tier a change was observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTier {
    User,
    Workspace,
}

/// Tiers whose files changed since the last settled poll
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsChange {
    pub user: bool,
    pub workspace: bool,
}

/// Watches the user and workspace settings files for external changes.
///
/// Each tier's parent directory is watched rather than the file alone, so
/// atomic-rename saves and a workspace file created after startup are both
/// observed.
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<SettingsTier>,
    tiers: Vec<(SettingsTier, PathBuf)>,
    pending_user: Option<Instant>,
    pending_workspace: Option<Instant>,
}

impl ConfigWatcher {
    /// Watch the platform user settings file and the workspace `.mdr.toml`
    pub fn discover(workspace_root: Option<&Path>) -> Result<Self> {
        Self::new(
            FileConfigProvider::user_config_path().as_deref(),
            workspace_root
                .map(|root| root.join(WORKSPACE_CONFIG_FILE))
                .as_deref(),
        )
    }

    /// Watch explicit tier files; at least one tier must be given
    pub fn new(user_path: Option<&Path>, workspace_path: Option<&Path>) -> Result<Self> {
        let tiers: Vec<(SettingsTier, PathBuf)> = [
            (SettingsTier::User, user_path),
            (SettingsTier::Workspace, workspace_path),
        ]
        .into_iter()
        .filter_map(|(tier, path)| Some((tier, path?.to_path_buf())))
        .collect();
        anyhow::ensure!(!tiers.is_empty(), "No settings files to watch");

        let (tx, rx) = crossbeam_channel::unbounded();
        let routes = tiers.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let Ok(event) = res else { return };
            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                return;
            }
            for (tier, path) in &routes {
                if event.paths.iter().any(|p| p == path) {
                    let _ = tx.send(*tier);
                }
            }
        })
        .context("Failed to create settings watcher")?;

        let mut watched_dirs: Vec<&Path> = Vec::new();
        for (_, path) in &tiers {
            let Some(parent) = path.parent().filter(|p| p.is_dir()) else {
                log::debug!("Settings tier {} has no directory yet", path.display());
                continue;
            };
            if watched_dirs.contains(&parent) {
                continue;
            }
            watcher
                .watch(parent, RecursiveMode::NonRecursive)
                .with_context(|| {
                    format!("Failed to watch settings directory: {}", parent.display())
                })?;
            watched_dirs.push(parent);
        }

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            tiers,
            pending_user: None,
            pending_workspace: None,
        })
    }

    /// Tier changes that have settled past the debounce window.
    ///
    /// Rapid successive edits keep pushing the window; once quiet long
    /// enough, every pending tier is reported at once and the slate is
    /// wiped.
    pub fn poll(&mut self, debounce: Duration) -> Option<SettingsChange> {
        let tiers: Vec<SettingsTier> = self.receiver.try_iter().collect();
        for tier in tiers {
            self.record(tier);
        }

        let newest = self.pending_user.max(self.pending_workspace)?;
        if newest.elapsed() < debounce {
            return None;
        }

        Some(SettingsChange {
            user: self.pending_user.take().is_some(),
            workspace: self.pending_workspace.take().is_some(),
        })
    }

    /// Drop every cached scope when a settled change exists.
    ///
    /// Either tier changing shifts the layered result for all scopes, so
    /// the whole cache goes, not just one entry.
    pub fn invalidate(
        &mut self,
        cache: &mut ConfigCache,
        debounce: Duration,
    ) -> Option<SettingsChange> {
        let change = self.poll(debounce)?;
        log::info!(
            "Settings changed (user: {}, workspace: {}), clearing config cache",
            change.user,
            change.workspace
        );
        cache.clear_cache();
        Some(change)
    }

    /// Whether any tier change is waiting out the debounce window
    pub fn has_pending(&self) -> bool {
        self.pending_user.is_some() || self.pending_workspace.is_some()
    }

    /// The tier files under watch
    pub fn watched_paths(&self) -> impl Iterator<Item = &Path> {
        self.tiers.iter().map(|(_, path)| path.as_path())
    }

    fn record(&mut self, tier: SettingsTier) {
        let slot = match tier {
            SettingsTier::User => &mut self.pending_user,
            SettingsTier::Workspace => &mut self.pending_workspace,
        };
        *slot = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_settled_change_invalidates_cache() -> Result<()> {
        let workspace = tempdir()?;
        let config_path = workspace.path().join(WORKSPACE_CONFIG_FILE);
        std::fs::write(&config_path, "max_file_size = 10\n")?;

        let provider = FileConfigProvider::with_paths(None, Some(config_path.clone()));
        let mut cache = ConfigCache::new(Box::new(provider), Some(workspace.path().to_path_buf()));
        assert_eq!(cache.max_file_size(None), 10);

        let mut watcher = ConfigWatcher::new(None, Some(&config_path))?;
        std::fs::write(&config_path, "max_file_size = 20\n")?;
        watcher.record(SettingsTier::Workspace);

        let change = watcher.invalidate(&mut cache, Duration::ZERO);
        assert_eq!(
            change,
            Some(SettingsChange {
                user: false,
                workspace: true,
            })
        );
        assert_eq!(cache.max_file_size(None), 20);

        // Nothing further pending; the cache keeps the new value
        assert!(watcher.invalidate(&mut cache, Duration::ZERO).is_none());
        assert_eq!(cache.max_file_size(None), 20);

        Ok(())
    }

    #[test]
    fn test_debounce_holds_rapid_edits() -> Result<()> {
        let workspace = tempdir()?;
        let config_path = workspace.path().join(WORKSPACE_CONFIG_FILE);
        std::fs::write(&config_path, "enabled = true\n")?;

        let mut watcher = ConfigWatcher::new(None, Some(&config_path))?;
        watcher.record(SettingsTier::Workspace);

        assert!(watcher.poll(Duration::from_millis(250)).is_none());
        assert!(watcher.has_pending());

        // Once quiet past the window, the change is reported and cleared
        let change = watcher.poll(Duration::ZERO);
        assert!(matches!(change, Some(c) if c.workspace && !c.user));
        assert!(!watcher.has_pending());

        Ok(())
    }

    #[test]
    fn test_both_tiers_report_together() -> Result<()> {
        let dir = tempdir()?;
        let user_path = dir.path().join("mdr.toml");
        let workspace_path = dir.path().join(WORKSPACE_CONFIG_FILE);
        std::fs::write(&user_path, "")?;
        std::fs::write(&workspace_path, "")?;

        let mut watcher = ConfigWatcher::new(Some(&user_path), Some(&workspace_path))?;
        watcher.record(SettingsTier::User);
        watcher.record(SettingsTier::Workspace);

        let change = watcher.poll(Duration::ZERO);
        assert_eq!(
            change,
            Some(SettingsChange {
                user: true,
                workspace: true,
            })
        );

        Ok(())
    }

    #[test]
    fn test_fs_event_routes_to_workspace_tier() -> Result<()> {
        let dir = tempdir()?;
        let user_path = dir.path().join("mdr.toml");
        let workspace_path = dir.path().join(WORKSPACE_CONFIG_FILE);
        std::fs::write(&user_path, "enabled = true\n")?;
        std::fs::write(&workspace_path, "enabled = true\n")?;

        let mut watcher = ConfigWatcher::new(Some(&user_path), Some(&workspace_path))?;

        // File system events can take a while; rewrite until one lands
        let mut observed = None;
        for _ in 0..20 {
            std::fs::write(&workspace_path, "enabled = false\n")?;
            thread::sleep(Duration::from_millis(100));
            if let Some(change) = watcher.poll(Duration::ZERO) {
                observed = Some(change);
                break;
            }
        }

        assert!(matches!(observed, Some(c) if c.workspace && !c.user));
        Ok(())
    }

    #[test]
    fn test_requires_a_tier() {
        assert!(ConfigWatcher::new(None, None).is_err());
    }
}
