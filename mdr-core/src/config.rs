//! Configuration resolution, caching, and exclusion matching

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::doc::DocumentUri;

/// Cache key used when no resource scope is given
pub const GLOBAL_SCOPE_KEY: &str = "<global>";

/// Workspace-local settings file name
pub const WORKSPACE_CONFIG_FILE: &str = ".mdr.toml";

/// Effective settings for one resource scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    pub enabled: bool,
    pub exclude_patterns: Vec<String>,
    pub max_file_size: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exclude_patterns: vec![
                "**/node_modules/**".to_string(),
                "**/.git/**".to_string(),
            ],
            max_file_size: 1_048_576,
        }
    }
}

/// Partial settings from a single tier (user file, workspace file).
/// Absent fields leave the lower tier's value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub enabled: Option<bool>,
    pub exclude_patterns: Option<Vec<String>>,
    pub max_file_size: Option<u64>,
}

impl ConfigPatch {
    /// Parse a tier file.
    ///
    /// World-writable files are rejected so another local user cannot
    /// inject settings.
    pub fn from_file(path: &Path) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = std::fs::metadata(path)?;
            if metadata.permissions().mode() & 0o002 != 0 {
                anyhow::bail!(
                    "Config file {} is world-writable (insecure permissions)",
                    path.display()
                );
            }
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply(&self, config: &mut ReaderConfig) {
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(patterns) = &self.exclude_patterns {
            config.exclude_patterns = patterns.clone();
        }
        if let Some(max) = self.max_file_size {
            config.max_file_size = max;
        }
    }
}

/// One setting's value per tier, for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectedValue<T> {
    pub default_value: Option<T>,
    pub global_value: Option<T>,
    pub workspace_value: Option<T>,
    pub workspace_folder_value: Option<T>,
}

/// Per-tier origins of every setting in one scope
#[derive(Debug, Clone, Default)]
pub struct ConfigInspection {
    pub enabled: InspectedValue<bool>,
    pub exclude_patterns: InspectedValue<Vec<String>>,
    pub max_file_size: InspectedValue<u64>,
}

/// Render one inspected setting for diagnostics output
pub fn describe_inspection<T: fmt::Debug>(inspection: Option<&InspectedValue<T>>) -> String {
    let Some(value) = inspection else {
        return "unavailable".to_string();
    };

    let tiers = [
        ("default", &value.default_value),
        ("user", &value.global_value),
        ("workspace", &value.workspace_value),
        ("folder", &value.workspace_folder_value),
    ];
    let parts: Vec<String> = tiers
        .iter()
        .filter_map(|(label, tier)| tier.as_ref().map(|v| format!("{label}={v:?}")))
        .collect();

    if parts.is_empty() {
        "unset".to_string()
    } else {
        parts.join(" | ")
    }
}

/// Source of raw settings, resolved per scope
pub trait ConfigProvider {
    fn load(&self, scope: Option<&DocumentUri>) -> ReaderConfig;
    fn inspect(&self, scope: Option<&DocumentUri>) -> ConfigInspection;
}

/// Provider layering TOML files: defaults, then the user config file,
/// then the workspace file.
pub struct FileConfigProvider {
    global_path: Option<PathBuf>,
    workspace_path: Option<PathBuf>,
}

impl FileConfigProvider {
    /// Locate the tier files for this platform and workspace
    pub fn discover(workspace_root: Option<&Path>) -> Self {
        Self {
            global_path: Self::user_config_path(),
            workspace_path: workspace_root.map(|root| root.join(WORKSPACE_CONFIG_FILE)),
        }
    }

    /// Build a provider over explicit tier files
    pub fn with_paths(global_path: Option<PathBuf>, workspace_path: Option<PathBuf>) -> Self {
        Self {
            global_path,
            workspace_path,
        }
    }

    /// Platform-specific user config file path
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "mdr")
            .map(|proj_dirs| proj_dirs.config_dir().join("mdr.toml"))
    }

    fn tier_patch(path: Option<&Path>) -> Option<ConfigPatch> {
        let path = path.filter(|p| p.exists())?;
        match ConfigPatch::from_file(path) {
            Ok(patch) => Some(patch),
            Err(err) => {
                log::warn!("Ignoring config tier {}: {err:#}", path.display());
                None
            }
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn load(&self, _scope: Option<&DocumentUri>) -> ReaderConfig {
        let mut config = ReaderConfig::default();
        if let Some(patch) = Self::tier_patch(self.global_path.as_deref()) {
            patch.apply(&mut config);
        }
        if let Some(patch) = Self::tier_patch(self.workspace_path.as_deref()) {
            patch.apply(&mut config);
        }
        config
    }

    fn inspect(&self, _scope: Option<&DocumentUri>) -> ConfigInspection {
        let defaults = ReaderConfig::default();
        let global = Self::tier_patch(self.global_path.as_deref()).unwrap_or_default();
        let workspace = Self::tier_patch(self.workspace_path.as_deref()).unwrap_or_default();

        ConfigInspection {
            enabled: InspectedValue {
                default_value: Some(defaults.enabled),
                global_value: global.enabled,
                workspace_value: workspace.enabled,
                workspace_folder_value: None,
            },
            exclude_patterns: InspectedValue {
                default_value: Some(defaults.exclude_patterns),
                global_value: global.exclude_patterns,
                workspace_value: workspace.exclude_patterns,
                workspace_folder_value: None,
            },
            max_file_size: InspectedValue {
                default_value: Some(defaults.max_file_size),
                global_value: global.max_file_size,
                workspace_value: workspace.max_file_size,
                workspace_folder_value: None,
            },
        }
    }
}

struct CachedScope {
    config: ReaderConfig,
    exclude: GlobSet,
}

/// Memoizing front for the configuration provider.
///
/// One entry per scope key; entries live until `reload` or `clear_cache`.
/// The cache never invalidates itself — an external observer of settings
/// changes owns that. All settings reads go through here so one logical
/// operation never sees two different resolutions.
pub struct ConfigCache {
    provider: Box<dyn ConfigProvider>,
    workspace_root: Option<PathBuf>,
    cached: HashMap<String, CachedScope>,
}

impl ConfigCache {
    pub fn new(provider: Box<dyn ConfigProvider>, workspace_root: Option<PathBuf>) -> Self {
        Self {
            provider,
            workspace_root,
            cached: HashMap::new(),
        }
    }

    /// Resolved configuration for a scope, cached on first request
    pub fn config(&mut self, scope: Option<&DocumentUri>) -> &ReaderConfig {
        &self.resolve(scope).config
    }

    pub fn enabled(&mut self, scope: Option<&DocumentUri>) -> bool {
        self.config(scope).enabled
    }

    pub fn exclude_patterns(&mut self, scope: Option<&DocumentUri>) -> Vec<String> {
        self.config(scope).exclude_patterns.clone()
    }

    pub fn max_file_size(&mut self, scope: Option<&DocumentUri>) -> u64 {
        self.config(scope).max_file_size
    }

    /// Force recomputation for one scope
    pub fn reload(&mut self, scope: Option<&DocumentUri>) -> &ReaderConfig {
        let key = Self::scope_key(scope);
        let entry = Self::build_entry(self.provider.load(scope));
        self.cached.insert(key.clone(), entry);
        &self.cached[&key].config
    }

    /// Drop every cached scope
    pub fn clear_cache(&mut self) {
        self.cached.clear();
    }

    /// Per-tier origins, straight from the provider (never cached)
    pub fn inspect(&self, scope: Option<&DocumentUri>) -> ConfigInspection {
        self.provider.inspect(scope)
    }

    /// True when the resource matches any configured exclude pattern.
    ///
    /// The path is matched relative to the workspace root when the
    /// resource lives under it; patterns apply case-insensitively and see
    /// dotted segments.
    pub fn is_excluded(&mut self, uri: &DocumentUri) -> bool {
        let relative = self.relative_path(uri);
        self.resolve(Some(uri)).exclude.is_match(&relative)
    }

    fn relative_path(&self, uri: &DocumentUri) -> PathBuf {
        match &self.workspace_root {
            Some(root) => uri
                .path()
                .strip_prefix(root)
                .unwrap_or(uri.path())
                .to_path_buf(),
            None => uri.path().to_path_buf(),
        }
    }

    fn resolve(&mut self, scope: Option<&DocumentUri>) -> &CachedScope {
        let key = Self::scope_key(scope);
        if !self.cached.contains_key(&key) {
            let entry = Self::build_entry(self.provider.load(scope));
            self.cached.insert(key.clone(), entry);
        }
        &self.cached[&key]
    }

    fn build_entry(config: ReaderConfig) -> CachedScope {
        let exclude = build_exclude_set(&config.exclude_patterns);
        CachedScope { config, exclude }
    }

    fn scope_key(scope: Option<&DocumentUri>) -> String {
        scope
            .map(DocumentUri::to_key)
            .unwrap_or_else(|| GLOBAL_SCOPE_KEY.to_string())
    }
}

fn build_exclude_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match GlobBuilder::new(pattern)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
        {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(err) => log::warn!("Ignoring invalid exclude pattern {pattern:?}: {err}"),
        }
    }
    builder.build().unwrap_or_else(|err| {
        log::warn!("Failed to build exclude matcher: {err}");
        GlobSet::empty()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Write;
    use std::rc::Rc;
    use tempfile::NamedTempFile;

    struct CountingProvider {
        config: ReaderConfig,
        loads: Rc<RefCell<usize>>,
    }

    impl ConfigProvider for CountingProvider {
        fn load(&self, _scope: Option<&DocumentUri>) -> ReaderConfig {
            *self.loads.borrow_mut() += 1;
            self.config.clone()
        }

        fn inspect(&self, _scope: Option<&DocumentUri>) -> ConfigInspection {
            ConfigInspection::default()
        }
    }

    fn counting_cache(config: ReaderConfig) -> (ConfigCache, Rc<RefCell<usize>>) {
        let loads = Rc::new(RefCell::new(0));
        let provider = CountingProvider {
            config,
            loads: Rc::clone(&loads),
        };
        (ConfigCache::new(Box::new(provider), None), loads)
    }

    fn patterns_config(patterns: &[&str]) -> ReaderConfig {
        ReaderConfig {
            exclude_patterns: patterns.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ReaderConfig::default();
        assert!(config.enabled);
        assert_eq!(
            config.exclude_patterns,
            ["**/node_modules/**", "**/.git/**"]
        );
        assert_eq!(config.max_file_size, 1_048_576);
    }

    #[test]
    fn test_patch_from_valid_toml() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"enabled = false\nmax_file_size = 2048\n")?;

        let patch = ConfigPatch::from_file(file.path())?;
        assert_eq!(patch.enabled, Some(false));
        assert_eq!(patch.exclude_patterns, None);
        assert_eq!(patch.max_file_size, Some(2048));

        Ok(())
    }

    #[test]
    fn test_patch_from_invalid_toml_fails() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"invalid toml [[[syntax")?;

        assert!(ConfigPatch::from_file(file.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_tier_layering() -> Result<()> {
        let mut global = NamedTempFile::new()?;
        global.write_all(b"enabled = false\nmax_file_size = 10\n")?;
        let mut workspace = NamedTempFile::new()?;
        workspace.write_all(b"max_file_size = 20\n")?;

        let provider = FileConfigProvider::with_paths(
            Some(global.path().to_path_buf()),
            Some(workspace.path().to_path_buf()),
        );
        let config = provider.load(None);

        // Workspace overrides global, global overrides defaults,
        // untouched fields keep their defaults.
        assert!(!config.enabled);
        assert_eq!(config.max_file_size, 20);
        assert_eq!(
            config.exclude_patterns,
            ReaderConfig::default().exclude_patterns
        );

        Ok(())
    }

    #[test]
    fn test_missing_tier_files_yield_defaults() {
        let provider = FileConfigProvider::with_paths(
            Some(PathBuf::from("/nonexistent/mdr.toml")),
            None,
        );
        assert_eq!(provider.load(None), ReaderConfig::default());
    }

    #[test]
    fn test_inspect_reports_tier_origins() -> Result<()> {
        let mut workspace = NamedTempFile::new()?;
        workspace.write_all(b"enabled = false\n")?;

        let provider =
            FileConfigProvider::with_paths(None, Some(workspace.path().to_path_buf()));
        let inspection = provider.inspect(None);

        assert_eq!(inspection.enabled.default_value, Some(true));
        assert_eq!(inspection.enabled.global_value, None);
        assert_eq!(inspection.enabled.workspace_value, Some(false));
        assert_eq!(inspection.max_file_size.workspace_value, None);

        Ok(())
    }

    #[test]
    fn test_describe_inspection() {
        assert_eq!(describe_inspection::<bool>(None), "unavailable");
        assert_eq!(
            describe_inspection(Some(&InspectedValue::<bool>::default())),
            "unset"
        );
        assert_eq!(
            describe_inspection(Some(&InspectedValue {
                default_value: Some(true),
                global_value: Some(false),
                workspace_value: None,
                workspace_folder_value: None,
            })),
            "default=true | user=false"
        );
    }

    #[test]
    fn test_cache_resolves_once_per_scope() {
        let (mut cache, loads) = counting_cache(ReaderConfig::default());
        let uri = DocumentUri::file("/workspace/readme.md");

        cache.config(Some(&uri));
        cache.config(Some(&uri));
        cache.enabled(Some(&uri));
        assert_eq!(*loads.borrow(), 1);

        // Global scope is a distinct entry
        cache.config(None);
        assert_eq!(*loads.borrow(), 2);
    }

    #[test]
    fn test_reload_recomputes_one_scope() {
        let (mut cache, loads) = counting_cache(ReaderConfig::default());
        let uri = DocumentUri::file("/workspace/readme.md");

        cache.config(Some(&uri));
        cache.reload(Some(&uri));
        cache.config(Some(&uri));
        assert_eq!(*loads.borrow(), 2);
    }

    #[test]
    fn test_clear_cache_drops_all_scopes() {
        let (mut cache, loads) = counting_cache(ReaderConfig::default());
        let uri = DocumentUri::file("/workspace/readme.md");

        cache.config(Some(&uri));
        cache.config(None);
        cache.clear_cache();
        cache.config(Some(&uri));
        cache.config(None);
        assert_eq!(*loads.borrow(), 4);
    }

    #[test]
    fn test_is_excluded_empty_patterns() {
        let (mut cache, _) = counting_cache(patterns_config(&[]));
        assert!(!cache.is_excluded(&DocumentUri::file("/workspace/readme.md")));
    }

    #[test]
    fn test_is_excluded_node_modules() {
        let provider = CountingProvider {
            config: patterns_config(&["**/node_modules/**"]),
            loads: Rc::new(RefCell::new(0)),
        };
        let mut cache =
            ConfigCache::new(Box::new(provider), Some(PathBuf::from("/workspace")));

        assert!(cache.is_excluded(&DocumentUri::file("/workspace/node_modules/lib/readme.md")));
        assert!(!cache.is_excluded(&DocumentUri::file("/workspace/src/readme.md")));
    }

    #[test]
    fn test_is_excluded_case_insensitive_and_dotted() {
        let (mut cache, _) = counting_cache(patterns_config(&["**/BUILD/**", "**/.git/**"]));

        assert!(cache.is_excluded(&DocumentUri::file("build/out/readme.md")));
        assert!(cache.is_excluded(&DocumentUri::file(".git/COMMIT_EDITMSG")));
    }

    #[test]
    fn test_is_excluded_invalid_pattern_skipped() {
        let (mut cache, _) = counting_cache(patterns_config(&["a{b", "**/skip/**"]));

        // The broken pattern is dropped; the valid one still applies.
        assert!(cache.is_excluded(&DocumentUri::file("docs/skip/readme.md")));
        assert!(!cache.is_excluded(&DocumentUri::file("docs/keep/readme.md")));
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let (mut cache, _) =
            counting_cache(patterns_config(&["**/vendor/**", "**/vendor/**"]));
        assert!(cache.is_excluded(&DocumentUri::file("vendor/readme.md")));
    }
}
