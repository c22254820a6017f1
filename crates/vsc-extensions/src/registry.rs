//! Registry of extensions that are not published on the marketplace.
//!
//! Some extensions only ship their platform-specific builds as GitHub
//! release assets. The registry maps their unique id to the repository and
//! the asset name to download on each platform.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::platform::{Platform, PlatformChoice};

/// Where a non-marketplace extension's releases live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GitHubSource {
    /// Repository owner
    pub owner: &'static str,
    /// Repository name
    pub repo: &'static str,
    /// Release asset to download, per platform
    pub asset_name: PlatformChoice<&'static str>,
}

impl GitHubSource {
    /// The asset name for `platform`
    pub fn asset_for(&self, platform: Platform) -> &'static str {
        self.asset_name.select(platform)
    }
}

static BUILTIN: LazyLock<NonMarketplaceRegistry> = LazyLock::new(|| {
    NonMarketplaceRegistry::new([(
        "ms-vscode.cpptools",
        GitHubSource {
            owner: "Microsoft",
            repo: "vscode-cpptools",
            asset_name: PlatformChoice {
                windows: "cpptools-win32.vsix",
                darwin: "cpptools-osx.vsix",
                linux64: "cpptools-linux.vsix",
                linux32: "cpptools-linux32.vsix",
            },
        },
    )])
});

/// Read-only mapping from unique id to [`GitHubSource`].
#[derive(Debug, Clone, Default)]
pub struct NonMarketplaceRegistry {
    entries: BTreeMap<&'static str, GitHubSource>,
}

impl NonMarketplaceRegistry {
    /// Build a registry from `(unique_id, source)` pairs
    pub fn new(entries: impl IntoIterator<Item = (&'static str, GitHubSource)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// The compiled-in registry, built once per process
    pub fn builtin() -> &'static Self {
        &BUILTIN
    }

    /// Look up an extension by exact unique id
    pub fn get(&self, unique_id: &str) -> Option<&GitHubSource> {
        self.entries.get(unique_id)
    }

    /// Iterate entries in id order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &GitHubSource)> {
        self.entries.iter().map(|(id, source)| (*id, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(owner: &'static str) -> GitHubSource {
        GitHubSource {
            owner,
            repo: "widget",
            asset_name: PlatformChoice {
                windows: "widget-win.vsix",
                darwin: "widget-mac.vsix",
                linux64: "widget-linux.vsix",
                linux32: "widget-linux32.vsix",
            },
        }
    }

    #[test]
    fn test_builtin_has_cpptools() {
        let registry = NonMarketplaceRegistry::builtin();
        let entry = registry.get("ms-vscode.cpptools").unwrap();
        assert_eq!(entry.owner, "Microsoft");
        assert_eq!(entry.repo, "vscode-cpptools");
        assert_eq!(entry.asset_for(Platform::Linux64), "cpptools-linux.vsix");
        assert_eq!(entry.asset_for(Platform::Linux32), "cpptools-linux32.vsix");
        assert_eq!(entry.asset_for(Platform::Windows), "cpptools-win32.vsix");
        assert_eq!(entry.asset_for(Platform::Darwin), "cpptools-osx.vsix");
    }

    #[test]
    fn test_lookup_is_exact() {
        let registry = NonMarketplaceRegistry::builtin();
        assert!(registry.get("MS-VSCODE.CPPTOOLS").is_none());
        assert!(registry.get("ms-vscode.cpptools ").is_none());
        assert!(registry.get("ms-vscode.cpptools-themes").is_none());
    }

    #[test]
    fn test_iter_is_sorted_by_id() {
        let registry =
            NonMarketplaceRegistry::new([("zeta.widget", source("z")), ("acme.widget", source("a"))]);
        let ids: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["acme.widget", "zeta.widget"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = NonMarketplaceRegistry::default();
        assert_eq!(registry.iter().count(), 0);
        assert!(registry.get("acme.widget").is_none());
    }
}
