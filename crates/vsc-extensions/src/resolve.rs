//! Source selection: GitHub registry first, marketplace otherwise.

use vsc_tunnel::Channel;

use crate::error::Result;
use crate::extension::Extension;
use crate::github::{GitHubExtension, Release};
use crate::id::ExtensionId;
use crate::marketplace::Marketplace;
use crate::platform::Platform;
use crate::registry::NonMarketplaceRegistry;

/// Caller choices for a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResolveOptions {
    /// Release to install; only honoured for GitHub-hosted extensions
    pub release: Release,
    /// Whether the newest GitHub release may be a prerelease
    pub prerelease: bool,
    /// Platform whose GitHub asset is selected; detected from the build
    /// target when unset. Marketplace lookups never need it.
    pub platform: Option<Platform>,
}

impl ResolveOptions {
    /// Latest stable release, platform detected on demand
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_release(mut self, release: Release) -> Self {
        self.release = release;
        self
    }

    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }
}

/// Resolve `unique_id` using the built-in registry.
///
/// Ids in the [`NonMarketplaceRegistry`] become GitHub extensions with the
/// asset for `options.platform`; any other id is looked up on the
/// marketplace, failing with [`Error::NotFound`](crate::Error::NotFound)
/// when it has no record there. Only a registry hit detects the platform,
/// so an unsupported host can still resolve marketplace extensions.
pub fn resolve(
    unique_id: &ExtensionId,
    channel: &dyn Channel,
    options: &ResolveOptions,
) -> Result<Extension> {
    resolve_with(NonMarketplaceRegistry::builtin(), unique_id, channel, options)
}

/// Resolve `unique_id` against an explicit registry.
pub fn resolve_with(
    registry: &NonMarketplaceRegistry,
    unique_id: &ExtensionId,
    channel: &dyn Channel,
    options: &ResolveOptions,
) -> Result<Extension> {
    match registry.get(unique_id.as_str()) {
        Some(source) => {
            let platform = match options.platform {
                Some(platform) => platform,
                None => Platform::detect()?,
            };
            tracing::debug!(
                %unique_id,
                owner = source.owner,
                repo = source.repo,
                release = %options.release,
                %platform,
                "Resolving from GitHub"
            );
            let ext = GitHubExtension::new(
                unique_id.clone(),
                source.owner,
                source.repo,
                source.asset_for(platform),
            )
            .with_release(options.release.clone())
            .with_prerelease(options.prerelease)
            .resolve(channel)?;
            Ok(Extension::GitHub(ext))
        }
        None => {
            tracing::debug!(%unique_id, "Resolving from marketplace");
            Ok(Extension::Marketplace(Marketplace::new(channel).get(unique_id)?))
        }
    }
}
