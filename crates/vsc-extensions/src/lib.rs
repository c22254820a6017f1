//! Extension source resolution for vsc.
//!
//! Given an extension's unique id (`publisher.package`), this crate decides
//! where the extension is hosted, resolves a concrete download URL and
//! downloads the `.vsix` through a [`vsc_tunnel::Channel`]:
//!
//! - ids listed in the [`NonMarketplaceRegistry`] come from GitHub releases
//!   ([`github`]), with a platform-specific asset name
//! - everything else is looked up on the marketplace ([`marketplace`])
//!
//! Both paths produce an [`Extension`], whose [`download`](Extension::download)
//! behaves the same regardless of source.

pub mod error;
pub mod extension;
pub mod github;
pub mod id;
pub mod marketplace;
pub mod platform;
pub mod registry;
pub mod resolve;

pub use error::{Error, Result};
pub use extension::{Extension, SourceType};
pub use github::{GitHubExtension, Release};
pub use id::ExtensionId;
pub use marketplace::{Marketplace, MarketplaceExtension};
pub use platform::{Platform, PlatformChoice};
pub use registry::{GitHubSource, NonMarketplaceRegistry};
pub use resolve::{ResolveOptions, resolve, resolve_with};
