//! `vsc resolve`: print the URL an extension would be downloaded from.

use vsc_extensions::id::parse_pinned;
use vsc_extensions::{Error, resolve};
use vsc_tunnel::Channel;

use crate::context::AppContext;
use crate::error::Result;

/// Download URL for `requested`; a `@release` suffix wins over `release`.
pub fn resolve_url(
    channel: &dyn Channel,
    ctx: &AppContext,
    requested: &str,
    release: Option<&str>,
    prerelease: Option<bool>,
) -> Result<String> {
    let (unique_id, pinned) = parse_pinned(requested)?;
    let options = ctx.resolve_options(pinned.as_deref().or(release), prerelease);
    let ext = resolve(&unique_id, channel, &options)?;
    super::warn_ignored_pin(&ext, pinned.as_deref());

    match ext.download_url() {
        Some(url) => Ok(url.to_string()),
        None => Err(Error::UnresolvedUrl(unique_id.to_string()).into()),
    }
}

/// Handle `vsc resolve <id> [--release TAG] [--[no-]prerelease]`
pub fn handle_resolve(
    channel: &dyn Channel,
    ctx: &AppContext,
    requested: &str,
    release: Option<&str>,
    prerelease: Option<bool>,
) -> Result<()> {
    println!("{}", resolve_url(channel, ctx, requested, release, prerelease)?);
    Ok(())
}
