//! `vsc install`: resolve and download extensions one at a time.

use std::path::{Path, PathBuf};

use colored::Colorize;
use vsc_extensions::id::parse_pinned;
use vsc_extensions::{Extension, resolve};
use vsc_tunnel::Channel;

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Arguments of one install run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRequest {
    /// `publisher.package[@release]` values, in the order given
    pub requested: Vec<String>,
    /// Release applied to ids without their own `@release`
    pub release: Option<String>,
    /// Overrides the `prerelease` setting when set
    pub prerelease: Option<bool>,
    /// Download directory on the channel's host
    pub remote_dir: PathBuf,
    /// Local directory downloads are copied into
    pub local_dir: Option<PathBuf>,
}

/// Result for a single requested extension
#[derive(Debug)]
pub struct InstallOutcome {
    pub requested: String,
    pub result: std::result::Result<PathBuf, vsc_extensions::Error>,
}

impl InstallOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Resolve and download every requested extension in order.
///
/// A failing extension is logged and recorded; the remaining ones are still
/// attempted.
pub fn install_all(
    channel: &dyn Channel,
    ctx: &AppContext,
    request: &InstallRequest,
) -> Result<Vec<InstallOutcome>> {
    let created = channel.ensure_dir(&request.remote_dir)?;
    if !created.success() {
        return Err(CliError::user(format!(
            "Cannot create download directory {} on {}: {}",
            request.remote_dir.display(),
            channel.describe(),
            created.stderr.trim()
        )));
    }

    let outcomes = request
        .requested
        .iter()
        .map(|requested| {
            let result = install_one(channel, ctx, request, requested);
            if let Err(e) = &result {
                tracing::error!(requested = %requested, "Failed to install extension: {e}");
            }
            InstallOutcome {
                requested: requested.clone(),
                result,
            }
        })
        .collect();
    Ok(outcomes)
}

fn install_one(
    channel: &dyn Channel,
    ctx: &AppContext,
    request: &InstallRequest,
    requested: &str,
) -> vsc_extensions::Result<PathBuf> {
    let (unique_id, pinned) = parse_pinned(requested)?;
    let release = pinned.as_deref().or(request.release.as_deref());
    let options = ctx.resolve_options(release, request.prerelease);

    let extension: Extension = resolve(&unique_id, channel, &options)?;
    super::warn_ignored_pin(&extension, pinned.as_deref());
    extension.download(channel, &request.remote_dir, request.local_dir.as_deref())
}

/// Handle `vsc install <ids...>`
pub fn handle_install(channel: &dyn Channel, ctx: &AppContext, request: &InstallRequest) -> Result<()> {
    let outcomes = install_all(channel, ctx, request)?;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!(
                "{} {} {}",
                "=>".blue().bold(),
                outcome.requested.cyan(),
                display_path(path).dimmed()
            ),
            Err(e) => println!("{} {} {}", "=>".red().bold(), outcome.requested.cyan(), e.to_string().red()),
        }
    }

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.succeeded())
        .map(|o| o.requested.as_str())
        .collect();
    let installed = outcomes.len() - failed.len();

    println!();
    println!(
        "{} {} of {} extension(s) downloaded via {}",
        "Done:".bold(),
        installed.to_string().green(),
        outcomes.len(),
        channel.describe()
    );

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::user(format!(
            "{} extension(s) failed: {}",
            failed.len(),
            failed.join(", ")
        )))
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
