//! Command implementations
//!
//! Each submodule exposes a `handle_*` entry point that prints to stdout,
//! backed by plain functions that take a [`Channel`] so they can be driven
//! by a scripted channel in tests.

pub mod info;
pub mod install;
pub mod registry;
pub mod resolve;

use clap::CommandFactory;
use vsc_extensions::{Extension, SourceType};
use vsc_tunnel::Channel;

use crate::cli::{Cli, Commands, prerelease_override};
use crate::context::AppContext;
use crate::error::Result;

pub use info::handle_info;
pub use install::handle_install;
pub use registry::handle_registry;
pub use resolve::handle_resolve;

/// Marketplace extensions only ever resolve to their newest version.
fn warn_ignored_pin(extension: &Extension, pinned: Option<&str>) {
    if let Some(release) = pinned {
        if extension.source_type() == SourceType::Marketplace {
            tracing::warn!(
                unique_id = %extension.unique_id(),
                release,
                "Release pin ignored for marketplace extension"
            );
        }
    }
}

/// Dispatch a parsed command.
pub fn execute(command: Commands, ctx: &AppContext) -> Result<()> {
    let channel: Box<dyn Channel> = ctx.channel();
    tracing::debug!(channel = %channel.describe(), platform = ?ctx.platform, "Executing command");

    match command {
        Commands::Install {
            ids,
            release,
            prerelease,
            no_prerelease,
            output_dir,
            remote_output_dir,
        } => {
            let request = install::InstallRequest {
                requested: ids,
                release,
                prerelease: prerelease_override(prerelease, no_prerelease),
                remote_dir: remote_output_dir.unwrap_or_else(|| ctx.remote_output_dir.clone()),
                local_dir: output_dir.or_else(|| ctx.output_dir.clone()),
            };
            ctx.check_tools(request.local_dir.is_some())?;
            handle_install(&*channel, ctx, &request)
        }
        Commands::Info { id, json } => handle_info(&*channel, ctx, &id, json),
        Commands::Resolve {
            id,
            release,
            prerelease,
            no_prerelease,
        } => handle_resolve(
            &*channel,
            ctx,
            &id,
            release.as_deref(),
            prerelease_override(prerelease, no_prerelease),
        ),
        Commands::Registry { json } => handle_registry(ctx, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "vsc", &mut std::io::stdout());
            Ok(())
        }
    }
}
