//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// vsc - Install editor extensions from the marketplace or GitHub releases
#[derive(Parser, Debug)]
#[command(name = "vsc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run network commands on this SSH host (`[user@]host[:port]`)
    #[arg(long, global = true, env = "VSC_HOST")]
    pub host: Option<String>,

    /// SSH jump host used to reach --host
    #[arg(long, global = true, env = "VSC_GATEWAY")]
    pub gateway: Option<String>,

    /// Platform whose release assets are selected (windows, darwin, linux64, linux32)
    #[arg(long, global = true, env = "VSC_PLATFORM")]
    pub platform: Option<String>,

    /// Settings file to use instead of ./.vscrc.toml
    #[arg(long, global = true, env = "VSC_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Download one or more extensions
    ///
    /// Each id is `publisher.package`, optionally followed by `@release`
    /// to pin a GitHub release tag.
    ///
    /// Examples:
    ///   vsc install twxs.cmake
    ///   vsc install ms-vscode.cpptools@v1.20.5
    ///   vsc --host dev@centos install ms-python.python -o ./vsix
    #[command(visible_aliases = ["i", "add"])]
    Install {
        /// Extension ids (`publisher.package[@release]`)
        #[arg(required = true)]
        ids: Vec<String>,

        /// Release tag for GitHub-hosted extensions
        #[arg(short, long)]
        release: Option<String>,

        /// Allow prereleases when picking the latest GitHub release
        #[arg(long, env = "VSC_PRERELEASE", overrides_with = "no_prerelease")]
        prerelease: bool,

        /// Stick to stable releases even when settings allow prereleases
        #[arg(long, overrides_with = "prerelease")]
        no_prerelease: bool,

        /// Copy downloads into this local directory
        #[arg(short, long, env = "VSC_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Download directory on the host that runs the transfer
        #[arg(long, env = "VSC_REMOTE_OUTPUT_DIR")]
        remote_output_dir: Option<PathBuf>,
    },

    /// Show metadata for an extension
    #[command(visible_aliases = ["show", "view"])]
    Info {
        /// Extension id (`publisher.package`)
        id: String,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the download URL of an extension
    Resolve {
        /// Extension id (`publisher.package[@release]`)
        id: String,

        /// Release tag for GitHub-hosted extensions
        #[arg(short, long)]
        release: Option<String>,

        /// Allow prereleases when picking the latest GitHub release
        #[arg(long, env = "VSC_PRERELEASE", overrides_with = "no_prerelease")]
        prerelease: bool,

        /// Stick to stable releases even when settings allow prereleases
        #[arg(long, overrides_with = "prerelease")]
        no_prerelease: bool,
    },

    /// List extensions that are downloaded from GitHub releases
    Registry {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   vsc completions bash > ~/.local/share/bash-completion/completions/vsc
    ///   vsc completions zsh > ~/.zfunc/_vsc
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// `--prerelease` / `--no-prerelease` as an override of the settings value.
///
/// Both are only set together when `VSC_PRERELEASE` fills in `prerelease`,
/// in which case the flag on the command line wins.
pub fn prerelease_override(prerelease: bool, no_prerelease: bool) -> Option<bool> {
    match (prerelease, no_prerelease) {
        (_, true) => Some(false),
        (true, false) => Some(true),
        (false, false) => None,
    }
}
