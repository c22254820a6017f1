/// Errors that can occur while resolving or downloading an extension.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No marketplace record or release exists for the extension.
    #[error("extension not found: {0}")]
    NotFound(String),

    /// A release exists but carries no asset with the expected name.
    #[error("asset '{asset}' not found in release of {owner}/{repo}")]
    AssetNotFound {
        owner: String,
        repo: String,
        asset: String,
    },

    /// The host platform has no mapping.
    #[error("unsupported platform: {os} ({pointer_width}-bit)")]
    UnsupportedPlatform { os: String, pointer_width: u32 },

    /// A request command ran but exited non-zero.
    #[error("request to {url} failed (exit code {exited}): {stderr}")]
    TransportFailure {
        url: String,
        exited: i32,
        stderr: String,
    },

    /// The download command ran but the transfer failed.
    #[error("download of '{unique_id}' failed (exit code {exited}): {stderr}")]
    DownloadFailed {
        unique_id: String,
        exited: i32,
        stderr: String,
    },

    /// The extension resolved without a download URL.
    #[error("no download URL resolved for '{0}'")]
    UnresolvedUrl(String),

    /// Malformed `publisher.package` identifier.
    #[error("invalid extension id '{id}': {reason}")]
    InvalidId { id: String, reason: String },

    /// A response body did not have the expected shape.
    #[error("invalid response from {source_name}: {reason}")]
    InvalidResponse { source_name: String, reason: String },

    /// The channel could not run a command.
    #[error(transparent)]
    Channel(#[from] vsc_tunnel::TunnelError),
}

pub type Result<T> = std::result::Result<T, Error>;
