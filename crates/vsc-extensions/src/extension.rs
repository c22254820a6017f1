//! The resolved extension and its download.

use std::path::{Path, PathBuf};

use serde::Serialize;
use vsc_tunnel::{Channel, CurlRequest};

use crate::error::{Error, Result};
use crate::github::GitHubExtension;
use crate::id::ExtensionId;
use crate::marketplace::MarketplaceExtension;

/// Where an extension is downloaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Undefined,
    Marketplace,
    #[serde(rename = "github")]
    GitHub,
}

/// A resolved extension from either source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Extension {
    #[serde(rename = "github")]
    GitHub(GitHubExtension),
    Marketplace(MarketplaceExtension),
}

impl Extension {
    pub fn unique_id(&self) -> &ExtensionId {
        match self {
            Self::GitHub(ext) => ext.unique_id(),
            Self::Marketplace(ext) => &ext.unique_id,
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            Self::GitHub(_) => SourceType::GitHub,
            Self::Marketplace(_) => SourceType::Marketplace,
        }
    }

    /// The URL the `.vsix` is fetched from; `None` when resolution degraded
    pub fn download_url(&self) -> Option<&str> {
        match self {
            Self::GitHub(ext) => ext.download_url(),
            Self::Marketplace(ext) => ext.download_url(),
        }
    }

    /// Version, when the source reports one
    pub fn version(&self) -> Option<&str> {
        match self {
            Self::GitHub(_) => None,
            Self::Marketplace(ext) => Some(&ext.version),
        }
    }

    /// `{unique_id}.vsix`, or `{unique_id}-{version}.vsix` when the version is known
    pub fn file_name(&self) -> String {
        match self.version() {
            Some(version) => format!("{}-{}.vsix", self.unique_id(), version),
            None => format!("{}.vsix", self.unique_id()),
        }
    }

    /// Download the `.vsix` into `remote_dir` on the channel's host.
    ///
    /// When `local_dir` is given the file is then copied there through the
    /// channel and the local path is returned; otherwise the path on the
    /// channel's host is returned. A failed transfer is logged with its
    /// stderr and returned as [`Error::DownloadFailed`]; nothing is retried.
    pub fn download(
        &self,
        channel: &dyn Channel,
        remote_dir: &Path,
        local_dir: Option<&Path>,
    ) -> Result<PathBuf> {
        let unique_id = self.unique_id();
        let url = self
            .download_url()
            .ok_or_else(|| Error::UnresolvedUrl(unique_id.to_string()))?;
        let remote_path = remote_dir.join(self.file_name());

        let request = CurlRequest::get(url).output(&remote_path);
        tracing::debug!(%unique_id, %url, path = %remote_path.display(), "Downloading extension");

        let output = channel.run(&request.into_command())?;
        if !output.success() {
            tracing::error!(
                %unique_id,
                %url,
                exited = output.exited,
                "Download failed: {}",
                output.stderr.trim()
            );
            return Err(Error::DownloadFailed {
                unique_id: unique_id.to_string(),
                exited: output.exited,
                stderr: output.stderr.trim().to_string(),
            });
        }

        tracing::info!(
            %unique_id,
            path = %remote_path.display(),
            via = %channel.describe(),
            "Downloaded extension {}",
            output.stdout.trim()
        );

        match local_dir {
            Some(local_dir) => Ok(channel.fetch(&remote_path, local_dir)?),
            None => Ok(remote_path),
        }
    }
}

impl From<GitHubExtension> for Extension {
    fn from(ext: GitHubExtension) -> Self {
        Self::GitHub(ext)
    }
}

impl From<MarketplaceExtension> for Extension {
    fn from(ext: MarketplaceExtension) -> Self {
        Self::Marketplace(ext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::Release;
    use crate::marketplace::AssetUris;
    use pretty_assertions::assert_eq;
    use vsc_test_utils::{LogCapture, ScriptedChannel};
    use vsc_tunnel::CommandOutput;

    fn github_ext() -> Extension {
        let channel = ScriptedChannel::new();
        GitHubExtension::new(
            ExtensionId::parse("acme.widget").unwrap(),
            "acme",
            "widget",
            "widget-linux.vsix",
        )
        .with_release(Release::Tag("v1.2".into()))
        .resolve(&channel)
        .unwrap()
        .into()
    }

    fn marketplace_ext(vsix: Option<&str>) -> Extension {
        MarketplaceExtension {
            unique_id: ExtensionId::parse("twxs.cmake").unwrap(),
            extension_id: "id".into(),
            extension_name: "cmake".into(),
            display_name: Some("CMake".into()),
            publisher_name: "twxs".into(),
            description: None,
            stats: vec![],
            version: "0.0.17".into(),
            uri: AssetUris {
                vsix_package: vsix.map(str::to_string),
                ..AssetUris::default()
            },
            code_engine: None,
            extension_pack: None,
            extension_dependencies: None,
        }
        .into()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(github_ext().file_name(), "acme.widget.vsix");
        assert_eq!(
            marketplace_ext(Some("u")).file_name(),
            "twxs.cmake-0.0.17.vsix"
        );
    }

    #[test]
    fn test_shared_accessors() {
        let ext = github_ext();
        assert_eq!(ext.source_type(), SourceType::GitHub);
        assert_eq!(ext.unique_id().as_str(), "acme.widget");
        assert_eq!(
            ext.download_url(),
            Some("https://github.com/acme/widget/releases/download/v1.2/widget-linux.vsix")
        );

        let ext = marketplace_ext(Some("https://cdn/cmake.vsix"));
        assert_eq!(ext.source_type(), SourceType::Marketplace);
        assert_eq!(ext.download_url(), Some("https://cdn/cmake.vsix"));
        assert_eq!(ext.version(), Some("0.0.17"));
    }

    #[test]
    fn test_download_writes_into_remote_dir() {
        let channel = ScriptedChannel::new().respond("curl", CommandOutput::ok(""));
        let path = marketplace_ext(Some("https://cdn/cmake.vsix"))
            .download(&channel, Path::new("/tmp/vsc"), None)
            .unwrap();

        assert_eq!(path, PathBuf::from("/tmp/vsc/twxs.cmake-0.0.17.vsix"));
        let lines = channel.command_lines();
        assert_eq!(lines.len(), 1);
        assert!(
            lines[0].ends_with("--output /tmp/vsc/twxs.cmake-0.0.17.vsix https://cdn/cmake.vsix"),
            "got: {}",
            lines[0]
        );
        assert!(channel.fetched().is_empty());
    }

    #[test]
    fn test_download_fetches_to_local_dir() {
        let channel = ScriptedChannel::new().respond("curl", CommandOutput::ok(""));
        let path = github_ext()
            .download(&channel, Path::new("/tmp/vsc"), Some(Path::new("/home/me/dl")))
            .unwrap();

        assert_eq!(path, PathBuf::from("/home/me/dl/acme.widget.vsix"));
        assert_eq!(
            channel.fetched(),
            vec![PathBuf::from("/tmp/vsc/acme.widget.vsix")]
        );
    }

    #[test]
    fn test_failed_download_logs_stderr_and_returns_error() {
        let logs = LogCapture::new();
        let channel = ScriptedChannel::new().respond("curl", CommandOutput::failed(1, "not found"));

        let result = logs.in_scope(|| github_ext().download(&channel, Path::new("/tmp/vsc"), None));

        let err = result.unwrap_err();
        assert!(
            matches!(err, Error::DownloadFailed { exited: 1, ref stderr, .. } if stderr == "not found"),
            "expected DownloadFailed, got: {err:?}"
        );
        let errors = logs.lines_at("ERROR");
        assert_eq!(errors.len(), 1, "logs: {}", logs.contents());
        assert!(errors[0].contains("not found"));
        assert!(channel.fetched().is_empty());
    }

    #[test]
    fn test_download_without_url_is_unresolved() {
        let channel = ScriptedChannel::new();
        let err = marketplace_ext(None)
            .download(&channel, Path::new("/tmp/vsc"), None)
            .unwrap_err();
        assert!(
            matches!(err, Error::UnresolvedUrl(ref id) if id == "twxs.cmake"),
            "got: {err:?}"
        );
        assert!(channel.commands().is_empty());
    }

    #[test]
    fn test_serialize_tags_source() {
        let value = serde_json::to_value(github_ext()).unwrap();
        assert_eq!(value["source"], "github");
        assert_eq!(value["owner"], "acme");
        assert_eq!(value["release"], "v1.2");
    }
}
