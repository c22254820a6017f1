//! GitHub release resolution.
//!
//! A GitHub-hosted extension resolves to one `browser_download_url`:
//!
//! | release  | prerelease | strategy |
//! |----------|------------|----------|
//! | `latest` | no         | `GET /repos/{owner}/{repo}/releases/latest`, match the asset by name |
//! | `latest` | yes        | `GET /repos/{owner}/{repo}/releases?per_page=1`, take the newest release, match by name |
//! | a tag    | either     | no request; `https://github.com/{owner}/{repo}/releases/download/{tag}/{asset}` |
//!
//! The `latest` endpoint never returns prereleases. The list endpoint returns
//! the newest release whatever its status, so allowing prereleases still
//! yields a stable release when that is the newest one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vsc_tunnel::{Channel, CurlRequest};

use crate::error::{Error, Result};
use crate::id::ExtensionId;

/// Root of the GitHub REST API
pub const GITHUB_API_ROOT: &str = "https://api.github.com";
/// Root of github.com, used for direct release downloads
pub const GITHUB_ROOT: &str = "https://github.com";

/// Which release to install.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Release {
    /// The newest release
    #[default]
    Latest,
    /// An explicit release tag
    Tag(String),
}

impl Release {
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl From<&str> for Release {
    fn from(s: &str) -> Self {
        if s.is_empty() || s == "latest" {
            Self::Latest
        } else {
            Self::Tag(s.to_string())
        }
    }
}

impl From<String> for Release {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<Release> for String {
    fn from(release: Release) -> Self {
        release.to_string()
    }
}

impl FromStr for Release {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Tag(tag) => f.write_str(tag),
        }
    }
}

/// The subset of a GitHub release object vsc reads.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    #[serde(default)]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

/// A release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

/// Direct download URL for an asset of a tagged release. No request is made;
/// a missing asset only shows up when the download itself fails.
pub fn resolve_explicit(owner: &str, repo: &str, release: &str, asset_name: &str) -> String {
    format!("{GITHUB_ROOT}/{owner}/{repo}/releases/download/{release}/{asset_name}")
}

/// API URL queried for the newest release.
pub fn latest_query_url(owner: &str, repo: &str, prerelease: bool) -> String {
    if prerelease {
        format!("{GITHUB_API_ROOT}/repos/{owner}/{repo}/releases?per_page=1")
    } else {
        format!("{GITHUB_API_ROOT}/repos/{owner}/{repo}/releases/latest?per_page=1")
    }
}

/// Download URL of the first asset named exactly `asset_name`.
pub fn download_url_from_assets<'a>(assets: &'a [GitHubAsset], asset_name: &str) -> Option<&'a str> {
    assets
        .iter()
        .find(|asset| asset.name == asset_name)
        .map(|asset| asset.browser_download_url.as_str())
}

/// An extension downloaded from a GitHub release asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitHubExtension {
    unique_id: ExtensionId,
    owner: String,
    repo: String,
    asset_name: String,
    release: Release,
    prerelease: bool,
    download_url: Option<String>,
}

impl GitHubExtension {
    /// An unresolved extension targeting the latest stable release
    pub fn new(
        unique_id: ExtensionId,
        owner: impl Into<String>,
        repo: impl Into<String>,
        asset_name: impl Into<String>,
    ) -> Self {
        Self {
            unique_id,
            owner: owner.into(),
            repo: repo.into(),
            asset_name: asset_name.into(),
            release: Release::Latest,
            prerelease: false,
            download_url: None,
        }
    }

    /// Target a specific release
    pub fn with_release(mut self, release: Release) -> Self {
        self.release = release;
        self
    }

    /// Allow the newest release to be a prerelease
    pub fn with_prerelease(mut self, prerelease: bool) -> Self {
        self.prerelease = prerelease;
        self
    }

    /// Resolve the download URL, querying the API through `channel` when
    /// the release is `latest`.
    ///
    /// A query that fails to run or exits non-zero is logged and leaves the
    /// URL unset rather than failing. A release without the expected asset
    /// fails with [`Error::AssetNotFound`].
    pub fn resolve(mut self, channel: &dyn Channel) -> Result<Self> {
        self.download_url = match &self.release {
            Release::Tag(tag) => Some(resolve_explicit(
                &self.owner,
                &self.repo,
                tag,
                &self.asset_name,
            )),
            Release::Latest => self.resolve_latest(channel)?,
        };
        Ok(self)
    }

    fn resolve_latest(&self, channel: &dyn Channel) -> Result<Option<String>> {
        let url = latest_query_url(&self.owner, &self.repo, self.prerelease);
        let request = CurlRequest::get(&url).header("Accept", "application/vnd.github+json");

        tracing::debug!(unique_id = %self.unique_id, %url, "Querying GitHub releases");
        let output = match channel.run(&request.into_command()) {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(unique_id = %self.unique_id, %url, error = %e, "GitHub release query could not run");
                return Ok(None);
            }
        };
        if !output.success() {
            tracing::error!(
                unique_id = %self.unique_id,
                %url,
                exited = output.exited,
                "GitHub release query failed: {}",
                output.stderr.trim()
            );
            return Ok(None);
        }

        let release = self.parse_release(&output.stdout)?;
        tracing::debug!(
            unique_id = %self.unique_id,
            tag = release.tag_name.as_deref().unwrap_or("<untagged>"),
            prerelease = release.prerelease,
            "Found release"
        );

        download_url_from_assets(&release.assets, &self.asset_name)
            .map(|u| Some(u.to_string()))
            .ok_or_else(|| Error::AssetNotFound {
                owner: self.owner.clone(),
                repo: self.repo.clone(),
                asset: self.asset_name.clone(),
            })
    }

    fn parse_release(&self, body: &str) -> Result<GitHubRelease> {
        let invalid = |e: serde_json::Error| Error::InvalidResponse {
            source_name: format!("GitHub releases of {}/{}", self.owner, self.repo),
            reason: e.to_string(),
        };

        if self.prerelease {
            let releases: Vec<GitHubRelease> = serde_json::from_str(body).map_err(invalid)?;
            releases
                .into_iter()
                .next()
                .ok_or_else(|| Error::NotFound(self.unique_id.to_string()))
        } else {
            serde_json::from_str(body).map_err(invalid)
        }
    }

    pub fn unique_id(&self) -> &ExtensionId {
        &self.unique_id
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn asset_name(&self) -> &str {
        &self.asset_name
    }

    pub fn release(&self) -> &Release {
        &self.release
    }

    pub fn prerelease(&self) -> bool {
        self.prerelease
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }
}
