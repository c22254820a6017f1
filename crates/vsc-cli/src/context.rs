//! Runtime context assembled from settings and global flags.

use std::path::PathBuf;

use vsc_extensions::{Platform, Release, ResolveOptions};
use vsc_tunnel::{Channel, LocalChannel, SshChannel, SshTarget, check_binary_on_path};

use crate::error::{CliError, Result};
use crate::settings::{DEFAULT_REMOTE_OUTPUT_DIR, Settings};

/// Everything a command needs besides its own arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppContext {
    /// Host that runs the network commands; `None` runs them locally
    pub host: Option<SshTarget>,
    pub gateway: Option<SshTarget>,
    /// Configured platform; detected only when a GitHub asset is picked
    pub platform: Option<Platform>,
    pub prerelease: bool,
    pub remote_output_dir: PathBuf,
    pub output_dir: Option<PathBuf>,
}

impl AppContext {
    /// Validate merged settings.
    ///
    /// Without a remote host downloads still land in `remote_output_dir`,
    /// which is then simply a local directory. An unset platform is left
    /// for detection at resolution time.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let host = settings
            .remote_host
            .as_deref()
            .map(str::parse::<SshTarget>)
            .transpose()?;
        let gateway = settings
            .gateway
            .as_deref()
            .map(str::parse::<SshTarget>)
            .transpose()?;
        if gateway.is_some() && host.is_none() {
            return Err(CliError::user("--gateway requires --host"));
        }

        let platform = settings
            .platform
            .as_deref()
            .map(str::parse::<Platform>)
            .transpose()?;

        Ok(Self {
            host,
            gateway,
            platform,
            prerelease: settings.prerelease.unwrap_or(false),
            remote_output_dir: settings
                .remote_output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REMOTE_OUTPUT_DIR)),
            output_dir: settings.output_dir.clone(),
        })
    }

    /// The channel network commands run on
    pub fn channel(&self) -> Box<dyn Channel> {
        match &self.host {
            Some(host) => {
                let mut channel = SshChannel::new(host.clone());
                if let Some(gateway) = &self.gateway {
                    channel = channel.with_gateway(gateway.clone());
                }
                Box::new(channel)
            }
            None => Box::new(LocalChannel::new()),
        }
    }

    /// The configured platform, or the detected one
    pub fn asset_platform(&self) -> Result<Platform> {
        match self.platform {
            Some(platform) => Ok(platform),
            None => Ok(Platform::detect()?),
        }
    }

    /// Resolution options; a per-command `prerelease` replaces the setting
    pub fn resolve_options(&self, release: Option<&str>, prerelease: Option<bool>) -> ResolveOptions {
        ResolveOptions {
            release: release.map(Release::from).unwrap_or(Release::Latest),
            prerelease: prerelease.unwrap_or(self.prerelease),
            platform: self.platform,
        }
    }

    /// Local binaries a download run spawns.
    ///
    /// `curl` runs on the remote host when one is set, so only `ssh` (and
    /// `scp` for copying back) are needed locally.
    pub fn required_tools(&self, copies_back: bool) -> Vec<&'static str> {
        match (&self.host, copies_back) {
            (None, _) => vec!["curl"],
            (Some(_), false) => vec!["ssh"],
            (Some(_), true) => vec!["ssh", "scp"],
        }
    }

    /// Fail early when a required binary is missing from PATH
    pub fn check_tools(&self, copies_back: bool) -> Result<()> {
        for tool in self.required_tools(copies_back) {
            let path = check_binary_on_path(tool)?;
            tracing::debug!(tool, path = %path.display(), "Found tool");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn settings() -> Settings {
        Settings {
            platform: Some("linux64".into()),
            ..Settings::default()
        }
    }

    #[test]
    fn test_defaults_are_local() {
        let ctx = AppContext::from_settings(&settings()).unwrap();
        assert_eq!(ctx.host, None);
        assert_eq!(ctx.remote_output_dir, PathBuf::from("/tmp/vsc"));
        assert_eq!(ctx.channel().describe(), LocalChannel::new().describe());
    }

    #[test]
    fn test_ssh_channel_with_gateway() {
        let ctx = AppContext::from_settings(&Settings {
            remote_host: Some("dev@centos:2222".into()),
            gateway: Some("jump@centos2".into()),
            ..settings()
        })
        .unwrap();
        assert_eq!(ctx.channel().describe(), "ssh dev@centos:2222 via jump@centos2");
    }

    #[test]
    fn test_gateway_without_host_is_rejected() {
        let err = AppContext::from_settings(&Settings {
            gateway: Some("jump@centos2".into()),
            ..settings()
        })
        .unwrap_err();
        assert!(err.to_string().contains("--gateway requires --host"));
    }

    #[test]
    fn test_option_like_gateway_is_rejected() {
        let err = AppContext::from_settings(&Settings {
            remote_host: Some("dev@centos".into()),
            gateway: Some("-oProxyCommand=id".into()),
            ..settings()
        })
        .unwrap_err();
        assert!(err.to_string().contains("must not start with '-'"), "got: {err}");
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        let result = AppContext::from_settings(&Settings {
            platform: Some("amiga".into()),
            ..Settings::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_required_tools() {
        let local = AppContext::from_settings(&settings()).unwrap();
        assert_eq!(local.required_tools(true), vec!["curl"]);

        let remote = AppContext::from_settings(&Settings {
            remote_host: Some("dev@centos".into()),
            ..settings()
        })
        .unwrap();
        assert_eq!(remote.required_tools(false), vec!["ssh"]);
        assert_eq!(remote.required_tools(true), vec!["ssh", "scp"]);
    }

    #[test]
    fn test_resolve_options_overrides() {
        let ctx = AppContext::from_settings(&Settings {
            prerelease: Some(true),
            ..settings()
        })
        .unwrap();

        let options = ctx.resolve_options(Some("v1.2"), None);
        assert_eq!(options.release, Release::Tag("v1.2".into()));
        assert!(options.prerelease);
        assert_eq!(options.platform, Some(Platform::Linux64));

        let options = ctx.resolve_options(None, Some(false));
        assert_eq!(options.release, Release::Latest);
        assert!(!options.prerelease, "--no-prerelease must beat the setting");
    }

    #[test]
    fn test_platform_is_not_detected_eagerly() {
        let ctx = AppContext::from_settings(&Settings::default()).unwrap();
        assert_eq!(ctx.platform, None);
        assert_eq!(ctx.resolve_options(None, None).platform, None);
        assert!(!ctx.resolve_options(None, None).prerelease);
        assert!(ctx.resolve_options(None, Some(true)).prerelease);
    }
}
