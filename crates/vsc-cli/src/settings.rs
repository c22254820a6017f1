//! Layered settings
//!
//! Settings are read (never written) from up to two files and then
//! overridden by command-line flags and `VSC_*` environment variables:
//!
//! 1. Global: `<config_dir>/vsc/config.toml`
//! 2. Local: the first of `.vscrc.toml`, `.vscrc.yaml`, `.vscrc.yml` in the
//!    working directory, or the file passed with `--config`
//!
//! Each layer only overrides the keys it sets. Missing files are skipped;
//! an unparsable file is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Local settings file names, in lookup order
pub const LOCAL_SETTINGS_FILES: &[&str] = &[".vscrc.toml", ".vscrc.yaml", ".vscrc.yml"];

/// Default download directory on a remote host
pub const DEFAULT_REMOTE_OUTPUT_DIR: &str = "/tmp/vsc";

/// User settings. Every field is optional so layers can be merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// SSH host that runs every network command (`[user@]host[:port]`)
    pub remote_host: Option<String>,
    /// SSH jump host used to reach `remote_host`
    pub gateway: Option<String>,
    /// Where downloads land on the remote host
    pub remote_output_dir: Option<PathBuf>,
    /// Local directory downloads end up in
    pub output_dir: Option<PathBuf>,
    /// Allow GitHub prereleases when resolving `latest`
    pub prerelease: Option<bool>,
    /// Platform whose assets are selected (`windows`, `darwin`, `linux64`, `linux32`)
    pub platform: Option<String>,
}

impl Settings {
    /// Overlay `other` onto `self`; keys set in `other` win.
    pub fn merge(&mut self, other: Settings) {
        if other.remote_host.is_some() {
            self.remote_host = other.remote_host;
        }
        if other.gateway.is_some() {
            self.gateway = other.gateway;
        }
        if other.remote_output_dir.is_some() {
            self.remote_output_dir = other.remote_output_dir;
        }
        if other.output_dir.is_some() {
            self.output_dir = other.output_dir;
        }
        if other.prerelease.is_some() {
            self.prerelease = other.prerelease;
        }
        if other.platform.is_some() {
            self.platform = other.platform;
        }
    }

    /// Parse a settings file, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "toml" => toml::from_str(&content).map_err(|e| CliError::SettingsParse {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            "yaml" | "yml" => serde_yaml::from_str::<Option<Settings>>(&content)
                .map(Option::unwrap_or_default)
                .map_err(|e| CliError::SettingsParse {
                    path: path.to_path_buf(),
                    format: "YAML".into(),
                    message: e.to_string(),
                }),
            _ => Err(CliError::user(format!(
                "Unsupported settings format '{}' for {}",
                extension,
                path.display()
            ))),
        }
    }
}

/// Resolves [`Settings`] from the global and local layers.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    cwd: PathBuf,
    explicit_file: Option<PathBuf>,
    global_config_dir_override: Option<PathBuf>,
}

impl SettingsLoader {
    /// Loader rooted at `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            explicit_file: None,
            global_config_dir_override: None,
        }
    }

    /// Use `path` as the local layer instead of searching for `.vscrc.*`
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Read the global layer from `dir` instead of the user config dir
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("vsc"))
    }

    fn local_file(&self) -> Option<PathBuf> {
        LOCAL_SETTINGS_FILES
            .iter()
            .map(|name| self.cwd.join(name))
            .find(|path| path.is_file())
    }

    /// Merge all present layers
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_path = global_dir.join("config.toml");
            if global_path.is_file() {
                tracing::debug!(?global_path, "Loading global settings");
                settings.merge(Settings::load(&global_path)?);
            }
        }

        match &self.explicit_file {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::user(format!(
                        "Settings file '{}' does not exist",
                        path.display()
                    )));
                }
                tracing::debug!(?path, "Loading settings file");
                settings.merge(Settings::load(path)?);
            }
            None => {
                if let Some(path) = self.local_file() {
                    tracing::debug!(?path, "Loading local settings");
                    settings.merge(Settings::load(&path)?);
                }
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn loader(cwd: &TempDir, global: &TempDir) -> SettingsLoader {
        SettingsLoader::new(cwd.path()).with_global_config_dir(global.path())
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        assert_eq!(loader(&cwd, &global).resolve().unwrap(), Settings::default());
    }

    #[test]
    fn test_local_overrides_global() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        std::fs::write(
            global.path().join("config.toml"),
            "remote_host = \"dev@centos\"\nprerelease = true\n",
        )
        .unwrap();
        std::fs::write(
            cwd.path().join(".vscrc.toml"),
            "remote_host = \"ops@build\"\noutput_dir = \"dl\"\n",
        )
        .unwrap();

        let settings = loader(&cwd, &global).resolve().unwrap();
        assert_eq!(settings.remote_host.as_deref(), Some("ops@build"));
        assert_eq!(settings.prerelease, Some(true));
        assert_eq!(settings.output_dir, Some(PathBuf::from("dl")));
    }

    #[test]
    fn test_yaml_local_settings() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        std::fs::write(
            cwd.path().join(".vscrc.yaml"),
            "gateway: jump@centos2\nplatform: linux32\n",
        )
        .unwrap();

        let settings = loader(&cwd, &global).resolve().unwrap();
        assert_eq!(settings.gateway.as_deref(), Some("jump@centos2"));
        assert_eq!(settings.platform.as_deref(), Some("linux32"));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        std::fs::write(cwd.path().join(".vscrc.yml"), "").unwrap();
        assert_eq!(loader(&cwd, &global).resolve().unwrap(), Settings::default());
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        std::fs::write(cwd.path().join(".vscrc.toml"), "editor = \"code\"\n").unwrap();

        let err = loader(&cwd, &global).resolve().unwrap_err();
        assert!(
            matches!(err, CliError::SettingsParse { ref format, .. } if format == "TOML"),
            "got: {err:?}"
        );
    }

    #[test]
    fn test_explicit_file_replaces_local_lookup() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        std::fs::write(cwd.path().join(".vscrc.toml"), "gateway = \"ignored\"\n").unwrap();
        let explicit = cwd.path().join("ci.toml");
        std::fs::write(&explicit, "remote_output_dir = \"/var/tmp/ext\"\n").unwrap();

        let settings = loader(&cwd, &global).with_file(&explicit).resolve().unwrap();
        assert_eq!(settings.gateway, None);
        assert_eq!(settings.remote_output_dir, Some(PathBuf::from("/var/tmp/ext")));
    }

    #[test]
    fn test_missing_explicit_file_errors() {
        let cwd = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let err = loader(&cwd, &global)
            .with_file(cwd.path().join("nope.toml"))
            .resolve()
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let mut base = Settings {
            remote_host: Some("a".into()),
            prerelease: Some(false),
            ..Settings::default()
        };
        base.merge(Settings {
            prerelease: Some(true),
            ..Settings::default()
        });
        assert_eq!(base.remote_host.as_deref(), Some("a"));
        assert_eq!(base.prerelease, Some(true));
    }
}
