//! Platform detection and platform-keyed values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Logical platform keys used to pick platform-specific assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Darwin,
    Linux64,
    Linux32,
}

impl Platform {
    /// Detect the platform this binary was built for.
    pub fn detect() -> Result<Self> {
        let pointer_width = if cfg!(target_pointer_width = "64") { 64 } else { 32 };
        Self::from_parts(std::env::consts::OS, pointer_width)
    }

    /// Map an OS name (as in [`std::env::consts::OS`]) and pointer width to
    /// a platform.
    ///
    /// Pointer width only matters on Linux.
    pub fn from_parts(os: &str, pointer_width: u32) -> Result<Self> {
        match (os, pointer_width) {
            ("windows", _) => Ok(Self::Windows),
            ("macos" | "darwin", _) => Ok(Self::Darwin),
            ("linux", 64) => Ok(Self::Linux64),
            ("linux", 32) => Ok(Self::Linux32),
            _ => Err(Error::UnsupportedPlatform {
                os: os.to_string(),
                pointer_width,
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Darwin => "darwin",
            Self::Linux64 => "linux64",
            Self::Linux32 => "linux32",
        }
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "windows" | "win32" => Ok(Self::Windows),
            "darwin" | "macos" | "osx" => Ok(Self::Darwin),
            "linux64" | "linux" => Ok(Self::Linux64),
            "linux32" => Ok(Self::Linux32),
            _ => Err(Error::UnsupportedPlatform {
                os: s.to_string(),
                pointer_width: 0,
            }),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One value per platform; [`select`](Self::select) picks the matching one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformChoice<T> {
    pub windows: T,
    pub darwin: T,
    pub linux64: T,
    pub linux32: T,
}

impl<T> PlatformChoice<T> {
    /// Take the value for `platform`
    pub fn select(self, platform: Platform) -> T {
        match platform {
            Platform::Windows => self.windows,
            Platform::Darwin => self.darwin,
            Platform::Linux64 => self.linux64,
            Platform::Linux32 => self.linux32,
        }
    }
}
