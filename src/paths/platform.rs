use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown platform '{0}' (expected windows, osx or linux)")]
pub struct UnknownPlatform(pub String);

/// Target operating systems the mapping document can configure independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Osx,
    Windows,
}

impl Platform {
    /// Every platform, in the order backup folders are scanned
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::Osx];

    /// Platform of the running process
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Osx
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Osx => "osx",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "osx" | "macos" => Ok(Platform::Osx),
            "windows" => Ok(Platform::Windows),
            other => Err(UnknownPlatform(other.to_string())),
        }
    }
}
