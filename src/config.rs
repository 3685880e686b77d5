// src/config.rs

//! Build configuration: environment-derived settings and user-facing options
//!
//! Mirrors the two configuration surfaces of a package recipe:
//! - `Settings`: facts about the target environment (OS, architecture,
//!   compiler, build type). Detected from the host but overridable.
//! - `Options`: the recipe's own knobs (link mode and feature flags).
//!
//! Both are combined into an immutable [`BuildConfig`] that is passed
//! explicitly through every stage of the cook.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetOs {
    Linux,
    Macos,
    Windows,
    FreeBsd,
}

impl TargetOs {
    /// Detect the operating system this process is running on
    pub fn host() -> Self {
        match std::env::consts::OS {
            "windows" => Self::Windows,
            "macos" => Self::Macos,
            "freebsd" => Self::FreeBsd,
            _ => Self::Linux,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Macos => "macos",
            Self::Windows => "windows",
            Self::FreeBsd => "freebsd",
        }
    }
}

impl FromStr for TargetOs {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "macos" | "darwin" => Ok(Self::Macos),
            "windows" => Ok(Self::Windows),
            "freebsd" => Ok(Self::FreeBsd),
            other => Err(Error::Configuration(format!(
                "Unknown operating system: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TargetOs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture
///
/// Open-ended: the build only distinguishes 32-bit x86 from everything
/// else, so unrecognized names are carried through as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetArch {
    X86,
    X86_64,
    Aarch64,
    Other(String),
}

impl TargetArch {
    /// Detect the architecture this process is running on
    pub fn host() -> Self {
        std::env::consts::ARCH.parse().unwrap_or(Self::X86_64)
    }

    /// Word width as the wrapped build system spells it: "32" or "64"
    pub fn binary_width(&self) -> &'static str {
        match self {
            Self::X86 => "32",
            _ => "64",
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::X86 => "x86",
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Other(name) => name,
        }
    }
}

impl FromStr for TargetArch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x86" | "i686" => Ok(Self::X86),
            "x86_64" | "amd64" => Ok(Self::X86_64),
            "aarch64" | "arm64" => Ok(Self::Aarch64),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

impl fmt::Display for TargetArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compiler identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiler {
    Gcc,
    Clang,
    Msvc,
}

impl Compiler {
    /// Default compiler for the given operating system
    pub fn default_for(os: TargetOs) -> Self {
        match os {
            TargetOs::Windows => Self::Msvc,
            TargetOs::Macos => Self::Clang,
            _ => Self::Gcc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::Msvc => "msvc",
        }
    }
}

impl FromStr for Compiler {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gcc" => Ok(Self::Gcc),
            "clang" | "apple-clang" => Ok(Self::Clang),
            "msvc" | "visual-studio" => Ok(Self::Msvc),
            other => Err(Error::Configuration(format!(
                "Unknown compiler: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Release,
    Debug,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    /// Debug flag as the wrapped build system spells it: "0" for Release,
    /// "1" for every other mode
    pub fn debug_flag(&self) -> &'static str {
        match self {
            Self::Release => "0",
            _ => "1",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Release => "Release",
            Self::Debug => "Debug",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl FromStr for BuildType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "release" => Ok(Self::Release),
            "debug" => Ok(Self::Debug),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            other => Err(Error::Configuration(format!(
                "Unknown build type: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Environment-derived settings for one build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub os: TargetOs,
    pub arch: TargetArch,
    pub compiler: Compiler,
    /// Compiler version, when known (informational only)
    pub compiler_version: Option<String>,
    pub build_type: BuildType,
}

impl Settings {
    /// Settings for the host environment with a Release build
    pub fn host() -> Self {
        let os = TargetOs::host();
        Self {
            os,
            arch: TargetArch::host(),
            compiler: Compiler::default_for(os),
            compiler_version: None,
            build_type: BuildType::Release,
        }
    }
}

/// User-facing recipe options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Build shared libraries (static when false)
    #[serde(default = "default_shared")]
    pub shared: bool,

    /// Enable IBM MASS math acceleration
    #[serde(default)]
    pub use_mass: bool,

    /// Build with OpenMP parallel execution
    #[serde(default)]
    pub use_openmp: bool,

    /// Exclude the LAPACKE C interface from the build
    #[serde(default)]
    pub no_lapacke: bool,
}

fn default_shared() -> bool {
    true
}

impl Default for Options {
    fn default() -> Self {
        Self {
            shared: true,
            use_mass: false,
            use_openmp: false,
            no_lapacke: false,
        }
    }
}

impl Options {
    /// Load options from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Configuration(format!("Invalid options file: {}", e)))
    }
}

/// The immutable configuration for one cook: settings plus options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildConfig {
    pub settings: Settings,
    pub options: Options,
}

impl BuildConfig {
    pub fn new(settings: Settings, options: Options) -> Self {
        Self { settings, options }
    }

    /// Host settings with default options
    pub fn host_defaults() -> Self {
        Self::new(Settings::host(), Options::default())
    }
}
