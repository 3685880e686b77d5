// src/plan.rs

//! Build plan selection: validate a configuration and translate it into
//! the wrapped build system's invocation
//!
//! The plan is a pure function of [`BuildConfig`]. Standard toolchains
//! get the Makefile flow with its `NAME=value` option list; MSVC is the
//! one toolchain that cannot drive that flow and gets a CMake definitions
//! list instead. Selection happens exactly once, before any I/O.
//!
//! Flags are kept as ordered name/value pairs and only rendered to the
//! external tool's string form at the process-invocation boundary, so the
//! translation is testable without spawning anything.

use crate::config::{BuildConfig, Compiler};
use crate::error::{Error, Result};
use std::fmt;
use tracing::warn;

fn flag(enabled: bool) -> &'static str {
    if enabled { "1" } else { "0" }
}

/// Ordered `NAME=value` option list for the Makefile flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakeOptions {
    vars: Vec<(&'static str, String)>,
}

impl MakeOptions {
    fn from_config(config: &BuildConfig) -> Self {
        let settings = &config.settings;
        let options = &config.options;

        let mut vars = vec![
            ("DEBUG", settings.build_type.debug_flag().to_string()),
            ("BINARY", settings.arch.binary_width().to_string()),
            ("USE_MASS", flag(options.use_mass).to_string()),
            ("USE_OPENMP", flag(options.use_openmp).to_string()),
        ];

        if !options.shared {
            vars.push(("NO_SHARED", "1".to_string()));
        }
        if options.no_lapacke {
            vars.push(("NO_LAPACKE", "1".to_string()));
        }

        Self { vars }
    }

    /// Arguments for the `make` child process, one `NAME=value` each
    pub fn args(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect()
    }

    /// The full option string as the Makefile flow spells it
    pub fn render(&self) -> String {
        self.args().join(" ")
    }
}

impl fmt::Display for MakeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// CMake cache definitions for the restricted (MSVC) flow
///
/// Carries only the three feature flags; architecture, debug mode, and
/// link mode have no translation on this path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeDefinitions {
    defs: Vec<(&'static str, bool)>,
}

impl CmakeDefinitions {
    fn from_config(config: &BuildConfig) -> Self {
        let options = &config.options;
        Self {
            defs: vec![
                ("USE_MASS", options.use_mass),
                ("USE_OPENMP", options.use_openmp),
                ("NO_LAPACKE", options.no_lapacke),
            ],
        }
    }

    /// Arguments for the `cmake` configure step, one `-DNAME=ON|OFF` each
    pub fn args(&self) -> Vec<String> {
        self.defs
            .iter()
            .map(|(name, enabled)| {
                format!("-D{}={}", name, if *enabled { "ON" } else { "OFF" })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// The derived build invocation, selected once per cook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildPlan {
    /// Standard toolchains: the Makefile flow
    Make(MakeOptions),
    /// MSVC: the CMake flow
    Cmake(CmakeDefinitions),
}

impl BuildPlan {
    /// Validate the configuration and select the build path
    ///
    /// The OpenBLAS CMake build cannot produce a static library under
    /// MSVC, so that combination is rejected here, before any download
    /// or child process runs.
    pub fn select(config: &BuildConfig) -> Result<Self> {
        if config.settings.compiler == Compiler::Msvc {
            if !config.options.shared {
                return Err(Error::Configuration(
                    "Static build not supported with MSVC: \
                     https://github.com/xianyi/OpenBLAS/blob/v0.2.20/CMakeLists.txt#L177"
                        .to_string(),
                ));
            }
            warn!("Building with CMake: some options won't take any effect");
            return Ok(Self::Cmake(CmakeDefinitions::from_config(config)));
        }

        Ok(Self::Make(MakeOptions::from_config(config)))
    }
}
