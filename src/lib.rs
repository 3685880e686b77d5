// src/lib.rs

//! OpenBLAS source build recipe
//!
//! A package recipe that turns a versioned OpenBLAS release into an
//! installed, relocatable package:
//!
//! - Translates a small option surface (link mode, math acceleration,
//!   OpenMP, LAPACKE exclusion) into the upstream build system's own
//!   invocation: the Makefile flow on standard toolchains, CMake on MSVC.
//! - Fetches and extracts the release tarball.
//! - Runs build and install as child processes.
//! - Patches the generated pkg-config and CMake package configs so a
//!   staged install prefix resolves correctly after relocation.
//! - Reports the produced link artifacts to downstream consumers.
//!
//! The whole cook is sequential and blocking; the wrapped build system
//! is an external contract this crate matches, not something it
//! supervises.

pub mod builder;
pub mod config;
mod error;
pub mod kitchen;
pub mod package;
pub mod plan;
pub mod recipe;
pub mod source;

pub use config::{BuildConfig, BuildType, Compiler, Options, Settings, TargetArch, TargetOs};
pub use error::{Error, Result};
pub use kitchen::{Kitchen, KitchenConfig, PackageOutput};
pub use plan::{BuildPlan, CmakeDefinitions, MakeOptions};
pub use recipe::Recipe;
