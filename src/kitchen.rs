// src/kitchen.rs

//! Kitchen: the sequential cook of one recipe
//!
//! Drives the full lifecycle in order: validate options and select the
//! build plan, fetch sources, run build and install, patch the generated
//! metadata, report the produced artifacts. No stage starts before the
//! previous one finished, and any failure aborts the whole cook.

use crate::builder::BuildRunner;
use crate::config::BuildConfig;
use crate::error::Result;
use crate::package;
use crate::plan::BuildPlan;
use crate::recipe::Recipe;
use crate::source;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Directory for downloaded sources
    pub source_cache: PathBuf,
    /// Persistent build directory; a temp dir is used when unset
    pub build_root: Option<PathBuf>,
    /// Keep the temp build directory after completion (for debugging)
    pub keep_builddir: bool,
    /// Variable name the CMake package config is rewritten against
    pub root_var: String,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            source_cache: PathBuf::from("/var/cache/openblas-recipe/sources"),
            build_root: None,
            keep_builddir: false,
            root_var: package::DEFAULT_ROOT_VAR.to_string(),
        }
    }
}

/// What one cook produced
#[derive(Debug)]
pub struct PackageOutput {
    /// Install prefix holding the packaged files
    pub prefix: PathBuf,
    /// Advertised link libraries for downstream consumers
    pub libs: Vec<String>,
}

/// The Kitchen: where the recipe is cooked
pub struct Kitchen {
    config: KitchenConfig,
}

impl Kitchen {
    pub fn new(config: KitchenConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(KitchenConfig::default())
    }

    /// Cook the recipe: fetch, build, install into `prefix`, patch the
    /// generated metadata, and report the produced artifacts
    pub fn cook(
        &self,
        recipe: &Recipe,
        config: &BuildConfig,
        prefix: &Path,
    ) -> Result<PackageOutput> {
        info!("Cooking {} version {}", recipe.name, recipe.version);

        // Validation and path selection happen before any I/O.
        let plan = BuildPlan::select(config)?;

        let (build_dir, temp_dir) = self.build_dir()?;

        info!("Fetching sources...");
        let source_dir = source::fetch_sources(recipe, &self.config.source_cache, &build_dir)?;

        info!("Running build...");
        fs::create_dir_all(prefix)?;
        BuildRunner::new(&build_dir, &source_dir).run(&plan, prefix)?;

        info!("Patching package metadata...");
        package::finalize(prefix, recipe, config.settings.os, &self.config.root_var)?;

        let libs = package::collect_libs(prefix, config.settings.os)?;
        info!("Cooked {}: {} artifact(s)", recipe.name, libs.len());

        if self.config.keep_builddir
            && let Some(temp) = temp_dir
        {
            let kept = temp.into_path();
            info!("Keeping build directory: {}", kept.display());
        }

        Ok(PackageOutput {
            prefix: prefix.to_path_buf(),
            libs,
        })
    }

    /// Download the recipe's sources into the cache without building
    pub fn fetch(&self, recipe: &Recipe) -> Result<PathBuf> {
        info!(
            "Fetching sources for {} version {}",
            recipe.name, recipe.version
        );
        source::fetch_archive(recipe, &self.config.source_cache)
    }

    /// Scratch directory for this cook
    fn build_dir(&self) -> Result<(PathBuf, Option<TempDir>)> {
        match &self.config.build_root {
            Some(root) => {
                fs::create_dir_all(root)?;
                Ok((root.clone(), None))
            }
            None => {
                let temp = TempDir::new()?;
                Ok((temp.path().to_path_buf(), Some(temp)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuildType, Compiler, Options, Settings, TargetArch, TargetOs};
    use crate::error::Error;

    #[test]
    fn test_kitchen_config_default() {
        let config = KitchenConfig::default();
        assert!(config.build_root.is_none());
        assert!(!config.keep_builddir);
        assert_eq!(config.root_var, package::DEFAULT_ROOT_VAR);
    }

    #[test]
    fn test_invalid_configuration_stops_before_any_io() {
        let cache_root = tempfile::TempDir::new().unwrap();
        let source_cache = cache_root.path().join("sources");
        let kitchen = Kitchen::new(KitchenConfig {
            source_cache: source_cache.clone(),
            ..KitchenConfig::default()
        });

        let config = BuildConfig::new(
            Settings {
                os: TargetOs::Windows,
                arch: TargetArch::X86_64,
                compiler: Compiler::Msvc,
                compiler_version: None,
                build_type: BuildType::Release,
            },
            Options {
                shared: false,
                ..Options::default()
            },
        );

        let prefix = cache_root.path().join("package");
        let result = kitchen.cook(&Recipe::default(), &config, &prefix);

        assert!(matches!(result, Err(Error::Configuration(_))));
        // The fetcher would have created the cache directory; rejection
        // happened before it ran.
        assert!(!source_cache.exists());
        assert!(!prefix.exists());
    }
}
