// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use openblas_recipe::{
    BuildConfig, Kitchen, KitchenConfig, Options, Recipe, Settings,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "openblas-recipe")]
#[command(author, version, about = "Build OpenBLAS from source and package it with relocatable metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, build, and package OpenBLAS
    Cook {
        /// Install prefix for the packaged files
        #[arg(short, long, default_value = "./package")]
        prefix: PathBuf,

        /// Upstream version to build
        #[arg(long, default_value = "0.3.1")]
        version: String,

        /// Directory for caching downloaded sources
        #[arg(long, default_value = "/var/cache/openblas-recipe/sources")]
        source_cache: PathBuf,

        /// TOML file seeding the option set
        #[arg(long)]
        options: Option<PathBuf>,

        /// Build static libraries instead of shared
        #[arg(long = "static")]
        static_link: bool,

        /// Enable IBM MASS math acceleration
        #[arg(long)]
        use_mass: bool,

        /// Build with OpenMP parallel execution
        #[arg(long)]
        use_openmp: bool,

        /// Exclude the LAPACKE C interface
        #[arg(long)]
        no_lapacke: bool,

        /// Target OS (default: host)
        #[arg(long)]
        os: Option<String>,

        /// Target architecture (default: host)
        #[arg(long)]
        arch: Option<String>,

        /// Compiler identity (default: host toolchain)
        #[arg(long)]
        compiler: Option<String>,

        /// Build type: Release, Debug, RelWithDebInfo, MinSizeRel
        #[arg(long)]
        build_type: Option<String>,

        /// Variable name used in the patched CMake package config
        #[arg(long, default_value = openblas_recipe::package::DEFAULT_ROOT_VAR)]
        root_var: String,

        /// Persistent build directory instead of a temp dir
        #[arg(long)]
        build_root: Option<PathBuf>,

        /// Keep the build directory after completion (for debugging)
        #[arg(long)]
        keep_builddir: bool,
    },

    /// Download sources into the cache without building
    Fetch {
        /// Upstream version to fetch
        #[arg(long, default_value = "0.3.1")]
        version: String,

        /// Directory for caching downloaded sources
        #[arg(long, default_value = "/var/cache/openblas-recipe/sources")]
        source_cache: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cook {
            prefix,
            version,
            source_cache,
            options,
            static_link,
            use_mass,
            use_openmp,
            no_lapacke,
            os,
            arch,
            compiler,
            build_type,
            root_var,
            build_root,
            keep_builddir,
        } => {
            let settings = resolve_settings(os, arch, compiler, build_type)?;
            let opts = resolve_options(
                options.as_deref(),
                static_link,
                use_mass,
                use_openmp,
                no_lapacke,
            )?;
            let config = BuildConfig::new(settings, opts);

            let kitchen = Kitchen::new(KitchenConfig {
                source_cache,
                build_root,
                keep_builddir,
                root_var,
            });

            let recipe = Recipe::openblas(version);
            let output = kitchen
                .cook(&recipe, &config, &prefix)
                .with_context(|| format!("Failed to cook {}", recipe.name))?;

            println!("Packaged to {}", output.prefix.display());
            println!("Libraries: {}", output.libs.join(" "));
        }

        Commands::Fetch {
            version,
            source_cache,
        } => {
            let kitchen = Kitchen::new(KitchenConfig {
                source_cache,
                ..KitchenConfig::default()
            });

            let recipe = Recipe::openblas(version);
            let archive = kitchen
                .fetch(&recipe)
                .with_context(|| format!("Failed to fetch sources for {}", recipe.name))?;

            println!("Fetched {}", archive.display());
        }
    }

    Ok(())
}

/// Host settings with any CLI overrides applied
fn resolve_settings(
    os: Option<String>,
    arch: Option<String>,
    compiler: Option<String>,
    build_type: Option<String>,
) -> Result<Settings> {
    let mut settings = Settings::host();
    if let Some(os) = os {
        settings.os = os.parse()?;
    }
    if let Some(arch) = arch {
        settings.arch = arch.parse()?;
    }
    if let Some(compiler) = compiler {
        settings.compiler = compiler.parse()?;
    }
    if let Some(build_type) = build_type {
        settings.build_type = build_type.parse()?;
    }
    Ok(settings)
}

/// Option set from the optional TOML file, with CLI flags layered on top
fn resolve_options(
    options_file: Option<&Path>,
    static_link: bool,
    use_mass: bool,
    use_openmp: bool,
    no_lapacke: bool,
) -> Result<Options> {
    let mut options = match options_file {
        Some(path) => Options::from_toml_file(path)
            .with_context(|| format!("Failed to read options from {}", path.display()))?,
        None => Options::default(),
    };

    if static_link {
        options.shared = false;
    }
    options.use_mass |= use_mass;
    options.use_openmp |= use_openmp;
    options.no_lapacke |= no_lapacke;

    Ok(options)
}
