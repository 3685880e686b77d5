// src/source.rs

//! Source fetcher: download, extract, and lay out the upstream tarball
//!
//! Downloads are cached under the configured source cache and reused on
//! later runs. The tarball's single top-level directory is renamed to the
//! well-known name `sources` so the build runner never has to care about
//! the upstream naming scheme.

use crate::error::{Error, Result};
use crate::recipe::Recipe;
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tar::Archive;
use tracing::{debug, info};

/// Well-known name the extracted source tree is renamed to
pub const SOURCE_DIR: &str = "sources";

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch and lay out the recipe's sources under `build_dir`
///
/// Returns the path to the renamed source directory
/// (`<build_dir>/sources`).
pub fn fetch_sources(recipe: &Recipe, source_cache: &Path, build_dir: &Path) -> Result<PathBuf> {
    let archive = fetch_archive(recipe, source_cache)?;
    unpack_sources(&archive, build_dir, recipe.extracted_dir_pattern())
}

/// Download the release tarball into the source cache, reusing a cached
/// copy when present
pub fn fetch_archive(recipe: &Recipe, source_cache: &Path) -> Result<PathBuf> {
    fs::create_dir_all(source_cache)?;

    let cached_path = source_cache.join(recipe.archive_filename());
    if cached_path.exists() {
        debug!("Using cached source: {}", cached_path.display());
        return Ok(cached_path);
    }

    let url = recipe.archive_url();
    info!("Downloading: {}", url);

    // Download to a temp name first so an interrupted transfer never
    // masquerades as a cached archive.
    let temp_path = source_cache.join(format!("{}.tmp", recipe.archive_filename()));
    if let Err(e) = download_file(&url, &temp_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, &cached_path)?;

    Ok(cached_path)
}

/// Extract the archive into `build_dir` and rename its single top-level
/// directory to [`SOURCE_DIR`]
fn unpack_sources(archive: &Path, build_dir: &Path, pattern: &str) -> Result<PathBuf> {
    extract_archive(archive, build_dir)?;

    let extracted = locate_extracted_dir(build_dir, pattern)?;
    let source_dir = build_dir.join(SOURCE_DIR);
    if source_dir.exists() {
        // Stale tree from an earlier run in a persistent build root.
        fs::remove_dir_all(&source_dir)?;
    }
    fs::rename(&extracted, &source_dir)?;
    debug!("Source directory: {}", source_dir.display());

    Ok(source_dir)
}

/// Download a file from a URL
fn download_file(url: &str, dest: &Path) -> Result<()> {
    let client = Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| Error::Download {
            url: url.to_string(),
            reason: format!("Failed to create HTTP client: {}", e),
        })?;

    let mut response = client.get(url).send().map_err(|e| Error::Download {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if !response.status().is_success() {
        return Err(Error::Download {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let mut file = File::create(dest)?;
    response.copy_to(&mut file).map_err(|e| Error::Download {
        url: url.to_string(),
        reason: format!("Failed to read response: {}", e),
    })?;

    Ok(())
}

/// Extract a gzipped tarball to a destination directory
fn extract_archive(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let decoder = GzDecoder::new(file);
    let mut tarball = Archive::new(decoder);

    tarball.unpack(dest).map_err(|e| {
        Error::Fetch(format!(
            "Failed to extract {}: {}",
            archive.display(),
            e
        ))
    })?;

    Ok(())
}

/// Find the single top-level directory the archive extracted to
///
/// Zero or multiple matches means the archive layout is not what the
/// recipe expects, which is an error rather than something to guess at.
fn locate_extracted_dir(build_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let full_pattern = build_dir.join(pattern);
    let full_pattern = full_pattern.to_str().ok_or_else(|| {
        Error::Fetch(format!(
            "Build directory is not valid UTF-8: {}",
            build_dir.display()
        ))
    })?;

    let matches: Vec<PathBuf> = glob::glob(full_pattern)
        .map_err(|e| Error::Fetch(format!("Invalid source pattern {}: {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect();

    match matches.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(Error::Fetch(format!(
            "No extracted directory matching {} under {}",
            pattern,
            build_dir.display()
        ))),
        many => Err(Error::Fetch(format!(
            "Ambiguous extracted layout: {} directories match {} under {}",
            many.len(),
            pattern,
            build_dir.display()
        ))),
    }
}
