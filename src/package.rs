// src/package.rs

//! Package finalization: make installed metadata relocatable and report
//! the produced link artifacts
//!
//! The wrapped build's install step writes its absolute install prefix
//! into two generated files (a pkg-config descriptor and a CMake package
//! config). Both are rewritten in place, exactly once per cook, with
//! literal string substitution; every other byte is preserved.

use crate::config::TargetOs;
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Default variable name the CMake config is rewritten against
pub const DEFAULT_ROOT_VAR: &str = "OPENBLAS_ROOT";

/// Patch both generated config files under `prefix`
pub fn finalize(prefix: &Path, recipe: &Recipe, os: TargetOs, root_var: &str) -> Result<()> {
    patch_pkg_config(prefix, recipe, os)?;
    patch_cmake_config(prefix, recipe, root_var)?;
    Ok(())
}

/// Rewrite the pkg-config descriptor to use a `${prefix}` variable
///
/// Only Linux installs generate a pkg-config file; on every other
/// platform this step is skipped entirely. On Linux a missing file means
/// the install step did not do what it was supposed to.
pub fn patch_pkg_config(prefix: &Path, recipe: &Recipe, os: TargetOs) -> Result<()> {
    if os != TargetOs::Linux {
        debug!("Skipping pkg-config patch on {}", os);
        return Ok(());
    }

    let pc_path = prefix
        .join("lib")
        .join("pkgconfig")
        .join(format!("{}.pc", recipe.name));

    if !pc_path.exists() {
        return Err(Error::Patch {
            file: pc_path,
            reason: "expected pkg-config file was not generated".to_string(),
        });
    }

    info!("Patching {} to use a variable prefix", pc_path.display());

    let prefix_str = prefix.to_string_lossy();
    let content = fs::read_to_string(&pc_path)?;

    // Substitute in the body first, then prepend the definition line so
    // it keeps the literal path.
    let body = content.replace(prefix_str.as_ref(), "${prefix}");
    let patched = format!("prefix={}\n{}", prefix_str, body);

    fs::write(&pc_path, patched)?;
    Ok(())
}

/// Rewrite the CMake package config against a caller-named root variable
///
/// Every supported build path generates this file, so its absence is a
/// hard error on all platforms.
pub fn patch_cmake_config(prefix: &Path, recipe: &Recipe, root_var: &str) -> Result<()> {
    let config_path = prefix
        .join("lib")
        .join("cmake")
        .join(recipe.name)
        .join(format!("{}Config.cmake", recipe.cmake_name));

    if !config_path.exists() {
        return Err(Error::Patch {
            file: config_path,
            reason: "expected CMake package config was not generated".to_string(),
        });
    }

    info!(
        "Patching {} to use ${{{}}}",
        config_path.display(),
        root_var
    );

    let prefix_str = prefix.to_string_lossy();
    let content = fs::read_to_string(&config_path)?;
    let patched = content.replace(prefix_str.as_ref(), &format!("${{{}}}", root_var));

    fs::write(&config_path, patched)?;
    Ok(())
}

/// Enumerate the produced link artifacts under `<prefix>/lib`
///
/// Returns link names (no `lib` prefix, no extension), deterministically
/// ordered. Linux consumers always need the threading library, so
/// `pthread` is appended there regardless of what the scan found.
pub fn collect_libs(prefix: &Path, os: TargetOs) -> Result<Vec<String>> {
    let lib_dir = prefix.join("lib");

    let mut libs = Vec::new();
    if lib_dir.is_dir() {
        for entry in fs::read_dir(&lib_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = link_name(&file_name.to_string_lossy()) {
                libs.push(name);
            }
        }
    } else {
        warn!("No lib directory under {}", prefix.display());
    }

    libs.sort();
    libs.dedup();

    if os == TargetOs::Linux {
        libs.push("pthread".to_string());
    }

    Ok(libs)
}

/// Link name for a library file, or None for non-library files
fn link_name(file_name: &str) -> Option<String> {
    let is_lib = file_name.ends_with(".a")
        || file_name.ends_with(".lib")
        || file_name.ends_with(".dylib")
        || file_name.ends_with(".so")
        || file_name.contains(".so.");
    if !is_lib {
        return None;
    }

    let base = file_name.split('.').next()?;
    let base = base.strip_prefix("lib").unwrap_or(base);
    if base.is_empty() {
        return None;
    }
    Some(base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn install_pc(prefix: &Path, recipe: &Recipe, content: &str) -> PathBuf {
        let dir = prefix.join("lib").join("pkgconfig");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}.pc", recipe.name));
        fs::write(&path, content).unwrap();
        path
    }

    fn install_cmake_config(prefix: &Path, recipe: &Recipe, content: &str) -> PathBuf {
        let dir = prefix.join("lib").join("cmake").join(recipe.name);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(format!("{}Config.cmake", recipe.cmake_name));
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_pkg_config_patch_adds_prefix_line() {
        let prefix = TempDir::new().unwrap();
        let prefix_str = prefix.path().to_string_lossy().to_string();
        let recipe = Recipe::default();

        let original = format!(
            "libdir={0}/lib\nincludedir={0}/include\n\nName: openblas\n",
            prefix_str
        );
        let path = install_pc(prefix.path(), &recipe, &original);

        patch_pkg_config(prefix.path(), &recipe, TargetOs::Linux).unwrap();

        let patched = fs::read_to_string(&path).unwrap();
        let mut lines = patched.lines();
        assert_eq!(
            lines.next().unwrap(),
            format!("prefix={}", prefix_str)
        );
        assert_eq!(patched.lines().count(), original.lines().count() + 1);
        assert!(patched.contains("libdir=${prefix}/lib"));
        assert!(patched.contains("includedir=${prefix}/include"));
        // Both body occurrences replaced; the literal path survives only
        // in the definition line.
        assert_eq!(patched.matches(prefix_str.as_str()).count(), 1);
    }

    #[test]
    fn test_pkg_config_skipped_off_linux() {
        let prefix = TempDir::new().unwrap();
        let recipe = Recipe::default();

        // No file installed at all: still fine on non-Linux.
        patch_pkg_config(prefix.path(), &recipe, TargetOs::Macos).unwrap();
        patch_pkg_config(prefix.path(), &recipe, TargetOs::Windows).unwrap();

        // And an installed file is left untouched.
        let path = install_pc(prefix.path(), &recipe, "Name: openblas\n");
        patch_pkg_config(prefix.path(), &recipe, TargetOs::FreeBsd).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Name: openblas\n");
    }

    #[test]
    fn test_pkg_config_missing_on_linux_is_an_error() {
        let prefix = TempDir::new().unwrap();
        let recipe = Recipe::default();

        let result = patch_pkg_config(prefix.path(), &recipe, TargetOs::Linux);
        assert!(matches!(result, Err(Error::Patch { .. })));
    }

    #[test]
    fn test_cmake_config_patch_replaces_every_occurrence() {
        let prefix = TempDir::new().unwrap();
        let prefix_str = prefix.path().to_string_lossy().to_string();
        let recipe = Recipe::default();

        let original = format!(
            "set(OpenBLAS_INCLUDE_DIRS {0}/include)\n\
             set(OpenBLAS_LIBRARIES {0}/lib/libopenblas.so)\n\
             # installed to {0}\n",
            prefix_str
        );
        let path = install_cmake_config(prefix.path(), &recipe, &original);

        patch_cmake_config(prefix.path(), &recipe, "OPENBLAS_ROOT").unwrap();

        let patched = fs::read_to_string(&path).unwrap();
        assert_eq!(patched.matches(prefix_str.as_str()).count(), 0);
        assert_eq!(patched.matches("${OPENBLAS_ROOT}").count(), 3);
        // Nothing but the substitution changed.
        assert_eq!(
            patched,
            original.replace(prefix_str.as_str(), "${OPENBLAS_ROOT}")
        );
    }

    #[test]
    fn test_cmake_config_missing_is_an_error() {
        let prefix = TempDir::new().unwrap();
        let recipe = Recipe::default();

        let result = patch_cmake_config(prefix.path(), &recipe, DEFAULT_ROOT_VAR);
        assert!(matches!(result, Err(Error::Patch { .. })));
    }

    #[test]
    fn test_collect_libs_linux() {
        let prefix = TempDir::new().unwrap();
        let lib_dir = prefix.path().join("lib");
        fs::create_dir_all(lib_dir.join("pkgconfig")).unwrap();
        fs::write(lib_dir.join("libopenblas.a"), "").unwrap();
        fs::write(lib_dir.join("libopenblas.so.0.3"), "").unwrap();
        fs::write(lib_dir.join("cmake.txt"), "").unwrap();

        let libs = collect_libs(prefix.path(), TargetOs::Linux).unwrap();
        assert_eq!(libs, vec!["openblas", "pthread"]);
    }

    #[test]
    fn test_collect_libs_windows() {
        let prefix = TempDir::new().unwrap();
        let lib_dir = prefix.path().join("lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("openblas.lib"), "").unwrap();

        let libs = collect_libs(prefix.path(), TargetOs::Windows).unwrap();
        assert_eq!(libs, vec!["openblas"]);
    }

    #[test]
    fn test_pthread_reported_even_with_no_artifacts() {
        let prefix = TempDir::new().unwrap();
        fs::create_dir_all(prefix.path().join("lib")).unwrap();

        let libs = collect_libs(prefix.path(), TargetOs::Linux).unwrap();
        assert_eq!(libs, vec!["pthread"]);
    }

    #[test]
    fn test_link_name() {
        assert_eq!(link_name("libopenblas.so"), Some("openblas".to_string()));
        assert_eq!(
            link_name("libopenblas.so.0.3"),
            Some("openblas".to_string())
        );
        assert_eq!(link_name("libopenblas.a"), Some("openblas".to_string()));
        assert_eq!(link_name("openblas.lib"), Some("openblas".to_string()));
        assert_eq!(
            link_name("libopenblas.dylib"),
            Some("openblas".to_string())
        );
        assert_eq!(link_name("openblas.pc"), None);
        assert_eq!(link_name("README"), None);
    }
}
