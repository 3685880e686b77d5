// tests/finalize.rs

//! End-to-end finalization over a simulated install tree
//!
//! Builds the directory layout the wrapped build's install step would
//! produce, then drives metadata patching and artifact reporting the way
//! the Kitchen does after a real build.

use openblas_recipe::package::{collect_libs, finalize};
use openblas_recipe::{Recipe, TargetOs};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn simulate_install(prefix: &Path, recipe: &Recipe, with_pkg_config: bool) {
    let lib_dir = prefix.join("lib");
    fs::create_dir_all(&lib_dir).unwrap();
    fs::write(lib_dir.join("libopenblas.so.0.3"), "").unwrap();
    fs::write(lib_dir.join("libopenblas.a"), "").unwrap();

    if with_pkg_config {
        let pc_dir = lib_dir.join("pkgconfig");
        fs::create_dir_all(&pc_dir).unwrap();
        fs::write(
            pc_dir.join(format!("{}.pc", recipe.name)),
            format!(
                "libdir={0}/lib\nincludedir={0}/include\n\nName: {1}\nDescription: {2}\nVersion: {3}\nLibs: -L${{libdir}} -lopenblas\n",
                prefix.display(),
                recipe.name,
                recipe.description,
                recipe.version,
            ),
        )
        .unwrap();
    }

    let cmake_dir = lib_dir.join("cmake").join(recipe.name);
    fs::create_dir_all(&cmake_dir).unwrap();
    fs::write(
        cmake_dir.join(format!("{}Config.cmake", recipe.cmake_name)),
        format!(
            "set(OpenBLAS_VERSION \"{1}\")\n\
             set(OpenBLAS_INCLUDE_DIRS {0}/include)\n\
             set(OpenBLAS_LIBRARIES {0}/lib/libopenblas.so)\n",
            prefix.display(),
            recipe.version,
        ),
    )
    .unwrap();
}

#[test]
fn test_finalize_linux_install_tree() {
    let prefix = TempDir::new().unwrap();
    let prefix_str = prefix.path().display().to_string();
    let recipe = Recipe::default();

    simulate_install(prefix.path(), &recipe, true);
    finalize(prefix.path(), &recipe, TargetOs::Linux, "OPENBLAS_ROOT").unwrap();

    let pc = fs::read_to_string(
        prefix
            .path()
            .join("lib/pkgconfig")
            .join(format!("{}.pc", recipe.name)),
    )
    .unwrap();
    assert!(pc.starts_with(&format!("prefix={}\n", prefix_str)));
    assert!(pc.contains("libdir=${prefix}/lib"));
    assert!(pc.contains("includedir=${prefix}/include"));
    assert_eq!(pc.matches(prefix_str.as_str()).count(), 1);

    let cmake = fs::read_to_string(
        prefix
            .path()
            .join("lib/cmake")
            .join(recipe.name)
            .join(format!("{}Config.cmake", recipe.cmake_name)),
    )
    .unwrap();
    assert_eq!(cmake.matches(prefix_str.as_str()).count(), 0);
    assert_eq!(cmake.matches("${OPENBLAS_ROOT}").count(), 2);
    assert!(cmake.contains("set(OpenBLAS_VERSION \"0.3.1\")"));

    let libs = collect_libs(prefix.path(), TargetOs::Linux).unwrap();
    assert_eq!(libs, vec!["openblas", "pthread"]);
}

#[test]
fn test_finalize_without_pkg_config_off_linux() {
    let prefix = TempDir::new().unwrap();
    let recipe = Recipe::default();

    // Windows installs never generate a pkg-config file; finalization
    // still patches the CMake config and reports artifacts.
    simulate_install(prefix.path(), &recipe, false);
    finalize(prefix.path(), &recipe, TargetOs::Windows, "OPENBLAS_ROOT").unwrap();

    let cmake = fs::read_to_string(
        prefix
            .path()
            .join("lib/cmake")
            .join(recipe.name)
            .join(format!("{}Config.cmake", recipe.cmake_name)),
    )
    .unwrap();
    assert!(cmake.contains("${OPENBLAS_ROOT}"));

    let libs = collect_libs(prefix.path(), TargetOs::Windows).unwrap();
    assert_eq!(libs, vec!["openblas"]);
}
