// src/recipe.rs

//! Recipe metadata for the wrapped project

/// Metadata describing the packaged project and where its sources live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    /// Package name, as spelled in generated metadata paths
    pub name: &'static str,
    /// Project name, as spelled in the CMake package config filename
    pub cmake_name: &'static str,
    pub version: String,
    pub homepage: &'static str,
    pub description: &'static str,
    pub license: &'static str,
}

impl Recipe {
    /// The OpenBLAS recipe at a specific upstream version
    pub fn openblas(version: impl Into<String>) -> Self {
        Self {
            name: "openblas",
            cmake_name: "OpenBLAS",
            version: version.into(),
            homepage: "http://www.openblas.net/",
            description: "OpenBLAS is an optimized BLAS library based on GotoBLAS2 1.13 BSD version.",
            license: "BSD 3-Clause",
        }
    }

    /// Versioned download URL for the release tarball
    ///
    /// The upstream filename contains literal spaces
    /// ("OpenBLAS <version> version.tar.gz"); they travel percent-encoded.
    pub fn archive_url(&self) -> String {
        format!(
            "https://sourceforge.net/projects/openblas/files/v{version}/OpenBLAS%20{version}%20version.tar.gz",
            version = self.version
        )
    }

    /// Local filename the downloaded archive is cached under
    pub fn archive_filename(&self) -> String {
        format!("{}-{}.tar.gz", self.name, self.version)
    }

    /// Glob pattern matching the tarball's single top-level directory
    pub fn extracted_dir_pattern(&self) -> &'static str {
        "xianyi-OpenBLAS-*"
    }
}

impl Default for Recipe {
    fn default() -> Self {
        Self::openblas("0.3.1")
    }
}
