// src/builder.rs

//! Build runner: drive the wrapped project's own build system
//!
//! Runs the selected plan as child processes from the extracted source
//! tree, then installs into the caller's package prefix. Success is exit
//! status only; build output is captured and surfaced on failure but
//! never parsed.

use crate::error::{Error, Result};
use crate::plan::BuildPlan;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Runs build and install steps for one cook
pub struct BuildRunner {
    /// Extracted source tree (`<build_dir>/sources`)
    source_dir: PathBuf,
    /// Scratch directory owning the source tree
    build_dir: PathBuf,
}

impl BuildRunner {
    pub fn new(build_dir: &Path, source_dir: &Path) -> Self {
        Self {
            source_dir: source_dir.to_path_buf(),
            build_dir: build_dir.to_path_buf(),
        }
    }

    /// Run the plan's build step(s), then install into `prefix`
    pub fn run(&self, plan: &BuildPlan, prefix: &Path) -> Result<()> {
        match plan {
            BuildPlan::Make(options) => {
                info!("Running make with: {}", options.render());
                run_step(
                    "build",
                    Command::new("make")
                        .args(options.args())
                        .current_dir(&self.source_dir),
                )?;

                info!("Running make install");
                run_step(
                    "install",
                    Command::new("make")
                        .arg(format!("PREFIX={}", prefix.display()))
                        .arg("install")
                        .current_dir(&self.source_dir),
                )?;
            }
            BuildPlan::Cmake(definitions) => {
                let cmake_dir = self.build_dir.join("cmake-build");
                fs::create_dir_all(&cmake_dir)?;

                run_step(
                    "configure",
                    Command::new("cmake")
                        .arg("-S")
                        .arg(&self.source_dir)
                        .arg("-B")
                        .arg(&cmake_dir)
                        .args(definitions.args()),
                )?;

                run_step(
                    "build",
                    Command::new("cmake").arg("--build").arg(&cmake_dir),
                )?;

                run_step(
                    "install",
                    Command::new("cmake")
                        .arg("--install")
                        .arg(&cmake_dir)
                        .arg("--prefix")
                        .arg(prefix),
                )?;
            }
        }

        Ok(())
    }
}

/// Run one build step, capturing output and checking only the exit status
fn run_step(step: &'static str, command: &mut Command) -> Result<()> {
    debug!("Command: {:?}", command);

    let output = command
        .output()
        .map_err(|e| Error::ToolNotFound(format!("Failed to run {} step: {}", step, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stdout.is_empty() {
        debug!("{} stdout:\n{}", step, stdout);
    }
    if !stderr.is_empty() {
        debug!("{} stderr:\n{}", step, stderr);
    }

    if !output.status.success() {
        let captured = if stderr.is_empty() { stdout } else { stderr };
        return Err(Error::BuildFailed {
            step,
            code: output.status.code(),
            output: captured.into_owned(),
        });
    }

    Ok(())
}
