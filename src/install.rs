//! Post-generation dependency installation.
//!
//! Shells out to the ecosystem package manager in the destination root.
//! Generation is already complete when this runs; a failure here surfaces
//! as its own error with the files left on disk.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use indicatif::ProgressBar;
use tracing::debug;

use crate::error::{Error, Result};

/// Run `<package_manager> install` in `root`.
pub fn run(root: &Path, package_manager: &str) -> Result<()> {
    let command_line = format!("{package_manager} install");
    debug!(command = %command_line, root = %root.display(), "installing dependencies");

    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Installing dependencies with {package_manager}..."));
    spinner.enable_steady_tick(Duration::from_millis(100));

    // Capture output so the spinner line stays intact; surface stderr only
    // on failure.
    let output = Command::new(package_manager)
        .arg("install")
        .current_dir(root)
        .output();

    spinner.finish_and_clear();

    let output = output.map_err(|err| Error::Install {
        command: command_line.clone(),
        reason: err.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(%stderr, "install command failed");
        return Err(Error::Install {
            command: command_line,
            reason: format!("exited with {}", output.status),
        });
    }

    Ok(())
}
