//! Refreshing the local clone of the upstream dataset repository.

use crate::source::error::SourceError;
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Brings a local copy of the source data up to date.
///
/// The refresh is an opaque external operation; implementations surface any
/// failure and never retry.
pub trait SourceRefresher {
    fn refresh(&self, dir: &Path) -> Result<(), SourceError>;
}

/// Refreshes a git clone by running `git pull` inside it.
#[derive(Debug, Clone)]
pub struct GitRefresher {
    program: PathBuf,
}

impl GitRefresher {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    /// Uses a specific git executable instead of the one found on `PATH`.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GitRefresher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceRefresher for GitRefresher {
    fn refresh(&self, dir: &Path) -> Result<(), SourceError> {
        info!("Pulling latest data into {}", dir.display());
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(dir)
            .arg("pull")
            .output()
            .map_err(|e| SourceError::RefreshSpawn {
                program: self.program.display().to_string(),
                dir: dir.to_path_buf(),
                source: e,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program.display(), output.status)
        } else {
            stderr
        };
        warn!("Refresh of {} failed: {}", dir.display(), message);
        Err(SourceError::RefreshFailed {
            dir: dir.to_path_buf(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let refresher = GitRefresher::with_program("definitely-not-a-git-binary");

        let err = refresher.refresh(dir.path()).unwrap_err();
        assert!(matches!(err, SourceError::RefreshSpawn { .. }));
        Ok(())
    }

    #[test]
    fn test_pull_outside_a_repository_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;

        // Either git is missing or it refuses to pull in a plain directory.
        let result = GitRefresher::new().refresh(dir.path());
        assert!(result.is_err());
        Ok(())
    }
}
