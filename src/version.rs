//! Version identifiers for the summary.

use crate::error::Res;
use anyhow::{bail, Context};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

const UNKNOWN: &str = "unknown";

/// Returns `git describe` for the repository holding `dir`, or "unknown" when that fails.
pub async fn repo_version(dir: &Path) -> String {
    match describe(dir).await {
        Ok(version) => version,
        Err(e) => {
            debug!("No git version for {}: {e:#}", dir.display());
            UNKNOWN.to_string()
        }
    }
}

async fn describe(dir: &Path) -> Res<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--long", "--dirty", "--tags"])
        .current_dir(dir)
        .output()
        .await
        .context("Unable to run git")?;
    if !output.status.success() {
        bail!(
            "git describe failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    let stdout = String::from_utf8(output.stdout).context("git output is not UTF-8")?;
    match stdout.lines().next().map(str::trim) {
        Some(line) if !line.is_empty() => Ok(line.to_string()),
        _ => bail!("git describe printed nothing"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_not_a_repo() {
        let dir = TempDir::new().unwrap();
        assert_eq!(repo_version(dir.path()).await, UNKNOWN);
    }

    #[tokio::test]
    async fn test_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(repo_version(&dir.path().join("nope")).await, UNKNOWN);
    }
}
