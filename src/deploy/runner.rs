//! Deployment script execution and host probes.

use crate::deploy::error::DeployError;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Limit for each `docker` probe.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Values handed to the deployment script through its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    /// Commit being deployed, or `manual`.
    pub commit_sha: String,
    /// Repository name, or `manual-deployment`.
    pub repo_name: String,
    /// Image the script should pull and run.
    pub docker_image: String,
}

/// Result of a finished script run.
#[derive(Debug, Clone)]
pub struct DeployOutcome {
    /// Whether the script exited with status 0.
    pub success: bool,
    /// Exit code, absent when killed by a signal.
    pub exit_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

/// Runs the deployment script.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    script: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    /// Creates a runner for `script` bounded by `timeout`.
    pub fn new(script: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            script: script.into(),
            timeout,
        }
    }

    /// Script path.
    #[must_use]
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Whether the script exists on disk.
    pub async fn script_exists(&self) -> bool {
        tokio::fs::try_exists(&self.script).await.unwrap_or(false)
    }

    fn command(&self) -> Command {
        let is_powershell = self
            .script
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ps1"));

        if is_powershell {
            let mut cmd = Command::new("powershell.exe");
            cmd.args(["-ExecutionPolicy", "Bypass", "-File"])
                .arg(&self.script);
            cmd
        } else {
            Command::new(&self.script)
        }
    }

    /// Runs the script to completion and captures its output.
    ///
    /// The child is killed if the timeout elapses.
    ///
    /// # Errors
    /// Returns [`DeployError::ScriptNotFound`], [`DeployError::Timeout`] or
    /// [`DeployError::Spawn`]. A non-zero exit is an `Ok` outcome.
    pub async fn run(&self, request: &DeployRequest) -> Result<DeployOutcome, DeployError> {
        if !self.script_exists().await {
            return Err(DeployError::ScriptNotFound(self.script.clone()));
        }

        info!(script = %self.script.display(), image = %request.docker_image, "Running deployment script");

        let mut cmd = self.command();
        cmd.env("COMMIT_SHA", &request.commit_sha)
            .env("REPO_NAME", &request.repo_name)
            .env("DOCKER_IMAGE", &request.docker_image)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| DeployError::Timeout(self.timeout))?
            .map_err(|source| DeployError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        let outcome = DeployOutcome {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        debug!(exit_code = ?outcome.exit_code, "Deployment script finished");
        Ok(outcome)
    }
}

/// Runs a short-lived command, returning `None` if it fails to start or
/// exceeds `timeout`.
pub async fn probe(program: &str, args: &[&str], timeout: Duration) -> Option<Output> {
    let mut cmd = Command::new(program);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);

    tokio::time::timeout(timeout, cmd.output()).await.ok()?.ok()
}

/// Whether the docker daemon answers.
pub async fn docker_running() -> bool {
    probe("docker", &["info"], PROBE_TIMEOUT)
        .await
        .is_some_and(|output| output.status.success())
}

/// Whether a container with `name` is running.
pub async fn container_running(name: &str) -> bool {
    let filter = format!("name={name}");
    probe(
        "docker",
        &["ps", "--filter", &filter, "--format", "{{.Names}}"],
        PROBE_TIMEOUT,
    )
    .await
    .is_some_and(|output| String::from_utf8_lossy(&output.stdout).contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request() -> DeployRequest {
        DeployRequest {
            commit_sha: "abcdef1234567890".to_string(),
            repo_name: "acme/trades".to_string(),
            docker_image: "ghcr.io/acme/trades:latest".to_string(),
        }
    }

    #[cfg(unix)]
    fn write_script(dir: &TempDir, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.path().join("deploy.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_script() {
        let dir = TempDir::new().unwrap();
        let runner = ScriptRunner::new(dir.path().join("absent.sh"), Duration::from_secs(5));

        assert!(!runner.script_exists().await);
        assert!(matches!(
            runner.run(&request()).await,
            Err(DeployError::ScriptNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_script_receives_environment() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, r#"echo "$COMMIT_SHA $REPO_NAME $DOCKER_IMAGE""#);
        let runner = ScriptRunner::new(script, Duration::from_secs(10));

        let outcome = runner.run(&request()).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.exit_code, Some(0));
        assert_eq!(
            outcome.stdout.trim(),
            "abcdef1234567890 acme/trades ghcr.io/acme/trades:latest"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_script_is_outcome_not_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "echo broken >&2\nexit 3");
        let runner = ScriptRunner::new(script, Duration::from_secs(10));

        let outcome = runner.run(&request()).await.unwrap();

        assert!(!outcome.success);
        assert_eq!(outcome.exit_code, Some(3));
        assert_eq!(outcome.stderr.trim(), "broken");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "sleep 5");
        let runner = ScriptRunner::new(script, Duration::from_millis(200));

        assert!(matches!(
            runner.run(&request()).await,
            Err(DeployError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_unknown_program() {
        let output = probe(
            "definitely-not-a-real-binary-4821",
            &[],
            Duration::from_secs(1),
        )
        .await;
        assert!(output.is_none());
    }
}
