//! Deployment receiver configuration.

use crate::config::{ConfigError, parse_port, split_list};
use std::path::PathBuf;
use std::time::Duration;

/// Default port for the receiver.
pub const DEFAULT_WEBHOOK_PORT: u16 = 5001;

/// Default limit on a single deployment run.
pub const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 600;

/// Repository accepted when `ALLOWED_REPOS` is unset.
pub const DEFAULT_ALLOWED_REPO: &str = "SahilBharodiya/transaction-management-api";

/// Branches that trigger a deployment when `ALLOWED_BRANCHES` is unset.
pub const DEFAULT_ALLOWED_BRANCHES: [&str; 2] = ["refs/heads/main", "refs/heads/master"];

/// Container name probed by the status endpoint.
pub const DEFAULT_API_CONTAINER: &str = "transaction-api";

/// Settings for the deployment receiver.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    /// Shared webhook secret. Every push is rejected when unset.
    pub secret: Option<String>,
    /// Script run for each deployment.
    pub script: PathBuf,
    /// `owner/name` repositories allowed to trigger deployments.
    pub allowed_repos: Vec<String>,
    /// Git refs that trigger a deployment.
    pub allowed_branches: Vec<String>,
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Upper bound for one script run.
    pub deploy_timeout: Duration,
    /// Container whose presence the status endpoint reports.
    pub api_container: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            secret: None,
            script: default_script(),
            allowed_repos: vec![DEFAULT_ALLOWED_REPO.to_string()],
            allowed_branches: DEFAULT_ALLOWED_BRANCHES
                .iter()
                .map(|b| (*b).to_string())
                .collect(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_WEBHOOK_PORT,
            deploy_timeout: Duration::from_secs(DEFAULT_DEPLOY_TIMEOUT_SECS),
            api_container: DEFAULT_API_CONTAINER.to_string(),
        }
    }
}

impl DeployConfig {
    /// Builds configuration from the process environment.
    ///
    /// # Errors
    /// Returns error if a variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns error if a variable holds an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.secret = lookup("WEBHOOK_SECRET").filter(|s| !s.is_empty());
        if let Some(script) = lookup("DEPLOYMENT_SCRIPT") {
            config.script = PathBuf::from(script);
        }
        if let Some(repos) = lookup("ALLOWED_REPOS") {
            config.allowed_repos = split_list(&repos);
        }
        if let Some(branches) = lookup("ALLOWED_BRANCHES") {
            config.allowed_branches = split_list(&branches);
        }
        if let Some(host) = lookup("WEBHOOK_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("WEBHOOK_PORT") {
            config.port = parse_port(&port)?;
        }
        if let Some(secs) = lookup("DEPLOY_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ConfigError::InvalidValue(format!("DEPLOY_TIMEOUT_SECS {secs} is not a number"))
            })?;
            config.deploy_timeout = Duration::from_secs(secs);
        }
        if let Some(container) = lookup("API_CONTAINER") {
            config.api_container = container;
        }

        config.validate()?;
        Ok(config)
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether a webhook secret is set.
    #[must_use]
    pub fn secret_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Image deployed by a manual trigger that names none.
    #[must_use]
    pub fn default_image(&self) -> Option<String> {
        self.allowed_repos.first().map(|repo| image_for(repo))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.script.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "DEPLOYMENT_SCRIPT cannot be empty".to_string(),
            ));
        }
        if self.allowed_repos.is_empty() {
            return Err(ConfigError::InvalidValue(
                "at least one allowed repository must be configured".to_string(),
            ));
        }
        if self.deploy_timeout.is_zero() {
            return Err(ConfigError::InvalidValue(
                "DEPLOY_TIMEOUT_SECS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Container image published for a repository.
#[must_use]
pub fn image_for(repo: &str) -> String {
    format!("ghcr.io/{}:latest", repo.to_lowercase())
}

fn default_script() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("./deploy.ps1")
    } else {
        PathBuf::from("./deploy.sh")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeployConfig::from_lookup(lookup_from(&[])).unwrap();

        assert!(config.secret.is_none());
        assert!(!config.secret_configured());
        assert_eq!(config.port, 5001);
        assert_eq!(config.deploy_timeout, Duration::from_secs(600));
        assert_eq!(
            config.allowed_branches,
            vec!["refs/heads/main", "refs/heads/master"]
        );
        assert_eq!(config.bind_addr(), "0.0.0.0:5001");
        #[cfg(not(windows))]
        assert_eq!(config.script, PathBuf::from("./deploy.sh"));
    }

    #[test]
    fn test_env_overrides() {
        let config = DeployConfig::from_lookup(lookup_from(&[
            ("WEBHOOK_SECRET", "s3cret"),
            ("DEPLOYMENT_SCRIPT", "/opt/deploy.sh"),
            ("ALLOWED_REPOS", "Acme/Trades, acme/other"),
            ("ALLOWED_BRANCHES", "refs/heads/release"),
            ("WEBHOOK_PORT", "9001"),
            ("DEPLOY_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.secret.as_deref(), Some("s3cret"));
        assert_eq!(config.script, PathBuf::from("/opt/deploy.sh"));
        assert_eq!(config.allowed_repos, vec!["Acme/Trades", "acme/other"]);
        assert_eq!(config.allowed_branches, vec!["refs/heads/release"]);
        assert_eq!(config.port, 9001);
        assert_eq!(config.deploy_timeout, Duration::from_secs(30));
        assert_eq!(
            config.default_image().as_deref(),
            Some("ghcr.io/acme/trades:latest")
        );
    }

    #[test]
    fn test_empty_secret_is_unset() {
        let config = DeployConfig::from_lookup(lookup_from(&[("WEBHOOK_SECRET", "")])).unwrap();
        assert!(config.secret.is_none());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DeployConfig::from_lookup(lookup_from(&[("WEBHOOK_PORT", "0")])).is_err());
        assert!(DeployConfig::from_lookup(lookup_from(&[("WEBHOOK_PORT", "abc")])).is_err());
        assert!(DeployConfig::from_lookup(lookup_from(&[("DEPLOY_TIMEOUT_SECS", "0")])).is_err());
        assert!(DeployConfig::from_lookup(lookup_from(&[("ALLOWED_REPOS", " , ")])).is_err());
    }

    #[test]
    fn test_image_for_lowercases() {
        assert_eq!(
            image_for("SahilBharodiya/Transaction-Management-API"),
            "ghcr.io/sahilbharodiya/transaction-management-api:latest"
        );
    }
}
