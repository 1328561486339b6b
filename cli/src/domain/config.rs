//! Domain types and validators for the batch configuration.
//!
//! Pure functions only: no I/O, no async, no filesystem access.

use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// Application names end up in paths, image tags, container and database
/// names, rendered YAML/Dockerfile text and remote argv. Anything outside
/// this alphabet is rejected rather than escaped.
pub static APP_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Safety: constant pattern; cannot fail.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z0-9][a-z0-9_]{0,62}$").expect("valid regex")
});

// ── AppName ──────────────────────────────────────────────────────────────────

/// A validated application (Odoo module) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppName(String);

impl AppName {
    /// Validate and wrap `name`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidAppName` if `name` does not match
    /// [`APP_NAME_RE`].
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        if APP_NAME_RE.is_match(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(ConfigError::InvalidAppName(name.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AppName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AppName> for String {
    fn from(name: AppName) -> Self {
        name.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Config schema ────────────────────────────────────────────────────────────

/// One entry of the batch: where the module lives and what it is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSpec {
    pub repository: String,
    pub name: AppName,
}

/// Shared base source cloned once before the per-application loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseSource {
    pub repository: String,
    pub git_ref: String,
    pub depth: u32,
}

impl Default for BaseSource {
    fn default() -> Self {
        Self {
            repository: "https://github.com/Vauxoo/odoo.git".to_string(),
            git_ref: "8.0".to_string(),
            depth: 1,
        }
    }
}

/// Administrative `psql` connection used to reset databases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Maintenance database to connect to.
    pub admin_db: String,
    /// `psql -h`; local socket when unset.
    pub host: Option<String>,
    /// `psql -U`; current OS user when unset.
    pub user: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            admin_db: "postgres".to_string(),
            host: None,
            user: None,
        }
    }
}

/// Values injected into the composition definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub db_host: String,
    pub db_user: String,
    pub db_password: String,
    pub admin_password: String,
    pub mem_limit: String,
    /// User that runs install and test inside the container.
    pub odoo_user: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            db_host: "172.17.0.1".to_string(),
            db_user: "truiz".to_string(),
            db_password: "truiz".to_string(),
            admin_password: "KtCY".to_string(),
            mem_limit: "1024MB".to_string(),
            odoo_user: "odoo".to_string(),
        }
    }
}

/// Top-level batch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory holding `files/`, `odoo/`, `Dockerfile` and compose file.
    pub workspace_root: PathBuf,
    pub base_image: String,
    pub base_source: BaseSource,
    /// Branch cloned for every application repository.
    pub git_ref: String,
    pub clone_depth: u32,
    /// Appended to the app name for the image tag (`demo` → `demo80`).
    pub tag_suffix: String,
    /// Program plus leading args; the extra-addons path is appended twice.
    pub dependency_command: Vec<String>,
    /// Program plus leading args; `up -d` is appended.
    pub compose_command: Vec<String>,
    pub build_timeout_secs: u64,
    pub database: DatabaseConfig,
    pub container: ContainerConfig,
    pub applications: Vec<ApplicationSpec>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workspace_root: PathBuf::from("."),
            base_image: "vauxoo/odoo-80-image".to_string(),
            base_source: BaseSource::default(),
            git_ref: "8.0".to_string(),
            clone_depth: 1,
            tag_suffix: "80".to_string(),
            dependency_command: vec!["./clone_oca_dependencies".to_string()],
            compose_command: vec!["docker-compose".to_string()],
            build_timeout_secs: 3600,
            database: DatabaseConfig::default(),
            container: ContainerConfig::default(),
            applications: default_applications(),
        }
    }
}

fn default_applications() -> Vec<ApplicationSpec> {
    [
        ("git@github.com:Vauxoo/yoytec.git", "yoytec"),
        ("git@github.com:Vauxoo/yoytec.git", "erp_vauxoo_com"),
        ("git@github.com:Vauxoo/lodigroup.git", "lodi"),
        ("git@github.com:Vauxoo/lodigroup.git", "apex"),
        ("git@github.com:Vauxoo/lodigroup.git", "exim"),
        ("git@github.com:Vauxoo/ever.git", "ever"),
    ]
    .into_iter()
    .map(|(repository, name)| ApplicationSpec {
        repository: repository.to_string(),
        name: AppName(name.to_string()),
    })
    .collect()
}

// ── Validators ───────────────────────────────────────────────────────────────

impl BatchConfig {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.applications.is_empty() {
            return Err(ConfigError::NoApplications);
        }
        let mut seen = HashSet::new();
        for app in &self.applications {
            if !seen.insert(app.name.as_str()) {
                return Err(ConfigError::DuplicateApp(app.name.to_string()));
            }
        }
        if self.dependency_command.first().is_none_or(String::is_empty) {
            return Err(ConfigError::EmptyCommand("dependency_command"));
        }
        if self.compose_command.first().is_none_or(String::is_empty) {
            return Err(ConfigError::EmptyCommand("compose_command"));
        }
        if !self
            .tag_suffix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::InvalidValue {
                key: "tag_suffix",
                value: self.tag_suffix.clone(),
            });
        }
        if self.build_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "build_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Restrict the batch to the named applications, keeping config order.
    ///
    /// An empty `only` keeps every application.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownApp` if a name is not configured.
    pub fn select(&self, only: &[String]) -> Result<Vec<ApplicationSpec>, ConfigError> {
        if only.is_empty() {
            return Ok(self.applications.clone());
        }
        for name in only {
            if !self.applications.iter().any(|a| a.name.as_str() == name) {
                return Err(ConfigError::UnknownApp {
                    name: name.clone(),
                    valid: self
                        .applications
                        .iter()
                        .map(|a| a.name.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        Ok(self
            .applications
            .iter()
            .filter(|a| only.iter().any(|n| n == a.name.as_str()))
            .cloned()
            .collect())
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
