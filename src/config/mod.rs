//! Configuration for ecopack
//!
//! Settings are read from a YAML file and then completed by the CLI layer with
//! secrets and CI context (tokens, repository, commit). Components only ever
//! see the resolved structs below; nothing in here reads the environment.
//!
//! Lookup order for the file:
//! 1. `--config <path>` (must exist)
//! 2. `./ecopack.yaml`
//! 3. `<user config dir>/ecopack/config.yaml`
//! 4. built-in defaults

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::retry::RetryPolicy;

/// Name of the configuration file looked up in the current directory
pub const CONFIG_FILE: &str = "ecopack.yaml";

/// Directory under the user config dir holding `config.yaml`
const USER_CONFIG_DIR: &str = "ecopack";

pub const DEFAULT_BUCKET: &str = "cloudify-release-eu";
pub const DEFAULT_FOLDER: &str = "cloudify/wagons";
pub const DEFAULT_DOMAIN: &str = "http://repository.cloudifysource.org";
pub const DEFAULT_BUNDLE_NAME: &str = "cloudify-plugins-bundle";
pub const CENTOS: &str = "Centos Core";
pub const REDHAT: &str = "Redhat Maipo";

const DEFAULT_BUNDLE_TITLES: [&str; 11] = [
    "vSphere",
    "Terraform",
    "Docker",
    "OpenStack",
    "Fabric",
    "GCP",
    "AWS",
    "Azure",
    "Ansible",
    "Kubernetes",
    "Utilities",
];

/// Complete ecopack configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub storage: StorageConfig,
    pub hosting: HostingConfig,
    pub bundle: BundleSettings,
    pub retry: RetryPolicy,
    pub workspace: WorkspaceConfig,
    pub manager: ManagerConfig,
    pub marketplace: MarketplaceConfig,
}

/// Where objects are stored
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageBackend {
    /// Amazon S3, credentials from the standard AWS provider chain
    #[default]
    S3,
    /// A local directory standing in for the bucket
    Fs { root: PathBuf },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: Option<String>,
    /// Root segment of every plugin asset key
    pub folder: String,
    /// Public URL prefix under which the bucket is served
    pub domain: String,
    /// Key of the registry document, defaults to `<folder>/plugins.json`
    pub registry_key: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: DEFAULT_BUCKET.to_string(),
            region: None,
            folder: DEFAULT_FOLDER.to_string(),
            domain: DEFAULT_DOMAIN.to_string(),
            registry_key: None,
        }
    }
}

impl StorageConfig {
    pub fn registry_key(&self) -> String {
        self.registry_key
            .clone()
            .unwrap_or_else(|| format!("{}/plugins.json", self.folder.trim_end_matches('/')))
    }
}

/// Version-control hosting API access
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HostingConfig {
    pub api_url: String,
    pub organization: Option<String>,
    pub repository: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            organization: None,
            repository: None,
            token: None,
        }
    }
}

/// Which plugins go into the combined bundle
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleSettings {
    pub name: String,
    pub titles: Vec<String>,
    pub distros: Vec<String>,
}

impl Default for BundleSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_BUNDLE_NAME.to_string(),
            titles: DEFAULT_BUNDLE_TITLES.iter().map(|t| t.to_string()).collect(),
            distros: vec![CENTOS.to_string(), REDHAT.to_string()],
        }
    }
}

/// CI workspace layout
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Directory holding build outputs
    pub build_dir: PathBuf,
    /// Files with this suffix get an `.md5` companion
    pub wagon_suffix: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from("workspace").join("build"),
            wagon_suffix: ".wgn".to_string(),
        }
    }
}

/// Deployment-orchestration manager REST access
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub host: Option<String>,
    pub protocol: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub tenant: String,
    pub api_version: String,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            host: None,
            protocol: "https".to_string(),
            username: "admin".to_string(),
            password: None,
            tenant: "default_tenant".to_string(),
            api_version: "v3.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    pub webhook_url: Option<String>,
}

impl Settings {
    /// Parse settings from YAML content; `origin` is used in error messages
    pub fn from_yaml(content: &str, origin: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(content)
            .map_err(|e| error::config::parse_failed(origin, e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings following the lookup order, returning the file used (if any)
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        let Some(path) = Self::locate(explicit)? else {
            tracing::debug!("no configuration file found, using defaults");
            return Ok((Self::default(), None));
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        let mut settings = Self::from_yaml(&content, &path.display().to_string())?;

        // Relative fs roots are relative to the file that names them
        if let StorageBackend::Fs { root } = &mut settings.storage.backend {
            if root.is_relative() {
                if let Some(dir) = path.parent() {
                    *root = dir.join(&*root);
                }
            }
        }

        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok((settings, Some(path)))
    }

    fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(error::config::not_found(path.display().to_string()));
            }
            return Ok(Some(path.to_path_buf()));
        }

        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return Ok(Some(local));
        }

        Ok(dirs::config_dir()
            .map(|dir| dir.join(USER_CONFIG_DIR).join("config.yaml"))
            .filter(|path| path.is_file()))
    }

    /// Reject settings no command could work with
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(error::config::invalid("storage.bucket must not be empty"));
        }
        if self.storage.folder.trim_matches('/').is_empty() {
            return Err(error::config::invalid("storage.folder must not be empty"));
        }
        if !(self.storage.domain.starts_with("http://") || self.storage.domain.starts_with("https://"))
        {
            return Err(error::config::invalid(format!(
                "storage.domain must be an http(s) URL, got '{}'",
                self.storage.domain
            )));
        }
        if self.bundle.name.trim().is_empty() || self.bundle.name.contains('/') {
            return Err(error::config::invalid(
                "bundle.name must be a plain, non-empty file name",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(error::config::invalid("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}
