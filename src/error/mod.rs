//! Error types and handling for ecopack
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`asset`]: Asset resolution errors
//! - [`bundle`]: Bundle planning and archive errors
//! - [`config`]: Configuration errors
//! - [`fs`]: File system errors
//! - [`manager`]: Orchestration manager and marketplace errors
//! - [`registry`]: Registry document errors
//! - [`release`]: Hosting API and release errors
//! - [`retry`]: Bounded retry errors
//! - [`storage`]: Object storage errors
//! - [`validate`]: Plugin YAML and changelog validation errors
//! - [`version`]: Version parsing errors

pub mod asset;
pub mod bundle;
pub mod config;
pub mod fs;
pub mod manager;
pub mod registry;
pub mod release;
pub mod retry;
pub mod storage;
pub mod validate;
pub mod version;

use miette::Diagnostic;
use thiserror::Error;

/// HTTP status the hosting API answers with for validation failures and duplicates
pub const UNPROCESSABLE_STATUS: u16 = 422;

/// Main error type for ecopack operations
#[derive(Error, Diagnostic, Debug)]
pub enum EcopackError {
    // Version errors
    #[error("Invalid version: '{version}'")]
    #[diagnostic(
        code(ecopack::version::invalid),
        help("Versions must look like MAJOR.MINOR.PATCH, e.g. 1.2.3")
    )]
    InvalidVersion { version: String },

    // Asset errors
    #[error("Asset not found remotely or locally: {reference}")]
    #[diagnostic(
        code(ecopack::asset::not_found),
        help("Check that the asset was uploaded or that the local path exists")
    )]
    AssetNotFound { reference: String },

    // Storage errors
    #[error("Object not found: {key}")]
    #[diagnostic(code(ecopack::storage::not_found))]
    ObjectNotFound { key: String },

    #[error("Object storage {operation} failed for '{key}': {reason}")]
    #[diagnostic(code(ecopack::storage::failed))]
    StorageFailed {
        operation: String,
        key: String,
        reason: String,
    },

    #[error("Object '{key}' changed since it was read")]
    #[diagnostic(
        code(ecopack::storage::precondition_failed),
        help("Another job updated the object concurrently; the update can be retried")
    )]
    PreconditionFailed { key: String },

    // Registry errors
    #[error("Invalid registry document: {message}")]
    #[diagnostic(code(ecopack::registry::invalid))]
    RegistryInvalid { message: String },

    // Release / hosting errors
    #[error("Release '{tag}' does not exist")]
    #[diagnostic(
        code(ecopack::release::not_found),
        help("Run 'ecopack release create' for this version first")
    )]
    ReleaseNotFound { tag: String },

    #[error("Hosting API error ({status}): {message}")]
    #[diagnostic(code(ecopack::release::hosting_api))]
    HostingApi { status: u16, message: String },

    #[error("Network failure: {message}")]
    #[diagnostic(code(ecopack::release::transient))]
    TransientNetwork { message: String },

    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    #[diagnostic(
        code(ecopack::retry::exhausted),
        help("Raise retry.max_attempts in the configuration if the remote is flaky")
    )]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("Manager API error ({status}): {message}")]
    #[diagnostic(code(ecopack::manager::api))]
    ManagerApi { status: u16, message: String },

    #[error("Marketplace webhook failed ({status}): {message}")]
    #[diagnostic(code(ecopack::marketplace::webhook_failed))]
    WebhookFailed { status: u16, message: String },

    // Bundle errors
    #[error("Cannot bundle plugins: {message}")]
    #[diagnostic(code(ecopack::bundle::invalid))]
    BundleInvalid { message: String },

    #[error("Failed to write archive {path}: {reason}")]
    #[diagnostic(code(ecopack::bundle::archive_failed))]
    ArchiveFailed { path: String, reason: String },

    // Validation errors
    #[error("Invalid plugin YAML {path}: {message}")]
    #[diagnostic(code(ecopack::validate::plugin_yaml))]
    PluginYamlInvalid { path: String, message: String },

    #[error("Version {version} is not the latest entry in {path}")]
    #[diagnostic(
        code(ecopack::validate::changelog_outdated),
        help("Add a changelog entry for the version being released")
    )]
    ChangelogOutdated { version: String, path: String },

    #[error("Failed to parse {what}: {reason}")]
    #[diagnostic(code(ecopack::parse_failed))]
    ParseFailed { what: String, reason: String },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(code(ecopack::config::not_found))]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(ecopack::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(ecopack::config::invalid))]
    ConfigInvalid { message: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(ecopack::git::operation_failed))]
    GitOperationFailed { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(ecopack::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(ecopack::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(ecopack::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(ecopack::fs::io_error))]
    IoError { message: String },
}

impl EcopackError {
    /// Dropped connections and similar failures worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, EcopackError::TransientNetwork { .. })
    }

    /// The hosting API rejected the request because the resource already exists
    /// or failed its validation (HTTP 422)
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            EcopackError::HostingApi { status, .. } if *status == UNPROCESSABLE_STATUS
        )
    }
}

impl From<std::io::Error> for EcopackError {
    fn from(err: std::io::Error) -> Self {
        EcopackError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for EcopackError {
    fn from(err: serde_yaml::Error) -> Self {
        EcopackError::ParseFailed {
            what: "YAML".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for EcopackError {
    fn from(err: serde_json::Error) -> Self {
        EcopackError::ParseFailed {
            what: "JSON".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for EcopackError {
    fn from(err: git2::Error) -> Self {
        EcopackError::GitOperationFailed {
            message: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, EcopackError>;
