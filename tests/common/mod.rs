//! Common test utilities for ecopack integration tests

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// Public domain the test configuration serves assets under
#[allow(dead_code)]
pub const DOMAIN: &str = "http://repository.cloudifysource.org";

/// Storage folder the test configuration uses
#[allow(dead_code)]
pub const FOLDER: &str = "cloudify/wagons";

/// Configuration pointing storage at `./bucket` and retrying without delay
const CONFIG: &str = r#"storage:
  backend:
    type: fs
    root: bucket
retry:
  max_attempts: 2
  initial_backoff_ms: 0
  max_backoff_ms: 0
"#;

/// Variables the CLI falls back to; cleared so the host environment cannot leak in
const CLEARED_ENV: &[&str] = &[
    "ECOPACK_CONFIG",
    "RUST_LOG",
    "RELEASE_BUILD_TOKEN",
    "CIRCLE_PROJECT_USERNAME",
    "CIRCLE_PROJECT_REPONAME",
    "CIRCLE_SHA1",
    "CIRCLE_USERNAME",
    "ECOSYSTEM_SESSION_MANAGER_IP",
    "ECOSYSTEM_SESSION_MANAGER_USER",
    "ECOSYSTEM_SESSION_PASSWORD",
    "ECOSYSTEM_SESSION_MANAGER_TENANT",
];

/// A working directory with an `ecopack.yaml` using the filesystem backend
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let workspace = Self { temp, path };
        workspace.write_file("ecopack.yaml", CONFIG);
        workspace
    }

    /// Write a file relative to the workspace root
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Store an object in the test bucket
    pub fn put_object(&self, key: &str, content: &str) {
        self.write_file(&format!("bucket/{key}"), content);
    }

    pub fn object(&self, key: &str) -> String {
        self.read_file(&format!("bucket/{key}"))
    }

    pub fn object_exists(&self, key: &str) -> bool {
        self.file_exists(&format!("bucket/{key}"))
    }

    /// Store the registry document at its default key
    pub fn seed_registry(&self, content: &str) {
        self.put_object(&format!("{FOLDER}/plugins.json"), content);
    }

    pub fn registry(&self) -> serde_json::Value {
        serde_json::from_str(&self.object(&format!("{FOLDER}/plugins.json")))
            .expect("Registry is not valid JSON")
    }

    /// The ecopack binary running inside this workspace
    pub fn cmd(&self) -> Command {
        let mut cmd = ecopack_cmd();
        cmd.current_dir(&self.path);
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// The ecopack binary with CI variables cleared
// Temporary fix for deprecated cargo_bin - will be updated when build-dir issues are resolved
#[allow(deprecated)]
pub fn ecopack_cmd() -> Command {
    let mut cmd = Command::cargo_bin("ecopack").unwrap();
    for var in CLEARED_ENV {
        cmd.env_remove(var);
    }
    cmd
}

/// A registry with one AWS plugin record built for two distributions
#[allow(dead_code)]
pub fn aws_registry() -> String {
    format!(
        r#"[
    {{
        "name": "cloudify-aws-plugin",
        "title": "AWS",
        "description": "AWS plugin",
        "version": "2.5.0",
        "link": "{DOMAIN}/{FOLDER}/cloudify-aws-plugin/2.5.0/plugin.yaml",
        "wagons": [
            {{
                "name": "Centos Core",
                "url": "{DOMAIN}/{FOLDER}/cloudify-aws-plugin/2.5.0/aws-centos-Core.wgn",
                "md5url": "{DOMAIN}/{FOLDER}/cloudify-aws-plugin/2.5.0/aws-centos-Core.wgn.md5"
            }},
            {{
                "name": "Redhat Maipo",
                "url": null,
                "md5url": null
            }}
        ]
    }},
    {{
        "name": "cloudify-utilities-plugin",
        "title": "Not bundled",
        "version": "1.0.0",
        "wagons": []
    }}
]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_has_config() {
        let workspace = TestWorkspace::new();
        assert!(workspace.file_exists("ecopack.yaml"));
    }

    #[test]
    fn test_workspace_objects() {
        let workspace = TestWorkspace::new();
        workspace.put_object("a/b.txt", "hello");
        assert!(workspace.object_exists("a/b.txt"));
        assert_eq!(workspace.object("a/b.txt"), "hello");
    }
}
