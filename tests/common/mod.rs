//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use elide_lockfile::core::fingerprint::Fingerprint;
use elide_lockfile::core::lockfile::{Lockfile, Version};
use elide_lockfile::core::material::{Ecosystem, InputMaterial};
use elide_lockfile::core::stanza::{
    DependencyScope, MavenArtifact, MavenLockfileState, NpmLockfileState, NpmPackage, Stanza,
};

/// Test project context
///
/// Creates a temporary directory for test projects and provides
/// utilities for setting up test scenarios.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Absolute path of a project-relative file
    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.join(name)).expect("Failed to read file")
    }

    /// Run `elide-lock` against this project
    pub fn run(&self, args: &[&str]) -> Output {
        run_in(self.dir.path(), args)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `elide-lock` with `--root` pointing at `root`
pub fn run_in(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elide-lock"))
        .arg("--root")
        .arg(root)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute elide-lock")
}

/// Sample package.json for testing
pub const SAMPLE_PACKAGE_JSON: &str = r#"{
  "name": "sample",
  "dependencies": { "react": "18.2.0" }
}
"#;

/// Sample pom.xml for testing
pub const SAMPLE_POM: &str = r#"<project>
  <groupId>dev.elide</groupId>
  <artifactId>sample</artifactId>
</project>
"#;

/// A lockfile with a Maven and an NPM stanza
pub fn sample_lockfile(version: Version) -> Lockfile {
    let maven = Stanza::new("maven", Fingerprint::of_number(42))
        .contributed_by("maven-resolver")
        .with_input(InputMaterial::dependency_manifest(
            Ecosystem::Maven,
            "pom.xml",
            Fingerprint::FileDigest {
                size_bytes: 120,
                content_hash_code: 77,
            },
        ))
        .with_state(MavenLockfileState {
            classpath: vec![MavenArtifact {
                coordinate: "com.google.guava:guava:33.0.0-jre".to_string(),
                scope: Some(DependencyScope::Compile),
                path: None,
            }],
        });

    let npm = Stanza::new("npm", Fingerprint::of_str("react@18.2.0"))
        .contributed_by("npm-resolver")
        .with_input(InputMaterial::dependency_manifest(
            Ecosystem::Npm,
            "package.json",
            Fingerprint::of_bytes(SAMPLE_PACKAGE_JSON.as_bytes()),
        ))
        .with_input(
            InputMaterial::peer_lockfile("npm", "package-lock.json", Fingerprint::NoContent)
                .with_remarks("generated by npm"),
        )
        .with_remarks("frontend")
        .with_state(NpmLockfileState {
            packages: vec![NpmPackage {
                name: "react".to_string(),
                version: "18.2.0".to_string(),
                integrity: None,
            }],
        });

    Lockfile::new(version, [npm, maven])
}
