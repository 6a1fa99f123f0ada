//! Corpus directory builder for CLI and loading tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use jsfinger::Signature;

use super::signature_of;

/// Temporary directory holding `<name>@<version>.json` signatures and sources
pub struct CorpusDir {
    dir: TempDir,
}

impl CorpusDir {
    /// Create a new empty directory
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(dir.path().join("corpus")).expect("Failed to create corpus dir");
        Self { dir }
    }

    /// Root of the temporary directory
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Directory holding the library signatures
    pub fn corpus_path(&self) -> PathBuf {
        self.dir.path().join("corpus")
    }

    /// Add a library signature extracted from JavaScript source
    pub fn add_library(&self, id: &str, source: &str) -> &Self {
        self.add_signature(id, &signature_of(source))
    }

    /// Add a precomputed library signature
    pub fn add_signature(&self, id: &str, signature: &Signature) -> &Self {
        let json = serde_json::to_string(signature).expect("Failed to serialize signature");
        self.add_raw(&format!("{}.json", id), &json)
    }

    /// Add an arbitrary file to the corpus directory
    pub fn add_raw(&self, file_name: &str, content: &str) -> &Self {
        fs::write(self.corpus_path().join(file_name), content).expect("Failed to write file");
        self
    }

    /// Write a source file outside the corpus and return its path
    pub fn add_source(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(file_name);
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Run the jsfinger binary inside this directory
    pub fn run_cli(&self, args: &[&str]) -> std::io::Result<Output> {
        Command::new(env!("CARGO_BIN_EXE_jsfinger"))
            .current_dir(self.path())
            .args(args)
            .output()
    }

    /// Run CLI and expect success, return stdout
    pub fn run_cli_success(&self, args: &[&str]) -> String {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            output.status.success(),
            "CLI command {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Run CLI and expect failure, return (exit code, stderr)
    pub fn run_cli_failure(&self, args: &[&str]) -> (Option<i32>, String) {
        let output = self.run_cli(args).expect("Failed to run CLI");
        assert!(
            !output.status.success(),
            "CLI command {:?} should have failed",
            args
        );
        (
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).to_string(),
        )
    }
}

impl Default for CorpusDir {
    fn default() -> Self {
        Self::new()
    }
}
