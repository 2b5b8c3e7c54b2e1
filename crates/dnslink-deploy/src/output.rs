//! Step outputs for CI runners

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append `key=value` to a GitHub Actions output file
pub fn append_github_output(path: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}={}", key, value)
}
