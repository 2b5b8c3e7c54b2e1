//! Artifact tree walking for multipart uploads
//!
//! Pinata wraps a multi-file upload in one directory when every part name
//! shares the same first path segment. Parts are therefore named
//! `<root dir name>/<relative path>` with `/` separators on every platform.

use dnslink_core::Result;
use std::path::{Path, PathBuf};

/// Prefix used when the root resolves to a path with no final component (`/`)
const FALLBACK_ROOT_NAME: &str = "build";

/// One file to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Location on disk
    pub path: PathBuf,
    /// Multipart file name
    pub part_name: String,
}

/// Collect every regular file under `root`, sorted by part name
///
/// A `root` that is itself a file yields a single part named after it.
/// Relative roots such as `.` or `..` are named after the directory they
/// resolve to. Symlinks are followed; unreadable entries fail the whole scan.
pub fn collect_artifact_files(root: &Path) -> Result<Vec<ArtifactFile>> {
    let metadata = std::fs::metadata(root)?;
    let root_name = root_name(root)?;

    if metadata.is_file() {
        return Ok(vec![ArtifactFile {
            path: root.to_path_buf(),
            part_name: root_name,
        }]);
    }

    let mut files = Vec::new();
    walk(root, &root_name, &mut files)?;
    files.sort_by(|a, b| a.part_name.cmp(&b.part_name));
    Ok(files)
}

fn root_name(root: &Path) -> Result<String> {
    let resolved = std::fs::canonicalize(root)?;
    Ok(resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_ROOT_NAME.to_string()))
}

fn walk(dir: &Path, prefix: &str, files: &mut Vec<ArtifactFile>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = format!("{}/{}", prefix, entry.file_name().to_string_lossy());

        let metadata = std::fs::metadata(&path)?;
        if metadata.is_dir() {
            walk(&path, &name, files)?;
        } else if metadata.is_file() {
            files.push(ArtifactFile {
                path,
                part_name: name,
            });
        }
    }
    Ok(())
}
