//! Writes Markdown files under the mirror root

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// File writing errors
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Path escapes the output directory: {0}")]
    PathEscape(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes files at relative paths inside one output root
#[derive(Debug, Clone)]
pub struct FileWriter {
    root: PathBuf,
}

impl FileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes `content` to `relative_path` under the root and returns the full path
    ///
    /// Intermediate directories are created. Absolute paths, `..` components, and paths
    /// whose directory resolves outside the root through a symlink are rejected.
    /// An existing file is overwritten.
    pub async fn save(&self, relative_path: &Path, content: &str) -> Result<PathBuf, WriteError> {
        check_relative(relative_path)?;

        let target = self.root.join(relative_path);
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());

        tokio::fs::create_dir_all(&parent).await?;

        let root = tokio::fs::canonicalize(&self.root).await?;
        let resolved_parent = tokio::fs::canonicalize(&parent).await?;
        if !resolved_parent.starts_with(&root) {
            return Err(WriteError::PathEscape(relative_path.display().to_string()));
        }

        if let Ok(meta) = tokio::fs::symlink_metadata(&target).await {
            if meta.file_type().is_symlink() {
                return Err(WriteError::PathEscape(relative_path.display().to_string()));
            }
        }

        tokio::fs::write(&target, content).await?;
        tracing::debug!("Wrote {}", target.display());
        Ok(target)
    }
}

fn check_relative(path: &Path) -> Result<(), WriteError> {
    if path.as_os_str().is_empty() || path.is_absolute() {
        return Err(WriteError::PathEscape(path.display().to_string()));
    }

    let escapes = path.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    });
    if escapes {
        return Err(WriteError::PathEscape(path.display().to_string()));
    }

    Ok(())
}
