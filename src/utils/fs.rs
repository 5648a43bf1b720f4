//! File system helpers used by both pipelines.
//!
//! Generated outputs are written with [`atomic_write`] (temp file plus rename)
//! so a crash never leaves a half-written bundle or version constant behind.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Create a directory and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        bail!("Path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }
    Ok(())
}

/// Write `content` to `path` through a sibling temp file and a rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for {}", path.display()))?;
    temp.as_file().sync_all().context("Failed to sync file to disk")?;

    temp.persist(path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

pub fn safe_write(path: &Path, content: &str) -> Result<()> {
    atomic_write(path, content.as_bytes())
}

/// Recursively copy a directory. Symlinks are recreated, not followed;
/// special files are skipped.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in
        fs::read_dir(src).with_context(|| format!("Failed to read directory: {}", src.display()))?
    {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_symlink() {
            copy_symlink(&src_path, &dst_path)?;
        } else if file_type.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else if file_type.is_file() {
            fs::copy(&src_path, &dst_path).with_context(|| {
                format!("Failed to copy file from {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }

    Ok(())
}

/// Copy a file, directory or symlink to `dst`.
pub fn copy_entry(src: &Path, dst: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(src)
        .with_context(|| format!("Failed to read metadata: {}", src.display()))?;
    if metadata.file_type().is_symlink() {
        ensure_parent_dir(dst)?;
        copy_symlink(src, dst)
    } else if metadata.is_dir() {
        copy_dir(src, dst)
    } else {
        ensure_parent_dir(dst)?;
        fs::copy(src, dst).with_context(|| {
            format!("Failed to copy file from {} to {}", src.display(), dst.display())
        })?;
        Ok(())
    }
}

/// Create `dst` as a symlink with the same target as `src`.
fn copy_symlink(src: &Path, dst: &Path) -> Result<()> {
    let target =
        fs::read_link(src).with_context(|| format!("Failed to read symlink: {}", src.display()))?;

    #[cfg(unix)]
    let created = std::os::unix::fs::symlink(&target, dst);

    #[cfg(windows)]
    let created = if fs::metadata(src).is_ok_and(|m| m.is_dir()) {
        std::os::windows::fs::symlink_dir(&target, dst)
    } else {
        std::os::windows::fs::symlink_file(&target, dst)
    };

    #[cfg(not(any(unix, windows)))]
    let created: std::io::Result<()> =
        Err(std::io::Error::new(std::io::ErrorKind::Unsupported, "symlinks are not supported"));

    created.with_context(|| {
        format!("Failed to create symlink {} -> {}", dst.display(), target.display())
    })
}

/// Remove a file or directory tree. Missing paths are not an error.
pub fn remove_entry(path: &Path) -> Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read metadata: {}", path.display()));
        }
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("Failed to remove file: {}", path.display()))
    }
}
