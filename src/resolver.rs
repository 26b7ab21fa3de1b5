//! Walks the two-hop link chain from the launcher's own path to the real
//! target executable.
//!
//! ```text
//! C:\shims\tool.exe   (link)  ->  D:\pkg\current\shim.exe
//! D:\pkg\current\tool.exe (link)  ->  D:\pkg\1.2.0\tool.exe (regular file)
//! ```
//!
//! The first hop's file name is replaced by the launcher's own name before
//! the second hop is read, so one backing binary can serve many names.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::LaunchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkChain {
    /// Path the launcher was started from (hop 0).
    pub launcher: PathBuf,
    /// Intermediate link, already renamed to the launcher's file name.
    pub hop1: PathBuf,
    /// The real executable.
    pub target: PathBuf,
}

/// Path of the running image. Symbolic links in it are kept as is.
pub fn launcher_path() -> Result<PathBuf, LaunchError> {
    std::env::current_exe().map_err(LaunchError::OwnPath)
}

pub fn resolve_chain(launcher: &Path) -> Result<LinkChain, LaunchError> {
    let first = read_link(launcher)?;
    let hop1 = match launcher.file_name() {
        Some(name) => first.with_file_name(name),
        None => first,
    };
    tracing::debug!(hop1 = %hop1.display(), "first hop resolved");

    let target = read_link(&hop1)?;
    match fs::metadata(&target) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(LaunchError::NotRegularFile {
                path: target,
                source: None,
            })
        }
        Err(e) => {
            return Err(LaunchError::NotRegularFile {
                path: target,
                source: Some(e),
            })
        }
    }
    tracing::debug!(exe = %target.display(), "link chain resolved");

    Ok(LinkChain {
        launcher: launcher.to_path_buf(),
        hop1,
        target,
    })
}

/// Reads one hop. `link` must exist and be a symbolic link; a relative
/// target is taken relative to the directory holding the link.
fn read_link(link: &Path) -> Result<PathBuf, LaunchError> {
    let meta = fs::symlink_metadata(link).map_err(|e| LaunchError::link(link, e))?;
    if !meta.file_type().is_symlink() {
        return Err(LaunchError::link(link, not_a_link()));
    }
    let target = fs::read_link(link).map_err(|e| LaunchError::link(link, e))?;
    if target.is_absolute() {
        return Ok(target);
    }
    Ok(link
        .parent()
        .map(|dir| dir.join(&target))
        .unwrap_or(target))
}

fn not_a_link() -> io::Error {
    #[cfg(windows)]
    {
        // ERROR_NOT_A_REPARSE_POINT
        io::Error::from_raw_os_error(4390)
    }
    #[cfg(not(windows))]
    {
        // EINVAL, what readlink(2) reports for a non-link
        io::Error::from_raw_os_error(22)
    }
}
