use std::io;
use std::path::{Path, PathBuf};

/// Exit code used when a failure carries no OS error code.
pub const EXIT_FAILURE: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("unable to query own module path\n{0}")]
    OwnPath(#[source] io::Error),
    /// A hop of the link chain is missing or is not a symbolic link.
    #[error("{}\n{source}", .path.display())]
    Link {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The last hop does not point at a regular file.
    #[error("{}\nnot a regular file", .path.display())]
    NotRegularFile {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },
    #[error("{}\nunable to read executable type", .path.display())]
    Unclassifiable { path: PathBuf },
    #[cfg(windows)]
    #[error("failed to set up job object: {0}")]
    JobObject(#[source] windows::core::Error),
    #[cfg(windows)]
    #[error("failed to start {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: windows::core::Error,
    },
    #[error("launching is only supported on Windows")]
    Unsupported,
}

impl LaunchError {
    pub fn link(path: &Path, source: io::Error) -> Self {
        LaunchError::Link {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the error came from walking the link chain.
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            LaunchError::OwnPath(_) | LaunchError::Link { .. } | LaunchError::NotRegularFile { .. }
        )
    }

    /// Process exit code reported for this failure. Never zero.
    pub fn exit_code(&self) -> u32 {
        let os_code = match self {
            LaunchError::OwnPath(source) | LaunchError::Link { source, .. } => {
                source.raw_os_error()
            }
            LaunchError::NotRegularFile { source, .. } => {
                source.as_ref().and_then(io::Error::raw_os_error)
            }
            _ => None,
        };
        match os_code {
            Some(code) if code != 0 => code as u32,
            _ => EXIT_FAILURE,
        }
    }
}
