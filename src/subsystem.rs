use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LaunchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsystem {
    Console,
    Windowed,
}

impl std::fmt::Display for Subsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subsystem::Console => write!(f, "console"),
            Subsystem::Windowed => write!(f, "windowed"),
        }
    }
}

/// What to do when the executable type of the target cannot be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifyFailure {
    /// Give up before launching anything.
    #[default]
    Fatal,
    /// Launch through the shell as a windowed application.
    Windowed,
}

impl Subsystem {
    /// Interprets the value returned by `SHGetFileInfoW(.., SHGFI_EXETYPE)`.
    ///
    /// The low word carries the image signature (`PE`, `NE`, `MZ`) and the
    /// high word the expected Windows version, which is only set for
    /// windowed images. `None` when nothing could be read.
    pub fn from_exe_type(raw: usize) -> Option<Self> {
        let low = raw & 0xFFFF;
        let high = (raw >> 16) & 0xFFFF;
        if low == 0 {
            return None;
        }
        if high != 0 {
            Some(Subsystem::Windowed)
        } else {
            Some(Subsystem::Console)
        }
    }
}

pub fn classify(path: &Path, on_failure: ClassifyFailure) -> Result<Subsystem, LaunchError> {
    let raw = exe_type(path)?;
    match Subsystem::from_exe_type(raw) {
        Some(subsystem) => {
            tracing::debug!(path = %path.display(), %subsystem, "classified target");
            Ok(subsystem)
        }
        None => match on_failure {
            ClassifyFailure::Fatal => Err(LaunchError::Unclassifiable {
                path: path.to_path_buf(),
            }),
            ClassifyFailure::Windowed => {
                tracing::warn!(
                    path = %path.display(),
                    "executable type unknown, treating target as windowed"
                );
                Ok(Subsystem::Windowed)
            }
        },
    }
}

#[cfg(windows)]
fn exe_type(path: &Path) -> Result<usize, LaunchError> {
    use windows::core::PCWSTR;
    use windows::Win32::Storage::FileSystem::FILE_FLAGS_AND_ATTRIBUTES;
    use windows::Win32::UI::Shell::{SHGetFileInfoW, SHFILEINFOW, SHGFI_EXETYPE};

    let wide = crate::cmdline::nul_terminated(&crate::cmdline::to_wide(path.as_os_str()));
    let mut info = SHFILEINFOW::default();
    let raw = unsafe {
        SHGetFileInfoW(
            PCWSTR(wide.as_ptr()),
            FILE_FLAGS_AND_ATTRIBUTES(0),
            Some(&mut info as *mut _),
            std::mem::size_of::<SHFILEINFOW>() as u32,
            SHGFI_EXETYPE,
        )
    };
    Ok(raw)
}

#[cfg(not(windows))]
fn exe_type(_path: &Path) -> Result<usize, LaunchError> {
    Err(LaunchError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PE: usize = 0x4550;
    const MZ: usize = 0x5A4D;

    #[test]
    fn console_images_have_no_version() {
        assert_eq!(Subsystem::from_exe_type(PE), Some(Subsystem::Console));
        assert_eq!(Subsystem::from_exe_type(MZ), Some(Subsystem::Console));
    }

    #[test]
    fn windowed_images_carry_a_version() {
        assert_eq!(
            Subsystem::from_exe_type(0x0600_0000 | PE),
            Some(Subsystem::Windowed)
        );
    }

    #[test]
    fn zero_means_unknown() {
        assert_eq!(Subsystem::from_exe_type(0), None);
        assert_eq!(Subsystem::from_exe_type(0x0600_0000), None);
    }

    #[test]
    fn classification_is_idempotent() {
        for raw in [0, PE, MZ, 0x0400_0000 | PE] {
            assert_eq!(Subsystem::from_exe_type(raw), Subsystem::from_exe_type(raw));
        }
    }

    #[test]
    fn default_policy_is_fatal() {
        assert_eq!(ClassifyFailure::default(), ClassifyFailure::Fatal);
    }
}
