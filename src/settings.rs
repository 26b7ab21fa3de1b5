use crate::launch::LaunchOptions;
use crate::subsystem::ClassifyFailure;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Optional settings file looked up next to the launcher.
pub const SETTINGS_FILE: &str = "link_shim.json";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Settings {
    /// Log at debug level. Without `log_file`, output goes to stderr.
    #[serde(default)]
    pub debug_logging: bool,
    /// Append launcher logs to this file. Logging is off when unset and
    /// `debug_logging` is false.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default)]
    pub classify_failure: ClassifyFailure,
    /// Block on windowed targets and report their exit code.
    #[serde(default)]
    pub wait_for_windowed: bool,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    /// Loads `path`, falling back to defaults when it cannot be used. The
    /// reason is written to `out` as one line, since logging may not be set
    /// up yet and the defaults keep it off.
    pub fn load_or_default(path: &Path, out: &mut impl Write) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                let _ = writeln!(out, "{}: ignoring unreadable settings: {e}", path.display());
                let _ = out.flush();
                Self::default()
            }
        }
    }

    /// Settings path for a launcher installed at `launcher`.
    pub fn path_for(launcher: &Path) -> PathBuf {
        launcher
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(SETTINGS_FILE)
    }

    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            wait_for_windowed: self.wait_for_windowed,
        }
    }
}
