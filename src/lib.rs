//! Transparent launcher reached through a two-hop symbolic link chain.
//!
//! The pipeline is strictly linear: take the raw argument tail, resolve the
//! real target, classify it, arm the lifecycle guard, launch, and exit with
//! the child's status.

pub mod cmdline;
pub mod error;
pub mod launch;
pub mod logging;
pub mod resolver;
pub mod settings;
pub mod subsystem;

#[cfg(windows)]
pub mod handle;
#[cfg(windows)]
pub mod job;
#[cfg(windows)]
pub mod session;

use std::io::Write;
use std::path::Path;

use crate::error::LaunchError;
use crate::settings::Settings;

/// Runs the launcher for the current process and returns its exit code.
/// Every OS handle acquired on the way has been released when this returns.
pub fn run() -> u32 {
    let tail = cmdline::current_tail();

    let launcher = match resolver::launcher_path() {
        Ok(path) => path,
        Err(e) => return fail(&e),
    };

    let settings_path = Settings::path_for(&launcher);
    let active = Settings::load_or_default(&settings_path, &mut std::io::stderr());
    logging::init(active.debug_logging, active.log_path());
    tracing::info!(launcher = %launcher.display(), "launcher started");

    match pipeline(&launcher, &tail, &active) {
        Ok(code) => {
            tracing::info!(code, "launcher finished");
            code
        }
        Err(e) => fail(&e),
    }
}

/// Resolves, classifies and launches the target behind `launcher`.
pub fn pipeline(launcher: &Path, tail: &[u16], settings: &Settings) -> Result<u32, LaunchError> {
    let chain = resolver::resolve_chain(launcher)?;
    let subsystem = subsystem::classify(&chain.target, settings.classify_failure)?;
    tracing::info!(exe = %chain.target.display(), %subsystem, "launching");

    #[cfg(windows)]
    {
        let mut session = session::Session::arm();
        launch::launch(
            &mut session,
            subsystem,
            &chain.target,
            tail,
            settings.launch_options(),
        )
    }
    #[cfg(not(windows))]
    {
        launch::launch(subsystem, &chain.target, tail, settings.launch_options())
    }
}

/// Writes the diagnostic for `err`. Resolution failures print the offending
/// path on its own line followed by the OS message.
pub fn report(err: &LaunchError, out: &mut impl Write) {
    let _ = writeln!(out, "{err}");
    let _ = out.flush();
}

fn fail(err: &LaunchError) -> u32 {
    tracing::error!(resolution = err.is_resolution(), "{err}");
    report(err, &mut std::io::stderr());
    err.exit_code()
}
