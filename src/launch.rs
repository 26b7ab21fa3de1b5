//! Starts the resolved target.
//!
//! Console targets share the launcher's console: they are created suspended,
//! put into the job, resumed and waited on, and their exit code becomes the
//! launcher's. Windowed targets are handed to the shell with the `open` verb
//! after the launcher drops its console, and are not waited on.

use std::path::Path;

use crate::error::LaunchError;
use crate::subsystem::Subsystem;

#[cfg(windows)]
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    Idle,
    Spawning,
    Running,
    Exited(u32),
    /// Windowed child left running on its own.
    Detached,
}

impl LaunchState {
    pub fn can_advance_to(self, next: LaunchState) -> bool {
        use LaunchState::*;
        matches!(
            (self, next),
            (Idle, Spawning) | (Spawning, Running) | (Spawning, Detached) | (Running, Exited(_))
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchOptions {
    /// Wait for windowed targets and report their exit code.
    pub wait_for_windowed: bool,
}

#[cfg(windows)]
pub fn launch(
    session: &mut Session,
    subsystem: Subsystem,
    target: &Path,
    tail: &[u16],
    options: LaunchOptions,
) -> Result<u32, LaunchError> {
    match subsystem {
        Subsystem::Console => run_console(session, target, tail),
        Subsystem::Windowed => run_windowed(session, target, tail, options.wait_for_windowed),
    }
}

#[cfg(not(windows))]
pub fn launch(
    _subsystem: Subsystem,
    _target: &Path,
    _tail: &[u16],
    _options: LaunchOptions,
) -> Result<u32, LaunchError> {
    Err(LaunchError::Unsupported)
}

#[cfg(windows)]
pub fn run_console(session: &mut Session, target: &Path, tail: &[u16]) -> Result<u32, LaunchError> {
    use windows::Win32::System::Console::SetConsoleCtrlHandler;

    start_console(session, target, tail)?;

    // Ctrl+C and friends are the child's business from here on.
    unsafe {
        let _ = SetConsoleCtrlHandler(None, true);
    }

    let code = wait_for_exit(session);
    session.advance(LaunchState::Exited(code));
    Ok(code)
}

/// Creates the console child suspended, puts it in the session's job and
/// lets it run. Returns once the child is running.
#[cfg(windows)]
pub fn start_console(session: &mut Session, target: &Path, tail: &[u16]) -> Result<(), LaunchError> {
    use windows::core::{PCWSTR, PWSTR};
    use windows::Win32::System::Threading::{
        CreateProcessW, GetStartupInfoW, ResumeThread, TerminateProcess, CREATE_SUSPENDED,
        PROCESS_INFORMATION, STARTUPINFOW,
    };

    use crate::cmdline::{build_command_line, nul_terminated, to_wide};
    use crate::handle::OwnedHandle;

    let target_w = to_wide(target.as_os_str());
    let application = nul_terminated(&target_w);
    let mut command_line = nul_terminated(&build_command_line(&target_w, tail));

    session.advance(LaunchState::Spawning);
    let mut startup = STARTUPINFOW::default();
    let mut info = PROCESS_INFORMATION::default();
    unsafe {
        GetStartupInfoW(&mut startup);
        CreateProcessW(
            PCWSTR(application.as_ptr()),
            PWSTR(command_line.as_mut_ptr()),
            None,
            None,
            true,
            CREATE_SUSPENDED,
            None,
            PCWSTR::null(),
            &startup,
            &mut info,
        )
    }
    .map_err(|source| LaunchError::Spawn {
        path: target.to_path_buf(),
        source,
    })?;
    session.process = OwnedHandle::new(info.hProcess);
    session.thread = OwnedHandle::new(info.hThread);
    tracing::debug!(pid = info.dwProcessId, "console child created suspended");

    session.guard_child();

    if unsafe { ResumeThread(info.hThread) } == u32::MAX {
        let source = windows::core::Error::from_win32();
        unsafe {
            let _ = TerminateProcess(info.hProcess, crate::error::EXIT_FAILURE);
        }
        return Err(LaunchError::Spawn {
            path: target.to_path_buf(),
            source,
        });
    }
    session.advance(LaunchState::Running);
    Ok(())
}

#[cfg(windows)]
pub fn run_windowed(
    session: &mut Session,
    target: &Path,
    tail: &[u16],
    wait: bool,
) -> Result<u32, LaunchError> {
    use windows::core::PCWSTR;
    use windows::Win32::System::Console::FreeConsole;
    use windows::Win32::UI::Shell::{
        ShellExecuteExW, SEE_MASK_FLAG_NO_UI, SEE_MASK_NOCLOSEPROCESS, SHELLEXECUTEINFOW,
    };
    use windows::Win32::UI::WindowsAndMessaging::SW_SHOW;

    use crate::cmdline::{nul_terminated, to_wide};
    use crate::handle::OwnedHandle;

    unsafe {
        let _ = FreeConsole();
    }

    let file = nul_terminated(&to_wide(target.as_os_str()));
    let parameters = nul_terminated(tail);
    let verb = nul_terminated(&to_wide(std::ffi::OsStr::new("open")));

    session.advance(LaunchState::Spawning);
    let mut exec = SHELLEXECUTEINFOW::default();
    exec.cbSize = std::mem::size_of::<SHELLEXECUTEINFOW>() as u32;
    // No message box on failure.
    exec.fMask = SEE_MASK_NOCLOSEPROCESS | SEE_MASK_FLAG_NO_UI;
    exec.lpVerb = PCWSTR(verb.as_ptr());
    exec.lpFile = PCWSTR(file.as_ptr());
    exec.lpParameters = PCWSTR(parameters.as_ptr());
    exec.nShow = SW_SHOW.0;

    unsafe { ShellExecuteExW(&mut exec) }.map_err(|source| LaunchError::Spawn {
        path: target.to_path_buf(),
        source,
    })?;
    session.process = OwnedHandle::new(exec.hProcess);

    if !wait || session.process.is_none() {
        session.advance(LaunchState::Detached);
        return Ok(0);
    }

    session.guard_child();
    session.advance(LaunchState::Running);
    let code = wait_for_exit(session);
    session.advance(LaunchState::Exited(code));
    Ok(code)
}

/// Exit status to report once the wait on the child is over. The child's
/// code only counts when the wait really ended with the child exiting;
/// otherwise the process may still be running and its code is `STILL_ACTIVE`.
pub fn settle_exit_code(waited: bool, child_code: Option<u32>) -> u32 {
    match (waited, child_code) {
        (true, Some(code)) => code,
        _ => crate::error::EXIT_FAILURE,
    }
}

/// Blocks until the session's child exits and returns its exit code.
#[cfg(windows)]
fn wait_for_exit(session: &Session) -> u32 {
    use windows::Win32::Foundation::WAIT_OBJECT_0;
    use windows::Win32::System::Threading::{GetExitCodeProcess, WaitForSingleObject, INFINITE};

    let Some(process) = &session.process else {
        return crate::error::EXIT_FAILURE;
    };
    let wait = unsafe { WaitForSingleObject(process.raw(), INFINITE) };
    if wait != WAIT_OBJECT_0 {
        tracing::warn!(result = wait.0, "waiting for child failed");
        return settle_exit_code(false, None);
    }

    let mut code = crate::error::EXIT_FAILURE;
    let child_code = match unsafe { GetExitCodeProcess(process.raw(), &mut code) } {
        Ok(()) => Some(code),
        Err(e) => {
            tracing::warn!("could not read child exit code: {e}");
            None
        }
    };
    let code = settle_exit_code(true, child_code);
    tracing::debug!(code, "child exited");
    code
}
