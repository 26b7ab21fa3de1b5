//! Recovers the argument tail of the launcher's own command line and builds
//! the command line handed to the target.
//!
//! Everything here works on UTF-16 code units so the text reaching the child
//! is exactly what the caller typed, unpaired surrogates included.

use std::ffi::OsStr;

const SPACE: u16 = b' ' as u16;
const QUOTE: u16 = b'"' as u16;

/// Returns everything after the program token of `raw`.
///
/// `program` is the first argument as the runtime tokenized it. Quoting can
/// make it contain spaces, so that many spaces of `raw` are skipped before
/// the next one is taken as the end of the program token. Original spacing
/// and quoting of the tail are left untouched. Without a boundary space the
/// tail is empty.
pub fn argument_tail<'a>(raw: &'a [u16], program: &[u16]) -> &'a [u16] {
    let mut to_skip = program.iter().filter(|&&unit| unit == SPACE).count();
    for (idx, &unit) in raw.iter().enumerate() {
        if unit != SPACE {
            continue;
        }
        if to_skip == 0 {
            return &raw[idx + 1..];
        }
        to_skip -= 1;
    }
    &[]
}

/// `"target"` followed by one space and the untouched argument tail.
pub fn build_command_line(target: &[u16], tail: &[u16]) -> Vec<u16> {
    let mut line = Vec::with_capacity(target.len() + tail.len() + 3);
    line.push(QUOTE);
    line.extend_from_slice(target);
    line.push(QUOTE);
    line.push(SPACE);
    line.extend_from_slice(tail);
    line
}

pub fn to_wide(text: &OsStr) -> Vec<u16> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        text.encode_wide().collect()
    }
    #[cfg(not(windows))]
    {
        text.to_string_lossy().encode_utf16().collect()
    }
}

/// Nul-terminated copy of `units` for passing to Win32.
pub fn nul_terminated(units: &[u16]) -> Vec<u16> {
    units.iter().copied().chain(std::iter::once(0)).collect()
}

/// The process command line exactly as the caller passed it.
#[cfg(windows)]
pub fn raw_command_line() -> Vec<u16> {
    use windows::Win32::System::Environment::GetCommandLineW;

    unsafe {
        let line = GetCommandLineW();
        if line.is_null() {
            return Vec::new();
        }
        line.as_wide().to_vec()
    }
}

/// Best effort outside Windows, where no raw command line exists.
#[cfg(not(windows))]
pub fn raw_command_line() -> Vec<u16> {
    let args: Vec<_> = std::env::args_os()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();
    args.join(" ").encode_utf16().collect()
}

/// Argument tail of the current process.
pub fn current_tail() -> Vec<u16> {
    let raw = raw_command_line();
    let program = std::env::args_os()
        .next()
        .map(|arg| to_wide(&arg))
        .unwrap_or_default();
    argument_tail(&raw, &program).to_vec()
}
