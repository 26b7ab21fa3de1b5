#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use link_shim::error::LaunchError;
use link_shim::resolver::resolve_chain;
use link_shim::settings::Settings;
use tempfile::{tempdir, TempDir};

struct Layout {
    _dir: TempDir,
    launcher: PathBuf,
    hop1: PathBuf,
    real: PathBuf,
}

/// shims/tool -> pkg/shim, pkg/tool -> store/tool-1.0
fn layout() -> Layout {
    let dir = tempdir().unwrap();
    let shims = dir.path().join("shims");
    let pkg = dir.path().join("pkg");
    let store = dir.path().join("store");
    for d in [&shims, &pkg, &store] {
        fs::create_dir(d).unwrap();
    }
    let real = store.join("tool-1.0");
    fs::write(&real, b"MZ").unwrap();
    symlink(&real, pkg.join("tool")).unwrap();
    let launcher = shims.join("tool");
    symlink(pkg.join("shim"), &launcher).unwrap();
    Layout {
        hop1: pkg.join("tool"),
        launcher,
        real,
        _dir: dir,
    }
}

fn wide(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

#[test]
fn resolves_to_real_file_at_second_hop() {
    let l = layout();
    let chain = resolve_chain(&l.launcher).expect("resolve");
    assert_eq!(chain.launcher, l.launcher);
    assert_eq!(chain.hop1, l.hop1);
    assert_eq!(chain.target, l.real);
}

#[test]
fn resolution_ignores_arguments() {
    let l = layout();
    for tail in ["", "a", "a b c", "\"x  y\" z"] {
        // Resolution succeeds; launching is what fails off Windows.
        let err = link_shim::pipeline(&l.launcher, &wide(tail), &Settings::default()).unwrap_err();
        assert!(matches!(err, LaunchError::Unsupported), "{err:?}");
    }
}

#[test]
fn missing_first_hop_reports_its_path() {
    let l = layout();
    fs::remove_file(&l.hop1).unwrap();

    let err = link_shim::pipeline(&l.launcher, &[], &Settings::default()).unwrap_err();
    match &err {
        LaunchError::Link { path, .. } => assert_eq!(path, &l.hop1),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_ne!(err.exit_code(), 0);

    let mut out = Vec::new();
    link_shim::report(&err, &mut out);
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().next(), Some(l.hop1.display().to_string().as_str()));
    assert!(text.lines().count() >= 2);
}

#[test]
fn intermediate_hop_must_be_a_link() {
    let l = layout();
    fs::remove_file(&l.hop1).unwrap();
    fs::write(&l.hop1, b"plain").unwrap();

    let err = resolve_chain(&l.launcher).unwrap_err();
    assert!(matches!(&err, LaunchError::Link { path, .. } if path == &l.hop1));
}

#[test]
fn target_must_be_a_regular_file() {
    let l = layout();
    fs::remove_file(&l.real).unwrap();
    fs::create_dir(&l.real).unwrap();

    let err = resolve_chain(&l.launcher).unwrap_err();
    assert!(matches!(&err, LaunchError::NotRegularFile { path, source: None } if path == &l.real));
    assert_eq!(err.exit_code(), link_shim::error::EXIT_FAILURE);
}

#[test]
fn dangling_target_uses_os_error_code() {
    let l = layout();
    fs::remove_file(&l.real).unwrap();

    let err = resolve_chain(&l.launcher).unwrap_err();
    assert!(matches!(&err, LaunchError::NotRegularFile { source: Some(_), .. }));
    // ENOENT
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn launcher_must_be_a_link() {
    let dir = tempdir().unwrap();
    let launcher = dir.path().join("tool");
    fs::write(&launcher, b"MZ").unwrap();

    let err = resolve_chain(Path::new(&launcher)).unwrap_err();
    assert!(err.is_resolution());
}
