//! Locating the mock tracer built as a shared library.

use std::env::consts::{DLL_PREFIX, DLL_SUFFIX};
use std::path::PathBuf;

/// File name of the mock tracer `cdylib` on this platform
pub fn mocktracer_file_name() -> String {
    format!("{}dynot_mocktracer{}", DLL_PREFIX, DLL_SUFFIX)
}

/// Path of the built mock tracer library, if cargo has produced one
///
/// Looks under `CARGO_TARGET_DIR` (or the workspace `target/`) in the
/// debug and release profiles.
pub fn mocktracer_library_path() -> Option<PathBuf> {
    let file_name = mocktracer_file_name();

    target_dirs()
        .into_iter()
        .flat_map(|target| {
            ["debug", "release"].into_iter().flat_map(move |profile| {
                let dir = target.join(profile);
                [dir.clone(), dir.join("deps")]
            })
        })
        .map(|dir| dir.join(&file_name))
        .find(|path| path.is_file())
}

fn target_dirs() -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    if let Some(dir) = std::env::var_os("CARGO_TARGET_DIR") {
        dirs.push(PathBuf::from(dir));
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if let Some(workspace) = manifest_dir.parent().and_then(|crates| crates.parent()) {
        dirs.push(workspace.join("target"));
    }
    dirs
}
