//! Pure path arithmetic for staging imports and public references.
//!
//! Everything here is lexical: no filesystem access, no symlink resolution,
//! and the rendered output never contains backslashes regardless of the host
//! separator convention.

use std::path::{Component, Path, PathBuf};

/// Render a path with forward-slash separators.
pub fn to_web_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Lexical relative path from `from` to `to`.
///
/// Both paths must be rooted the same way (both relative to the process
/// working directory, or both absolute); the result walks up out of `from`
/// and back down into `to`.
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from = normalize(from);
    let to = normalize(to);
    let from: Vec<Component<'_>> = from.components().collect();
    let to: Vec<Component<'_>> = to.components().collect();

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component.as_os_str());
    }
    relative
}

/// Forward-slash import path from a staging module's directory to the
/// original asset, suitable as a module import specifier.
pub fn relative_import_path(staging_dir: &Path, asset_path: &Path) -> String {
    to_web_path(&relative_path(staging_dir, asset_path))
}

/// Absolute, leading-slash web path for a bundle file within a document's
/// web-relative directory. This is what gets written into output HTML.
pub fn public_path(web_dir: &str, file_name: &str) -> String {
    let web_dir = web_dir.trim_matches('/');
    if web_dir.is_empty() {
        format!("/{file_name}")
    } else {
        format!("/{web_dir}/{file_name}")
    }
}

/// Fold `.` and `..` segments out of a path without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                _ => components.push(component),
            },
            other => components.push(other),
        }
    }
    components.iter().collect()
}
