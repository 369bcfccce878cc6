//! Path utility functions for normalization.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last = result.components().next_back();
                match last {
                    // `..` above the root is the root
                    Some(Component::RootDir | Component::Prefix(_)) => {}
                    Some(Component::Normal(_)) => {
                        result.pop();
                    }
                    _ => result.push(component),
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Resolve a relative path against a base directory to get an absolute path.
/// This is used to locate custom-action executables next to the
/// configuration file that names them.
///
/// For example, if base_dir is `/etc/pkghelper` and relative_path is
/// `../scripts/install-cuda.sh`, this returns `/etc/scripts/install-cuda.sh`.
pub fn resolve_relative_path(base_dir: &Path, relative_path: &Path) -> PathBuf {
    if relative_path.is_absolute() {
        relative_path.to_path_buf()
    } else {
        normalize_path(&base_dir.join(relative_path))
    }
}
