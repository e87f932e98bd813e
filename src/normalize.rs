use std::path::{Component, Path, PathBuf};

/// Lexically resolves `.` and `..` components and collapses empty segments
/// without touching the filesystem. `..` at the root stays at the root.
///
/// `Url::parse` already resolves dot segments in chain urls, so there the visible
/// effect is collapsing `//`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::Prefix(prefix) => normalized.push(prefix.as_os_str()),
            Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(segment) => normalized.push(segment),
        }
    }

    normalized
}
