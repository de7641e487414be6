//! File-system resource helpers.
use std::io;
use std::path::{Component, Path, PathBuf};

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Remove whatever occupies `path`: a file, a symlink (broken or not), or a
/// real directory with all of its contents.
///
/// Symlinks are never followed, so removing a link to a directory leaves the
/// directory untouched. Returns `true` if something was removed.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be removed.
pub fn remove_entry(path: &Path) -> io::Result<bool> {
    let meta = match std::fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if is_absent(&e) => return Ok(false),
        Err(e) => return Err(e),
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)?;
    } else {
        remove_link_or_file(path)?;
    }
    Ok(true)
}

/// `true` for errors meaning nothing exists at the path, including a regular
/// file standing where an ancestor directory should be.
#[must_use]
pub fn is_absent(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// The outermost proper ancestor of `path` that is a symlink, if any.
///
/// `symlink_metadata` only declines to follow the last component, so any
/// operation on `path` below such an ancestor lands wherever the link points.
#[must_use]
pub fn symlinked_ancestor(path: &Path) -> Option<PathBuf> {
    path.ancestors()
        .skip(1)
        .filter(|a| !a.as_os_str().is_empty())
        .filter(|a| std::fs::symlink_metadata(a).is_ok_and(|m| m.file_type().is_symlink()))
        .last()
        .map(Path::to_path_buf)
}

/// Remove a file or symlink, handling Windows directory symlinks.
fn remove_link_or_file(path: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if std::fs::remove_file(path).is_err() {
            return std::fs::remove_dir(path);
        }
        Ok(())
    }
    #[cfg(not(windows))]
    {
        std::fs::remove_file(path)
    }
}

/// Compute the path of `to` relative to the directory `from`.
///
/// Both paths must be absolute. The computation is purely lexical: no
/// symlinks are resolved and neither path has to exist.
///
/// ```
/// use dotlink::resources::helpers::fs::relative_path;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(
///     relative_path(Path::new("/home/u/.config/nvim"), Path::new("/home/u/dots/config/nvim/init.lua")),
///     PathBuf::from("../../dots/config/nvim/init.lua")
/// );
/// ```
#[must_use]
pub fn relative_path(from: &Path, to: &Path) -> PathBuf {
    let from: Vec<Component<'_>> = normalize(from);
    let to: Vec<Component<'_>> = normalize(to);

    let common = from
        .iter()
        .zip(to.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..from.len() {
        out.push("..");
    }
    for component in to.iter().skip(common) {
        out.push(component.as_os_str());
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Drop `.` components and fold `..` into its parent.
fn normalize(path: &Path) -> Vec<Component<'_>> {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.last(), Some(Component::Normal(_))) {
                    out.pop();
                } else if out.is_empty() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
