//! Path resolution for requested resource names.
//!
//! Joins a client-supplied name onto the storage root using purely textual
//! path semantics. No filesystem access happens here; existence and
//! readability are the handler's problem.

use std::path::{Component, Path, PathBuf};

use crate::error::ErrorKind;

/// Join `name` onto `root` and validate the result.
///
/// Rejects with [`ErrorKind::InvalidPath`] when the name is empty or elides
/// down to the root itself, and when absolute or `..` components would
/// escape the root. The returned path is always strictly below `root`.
pub fn resolve(root: &Path, name: &str) -> Result<PathBuf, ErrorKind> {
    let mut resolved = root.to_path_buf();
    let mut depth: usize = 0;

    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` may only unwind segments of the name itself.
                if depth == 0 {
                    return Err(ErrorKind::InvalidPath);
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(ErrorKind::InvalidPath),
        }
    }

    // The degenerate case: the joined result is the root itself.
    if depth == 0 {
        return Err(ErrorKind::InvalidPath);
    }

    Ok(resolved)
}
