use crate::static_files::ServeError;
use std::path::{Component, Path, PathBuf};

/// Map a still-encoded path below `base_dir` to a regular file inside it.
///
/// The path is percent-decoded once; `..`, absolute paths, and symlinks that
/// lead out of `base_dir` are refused.
pub fn resolve_static_path(base_dir: &Path, encoded: &str) -> Result<PathBuf, ServeError> {
    let decoded = percent_encoding::percent_decode_str(encoded)
        .decode_utf8()
        .map_err(|_| ServeError::BadPath)?;

    let decoded = decoded.trim_start_matches('/');
    if decoded.is_empty() {
        return Err(ServeError::NotFound);
    }

    let relative = PathBuf::from(decoded);
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            // ParentDir, RootDir, Prefix
            _ => return Err(ServeError::Forbidden),
        }
    }

    let base = base_dir.canonicalize().map_err(|_| ServeError::NotFound)?;
    let target = base_dir
        .join(&relative)
        .canonicalize()
        .map_err(|_| ServeError::NotFound)?;

    if !target.starts_with(&base) {
        return Err(ServeError::Forbidden);
    }
    if !target.is_file() {
        return Err(ServeError::NotFound);
    }

    Ok(target)
}
