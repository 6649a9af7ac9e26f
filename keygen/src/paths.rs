use crate::error::{KeygenError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const VAR_DIR: &str = "var";

/// Picks where the key pair goes: `<root>/../var/<subdir>` when that `var`
/// directory is writable, `<root>/var/<subdir>` otherwise.
pub fn resolve_key_dir(root_dir: &Path, subdir: &str) -> PathBuf {
    let adjacent = root_dir.join("..").join(VAR_DIR);
    if is_writable(&adjacent) {
        debug!("Using adjacent var directory {}", adjacent.display());
        adjacent.join(subdir)
    } else {
        debug!(
            "{} is not writable, falling back to {}",
            adjacent.display(),
            root_dir.join(VAR_DIR).display()
        );
        root_dir.join(VAR_DIR).join(subdir)
    }
}

/// A directory is writable when a scratch file can be created in it.
pub fn is_writable(dir: &Path) -> bool {
    dir.is_dir()
        && tempfile::Builder::new()
            .prefix(".keygen-probe")
            .tempfile_in(dir)
            .is_ok()
}

/// `mkdir -p`; succeeds when the directory already exists.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|source| KeygenError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}
