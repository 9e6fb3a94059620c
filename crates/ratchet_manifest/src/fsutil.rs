//! Output path mapping and atomic file replacement.

use std::fs::File;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::ManifestError;

/// Returns `true` if `digest_path` stays inside the output directory: a
/// relative `/`-separated path whose every segment is a plain name.
pub(crate) fn is_contained(digest_path: &str) -> bool {
    !digest_path.is_empty()
        && digest_path.split('/').all(|part| {
            let mut components = Path::new(part).components();
            matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            )
        })
}

/// Maps a `/`-separated digest path onto `directory`.
///
/// Paths that could land outside `directory` are rejected with
/// [`ManifestError::InvalidDigestPath`].
pub(crate) fn target_path(directory: &Path, digest_path: &str) -> Result<PathBuf, ManifestError> {
    if !is_contained(digest_path) {
        return Err(ManifestError::InvalidDigestPath {
            digest_path: digest_path.to_string(),
        });
    }
    Ok(digest_path
        .split('/')
        .fold(directory.to_path_buf(), |path, part| path.join(part)))
}

/// Writes `path` by filling a temporary file in the same directory and then
/// renaming it into place, so readers never observe a partial file.
///
/// The parent directory is created if needed. If `fill` fails the temporary
/// file is discarded and `path` is left untouched.
pub(crate) fn write_atomically<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    fill(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;

    // Temporary files are created owner-only; published files are public.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
