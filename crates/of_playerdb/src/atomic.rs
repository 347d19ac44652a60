//! Atomic file replacement shared by the store and the string table.

use std::ffi::OsString;
use std::fs::{remove_file, rename, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// `<file_name>.tmp` next to `path`, so `players.db` and `players.dat`
/// never share a temp file.
pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through `fill` into a temp file, fsync, then rename over `path`.
///
/// On failure the temp file is removed and `path` is left untouched.
pub(crate) fn write_atomic<F>(path: &Path, fill: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let temp_path = temp_path_for(path);

    let result = (|| {
        let mut file = File::create(&temp_path)?;
        fill(&mut file)?;
        file.flush()?;
        file.sync_all()?;
        drop(file);
        rename(&temp_path, path)
    })();

    if result.is_err() && temp_path.exists() {
        if let Err(e) = remove_file(&temp_path) {
            log::warn!("Failed to remove temp file {:?}: {}", temp_path, e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_temp_path_keeps_extension() {
        let a = temp_path_for(Path::new("data/players.db"));
        let b = temp_path_for(Path::new("data/players.dat"));
        assert_eq!(a, PathBuf::from("data/players.db.tmp"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_write_atomic_replaces_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("strings.db");
        std::fs::write(&path, b"old").unwrap();

        write_atomic(&path, |f| f.write_all(b"new")).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"new");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_failed_write_removes_temp_and_keeps_target() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("players.db");
        std::fs::write(&path, b"old").unwrap();

        let result = write_atomic(&path, |f| {
            f.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });

        assert!(result.is_err());
        assert!(!temp_path_for(&path).exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"old");
    }
}
