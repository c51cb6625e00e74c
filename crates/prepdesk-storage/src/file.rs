//! # Filesystem-backed key-value store
//!
//! [`FileStore`] persists each key as its own file under a base directory.
//! It is what a desktop client uses to stay logged in across restarts.
//!
//! ## Layout
//!
//! ```text
//! <base_dir>/
//! ├── user      # serialized identity record
//! └── token     # raw access token
//! ```
//!
//! Writes go to `<key>.tmp` first and are then renamed over the real file,
//! so a crash mid-write leaves either the old value or the new one. The
//! `.tmp` suffix is reserved for this and never accepted as a key.
//!
//! On Unix the directory is created `0700` and every value file `0600`:
//! the token is a bearer credential and must not be readable by other
//! local users.
//!
//! ## Platform data directories
//!
//! [`FileStore::default_location`] resolves `dirs::data_dir()/prepdesk`:
//!
//! | Platform | Path |
//! |----------|------|
//! | macOS | `~/Library/Application Support/prepdesk/` |
//! | Linux | `~/.local/share/prepdesk/` |
//! | Windows | `C:\Users\<user>\AppData\Roaming\prepdesk\` |

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::{KeyValueStore, StorageError};

const APP_DIR: &str = "prepdesk";
const TMP_SUFFIX: &str = ".tmp";

/// Filesystem-backed [`KeyValueStore`].
#[derive(Clone, Debug)]
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `base`, creating the directory if needed.
    pub fn open(base: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base = base.into();
        private_dir_builder()
            .create(&base)
            .map_err(|source| StorageError::Io {
                key: base.display().to_string(),
                source,
            })?;
        tracing::debug!(dir = %base.display(), "file store opened");
        Ok(Self { base })
    }

    /// Platform data directory for prepdesk, if the platform has one.
    pub fn default_location() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join(APP_DIR))
    }

    /// Directory this store writes into.
    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base.join(key))
    }
}

/// Keys become file names, so only a conservative character set is
/// allowed. This also rules out `..` and path separators, and keys that
/// would collide with another key's staging file.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && !key.ends_with(TMP_SUFFIX)
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

fn private_dir_builder() -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder
}

/// Creates or truncates `path`, owner-only on Unix.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let file = options.open(path)?;
    // `mode` only applies on creation; a leftover staging file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        let tmp = self.base.join(format!("{key}{TMP_SUFFIX}"));

        let staged = create_private(&tmp)
            .and_then(|mut file| file.write_all(value.as_bytes()))
            .and_then(|()| fs::rename(&tmp, &path));
        if let Err(e) = staged {
            match fs::remove_file(&tmp) {
                Err(cleanup) if cleanup.kind() != ErrorKind::NotFound => {
                    tracing::warn!(key, error = %cleanup, "failed to remove staging file");
                }
                _ => {}
            }
            return Err(io_error(key, e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.key_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
