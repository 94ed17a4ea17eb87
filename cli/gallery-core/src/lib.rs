//! Small filesystem helpers shared by the gallery crates.
//!
//! State that must survive between invocations (navigation history,
//! stored credentials) is kept as JSON next to a `.lock` file.
//! Writes go through a temporary file and a rename so readers never see a
//! partially written file.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use fslock::LockFile;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StateFileError {
    #[error("file stored in an invalid location: {0}")]
    InvalidLocation(PathBuf),
    #[error("failed to create directory {0}")]
    CreateDir(PathBuf, #[source] std::io::Error),
    #[error("failed to acquire lock {0}")]
    Lock(PathBuf, #[source] fslock::Error),
    #[error("failed to read {0}")]
    Read(PathBuf, #[source] std::io::Error),
    #[error("failed to parse {0}")]
    Parse(PathBuf, #[source] serde_json::Error),
    #[error("failed to remove {0}")]
    Remove(PathBuf, #[source] std::io::Error),
    #[error("failed to open temporary file")]
    OpenTmpFile(#[source] std::io::Error),
    #[error("failed to rename temporary file")]
    RenameTmpFile(#[source] tempfile::PersistError),
    #[error("failed to write temporary file")]
    WriteTmpFile(#[source] serde_json::Error),
}

/// Returns the path of the lock guarding `path`.
///
/// The lock file is never removed, its presence does not indicate an
/// active lock.
pub fn lock_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".lock");
    path.with_file_name(name)
}

/// Acquire an exclusive lock for the state file at `path`,
/// creating the parent directory if necessary.
pub fn acquire_lock(path: impl AsRef<Path>) -> Result<LockFile, StateFileError> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .ok_or_else(|| StateFileError::InvalidLocation(path.to_path_buf()))?;
    std::fs::create_dir_all(parent)
        .map_err(|e| StateFileError::CreateDir(parent.to_path_buf(), e))?;

    let lock_path = lock_path(path);
    let mut lock =
        LockFile::open(&lock_path).map_err(|e| StateFileError::Lock(lock_path.clone(), e))?;
    lock.lock()
        .map_err(|e| StateFileError::Lock(lock_path.clone(), e))?;
    Ok(lock)
}

/// Read and deserialize a JSON state file.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read_json<T>(path: impl AsRef<Path>) -> Result<Option<T>, StateFileError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = traceable_path(path), "state file does not exist");
            return Ok(None);
        },
        Err(e) => return Err(StateFileError::Read(path.to_path_buf(), e)),
    };
    let value = serde_json::from_str(&contents)
        .map_err(|e| StateFileError::Parse(path.to_path_buf(), e))?;
    Ok(Some(value))
}

/// Serialize a value and write it to disk atomically.
///
/// First the value is written to a temporary file,
/// and then it is renamed so the write appears atomic.
/// This also takes a [LockFile] argument to ensure that the write can only be
/// performed when the lock is acquired.
/// It is a bug if you pass a [LockFile] that doesn't correspond to the file, as
/// that is essentially bypassing the lock.
/// `path` must have a parent directory.
pub fn serialize_atomically<T>(
    value: &T,
    path: &impl AsRef<Path>,
    _lock: LockFile,
) -> Result<(), StateFileError>
where
    T: ?Sized + Serialize,
{
    let parent = path
        .as_ref()
        .parent()
        .ok_or(StateFileError::InvalidLocation(path.as_ref().to_path_buf()))?;
    let temp_file = tempfile::NamedTempFile::new_in(parent).map_err(StateFileError::OpenTmpFile)?;

    let writer = BufWriter::new(&temp_file);
    serde_json::to_writer_pretty(writer, value).map_err(StateFileError::WriteTmpFile)?;
    temp_file
        .persist(path.as_ref())
        .map_err(StateFileError::RenameTmpFile)?;
    debug!(path = traceable_path(path), "wrote state file");
    Ok(())
}

/// Remove a state file, treating an already missing file as success.
pub fn remove_state_file(path: impl AsRef<Path>, _lock: LockFile) -> Result<(), StateFileError> {
    let path = path.as_ref();
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StateFileError::Remove(path.to_path_buf(), e)),
    }
}

/// Returns a `tracing`-compatible form of a [Path]
pub fn traceable_path(p: impl AsRef<Path>) -> impl tracing::Value {
    let path = p.as_ref();
    path.display().to_string()
}
