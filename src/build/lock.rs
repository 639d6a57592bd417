//! Exclusive lock over a working directory.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

/// Lock file name inside the working directory.
pub const LOCK_FILENAME: &str = ".repobuild.lock";

#[derive(Debug, Error)]
pub enum LockError {
    #[error(
        "Working directory is in use by another build\n\
         If you're sure no other build is running, remove the lock file:\n  {}",
        lock_path.display()
    )]
    Contention { lock_path: PathBuf },

    #[error("Failed to open lock file {}: {source}", lock_path.display())]
    Io {
        lock_path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held for the duration of a build run. Released on drop.
pub struct RunLock {
    #[cfg(unix)]
    _guard: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _guard: File,
    lock_path: PathBuf,
}

impl RunLock {
    /// Acquire the lock for `workdir` without waiting, creating the
    /// directory if needed.
    pub fn acquire(workdir: &Path) -> Result<Self, LockError> {
        let lock_path = workdir.join(LOCK_FILENAME);
        let io_err = |source| LockError::Io {
            lock_path: lock_path.clone(),
            source,
        };

        std::fs::create_dir_all(workdir).map_err(io_err)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(io_err)?;

        let guard = try_lock(file, &lock_path)?;
        debug!("Acquired lock {:?}", lock_path);

        Ok(Self {
            _guard: guard,
            lock_path,
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl fmt::Debug for RunLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLock")
            .field("lock_path", &self.lock_path)
            .finish()
    }
}

#[cfg(unix)]
fn try_lock(file: File, lock_path: &Path) -> Result<nix::fcntl::Flock<File>, LockError> {
    use nix::errno::Errno;
    use nix::fcntl::{Flock, FlockArg};

    Flock::lock(file, FlockArg::LockExclusiveNonblock).map_err(|(_, errno)| match errno {
        Errno::EWOULDBLOCK => LockError::Contention {
            lock_path: lock_path.to_path_buf(),
        },
        other => LockError::Io {
            lock_path: lock_path.to_path_buf(),
            source: io::Error::from(other),
        },
    })
}

#[cfg(not(unix))]
fn try_lock(file: File, _lock_path: &Path) -> Result<File, LockError> {
    Ok(file)
}
