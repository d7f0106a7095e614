use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    thread,
    time::{Duration, Instant},
};

use fs2::FileExt;

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Exclusive lock marking this process as the running launcher. Released
/// when dropped or when the process exits.
#[derive(Debug)]
pub(crate) struct SingletonGuard {
    file: File,
    path: PathBuf,
}

impl SingletonGuard {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SingletonGuard {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

/// Retries for up to `wait` so a relaunch can start while the previous
/// instance is still shutting down.
pub(crate) fn acquire_singleton(lock_path: &Path, wait: Duration) -> Result<SingletonGuard, String> {
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create singleton lock directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)
        .map_err(|error| {
            format!(
                "Failed to open singleton lock {}: {}",
                lock_path.display(),
                error
            )
        })?;

    let deadline = Instant::now() + wait;
    loop {
        if file.try_lock_exclusive().is_ok() {
            return Ok(SingletonGuard {
                file,
                path: lock_path.to_path_buf(),
            });
        }
        if Instant::now() >= deadline {
            return Err("X Labs launcher is already running".to_string());
        }
        thread::sleep(RETRY_INTERVAL);
    }
}
