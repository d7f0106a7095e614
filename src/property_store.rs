use std::{
    fs::{self, File, OpenOptions},
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
    thread,
    time::Duration,
};

use fs2::FileExt;
use serde_json::{Map, Value};

use crate::append_launcher_log;

const RENAME_ATTEMPTS: u32 = 5;
const RENAME_RETRY_INTERVAL: Duration = Duration::from_millis(10);

/// Flat string key-value pairs persisted as one JSON object.
#[derive(Debug)]
pub(crate) struct PropertyStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

/// Exclusive write access to the store. Held for the duration of a batch so
/// that no other thread or process interleaves its writes with ours.
pub(crate) struct PropertyWriteGuard<'a> {
    store: &'a PropertyStore,
    lock_file: Option<File>,
    _guard: MutexGuard<'a, ()>,
}

impl PropertyStore {
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Unsynchronized read; a concurrent batch may be half applied.
    pub(crate) fn load(&self, key: &str) -> Option<String> {
        read_properties(&self.path).ok()?.get(key)?.as_str().map(str::to_string)
    }

    pub(crate) fn store(&self, key: &str, value: &str) -> Result<(), String> {
        self.lock().store(key, value)
    }

    pub(crate) fn lock(&self) -> PropertyWriteGuard<'_> {
        let guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let lock_file = match acquire_file_lock(&self.path) {
            Ok(file) => Some(file),
            Err(error) => {
                append_launcher_log(&format!(
                    "file lock for {} unavailable, continuing with in-process lock: {error}",
                    self.path().display()
                ));
                None
            }
        };

        PropertyWriteGuard {
            store: self,
            lock_file,
            _guard: guard,
        }
    }
}

impl PropertyWriteGuard<'_> {
    pub(crate) fn load(&self, key: &str) -> Option<String> {
        self.store.load(key)
    }

    pub(crate) fn store(&self, key: &str, value: &str) -> Result<(), String> {
        let path = &self.store.path;
        let mut properties = read_properties(path)?;
        properties.insert(key.to_string(), Value::String(value.to_string()));
        write_properties(path, &properties)
    }
}

impl Drop for PropertyWriteGuard<'_> {
    fn drop(&mut self) {
        if let Some(file) = self.lock_file.take() {
            let _ = file.unlock();
        }
    }
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = path.as_os_str().to_owned();
    sibling.push(suffix);
    PathBuf::from(sibling)
}

fn acquire_file_lock(path: &Path) -> Result<File, String> {
    let lock_path = sibling_path(path, ".lock");
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create property directory {}: {}",
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
        .open(&lock_path)
        .map_err(|error| format!("Failed to open {}: {}", lock_path.display(), error))?;
    file.lock_exclusive()
        .map_err(|error| format!("Failed to lock {}: {}", lock_path.display(), error))?;
    Ok(file)
}

fn read_properties(path: &Path) -> Result<Map<String, Value>, String> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(error) => {
            return Err(format!(
                "Failed to read properties {}: {}",
                path.display(),
                error
            ));
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => {
            append_launcher_log(&format!(
                "properties {} has non-object root; treating as empty",
                path.display()
            ));
            Ok(Map::new())
        }
        Err(error) => {
            append_launcher_log(&format!(
                "failed to parse properties {}: {}. treating as empty",
                path.display(),
                error
            ));
            Ok(Map::new())
        }
    }
}

fn write_properties(path: &Path, properties: &Map<String, Value>) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create property directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    let serialized = serde_json::to_string_pretty(properties)
        .map_err(|error| format!("Failed to serialize properties: {error}"))?;
    // Readers never see a truncated file: the new contents replace the old
    // in one rename.
    let staging = sibling_path(path, ".tmp");
    fs::write(&staging, serialized)
        .map_err(|error| format!("Failed to write properties {}: {}", staging.display(), error))?;
    replace_file(&staging, path)
        .map_err(|error| format!("Failed to replace properties {}: {}", path.display(), error))
}

/// Windows refuses the rename while a reader still has the target open, so
/// a few short retries cover an in-flight `load`.
fn replace_file(from: &Path, to: &Path) -> io::Result<()> {
    let mut attempt = 1;
    loop {
        match fs::rename(from, to) {
            Ok(()) => return Ok(()),
            Err(error)
                if error.kind() == ErrorKind::PermissionDenied && attempt < RENAME_ATTEMPTS =>
            {
                attempt += 1;
                thread::sleep(RENAME_RETRY_INTERVAL);
            }
            Err(error) => return Err(error),
        }
    }
}
