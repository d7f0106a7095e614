use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{
    APPDATA_DIR_NAME, PROPERTIES_RELATIVE_PATH, ROOT_OVERRIDE_ENV, SINGLETON_LOCK_FILE,
    UI_ENTRY_DOCUMENT, UI_RELATIVE_DIR,
};

/// Resolves `<LocalAppData>/xlabs`, honoring the `XLABS_ROOT` override.
pub(crate) fn resolve_base_path() -> Result<PathBuf, String> {
    if let Ok(root) = env::var(ROOT_OVERRIDE_ENV) {
        let path = PathBuf::from(root.trim());
        if !path.as_os_str().is_empty() {
            return Ok(path);
        }
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(APPDATA_DIR_NAME))
        .ok_or_else(|| "Failed to read APPDATA path!".to_string())
}

pub(crate) fn default_base_path() -> Option<PathBuf> {
    resolve_base_path().ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LauncherPaths {
    base: PathBuf,
    ui_root: PathBuf,
}

impl LauncherPaths {
    pub(crate) fn from_base(base: PathBuf) -> Self {
        let ui_root = base.join(UI_RELATIVE_DIR);
        Self { base, ui_root }
    }

    pub(crate) fn resolve() -> Result<Self, String> {
        resolve_base_path().map(Self::from_base)
    }

    pub(crate) fn base(&self) -> &Path {
        &self.base
    }

    pub(crate) fn ui_root(&self) -> &Path {
        &self.ui_root
    }

    pub(crate) fn ui_entry_document(&self) -> &'static str {
        UI_ENTRY_DOCUMENT
    }

    pub(crate) fn properties_file(&self) -> PathBuf {
        self.base.join(PROPERTIES_RELATIVE_PATH)
    }

    pub(crate) fn singleton_lock_file(&self) -> PathBuf {
        self.base.join(SINGLETON_LOCK_FILE)
    }

    pub(crate) fn game_executable(&self, relative_path: &str) -> PathBuf {
        self.base.join(relative_path)
    }
}
