use std::sync::Arc;

use serde::Serialize;

use crate::{
    launcher_config::LauncherConfig, runtime_paths::LauncherPaths, update_channel::ChannelState,
};

/// Payload of the DPI refresh event emitted after `show`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DpiRefreshPayload {
    pub(crate) scale_factor: f64,
}

/// Everything bootstrap resolved before the Tauri builder starts.
#[derive(Clone)]
pub(crate) struct LauncherSession {
    pub(crate) paths: Arc<LauncherPaths>,
    pub(crate) config: Arc<LauncherConfig>,
    pub(crate) channel: Arc<ChannelState>,
    pub(crate) show_ui: bool,
}
