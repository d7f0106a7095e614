use std::sync::Arc;

use tauri::{AppHandle, Manager};

use crate::{append_launcher_log, process_control, update_channel::ChannelState};

pub(crate) fn handle_exit_event(app_handle: &AppHandle) {
    let Some(channel) = app_handle.try_state::<Arc<ChannelState>>() else {
        return;
    };
    perform_pending_relaunch(&channel, process_control::relaunch_self);
}

/// Runs the relaunch scheduled by a channel switch, if any. At most one
/// relaunch happens per process.
pub(crate) fn perform_pending_relaunch<F>(
    channel: &ChannelState,
    relaunch: F,
) -> Option<Result<u32, String>>
where
    F: FnOnce(&[&str]) -> Result<u32, String>,
{
    let target = channel.take_pending_relaunch()?;
    let result = relaunch(&[target.relaunch_flag()]);
    match &result {
        Ok(pid) => append_launcher_log(&format!(
            "relaunched on {} channel (pid {pid})",
            target.ui_name()
        )),
        Err(error) => append_launcher_log(&format!(
            "failed to relaunch on {} channel: {error}",
            target.ui_name()
        )),
    }
    Some(result)
}
