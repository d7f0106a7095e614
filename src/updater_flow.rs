use std::time::Instant;

use semver::Version;
use tauri::AppHandle;
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};
use tauri_plugin_updater::UpdaterExt;

use crate::{append_startup_log, launcher_config::LauncherConfig, update_channel::ChannelState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateOutcome {
    UpToDate,
    /// The check itself failed; startup continues as if up to date.
    CheckFailed(String),
    /// Declined by the user. The launcher exits normally.
    Cancelled,
    /// Installed; the launcher restarts into the new version.
    Installed,
}

/// Right after a channel switch any differing release is taken, so moving
/// to a channel with a lower version still installs its build.
pub(crate) fn should_accept_release(
    current: &Version,
    candidate: &Version,
    channel_switched: bool,
) -> bool {
    if channel_switched {
        candidate != current
    } else {
        candidate > current
    }
}

pub(crate) async fn run_update_check(
    app_handle: &AppHandle,
    config: &LauncherConfig,
    channel: &ChannelState,
) -> UpdateOutcome {
    let current_version = app_handle.package_info().version.to_string();
    let endpoint = match config.update_endpoint(channel.current()) {
        Ok(endpoint) => endpoint,
        Err(error) => return check_failed(error),
    };
    let channel_switched = channel.is_explicit();

    append_startup_log(&format!(
        "[update] checking {} channel at {endpoint} current_version={current_version}",
        channel.current().ui_name()
    ));

    let builder = match app_handle.updater_builder().endpoints(vec![endpoint]) {
        Ok(builder) => builder,
        Err(error) => return check_failed(format!("invalid updater endpoint: {error}")),
    };
    let updater = match builder
        .version_comparator(move |current, release| {
            should_accept_release(&current, &release.version, channel_switched)
        })
        .build()
    {
        Ok(updater) => updater,
        Err(error) => return check_failed(format!("failed to initialize updater: {error}")),
    };

    let check_started = Instant::now();
    let update = match updater.check().await {
        Ok(Some(update)) => update,
        Ok(None) => {
            append_startup_log(&format!(
                "[update] up to date elapsed_ms={}",
                check_started.elapsed().as_millis()
            ));
            return UpdateOutcome::UpToDate;
        }
        Err(error) => return check_failed(format!("update check failed: {error}")),
    };

    let new_version = update.version.to_string();
    append_startup_log(&format!(
        "[update] found version {new_version} elapsed_ms={}",
        check_started.elapsed().as_millis()
    ));

    let accepted = app_handle
        .dialog()
        .message(format!(
            "X Labs {new_version} is available. Install it now?\nChoosing \"No\" closes the launcher."
        ))
        .title("Update available")
        .kind(MessageDialogKind::Info)
        .buttons(MessageDialogButtons::YesNo)
        .blocking_show();
    if !accepted {
        append_startup_log("[update] user declined update");
        return UpdateOutcome::Cancelled;
    }

    let bytes = match update.download(|_, _| {}, || {}).await {
        Ok(bytes) => bytes,
        Err(error) => return check_failed(format!("failed to download update: {error}")),
    };
    if let Err(error) = update.install(&bytes) {
        return check_failed(format!("failed to install update: {error}"));
    }

    append_startup_log(&format!("[update] installed {new_version}; restarting"));
    UpdateOutcome::Installed
}

fn check_failed(reason: String) -> UpdateOutcome {
    append_startup_log(&format!("[update] {reason}"));
    UpdateOutcome::CheckFailed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(raw: &str) -> Version {
        Version::parse(raw).expect("valid version")
    }

    #[test]
    fn same_channel_accepts_only_newer_releases() {
        assert!(should_accept_release(&version("1.4.0"), &version("1.4.1"), false));
        assert!(!should_accept_release(&version("1.4.0"), &version("1.4.0"), false));
        assert!(!should_accept_release(&version("1.4.0"), &version("1.3.9"), false));
    }

    #[test]
    fn channel_switch_accepts_any_different_release() {
        assert!(should_accept_release(&version("1.5.0-dev.3"), &version("1.4.0"), true));
        assert!(!should_accept_release(&version("1.4.0"), &version("1.4.0"), true));
    }
}
