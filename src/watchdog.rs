use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{append_watchdog_log, process_control, WATCHDOG_GRACE_PERIOD};

/// Starts the orphan-cleanup thread for helper processes. Its only job is
/// to end this process a grace period after the parent has gone away.
pub(crate) fn run_watchdog() -> Option<JoinHandle<()>> {
    let Some(parent_pid) = process_control::get_parent_pid() else {
        append_watchdog_log("parent process unknown; watchdog not started");
        return None;
    };

    let spawned = spawn_watchdog(
        parent_pid,
        process_control::wait_for_process,
        WATCHDOG_GRACE_PERIOD,
        || {
            append_watchdog_log("parent process exited; terminating helper");
            process_control::terminate();
        },
    );
    match spawned {
        Ok(handle) => Some(handle),
        Err(error) => {
            append_watchdog_log(&format!("failed to spawn watchdog thread: {error}"));
            None
        }
    }
}

/// Keeps the helper alive until the watchdog has acted. In production the
/// orphan callback exits the process, so this only returns without a
/// watchdog or when the callback itself returns.
pub(crate) fn hold_until_orphaned(watchdog: Option<JoinHandle<()>>) -> i32 {
    let Some(handle) = watchdog else {
        return 0;
    };
    match handle.join() {
        Ok(()) => 0,
        Err(_) => {
            append_watchdog_log("watchdog thread panicked");
            1
        }
    }
}

pub(crate) fn spawn_watchdog<W, T>(
    parent_pid: u32,
    wait_for_exit: W,
    grace_period: Duration,
    on_orphaned: T,
) -> std::io::Result<JoinHandle<()>>
where
    W: FnOnce(u32) + Send + 'static,
    T: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name("xlabs-watchdog".to_string())
        .spawn(move || {
            wait_for_exit(parent_pid);
            thread::sleep(grace_period);
            on_orphaned();
        })
}
