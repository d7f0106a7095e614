#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app_constants;
mod app_runtime;
mod app_types;
mod browser_host;
mod command_table;
mod exit_events;
mod game_catalog;
mod launch_coordinator;
mod launcher_commands;
mod launcher_config;
mod logging;
mod process_control;
mod property_store;
mod runtime_paths;
mod singleton;
mod startup_mode;
mod tauri_host;
mod termination_barrier;
mod ui_protocol;
mod update_channel;
mod updater_flow;
mod watchdog;

pub(crate) use app_constants::*;
pub(crate) use app_types::{DpiRefreshPayload, LauncherSession};
pub(crate) use logging::{
    append_command_log, append_launcher_log, append_startup_log, append_watchdog_log,
};

fn main() {
    std::process::exit(app_runtime::run());
}
