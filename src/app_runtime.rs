use std::sync::Arc;

use tauri::{AppHandle, Manager, RunEvent, Window, WindowEvent};

use crate::{
    append_startup_log,
    browser_host::{BrowserLifecycle, UiControl},
    command_table::CommandTable,
    exit_events,
    launch_coordinator::LaunchCoordinator,
    launcher_commands::{register_launcher_commands, LauncherContext},
    launcher_config::LauncherConfig,
    logging,
    process_control::SystemProcessLauncher,
    property_store::PropertyStore,
    runtime_paths::LauncherPaths,
    singleton::acquire_singleton,
    startup_mode::{resolve_startup_mode, CommandLine, StartupMode},
    tauri_host::{self, TauriUi},
    termination_barrier::TerminationBarrier,
    ui_protocol,
    update_channel::ChannelState,
    updater_flow::{self, UpdateOutcome},
    LauncherSession, LAUNCHER_LOG_FILE, MAIN_WINDOW_LABEL, SINGLETON_WAIT, UI_PROTOCOL_SCHEME,
};

/// Runs the launcher and returns the process exit code.
pub(crate) fn run() -> i32 {
    match bootstrap() {
        Ok(exit_code) => exit_code,
        Err(error) => {
            append_startup_log(&format!("startup failed: {error}"));
            1
        }
    }
}

fn bootstrap() -> Result<i32, String> {
    let paths = LauncherPaths::resolve()?;
    let command_line = CommandLine::from_env();
    let mode = resolve_startup_mode(&command_line);

    append_startup_log(&format!(
        "launcher starting mode={mode:?} base={} log={}",
        paths.base().display(),
        logging::resolve_launcher_log_path(Some(paths.base().to_path_buf()), LAUNCHER_LOG_FILE)
            .display()
    ));
    append_startup_log(&format!("arguments: {:?}", command_line.args()));

    if mode == StartupMode::Subprocess {
        return Ok(tauri_host::run_helper_process());
    }

    tauri_host::enable_dpi_awareness();

    let config = LauncherConfig::from_env();
    // Held for the whole process lifetime.
    let _singleton = if config.singleton_enabled {
        let guard = acquire_singleton(&paths.singleton_lock_file(), SINGLETON_WAIT)?;
        append_startup_log(&format!("singleton lock held at {}", guard.path().display()));
        Some(guard)
    } else {
        append_startup_log("singleton lock disabled");
        None
    };

    let properties = Arc::new(PropertyStore::open(paths.properties_file()));
    let channel = Arc::new(ChannelState::resolve(&command_line, &properties));
    append_startup_log(&format!(
        "update channel {} (explicit={})",
        channel.current().ui_name(),
        channel.is_explicit()
    ));

    let session = LauncherSession {
        paths: Arc::new(paths),
        config: Arc::new(config),
        channel,
        show_ui: mode.shows_ui(),
    };
    run_tauri(session, properties)?;
    Ok(0)
}

fn run_tauri(session: LauncherSession, properties: Arc<PropertyStore>) -> Result<(), String> {
    let ui_root = session.paths.ui_root().to_path_buf();
    let entry_document = session.paths.ui_entry_document();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_updater::Builder::new().build())
        .plugin(tauri_plugin_dialog::init())
        .manage(Arc::clone(&session.channel))
        .register_uri_scheme_protocol(UI_PROTOCOL_SCHEME, move |_context, request| {
            ui_protocol::serve_ui_asset(&ui_root, entry_document, &request)
        })
        .invoke_handler(tauri::generate_handler![crate::tauri_host::launcher_invoke])
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }
            let Some(lifecycle) = window
                .app_handle()
                .try_state::<BrowserLifecycle<Window>>()
            else {
                return;
            };

            match event {
                WindowEvent::CloseRequested { .. } => lifecycle.on_close_requested(window),
                WindowEvent::Destroyed => lifecycle.on_before_close(window),
                _ => {}
            }
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();

            let quit_handle = app_handle.clone();
            app.manage(BrowserLifecycle::<Window>::new(move || quit_handle.exit(0)));

            let ui: Arc<dyn UiControl> = Arc::new(TauriUi::new(app_handle.clone()));
            let coordinator = Arc::new(LaunchCoordinator::new(
                Arc::clone(&session.paths),
                Arc::new(TerminationBarrier::new()),
                Arc::clone(&properties),
                Arc::new(SystemProcessLauncher),
            ));
            let context = LauncherContext {
                ui,
                properties,
                coordinator,
                channel: Arc::clone(&session.channel),
            };
            let mut commands = CommandTable::new();
            register_launcher_commands(&mut commands, &context);
            append_startup_log(&format!("registered {} ui commands", commands.len()));
            app.manage(commands);

            tauri::async_runtime::spawn(startup_flow(app_handle, session));
            Ok(())
        })
        .build(tauri::generate_context!())
        .map_err(|error| format!("Failed to build tauri application: {error}"))?;

    app.run(|app_handle, event| {
        if let RunEvent::Exit = event {
            exit_events::handle_exit_event(app_handle);
        }
    });
    Ok(())
}

async fn startup_flow(app_handle: AppHandle, session: LauncherSession) {
    if session.config.update_check_enabled {
        match updater_flow::run_update_check(&app_handle, &session.config, &session.channel).await
        {
            UpdateOutcome::Installed => {
                app_handle.request_restart();
                return;
            }
            UpdateOutcome::Cancelled => {
                app_handle.exit(0);
                return;
            }
            UpdateOutcome::UpToDate | UpdateOutcome::CheckFailed(_) => {}
        }
    } else {
        append_startup_log("[update] update check disabled; skipping");
    }

    if !session.show_ui {
        append_startup_log("dedicated run finished; exiting");
        app_handle.exit(0);
        return;
    }

    let entry_document = session.paths.ui_entry_document();
    let window_handle = app_handle.clone();
    let scheduled = app_handle.run_on_main_thread(move || {
        if let Err(error) = tauri_host::create_main_window(&window_handle, entry_document) {
            append_startup_log(&error);
            window_handle.exit(1);
        }
    });
    if let Err(error) = scheduled {
        append_startup_log(&format!("failed to schedule main window creation: {error}"));
        app_handle.exit(1);
    }
}
