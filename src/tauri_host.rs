use serde_json::Value;
use tauri::{
    AppHandle, Emitter, Manager, State, WebviewUrl, WebviewWindow, WebviewWindowBuilder, Window,
};
use tauri_plugin_dialog::DialogExt;

use crate::{
    append_launcher_log,
    browser_host::{BrowserInstance, BrowserLifecycle, UiControl},
    command_table::CommandTable,
    ui_protocol, watchdog, DpiRefreshPayload, DPI_REFRESH_EVENT, MAIN_WINDOW_LABEL,
    MAIN_WINDOW_TITLE,
};

/// Injected into every document before its own scripts run.
pub(crate) const BRIDGE_SCRIPT: &str = r#"
(() => {
  if (window.xlabs) return;
  const invoke = (name, payload) =>
    window.__TAURI_INTERNALS__.invoke('launcher_invoke', {
      command: name,
      payload: payload === undefined ? null : payload,
    });
  Object.defineProperty(window, 'xlabs', {
    value: Object.freeze({ command: invoke }),
    writable: false,
  });
  document.addEventListener('contextmenu', (event) => event.preventDefault(), true);
})();
"#;

const MAIN_WINDOW_WIDTH: f64 = 1280.0;
const MAIN_WINDOW_HEIGHT: f64 = 720.0;

#[tauri::command]
pub(crate) async fn launcher_invoke(
    commands: State<'_, CommandTable>,
    command: String,
    payload: Option<Value>,
) -> Result<Value, String> {
    Ok(commands.dispatch(&command, &payload.unwrap_or(Value::Null)))
}

pub(crate) struct TauriUi {
    app_handle: AppHandle,
}

impl TauriUi {
    pub(crate) fn new(app_handle: AppHandle) -> Self {
        Self { app_handle }
    }

    fn main_window(&self, action: &str) -> Option<WebviewWindow> {
        let window = self.app_handle.get_webview_window(MAIN_WINDOW_LABEL);
        if window.is_none() {
            append_launcher_log(&format!("{action} skipped: main window not found"));
        }
        window
    }
}

impl UiControl for TauriUi {
    fn close_browser(&self) {
        let Some(window) = self.main_window("close") else {
            return;
        };
        if let Err(error) = window.close() {
            append_launcher_log(&format!("failed to close main window: {error}"));
        }
    }

    fn minimize_window(&self) {
        let Some(window) = self.main_window("minimize") else {
            return;
        };
        if let Err(error) = window.minimize() {
            append_launcher_log(&format!("failed to minimize main window: {error}"));
        }
    }

    fn show_window(&self) {
        let Some(window) = self.main_window("show") else {
            return;
        };
        if let Err(error) = window.show() {
            append_launcher_log(&format!("failed to show main window: {error}"));
        }
        if let Err(error) = window.unminimize() {
            append_launcher_log(&format!("failed to unminimize main window: {error}"));
        }
        if let Err(error) = window.set_focus() {
            append_launcher_log(&format!("failed to focus main window: {error}"));
        }

        match window.scale_factor() {
            Ok(scale_factor) => {
                if let Err(error) =
                    window.emit(DPI_REFRESH_EVENT, DpiRefreshPayload { scale_factor })
                {
                    append_launcher_log(&format!("failed to emit dpi refresh: {error}"));
                }
            }
            Err(error) => {
                append_launcher_log(&format!("failed to read main window scale factor: {error}"))
            }
        }
    }

    fn pick_folder(&self) -> Option<String> {
        let picked = self.app_handle.dialog().file().blocking_pick_folder()?;
        match picked.into_path() {
            Ok(path) => Some(path.to_string_lossy().into_owned()),
            Err(error) => {
                append_launcher_log(&format!("picked folder is not a local path: {error}"));
                None
            }
        }
    }
}

/// Tauri keeps labels unique among live windows; the native handle also
/// tells apart a window from a later one reusing its label.
impl BrowserInstance for Window {
    fn is_same(&self, other: &Self) -> bool {
        same_window(
            (self.label(), native_handle(self)),
            (other.label(), native_handle(other)),
        )
    }

    fn detach_from_parent(&self) {
        detach_native_parent(self);
    }
}

fn same_window(left: (&str, Option<isize>), right: (&str, Option<isize>)) -> bool {
    match (left.1, right.1) {
        (Some(left_handle), Some(right_handle)) => left_handle == right_handle,
        _ => left.0 == right.0,
    }
}

#[cfg(windows)]
fn native_handle(window: &Window) -> Option<isize> {
    window.hwnd().ok().map(|hwnd| hwnd.0 as isize)
}

#[cfg(not(windows))]
fn native_handle(_window: &Window) -> Option<isize> {
    None
}

#[cfg(windows)]
fn detach_native_parent(window: &Window) {
    use windows::Win32::{Foundation::HWND, UI::WindowsAndMessaging::SetParent};

    let Ok(hwnd) = window.hwnd() else {
        return;
    };
    // SAFETY: the handle belongs to a live window owned by this process.
    let _ = unsafe { SetParent(HWND(hwnd.0), HWND::default()) };
}

#[cfg(not(windows))]
fn detach_native_parent(_window: &Window) {}

/// Builds the hidden main window and registers it with the browser
/// lifecycle. The UI reveals it with the `show` command.
pub(crate) fn create_main_window(app_handle: &AppHandle, entry_document: &str) -> Result<(), String> {
    let url = ui_protocol::entry_url(entry_document)?;
    WebviewWindowBuilder::new(app_handle, MAIN_WINDOW_LABEL, WebviewUrl::CustomProtocol(url))
        .title(MAIN_WINDOW_TITLE)
        .inner_size(MAIN_WINDOW_WIDTH, MAIN_WINDOW_HEIGHT)
        .decorations(false)
        .visible(false)
        .center()
        .initialization_script(BRIDGE_SCRIPT)
        .build()
        .map_err(|error| format!("Failed to create main window: {error}"))?;

    let window = app_handle
        .get_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window vanished right after creation".to_string())?;
    if let Some(lifecycle) = app_handle.try_state::<BrowserLifecycle<Window>>() {
        lifecycle.on_after_created(window);
        append_launcher_log(&format!(
            "main window created; {} browser(s) open",
            lifecycle.open_count()
        ));
    }
    Ok(())
}

/// Entry for engine helper processes. WebView2 spawns and owns its own
/// helpers, so the process only waits for the watchdog to end it.
pub(crate) fn run_helper_process() -> i32 {
    let watchdog = watchdog::run_watchdog();
    append_launcher_log("helper process waiting for parent exit");
    watchdog::hold_until_orphaned(watchdog)
}

#[cfg(windows)]
pub(crate) fn enable_dpi_awareness() {
    use windows::Win32::UI::HiDpi::{
        SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    };

    // SAFETY: called once on the main thread before any window exists.
    if let Err(error) =
        unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2) }
    {
        append_launcher_log(&format!("failed to enable per-monitor dpi awareness: {error}"));
    }
}

#[cfg(not(windows))]
pub(crate) fn enable_dpi_awareness() {}
