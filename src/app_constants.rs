use std::time::Duration;

pub const SUBPROCESS_FLAG: &str = "--xlabs-subprocess";
pub const DEDICATED_FLAG: &str = "-dedicated";
pub const UPDATE_ONLY_FLAG: &str = "-update";
pub const CHANNEL_MAIN_FLAG: &str = "--xlabs-channel-main";
pub const CHANNEL_DEVELOP_FLAG: &str = "--xlabs-channel-develop";

pub const APPDATA_DIR_NAME: &str = "xlabs";
pub const UI_RELATIVE_DIR: &str = "data/launcher-ui";
pub const UI_ENTRY_DOCUMENT: &str = "main.html";
pub const PROPERTIES_RELATIVE_PATH: &str = "user/properties.json";
pub const SINGLETON_LOCK_FILE: &str = "launcher.lock";
pub const LAUNCHER_LOG_FILE: &str = "launcher.log";
pub const LAUNCHER_LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;

pub const SINGLETON_WAIT: Duration = Duration::from_secs(3);
pub const WATCHDOG_GRACE_PERIOD: Duration = Duration::from_secs(3);
pub const PROCESS_POLL_INTERVAL: Duration = Duration::from_millis(500);

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const MAIN_WINDOW_TITLE: &str = "X Labs";
pub const UI_PROTOCOL_SCHEME: &str = "xlabs";
pub const DPI_REFRESH_EVENT: &str = "launcher://dpi-refresh";

pub const CHANNEL_PROPERTY: &str = "launcher-channel";

pub const ROOT_OVERRIDE_ENV: &str = "XLABS_ROOT";
pub const UPDATE_CHECK_ENV: &str = "XLABS_UPDATE_CHECK";
pub const SINGLETON_ENV: &str = "XLABS_SINGLETON";
pub const UPDATE_ENDPOINT_MAIN_ENV: &str = "XLABS_UPDATE_ENDPOINT_MAIN";
pub const UPDATE_ENDPOINT_DEVELOP_ENV: &str = "XLABS_UPDATE_ENDPOINT_DEVELOP";

pub const DEFAULT_UPDATE_ENDPOINT_MAIN: &str =
    "https://updates.xlabs.dev/launcher/main/latest.json";
pub const DEFAULT_UPDATE_ENDPOINT_DEVELOP: &str =
    "https://updates.xlabs.dev/launcher/develop/latest.json";
