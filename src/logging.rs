use std::{
    env, fs,
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use chrono::Local;

use crate::{runtime_paths, LAUNCHER_LOG_FILE, LAUNCHER_LOG_MAX_BYTES};

const APP_LOG_FALLBACK_DIR: &str = "xlabs-launcher";

pub(crate) fn resolve_launcher_log_path(base_path: Option<PathBuf>, file_name: &str) -> PathBuf {
    match base_path {
        Some(base) => base.join("logs").join(file_name),
        None => env::temp_dir().join(APP_LOG_FALLBACK_DIR).join(file_name),
    }
}

fn format_log_line(scope: &str, message: &str) -> String {
    format!(
        "[{}] [{}] {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
        scope,
        message
    )
}

fn rotate_if_oversized(path: &Path, max_bytes: u64) {
    let Ok(metadata) = fs::metadata(path) else {
        return;
    };
    if metadata.len() < max_bytes {
        return;
    }

    let mut rotated = path.as_os_str().to_owned();
    rotated.push(".1");
    let _ = fs::rename(path, PathBuf::from(rotated));
}

fn write_log_line(path: &Path, line: &str) {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }

    rotate_if_oversized(path, LAUNCHER_LOG_MAX_BYTES);
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = file.write_all(line.as_bytes());
    }
}

fn append_log(scope: &str, message: &str) {
    let line = format_log_line(scope, message);
    if cfg!(debug_assertions) {
        eprint!("{line}");
    }

    let path = resolve_launcher_log_path(runtime_paths::default_base_path(), LAUNCHER_LOG_FILE);
    write_log_line(&path, &line);
}

pub(crate) fn append_launcher_log(message: &str) {
    append_log("launcher", message);
}

pub(crate) fn append_startup_log(message: &str) {
    append_log("startup", message);
}

pub(crate) fn append_command_log(message: &str) {
    append_log("command", message);
}

pub(crate) fn append_watchdog_log(message: &str) {
    append_log("watchdog", message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_launcher_log_path_prefers_base_logs_dir() {
        let path = resolve_launcher_log_path(Some(PathBuf::from("/data/xlabs")), "launcher.log");
        assert_eq!(path, PathBuf::from("/data/xlabs/logs/launcher.log"));
    }

    #[test]
    fn resolve_launcher_log_path_falls_back_to_temp_dir() {
        let path = resolve_launcher_log_path(None, "launcher.log");
        assert!(path.starts_with(env::temp_dir()));
        assert!(path.ends_with("launcher.log"));
    }

    #[test]
    fn format_log_line_contains_scope_and_message() {
        let line = format_log_line("command", "dispatch close");
        assert!(line.contains("[command] dispatch close"));
        assert!(line.ends_with('\n'));
    }

    #[test]
    fn write_log_line_rotates_oversized_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("logs").join("launcher.log");
        fs::create_dir_all(path.parent().expect("log parent")).expect("create log dir");
        fs::write(&path, vec![b'x'; LAUNCHER_LOG_MAX_BYTES as usize]).expect("seed log");

        write_log_line(&path, "fresh line\n");

        let rotated = dir.path().join("logs").join("launcher.log.1");
        assert!(rotated.is_file());
        assert_eq!(fs::read_to_string(&path).expect("read log"), "fresh line\n");
    }
}
