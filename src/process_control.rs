use std::{
    env,
    path::{Path, PathBuf},
    process::{self, Command, Stdio},
    thread,
};

use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::{CHANNEL_DEVELOP_FLAG, CHANNEL_MAIN_FLAG, PROCESS_POLL_INTERVAL, SUBPROCESS_FLAG};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProcessLaunch {
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) env: Vec<(String, String)>,
    pub(crate) cwd: Option<PathBuf>,
}

impl ProcessLaunch {
    /// Launch of `program` from its own directory.
    pub(crate) fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let cwd = program.parent().map(Path::to_path_buf);
        Self {
            program,
            args: Vec::new(),
            env: Vec::new(),
            cwd,
        }
    }

    pub(crate) fn with_arg_line(mut self, arg_line: &str) -> Result<Self, String> {
        let args = shlex::split(arg_line)
            .ok_or_else(|| format!("Invalid launch arguments: {arg_line}"))?;
        self.args.extend(args);
        Ok(self)
    }

    /// Environment entry visible to the child only.
    pub(crate) fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub(crate) fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        parts.extend(self.args.iter().cloned());
        parts
    }
}

pub(crate) trait ProcessLauncher: Send + Sync {
    /// Spawns the process and returns its pid without waiting for it.
    fn launch_process(&self, launch: &ProcessLaunch) -> Result<u32, String>;
}

#[derive(Debug, Default)]
pub(crate) struct SystemProcessLauncher;

impl ProcessLauncher for SystemProcessLauncher {
    fn launch_process(&self, launch: &ProcessLaunch) -> Result<u32, String> {
        let mut command = Command::new(&launch.program);
        command
            .args(&launch.args)
            .envs(launch.env.iter().map(|(key, value)| (key, value)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        if let Some(cwd) = &launch.cwd {
            command.current_dir(cwd);
        }

        let child = command.spawn().map_err(|error| {
            format!(
                "Failed to spawn process with command {:?}: {}",
                launch.debug_command(),
                error
            )
        })?;
        Ok(child.id())
    }
}

pub(crate) fn terminate() -> ! {
    process::exit(0)
}

pub(crate) fn get_parent_pid() -> Option<u32> {
    let current = Pid::from_u32(process::id());
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[current]));
    system
        .process(current)
        .and_then(|process| process.parent())
        .map(|parent| parent.as_u32())
}

pub(crate) fn process_is_alive(pid: u32) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
    system.process(pid).is_some()
}

/// Blocks until `pid` is gone.
pub(crate) fn wait_for_process(pid: u32) {
    while process_is_alive(pid) {
        thread::sleep(PROCESS_POLL_INTERVAL);
    }
}

/// Current arguments minus helper and channel markers, followed by `extra`.
pub(crate) fn build_relaunch_args<I>(current_args: I, extra: &[&str]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    current_args
        .into_iter()
        .filter(|arg| {
            arg != SUBPROCESS_FLAG && arg != CHANNEL_MAIN_FLAG && arg != CHANNEL_DEVELOP_FLAG
        })
        .chain(extra.iter().map(|arg| arg.to_string()))
        .collect()
}

pub(crate) fn relaunch_self(extra: &[&str]) -> Result<u32, String> {
    let exe = env::current_exe()
        .map_err(|error| format!("Failed to resolve launcher executable path: {error}"))?;
    let args = build_relaunch_args(env::args().skip(1), extra);

    let mut launch = ProcessLaunch::new(exe);
    launch.args = args;
    launch.cwd = env::current_dir().ok();
    SystemProcessLauncher.launch_process(&launch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_launch_runs_from_executable_directory() {
        let launch = ProcessLaunch::new("/games/xlabs/data/s1x/s1x.exe");
        assert_eq!(launch.cwd, Some(PathBuf::from("/games/xlabs/data/s1x")));
        assert!(launch.args.is_empty());
    }

    #[test]
    fn with_arg_line_splits_quoted_arguments() {
        let launch = ProcessLaunch::new("game.exe")
            .with_arg_line("-singleplayer +set name \"Big Red\"")
            .expect("valid arg line");
        assert_eq!(
            launch.args,
            vec!["-singleplayer", "+set", "name", "Big Red"]
        );
    }

    #[test]
    fn with_arg_line_rejects_unbalanced_quotes() {
        assert!(ProcessLaunch::new("game.exe")
            .with_arg_line("-singleplayer \"unterminated")
            .is_err());
    }

    #[test]
    fn debug_command_lists_program_then_args() {
        let launch = ProcessLaunch::new("game.exe")
            .with_arg_line("-zombies")
            .expect("valid arg line")
            .with_env("XLABS_AW_INSTALL", "C:/AW");
        assert_eq!(launch.debug_command(), vec!["game.exe", "-zombies"]);
        assert_eq!(
            launch.env,
            vec![("XLABS_AW_INSTALL".to_string(), "C:/AW".to_string())]
        );
    }

    #[test]
    fn build_relaunch_args_replaces_channel_flags() {
        let args = build_relaunch_args(
            vec![
                "-nosteam".to_string(),
                CHANNEL_MAIN_FLAG.to_string(),
                SUBPROCESS_FLAG.to_string(),
            ],
            &[CHANNEL_DEVELOP_FLAG],
        );
        assert_eq!(args, vec!["-nosteam", CHANNEL_DEVELOP_FLAG]);
    }

    #[test]
    fn current_process_is_alive_and_has_parent() {
        assert!(process_is_alive(process::id()));
        assert!(get_parent_pid().is_some());
    }

    #[test]
    fn wait_for_process_returns_after_child_exits() {
        let mut child = Command::new(env::current_exe().expect("test binary path"))
            .arg("--list")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn child");
        let pid = child.id();
        child.wait().expect("child exits");

        wait_for_process(pid);
        assert!(!process_is_alive(pid));
    }
}
