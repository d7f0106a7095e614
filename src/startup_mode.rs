use std::env;

use crate::{DEDICATED_FLAG, SUBPROCESS_FLAG, UPDATE_ONLY_FLAG};

/// Process arguments joined into one line. Markers are matched as
/// substrings, so `-dedicated` also matches `+set -dedicated_port`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CommandLine {
    args: Vec<String>,
    joined: String,
}

impl CommandLine {
    /// Current process arguments without the program path.
    pub(crate) fn from_env() -> Self {
        Self::from_args(env::args().skip(1))
    }

    pub(crate) fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let joined = args.join(" ");
        Self { args, joined }
    }

    pub(crate) fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn contains(&self, marker: &str) -> bool {
        self.joined.contains(marker)
    }

    pub(crate) fn is_subprocess(&self) -> bool {
        self.contains(SUBPROCESS_FLAG)
    }

    pub(crate) fn is_dedicated(&self) -> bool {
        !self.is_subprocess() && (self.contains(DEDICATED_FLAG) || self.contains(UPDATE_ONLY_FLAG))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StartupMode {
    /// Helper process spawned by the browser engine.
    Subprocess,
    /// Headless run: update check only, no UI.
    Dedicated,
    Interactive,
}

impl StartupMode {
    pub(crate) fn shows_ui(self) -> bool {
        matches!(self, Self::Interactive)
    }
}

pub(crate) fn resolve_startup_mode(command_line: &CommandLine) -> StartupMode {
    if command_line.is_subprocess() {
        StartupMode::Subprocess
    } else if command_line.is_dedicated() {
        StartupMode::Dedicated
    } else {
        StartupMode::Interactive
    }
}
