use std::sync::Mutex;

use crate::{
    append_launcher_log, property_store::PropertyStore, startup_mode::CommandLine,
    CHANNEL_DEVELOP_FLAG, CHANNEL_MAIN_FLAG, CHANNEL_PROPERTY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UpdateChannel {
    Main,
    Develop,
}

impl UpdateChannel {
    /// Name reported to the UI by `get-channel`.
    pub(crate) fn ui_name(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Develop => "dev",
        }
    }

    /// Anything other than `"main"` selects the develop channel.
    pub(crate) fn from_request(raw: &str) -> Self {
        if raw == "main" {
            Self::Main
        } else {
            Self::Develop
        }
    }

    pub(crate) fn relaunch_flag(self) -> &'static str {
        match self {
            Self::Main => CHANNEL_MAIN_FLAG,
            Self::Develop => CHANNEL_DEVELOP_FLAG,
        }
    }

    pub(crate) fn from_command_line(command_line: &CommandLine) -> Option<Self> {
        if command_line.contains(CHANNEL_DEVELOP_FLAG) {
            Some(Self::Develop)
        } else if command_line.contains(CHANNEL_MAIN_FLAG) {
            Some(Self::Main)
        } else {
            None
        }
    }

    fn from_property(raw: &str) -> Option<Self> {
        match raw {
            "main" => Some(Self::Main),
            "dev" => Some(Self::Develop),
            _ => None,
        }
    }
}

/// Channel of the running process plus the relaunch scheduled by
/// `switch-channel`, which runs once the process exits.
#[derive(Debug)]
pub(crate) struct ChannelState {
    current: UpdateChannel,
    explicit: bool,
    pending_relaunch: Mutex<Option<UpdateChannel>>,
}

impl ChannelState {
    pub(crate) fn new(current: UpdateChannel) -> Self {
        Self {
            current,
            explicit: false,
            pending_relaunch: Mutex::new(None),
        }
    }

    /// Command-line flag first (persisted for later plain starts), then the
    /// persisted property, then main.
    pub(crate) fn resolve(command_line: &CommandLine, properties: &PropertyStore) -> Self {
        if let Some(channel) = UpdateChannel::from_command_line(command_line) {
            if let Err(error) = properties.store(CHANNEL_PROPERTY, channel.ui_name()) {
                append_launcher_log(&format!("failed to persist update channel: {error}"));
            }
            return Self {
                explicit: true,
                ..Self::new(channel)
            };
        }

        let persisted = properties
            .load(CHANNEL_PROPERTY)
            .and_then(|raw| UpdateChannel::from_property(&raw));
        Self::new(persisted.unwrap_or(UpdateChannel::Main))
    }

    pub(crate) fn current(&self) -> UpdateChannel {
        self.current
    }

    pub(crate) fn is_main_channel(&self) -> bool {
        self.current == UpdateChannel::Main
    }

    /// Whether this process was started with a channel flag, i.e. right
    /// after a channel switch.
    pub(crate) fn is_explicit(&self) -> bool {
        self.explicit
    }

    pub(crate) fn schedule_relaunch(&self, channel: UpdateChannel) {
        let mut pending = self
            .pending_relaunch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *pending = Some(channel);
    }

    pub(crate) fn pending_relaunch(&self) -> Option<UpdateChannel> {
        *self
            .pending_relaunch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn take_pending_relaunch(&self) -> Option<UpdateChannel> {
        self.pending_relaunch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}
