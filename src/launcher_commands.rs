use std::sync::Arc;

use serde_json::Value;

use crate::{
    append_command_log,
    browser_host::UiControl,
    command_table::{CommandHandler, CommandTable},
    game_catalog::{GameFamily, GAME_FAMILIES},
    launch_coordinator::LaunchCoordinator,
    property_store::PropertyStore,
    update_channel::{ChannelState, UpdateChannel},
};

pub(crate) const COMMAND_BROWSE_FOLDER: &str = "browse-folder";
pub(crate) const COMMAND_CLOSE: &str = "close";
pub(crate) const COMMAND_MINIMIZE: &str = "minimize";
pub(crate) const COMMAND_SHOW: &str = "show";
pub(crate) const COMMAND_GET_PROPERTY: &str = "get-property";
pub(crate) const COMMAND_SET_PROPERTY: &str = "set-property";
pub(crate) const COMMAND_GET_CHANNEL: &str = "get-channel";
pub(crate) const COMMAND_SWITCH_CHANNEL: &str = "switch-channel";

/// Collaborators shared by the launcher's command handlers.
#[derive(Clone)]
pub(crate) struct LauncherContext {
    pub(crate) ui: Arc<dyn UiControl>,
    pub(crate) properties: Arc<PropertyStore>,
    pub(crate) coordinator: Arc<LaunchCoordinator>,
    pub(crate) channel: Arc<ChannelState>,
}

struct LaunchGameCommand {
    family: &'static GameFamily,
    coordinator: Arc<LaunchCoordinator>,
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for LaunchGameCommand {
    fn invoke(&self, request: &Value) -> Result<Option<Value>, String> {
        let Some(token) = request.as_str() else {
            return Ok(None);
        };

        let outcome = self
            .coordinator
            .handle_launch_request(self.family, token, self.ui.as_ref());
        append_command_log(&format!(
            "{} '{token}' -> {outcome:?}",
            self.family.command_name()
        ));
        Ok(None)
    }
}

struct BrowseFolderCommand {
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for BrowseFolderCommand {
    fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
        Ok(self.ui.pick_folder().map(Value::String))
    }
}

struct CloseCommand {
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for CloseCommand {
    fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
        self.ui.close_browser();
        Ok(None)
    }
}

struct MinimizeCommand {
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for MinimizeCommand {
    fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
        self.ui.minimize_window();
        Ok(None)
    }
}

struct ShowCommand {
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for ShowCommand {
    fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
        self.ui.show_window();
        Ok(None)
    }
}

struct GetPropertyCommand {
    properties: Arc<PropertyStore>,
}

impl CommandHandler for GetPropertyCommand {
    fn invoke(&self, request: &Value) -> Result<Option<Value>, String> {
        let Some(key) = request.as_str() else {
            return Ok(None);
        };
        Ok(self.properties.load(key).map(Value::String))
    }
}

struct SetPropertyCommand {
    properties: Arc<PropertyStore>,
}

impl CommandHandler for SetPropertyCommand {
    /// Non-string values are skipped; the whole batch runs under one lock.
    fn invoke(&self, request: &Value) -> Result<Option<Value>, String> {
        let Some(entries) = request.as_object() else {
            return Ok(None);
        };

        let guard = self.properties.lock();
        for (key, value) in entries {
            let Some(value) = value.as_str() else {
                continue;
            };
            if guard.load(key).as_deref() != Some(value) {
                guard.store(key, value)?;
            }
        }
        Ok(None)
    }
}

struct GetChannelCommand {
    channel: Arc<ChannelState>,
}

impl CommandHandler for GetChannelCommand {
    fn invoke(&self, _request: &Value) -> Result<Option<Value>, String> {
        let name = if self.channel.is_main_channel() {
            UpdateChannel::Main.ui_name()
        } else {
            UpdateChannel::Develop.ui_name()
        };
        Ok(Some(Value::String(name.to_string())))
    }
}

struct SwitchChannelCommand {
    channel: Arc<ChannelState>,
    ui: Arc<dyn UiControl>,
}

impl CommandHandler for SwitchChannelCommand {
    fn invoke(&self, request: &Value) -> Result<Option<Value>, String> {
        let Some(raw) = request.as_str() else {
            return Ok(None);
        };

        let target = UpdateChannel::from_request(raw);
        if let Some(previous) = self.channel.pending_relaunch() {
            append_command_log(&format!(
                "replacing pending relaunch to {}",
                previous.ui_name()
            ));
        }
        append_command_log(&format!(
            "switching update channel to {}; relaunching on exit",
            target.ui_name()
        ));
        self.channel.schedule_relaunch(target);
        self.ui.close_browser();
        Ok(None)
    }
}

pub(crate) fn register_launcher_commands(table: &mut CommandTable, context: &LauncherContext) {
    for family in GAME_FAMILIES {
        table.register(
            family.command_name(),
            LaunchGameCommand {
                family,
                coordinator: Arc::clone(&context.coordinator),
                ui: Arc::clone(&context.ui),
            },
        );
    }

    table.register(
        COMMAND_BROWSE_FOLDER,
        BrowseFolderCommand {
            ui: Arc::clone(&context.ui),
        },
    );
    table.register(
        COMMAND_CLOSE,
        CloseCommand {
            ui: Arc::clone(&context.ui),
        },
    );
    table.register(
        COMMAND_MINIMIZE,
        MinimizeCommand {
            ui: Arc::clone(&context.ui),
        },
    );
    table.register(
        COMMAND_SHOW,
        ShowCommand {
            ui: Arc::clone(&context.ui),
        },
    );
    table.register(
        COMMAND_GET_PROPERTY,
        GetPropertyCommand {
            properties: Arc::clone(&context.properties),
        },
    );
    table.register(
        COMMAND_SET_PROPERTY,
        SetPropertyCommand {
            properties: Arc::clone(&context.properties),
        },
    );
    table.register(
        COMMAND_GET_CHANNEL,
        GetChannelCommand {
            channel: Arc::clone(&context.channel),
        },
    );
    table.register(
        COMMAND_SWITCH_CHANNEL,
        SwitchChannelCommand {
            channel: Arc::clone(&context.channel),
            ui: Arc::clone(&context.ui),
        },
    );
}
