use std::env;

use url::Url;

use crate::{
    update_channel::UpdateChannel, DEFAULT_UPDATE_ENDPOINT_DEVELOP, DEFAULT_UPDATE_ENDPOINT_MAIN,
    SINGLETON_ENV, UPDATE_CHECK_ENV, UPDATE_ENDPOINT_DEVELOP_ENV, UPDATE_ENDPOINT_MAIN_ENV,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LauncherConfig {
    pub(crate) update_check_enabled: bool,
    pub(crate) singleton_enabled: bool,
    pub(crate) update_endpoint_main: String,
    pub(crate) update_endpoint_develop: String,
}

impl LauncherConfig {
    pub(crate) fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok(), cfg!(debug_assertions))
    }

    /// Release builds check for updates and hold the singleton lock unless
    /// switched off; debug builds do neither unless switched on.
    pub(crate) fn from_lookup<F>(lookup: F, debug_build: bool) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let toggle = |key: &str| {
            lookup(key)
                .and_then(|value| parse_toggle(&value))
                .unwrap_or(!debug_build)
        };
        let endpoint = |key: &str, fallback: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            update_check_enabled: toggle(UPDATE_CHECK_ENV),
            singleton_enabled: toggle(SINGLETON_ENV),
            update_endpoint_main: endpoint(UPDATE_ENDPOINT_MAIN_ENV, DEFAULT_UPDATE_ENDPOINT_MAIN),
            update_endpoint_develop: endpoint(
                UPDATE_ENDPOINT_DEVELOP_ENV,
                DEFAULT_UPDATE_ENDPOINT_DEVELOP,
            ),
        }
    }

    pub(crate) fn update_endpoint(&self, channel: UpdateChannel) -> Result<Url, String> {
        let raw = match channel {
            UpdateChannel::Main => &self.update_endpoint_main,
            UpdateChannel::Develop => &self.update_endpoint_develop,
        };
        Url::parse(raw).map_err(|error| format!("Invalid update endpoint '{raw}': {error}"))
    }
}

fn parse_toggle(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
