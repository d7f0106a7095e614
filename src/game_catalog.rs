/// Read-only table from UI launch token to game command-line arguments.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArgMapping(&'static [(&'static str, &'static str)]);

impl ArgMapping {
    pub(crate) fn resolve(&self, token: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(candidate, _)| *candidate == token)
            .map(|(_, arg)| *arg)
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self) -> impl Iterator<Item = &'static str> {
        self.0.iter().map(|(token, _)| *token)
    }
}

#[derive(Debug)]
pub(crate) struct GameFamily {
    pub(crate) id: &'static str,
    /// Property holding the game's install folder.
    pub(crate) install_property: &'static str,
    /// Variable telling the client where the game is installed.
    pub(crate) install_env: &'static str,
    /// Client executable, relative to the launcher base path.
    pub(crate) executable: &'static str,
    pub(crate) arg_mapping: ArgMapping,
}

impl GameFamily {
    pub(crate) fn command_name(&self) -> String {
        format!("launch-{}", self.id)
    }
}

pub(crate) const ADVANCED_WARFARE: GameFamily = GameFamily {
    id: "aw",
    install_property: "aw-install",
    install_env: "XLABS_AW_INSTALL",
    executable: "data/s1x/s1x.exe",
    arg_mapping: ArgMapping(&[
        ("aw-sp", "-singleplayer"),
        ("aw-mp", "-multiplayer"),
        ("aw-zm", "-zombies"),
        ("aw-survival", "-survival"),
    ]),
};

pub(crate) const GHOSTS: GameFamily = GameFamily {
    id: "ghosts",
    install_property: "ghosts-install",
    install_env: "XLABS_GHOSTS_INSTALL",
    executable: "data/iw6x/iw6x.exe",
    arg_mapping: ArgMapping(&[
        ("ghosts-sp", "-singleplayer"),
        ("ghosts-mp", "-multiplayer"),
    ]),
};

pub(crate) static GAME_FAMILIES: [&GameFamily; 2] = [&ADVANCED_WARFARE, &GHOSTS];
