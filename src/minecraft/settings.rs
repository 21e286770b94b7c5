use crate::config::WorldDefaults;
use crate::properties::Properties;
use color_eyre::Result;
use color_eyre::eyre::{bail, eyre};
use serde::Deserialize;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const SERVER_PORT: &str = "server-port";
pub const QUERY_PORT: &str = "query.port";
pub const DIFFICULTY: &str = "difficulty";
pub const MOTD: &str = "motd";
pub const MAX_PLAYERS: &str = "max-players";
pub const ONLINE_MODE: &str = "online-mode";
pub const LEVEL_NAME: &str = "level-name";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Peaceful,
    Easy,
    Normal,
    Hard,
}

impl FromStr for Difficulty {
    type Err = color_eyre::Report;

    /// Accepts both the names and the numeric ids older servers write.
    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "peaceful" | "0" => Difficulty::Peaceful,
            "easy" | "1" => Difficulty::Easy,
            "normal" | "2" => Difficulty::Normal,
            "hard" | "3" => Difficulty::Hard,
            _ => bail!("unknown difficulty {s:?}"),
        })
    }
}

impl Display for Difficulty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Difficulty::Peaceful => "peaceful",
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        write!(f, "{name}")
    }
}

/// Typed access to the `server.properties` keys the manager cares about.
///
/// Everything else in the file is left untouched, comments and order included.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    properties: Properties,
}

impl ServerSettings {
    pub fn new(properties: Properties) -> Self {
        Self { properties }
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    fn parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.properties.get(key) {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|err| eyre!("invalid value {value:?} for {key}: {err}")),
        }
    }

    pub fn port(&self) -> Result<Option<u16>> {
        self.parsed(SERVER_PORT)
    }

    pub fn set_port(&mut self, port: u16) {
        self.properties.set(SERVER_PORT, port);
    }

    pub fn query_port(&self) -> Result<Option<u16>> {
        self.parsed(QUERY_PORT)
    }

    pub fn set_query_port(&mut self, port: u16) {
        self.properties.set(QUERY_PORT, port);
    }

    pub fn difficulty(&self) -> Result<Option<Difficulty>> {
        self.parsed(DIFFICULTY)
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.properties.set(DIFFICULTY, difficulty);
    }

    pub fn motd(&self) -> Option<&str> {
        self.properties.get(MOTD)
    }

    pub fn set_motd(&mut self, motd: &str) {
        self.properties.set(MOTD, motd);
    }

    pub fn max_players(&self) -> Result<Option<u32>> {
        self.parsed(MAX_PLAYERS)
    }

    pub fn set_max_players(&mut self, max_players: u32) {
        self.properties.set(MAX_PLAYERS, max_players);
    }

    pub fn online_mode(&self) -> Result<Option<bool>> {
        self.parsed(ONLINE_MODE)
    }

    pub fn set_online_mode(&mut self, online_mode: bool) {
        self.properties.set(ONLINE_MODE, online_mode);
    }

    pub fn level_name(&self) -> Option<&str> {
        self.properties.get(LEVEL_NAME)
    }

    /// Fills in the configured defaults for keys the file doesn't define.
    pub fn apply_defaults(&mut self, defaults: &WorldDefaults) {
        if !self.properties.contains_key(DIFFICULTY) {
            self.set_difficulty(defaults.difficulty);
        }
        if !self.properties.contains_key(MOTD) {
            self.set_motd(&defaults.motd);
        }
        if !self.properties.contains_key(MAX_PLAYERS) {
            self.set_max_players(defaults.max_players);
        }
    }
}

impl From<Properties> for ServerSettings {
    fn from(properties: Properties) -> Self {
        Self::new(properties)
    }
}
