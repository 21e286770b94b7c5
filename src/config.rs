use crate::minecraft::settings::Difficulty;
use crate::util;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use log::debug;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub world: WorldConfig,
    pub world_defaults: WorldDefaults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorldConfig {
    pub port_range: Range<u16>,
    pub accept_eula: bool,
}

/// Values written into `server.properties` when the file doesn't define them yet
#[derive(Debug, Clone, Deserialize)]
pub struct WorldDefaults {
    pub difficulty: Difficulty,
    pub motd: String,
    pub max_players: u32,
}

impl Config {
    /// Loads the bundled defaults, overridden by `config_path` (or `config.toml` next to the
    /// executable) when that file exists.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_owned(),
            None => util::dirs::base_dir().join("config.toml"),
        };

        let mut config_builder = config::Config::builder().add_source(config::File::from_str(
            include_str!("resources/default_config.toml"),
            config::FileFormat::Toml,
        ));

        if config_path.exists() {
            debug!("loading config: {}", config_path.display());
            config_builder = config_builder.add_source(config::File::from(config_path.as_path()));
        }

        config_builder
            .build()
            .and_then(|config| config.try_deserialize::<Config>())
            .wrap_err_with(|| format!("failed to parse config {}", config_path.display()))
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(|| Config::load(None).expect("failed to parse config"));

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_log::test;

    #[test]
    fn bundled_defaults() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let config = Config::load(Some(dir.path().join("config.toml").as_path())).expect("failed to load config");

        assert_eq!(config.world.port_range, 25565..25665);
        assert!(!config.world.accept_eula);
        assert_eq!(config.world_defaults.difficulty, Difficulty::Easy);
        assert_eq!(config.world_defaults.max_players, 20);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[world]\naccept_eula = true\n\n[world_defaults]\ndifficulty = \"hard\"\n",
        )
        .expect("failed to write config");

        let config = Config::load(Some(path.as_path())).expect("failed to load config");

        assert!(config.world.accept_eula);
        assert_eq!(config.world.port_range, 25565..25665);
        assert_eq!(config.world_defaults.difficulty, Difficulty::Hard);
        assert_eq!(config.world_defaults.motd, "A CrackedCobble Server");
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[world_defaults]\ndifficulty = \"impossible\"\n").expect("failed to write config");

        assert!(Config::load(Some(path.as_path())).is_err());
    }
}
