use crate::config::Config;
use crate::minecraft::settings::ServerSettings;
use crate::properties::{self, Properties, create_property_file};
use color_eyre::Result;
use color_eyre::eyre::{ContextCompat, WrapErr};
use log::{debug, warn};
use once_cell::sync::Lazy;
use std::io;
use std::path::{Path, PathBuf};

static DEFAULT_PROPERTIES: Lazy<Properties> =
    Lazy::new(|| properties::parse(include_str!("../resources/server.properties")));

/// First port of the configured range that isn't in `taken`.
pub fn free_port(config: &Config, taken: &[u16]) -> Option<u16> {
    config
        .world
        .port_range
        .clone()
        .find(|port| !taken.contains(port))
}

/// Ports assigned to the server directories directly under `root`.
///
/// Directories without a `server.properties` are skipped, as are files whose port can't be
/// read. A missing `root` has no ports in use.
pub async fn ports_in_use(root: &Path) -> Result<Vec<u16>> {
    let mut ports = vec![];
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ports),
        Err(err) => return Err(err).wrap_err_with(|| format!("failed to list {}", root.display())),
    };

    while let Some(entry) = entries
        .next_entry()
        .await
        .wrap_err_with(|| format!("failed to list {}", root.display()))?
    {
        let files = ServerFiles::new(entry.path());
        let path = files.properties_path();
        if !path.is_file() {
            continue;
        }
        match properties::load(&path).await {
            Ok(properties) => match ServerSettings::from(properties).port() {
                Ok(Some(port)) => ports.push(port),
                Ok(None) => {}
                Err(err) => warn!("ignoring the port of {}: {err}", path.display()),
            },
            Err(err) => warn!("failed to read {}: {err}", path.display()),
        }
    }

    Ok(ports)
}

/// The files of a single server directory.
#[derive(Debug, Clone)]
pub struct ServerFiles {
    directory: PathBuf,
}

impl ServerFiles {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn properties_path(&self) -> PathBuf {
        self.directory.join("server.properties")
    }

    pub fn eula_path(&self) -> PathBuf {
        self.directory.join("eula.txt")
    }

    /// Loads `server.properties`, falling back to the bundled template if there is none yet.
    pub async fn load_settings(&self) -> Result<ServerSettings> {
        let path = self.properties_path();
        match properties::load(&path).await {
            Ok(properties) => Ok(properties.into()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!("{} doesn't exist, using the default properties", path.display());
                Ok(DEFAULT_PROPERTIES.clone().into())
            }
            Err(err) => Err(err).wrap_err_with(|| format!("failed to read {}", path.display())),
        }
    }

    /// Prepares the directory for starting a server on it.
    ///
    /// Keeps whatever the user already changed in `server.properties`, fills in the configured
    /// defaults and points both the game and the query port at `port`. Without a port, the one
    /// already in the file is kept, or the first port of the configured range not in `taken`
    /// is used.
    pub async fn initialise(
        &self,
        port: Option<u16>,
        taken: &[u16],
        config: &Config,
    ) -> Result<ServerSettings> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .wrap_err_with(|| format!("failed to create {}", self.directory.display()))?;

        let mut settings = self.load_settings().await?;
        settings.apply_defaults(&config.world_defaults);

        let port = match port {
            Some(port) => port,
            None => match settings.port()? {
                Some(port) => port,
                None => free_port(config, taken).with_context(|| {
                    format!("no free port left in {:?}", config.world.port_range)
                })?,
            },
        };
        debug!("using port {} for {}", port, self.directory.display());
        settings.set_port(port);
        settings.set_query_port(port);

        let path = self.properties_path();
        settings
            .properties()
            .save(&path)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;

        if config.world.accept_eula {
            self.accept_eula().await?;
        }

        Ok(settings)
    }

    pub async fn accept_eula(&self) -> Result<()> {
        let mut eula = create_property_file();
        eula.add_comment("By changing the setting below to TRUE you are indicating your agreement to our EULA (https://aka.ms/MinecraftEULA).");
        eula.set("eula", true);

        let path = self.eula_path();
        eula.save(&path)
            .await
            .wrap_err_with(|| format!("failed to write {}", path.display()))
    }
}
