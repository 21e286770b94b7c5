use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use crackedcobble::config::{CONFIG, Config};
use crackedcobble::minecraft::files::{ServerFiles, ports_in_use};
use crackedcobble::properties::{self, FileStorage, Filesystem, Properties};
use crackedcobble::util;
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Reads and edits the `.properties` files of Minecraft servers
#[derive(Parser)]
#[command(name = "crackedcobble", version)]
struct Cli {
    /// Path to the configuration file (defaults to config.toml next to the executable)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the value of a property
    Get { file: PathBuf, key: String },
    /// Set a property, replacing its current value if there is one
    Set {
        file: PathBuf,
        key: String,
        value: String,
    },
    /// Append a property, even if the key is already defined
    Add {
        file: PathBuf,
        key: String,
        value: String,
    },
    /// Rewrite a properties file in its normalized form
    Fmt {
        file: PathBuf,
        /// Only check whether the file is already normalized
        #[arg(long)]
        check: bool,
    },
    /// Print the normalized form of a properties file
    Show { file: PathBuf },
    /// Prepare a server directory: server.properties, ports and eula.txt
    Init {
        /// Name of the server directory
        name: String,
        /// Directory holding the servers (defaults to data/servers next to the executable)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Port for the server, otherwise the one already configured is kept or a free one is picked
        #[arg(short, long)]
        port: Option<u16>,
    },
}

async fn load_file(file: &Path) -> Result<Properties> {
    properties::load(file)
        .await
        .wrap_err_with(|| format!("failed to read {}", file.display()))
}

async fn save_file(properties: &Properties, file: &Path) -> Result<()> {
    properties
        .save(file)
        .await
        .wrap_err_with(|| format!("failed to write {}", file.display()))
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Command::Get { file, key } => {
            let properties = load_file(&file).await?;
            match properties.get(&key) {
                Some(value) => writeln!(out, "{value}")?,
                None => bail!("{key} is not set in {}", file.display()),
            }
        }
        Command::Set { file, key, value } => {
            let mut properties = load_file(&file).await?;
            properties.set(&key, value);
            save_file(&properties, &file).await?;
        }
        Command::Add { file, key, value } => {
            let mut properties = load_file(&file).await?;
            properties.add_property(&key, value);
            save_file(&properties, &file).await?;
        }
        Command::Fmt { file, check } => {
            let contents = Filesystem
                .read_file(&file)
                .await
                .wrap_err_with(|| format!("failed to read {}", file.display()))?;
            let properties = properties::parse(&contents);
            if properties.stringify() == contents {
                info!("{} is already normalized", file.display());
            } else if check {
                bail!("{} is not normalized", file.display());
            } else {
                save_file(&properties, &file).await?;
                info!("normalized {}", file.display());
            }
        }
        Command::Show { file } => {
            let properties = load_file(&file).await?;
            write!(out, "{properties}")?;
        }
        Command::Init { name, root, port } => {
            let config = match cli.config {
                Some(path) => Config::load(Some(path.as_path()))?,
                None => CONFIG.clone(),
            };
            let root = root.unwrap_or_else(util::dirs::servers_dir);
            let taken = ports_in_use(&root).await?;
            let settings = ServerFiles::new(root.join(name))
                .initialise(port, &taken, &config)
                .await?;
            if let Some(port) = settings.port()? {
                writeln!(out, "{port}")?;
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();

    run(Cli::parse(), &mut std::io::stdout().lock()).await
}
