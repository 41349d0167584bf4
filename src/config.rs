use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mock: MockConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockConfig {
    /// Single description document to mock
    pub file: Option<PathBuf>,
    /// Folder whose description documents are mocked together
    pub folder: Option<PathBuf>,
    /// Path segment of the control endpoint
    pub endpoint: String,
    /// Seed for reproducible random picks
    pub seed: Option<u64>,
}

/// Command-line flags; they override every other configuration source.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "ramlizer", version, about = "Mock HTTP server driven by an API description")]
pub struct Cli {
    /// Path to the description file to mock
    #[arg(short, long, conflicts_with = "folder")]
    pub file: Option<PathBuf>,

    /// Path to a folder of description files to mock together
    #[arg(short = 'd', long)]
    pub folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Path segment of the control endpoint
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Seed for reproducible random picks
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Where descriptions are loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptionSource {
    File(PathBuf),
    Folder(PathBuf),
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("either a description file or a description folder must be given")]
    MissingSource,
    #[error("a description file and a description folder cannot both be given")]
    ConflictingSources,
    #[error("the control endpoint must not be empty")]
    EmptyEndpoint,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            mock: MockConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            file: None,
            folder: None,
            endpoint: "ramlizer".to_string(),
            seed: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config file, environment and flags
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config file if it exists
        config = config.add_source(config::File::with_name("ramlizer").required(false));

        // Add environment variables with prefix "RAMLIZER_"
        config = config.add_source(
            config::Environment::with_prefix("RAMLIZER")
                .separator("_")
                .prefix_separator("_"),
        );

        config = config
            .set_override_option("mock.file", cli.file.as_ref().map(|p| p.display().to_string()))?
            .set_override_option("mock.folder", cli.folder.as_ref().map(|p| p.display().to_string()))?
            .set_override_option("mock.endpoint", cli.endpoint.clone())?
            .set_override_option("mock.seed", cli.seed.map(|seed| seed.to_string()))?
            .set_override_option("server.port", cli.port.map(|port| port.to_string()))?
            .set_override_option("server.host", cli.host.clone())?;

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// The single source of descriptions; file and folder are exclusive
    pub fn description_source(&self) -> Result<DescriptionSource, ConfigError> {
        match (&self.mock.file, &self.mock.folder) {
            (Some(_), Some(_)) => Err(ConfigError::ConflictingSources),
            (Some(file), None) => Ok(DescriptionSource::File(file.clone())),
            (None, Some(folder)) => Ok(DescriptionSource::Folder(folder.clone())),
            (None, None) => Err(ConfigError::MissingSource),
        }
    }

    /// Control endpoint path, e.g. `/ramlizer`
    pub fn control_path(&self) -> Result<String, ConfigError> {
        let segment = self.mock.endpoint.trim().trim_matches('/');
        if segment.is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        Ok(format!("/{}", segment))
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
