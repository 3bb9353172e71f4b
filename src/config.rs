use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "folio", about = "Social portfolio backend with a pricing calculator")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Start with an empty store instead of the demo data
    #[arg(long)]
    pub no_seed: bool,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub calculator: CalculatorConfig,
    pub uploads: UploadsConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub seed: bool,
}

/// Starting values for the calculator form.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CalculatorConfig {
    pub tax_rate: String,
    pub profit_margin: String,
    pub reinvestment_rate: u8,
    pub currency_symbol: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UploadsConfig {
    pub max_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed: true }
    }
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            tax_rate: "10".to_string(),
            profit_margin: "30".to_string(),
            reinvestment_rate: 25,
            currency_symbol: "R$".to_string(),
        }
    }
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = match cli.config.clone() {
            Some(path) => Some(path),
            None => Self::default_path(),
        };

        let mut config = match config_path {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str(&content)?
            }
            _ => Config::default(),
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if cli.no_seed {
            config.store.seed = false;
        }

        Ok(config)
    }

    /// `~/.folio/config.toml`, if a home directory exists.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".folio").join("config.toml"))
    }
}
