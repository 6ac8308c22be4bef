use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IMAGE_DIR: &str = "db/imagens";

/// Service configuration parsed from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub image_dir: PathBuf,
    pub redis_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            redis_url: None,
        }
    }
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let image_dir = lookup("IMAGE_DIR")
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGE_DIR));

        let redis_url = lookup("REDIS_URL").filter(|u| !u.is_empty());

        Self {
            port,
            image_dir,
            redis_url,
        }
    }
}
