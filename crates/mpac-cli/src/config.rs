use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Bytes released per poll tick when nothing else is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Optional TOML configuration file.
///
/// ```toml
/// administrator = false
/// local_catalog = "formats.csv"
/// company_sources = ["company/bench.csv"]
/// chunk_size = 64
/// ```
///
/// Relative paths are resolved against the directory holding the file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    #[serde(default)]
    pub administrator: bool,
    pub local_catalog: Option<PathBuf>,
    #[serde(default)]
    pub company_sources: Vec<PathBuf>,
    pub chunk_size: Option<usize>,
}

impl MonitorConfig {
    pub fn from_toml(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn from_path(path: &Path) -> Result<Self, std::io::Error> {
        let contents = fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        Ok(config)
    }

    fn rebase(&mut self, base: &Path) {
        if let Some(local) = self.local_catalog.take() {
            self.local_catalog = Some(base.join(local));
        }
        for source in &mut self.company_sources {
            *source = base.join(&*source);
        }
    }
}

/// Effective settings after merging the config file with command-line flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub administrator: bool,
    pub local_catalog: Option<PathBuf>,
    pub company_sources: Vec<PathBuf>,
    pub chunk_size: usize,
}

impl Settings {
    /// Flags win over the file; an empty `company` list keeps the file's.
    pub fn merge(
        config: MonitorConfig,
        administrator: bool,
        local_catalog: Option<PathBuf>,
        company_sources: Vec<PathBuf>,
        chunk_size: Option<usize>,
    ) -> Self {
        Self {
            administrator: administrator || config.administrator,
            local_catalog: local_catalog.or(config.local_catalog),
            company_sources: if company_sources.is_empty() {
                config.company_sources
            } else {
                company_sources
            },
            chunk_size: chunk_size
                .or(config.chunk_size)
                .unwrap_or(DEFAULT_CHUNK_SIZE),
        }
    }
}
