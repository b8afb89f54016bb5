use eyre::{Context, Result};
use polytally::domain::DEFAULT_DISCRIMINANT_INDEX;
use polytally::simulator::ProcessConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub simulator: SimulatorConfig,
    pub result: ResultConfig,
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Process,
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub backend: Backend,
    pub command: String,
    pub env: BTreeMap<String, String>,
    pub working_dir: Option<PathBuf>,
    pub timeout_ms: u64,
    pub replay_path: Option<PathBuf>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Process,
            command: "dotnet run --project Polynom".to_string(),
            env: BTreeMap::new(),
            working_dir: None,
            timeout_ms: 300000,
            replay_path: None,
        }
    }
}

impl SimulatorConfig {
    pub fn process_config(&self) -> ProcessConfig {
        let mut config = ProcessConfig::new(self.command.clone()).timeout_ms(self.timeout_ms);
        for (key, value) in &self.env {
            config = config.env(key.clone(), value.clone());
        }
        if let Some(dir) = &self.working_dir {
            config = config.working_dir(dir.clone());
        }
        config
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResultConfig {
    pub discriminant_index: usize,
}

impl Default for ResultConfig {
    fn default() -> Self {
        Self {
            discriminant_index: DEFAULT_DISCRIMINANT_INDEX,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub pause_on_exit: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self { pause_on_exit: true }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            simulator: SimulatorConfig::default(),
            result: ResultConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// A config file that exists but cannot be read or parsed is an error,
    /// never a silent fall back to defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");
        let mut candidates = Vec::new();

        // Primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(project_name).join(format!("{}.yml", project_name)));
        }

        // Fallback location: ./<project>.yml
        candidates.push(PathBuf::from(format!("{}.yml", project_name)));

        Self::load_first_existing(&candidates)
    }

    /// Load the first candidate that exists, or defaults when none does.
    fn load_first_existing(candidates: &[PathBuf]) -> Result<Self> {
        match candidates.iter().find(|path| path.exists()) {
            Some(path) => {
                Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()))
            }
            None => {
                log::info!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}
