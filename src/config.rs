use serde::Deserialize;
use tch::Device;
use validator::{Validate, ValidationError};
use validator_derive::Validate;

use std::path::{Path, PathBuf};

use crate::ruler::{default_patterns, PatternRule};
use crate::Result;

pub const DEFAULT_CONFIG: &str = "finner.toml";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BaseModel {
    Bert,
    None,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBackend {
    Vader,
    Bert,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: String,

    #[serde(default = "default_debug")]
    pub debug: bool,

    #[serde(default)]
    #[validate(custom = "ensure_model_files")]
    pub model_dir: Option<String>,

    #[serde(default = "default_base_model")]
    pub base_model: BaseModel,

    #[serde(default = "default_sentiment")]
    pub sentiment: SentimentBackend,

    #[serde(default = "default_overwrite_ents")]
    pub overwrite_ents: bool,

    /// Keep the transformer models off the GPU even when CUDA is present.
    #[serde(default)]
    pub cpu_only: bool,

    #[serde(default = "default_patterns")]
    #[validate]
    pub patterns: Vec<PatternRule>,

    #[serde(default)]
    #[validate]
    pub train: TrainConfig,
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct TrainConfig {
    #[serde(default = "default_iterations")]
    #[validate(range(min = 1, max = 100000))]
    pub iterations: usize,

    #[serde(default = "default_drop")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub drop: f64,

    #[serde(default)]
    pub seed: Option<u64>,

    #[serde(default = "default_output")]
    #[validate(length(min = 1))]
    pub output: String,

    #[serde(default)]
    pub data: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            drop: default_drop(),
            seed: None,
            output: default_output(),
            data: None,
        }
    }
}

impl Config {
    /// Read and validate a config file. A missing file gives the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            toml::from_str(&std::fs::read_to_string(path)?)?
        } else {
            toml::from_str("")?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn device(&self) -> Device {
        if self.cpu_only {
            Device::Cpu
        } else {
            Device::cuda_if_available()
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_debug() -> bool {
    false
}

fn default_base_model() -> BaseModel {
    BaseModel::Bert
}

fn default_sentiment() -> SentimentBackend {
    SentimentBackend::Vader
}

fn default_overwrite_ents() -> bool {
    true
}

fn default_iterations() -> usize {
    100
}

fn default_drop() -> f64 {
    0.35
}

fn default_output() -> String {
    "trained_model_final".to_string()
}

fn ensure_model_files(model_dir: &str) -> std::result::Result<(), ValidationError> {
    if !PathBuf::from(model_dir).is_dir() {
        Err(ValidationError::new("Tuned model directory missing"))
    } else if !PathBuf::from(format!("{}/meta.json", model_dir)).exists() {
        Err(ValidationError::new("Tuned model meta missing"))
    } else if !PathBuf::from(format!("{}/lexicon.json", model_dir)).exists() {
        Err(ValidationError::new("Tuned model lexicon missing"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_config_has_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind, "127.0.0.1:5000");
        assert_eq!(config.base_model, BaseModel::Bert);
        assert_eq!(config.sentiment, SentimentBackend::Vader);
        assert!(config.overwrite_ents);
        assert!(!config.cpu_only);
        assert_eq!(config.patterns, default_patterns());
        assert_eq!(config.train.iterations, 100);
        assert_eq!(config.train.drop, 0.35);
        assert_eq!(config.train.output, "trained_model_final");
    }

    #[test]
    fn reads_full_config() -> anyhow::Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        writeln!(
            file,
            r#"
            bind = "0.0.0.0:8080"
            debug = true
            base_model = "none"
            sentiment = "bert"

            [[patterns]]
            label = "STOCK"
            pattern = [{{ TEXT = "$" }}, {{ IS_UPPER = true }}]

            [[patterns]]
            label = "FIN_EVENT"
            pattern = [{{ LOWER = "flash" }}, {{ LOWER = "crash" }}]

            [train]
            iterations = 5
            drop = 0.0
            seed = 42
            "#
        )?;
        let config = Config::load(file.path())?;
        assert_eq!(config.bind, "0.0.0.0:8080");
        assert!(config.debug);
        assert_eq!(config.base_model, BaseModel::None);
        assert_eq!(config.sentiment, SentimentBackend::Bert);
        assert_eq!(config.patterns.len(), 2);
        assert_eq!(config.train.iterations, 5);
        assert_eq!(config.train.seed, Some(42));
        Ok(())
    }

    #[test]
    fn cpu_only_pins_models_to_cpu() {
        let config: Config = toml::from_str("cpu_only = true").unwrap();
        assert_eq!(config.device(), Device::Cpu);
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.device(), Device::cuda_if_available());
    }

    #[test]
    fn rejects_bad_values() {
        let config: Config = toml::from_str("[train]\ndrop = 1.5").unwrap();
        assert!(config.validate().is_err());
        let config: Config = toml::from_str("[train]\niterations = 0").unwrap();
        assert!(config.validate().is_err());
        let config: Config = toml::from_str("[[patterns]]\nlabel = \"STOCK\"\npattern = []").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_missing_model_dir() {
        let config: Config = toml::from_str("model_dir = \"/nonexistent/finner\"").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/finner.toml")).unwrap();
        assert_eq!(config.train.output, "trained_model_final");
    }
}
