// Required external crates for configuration management and serialization
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use config::{Config, ConfigError, Environment, File};

/// Which implementation serves image predictions
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageBackendKind {
    /// Random probabilities, for demos and development
    Mock,
    /// REST model server speaking the TensorFlow Serving predict format
    Remote,
}

/// Configuration for the image classifier
#[derive(Debug, Deserialize, Clone)]
pub struct ImageModelConfig {
    /// Backend used to produce predictions
    pub backend: ImageBackendKind,
    /// Predict endpoint of the remote model server
    #[serde(default)]
    pub endpoint: String,
    /// Width and height images are resized to before inference
    pub input_size: u32,
    /// Request timeout for the remote backend
    pub timeout_secs: u64,
    /// Class labels, in the order of the model's output layer
    pub labels: Vec<String>,
    /// Optional seed for the mock backend
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Configuration for the hosted zero-shot text classifier
#[derive(Debug, Deserialize, Clone)]
pub struct ZeroShotConfig {
    /// Whether to call the zero-shot model at all
    pub enabled: bool,
    /// Base URL of the inference API
    pub base_url: String,
    /// Model identifier on the inference API
    pub model: String,
    /// Bearer token for the inference API
    #[serde(default)]
    pub api_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Configuration for symptom analysis
#[derive(Debug, Deserialize, Clone)]
pub struct SymptomModelConfig {
    /// Optional JSON condition catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    /// Minimum zero-shot confidence (percent) needed to override keyword matching
    pub threshold: f32,
    /// Hypothesis sentence, `{}` is replaced by each candidate condition
    pub hypothesis_template: String,
    /// Zero-shot classifier settings
    pub zero_shot: ZeroShotConfig,
}

/// Configuration for both models
#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    pub image: ImageModelConfig,
    pub symptoms: SymptomModelConfig,
}

/// Configuration for the HTTP server
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port number to listen on
    pub port: u16,
    /// Origin allowed to call the API from a browser
    pub frontend_url: String,
    /// Largest accepted request body, image uploads included
    pub max_upload_bytes: usize,
}

/// Configuration for application logging
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Optional log directory
    pub file: Option<PathBuf>,
}

/// Main settings struct that contains all configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Server-related settings
    pub server: ServerConfig,
    /// Model-related settings
    pub models: ModelsConfig,
    /// Logging-related settings
    pub logging: LoggingConfig,
}

impl Settings {
    /// Creates a new Settings instance from the `config` directory under the
    /// current working directory.
    pub fn new() -> Result<Self, ConfigError> {
        let config_dir = std::env::current_dir()
            .map_err(|e| ConfigError::Message(
                format!("Failed to get current directory: {}", e)
            ))?
            .join("config");

        Self::load(&config_dir)
    }

    /// Loads settings from `config_dir` in the following order of precedence
    /// (highest to lowest):
    /// 1. Environment variables prefixed with MEDI__ (e.g. MEDI__SERVER__PORT)
    /// 2. Local config file (local.toml) if present
    /// 3. Default config file (default.toml)
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        if !config_dir.exists() {
            return Err(ConfigError::Message(
                format!("Config directory not found at: {}", config_dir.display())
            ));
        }

        let default_config = config_dir.join("default.toml");
        if !default_config.exists() {
            return Err(ConfigError::Message(
                format!("Default configuration file not found at: {}", default_config.display())
            ));
        }

        let local_config = config_dir.join("local.toml");

        let default_config_path = default_config.to_string_lossy();
        let local_config_path = local_config.to_string_lossy();

        let settings = Config::builder()
            .add_source(File::with_name(&default_config_path))
            .add_source(File::with_name(&local_config_path).required(false))
            .add_source(
                Environment::with_prefix("MEDI")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Port must be between 1 and 65535, got: 0".to_string()));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Message(
                "max_upload_bytes must be greater than 0".to_string()
            ));
        }

        let image = &self.models.image;
        if image.input_size == 0 {
            return Err(ConfigError::Message("input_size must be greater than 0".to_string()));
        }
        if image.labels.is_empty() {
            return Err(ConfigError::Message("At least one image class label is required".to_string()));
        }
        let unique: HashSet<&str> = image.labels.iter().map(String::as_str).collect();
        if unique.len() != image.labels.len() {
            return Err(ConfigError::Message("Image class labels must be unique".to_string()));
        }
        if image.backend == ImageBackendKind::Remote && image.endpoint.trim().is_empty() {
            return Err(ConfigError::Message(
                "endpoint is required when the image backend is remote".to_string()
            ));
        }

        let symptoms = &self.models.symptoms;
        if !(0.0..=100.0).contains(&symptoms.threshold) {
            return Err(ConfigError::Message(
                format!("threshold must be between 0 and 100, got: {}", symptoms.threshold)
            ));
        }
        if !symptoms.hypothesis_template.contains("{}") {
            return Err(ConfigError::Message(
                "hypothesis_template must contain a {} placeholder".to_string()
            ));
        }
        if symptoms.zero_shot.enabled
            && (symptoms.zero_shot.base_url.trim().is_empty() || symptoms.zero_shot.model.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "base_url and model are required when zero-shot classification is enabled".to_string()
            ));
        }

        // Validate logging level
        match self.logging.level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            _ => Err(ConfigError::Message(
                format!("Invalid logging level: {}. Must be one of: error, warn, info, debug, trace",
                    self.logging.level)
            )),
        }?;

        // Create log directory if configured and doesn't exist
        if let Some(log_dir) = &self.logging.file {
            if !log_dir.exists() {
                std::fs::create_dir_all(log_dir).map_err(|e| {
                    ConfigError::Message(format!(
                        "Failed to create log directory at {}: {}",
                        log_dir.display(), e
                    ))
                })?;
            }
        }

        Ok(())
    }
}
