//! Configuration system for Council
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (COUNCIL_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::persona::PersonaVoice;

/// Smallest accepted number of debate rounds
pub const MIN_ROUNDS: u32 = 1;
/// Largest accepted number of debate rounds
pub const MAX_ROUNDS: u32 = 100;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CouncilConfig {
    /// Chat-completion backend and model discovery
    pub model: ModelSettings,

    /// Debate defaults
    pub debate: DebateSettings,

    /// Transcript export
    pub export: ExportSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Which chat backend answers the council
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    /// Any OpenAI-compatible `/chat/completions` endpoint (Ollama, vLLM, OpenAI, ...)
    #[default]
    Openai,
    /// Offline deterministic responses
    Mock,
}

/// Where the list of available models comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiscoveryMethod {
    /// Run `ollama list` locally
    #[default]
    OllamaCli,
    /// GET `{base_url}/models`
    Api,
    /// Use `model.models` as-is
    Static,
}

/// How personas within a round are dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchMode {
    /// Fan out to all personas, bounded by `max_in_flight`
    #[default]
    Concurrent,
    /// One persona at a time, in seat order
    Sequential,
}

/// Model backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Backend provider
    pub provider: Provider,

    /// API base URL (e.g., "http://localhost:11434/v1", "https://api.openai.com/v1")
    pub base_url: String,

    /// API key (empty string for local servers like Ollama)
    pub api_key: String,

    /// Model to use when none is passed on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional cap on generated tokens per answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// How available models are discovered
    pub discovery: DiscoveryMethod,

    /// Models offered when `discovery = "static"`
    #[serde(default)]
    pub models: Vec<String>,

    /// Ollama executable used for `discovery = "ollama-cli"`
    pub ollama_bin: String,
}

/// Debate defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateSettings {
    /// Number of debate rounds (1-100)
    pub rounds: u32,

    /// Persona framing
    pub voice: PersonaVoice,

    /// Persona dispatch within a round
    pub dispatch: DispatchMode,

    /// Upper bound on simultaneous model calls in concurrent mode
    pub max_in_flight: usize,
}

/// Transcript export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory exported documents are written to
    pub output_dir: String,

    /// File name prefix, followed by `_YYYYMMDD_HHMMSS`
    pub filename_prefix: String,

    /// Write a PDF report
    pub pdf: bool,

    /// Write a JSON transcript
    pub json: bool,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: Provider::Openai,
            base_url: "http://localhost:11434/v1".to_string(),
            api_key: String::new(),
            default_model: None,
            temperature: 0.7,
            max_tokens: None,
            timeout_secs: 300,
            discovery: DiscoveryMethod::OllamaCli,
            models: vec![],
            ollama_bin: "ollama".to_string(),
        }
    }
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            rounds: 2,
            voice: PersonaVoice::Worldview,
            dispatch: DispatchMode::Concurrent,
            max_in_flight: 7,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: ".".to_string(),
            filename_prefix: "council_debate".to_string(),
            pdf: true,
            json: false,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

// String forms, shared by env overrides and the CLI

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Openai => "openai",
            Provider::Mock => "mock",
        })
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "ollama" => Ok(Provider::Openai),
            "mock" => Ok(Provider::Mock),
            other => Err(format!("Unknown provider '{}'. Valid: openai, mock", other)),
        }
    }
}

impl fmt::Display for DiscoveryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiscoveryMethod::OllamaCli => "ollama-cli",
            DiscoveryMethod::Api => "api",
            DiscoveryMethod::Static => "static",
        })
    }
}

impl FromStr for DiscoveryMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ollama-cli" | "ollama" => Ok(DiscoveryMethod::OllamaCli),
            "api" => Ok(DiscoveryMethod::Api),
            "static" => Ok(DiscoveryMethod::Static),
            other => Err(format!(
                "Unknown discovery method '{}'. Valid: ollama-cli, api, static",
                other
            )),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "concurrent" | "parallel" => Ok(DispatchMode::Concurrent),
            "sequential" => Ok(DispatchMode::Sequential),
            other => Err(format!(
                "Unknown dispatch mode '{}'. Valid: concurrent, sequential",
                other
            )),
        }
    }
}

impl CouncilConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        config.apply_env_overrides()?;
        config.expand_paths();
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        let mut search_paths = vec![PathBuf::from("council.toml")];
        if let Some(dir) = dirs::config_dir() {
            search_paths.push(dir.join("council").join("config.toml"));
        }
        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".council").join("config.toml"));
        }

        for path in search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(val) = env_var("COUNCIL_PROVIDER") {
            self.model.provider = parse_env("COUNCIL_PROVIDER", &val)?;
        }
        if let Some(val) = env_var("COUNCIL_BASE_URL") {
            self.model.base_url = val;
        }
        if let Some(val) = env_var("COUNCIL_API_KEY") {
            self.model.api_key = val;
        }
        if let Some(val) = env_var("COUNCIL_MODEL") {
            self.model.default_model = Some(val);
        }
        if let Some(val) = env_var("COUNCIL_TEMPERATURE") {
            self.model.temperature = parse_env("COUNCIL_TEMPERATURE", &val)?;
        }
        if let Some(val) = env_var("COUNCIL_TIMEOUT_SECS") {
            self.model.timeout_secs = parse_env("COUNCIL_TIMEOUT_SECS", &val)?;
        }
        if let Some(val) = env_var("COUNCIL_DISCOVERY") {
            self.model.discovery = parse_env("COUNCIL_DISCOVERY", &val)?;
        }

        if let Some(val) = env_var("COUNCIL_ROUNDS") {
            self.debate.rounds = parse_env("COUNCIL_ROUNDS", &val)?;
        }
        if let Some(val) = env_var("COUNCIL_VOICE") {
            self.debate.voice = parse_env("COUNCIL_VOICE", &val)?;
        }
        if let Some(val) = env_var("COUNCIL_DISPATCH") {
            self.debate.dispatch = parse_env("COUNCIL_DISPATCH", &val)?;
        }

        if let Some(val) = env_var("COUNCIL_OUTPUT_DIR") {
            self.export.output_dir = val;
        }

        if let Some(val) = env_var("COUNCIL_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = env_var("COUNCIL_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Some(val) = env_var("COUNCIL_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }

        Ok(())
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.export.output_dir = expand_path(&self.export.output_dir);
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.provider == Provider::Openai {
            let parsed = url::Url::parse(&self.model.base_url).map_err(|e| {
                Error::config_field_invalid("model.base_url", format!("not a valid URL: {}", e))
            })?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(Error::config_field_invalid(
                    "model.base_url",
                    "must start with http:// or https://",
                ));
            }
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(Error::config_field_invalid(
                "model.temperature",
                "must be between 0.0 and 2.0",
            ));
        }

        if self.model.timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "model.timeout_secs",
                "must be greater than zero",
            ));
        }

        if self.model.discovery == DiscoveryMethod::Static && self.model.models.is_empty() {
            return Err(Error::config_field_invalid(
                "model.models",
                "static discovery needs at least one model",
            ));
        }

        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.debate.rounds) {
            return Err(Error::config_field_invalid(
                "debate.rounds",
                format!("must be between {} and {}", MIN_ROUNDS, MAX_ROUNDS),
            ));
        }

        if self.debate.max_in_flight == 0 {
            return Err(Error::config_field_invalid(
                "debate.max_in_flight",
                "must be at least 1",
            ));
        }

        if self.export.filename_prefix.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "export.filename_prefix",
                "cannot be empty",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Export directory as a PathBuf
    pub fn output_dir(&self) -> PathBuf {
        PathBuf::from(&self.export.output_dir)
    }
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| Error::config_field_invalid(key, format!("'{}': {}", value, e)))
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".council")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::config_field_invalid(
            "path",
            format!(
                "configuration file already exists: {}. Use --force to overwrite.",
                config_path.display()
            ),
        ));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    Ok(config_path)
}

/// Commented default configuration written by `config init`
const DEFAULT_CONFIG: &str = r#"# Council of Elders configuration

[model]
# Backend: "openai" (any OpenAI-compatible endpoint) or "mock" (offline)
provider = "openai"

# API base URL (Ollama, vLLM, LM Studio, OpenAI, ...)
base_url = "http://localhost:11434/v1"

# API key (leave empty for local servers like Ollama)
api_key = ""

# Model used when --model is not given (first discovered model otherwise)
# default_model = "llama3"

# Sampling temperature
temperature = 0.7

# Optional cap on tokens per answer
# max_tokens = 1024

# Request timeout in seconds
timeout_secs = 300

# Model discovery: "ollama-cli", "api" or "static"
discovery = "ollama-cli"

# Models offered when discovery = "static"
models = []

# Ollama executable for discovery = "ollama-cli"
ollama_bin = "ollama"

[debate]
# Number of debate rounds (1-100)
rounds = 2

# Persona framing: "worldview" or "technical"
voice = "worldview"

# Persona dispatch within a round: "concurrent" or "sequential"
dispatch = "concurrent"

# Maximum simultaneous model calls in concurrent mode
max_in_flight = 7

[export]
# Directory reports are written to
output_dir = "."

# File name prefix; a _YYYYMMDD_HHMMSS timestamp is appended
filename_prefix = "council_debate"

# Write a PDF report
pdf = true

# Write a JSON transcript
json = false

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.council/logs/council.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = CouncilConfig::default();
        assert_eq!(config.model.base_url, "http://localhost:11434/v1");
        assert_eq!(config.model.temperature, 0.7);
        assert_eq!(config.debate.rounds, 2);
        assert_eq!(config.debate.dispatch, DispatchMode::Concurrent);
        assert_eq!(config.export.filename_prefix, "council_debate");
        assert_eq!(config.logging.level, "info");
    }

    /// Tests touching process-wide COUNCIL_* variables hold this lock
    static ENV_LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());

    /// Sets variables under the lock and removes them again on drop
    struct EnvGuard {
        keys: Vec<&'static str>,
        _lock: parking_lot::MutexGuard<'static, ()>,
    }

    impl EnvGuard {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let lock = ENV_LOCK.lock();
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self {
                keys: vars.iter().map(|(key, _)| *key).collect(),
                _lock: lock,
            }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in &self.keys {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn test_env_override() {
        let _env = EnvGuard::set(&[
            ("COUNCIL_BASE_URL", "http://gpu-box:8000/v1"),
            ("COUNCIL_ROUNDS", "5"),
            ("COUNCIL_VOICE", "technical"),
            ("COUNCIL_DISPATCH", "sequential"),
        ]);

        let mut config = CouncilConfig::default();
        config.apply_env_overrides().unwrap();

        assert_eq!(config.model.base_url, "http://gpu-box:8000/v1");
        assert_eq!(config.debate.rounds, 5);
        assert_eq!(config.debate.voice, PersonaVoice::Technical);
        assert_eq!(config.debate.dispatch, DispatchMode::Sequential);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let _env = EnvGuard::set(&[("COUNCIL_TIMEOUT_SECS", "soon")]);
        let mut config = CouncilConfig::default();
        let err = config.apply_env_overrides().unwrap_err();

        assert!(err.to_string().contains("COUNCIL_TIMEOUT_SECS"));
    }

    #[test]
    fn test_env_guard_restores_environment() {
        {
            let _env = EnvGuard::set(&[("COUNCIL_TIMEOUT_SECS", "soon")]);
        }
        let _env = EnvGuard::set(&[]);
        assert!(env::var("COUNCIL_TIMEOUT_SECS").is_err());

        let mut config = CouncilConfig::default();
        assert!(config.apply_env_overrides().is_ok());
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(CouncilConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut config = CouncilConfig::default();
        config.model.base_url = "ws://localhost:11434".to_string();
        assert!(config.validate().is_err());

        config.model.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mock_provider_skips_url_check() {
        let mut config = CouncilConfig::default();
        config.model.provider = Provider::Mock;
        config.model.base_url = String::new();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_round_bounds() {
        let mut config = CouncilConfig::default();
        config.debate.rounds = 0;
        assert!(config.validate().is_err());
        config.debate.rounds = 101;
        assert!(config.validate().is_err());
        config.debate.rounds = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_static_discovery_needs_models() {
        let mut config = CouncilConfig::default();
        config.model.discovery = DiscoveryMethod::Static;
        assert!(config.validate().is_err());
        config.model.models = vec!["llama3".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = CouncilConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = CouncilConfig::default();
        config.export.output_dir = "~/debates".to_string();
        config.expand_paths();
        assert!(!config.export.output_dir.contains('~'));
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = CouncilConfig::default();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: CouncilConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(config.model.base_url, parsed.model.base_url);
        assert_eq!(config.debate.voice, parsed.debate.voice);
        assert_eq!(config.export.pdf, parsed.export.pdf);
    }

    #[test]
    fn test_default_config_file_parses() {
        let parsed: CouncilConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.debate.max_in_flight, 7);
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[model]
provider = "openai"
base_url = "https://api.openai.com/v1"
api_key = "sk-test"
default_model = "gpt-4o-mini"
discovery = "api"

[debate]
rounds = 3
voice = "technical"
dispatch = "sequential"

[export]
output_dir = "/tmp/council"
json = true
"#;

        let config: CouncilConfig = toml::from_str(config_str).unwrap();

        assert_eq!(config.model.default_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(config.model.discovery, DiscoveryMethod::Api);
        assert_eq!(config.debate.rounds, 3);
        assert_eq!(config.debate.voice, PersonaVoice::Technical);
        assert_eq!(config.debate.dispatch, DispatchMode::Sequential);
        assert!(config.export.json);
        assert!(config.export.pdf);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("council.toml");
        let path_str = path.to_str().unwrap();

        init_config(Some(path_str), false).unwrap();
        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }
}
