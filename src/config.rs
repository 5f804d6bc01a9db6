use crate::error::FatalStartupError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_LOG_FILTER: &str = "info";
const DEFAULT_DISCOVERY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub source: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub log_filter: String,
    pub log_file: Option<PathBuf>,
    pub discovery_timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            source: None,
            kubeconfig: None,
            context: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
            discovery_timeout: Duration::from_secs(DEFAULT_DISCOVERY_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct KestrelConfigFile {
    #[serde(default)]
    kubeconfig: Option<PathBuf>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    log_filter: Option<String>,
    #[serde(default)]
    log_file: Option<PathBuf>,
    #[serde(default, alias = "discovery_timeout", alias = "timeout_secs")]
    discovery_timeout_secs: Option<u64>,
}

impl RuntimeConfig {
    /// Loads the first config file found, or defaults when there is none.
    pub fn load() -> Result<Self, FatalStartupError> {
        match discover_config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, FatalStartupError> {
        let raw = fs::read_to_string(path).map_err(|source| FatalStartupError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = parse_config(&raw).map_err(|source| FatalStartupError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }
}

fn parse_config(raw: &str) -> Result<RuntimeConfig, serde_yaml::Error> {
    // An empty document deserializes to unit, not to an empty mapping.
    let parsed: KestrelConfigFile = if raw.trim().is_empty() {
        KestrelConfigFile::default()
    } else {
        serde_yaml::from_str(raw)?
    };

    let log_filter = parsed
        .log_filter
        .map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
    let timeout_secs = parsed
        .discovery_timeout_secs
        .unwrap_or(DEFAULT_DISCOVERY_TIMEOUT_SECS)
        .max(1);

    Ok(RuntimeConfig {
        source: None,
        kubeconfig: parsed.kubeconfig,
        context: parsed
            .context
            .map(|context| context.trim().to_string())
            .filter(|context| !context.is_empty()),
        log_filter,
        log_file: parsed.log_file,
        discovery_timeout: Duration::from_secs(timeout_secs),
    })
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("KESTREL_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("kestrel.yaml"),
        PathBuf::from("kestrel.yml"),
        PathBuf::from(".kestrel.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let user_candidates = [
            PathBuf::from(&home).join(".config/kestrel/config.yaml"),
            PathBuf::from(&home).join(".config/kestrel/config.yml"),
            PathBuf::from(&home).join(".kestrel.yaml"),
        ];
        for candidate in user_candidates {
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }

    None
}
