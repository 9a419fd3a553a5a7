//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::Semaphore;

/// Default values for optional settings.
pub mod defaults {
    pub const ENDPOINT: &str = "https://ci.appveyor.com/api";
    pub const WEB_URL: &str = "https://ci.appveyor.com";
    pub const RESULT_ROOT: &str = "results";
    pub const DAYS: u32 = 7;
    pub const MAX_DAYS: u32 = 36_500;
    pub const PAGE_SIZE: u32 = 50; // History records per request
    pub const MAX_CONCURRENT_REQUESTS: usize = 8; // In-flight job/test requests
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
}

/// What to do when fetching the results of one build or job fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Abort the whole run on the first failure
    FailFast,
    /// Record the failure, keep going and mark the report partial
    Tolerant,
}

impl FetchPolicy {
    /// Parse policy from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "strict" => Some(Self::FailFast),
            "tolerant" | "partial" => Some(Self::Tolerant),
            _ => None,
        }
    }
}

impl std::fmt::Display for FetchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailFast => write!(f, "fail-fast"),
            Self::Tolerant => write!(f, "tolerant"),
        }
    }
}

/// Output format of written reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
}

impl ReportFormat {
    /// Parse format from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// A project/branch pair to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub project: String,
    pub branch: String,
}

impl Target {
    /// Parse a comma-separated list of `project:branch` pairs.
    pub fn parse_list(s: &str) -> Result<Vec<Self>, ConfigError> {
        let targets = s
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| {
                let (project, branch) = item.rsplit_once(':').ok_or(ConfigError::InvalidValue(
                    "ATA_TARGETS entries must look like 'project:branch'",
                ))?;
                let (project, branch) = (project.trim(), branch.trim());
                if project.is_empty() || branch.is_empty() {
                    return Err(ConfigError::InvalidValue(
                        "ATA_TARGETS entries need both a project and a branch",
                    ));
                }
                Ok(Target {
                    project: project.to_string(),
                    branch: branch.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if targets.is_empty() {
            return Err(ConfigError::InvalidValue(
                "ATA_TARGETS must name at least one project:branch",
            ));
        }
        Ok(targets)
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}|{}", self.project, self.branch)
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// AppVeyor API token
    pub api_key: SecretString,
    /// REST API base URL
    pub endpoint: String,
    /// Web UI base URL, used for failing-build links
    pub web_url: String,
    /// Projects and branches to analyse, in order
    pub targets: Vec<Target>,
    /// Root directory for written reports
    pub result_root: PathBuf,
    /// Length of the analysed window, ending now
    pub days: u32,
    /// Keep builds triggered by pull requests
    pub include_pull_requests: bool,
    /// History records requested per page
    pub page_size: u32,
    /// Upper bound on concurrent job/test requests
    pub max_concurrent_requests: usize,
    /// Connect and total timeout for each HTTP request
    pub request_timeout: Duration,
    pub fetch_policy: FetchPolicy,
    pub report_format: ReportFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `APPVEYOR_API_KEY`: API token - REQUIRED
    /// - `ATA_TARGETS`: comma-separated `project:branch` pairs - REQUIRED
    /// - `ATA_ENDPOINT`: REST API base (default: https://ci.appveyor.com/api)
    /// - `ATA_WEB_URL`: Web UI base for links (default: https://ci.appveyor.com)
    /// - `ATA_RESULT_ROOT`: Report output directory (default: results)
    /// - `ATA_DAYS`: Window length in days (default: 7)
    /// - `ATA_INCLUDE_PULL_REQUESTS`: Keep pull request builds (default: false)
    /// - `ATA_PAGE_SIZE`: History records per page (default: 50)
    /// - `ATA_MAX_CONCURRENT_REQUESTS`: Fetch fan-out bound (default: 8)
    /// - `ATA_REQUEST_TIMEOUT_SECS`: HTTP timeout in seconds (default: 30)
    /// - `ATA_FETCH_POLICY`: `fail-fast` or `tolerant` (default: fail-fast)
    /// - `ATA_REPORT_FORMAT`: `html` or `json` (default: html)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("APPVEYOR_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("APPVEYOR_API_KEY"))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue("APPVEYOR_API_KEY must not be empty"));
        }

        let targets = env::var("ATA_TARGETS")
            .map_err(|_| ConfigError::MissingEnvVar("ATA_TARGETS"))
            .and_then(|s| Target::parse_list(&s))?;

        let endpoint = env::var("ATA_ENDPOINT").unwrap_or_else(|_| defaults::ENDPOINT.to_string());
        let web_url = env::var("ATA_WEB_URL").unwrap_or_else(|_| defaults::WEB_URL.to_string());

        let result_root = env::var("ATA_RESULT_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::RESULT_ROOT));

        let days = env::var("ATA_DAYS")
            .unwrap_or_else(|_| defaults::DAYS.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("ATA_DAYS must be a valid number"))?;

        let include_pull_requests = match env::var("ATA_INCLUDE_PULL_REQUESTS") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::InvalidValue(
                "ATA_INCLUDE_PULL_REQUESTS must be true or false",
            ))?,
            Err(_) => false,
        };

        let page_size = env::var("ATA_PAGE_SIZE")
            .unwrap_or_else(|_| defaults::PAGE_SIZE.to_string())
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidValue("ATA_PAGE_SIZE must be a valid number"))?;

        let max_concurrent_requests = env::var("ATA_MAX_CONCURRENT_REQUESTS")
            .unwrap_or_else(|_| defaults::MAX_CONCURRENT_REQUESTS.to_string())
            .parse::<usize>()
            .map_err(|_| {
                ConfigError::InvalidValue("ATA_MAX_CONCURRENT_REQUESTS must be a valid number")
            })?;

        let request_timeout_secs = env::var("ATA_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| defaults::REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue("ATA_REQUEST_TIMEOUT_SECS must be a valid number")
            })?;

        let fetch_policy = match env::var("ATA_FETCH_POLICY") {
            Ok(v) => FetchPolicy::parse(&v).ok_or(ConfigError::InvalidValue(
                "ATA_FETCH_POLICY must be 'fail-fast' or 'tolerant'",
            ))?,
            Err(_) => FetchPolicy::FailFast,
        };

        let report_format = match env::var("ATA_REPORT_FORMAT") {
            Ok(v) => ReportFormat::parse(&v).ok_or(ConfigError::InvalidValue(
                "ATA_REPORT_FORMAT must be 'html' or 'json'",
            ))?,
            Err(_) => ReportFormat::Html,
        };

        let config = Config {
            api_key: SecretString::from(api_key),
            endpoint,
            web_url,
            targets,
            result_root,
            days,
            include_pull_requests,
            page_size,
            max_concurrent_requests,
            request_timeout: Duration::from_secs(request_timeout_secs),
            fetch_policy,
            report_format,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate value ranges that parsing alone does not catch.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.days == 0 {
            errors.push("ATA_DAYS must be at least 1".to_string());
        } else if self.days > defaults::MAX_DAYS {
            errors.push(format!("ATA_DAYS must be at most {}", defaults::MAX_DAYS));
        }
        if self.page_size == 0 {
            errors.push("ATA_PAGE_SIZE must be at least 1".to_string());
        }
        if self.max_concurrent_requests == 0 {
            errors.push("ATA_MAX_CONCURRENT_REQUESTS must be at least 1".to_string());
        } else if self.max_concurrent_requests > Semaphore::MAX_PERMITS {
            errors.push(format!(
                "ATA_MAX_CONCURRENT_REQUESTS must be at most {}",
                Semaphore::MAX_PERMITS
            ));
        }
        if self.request_timeout.is_zero() {
            errors.push("ATA_REQUEST_TIMEOUT_SECS must be at least 1".to_string());
        }
        for (name, url) in [("ATA_ENDPOINT", &self.endpoint), ("ATA_WEB_URL", &self.web_url)] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                errors.push(format!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}
