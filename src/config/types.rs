use serde::Deserialize;
use std::path::PathBuf;

/// Default page timeout (25 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 25_000;

/// Default LLM model identifier handed to the transform collaborator
pub const DEFAULT_MODEL: &str = "openrouter/mistralai/codestral-2501";

/// Content shorter than this many characters is treated as empty
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;

/// Maximum length of the sanitized path part of an output filename
pub const DEFAULT_MAX_FILENAME_LENGTH: usize = 100;

/// Main configuration structure for Scroll-Scribe
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    pub fetch: FetchConfig,
    pub transform: TransformConfig,
    pub output: OutputConfig,
    pub pipeline: PipelineConfig,

    /// Enables verbose collaborator output
    pub verbose: bool,
}

/// Settings handed to the fetch collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Page readiness condition understood by rendering fetchers
    #[serde(rename = "wait-until")]
    pub wait_until: String,

    /// Per-page timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Upper bound on concurrent requests inside one batch fetch
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,

    /// Reusable session shared by all fetches of one run
    #[serde(rename = "session-id")]
    pub session_id: Option<String>,

    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            wait_until: "domcontentloaded".to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_concurrent_requests: 5,
            session_id: Some("scroll-scribe-session".to_string()),
            user_agent: format!("scroll-scribe/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Settings for the transform collaborator
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Model identifier in `provider/model` form
    pub model: String,

    /// Token limit for a single transform call
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key; `None` means no credential
    /// is required
    #[serde(rename = "api-key-env")]
    pub api_key_env: Option<String>,

    #[serde(rename = "base-url")]
    pub base_url: Option<String>,

    /// Overrides the provider derived from `model`
    pub provider: Option<String>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 8192,
            api_key_env: None,
            base_url: None,
            provider: None,
        }
    }
}

impl TransformConfig {
    /// Provider used for rate-limit defaults: the explicit `provider` key, or
    /// the first segment of the model identifier (`openrouter` for
    /// `openrouter/mistralai/codestral-2501`)
    pub fn provider(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .or_else(|| self.model.split_once('/').map(|(provider, _)| provider))
    }
}

/// Where and how artifacts are written
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,

    /// Extension appended to every artifact, including the dot
    pub extension: String,

    #[serde(rename = "max-filename-length")]
    pub max_filename_length: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            extension: ".md".to_string(),
            max_filename_length: DEFAULT_MAX_FILENAME_LENGTH,
        }
    }
}

/// Batch loop behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Offset of the first processed URL within the input list
    #[serde(rename = "start-at")]
    pub start_at: usize,

    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    /// Fixed pause between items, independent of retry backoff
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            start_at: 0,
            min_content_length: DEFAULT_MIN_CONTENT_LENGTH,
            politeness_delay_ms: 1000,
        }
    }
}
