//! Configuration loading and the provider factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use tutor_core::auth::{TeacherGate, DEFAULT_TEACHER_DOMAIN};
use tutor_core::feedback::{Backend, GenerationSettings, TutorService};
use tutor_core::traits::LlmProvider;

use crate::gemini::{self, GeminiProvider};
use crate::openai::{self, OpenAiProvider};

/// Configuration for a single text-generation provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
        }
    }
}

impl ProviderConfig {
    /// An unkeyed config for a provider known by name.
    pub fn for_name(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            }),
            "gemini" => Some(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            _ => None,
        }
    }

    pub fn api_key(&self) -> &str {
        match self {
            ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Gemini { api_key, .. } => {
                api_key
            }
        }
    }

    fn api_key_mut(&mut self) -> &mut String {
        match self {
            ProviderConfig::OpenAI { api_key, .. } | ProviderConfig::Gemini { api_key, .. } => {
                api_key
            }
        }
    }

    /// Environment variable that supplies this provider's key.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderConfig::OpenAI { .. } => "OPENAI_API_KEY",
            ProviderConfig::Gemini { .. } => "GEMINI_API_KEY",
        }
    }

    fn default_settings(&self) -> GenerationSettings {
        match self {
            ProviderConfig::OpenAI { .. } => GenerationSettings {
                model: openai::DEFAULT_MODEL.to_string(),
                temperature: Some(openai::DEFAULT_TEMPERATURE),
                max_tokens: None,
            },
            ProviderConfig::Gemini { .. } => GenerationSettings {
                model: gemini::DEFAULT_MODEL.to_string(),
                temperature: None,
                max_tokens: None,
            },
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Where submission records are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionsConfig {
    #[serde(default = "default_submissions_path")]
    pub path: PathBuf,
}

impl Default for SubmissionsConfig {
    fn default() -> Self {
        Self {
            path: default_submissions_path(),
        }
    }
}

/// Teacher sign-in settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_teacher_domain")]
    pub teacher_domain: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            teacher_domain: default_teacher_domain(),
        }
    }
}

/// Top-level dover-tutor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Name of the provider to use (a key of `providers`, or a built-in name).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model override; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,
    /// Temperature override.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Max tokens override.
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// HTTP client timeout for provider calls. Unset means none.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub submissions: SubmissionsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5173
}
fn default_submissions_path() -> PathBuf {
    PathBuf::from("dover_submissions.json")
}
fn default_teacher_domain() -> String {
    DEFAULT_TEACHER_DOMAIN.to_string()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            temperature: None,
            max_tokens: None,
            request_timeout_secs: None,
            providers: HashMap::new(),
            server: ServerConfig::default(),
            submissions: SubmissionsConfig::default(),
            auth: AuthConfig::default(),
        }
    }
}

impl TutorConfig {
    /// The config of the selected provider, falling back to a built-in
    /// unkeyed one for "openai" and "gemini".
    pub fn selected_provider(&self) -> Result<ProviderConfig> {
        if let Some(config) = self.providers.get(&self.provider) {
            return Ok(config.clone());
        }
        ProviderConfig::for_name(&self.provider).ok_or_else(|| {
            anyhow::anyhow!(
                "provider '{}' not found in config. Available: {:?}",
                self.provider,
                self.providers.keys().collect::<Vec<_>>()
            )
        })
    }

    /// Teacher sign-in gate for the configured `[auth] teacher_domain`.
    pub fn teacher_gate(&self) -> TeacherGate {
        TeacherGate::new(self.auth.teacher_domain.trim())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied verbatim and never rescanned, so a value
/// that itself contains `${...}` cannot expand again.
fn resolve_env_vars(s: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + end];
        result.push_str(&lookup(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_provider_config(
    config: &ProviderConfig,
    lookup: &impl Fn(&str) -> Option<String>,
) -> ProviderConfig {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key, lookup),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u, lookup)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o, lookup)),
        },
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key, lookup),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u, lookup)),
        },
    }
}

/// Apply `${VAR}` expansion and the environment overrides:
/// `OPENAI_API_KEY`, `GEMINI_API_KEY`, `TUTOR_PROVIDER`, `PORT`.
pub fn apply_env(config: &mut TutorConfig, lookup: impl Fn(&str) -> Option<String>) {
    config.providers = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v, &lookup)))
        .collect();

    for name in ["openai", "gemini"] {
        let Some(template) = ProviderConfig::for_name(name) else {
            continue;
        };
        let Some(key) = lookup(template.credential_var()).filter(|k| !k.is_empty()) else {
            continue;
        };
        let entry = config.providers.entry(name.to_string()).or_insert(template);
        *entry.api_key_mut() = key;
    }

    if let Some(provider) = lookup("TUTOR_PROVIDER").filter(|p| !p.is_empty()) {
        config.provider = provider;
    }

    if let Some(port) = lookup("PORT") {
        match port.parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(%port, "ignoring unparseable PORT"),
        }
    }
}

/// Load `.env.local` if it exists, otherwise `.env`. Missing files are fine.
pub fn load_dotenv() {
    let local = Path::new(".env.local");
    let loaded = if local.exists() {
        dotenvy::from_path(local).map(|_| local.to_path_buf())
    } else {
        dotenvy::dotenv()
    };
    match loaded {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to load environment file"),
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `tutor.toml` in the current directory
/// 2. `~/.config/dover-tutor/config.toml`
///
/// Environment overrides are applied on top; see [`apply_env`].
pub fn load_config() -> Result<TutorConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<TutorConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("tutor.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => TutorConfig::default(),
    };

    apply_env(&mut config, |name: &str| std::env::var(name).ok());
    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<TutorConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<TutorConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("dover-tutor"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(
    config: &ProviderConfig,
    timeout_secs: Option<u64>,
) -> Result<Box<dyn LlmProvider>> {
    match config {
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Ok(Box::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
            timeout_secs,
        )?)),
        ProviderConfig::Gemini { api_key, base_url } => Ok(Box::new(GeminiProvider::new(
            api_key,
            base_url.clone(),
            timeout_secs,
        )?)),
    }
}

/// Build the feedback service for the selected provider.
///
/// A provider without a key still yields a service; it answers every valid
/// request with a missing-credential error naming the expected variable.
pub fn build_service(config: &TutorConfig) -> Result<TutorService> {
    let provider_config = config.selected_provider()?;

    let mut settings = provider_config.default_settings();
    if let Some(model) = &config.model {
        settings.model = model.clone();
    }
    if config.temperature.is_some() {
        settings.temperature = config.temperature;
    }
    if config.max_tokens.is_some() {
        settings.max_tokens = config.max_tokens;
    }

    let backend = if provider_config.api_key().trim().is_empty() {
        warn!(
            provider = %config.provider,
            credential = provider_config.credential_var(),
            "no provider credential configured"
        );
        Backend::MissingCredential {
            credential: provider_config.credential_var().to_string(),
        }
    } else {
        let provider = create_provider(&provider_config, config.request_timeout_secs)?;
        Backend::Ready(Arc::from(provider))
    };

    Ok(TutorService::new(backend, settings))
}
