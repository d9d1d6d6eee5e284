use secrecy::SecretString;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_MAX_TOKENS: u64 = 700;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_NCBI_BASE_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";
pub const DEFAULT_NCBI_DATABASE: &str = "protein";
pub const DEFAULT_VIEWER_SCRIPT_URL: &str = "https://3Dmol.org/build/3Dmol-min.js";
pub const DEFAULT_VIEWER_HEIGHT: u32 = 500;

/// Service configuration, read from the environment at start-up.
#[derive(Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Fallback credential when the form does not carry one
    pub groq_api_key: Option<SecretString>,
    pub generation: GenerationSettings,
    pub ncbi: NcbiSettings,
    pub viewer: ViewerSettings,
}

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub base_url: String,
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
}

#[derive(Debug, Clone)]
pub struct NcbiSettings {
    pub base_url: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub script_url: String,
    pub height: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl Default for NcbiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_NCBI_BASE_URL.to_string(),
            database: DEFAULT_NCBI_DATABASE.to_string(),
        }
    }
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            script_url: DEFAULT_VIEWER_SCRIPT_URL.to_string(),
            height: DEFAULT_VIEWER_HEIGHT,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            groq_api_key: None,
            generation: GenerationSettings::default(),
            ncbi: NcbiSettings::default(),
            viewer: ViewerSettings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Blank values count
    /// as unset; malformed numbers fall back to the default with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = AppConfig::default();

        AppConfig {
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_or(get("PORT"), "PORT", defaults.port),
            groq_api_key: get("GROQ_API_KEY").map(SecretString::from),
            generation: GenerationSettings {
                base_url: get("GROQ_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.generation.base_url),
                model: get("GROQ_MODEL").unwrap_or(defaults.generation.model),
                max_tokens: parse_or(
                    get("GROQ_MAX_TOKENS"),
                    "GROQ_MAX_TOKENS",
                    defaults.generation.max_tokens,
                ),
                temperature: parse_or(
                    get("GROQ_TEMPERATURE"),
                    "GROQ_TEMPERATURE",
                    defaults.generation.temperature,
                ),
            },
            ncbi: NcbiSettings {
                base_url: get("NCBI_BASE_URL")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or(defaults.ncbi.base_url),
                database: get("NCBI_DATABASE").unwrap_or(defaults.ncbi.database),
            },
            viewer: ViewerSettings {
                script_url: get("VIEWER_SCRIPT_URL").unwrap_or(defaults.viewer.script_url),
                height: parse_or(get("VIEWER_HEIGHT"), "VIEWER_HEIGHT", defaults.viewer.height),
            },
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Display,
{
    match raw {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(key, value = %value, default = %default, "invalid value, using default");
            default
        }),
        None => default,
    }
}
