/// Config schema types (server, nlu, sessions, flows, metrics, channels).
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuandaryConfig {
    pub server: ServerConfig,
    pub nlu: NluConfig,
    pub sessions: SessionsConfig,
    pub flows: FlowsConfig,
    pub metrics: MetricsConfig,
    pub channels: ChannelsConfig,
}

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 5000,
        }
    }
}

/// How long classification results are memoized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheScope {
    /// A fresh cache per inbound event. Only duplicate lookups inside one
    /// dispatch are saved.
    #[default]
    Request,
    /// One cache for the whole process. Training an utterance evicts it.
    Process,
}

/// Natural-language-understanding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    pub base_url: String,
    /// Server access token for the NLU app.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub token: Option<Secret<String>>,
    /// API version pin (`YYYYMMDD`). Defaults to today's date when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub cache_scope: CacheScope,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.wit.ai".into(),
            token: None,
            version: None,
            cache_scope: CacheScope::Request,
        }
    }
}

/// Where user sessions live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackendKind {
    /// Process memory. Sessions vanish on restart.
    #[default]
    Memory,
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionsConfig {
    pub backend: SessionBackendKind,
    /// SQLite URL, used when `backend = "sqlite"`.
    pub database_url: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackendKind::Memory,
            database_url: "sqlite://quandary.db?mode=rwc".into(),
        }
    }
}

/// Conversation wording that operators may tune.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowsConfig {
    /// Prompts cycled through when the bot does not recognize a question.
    /// The n-th consecutive miss uses entry `n mod len`.
    pub unrecognized_prompts: Vec<String>,
}

impl Default for FlowsConfig {
    fn default() -> Self {
        Self {
            unrecognized_prompts: vec![
                "Was that a question?".into(),
                "Hmm, I'm not sure I got that. Was it a question?".into(),
                "Sorry, I didn't catch that. Were you asking me something?".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

/// Per-channel account settings, parsed by the channel crates themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messenger: Option<serde_json::Value>,
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
