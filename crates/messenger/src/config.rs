use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Configuration for one Messenger page.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessengerAccountConfig {
    /// Page access token used for the Send API.
    #[serde(serialize_with = "serialize_secret")]
    pub page_access_token: Secret<String>,

    /// Token the platform echoes during webhook subscription.
    pub verify_token: String,

    /// App secret for `X-Hub-Signature-256` checks. Unsigned requests are
    /// accepted when unset.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_option_secret"
    )]
    pub app_secret: Option<Secret<String>>,

    /// Graph API root, overridable for tests.
    pub graph_url: String,

    pub api_version: String,
}

impl MessengerAccountConfig {
    /// Parse the `channels.messenger` section.
    pub fn from_value(value: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(value)
    }

    pub fn messages_url(&self) -> String {
        format!(
            "{}/{}/me/messages",
            self.graph_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

impl std::fmt::Debug for MessengerAccountConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessengerAccountConfig")
            .field("page_access_token", &"[REDACTED]")
            .field("verify_token", &self.verify_token)
            .field("app_secret", &self.app_secret.as_ref().map(|_| "[REDACTED]"))
            .field("graph_url", &self.graph_url)
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Default for MessengerAccountConfig {
    fn default() -> Self {
        Self {
            page_access_token: Secret::new(String::new()),
            verify_token: String::new(),
            app_secret: None,
            graph_url: "https://graph.facebook.com".into(),
            api_version: "v19.0".into(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_with_defaults() {
        let config = MessengerAccountConfig::from_value(serde_json::json!({
            "page_access_token": "EAAG",
            "verify_token": "verify-me",
        }))
        .unwrap();
        assert_eq!(config.page_access_token.expose_secret(), "EAAG");
        assert!(config.app_secret.is_none());
        assert_eq!(
            config.messages_url(),
            "https://graph.facebook.com/v19.0/me/messages"
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let config = MessengerAccountConfig {
            page_access_token: Secret::new("EAAG-secret".into()),
            app_secret: Some(Secret::new("app-secret".into())),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("EAAG-secret"));
        assert!(!rendered.contains("app-secret"));
    }
}
