use std::time::Instant;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    serde::Deserialize,
    tracing::debug,
};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, histogram, nlu as nlu_metrics};

use crate::{EntitySet, Error, Result, TrainingSample};

/// Intent/entity extraction service.
#[async_trait]
pub trait Understander: Send + Sync {
    /// Classify one utterance.
    async fn classify(&self, utterance: &str) -> Result<EntitySet>;

    /// Submit a correction for one utterance.
    async fn train(&self, sample: &TrainingSample) -> Result<()>;

    /// Values of one entity for an utterance. Empty when the entity is absent.
    async fn entity_values(&self, utterance: &str, entity: &str) -> Result<Vec<String>> {
        Ok(self.classify(utterance).await?.values(entity))
    }
}

#[derive(Deserialize)]
struct MessageResponse {
    #[serde(default)]
    entities: EntitySet,
}

/// HTTP client for a Wit-compatible service.
pub struct WitClient {
    http: reqwest::Client,
    base_url: String,
    token: Secret<String>,
    version: String,
}

impl WitClient {
    /// `version` pins the service's API behaviour; `None` pins today's date.
    pub fn new(base_url: impl Into<String>, token: Secret<String>, version: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            version: version.unwrap_or_else(|| chrono::Local::now().format("%Y%m%d").to_string()),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        Err(Error::status(status, body))
    }
}

#[async_trait]
impl Understander for WitClient {
    async fn classify(&self, utterance: &str) -> Result<EntitySet> {
        let started = Instant::now();
        #[cfg(feature = "metrics")]
        counter!(nlu_metrics::REQUESTS_TOTAL).increment(1);

        let result = async {
            let resp = self
                .http
                .get(format!("{}/message", self.base_url))
                .bearer_auth(self.token.expose_secret())
                .query(&[("v", self.version.as_str()), ("q", utterance)])
                .send()
                .await?;
            let body = Self::check(resp).await?.text().await?;
            let parsed: MessageResponse = serde_json::from_str(&body)?;
            Ok(parsed.entities)
        }
        .await;

        let elapsed = started.elapsed();
        debug!(elapsed_ms = elapsed.as_millis() as u64, ok = result.is_ok(), "NLU classify");
        #[cfg(feature = "metrics")]
        {
            histogram!(nlu_metrics::REQUEST_DURATION_SECONDS).record(elapsed.as_secs_f64());
            if result.is_err() {
                counter!(nlu_metrics::ERRORS_TOTAL).increment(1);
            }
        }
        result
    }

    async fn train(&self, sample: &TrainingSample) -> Result<()> {
        let resp = self
            .http
            .post(format!("{}/samples", self.base_url))
            .bearer_auth(self.token.expose_secret())
            .query(&[("v", self.version.as_str())])
            .json(&[sample])
            .send()
            .await?;
        Self::check(resp).await?;
        debug!(text = %sample.text, "training sample accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::TraitEntity,
        mockito::{Matcher, Server},
    };

    fn client(server: &Server) -> WitClient {
        WitClient::new(
            server.url(),
            Secret::new("token-123".into()),
            Some("20240101".into()),
        )
    }

    #[tokio::test]
    async fn classify_sends_version_query_and_token() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/message")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("v".into(), "20240101".into()),
                Matcher::UrlEncoded("q".into(), "Pizza or sushi?".into()),
            ]))
            .match_header("authorization", "Bearer token-123")
            .with_body(
                r#"{"_text":"Pizza or sushi?","entities":{
                    "intent":[{"confidence":0.9,"value":"or_question"}],
                    "option":[{"value":"Pizza","start":0,"end":5},{"value":"sushi","start":9,"end":14}]
                }}"#,
            )
            .create_async()
            .await;

        let entities = client(&server).classify("Pizza or sushi?").await.unwrap();
        assert_eq!(entities.first_value("intent"), Some("or_question"));
        assert_eq!(entities.values("option"), vec!["Pizza", "sushi"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn entity_values_of_absent_entity_is_empty() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/message")
            .match_query(Matcher::Any)
            .with_body(r#"{"entities":{}}"#)
            .create_async()
            .await;

        let values = client(&server).entity_values("blah", "intent").await.unwrap();
        assert!(values.is_empty());
    }

    #[tokio::test]
    async fn missing_entities_field_is_empty_set() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/message")
            .match_query(Matcher::Any)
            .with_body(r#"{"_text":"blah"}"#)
            .create_async()
            .await;

        let entities = client(&server).classify("blah").await.unwrap();
        assert!(entities.is_empty());
    }

    #[tokio::test]
    async fn error_status_surfaces_as_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/message")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body("invalid token")
            .create_async()
            .await;

        let err = client(&server).classify("hey").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn malformed_body_surfaces_as_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/message")
            .match_query(Matcher::Any)
            .with_body("<html>gateway timeout</html>")
            .create_async()
            .await;

        let err = client(&server).classify("hey").await.unwrap_err();
        assert!(matches!(err, Error::Malformed(_)));
    }

    #[tokio::test]
    async fn train_posts_sample_array() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/samples")
            .match_query(Matcher::UrlEncoded("v".into(), "20240101".into()))
            .match_body(Matcher::Json(serde_json::json!([{
                "text": "blah",
                "entities": [{ "entity": "sentiment", "value": "neutral" }]
            }])))
            .with_body(r#"{"sent":true,"n":1}"#)
            .create_async()
            .await;

        let sample = TrainingSample::new("blah").with_trait(TraitEntity::sentiment("neutral"));
        client(&server).train(&sample).await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn default_version_is_a_date() {
        let client = WitClient::new("http://localhost", Secret::new(String::new()), None);
        assert_eq!(client.version().len(), 8);
        assert!(client.version().chars().all(|c| c.is_ascii_digit()));
    }
}
