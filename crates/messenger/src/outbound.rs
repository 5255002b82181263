use {
    async_trait::async_trait,
    secrecy::ExposeSecret,
    serde_json::json,
    tracing::debug,
};

use {
    quandary_channels::{ChannelOutbound, Error, Result, SenderAction},
    quandary_common::QuickReply,
};

use crate::config::MessengerAccountConfig;

/// Platform limit on quick-reply title length, in characters.
pub const MAX_TITLE_CHARS: usize = 20;
/// Platform limit on quick replies per message.
pub const MAX_QUICK_REPLIES: usize = 13;

/// Sends through the Messenger Send API.
pub struct MessengerOutbound {
    http: reqwest::Client,
    config: MessengerAccountConfig,
}

impl MessengerOutbound {
    pub fn new(config: MessengerAccountConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    async fn post(&self, body: serde_json::Value) -> Result<()> {
        let resp = self
            .http
            .post(self.config.messages_url())
            .query(&[("access_token", self.config.page_access_token.expose_secret())])
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::external("messenger send", e))?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::rejected(status, body));
        }
        Ok(())
    }
}

fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_TITLE_CHARS).collect()
}

fn quick_replies_json(quick_replies: &[QuickReply]) -> Vec<serde_json::Value> {
    quick_replies
        .iter()
        .take(MAX_QUICK_REPLIES)
        .map(|q| {
            json!({
                "content_type": "text",
                "title": truncate_title(&q.title),
                "payload": q.payload,
            })
        })
        .collect()
}

#[async_trait]
impl ChannelOutbound for MessengerOutbound {
    async fn send_text(&self, to: &str, text: &str, quick_replies: &[QuickReply]) -> Result<()> {
        if text.is_empty() {
            return Err(Error::invalid_input("empty message text"));
        }
        let mut message = json!({ "text": text });
        if !quick_replies.is_empty()
            && let Some(obj) = message.as_object_mut()
        {
            obj.insert(
                "quick_replies".into(),
                serde_json::Value::Array(quick_replies_json(quick_replies)),
            );
        }
        debug!(to, quick_replies = quick_replies.len(), "messenger send_text");
        self.post(json!({ "recipient": { "id": to }, "message": message }))
            .await
    }

    async fn send_action(&self, to: &str, action: SenderAction) -> Result<()> {
        self.post(json!({ "recipient": { "id": to }, "sender_action": action.as_str() }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        mockito::{Matcher, Server},
        secrecy::Secret,
    };

    fn outbound(server: &Server) -> MessengerOutbound {
        MessengerOutbound::new(MessengerAccountConfig {
            page_access_token: Secret::new("page-token".into()),
            graph_url: server.url(),
            api_version: "v19.0".into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn text_with_quick_replies() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v19.0/me/messages")
            .match_query(Matcher::UrlEncoded("access_token".into(), "page-token".into()))
            .match_body(Matcher::Json(json!({
                "recipient": { "id": "u1" },
                "message": {
                    "text": "Was that a question?",
                    "quick_replies": [
                        { "content_type": "text", "title": "Yes", "payload": "VALID_QUESTION" },
                        { "content_type": "text", "title": "It was a statement", "payload": "NOT_A_QUESTION" }
                    ]
                }
            })))
            .with_body(r#"{"recipient_id":"u1","message_id":"m1"}"#)
            .expect(1)
            .create_async()
            .await;

        outbound(&server)
            .send_text(
                "u1",
                "Was that a question?",
                &[
                    QuickReply::new("Yes", "VALID_QUESTION"),
                    QuickReply::new("It was a statement", "NOT_A_QUESTION"),
                ],
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn plain_text_has_no_quick_replies_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v19.0/me/messages")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "recipient": { "id": "u1" },
                "message": { "text": "ok" }
            })))
            .create_async()
            .await;

        outbound(&server).send_text("u1", "ok", &[]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn sender_action() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v19.0/me/messages")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "recipient": { "id": "u1" },
                "sender_action": "typing_on"
            })))
            .create_async()
            .await;

        outbound(&server).typing_on("u1").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn platform_error_is_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v19.0/me/messages")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":{"message":"Invalid OAuth access token."}}"#)
            .create_async()
            .await;

        let err = outbound(&server).send_text("u1", "hi", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { status: 400, .. }));
    }

    #[tokio::test]
    async fn empty_text_is_refused_locally() {
        let server = Server::new_async().await;
        let err = outbound(&server).send_text("u1", "", &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn limits_are_applied() {
        let many: Vec<QuickReply> = (0..20)
            .map(|i| QuickReply::new(format!("A very long option title {i}"), format!("P{i}")))
            .collect();
        let json = quick_replies_json(&many);
        assert_eq!(json.len(), MAX_QUICK_REPLIES);
        assert_eq!(json[0]["title"], "A very long option t");
        assert_eq!(json[0]["payload"], "P0");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_title("ñññññññññññññññññññññ").chars().count(), 20);
        assert_eq!(truncate_title("Yes"), "Yes");
    }
}
