//! Webhook payload types.

use {
    quandary_common::{EventKind, InboundEvent},
    serde::Deserialize,
    tracing::debug,
};

/// Top-level webhook body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub object: String,
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub messaging: Vec<Messaging>,
}

/// One messaging event. Exactly one of the optional fields is normally set.
#[derive(Debug, Clone, Deserialize)]
pub struct Messaging {
    pub sender: Party,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub postback: Option<Postback>,
    #[serde(default)]
    pub delivery: Option<serde_json::Value>,
    #[serde(default)]
    pub read: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Party {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub quick_reply: Option<QuickReplyPayload>,
    /// Set on copies of the page's own outgoing messages.
    #[serde(default)]
    pub is_echo: bool,
    #[serde(default)]
    pub attachments: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuickReplyPayload {
    pub payload: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postback {
    pub payload: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Messaging {
    /// The inbound event this carries, if any. Echoes and receipts yield `None`.
    pub fn into_event(self) -> Option<InboundEvent> {
        let sender_id = self.sender.id;
        let kind = match (self.message, self.postback) {
            (Some(message), _) if message.is_echo => {
                debug!(sender_id, "skipping echo");
                return None;
            },
            (Some(message), _) => EventKind::Message {
                text: message.text.filter(|t| !t.is_empty()),
                quick_reply: message.quick_reply.map(|q| q.payload),
            },
            (None, Some(postback)) => EventKind::Postback {
                payload: postback.payload,
            },
            (None, None) => {
                debug!(
                    sender_id,
                    delivery = self.delivery.is_some(),
                    read = self.read.is_some(),
                    "skipping non-message event"
                );
                return None;
            },
        };
        Some(InboundEvent { sender_id, kind })
    }
}

impl WebhookPayload {
    pub fn is_page(&self) -> bool {
        self.object == "page"
    }

    /// Every dispatchable event, in delivery order.
    pub fn into_events(self) -> Vec<InboundEvent> {
        self.entry
            .into_iter()
            .flat_map(|entry| entry.messaging)
            .filter_map(Messaging::into_event)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: serde_json::Value) -> WebhookPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn text_quick_reply_and_postback() {
        let payload = parse(serde_json::json!({
            "object": "page",
            "entry": [{
                "id": "page-1",
                "time": 1700000000,
                "messaging": [
                    { "sender": { "id": "u1" }, "recipient": { "id": "page-1" },
                      "message": { "mid": "m1", "text": "Pizza or sushi?" } },
                    { "sender": { "id": "u1" },
                      "message": { "text": "Yes", "quick_reply": { "payload": "VALID_QUESTION" } } },
                    { "sender": { "id": "u2" },
                      "postback": { "title": "Get Started", "payload": "GET_STARTED" } }
                ]
            }]
        }));
        assert!(payload.is_page());
        let events = payload.into_events();
        assert_eq!(
            events,
            vec![
                InboundEvent::text("u1", "Pizza or sushi?"),
                InboundEvent::quick_reply("u1", "Yes", "VALID_QUESTION"),
                InboundEvent::postback("u2", "GET_STARTED"),
            ]
        );
    }

    #[test]
    fn echoes_and_receipts_are_skipped() {
        let payload = parse(serde_json::json!({
            "object": "page",
            "entry": [{
                "messaging": [
                    { "sender": { "id": "page-1" }, "message": { "text": "ok", "is_echo": true } },
                    { "sender": { "id": "u1" }, "delivery": { "mids": ["m1"], "watermark": 1 } },
                    { "sender": { "id": "u1" }, "read": { "watermark": 1 } }
                ]
            }]
        }));
        assert!(payload.into_events().is_empty());
    }

    #[test]
    fn attachment_becomes_textless_message() {
        let payload = parse(serde_json::json!({
            "object": "page",
            "entry": [{
                "messaging": [{
                    "sender": { "id": "u1" },
                    "message": { "attachments": [{ "type": "image", "payload": { "url": "https://x" } }] }
                }]
            }]
        }));
        let events = payload.into_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].message_text(), None);
        assert!(!events[0].is_postback());
    }
}
