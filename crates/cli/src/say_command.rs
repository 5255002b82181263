use std::sync::Arc;

use {
    anyhow::Result,
    clap::Args,
    quandary_channels::ConsoleOutbound,
    quandary_common::{EventKind, InboundEvent},
    quandary_config::QuandaryConfig,
    quandary_gateway::services::BotServices,
    tracing::debug,
};

#[derive(Args)]
pub struct SayArgs {
    /// Sender id the event comes from.
    #[arg(long, default_value = "console")]
    user: String,
    /// Message text. With `--quick-reply`, the tapped chip's title.
    #[arg(long, conflicts_with = "postback")]
    text: Option<String>,
    /// Payload of a tapped quick reply.
    #[arg(long, conflicts_with = "postback")]
    quick_reply: Option<String>,
    /// Send a postback with this payload instead of a message.
    #[arg(long)]
    postback: Option<String>,
    /// Also print typing indicators and read receipts.
    #[arg(long)]
    show_actions: bool,
}

impl SayArgs {
    fn into_event(self) -> InboundEvent {
        match (self.postback, self.quick_reply, self.text) {
            (Some(payload), ..) => InboundEvent::postback(self.user, payload),
            (None, Some(payload), title) => {
                let title = title.unwrap_or_else(|| payload.clone());
                InboundEvent::quick_reply(self.user, title, payload)
            },
            (None, None, Some(text)) => InboundEvent::text(self.user, text),
            (None, None, None) => InboundEvent {
                sender_id: self.user,
                kind: EventKind::Message {
                    text: None,
                    quick_reply: None,
                },
            },
        }
    }
}

/// Run one dispatch, then wait for any training it started.
pub async fn handle_say(config: &QuandaryConfig, args: SayArgs) -> Result<()> {
    let outbound = Arc::new(ConsoleOutbound::stdout().with_actions(args.show_actions));
    let BotServices {
        dispatcher,
        mut training_outcomes,
    } = BotServices::from_config(config, outbound).await?;

    let outcome = dispatcher.dispatch(args.into_event()).await?;
    debug!(?outcome, "dispatched");
    drop(dispatcher);

    while let Some(outcome) = training_outcomes.recv().await {
        match outcome.error {
            None => eprintln!("trained on \"{}\"", outcome.sample.text),
            Some(error) => eprintln!("training on \"{}\" failed: {error}", outcome.sample.text),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(text: Option<&str>, quick_reply: Option<&str>, postback: Option<&str>) -> SayArgs {
        SayArgs {
            user: "u1".into(),
            text: text.map(String::from),
            quick_reply: quick_reply.map(String::from),
            postback: postback.map(String::from),
            show_actions: false,
        }
    }

    #[test]
    fn builds_each_event_kind() {
        assert_eq!(
            args(Some("hey"), None, None).into_event(),
            InboundEvent::text("u1", "hey")
        );
        assert_eq!(
            args(Some("Yes"), Some("VALID_QUESTION"), None).into_event(),
            InboundEvent::quick_reply("u1", "Yes", "VALID_QUESTION")
        );
        assert_eq!(
            args(None, None, Some("GET_STARTED")).into_event(),
            InboundEvent::postback("u1", "GET_STARTED")
        );
    }

    #[test]
    fn quick_reply_without_title_reuses_payload() {
        assert_eq!(
            args(None, Some("YES"), None).into_event(),
            InboundEvent::quick_reply("u1", "YES", "YES")
        );
    }

    #[test]
    fn nothing_given_is_a_textless_message() {
        let event = args(None, None, None).into_event();
        assert_eq!(event.message_text(), None);
        assert!(!event.is_postback());
    }
}
