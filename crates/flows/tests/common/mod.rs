#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    async_trait::async_trait,
    quandary_channels::ChannelOutbound,
    quandary_common::{Command, InboundEvent, QuickReply},
    quandary_dispatch::{DispatchOutcome, Dispatcher},
    quandary_flows::{Flows, default_rules},
    quandary_nlu::{EntitySet, Error, TrainingOutcome, TrainingSample, TrainingSubmitter, Understander},
    quandary_sessions::{Session, SessionStore},
    tokio::sync::mpsc,
};

#[derive(Debug, Clone)]
pub struct Sent {
    pub to: String,
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl Sent {
    pub fn payloads(&self) -> Vec<&str> {
        self.quick_replies.iter().map(|q| q.payload.as_str()).collect()
    }
}

#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<Sent>>,
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(
        &self,
        to: &str,
        text: &str,
        quick_replies: &[QuickReply],
    ) -> quandary_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent {
            to: to.into(),
            text: text.into(),
            quick_replies: quick_replies.to_vec(),
        });
        Ok(())
    }
}

/// Answers from a fixed table; unknown utterances classify as empty.
#[derive(Default)]
pub struct ScriptedNlu {
    answers: HashMap<String, EntitySet>,
    unavailable: bool,
    rejects_training: bool,
}

impl ScriptedNlu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn knows(mut self, utterance: &str, entities: EntitySet) -> Self {
        self.answers.insert(utterance.into(), entities);
        self
    }

    pub fn rejecting_training(mut self) -> Self {
        self.rejects_training = true;
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Understander for ScriptedNlu {
    async fn classify(&self, utterance: &str) -> quandary_nlu::Result<EntitySet> {
        if self.unavailable {
            return Err(Error::status(503, "down for maintenance"));
        }
        Ok(self.answers.get(utterance).cloned().unwrap_or_default())
    }

    async fn train(&self, _sample: &TrainingSample) -> quandary_nlu::Result<()> {
        if self.unavailable || self.rejects_training {
            return Err(Error::status(503, "down for maintenance"));
        }
        Ok(())
    }
}

pub struct Harness {
    pub dispatcher: Dispatcher,
    pub outbound: Arc<RecordingOutbound>,
    outcomes: mpsc::UnboundedReceiver<TrainingOutcome>,
}

impl Harness {
    pub fn new(nlu: ScriptedNlu) -> Self {
        Self::with_flows(nlu, Flows::default())
    }

    pub fn with_flows(nlu: ScriptedNlu, flows: Flows) -> Self {
        let outbound = Arc::new(RecordingOutbound::default());
        let (tx, outcomes) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(
            Arc::new(SessionStore::in_memory()),
            Arc::new(nlu),
            outbound.clone(),
            Arc::new(flows),
        )
        .with_training(TrainingSubmitter::with_channel(tx))
        .with_rules(default_rules().unwrap());
        Self {
            dispatcher,
            outbound,
            outcomes,
        }
    }

    pub async fn send(&self, event: InboundEvent) -> DispatchOutcome {
        self.dispatcher.dispatch(event).await.unwrap()
    }

    pub async fn text(&self, user: &str, text: &str) -> DispatchOutcome {
        self.send(InboundEvent::text(user, text)).await
    }

    pub async fn tap(&self, user: &str, title: &str, payload: &str) -> DispatchOutcome {
        self.send(InboundEvent::quick_reply(user, title, payload)).await
    }

    /// Everything sent so far; clears the log.
    pub fn take_sent(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.outbound.sent.lock().unwrap())
    }

    pub fn take_texts(&self) -> Vec<String> {
        self.take_sent().into_iter().map(|s| s.text).collect()
    }

    pub async fn session(&self, user: &str) -> Session {
        self.dispatcher
            .store()
            .load(user)
            .await
            .unwrap()
            .unwrap_or_default()
    }

    pub async fn pending(&self, user: &str) -> Option<Command> {
        self.session(user).await.pending_command()
    }

    pub async fn next_training(&mut self) -> TrainingOutcome {
        tokio::time::timeout(Duration::from_secs(2), self.outcomes.recv())
            .await
            .expect("training was not submitted")
            .expect("training channel closed")
    }

    pub async fn assert_no_training(&mut self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(self.outcomes.try_recv().is_err(), "unexpected training");
    }
}
