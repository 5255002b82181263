//! Wiring of the bot's collaborators from config.

use std::sync::Arc;

use {
    anyhow::Context,
    quandary_channels::ChannelOutbound,
    quandary_config::{NluConfig, QuandaryConfig, SessionBackendKind, SessionsConfig},
    quandary_dispatch::Dispatcher,
    quandary_flows::{Flows, default_rules},
    quandary_messenger::MessengerAccountConfig,
    quandary_nlu::{TrainingOutcome, TrainingSubmitter, Understander, WitClient},
    quandary_sessions::{SessionStore, SqliteSessionBackend},
    secrecy::Secret,
    tokio::sync::mpsc,
    tracing::{info, warn},
};

/// Open the configured session backend.
pub async fn open_session_store(config: &SessionsConfig) -> anyhow::Result<Arc<SessionStore>> {
    let store = match config.backend {
        SessionBackendKind::Memory => SessionStore::in_memory(),
        SessionBackendKind::Sqlite => {
            let backend = SqliteSessionBackend::connect(&config.database_url)
                .await
                .with_context(|| format!("opening session database {}", config.database_url))?;
            info!(database_url = %config.database_url, "sqlite session store ready");
            SessionStore::new(Arc::new(backend))
        },
    };
    Ok(Arc::new(store))
}

pub fn nlu_client(config: &NluConfig) -> Arc<dyn Understander> {
    let token = config.token.clone().unwrap_or_else(|| {
        warn!("no NLU token configured; classification will fail");
        Secret::new(String::new())
    });
    let client = WitClient::new(config.base_url.clone(), token, config.version.clone());
    info!(base_url = %config.base_url, version = client.version(), "NLU client ready");
    Arc::new(client)
}

/// Parse the `channels.messenger` section, if present.
pub fn messenger_config(config: &QuandaryConfig) -> anyhow::Result<Option<MessengerAccountConfig>> {
    config
        .channels
        .messenger
        .clone()
        .map(MessengerAccountConfig::from_value)
        .transpose()
        .context("invalid channels.messenger section")
}

/// A ready dispatcher plus the stream of its training outcomes.
pub struct BotServices {
    pub dispatcher: Arc<Dispatcher>,
    pub training_outcomes: mpsc::UnboundedReceiver<TrainingOutcome>,
}

impl BotServices {
    /// Build the dispatcher with the default rule table and the handler
    /// catalog, delivering replies through `outbound`.
    pub async fn from_config(
        config: &QuandaryConfig,
        outbound: Arc<dyn ChannelOutbound>,
    ) -> anyhow::Result<Self> {
        let store = open_session_store(&config.sessions).await?;
        Self::with_store(config, store, nlu_client(&config.nlu), outbound)
    }

    pub fn with_store(
        config: &QuandaryConfig,
        store: Arc<SessionStore>,
        nlu: Arc<dyn Understander>,
        outbound: Arc<dyn ChannelOutbound>,
    ) -> anyhow::Result<Self> {
        let (tx, training_outcomes) = mpsc::unbounded_channel();
        let flows = Flows::from_config(&config.flows);
        let dispatcher = Dispatcher::new(store, nlu, outbound, Arc::new(flows))
            .with_cache_scope(config.nlu.cache_scope)
            .with_training(TrainingSubmitter::with_channel(tx))
            .with_rules(default_rules().context("building the rule table")?);
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            training_outcomes,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, quandary_channels::ConsoleOutbound, quandary_common::InboundEvent};

    #[tokio::test]
    async fn sqlite_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionsConfig {
            backend: SessionBackendKind::Sqlite,
            database_url: format!("sqlite://{}?mode=rwc", dir.path().join("s.db").display()),
        };

        let store = open_session_store(&config).await.unwrap();
        let mut user = store.find_or_create("u1").await.unwrap();
        user.session.set(quandary_sessions::SessionKey::LastAnswer, "Yes");
        store.save(&user).await.unwrap();
        drop(user);
        drop(store);

        let reopened = open_session_store(&config).await.unwrap();
        let session = reopened.load("u1").await.unwrap().unwrap();
        assert_eq!(session.last_answer(), Some("Yes"));
    }

    #[test]
    fn missing_messenger_section_is_none() {
        assert!(messenger_config(&QuandaryConfig::default()).unwrap().is_none());
    }

    #[test]
    fn malformed_messenger_section_is_an_error() {
        let mut config = QuandaryConfig::default();
        config.channels.messenger = Some(serde_json::json!({ "verify_token": 42 }));
        assert!(messenger_config(&config).is_err());
    }

    #[tokio::test]
    async fn builds_a_working_dispatcher() {
        let config = QuandaryConfig::default();
        let outbound = Arc::new(ConsoleOutbound::new(Box::new(std::io::sink())));
        let services = BotServices::from_config(&config, outbound).await.unwrap();
        let outcome = services
            .dispatcher
            .dispatch(InboundEvent::postback("u1", "GET_STARTED"))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            quandary_dispatch::DispatchOutcome::Matched {
                rule: "get_started".into()
            }
        );
    }
}
