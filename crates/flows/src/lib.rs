//! Conversation handlers.
//!
//! [`Flows`] implements every [`Command`]: the greeting, free-text input with
//! its short-circuit reactions and question answering, and the multi-step
//! correction dialog that turns user feedback into training samples.

pub mod composer;
pub mod reactions;
pub mod replies;
pub mod tagger;

mod questions;
mod training;

use {
    async_trait::async_trait,
    quandary_common::Command,
    quandary_config::FlowsConfig,
    quandary_dispatch::{
        CommandHandlers, ConversationContext, MatchMode, MatchRule, Result, RuleAction, say,
    },
    rand::seq::IndexedRandom,
};

pub use {
    composer::{AnswerComposer, phrase},
    tagger::{LexiconTagger, Tagger},
};

/// Random element of `items`. `None` when empty.
pub(crate) fn pick<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// The handler catalog.
pub struct Flows {
    composer: AnswerComposer,
    prompts: Vec<String>,
}

impl Flows {
    /// `prompts` rotate when consecutive questions go unrecognized.
    pub fn new(composer: AnswerComposer, prompts: Vec<String>) -> Self {
        Self { composer, prompts }
    }

    pub fn from_config(config: &FlowsConfig) -> Self {
        Self::new(AnswerComposer::default(), config.unrecognized_prompts.clone())
    }
}

impl Default for Flows {
    fn default() -> Self {
        Self::from_config(&FlowsConfig::default())
    }
}

#[async_trait]
impl CommandHandlers for Flows {
    async fn execute(&self, command: Command, ctx: &mut ConversationContext) -> Result<()> {
        match command {
            Command::Welcome => self.welcome(ctx).await,
            Command::HandleInput => self.handle_input(ctx).await,
            Command::WasItAQuestion => self.was_it_a_question(ctx).await,
            Command::AgreeToCorrect => self.agree_to_correct(ctx).await,
            Command::StartCorrection => self.start_correction(ctx).await,
            Command::CorrectQuestionType => self.correct_question_type(ctx).await,
            Command::CorrectEntities => self.correct_entities(ctx).await,
        }
    }
}

/// The bot's routing table: the get-started postback greets, free text goes
/// through classification, anything else gets a plain acknowledgment.
pub fn default_rules() -> Result<Vec<MatchRule>> {
    Ok(vec![
        MatchRule::pattern(
            &[replies::payload::GET_STARTED],
            MatchMode::Any,
            RuleAction::Invoke(Command::Welcome),
        )?
        .named("get_started"),
        MatchRule::intent(Command::HandleInput),
        MatchRule::fallback(RuleAction::Inline(say("ok"))),
    ])
}
