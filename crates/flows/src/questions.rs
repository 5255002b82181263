//! Free-text input: classify, react, answer, or start the training dialog.

use {
    quandary_common::Command,
    quandary_dispatch::{ConversationContext, Result},
    quandary_nlu::EntitySet,
    quandary_sessions::SessionKey,
    tracing::{debug, warn},
};

use crate::{Flows, pick, reactions, replies};

const TEXT_ONLY: &str = "Sorry, I only understand text. Ask me a question!";
const NLU_UNAVAILABLE: &str = "Sorry, I can't think straight right now. Ask me again in a bit!";
const YES_NO_ANSWERS: &[&str] = &["Yes", "No"];

impl Flows {
    pub(crate) async fn welcome(&self, ctx: &mut ConversationContext) -> Result<()> {
        ctx.say(reactions::GREETING).await;
        ctx.say(reactions::USAGE_EXAMPLES).await;
        Ok(())
    }

    pub(crate) async fn handle_input(&self, ctx: &mut ConversationContext) -> Result<()> {
        let Some(text) = ctx.text().map(str::to_owned) else {
            ctx.say(TEXT_ONLY).await;
            ctx.stop_thread();
            return Ok(());
        };

        ctx.mark_seen().await;
        ctx.typing(true).await;
        self.understand(ctx, &text).await;
        ctx.typing(false).await;
        Ok(())
    }

    async fn understand(&self, ctx: &mut ConversationContext, text: &str) {
        let entities = match ctx.classify().await {
            Ok(entities) => entities,
            Err(e) => {
                warn!(user_id = %ctx.user_id(), error = %e, "classification failed");
                ctx.say(NLU_UNAVAILABLE).await;
                ctx.stop_thread();
                return;
            },
        };

        if reactions::react(ctx, &entities, text).await {
            return;
        }

        // Anything past the reactions is a question we may be asked to correct.
        ctx.session_mut().set(SessionKey::NeedsCorrection, text);

        match self.answer(&entities) {
            Some(answer) => {
                ctx.say(&answer).await;
                let session = ctx.session_mut();
                session.set(SessionKey::LastAnswer, answer);
                session.reset_failures();
            },
            None => self.ask_if_question(ctx).await,
        }
    }

    /// Answer a recognized question. `None` when the question type is
    /// unknown or an "or" question came without options.
    fn answer(&self, entities: &EntitySet) -> Option<String> {
        match entities.first_value("intent") {
            Some("yes_no_question") => Some(pick(YES_NO_ANSWERS)?.to_string()),
            Some("or_question") => {
                let options = entities.values("option");
                let choice = pick(&options)?;
                Some(self.composer.compose(choice))
            },
            other => {
                debug!(intent = ?other, "not a recognized question");
                None
            },
        }
    }

    async fn ask_if_question(&self, ctx: &mut ConversationContext) {
        let session = ctx.session_mut();
        let attempt = session.failure_count();
        session.increment_failures();
        let prompt = self.prompt_for(attempt);

        ctx.say_with_replies(prompt, &replies::was_it_a_question())
            .await;
        ctx.next_command(Command::WasItAQuestion);
    }

    /// Rotates through the configured prompts by consecutive failures.
    fn prompt_for(&self, attempt: i64) -> &str {
        let len = self.prompts.len() as i64;
        if len == 0 {
            return "Was that a question?";
        }
        let index = attempt.rem_euclid(len) as usize;
        self.prompts.get(index).map_or("Was that a question?", String::as_str)
    }
}
