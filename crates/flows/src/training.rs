//! The correction dialog: collect what the bot got wrong and train on it.

use {
    quandary_common::Command,
    quandary_dispatch::{ConversationContext, Result},
    quandary_nlu::{
        TrainingSample, TraitEntity,
        training::{build_word_entities, split_choices},
    },
    quandary_sessions::SessionKey,
    tracing::debug,
};

use crate::{
    Flows, pick,
    replies::{self, payload},
};

const FORGOTTEN: &str = "Hmm, I lost track of what we were correcting. Ask me a question!";
const THANK_YOU: &str = "Thank you for cooperation! I just got a bit smarter";
const CHOICES_PROMPT: &str = "What were the choices? Separate them by commas. \
                              Use exact wording, please. Otherwise I won't learn on my mistakes :(";

/// The stored utterance being corrected, or a message and a closed thread.
async fn utterance_or_end(ctx: &mut ConversationContext) -> Option<String> {
    let utterance = ctx.session().needs_correction().map(str::to_owned);
    if utterance.is_none() {
        ctx.say(FORGOTTEN).await;
        ctx.stop_thread();
    }
    utterance
}

fn said_yes(ctx: &ConversationContext) -> bool {
    ctx.quick_reply() == Some(payload::YES)
        || ctx
            .text()
            .is_some_and(|t| t.to_lowercase().contains("yes"))
}

impl Flows {
    pub(crate) async fn agree_to_correct(&self, ctx: &mut ConversationContext) -> Result<()> {
        if !said_yes(ctx) {
            ctx.say("Nevermind. Let's do it later!").await;
            ctx.stop_thread();
            return Ok(());
        }
        let Some(utterance) = utterance_or_end(ctx).await else {
            return Ok(());
        };
        let last_answer = ctx
            .session()
            .last_answer()
            .unwrap_or("(no answer)")
            .to_owned();
        ctx.say_with_replies(
            &format!(
                "Here's what we are correcting: \n\nYou: \"{utterance}\" \nMe: \"{last_answer}\" \
                 \n\nWhat did I get wrong?"
            ),
            &replies::possible_errors(),
        )
        .await;
        ctx.next_command(Command::StartCorrection);
        Ok(())
    }

    pub(crate) async fn start_correction(&self, ctx: &mut ConversationContext) -> Result<()> {
        match ctx.quick_reply() {
            Some(payload::WRONG_TYPE) => self.ask_question_type(ctx).await,
            Some(payload::WRONG_CHOICES) => {
                ctx.session_mut().set(SessionKey::CorrectTrait, "or_question");
                self.ask_choices(ctx).await;
            },
            Some(payload::ALL_OK) => {
                ctx.say("No problem.").await;
                ctx.stop_thread();
            },
            _ => {
                ctx.say("Sorry! I can only learn if you correct me").await;
                ctx.stop_thread();
            },
        }
        Ok(())
    }

    pub(crate) async fn was_it_a_question(&self, ctx: &mut ConversationContext) -> Result<()> {
        match ctx.quick_reply() {
            Some(payload::NOT_A_QUESTION) => {
                let Some(utterance) = utterance_or_end(ctx).await else {
                    return Ok(());
                };
                ctx.say("Noted. Let's try again ;) Ask me a question!").await;
                let sample =
                    TrainingSample::new(utterance).with_trait(TraitEntity::sentiment("neutral"));
                ctx.train(sample);
                ctx.stop_thread();
            },
            Some(payload::NOT_VALID_QUESTION) => {
                ctx.say("All right then. Give me a good one!").await;
                ctx.stop_thread();
            },
            _ => self.ask_question_type(ctx).await,
        }
        Ok(())
    }

    pub(crate) async fn correct_question_type(&self, ctx: &mut ConversationContext) -> Result<()> {
        let Some(selection) = ctx.quick_reply().map(str::to_owned) else {
            ctx.say("You did not give me a chance to learn, but thanks for cooperation anyway!")
                .await;
            ctx.stop_thread();
            return Ok(());
        };
        if selection == payload::NOT_A_QUESTION {
            ctx.say("Fine, noted!").await;
            ctx.stop_thread();
            return Ok(());
        }
        let Some(intent) = replies::intent_for(&selection) else {
            debug!(user_id = %ctx.user_id(), %selection, "unknown question type");
            ctx.say("Sorry, I don't know that kind of question yet. Let's try another one!")
                .await;
            ctx.stop_thread();
            return Ok(());
        };

        if intent == "or_question" {
            ctx.session_mut().set(SessionKey::CorrectTrait, intent);
            self.ask_choices(ctx).await;
            return Ok(());
        }

        let Some(utterance) = utterance_or_end(ctx).await else {
            return Ok(());
        };
        ctx.train(TrainingSample::new(utterance).with_trait(TraitEntity::intent(intent)));
        ctx.say(THANK_YOU).await;
        if intent == "yes_no_question" {
            let courtesy = pick(&["yes", "no"]).copied().unwrap_or("yes");
            ctx.say(&format!("By the way, answering your last question: {courtesy}"))
                .await;
        }
        ctx.stop_thread();
        Ok(())
    }

    pub(crate) async fn correct_entities(&self, ctx: &mut ConversationContext) -> Result<()> {
        if ctx.quick_reply() == Some(payload::STOP_CORRECTION) {
            ctx.say("Ok, next time then!").await;
            self.finish_correction(ctx);
            return Ok(());
        }
        let Some(input) = ctx.text().map(str::to_owned) else {
            ctx.say("I need the choices as text. Let's try again later!").await;
            self.finish_correction(ctx);
            return Ok(());
        };
        let Some(utterance) = utterance_or_end(ctx).await else {
            return Ok(());
        };

        let candidates = split_choices(&input);
        let matches = build_word_entities(&utterance, &candidates, "option");
        if matches.found.is_empty() {
            ctx.say(&format!(
                "I couldn't find any of those in \"{utterance}\", so there is nothing to \
                 learn. Use exact wording next time!"
            ))
            .await;
            self.finish_correction(ctx);
            return Ok(());
        }
        if !matches.missing.is_empty() {
            debug!(user_id = %ctx.user_id(), missing = ?matches.missing, "choices not in utterance");
            ctx.say(&format!(
                "I left out {} since I couldn't find it in your question.",
                matches.missing.join(", ")
            ))
            .await;
        }

        let intent = ctx
            .session()
            .correct_trait()
            .unwrap_or("or_question")
            .to_owned();
        let echo = pick(&matches.found).map(|w| w.value.clone());
        ctx.train(
            TrainingSample::new(utterance)
                .with_trait(TraitEntity::intent(intent))
                .with_words(matches.found),
        );
        ctx.say(THANK_YOU).await;
        if let Some(echo) = echo {
            ctx.say(&format!("By the way, answering your last question: {echo}"))
                .await;
        }
        self.finish_correction(ctx);
        Ok(())
    }

    async fn ask_question_type(&self, ctx: &mut ConversationContext) {
        ctx.say_with_replies("What type of question?", &replies::question_types())
            .await;
        ctx.next_command(Command::CorrectQuestionType);
    }

    async fn ask_choices(&self, ctx: &mut ConversationContext) {
        ctx.say_with_replies(CHOICES_PROMPT, &replies::stop_correction())
            .await;
        ctx.next_command(Command::CorrectEntities);
    }

    fn finish_correction(&self, ctx: &mut ConversationContext) {
        ctx.session_mut().remove(SessionKey::CorrectTrait);
        ctx.stop_thread();
    }
}
