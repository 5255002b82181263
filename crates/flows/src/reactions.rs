//! Short-circuit reactions to messages that are not questions.

use {quandary_common::Command, quandary_dispatch::ConversationContext, quandary_nlu::EntitySet};

use crate::replies;

pub const GREETING: &str = "Hello! I can make decisions for you. Ask me a question";
pub const USAGE_EXAMPLES: &str =
    "For example: \"Should I go to the gym today?\" or \"Pizza or sushi?\"";
const THANKS: &str = "You're welcome!";
const APOLOGY: &str = "I'm sorry, I'm still learning!";
const POSITIVE: &str = "😎 Let's do another one!";
const NEUTRAL: &str = "Cool. Let's do another one.";
const PERSONAL: &str = "We are not talking about me, sorry.";

/// Whether `text` contains a second-person word ("you", "your", "you're").
pub fn addresses_bot(text: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'' && c != '_')
        .any(|word| {
            let lower = word.to_lowercase();
            lower.strip_prefix("you").is_some_and(|rest| {
                rest.chars().count() <= 3 && rest.chars().all(|c| c.is_ascii_alphabetic() || c == '\'')
            })
        })
}

/// Run the first matching reaction. Returns `true` if one ran, in which case
/// the message needs no further processing.
pub async fn react(ctx: &mut ConversationContext, entities: &EntitySet, text: &str) -> bool {
    if entities.contains("intent") {
        return false;
    }

    if entities.contains("greetings") {
        ctx.say(GREETING).await;
        ctx.say(USAGE_EXAMPLES).await;
    } else if entities.contains("thanks") {
        ctx.say(THANKS).await;
    } else if entities.has_value("sentiment", "negative") {
        ctx.say(APOLOGY).await;
        if let Some(utterance) = ctx.session().needs_correction().map(str::to_owned) {
            ctx.say_with_replies(
                &format!(
                    "Did I get your last phrase wrong? If I remember correctly, it was: \
                     \"{utterance}\". Do you want to correct me?"
                ),
                &replies::yes_no(),
            )
            .await;
            ctx.next_command(Command::AgreeToCorrect);
        }
    } else if entities.has_value("sentiment", "positive") {
        ctx.say(POSITIVE).await;
    } else if entities.has_value("sentiment", "neutral") {
        ctx.say(NEUTRAL).await;
    } else if addresses_bot(text) {
        ctx.say(PERSONAL).await;
    } else {
        return false;
    }
    true
}
