//! Quick-reply payloads and the chip sets offered in each dialog step.

use quandary_common::QuickReply;

/// Payloads carried back by tapped quick replies and postbacks.
pub mod payload {
    pub const GET_STARTED: &str = "GET_STARTED";

    // Answer to "was that a question?"
    pub const VALID_QUESTION: &str = "VALID_QUESTION";
    pub const NOT_VALID_QUESTION: &str = "NOT_VALID_QUESTION";
    pub const NOT_A_QUESTION: &str = "NOT_A_QUESTION";

    // What the bot got wrong
    pub const WRONG_TYPE: &str = "WRONG_TYPE";
    pub const WRONG_CHOICES: &str = "WRONG_CHOICES";
    pub const ALL_OK: &str = "ALL_OK";

    // Question types
    pub const OR_QUESTION: &str = "OR_QUESTION";
    pub const YES_NO_QUESTION: &str = "YES_NO_QUESTION";

    pub const STOP_CORRECTION: &str = "STOP_CORRECTION";
    pub const YES: &str = "YES";
    pub const NO: &str = "NO";
}

pub fn was_it_a_question() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Yes", payload::VALID_QUESTION),
        QuickReply::new("No", payload::NOT_VALID_QUESTION),
        QuickReply::new("It was a statement", payload::NOT_A_QUESTION),
    ]
}

pub fn possible_errors() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Wrong question type", payload::WRONG_TYPE),
        QuickReply::new("Wrong choices", payload::WRONG_CHOICES),
        QuickReply::new("Nevermind", payload::ALL_OK),
    ]
}

pub fn question_types() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Multiple choice", payload::OR_QUESTION),
        QuickReply::new("Yes/No question", payload::YES_NO_QUESTION),
        QuickReply::new("Nevermind", payload::NOT_A_QUESTION),
    ]
}

pub fn yes_no() -> Vec<QuickReply> {
    vec![
        QuickReply::new("Yes", payload::YES),
        QuickReply::new("No", payload::NO),
    ]
}

pub fn stop_correction() -> Vec<QuickReply> {
    vec![QuickReply::new("Forget about it", payload::STOP_CORRECTION)]
}

/// Intent label for a question-type payload (`OR_QUESTION` → `or_question`).
pub fn intent_for(question_type: &str) -> Option<&'static str> {
    match question_type {
        payload::OR_QUESTION => Some("or_question"),
        payload::YES_NO_QUESTION => Some("yes_no_question"),
        _ => None,
    }
}
