//! Natural-sounding lead-ins for picked answers.

use std::sync::Arc;

use rand::{Rng, seq::IndexedRandom};

use crate::tagger::{LexiconTagger, Tagger};

/// Lead-ins for answers that start with a verb ("go to the gym").
pub const VERB_LEAD_INS: &[&str] = &[
    "You should",
    "If I were you, I'd",
    "You better",
    "Certainly",
    "Probably",
    "Definitely",
    "I advise you to",
    "I urge you to",
];

/// Lead-ins for nouns, adjectives, determiners and numerals ("sushi").
pub const NON_VERB_LEAD_INS: &[&str] = &[
    "Go with",
    "I'd pick",
    "Settle on",
    "Definitely",
    "Probably",
    "Absolutely",
];

fn lead_ins_for(tag: &str) -> Option<&'static [&'static str]> {
    if ["NN", "JJ", "DT", "CD"].iter().any(|p| tag.starts_with(p)) {
        Some(NON_VERB_LEAD_INS)
    } else if tag.starts_with("VB") {
        Some(VERB_LEAD_INS)
    } else {
        None
    }
}

/// Prefix `answer` with a lead-in chosen by its grammatical category.
///
/// Categories outside both pools return the answer unchanged.
pub fn phrase<R: Rng + ?Sized>(answer: &str, tag: &str, rng: &mut R) -> String {
    match lead_ins_for(tag).and_then(|pool| pool.choose(rng)) {
        Some(lead_in) => format!("{lead_in} {answer}"),
        None => answer.to_string(),
    }
}

/// Tags an answer's first token and phrases it.
#[derive(Clone)]
pub struct AnswerComposer {
    tagger: Arc<dyn Tagger>,
}

impl Default for AnswerComposer {
    fn default() -> Self {
        Self::new(Arc::new(LexiconTagger::new()))
    }
}

impl AnswerComposer {
    pub fn new(tagger: Arc<dyn Tagger>) -> Self {
        Self { tagger }
    }

    pub fn compose(&self, answer: &str) -> String {
        let tags = self.tagger.tag(answer);
        let Some((_, tag)) = tags.first() else {
            return answer.to_string();
        };
        phrase(answer, tag, &mut rand::rng())
    }
}

#[cfg(test)]
mod tests {
    use {super::*, rand::{SeedableRng, rngs::StdRng}};

    fn lead_in_of<'a>(phrased: &'a str, answer: &str) -> &'a str {
        phrased
            .strip_suffix(answer)
            .and_then(|s| s.strip_suffix(' '))
            .unwrap()
    }

    #[test]
    fn nouns_use_the_non_verb_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for tag in ["NN", "NNS", "JJ", "DT", "CD"] {
            let phrased = phrase("sushi", tag, &mut rng);
            assert!(NON_VERB_LEAD_INS.contains(&lead_in_of(&phrased, "sushi")), "{phrased}");
        }
    }

    #[test]
    fn verbs_use_the_verb_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        for tag in ["VB", "VBG", "VBD"] {
            let phrased = phrase("go to the gym", tag, &mut rng);
            assert!(VERB_LEAD_INS.contains(&lead_in_of(&phrased, "go to the gym")), "{phrased}");
        }
    }

    #[test]
    fn other_categories_pass_through() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(phrase("quickly", "RB", &mut rng), "quickly");
        assert_eq!(phrase("to the left", "TO", &mut rng), "to the left");
    }

    struct FixedTagger(&'static str);

    impl Tagger for FixedTagger {
        fn tag(&self, text: &str) -> Vec<(String, String)> {
            text.split_whitespace()
                .map(|t| (t.to_string(), self.0.to_string()))
                .collect()
        }
    }

    #[test]
    fn composer_uses_first_token_category() {
        let composer = AnswerComposer::new(Arc::new(FixedTagger("VB")));
        let phrased = composer.compose("stay home");
        assert!(VERB_LEAD_INS.contains(&lead_in_of(&phrased, "stay home")));
    }

    #[test]
    fn composer_passes_untaggable_text_through() {
        let composer = AnswerComposer::default();
        assert_eq!(composer.compose("?!"), "?!");
    }
}
