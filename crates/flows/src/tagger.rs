//! Part-of-speech tagging for answer fragments.

/// Assigns a Penn Treebank tag (`NN`, `VB`, `JJ`, ...) to each token.
pub trait Tagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<(String, String)>;
}

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "some", "any", "each", "every", "no",
    "another", "either", "neither", "both", "all",
];
const POSSESSIVES: &[&str] = &["my", "your", "his", "her", "its", "our", "their"];
const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself", "yourself",
];
const PREPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "from", "of", "about", "into", "over", "under",
    "after", "before", "around", "without",
];
const MODALS: &[&str] = &[
    "can", "could", "will", "would", "shall", "should", "may", "might", "must",
];
const VERBS: &[&str] = &[
    "be", "go", "stay", "eat", "drink", "buy", "sell", "call", "text", "watch", "read", "sleep",
    "work", "study", "play", "run", "walk", "take", "make", "get", "do", "have", "try", "leave",
    "wait", "ask", "tell", "cook", "order", "write", "learn", "visit", "quit", "keep", "move",
    "rest", "travel", "start", "stop", "join", "apply", "rent", "see", "meet", "break", "dance",
    "sing", "swim", "drive", "fly", "sit", "listen", "marry", "invest", "save", "spend",
];
const NUMBER_WORDS: &[&str] = &[
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "twenty", "hundred", "thousand", "million",
];
const ADJECTIVE_SUFFIXES: &[&str] = &["ous", "ful", "ive", "able", "ible", "less", "ish"];

/// A closed-lexicon tagger with suffix heuristics.
///
/// Good enough to tell "go to the gym" (verb phrase) from "sushi" (noun) or
/// "red" (adjective), which is all the answer composer needs. Unknown words
/// are nouns.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconTagger;

impl LexiconTagger {
    pub fn new() -> Self {
        Self
    }

    fn tag_word(word: &str) -> &'static str {
        let lower = word.to_lowercase();
        let w = lower.as_str();
        if DETERMINERS.contains(&w) {
            "DT"
        } else if POSSESSIVES.contains(&w) {
            "PRP$"
        } else if PRONOUNS.contains(&w) {
            "PRP"
        } else if w == "to" {
            "TO"
        } else if PREPOSITIONS.contains(&w) {
            "IN"
        } else if MODALS.contains(&w) {
            "MD"
        } else if VERBS.contains(&w) {
            "VB"
        } else if NUMBER_WORDS.contains(&w) || is_numeral(w) {
            "CD"
        } else if w.len() > 4 && w.ends_with("ly") {
            "RB"
        } else if w.len() > 4 && w.ends_with("ing") {
            "VBG"
        } else if w.len() > 3 && w.ends_with("ed") {
            "VBD"
        } else if ADJECTIVE_SUFFIXES
            .iter()
            .any(|s| w.len() > s.len() + 1 && w.ends_with(s))
        {
            "JJ"
        } else {
            "NN"
        }
    }
}

fn is_numeral(word: &str) -> bool {
    let digits = word.trim_start_matches(['$', '€', '£', '#']);
    !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '%'))
}

impl Tagger for LexiconTagger {
    fn tag(&self, text: &str) -> Vec<(String, String)> {
        text.split_whitespace()
            .map(|raw| {
                raw.trim_matches(|c: char| {
                    !c.is_alphanumeric() && !matches!(c, '$' | '€' | '£' | '#' | '%' | '\'')
                })
            })
            .filter(|token| !token.is_empty())
            .map(|token| (token.to_string(), Self::tag_word(token).to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_tag(text: &str) -> String {
        LexiconTagger.tag(text)[0].1.clone()
    }

    #[test]
    fn verbs_and_nouns() {
        assert_eq!(first_tag("go to the gym"), "VB");
        assert_eq!(first_tag("Sushi"), "NN");
        assert_eq!(first_tag("stay home"), "VB");
    }

    #[test]
    fn closed_classes() {
        assert_eq!(first_tag("the red one"), "DT");
        assert_eq!(first_tag("to the left"), "TO");
        assert_eq!(first_tag("with friends"), "IN");
        assert_eq!(first_tag("my place"), "PRP$");
    }

    #[test]
    fn numerals() {
        assert_eq!(first_tag("42"), "CD");
        assert_eq!(first_tag("$3.50"), "CD");
        assert_eq!(first_tag("three"), "CD");
    }

    #[test]
    fn suffix_heuristics() {
        assert_eq!(first_tag("quickly"), "RB");
        assert_eq!(first_tag("running"), "VBG");
        assert_eq!(first_tag("dangerous"), "JJ");
        assert_eq!(first_tag("walked"), "VBD");
    }

    #[test]
    fn punctuation_is_stripped() {
        let tags = LexiconTagger.tag("  pizza? , sushi!");
        assert_eq!(
            tags,
            vec![
                ("pizza".to_string(), "NN".to_string()),
                ("sushi".to_string(), "NN".to_string()),
            ]
        );
    }

    #[test]
    fn empty_text_has_no_tags() {
        assert!(LexiconTagger.tag(" ?! ").is_empty());
    }
}
