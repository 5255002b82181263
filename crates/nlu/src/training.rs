//! Training payloads built from user corrections.

use {
    regex::RegexBuilder,
    serde::{Serialize, Serializer, ser::SerializeStruct},
};

/// A whole-utterance label such as `intent=or_question` or `sentiment=neutral`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraitEntity {
    pub entity: String,
    pub value: String,
}

impl TraitEntity {
    pub fn new(entity: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            value: value.into(),
        }
    }

    pub fn intent(value: impl Into<String>) -> Self {
        Self::new("intent", value)
    }

    pub fn sentiment(value: impl Into<String>) -> Self {
        Self::new("sentiment", value)
    }
}

/// A labeled substring of the utterance. Offsets count characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordEntity {
    pub entity: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// A correction for one utterance, in the shape the service's `/samples`
/// endpoint accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingSample {
    pub text: String,
    pub trait_entity: Option<TraitEntity>,
    pub word_entities: Vec<WordEntity>,
}

impl TrainingSample {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            trait_entity: None,
            word_entities: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_trait(mut self, trait_entity: TraitEntity) -> Self {
        self.trait_entity = Some(trait_entity);
        self
    }

    #[must_use]
    pub fn with_words(mut self, words: Vec<WordEntity>) -> Self {
        self.word_entities = words;
        self
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum WireEntity<'a> {
    Trait(&'a TraitEntity),
    Word(&'a WordEntity),
}

impl Serialize for TrainingSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entities: Vec<WireEntity<'_>> = self
            .trait_entity
            .iter()
            .map(WireEntity::Trait)
            .chain(self.word_entities.iter().map(WireEntity::Word))
            .collect();
        let mut state = serializer.serialize_struct("TrainingSample", 2)?;
        state.serialize_field("text", &self.text)?;
        state.serialize_field("entities", &entities)?;
        state.end()
    }
}

/// Split a user's list of choices on `", "` and on the word `" or "`, in any
/// mix. This accepts more than splitting on `" or "` alone whenever it is
/// present: "red, green or blue" yields three choices, not
/// `["red, green", "blue"]`.
pub fn split_choices(input: &str) -> Vec<String> {
    input
        .split(", ")
        .flat_map(|part| part.split(" or "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Location of the first case-insensitive occurrence of `needle` in `text`.
///
/// Returns `(start, end, matched)` with character offsets and the matched
/// slice in the original casing.
pub fn substring_offset(text: &str, needle: &str) -> Option<(usize, usize, String)> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let re = RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .ok()?;
    let found = re.find(text)?;
    let start = text[..found.start()].chars().count();
    let end = start + found.as_str().chars().count();
    Some((start, end, found.as_str().to_string()))
}

/// Word entities for every candidate found in `text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordMatches {
    pub found: Vec<WordEntity>,
    /// Candidates that do not occur in the text.
    pub missing: Vec<String>,
}

pub fn build_word_entities(text: &str, candidates: &[String], entity: &str) -> WordMatches {
    let mut matches = WordMatches::default();
    for candidate in candidates {
        match substring_offset(text, candidate) {
            Some((start, end, value)) => matches.found.push(WordEntity {
                entity: entity.to_string(),
                value,
                start,
                end,
            }),
            None => matches.missing.push(candidate.clone()),
        }
    }
    matches
}
