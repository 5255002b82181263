//! Natural-language-understanding client.
//!
//! Classifies utterances into intent/sentiment/option entities through an
//! external Wit-style service, memoizes results, and packages user
//! corrections into training samples.

pub mod cache;
pub mod client;
pub mod entity;
pub mod error;
pub mod submit;
pub mod training;

pub use {
    cache::CachedUnderstander,
    client::{Understander, WitClient},
    entity::{EntitySet, EntityValue},
    error::{Error, Result},
    submit::{TrainingOutcome, TrainingSubmitter},
    training::{TrainingSample, TraitEntity, WordEntity},
};
