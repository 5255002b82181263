//! Memoization of classification results.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
};

use {async_trait::async_trait, tracing::trace};

#[cfg(feature = "metrics")]
use quandary_metrics::{counter, nlu as nlu_metrics};

use crate::{EntitySet, Result, TrainingSample, Understander};

/// Utterances remembered before the oldest is dropped.
pub const DEFAULT_CACHE_CAPACITY: usize = 4096;

#[derive(Default)]
struct Entries {
    map: HashMap<String, EntitySet>,
    /// Insertion order, oldest first.
    order: VecDeque<String>,
}

/// Wraps an [`Understander`] and remembers each utterance's classification.
///
/// Only successful results are cached, and at most `capacity` of them; the
/// oldest entry goes first. Training an utterance evicts its entry so the
/// next lookup sees the corrected model. One instance per request gives
/// request scope; sharing one gives process scope.
pub struct CachedUnderstander {
    inner: Arc<dyn Understander>,
    capacity: usize,
    entries: Mutex<Entries>,
}

impl CachedUnderstander {
    pub fn new(inner: Arc<dyn Understander>) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: Arc<dyn Understander>, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, utterance: &str) -> Option<EntitySet> {
        self.entries.lock().ok()?.map.get(utterance).cloned()
    }

    fn store(&self, utterance: &str, entities: &EntitySet) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };
        if entries
            .map
            .insert(utterance.to_string(), entities.clone())
            .is_some()
        {
            return;
        }
        entries.order.push_back(utterance.to_string());
        while entries.map.len() > self.capacity {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
        }
    }

    fn evict(&self, utterance: &str) {
        if let Ok(mut entries) = self.entries.lock()
            && entries.map.remove(utterance).is_some()
        {
            entries.order.retain(|u| u != utterance);
        }
    }
}

#[async_trait]
impl Understander for CachedUnderstander {
    async fn classify(&self, utterance: &str) -> Result<EntitySet> {
        if let Some(hit) = self.lookup(utterance) {
            trace!(utterance, "NLU cache hit");
            #[cfg(feature = "metrics")]
            counter!(nlu_metrics::CACHE_HITS_TOTAL).increment(1);
            return Ok(hit);
        }
        let entities = self.inner.classify(utterance).await?;
        self.store(utterance, &entities);
        Ok(entities)
    }

    async fn train(&self, sample: &TrainingSample) -> Result<()> {
        self.inner.train(sample).await?;
        self.evict(&sample.text);
        Ok(())
    }
}
