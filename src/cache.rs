//! Memoization of the two network-bound steps.
//!
//! Topic search results are keyed by topic; formatter output by
//! (topic, difficulty). One quiz is active at a time, so nothing is evicted;
//! entries are dropped only through explicit invalidation.

use std::collections::HashMap;

use tracing::debug;

use crate::prompts::Difficulty;
use crate::retrieval::Passage;

#[derive(Debug, Clone, Default)]
pub struct QuizCache {
    passages: HashMap<String, Vec<Passage>>,
    generations: HashMap<(String, Difficulty), String>,
}

impl QuizCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn passages(&self, topic: &str) -> Option<&[Passage]> {
        self.passages.get(topic).map(Vec::as_slice)
    }

    pub fn insert_passages(&mut self, topic: &str, passages: Vec<Passage>) {
        debug!(topic, count = passages.len(), "caching passages");
        self.passages.insert(topic.to_string(), passages);
    }

    /// Raw formatter output previously stored for (topic, difficulty).
    pub fn generation(&self, topic: &str, difficulty: Difficulty) -> Option<&str> {
        self.generations
            .get(&(topic.to_string(), difficulty))
            .map(String::as_str)
    }

    pub fn insert_generation(&mut self, topic: &str, difficulty: Difficulty, raw: String) {
        debug!(topic, %difficulty, raw_len = raw.len(), "caching generation");
        self.generations.insert((topic.to_string(), difficulty), raw);
    }

    /// Forget the generation for one (topic, difficulty) pair.
    pub fn invalidate_generation(&mut self, topic: &str, difficulty: Difficulty) {
        self.generations.remove(&(topic.to_string(), difficulty));
    }

    /// Forget everything derived from `topic`.
    pub fn invalidate_topic(&mut self, topic: &str) {
        self.passages.remove(topic);
        self.generations.retain(|(t, _), _| t != topic);
    }
}
