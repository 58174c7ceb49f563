//! Content-addressed memoization of completion replies.
//!
//! Keys are SHA-256 digests of the model id and the serialized turn list, so
//! any change to the transcript (including one appended turn) is a new key.
//! Entries are evicted least-recently-used once `capacity` is reached; a
//! capacity of zero disables the cache entirely.

use crate::conversation::Turn;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(model_id: &str, turns: &[Turn]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model_id.as_bytes());
        hasher.update([0u8]);
        // Vec<Turn> serialization cannot fail: plain strings and unit enums.
        let serialized = serde_json::to_vec(turns).unwrap_or_default();
        hasher.update(&serialized);
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct ReplyCache {
    capacity: usize,
    entries: HashMap<CacheKey, String>,
    recency: VecDeque<CacheKey>,
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ReplyCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::new(),
            recency: VecDeque::new(),
        }
    }

    pub fn get(&mut self, key: &CacheKey) -> Option<String> {
        let reply = self.entries.get(key).cloned()?;
        self.touch(key);
        Some(reply)
    }

    pub fn insert(&mut self, key: CacheKey, reply: String) {
        if self.capacity == 0 {
            return;
        }

        if self.entries.insert(key.clone(), reply).is_some() {
            self.touch(&key);
            return;
        }

        self.recency.push_back(key);
        while self.entries.len() > self.capacity {
            match self.recency.pop_front() {
                Some(oldest) => {
                    self.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn touch(&mut self, key: &CacheKey) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_back(k);
            }
        }
    }
}
