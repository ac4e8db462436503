use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use connect4::Match;
use thiserror::Error;
use tracing::debug;

pub type SharedMatch = Arc<Mutex<Match>>;

#[derive(Debug, Error)]
#[error("match {0} not found")]
pub struct UnknownMatch(pub u64);

#[derive(Debug, Error)]
#[error("server is hosting the maximum of {0} unfinished matches")]
pub struct StoreFull(pub usize);

/// In-memory matches keyed by id. Each match sits behind its own mutex so
/// concurrent requests for one match are applied one at a time.
#[derive(Clone)]
pub struct MatchStore {
    matches: Arc<RwLock<HashMap<u64, SharedMatch>>>,
    next_id: Arc<AtomicU64>,
    capacity: usize,
}

impl MatchStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            matches: Arc::default(),
            next_id: Arc::default(),
            capacity,
        }
    }

    /// Stores `game` under a fresh id. At capacity the oldest finished match
    /// is evicted; if every match is still in progress the insert fails.
    pub fn insert(&self, game: Match) -> Result<u64, StoreFull> {
        let mut matches = self
            .matches
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if matches.len() >= self.capacity {
            let finished = matches
                .iter()
                .filter(|(_, shared)| lock(shared).lifecycle().is_terminal())
                .map(|(&id, _)| id)
                .min()
                .ok_or(StoreFull(self.capacity))?;
            matches.remove(&finished);
            debug!(id = finished, "evicted finished match");
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        matches.insert(id, Arc::new(Mutex::new(game)));
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Result<SharedMatch, UnknownMatch> {
        self.matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(UnknownMatch(id))
    }

    pub fn remove(&self, id: u64) -> Result<(), UnknownMatch> {
        self.matches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .map(|_| ())
            .ok_or(UnknownMatch(id))
    }

    pub fn len(&self) -> usize {
        self.matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Locks a match, recovering the guard if a previous holder panicked.
pub fn lock(game: &SharedMatch) -> MutexGuard<'_, Match> {
    game.lock().unwrap_or_else(PoisonError::into_inner)
}
