//! Pending-challenge cache.
//!
//! At most one outstanding challenge per (username, ceremony kind).
//! Entries are deliberately process-local: ceremony state never outlives
//! the instance that issued it, so unlike credentials there is no
//! persistent backend to abstract over.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Default lifetime of a pending challenge. Expiry is checked lazily at
/// take time; there is no background sweeper.
const DEFAULT_CHALLENGE_TTL: Duration = Duration::from_secs(300);

struct PendingEntry<S> {
    state: S,
    issued_at: Instant,
}

/// Pending-entry counts for health and introspection endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ChallengeStats {
    pub registrations: usize,
    pub authentications: usize,
}

/// In-memory cache of outstanding registration and authentication
/// ceremony states, keyed by username.
///
/// `put` replaces any prior entry in the same slot, making the previous
/// challenge permanently unusable. `take` removes the entry before
/// returning it, so a challenge can never be consumed twice.
pub struct ChallengeCache<R, A> {
    registrations: DashMap<String, PendingEntry<R>>,
    authentications: DashMap<String, PendingEntry<A>>,
    ttl: Duration,
}

impl<R, A> ChallengeCache<R, A> {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CHALLENGE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            registrations: DashMap::new(),
            authentications: DashMap::new(),
            ttl,
        }
    }

    /// Store a pending registration state, replacing any prior one.
    pub fn put_registration(&self, username: &str, state: R) {
        self.registrations.insert(
            username.to_owned(),
            PendingEntry {
                state,
                issued_at: Instant::now(),
            },
        );
    }

    /// Remove and return the pending registration state, if still live.
    /// Expired entries are removed and reported as absent.
    pub fn take_registration(&self, username: &str) -> Option<R> {
        let (_, entry) = self.registrations.remove(username)?;
        self.live(entry)
    }

    /// Store a pending authentication state, replacing any prior one.
    pub fn put_authentication(&self, username: &str, state: A) {
        self.authentications.insert(
            username.to_owned(),
            PendingEntry {
                state,
                issued_at: Instant::now(),
            },
        );
    }

    /// Remove and return the pending authentication state, if still live.
    pub fn take_authentication(&self, username: &str) -> Option<A> {
        let (_, entry) = self.authentications.remove(username)?;
        self.live(entry)
    }

    pub fn stats(&self) -> ChallengeStats {
        ChallengeStats {
            registrations: self.registrations.len(),
            authentications: self.authentications.len(),
        }
    }

    fn live<S>(&self, entry: PendingEntry<S>) -> Option<S> {
        if entry.issued_at.elapsed() <= self.ttl {
            Some(entry.state)
        } else {
            None
        }
    }
}

impl<R, A> Default for ChallengeCache<R, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, A> std::fmt::Debug for ChallengeCache<R, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeCache")
            .field("registrations", &self.registrations.len())
            .field("authentications", &self.authentications.len())
            .finish()
    }
}
