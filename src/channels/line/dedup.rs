//! Webhook event deduplication cache

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

/// How long an event id is remembered (5 minutes)
const EVENT_ID_TTL: Duration = Duration::from_secs(300);

/// Maximum remembered event ids
const MAX_EVENT_IDS: usize = 2000;

/// Recently seen `webhookEventId`s
///
/// The platform keeps the id when it retries a delivery, so a repeat within
/// the TTL is skipped. Ids are kept in arrival order: expiry and capacity
/// eviction both pop from the front.
#[derive(Debug)]
pub struct EventDedup {
    seen: HashSet<String>,
    arrivals: VecDeque<(String, Instant)>,
    ttl: Duration,
    capacity: usize,
}

impl Default for EventDedup {
    fn default() -> Self {
        Self::new(EVENT_ID_TTL, MAX_EVENT_IDS)
    }
}

impl EventDedup {
    /// Create a cache with a custom TTL and capacity
    #[must_use]
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            seen: HashSet::new(),
            arrivals: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Record `event_id`, returning true if it arrived earlier within the TTL
    pub fn is_duplicate(&mut self, event_id: &str) -> bool {
        let now = Instant::now();
        self.forget_expired(now);

        if self.seen.contains(event_id) {
            return true;
        }

        if self.arrivals.len() >= self.capacity
            && let Some((oldest, _)) = self.arrivals.pop_front()
        {
            self.seen.remove(&oldest);
        }

        self.seen.insert(event_id.to_string());
        self.arrivals.push_back((event_id.to_string(), now));
        false
    }

    fn forget_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        while self
            .arrivals
            .front()
            .is_some_and(|(_, at)| now.duration_since(*at) >= ttl)
        {
            if let Some((event_id, _)) = self.arrivals.pop_front() {
                self.seen.remove(&event_id);
            }
        }
    }

    /// Number of remembered ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    /// Whether nothing is remembered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }
}
