//! Pending-file store
//!
//! Holds at most one file per conversation that is waiting for the user to say
//! what should be done with it. Entries expire after [`PENDING_TTL`]; expiry is
//! only checked when an entry is accessed.
//!
//! Every method takes the current time explicitly so the store itself has no
//! notion of a clock.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use crate::channels::MediaKind;

/// How long a received file waits for an intent
pub const PENDING_TTL: Duration = Duration::minutes(10);

/// A received file awaiting the user's intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFile {
    /// Conversation the file belongs to
    pub owner_id: String,
    /// Platform message ID used to fetch the content
    pub media_ref: String,
    pub kind: MediaKind,
    pub created_at: DateTime<Utc>,
}

impl PendingFile {
    /// Create an entry stamped with `now`
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        media_ref: impl Into<String>,
        kind: MediaKind,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            media_ref: media_ref.into(),
            kind,
            created_at: now,
        }
    }

    /// Whether the entry has outlived the TTL at `now`
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at > PENDING_TTL
    }
}

/// Result of looking up an owner's slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Nothing is waiting
    Missing,
    /// A file was waiting but its TTL has passed
    Expired,
    /// A live entry
    Pending(PendingFile),
}

/// Process-local map from owner to pending file
#[derive(Debug, Default)]
pub struct PendingFileStore {
    entries: Mutex<HashMap<String, PendingFile>>,
}

impl PendingFileStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, PendingFile>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create or replace the entry for its owner
    ///
    /// Returns the entry that was replaced, if any.
    pub fn insert(&self, entry: PendingFile) -> Option<PendingFile> {
        self.lock().insert(entry.owner_id.clone(), entry)
    }

    /// Inspect an owner's slot without changing it
    #[must_use]
    pub fn lookup(&self, owner_id: &str, now: DateTime<Utc>) -> Lookup {
        match self.lock().get(owner_id) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Pending(entry.clone()),
        }
    }

    /// Live entry for an owner; expired entries count as absent
    #[must_use]
    pub fn get(&self, owner_id: &str, now: DateTime<Utc>) -> Option<PendingFile> {
        match self.lookup(owner_id, now) {
            Lookup::Pending(entry) => Some(entry),
            Lookup::Missing | Lookup::Expired => None,
        }
    }

    /// Atomically take an owner's entry
    ///
    /// Expired entries are removed and reported as [`Lookup::Expired`]. A
    /// second concurrent claim for the same owner sees [`Lookup::Missing`].
    pub fn claim(&self, owner_id: &str, now: DateTime<Utc>) -> Lookup {
        let mut entries = self.lock();
        match entries.remove(owner_id) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired(now) => Lookup::Expired,
            Some(entry) => Lookup::Pending(entry),
        }
    }

    /// Put a claimed entry back after a failed attempt
    ///
    /// Skipped when the entry has expired or a newer file arrived meanwhile.
    /// Returns whether the entry was restored.
    pub fn restore(&self, entry: PendingFile, now: DateTime<Utc>) -> bool {
        if entry.is_expired(now) {
            return false;
        }
        let mut entries = self.lock();
        if entries.contains_key(&entry.owner_id) {
            return false;
        }
        entries.insert(entry.owner_id.clone(), entry);
        true
    }

    /// Drop an owner's entry
    pub fn remove(&self, owner_id: &str) -> Option<PendingFile> {
        self.lock().remove(owner_id)
    }

    /// Drop an owner's entry only if it still refers to `media_ref`
    ///
    /// A newer file recorded in the meantime is left alone.
    pub fn remove_if_current(&self, owner_id: &str, media_ref: &str) -> bool {
        let mut entries = self.lock();
        if entries.get(owner_id).is_some_and(|e| e.media_ref == media_ref) {
            entries.remove(owner_id);
            return true;
        }
        false
    }

    /// Number of stored entries, expired ones included
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
