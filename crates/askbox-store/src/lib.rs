// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: Apache-2.0
//! Persisted conversation snapshot with a time-to-live.
//!
//! The whole log is stored under one key as
//! `{"messages": [...], "timestamp": <epoch-millis>}`.  Loading is
//! fail-soft: a missing, corrupt, or expired entry reads as "no history".

mod backend;

pub use backend::{Backend, FileBackend, MemoryBackend};

use std::path::PathBuf;
use std::time::Duration;

use askbox_config::StorageConfig;
use askbox_model::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    pub messages: Vec<Message>,
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub saved_at: DateTime<Utc>,
}

/// Borrowing twin of [`ConversationSnapshot`] so saving never clones the log.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    messages: &'a [Message],
    #[serde(with = "chrono::serde::ts_milliseconds")]
    timestamp: DateTime<Utc>,
}

pub struct PersistenceStore {
    backend: Box<dyn Backend>,
    key: String,
    ttl: chrono::Duration,
}

impl PersistenceStore {
    pub fn new(backend: impl Backend + 'static, key: impl Into<String>, ttl: Duration) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.into(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
        }
    }

    /// File-backed store in the configured data directory.
    pub fn file(cfg: &StorageConfig) -> Self {
        Self::new(FileBackend::new(cfg.data_dir()), cfg.namespace.clone(), cfg.ttl())
    }

    /// Store that forgets everything when the process exits.
    pub fn memory(cfg: &StorageConfig) -> Self {
        Self::new(MemoryBackend::new(), cfg.namespace.clone(), cfg.ttl())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn load(&self) -> Option<ConversationSnapshot> {
        self.load_at(Utc::now())
    }

    /// Load the snapshot as seen at `now`.  Expired or undecodable entries are
    /// removed and reported as absent.
    pub fn load_at(&self, now: DateTime<Utc>) -> Option<ConversationSnapshot> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %self.key, error = %e, "could not read conversation snapshot");
                return None;
            }
        };

        let snapshot: ConversationSnapshot = match serde_json::from_str(&raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(key = %self.key, error = %e, "discarding corrupt conversation snapshot");
                self.discard();
                return None;
            }
        };

        if now.signed_duration_since(snapshot.saved_at) > self.ttl {
            debug!(key = %self.key, saved_at = %snapshot.saved_at, "conversation snapshot expired");
            self.discard();
            return None;
        }

        Some(snapshot)
    }

    pub fn save(&self, messages: &[Message]) -> Result<(), StoreError> {
        self.save_at(messages, Utc::now())
    }

    /// Overwrite the snapshot with `messages`, stamped `now`.
    pub fn save_at(&self, messages: &[Message], now: DateTime<Utc>) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&SnapshotRef { messages, timestamp: now })?;
        self.backend.set(&self.key, &raw)?;
        debug!(key = %self.key, messages = messages.len(), "conversation snapshot saved");
        Ok(())
    }

    /// Remove the snapshot.  Idempotent.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)
    }

    fn discard(&self) {
        if let Err(e) = self.backend.remove(&self.key) {
            warn!(key = %self.key, error = %e, "could not remove conversation snapshot");
        }
    }
}
