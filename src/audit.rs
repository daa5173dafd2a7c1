//! In-process audit trail.
//!
//! Records who did what to which entity. Records live only in process
//! memory, are lost on restart, and only the most recent
//! [`DEFAULT_CAPACITY`] are kept.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KycError, Result};
use crate::models::{AuditId, PageLimit};

/// Records kept by [`InMemoryAuditTrail::new`].
pub const DEFAULT_CAPACITY: usize = 1_000;

/// Action performed by an actor, as reported by the caller.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditEvent {
    /// Identifier of the acting user or service.
    pub actor_id: String,
    /// Role the actor held (e.g. `admin`, `merchant`).
    pub actor_role: String,
    /// What was done (e.g. `kyc.review`).
    pub action: String,
    /// Kind of entity acted on.
    pub entity: String,
    /// Identifier of the entity acted on.
    pub entity_id: String,
    /// Client IP address, if known.
    pub ip: String,
}

/// Stored audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Assigned identifier (`audit_<uuid>`).
    pub id: AuditId,
    /// The recorded event.
    #[serde(flatten)]
    pub event: AuditEvent,
    /// When the event was recorded.
    pub recorded_at: DateTime<Utc>,
}

/// Thread-safe, non-durable audit log.
///
/// Holds at most `capacity` records; recording past that drops the
/// oldest one.
#[derive(Debug)]
pub struct InMemoryAuditTrail {
    /// Records in insertion order.
    records: Mutex<VecDeque<AuditRecord>>,
    /// Maximum number of retained records.
    capacity: usize,
}

impl Default for InMemoryAuditTrail {
    #[inline]
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemoryAuditTrail {
    /// Creates an empty audit trail holding [`DEFAULT_CAPACITY`] records.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty audit trail holding at most `capacity` records
    /// (at least one).
    #[inline]
    #[must_use]
    pub fn with_capacity(requested: usize) -> Self {
        let capacity = requested.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY))),
            capacity,
        }
    }

    /// Maximum number of retained records.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends an event, assigning it an identifier and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Storage`] if the internal lock is poisoned.
    #[tracing::instrument(skip_all, fields(action = %event.action, entity = %event.entity))]
    pub fn record(&self, event: AuditEvent) -> Result<AuditRecord> {
        let record = AuditRecord {
            id: AuditId::new(format!("audit_{}", uuid::Uuid::new_v4())),
            event,
            recorded_at: Utc::now(),
        };
        let mut records = self.lock()?;
        while records.len() >= self.capacity {
            if let Some(evicted) = records.pop_front() {
                tracing::trace!(audit_id = %evicted.id, "audit trail full, dropping oldest record");
            }
        }
        records.push_back(record.clone());
        drop(records);
        tracing::debug!(audit_id = %record.id, "audit event recorded");
        Ok(record)
    }

    /// Returns the most recent `limit` records, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Storage`] if the internal lock is poisoned.
    #[inline]
    pub fn entries(&self, limit: PageLimit) -> Result<Vec<AuditRecord>> {
        let records = self.lock()?;
        let skip = records.len().saturating_sub(limit.get());
        Ok(records.iter().skip(skip).cloned().collect())
    }

    /// Number of retained records.
    ///
    /// # Errors
    ///
    /// Returns [`KycError::Storage`] if the internal lock is poisoned.
    #[inline]
    pub fn retained(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// Acquires the record lock.
    fn lock(&self) -> Result<MutexGuard<'_, VecDeque<AuditRecord>>> {
        self.records
            .lock()
            .map_err(|err| KycError::Storage(err.to_string().into()))
    }
}
