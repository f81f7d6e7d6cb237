//! Snapshot - Serializable Batch Output
//!
//! Wraps a batch of computed schedules with SHA-256 fingerprints of the
//! config that produced them and of the schedules themselves, so a consumer
//! can tell whether two runs agree without diffing payments.
//!
//! # Critical Invariants
//!
//! - **Determinism**: same documents + config produce the same fingerprint
//! - **Integrity**: `verify()` fails if any schedule was altered after the
//!   snapshot was taken

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::engine::{ComputedSchedule, EngineConfig, ScheduleError};

/// Computed schedules for one batch, with fingerprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSnapshot {
    /// SHA256 of the engine config
    pub config_hash: String,

    /// SHA256 of the serialized schedules
    pub content_hash: String,

    pub schedules: Vec<ComputedSchedule>,
}

impl BatchSnapshot {
    pub fn new(config: &EngineConfig, schedules: Vec<ComputedSchedule>) -> Result<Self, ScheduleError> {
        Ok(Self {
            config_hash: fingerprint(config)?,
            content_hash: fingerprint(&schedules)?,
            schedules,
        })
    }

    /// Recompute the content fingerprint and compare.
    pub fn verify(&self) -> Result<(), ScheduleError> {
        let actual = fingerprint(&self.schedules)?;
        if actual != self.content_hash {
            return Err(ScheduleError::FingerprintMismatch {
                expected: self.content_hash.clone(),
                actual,
            });
        }
        Ok(())
    }

    /// True when the snapshot was produced under `config`.
    pub fn matches_config(&self, config: &EngineConfig) -> Result<bool, ScheduleError> {
        Ok(fingerprint(config)? == self.config_hash)
    }

    pub fn to_json(&self, pretty: bool) -> Result<String, ScheduleError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Parse a snapshot and verify its content fingerprint.
    pub fn from_json(json: &str) -> Result<Self, ScheduleError> {
        let snapshot: BatchSnapshot = serde_json::from_str(json)?;
        snapshot.verify()?;
        Ok(snapshot)
    }
}

/// Hex SHA256 of a value's canonical JSON.
pub fn fingerprint<T: Serialize + ?Sized>(value: &T) -> Result<String, ScheduleError> {
    let bytes = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
