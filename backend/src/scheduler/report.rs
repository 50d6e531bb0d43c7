//! Run Report - what a completed run hands back
//!
//! Carries the counters a benchmark driver prints plus enough identity (a run
//! id and a hash of the configuration) to tell runs apart when reports are
//! collected as JSON.

use crate::core::time::SimTime;
use crate::pool::PoolStats;
use crate::scheduler::SchedulerError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Why the event loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Termination {
    /// An action returned `Break` (normally the terminal sentinel)
    Stopped { at: SimTime },

    /// The queue emptied without any action asking to stop
    Exhausted,
}

/// Summary of one call to [`Scheduler::run`](crate::Scheduler::run)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id for this run
    pub run_id: Uuid,

    /// SHA256 of the scheduler configuration
    pub config_hash: String,

    /// Events popped and executed during the run
    pub events_processed: u64,

    /// Simulation time when the loop stopped
    pub final_time: SimTime,

    /// Events still pending at stop time, dropped without running
    pub discarded: usize,

    pub termination: Termination,

    /// Pool counters (pooling runs only)
    pub pool: Option<PoolStats>,

    /// Wall-clock duration of the run
    pub elapsed_ms: f64,
}

impl RunReport {
    /// Returns `true` if an action stopped the run
    pub fn stopped(&self) -> bool {
        matches!(self.termination, Termination::Stopped { .. })
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Fingerprint a configuration as hex SHA256 of its JSON encoding
///
/// Struct fields serialize in declaration order, so equal configs always
/// produce the same bytes.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SchedulerError> {
    let bytes = serde_json::to_vec(config).map_err(|e| {
        SchedulerError::Serialization(format!("Config serialization failed: {}", e))
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}
