//! Tunable limits the core recognizes from its caller.
//!
//! Mirrors the constants in `original_source/src/config.h` (`MAX_PROCESSES`,
//! `MAX_RESOURCES`, `MAX_RESOURCES_PER_PROCESS`, `CACHE_TTL_SECONDS`).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Cap on vertices of process kind in a single pass's RAG.
    pub max_processes: usize,
    /// Cap on vertices of resource kind in a single pass's RAG.
    pub max_resources: usize,
    /// Cap on a single process's waited-for resource list.
    pub max_resources_per_process: usize,
    /// Cap on a single process's waiting-on-pids list.
    pub max_waiting_pids_per_process: usize,
    /// Validity window, in seconds, for the per-pid status cache.
    pub status_cache_ttl_seconds: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            max_processes: 10_000,
            max_resources: 5_000,
            max_resources_per_process: 256,
            max_waiting_pids_per_process: 128,
            status_cache_ttl_seconds: 5,
        }
    }
}
