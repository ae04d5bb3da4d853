//! Free memory checks around network calls.

use std::sync::Mutex;
use sysinfo::System;
use tracing::debug;

/// Default floor of free memory, in bytes, below which fetching stops
pub const DEFAULT_MINIMUM_FREE_MEMORY: u64 = 32_000;

/// Reports how much memory is available right now
pub trait MemoryBudget: Send + Sync {
    /// Free memory in bytes, after giving the platform a chance to reclaim
    fn free_memory(&self) -> u64;
}

/// Available system memory as reported by the OS
pub struct SystemMemory {
    system: Mutex<System>,
}

impl SystemMemory {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBudget for SystemMemory {
    fn free_memory(&self) -> u64 {
        let mut system = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        system.refresh_memory();
        let free = system.available_memory();
        debug!(free, "Free memory");
        free
    }
}
