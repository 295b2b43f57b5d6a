// ============================================================
// Layer 6 — Memory Monitor
// ============================================================
// Samples process and system memory and turns the reading into
// the one adaptive policy every other component consults:
//
//   under pressure  ⇔ process RSS > 90% of the ceiling
//                     OR system utilisation > 90%
//
//   chunk size      utilisation ≤ 80%      → base
//                   80% < utilisation ≤ 90% → base / 2
//                   utilisation > 90%      → base / 4
//
//   batch size      available < 1 GB → 1
//                   available < 2 GB → base / 2
//                   otherwise        → base
//
// One monitor is built at start-up and shared (Arc) with the
// extractor, chunker and pipeline.

use std::sync::Mutex;

use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::domain::error::MemoryReadError;
use crate::domain::memory::MemorySnapshot;
use crate::domain::traits::MemoryProbe;

/// Default resident-memory ceiling in GB
pub const DEFAULT_MAX_MEMORY_GB: f64 = 3.5;

const PROCESS_PRESSURE_RATIO:  f64 = 0.9;
const SYSTEM_PRESSURE_PERCENT: f64 = 90.0;
const CHUNK_HALVE_PERCENT:     f64 = 80.0;
const CHUNK_QUARTER_PERCENT:   f64 = 90.0;

pub struct MemoryMonitor {
    max_memory_gb: f64,
    probe:         Box<dyn MemoryProbe>,
}

impl MemoryMonitor {
    /// Monitor backed by the real OS counters
    pub fn new(max_memory_gb: f64) -> Self {
        Self::with_probe(max_memory_gb, SysinfoProbe::new())
    }

    pub fn with_probe(max_memory_gb: f64, probe: impl MemoryProbe + 'static) -> Self {
        Self { max_memory_gb, probe: Box::new(probe) }
    }

    pub fn max_memory_gb(&self) -> f64 {
        self.max_memory_gb
    }

    /// Current reading. A failed read is logged and reported as zeros.
    pub fn snapshot(&self) -> MemorySnapshot {
        match self.probe.sample() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("{e}; reporting zeroed memory snapshot");
                MemorySnapshot::zeroed()
            }
        }
    }

    pub fn is_under_pressure(&self) -> bool {
        let snap      = self.snapshot();
        let limit_mb  = self.max_memory_gb * 1024.0 * PROCESS_PRESSURE_RATIO;

        if snap.process_resident_mb > limit_mb {
            tracing::warn!(
                "Process memory close to the limit: {:.1}MB (limit {:.1}MB)",
                snap.process_resident_mb,
                limit_mb
            );
            return true;
        }
        if snap.system_used_percent > SYSTEM_PRESSURE_PERCENT {
            tracing::warn!("System memory high: {:.1}%", snap.system_used_percent);
            return true;
        }
        false
    }

    /// Run a reclamation pass if forced or under pressure.
    /// Returns whether a pass ran; callers are free to ignore it.
    pub fn reclaim(&self, force: bool) -> bool {
        if !force && !self.is_under_pressure() {
            return false;
        }

        let before = self.snapshot();
        tracing::info!("Reclaiming memory (process {:.1}MB)...", before.process_resident_mb);

        trim_heap();

        let after = self.snapshot();
        tracing::info!(
            "Memory after reclaim: {:.1}MB (Δ: {:+.1}MB)",
            after.process_resident_mb,
            after.process_resident_mb - before.process_resident_mb
        );
        true
    }

    pub fn recommended_chunk_size(&self, base: usize) -> usize {
        chunk_size_for(self.snapshot().system_used_percent, base)
    }

    pub fn recommended_batch_size(&self, base: usize) -> usize {
        batch_size_for(self.snapshot().system_available_mb, base)
    }
}

/// Chunk-size policy for a given system utilisation percentage
pub fn chunk_size_for(system_used_percent: f64, base: usize) -> usize {
    let size = if system_used_percent > CHUNK_QUARTER_PERCENT {
        base / 4
    } else if system_used_percent > CHUNK_HALVE_PERCENT {
        base / 2
    } else {
        base
    };
    size.max(1)
}

/// Batch-size policy for a given amount of available system memory
pub fn batch_size_for(system_available_mb: f64, base: usize) -> usize {
    let available_gb = system_available_mb / 1024.0;
    if available_gb < 1.0 {
        1
    } else if available_gb < 2.0 {
        (base / 2).max(1)
    } else {
        base
    }
}

/// Hand freed heap pages back to the OS where the allocator supports it.
#[cfg(all(target_os = "linux", target_env = "gnu"))]
fn trim_heap() {
    // SAFETY: malloc_trim only walks the allocator's own free lists
    unsafe {
        libc::malloc_trim(0);
    }
}

#[cfg(not(all(target_os = "linux", target_env = "gnu")))]
fn trim_heap() {}

// ─── SysinfoProbe ─────────────────────────────────────────────────────────────
/// Reads memory through sysinfo. The `System` is reused between samples
/// and only the memory and own-process counters are refreshed.
pub struct SysinfoProbe {
    system: Mutex<System>,
    pid:    Option<Pid>,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Cannot determine own pid, process memory will read as 0: {e}");
                None
            }
        };
        Self { system: Mutex::new(System::new()), pid }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn sample(&self) -> Result<MemorySnapshot, MemoryReadError> {
        let mut system = self
            .system
            .lock()
            .map_err(|e| MemoryReadError(format!("probe lock poisoned: {e}")))?;

        system.refresh_memory();
        let total     = system.total_memory();
        let available = system.available_memory();
        if total == 0 {
            return Err(MemoryReadError("total system memory reported as 0".into()));
        }

        let process_bytes = match self.pid {
            Some(pid) => {
                system.refresh_processes(ProcessesToUpdate::Some(&[pid]));
                system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            None => 0,
        };

        let used = total.saturating_sub(available);
        Ok(MemorySnapshot {
            process_resident_mb: bytes_to_mb(process_bytes),
            system_used_percent: used as f64 / total as f64 * 100.0,
            system_available_mb: bytes_to_mb(available),
            system_total_mb:     bytes_to_mb(total),
        })
    }
}

fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
