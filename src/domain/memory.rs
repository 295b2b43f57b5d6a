// ============================================================
// Layer 3 — Memory Snapshot
// ============================================================

use serde::Serialize;

/// One reading of process and system memory, in megabytes.
/// Captured on demand and never updated afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MemorySnapshot {
    pub process_resident_mb: f64,
    pub system_used_percent: f64,
    pub system_available_mb: f64,
    pub system_total_mb:     f64,
}

impl MemorySnapshot {
    /// The value handed out when memory cannot be read
    pub fn zeroed() -> Self {
        Self::default()
    }

    pub fn system_available_gb(&self) -> f64 {
        self.system_available_mb / 1024.0
    }
}
