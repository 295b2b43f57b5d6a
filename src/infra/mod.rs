// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by several layers:
//
//   memory.rs      — memory sampling, pressure checks, adaptive
//                    chunk/batch sizing, heap reclamation
//   settings.rs    — process-wide configuration and the runtime
//                    environment derived from it
//   model_store.rs — finding model files locally or on the hub
//   report.rs      — writing question lists and exam results

/// Memory monitor and its sysinfo-backed probe
pub mod memory;

/// Process settings established at start-up
pub mod settings;

/// Model file resolution (local directory or hub cache)
pub mod model_store;

/// Plain-text and JSON report writers
pub mod report;
