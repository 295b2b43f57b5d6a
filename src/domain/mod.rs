// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain structs, the error taxonomy and the traits other layers
// implement. Nothing in here touches lopdf, candle or sysinfo.

// Document metadata and the chunk records the pipeline yields
pub mod document;

// Generated questions, exam items and grade reports
pub mod question;

// Point-in-time memory readings
pub mod memory;

// Fatal and soft error types
pub mod error;

// Seams: document backend, text generator, memory probe
pub mod traits;
