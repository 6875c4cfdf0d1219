//! Notes extractor client: wires the core state machine to the engine and a host.
pub mod platform;
