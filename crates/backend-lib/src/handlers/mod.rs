// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers next to the WebSocket surface.

pub mod live;
