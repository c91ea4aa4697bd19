// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for Prometheus metric keys
pub const WS_CONNECTION: &str = "ws.connection";
pub const WS_ACTIVE: &str = "ws.active";
pub const ROOM_JOINED: &str = "room.joined";
pub const ROOM_ACTIVE: &str = "room.active";
pub const CONTENT_UPDATED: &str = "content.updated";
