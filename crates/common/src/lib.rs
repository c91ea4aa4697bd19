// ================
// common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between coderoom clients and the relay server.
//! This module defines the WebSocket protocol messages and supporting types.

use serde::{Deserialize, Serialize};

/// Stable identifier of one WebSocket connection, minted at socket accept.
pub type ClientId = String;

/// Externally supplied room code. A room exists while it has members.
pub type RoomId = String;

/// One connection's participation record within a room.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub connection_id: ClientId,
    pub display_name: String,
}

/// Messages sent from client to server
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Join a room, creating it implicitly if this is the first member.
    /// # Fields
    /// * `room_id` - Room code to join
    /// * `display_name` - Name shown to other members
    Join { room_id: RoomId, display_name: String },
    /// Leave a room explicitly.
    Leave { room_id: RoomId },
    /// Replace the room's shared content and broadcast it to the other members.
    ContentChange { room_id: RoomId, value: String },
    /// Ask for the room's cached content. Silence means no value is cached.
    GetContent { room_id: RoomId },
}

/// Messages sent from server to client
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Fanned out to every room member (including the joiner) after a join.
    /// Carries the full roster so one event type refreshes every client's UI.
    Joined {
        members: Vec<Member>,
        display_name: String,
        connection_id: ClientId,
    },
    /// Cached content, pushed to a new joiner or returned for `get-content`.
    Content { value: String },
    /// Updated roster, sent to the members remaining after a leave/disconnect.
    RosterChanged { members: Vec<Member> },
    /// A peer's channel closed; sent to the other members of each of its rooms.
    PeerDisconnected {
        connection_id: ClientId,
        display_name: String,
    },
    /// New content from a peer, sent to every member except the sender.
    ContentChange { value: String },
}
