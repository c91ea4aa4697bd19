// ============================
// coderoom-backend-lib/src/room.rs
// ============================
//! Room membership and shared-content synchronization.
//!
//! The coordinator owns the only two pieces of state in the system: the
//! membership table (room -> roster) and the content cache (room -> latest
//! value). Both live behind one mutex, and every operation performs its
//! mutation and all resulting emissions inside that critical section, so
//! observers see a total order over joins, leaves, disconnects and updates.

use crate::config::JoinPolicy;
use crate::error::AppError;
use crate::metrics as keys;
use crate::transport::Transport;
use coderoom_common::{Member, RoomId, ServerMessage};
use metrics::{counter, gauge};
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

#[derive(Default)]
struct Tables {
    /// room -> roster, ordered by join time
    members: HashMap<RoomId, Vec<Member>>,
    /// room -> latest shared value; never outlives the room's last member
    content: HashMap<RoomId, String>,
}

/// Sole mutator of room state. Synchronous: each operation returns once all
/// resulting emissions have been issued, and never reports failure to its
/// caller (containment is local, per room).
pub struct RoomCoordinator<T: Transport> {
    transport: T,
    join_policy: JoinPolicy,
    tables: Mutex<Tables>,
}

impl<T: Transport> RoomCoordinator<T> {
    pub fn new(transport: T, join_policy: JoinPolicy) -> Self {
        Self {
            transport,
            join_policy,
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Add a connection to a room and announce the new roster to everyone
    /// in it, the joiner included. If the room has cached content, push it
    /// to the joiner only.
    pub fn join(&self, connection_id: &str, room_id: &str, display_name: &str) {
        let mut tables = self.tables.lock();

        let roster = tables.members.entry(room_id.to_string()).or_default();
        match self.join_policy {
            JoinPolicy::Replace => {
                if let Some(existing) = roster
                    .iter_mut()
                    .find(|m| m.connection_id == connection_id)
                {
                    existing.display_name = display_name.to_string();
                } else {
                    roster.push(Member {
                        connection_id: connection_id.to_string(),
                        display_name: display_name.to_string(),
                    });
                }
            },
            JoinPolicy::Append => roster.push(Member {
                connection_id: connection_id.to_string(),
                display_name: display_name.to_string(),
            }),
        }
        let members = roster.clone();

        self.transport.add_to_group(connection_id, room_id);

        counter!(keys::ROOM_JOINED).increment(1);
        gauge!(keys::ROOM_ACTIVE).set(tables.members.len() as f64);
        info!(connection_id, room_id, display_name, "joined room");

        self.transport.send_to_group(
            room_id,
            ServerMessage::Joined {
                members,
                display_name: display_name.to_string(),
                connection_id: connection_id.to_string(),
            },
        );

        if let Some(value) = tables.content.get(room_id) {
            self.transport.send_to(
                connection_id,
                ServerMessage::Content {
                    value: value.clone(),
                },
            );
        }
    }

    /// Remove a connection from a room and tell the remaining members.
    pub fn leave(&self, connection_id: &str, room_id: &str) {
        let mut tables = self.tables.lock();

        self.transport.remove_from_group(connection_id, room_id);
        Self::remove_member(&mut tables, connection_id, room_id);

        gauge!(keys::ROOM_ACTIVE).set(tables.members.len() as f64);
        info!(connection_id, room_id, "left room");

        let members = tables.members.get(room_id).cloned().unwrap_or_default();
        self.transport
            .send_to_group(room_id, ServerMessage::RosterChanged { members });
    }

    /// Tear down every room the connection is grouped in. Rooms are taken
    /// from the transport grouping, which may disagree with the membership
    /// table; a room missing its roster entry is skipped without affecting
    /// the others.
    pub fn disconnect(&self, connection_id: &str) {
        let rooms = self.transport.groups_of(connection_id);
        let mut tables = self.tables.lock();

        for room_id in rooms {
            if let Err(err) = self.teardown_room(&mut tables, connection_id, &room_id) {
                warn!(connection_id, %room_id, %err, "skipping room teardown");
            }
        }

        gauge!(keys::ROOM_ACTIVE).set(tables.members.len() as f64);
        info!(connection_id, "disconnected");
    }

    /// Broadcast new content to everyone but the sender, then cache it.
    /// The cache write is unconditional: an update racing a membership
    /// teardown still lands, and a later update always wins.
    pub fn update_content(&self, connection_id: &str, room_id: &str, value: String) {
        let mut tables = self.tables.lock();

        self.transport.send_to_group_except(
            room_id,
            connection_id,
            ServerMessage::ContentChange {
                value: value.clone(),
            },
        );
        tables.content.insert(room_id.to_string(), value);

        counter!(keys::CONTENT_UPDATED).increment(1);
        debug!(connection_id, room_id, "content updated");
    }

    /// Send the cached content to the requester, if any exists. A room with
    /// no cached value answers with silence, not an error.
    pub fn fetch_content(&self, connection_id: &str, room_id: &str) {
        let tables = self.tables.lock();

        if let Some(value) = tables.content.get(room_id) {
            self.transport.send_to(
                connection_id,
                ServerMessage::Content {
                    value: value.clone(),
                },
            );
        }
    }

    /// Number of rooms with at least one member.
    pub fn room_count(&self) -> usize {
        self.tables.lock().members.len()
    }

    /// Roster snapshot for a room (empty if the room does not exist).
    pub fn members(&self, room_id: &str) -> Vec<Member> {
        self.tables
            .lock()
            .members
            .get(room_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Cached content snapshot for a room.
    pub fn cached_content(&self, room_id: &str) -> Option<String> {
        self.tables.lock().content.get(room_id).cloned()
    }

    fn teardown_room(
        &self,
        tables: &mut Tables,
        connection_id: &str,
        room_id: &str,
    ) -> Result<(), AppError> {
        let display_name = tables
            .members
            .get(room_id)
            .and_then(|roster| roster.iter().find(|m| m.connection_id == connection_id))
            .map(|m| m.display_name.clone())
            .ok_or_else(|| AppError::StaleMembership {
                connection_id: connection_id.to_string(),
                room_id: room_id.to_string(),
            })?;

        self.transport.send_to_group_except(
            room_id,
            connection_id,
            ServerMessage::PeerDisconnected {
                connection_id: connection_id.to_string(),
                display_name,
            },
        );

        self.transport.remove_from_group(connection_id, room_id);
        Self::remove_member(tables, connection_id, room_id);

        let members = tables.members.get(room_id).cloned().unwrap_or_default();
        self.transport
            .send_to_group(room_id, ServerMessage::RosterChanged { members });

        Ok(())
    }

    /// Drop every roster entry for the connection. When the roster empties,
    /// membership entry and cached content are purged together so neither
    /// outlives the room's last member.
    fn remove_member(tables: &mut Tables, connection_id: &str, room_id: &str) -> Option<Member> {
        let roster = tables.members.get_mut(room_id)?;

        let mut removed = None;
        roster.retain(|m| {
            if m.connection_id == connection_id {
                if removed.is_none() {
                    removed = Some(m.clone());
                }
                false
            } else {
                true
            }
        });

        if roster.is_empty() {
            tables.members.remove(room_id);
            tables.content.remove(room_id);
        }

        removed
    }
}
