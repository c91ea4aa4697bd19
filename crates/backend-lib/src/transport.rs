// ============================
// coderoom-backend-lib/src/transport.rs
// ============================
//! Connection registry and room grouping.
//!
//! The coordinator never touches sockets. It talks to a [`Transport`]: a
//! per-connection outbound channel plus a named-group primitive with
//! enumerable membership. `WsTransport` is the production implementation;
//! tests substitute a recording fake.

use coderoom_common::{ClientId, RoomId, ServerMessage};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound channel half for one connection.
pub type Tx = mpsc::UnboundedSender<ServerMessage>;

/// Duplex-channel and grouping collaborator used by the room coordinator.
///
/// All sends are best-effort: emitting to an absent or closed connection is
/// a no-op, never an error.
pub trait Transport: Send + Sync + 'static {
    /// Attach a connection's outbound channel.
    fn register(&self, connection_id: ClientId, tx: Tx);
    /// Detach a connection and drop it from every group.
    fn unregister(&self, connection_id: &str);
    fn connection_count(&self) -> usize;

    fn add_to_group(&self, connection_id: &str, room_id: &str);
    fn remove_from_group(&self, connection_id: &str, room_id: &str);
    /// Groups this connection currently belongs to. During disconnect this
    /// is the source of truth, not the membership table.
    fn groups_of(&self, connection_id: &str) -> Vec<RoomId>;

    fn send_to(&self, connection_id: &str, msg: ServerMessage);
    fn send_to_group(&self, room_id: &str, msg: ServerMessage);
    fn send_to_group_except(&self, room_id: &str, except: &str, msg: ServerMessage);
}

#[derive(Default)]
struct Inner {
    /// connection id -> outbound channel
    senders: DashMap<ClientId, Tx>,
    /// room id -> member connection ids, in join order
    groups: DashMap<RoomId, Vec<ClientId>>,
    /// connection id -> rooms it belongs to (reverse index for `groups_of`)
    memberships: DashMap<ClientId, HashSet<RoomId>>,
}

/// WebSocket-backed transport. Cheap to clone; all clones share state.
#[derive(Clone, Default)]
pub struct WsTransport {
    inner: Arc<Inner>,
}

impl WsTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms with at least one grouped connection.
    pub fn group_count(&self) -> usize {
        self.inner.groups.len()
    }
}

impl Transport for WsTransport {
    fn register(&self, connection_id: ClientId, tx: Tx) {
        self.inner.senders.insert(connection_id, tx);
    }

    fn unregister(&self, connection_id: &str) {
        self.inner.senders.remove(connection_id);

        // Sweep the connection out of any group it was still in.
        if let Some((_, rooms)) = self.inner.memberships.remove(connection_id) {
            for room_id in rooms {
                let emptied = match self.inner.groups.get_mut(&room_id) {
                    Some(mut ids) => {
                        ids.retain(|id| id.as_str() != connection_id);
                        ids.is_empty()
                    },
                    None => false,
                };
                if emptied {
                    self.inner.groups.remove_if(&room_id, |_, ids| ids.is_empty());
                }
            }
        }
    }

    fn connection_count(&self) -> usize {
        self.inner.senders.len()
    }

    fn add_to_group(&self, connection_id: &str, room_id: &str) {
        let mut ids = self.inner.groups.entry(room_id.to_string()).or_default();
        if !ids.iter().any(|id| id.as_str() == connection_id) {
            ids.push(connection_id.to_string());
        }
        drop(ids);

        self.inner
            .memberships
            .entry(connection_id.to_string())
            .or_default()
            .insert(room_id.to_string());
    }

    fn remove_from_group(&self, connection_id: &str, room_id: &str) {
        let emptied = match self.inner.groups.get_mut(room_id) {
            Some(mut ids) => {
                ids.retain(|id| id.as_str() != connection_id);
                ids.is_empty()
            },
            None => false,
        };
        if emptied {
            self.inner.groups.remove_if(room_id, |_, ids| ids.is_empty());
        }

        let emptied = match self.inner.memberships.get_mut(connection_id) {
            Some(mut rooms) => {
                rooms.remove(room_id);
                rooms.is_empty()
            },
            None => false,
        };
        if emptied {
            self.inner
                .memberships
                .remove_if(connection_id, |_, rooms| rooms.is_empty());
        }
    }

    fn groups_of(&self, connection_id: &str) -> Vec<RoomId> {
        self.inner
            .memberships
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn send_to(&self, connection_id: &str, msg: ServerMessage) {
        if let Some(tx) = self.inner.senders.get(connection_id) {
            // Receiver gone means the connection is tearing down; drop the frame.
            let _ = tx.send(msg);
        }
    }

    fn send_to_group(&self, room_id: &str, msg: ServerMessage) {
        let targets = match self.inner.groups.get(room_id) {
            Some(ids) => ids.clone(),
            None => return,
        };
        for id in targets {
            self.send_to(&id, msg.clone());
        }
    }

    fn send_to_group_except(&self, room_id: &str, except: &str, msg: ServerMessage) {
        let targets = match self.inner.groups.get(room_id) {
            Some(ids) => ids.clone(),
            None => return,
        };
        for id in targets {
            if id.as_str() != except {
                self.send_to(&id, msg.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn connect(transport: &WsTransport, id: &str) -> UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        transport.register(id.to_string(), tx);
        rx
    }

    fn content(value: &str) -> ServerMessage {
        ServerMessage::Content {
            value: value.to_string(),
        }
    }

    #[test]
    fn group_send_reaches_all_members() {
        let transport = WsTransport::new();
        let mut rx1 = connect(&transport, "c1");
        let mut rx2 = connect(&transport, "c2");
        transport.add_to_group("c1", "r1");
        transport.add_to_group("c2", "r1");

        transport.send_to_group("r1", content("v"));

        assert_eq!(rx1.try_recv().unwrap(), content("v"));
        assert_eq!(rx2.try_recv().unwrap(), content("v"));
    }

    #[test]
    fn group_send_except_skips_sender() {
        let transport = WsTransport::new();
        let mut rx1 = connect(&transport, "c1");
        let mut rx2 = connect(&transport, "c2");
        transport.add_to_group("c1", "r1");
        transport.add_to_group("c2", "r1");

        transport.send_to_group_except("r1", "c1", content("v"));

        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), content("v"));
    }

    #[test]
    fn grouping_is_idempotent_and_enumerable() {
        let transport = WsTransport::new();
        let _rx = connect(&transport, "c1");
        transport.add_to_group("c1", "r1");
        transport.add_to_group("c1", "r1");
        transport.add_to_group("c1", "r2");

        let mut rooms = transport.groups_of("c1");
        rooms.sort();
        assert_eq!(rooms, vec!["r1".to_string(), "r2".to_string()]);
        assert_eq!(transport.group_count(), 2);
    }

    #[test]
    fn remove_from_group_drops_empty_rooms() {
        let transport = WsTransport::new();
        let _rx = connect(&transport, "c1");
        transport.add_to_group("c1", "r1");

        transport.remove_from_group("c1", "r1");

        assert!(transport.groups_of("c1").is_empty());
        assert_eq!(transport.group_count(), 0);
        // emitting at the now-empty room is a no-op, not a panic
        transport.send_to_group("r1", content("v"));
    }

    #[test]
    fn unregister_sweeps_all_groups() {
        let transport = WsTransport::new();
        let _rx1 = connect(&transport, "c1");
        let mut rx2 = connect(&transport, "c2");
        transport.add_to_group("c1", "r1");
        transport.add_to_group("c1", "r2");
        transport.add_to_group("c2", "r1");

        transport.unregister("c1");

        assert_eq!(transport.connection_count(), 1);
        assert!(transport.groups_of("c1").is_empty());
        assert_eq!(transport.group_count(), 1);

        transport.send_to_group("r1", content("v"));
        assert_eq!(rx2.try_recv().unwrap(), content("v"));
    }

    #[test]
    fn send_to_absent_connection_is_noop() {
        let transport = WsTransport::new();
        transport.send_to("ghost", content("v"));
    }
}
