//! Connection tracking and outbound delivery for the game server
//!
//! This module keeps the server-side view of every open WebSocket:
//! - Connection lifecycle (accept, capacity check, removal)
//! - Per-connection outbound queues feeding the socket writer tasks
//! - Best-effort fan-out of encoded packets to every connection
//!
//! A connection is not the same thing as a player. Spectators stay connected
//! and receive state updates without ever joining the game.

use bincode::serialize;
use log::{error, info, warn};
use shared::{Packet, PlayerId};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_tungstenite::tungstenite::Message;

/// Outbound messages a slow client may have queued before it starts
/// missing updates.
pub const OUTBOUND_QUEUE: usize = 64;

/// Represents one open connection
#[derive(Debug)]
pub struct Client {
    /// Unique connection identifier, also the player identity once joined
    pub id: PlayerId,
    /// Remote address, for logging
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    /// Queue drained by the connection's socket writer
    sender: mpsc::Sender<Message>,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr, sender: mpsc::Sender<Message>) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            sender,
        }
    }

    /// Queues a message without waiting. Returns false if the client's queue
    /// is full or its writer has gone away.
    pub fn send(&self, message: Message) -> bool {
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("Outbound queue full for client {}, dropping message", self.id);
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Client {} writer closed", self.id);
                false
            }
        }
    }
}

/// Encodes a packet as a binary WebSocket frame.
pub fn encode(packet: &Packet) -> Option<Message> {
    match serialize(packet) {
        Ok(data) => Some(Message::Binary(data)),
        Err(e) => {
            error!("Failed to encode packet: {}", e);
            None
        }
    }
}

/// Manages all open connections
///
/// Enforces the connection cap and owns every outbound queue. Dropping a
/// `Client` drops its sender, which makes the writer task close the socket.
pub struct ClientManager {
    /// Open connections indexed by their ID
    clients: HashMap<PlayerId, Client>,
    /// Maximum number of concurrent connections allowed
    max_clients: usize,
}

impl ClientManager {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    /// Registers a connection. Returns false if the server is at capacity.
    pub fn add_client(&mut self, id: PlayerId, addr: SocketAddr, sender: mpsc::Sender<Message>) -> bool {
        if self.clients.len() >= self.max_clients {
            return false;
        }

        info!("Client {} connected from {}", id, addr);
        self.clients.insert(id, Client::new(id, addr, sender));
        true
    }

    /// Removes a connection. Returns true if it was registered.
    pub fn remove_client(&mut self, id: &PlayerId) -> bool {
        if let Some(client) = self.clients.remove(id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.connected_at.elapsed().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    pub fn contains(&self, id: &PlayerId) -> bool {
        self.clients.contains_key(id)
    }

    /// Sends a packet to one connection.
    pub fn send_to(&self, id: PlayerId, packet: &Packet) -> bool {
        let Some(client) = self.clients.get(&id) else {
            return false;
        };
        encode(packet).is_some_and(|message| client.send(message))
    }

    /// Sends a packet to every connection. A failure for one client does not
    /// stop delivery to the rest. Returns how many queues accepted it.
    pub fn broadcast(&self, packet: &Packet) -> usize {
        let Some(message) = encode(packet) else {
            return 0;
        };

        self.clients
            .values()
            .filter(|client| client.send(message.clone()))
            .count()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bincode::deserialize;

    fn test_addr() -> SocketAddr {
        "127.0.0.1:8080".parse().unwrap()
    }

    fn decode(message: Message) -> Packet {
        match message {
            Message::Binary(data) => deserialize(&data).unwrap(),
            other => panic!("expected binary frame, got {:?}", other),
        }
    }

    #[test]
    fn test_client_manager_creation() {
        let manager = ClientManager::new(5);
        assert_eq!(manager.max_clients, 5);
        assert!(manager.is_empty());
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_add_client_max_capacity() {
        let mut manager = ClientManager::new(1);
        let (tx1, _rx1) = mpsc::channel(OUTBOUND_QUEUE);
        let (tx2, _rx2) = mpsc::channel(OUTBOUND_QUEUE);

        assert!(manager.add_client(1, test_addr(), tx1));
        assert!(!manager.add_client(2, test_addr(), tx2));
        assert_eq!(manager.len(), 1);
        assert!(manager.contains(&1));
        assert!(!manager.contains(&2));
    }

    #[test]
    fn test_remove_client() {
        let mut manager = ClientManager::new(2);
        let (tx, mut rx) = mpsc::channel(OUTBOUND_QUEUE);
        manager.add_client(1, test_addr(), tx);

        assert!(manager.remove_client(&1));
        assert!(!manager.remove_client(&1));
        assert!(manager.is_empty());

        // Writer side sees the queue close once the client is dropped.
        assert!(rx.try_recv().is_err());
        assert!(rx.blocking_recv().is_none());
    }

    #[test]
    fn test_send_to_one_client() {
        let mut manager = ClientManager::new(4);
        let (tx1, mut rx1) = mpsc::channel(OUTBOUND_QUEUE);
        let (tx2, mut rx2) = mpsc::channel(OUTBOUND_QUEUE);
        manager.add_client(1, test_addr(), tx1);
        manager.add_client(2, test_addr(), tx2);

        let packet = Packet::Error {
            message: "Not your turn".to_string(),
        };
        assert!(manager.send_to(2, &packet));
        assert!(!manager.send_to(3, &packet));

        assert!(rx1.try_recv().is_err());
        assert_eq!(decode(rx2.try_recv().unwrap()), packet);
    }

    #[test]
    fn test_broadcast_reaches_everyone() {
        let mut manager = ClientManager::new(4);
        let mut receivers = Vec::new();
        for id in 1..=3 {
            let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
            manager.add_client(id, test_addr(), tx);
            receivers.push(rx);
        }

        let packet = Packet::Connected { client_id: 9 };
        assert_eq!(manager.broadcast(&packet), 3);
        for rx in &mut receivers {
            assert_eq!(decode(rx.try_recv().unwrap()), packet);
        }
    }

    #[test]
    fn test_broadcast_skips_dead_and_full_clients() {
        let mut manager = ClientManager::new(4);
        let (tx_dead, rx_dead) = mpsc::channel(OUTBOUND_QUEUE);
        let (tx_full, _rx_full) = mpsc::channel(1);
        let (tx_ok, mut rx_ok) = mpsc::channel(OUTBOUND_QUEUE);
        manager.add_client(1, test_addr(), tx_dead);
        manager.add_client(2, test_addr(), tx_full);
        manager.add_client(3, test_addr(), tx_ok);
        drop(rx_dead);

        let packet = Packet::StartGame;
        assert!(manager.send_to(2, &packet));
        assert_eq!(manager.broadcast(&packet), 1);
        assert_eq!(decode(rx_ok.try_recv().unwrap()), packet);
    }
}
