//! Server network layer: WebSocket connections and the single-writer main loop

use crate::client_manager::{encode, ClientManager, OUTBOUND_QUEUE};
use crate::config::{Config, GameRules};
use crate::dice::{Dice, RandomDice};
use crate::error::ServerError;
use crate::session::{Outbound, Session};
use crate::turn::{ScheduledTransition, TurnTicket};
use bincode::deserialize;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{Packet, PlayerId};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// Messages sent from connection and timer tasks to the main loop
#[derive(Debug)]
pub enum ServerMessage {
    NewConnection {
        client_id: PlayerId,
        addr: SocketAddr,
        sender: mpsc::Sender<Message>,
    },
    PacketReceived {
        client_id: PlayerId,
        packet: Packet,
    },
    ClientDisconnect {
        client_id: PlayerId,
    },
    TurnTimer(TurnTicket),
    Shutdown,
}

/// Main server owning the game session and every connection
pub struct Server {
    listener: Option<TcpListener>,
    clients: ClientManager,
    session: Session,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(config: &Config) -> Result<Self, ServerError> {
        let dice: Box<dyn Dice> = match config.seed {
            Some(seed) => {
                info!("Using fixed dice seed {}", seed);
                Box::new(RandomDice::seeded(seed))
            }
            None => Box::new(RandomDice::from_entropy()),
        };
        Self::with_dice(config, dice).await
    }

    pub async fn with_dice(config: &Config, dice: Box<dyn Dice>) -> Result<Self, ServerError> {
        let address = config.address();
        let listener = TcpListener::bind(&address).await?;
        info!("Server listening on {}", listener.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            clients: ClientManager::new(config.max_connections),
            session: Session::new(GameRules::default(), config.turn_delays(), dice),
            server_tx,
            server_rx,
        })
    }

    /// Address actually bound, useful when the configured port is 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        match &self.listener {
            Some(listener) => Ok(listener.local_addr()?),
            None => Err(std::io::Error::new(std::io::ErrorKind::NotConnected, "listener already running").into()),
        }
    }

    /// Handle for injecting messages, such as `Shutdown`, into the main loop.
    pub fn sender(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that accepts TCP connections and upgrades them
    fn spawn_listener(&mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut next_client_id: PlayerId = 1;

            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        let client_id = next_client_id;
                        next_client_id += 1;

                        let server_tx = server_tx.clone();
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, addr, client_id, &server_tx).await {
                                warn!("Connection {} from {} failed: {}", client_id, addr, e);
                            }
                            let _ = server_tx.send(ServerMessage::ClientDisconnect { client_id });
                        });
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns task that feeds a turn ticket back into the main loop once its
    /// delay has elapsed
    fn spawn_turn_timer(&self, scheduled: ScheduledTransition) {
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            tokio::time::sleep(scheduled.delay).await;
            if let Err(e) = server_tx.send(ServerMessage::TurnTimer(scheduled.ticket)) {
                debug!("Turn timer fired after shutdown: {}", e);
            }
        });
    }

    fn dispatch(&self, outbound: Vec<Outbound>) {
        for item in outbound {
            match item {
                Outbound::Send { to, packet } => {
                    if !self.clients.send_to(to, &packet) {
                        debug!("Could not deliver packet to client {}", to);
                    }
                }
                Outbound::Broadcast(packet) => {
                    self.clients.broadcast(&packet);
                }
                Outbound::Schedule(scheduled) => self.spawn_turn_timer(scheduled),
            }
        }
    }

    fn handle_message(&mut self, message: ServerMessage) -> bool {
        match message {
            ServerMessage::NewConnection {
                client_id,
                addr,
                sender,
            } => {
                if self.clients.add_client(client_id, addr, sender.clone()) {
                    let greeting = self.session.connect(client_id);
                    self.dispatch(greeting);
                } else {
                    warn!("Rejecting client {} from {}: server full", client_id, addr);
                    let packet = Packet::Rejected {
                        reason: "Server full".to_string(),
                    };
                    if let Some(message) = encode(&packet) {
                        let _ = sender.try_send(message);
                    }
                }
            }
            ServerMessage::PacketReceived { client_id, packet } => {
                if !self.clients.contains(&client_id) {
                    return true;
                }
                let leaving = packet == Packet::Leave;
                let outbound = self.session.handle(client_id, packet);
                self.dispatch(outbound);
                if leaving {
                    self.clients.remove_client(&client_id);
                }
            }
            ServerMessage::ClientDisconnect { client_id } => {
                self.clients.remove_client(&client_id);
                let outbound = self.session.disconnect(client_id);
                self.dispatch(outbound);
            }
            ServerMessage::TurnTimer(ticket) => {
                let outbound = self.session.fire(ticket);
                self.dispatch(outbound);
            }
            ServerMessage::Shutdown => {
                info!("Server shutting down");
                return false;
            }
        }
        true
    }

    /// Main server loop. Every state change happens here, one message at a
    /// time, in arrival order.
    pub async fn run(mut self) -> Result<(), ServerError> {
        self.spawn_listener();
        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            if !self.handle_message(message) {
                break;
            }
        }

        Ok(())
    }
}

/// Drives one WebSocket: decodes inbound frames for the main loop and writes
/// whatever the main loop queues for this client.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    client_id: PlayerId,
    server_tx: &mpsc::UnboundedSender<ServerMessage>,
) -> Result<(), ServerError> {
    let websocket = accept_async(stream).await?;
    let (mut sink, mut source) = websocket.split();
    let (sender, mut outbound) = mpsc::channel(OUTBOUND_QUEUE);

    if server_tx
        .send(ServerMessage::NewConnection {
            client_id,
            addr,
            sender,
        })
        .is_err()
    {
        return Ok(());
    }

    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(message) => sink.send(message).await?,
                None => {
                    // Main loop dropped this client.
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = source.next() => match incoming {
                Some(Ok(Message::Binary(data))) => match deserialize::<Packet>(&data) {
                    Ok(packet) if packet.is_client_action() => {
                        if server_tx.send(ServerMessage::PacketReceived { client_id, packet }).is_err() {
                            break;
                        }
                    }
                    Ok(packet) => warn!("Unexpected packet type from client {}: {:?}", client_id, packet),
                    Err(e) => warn!("Failed to deserialize packet from {}: {}", addr, e),
                },
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
            },
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::ScriptedDice;
    use shared::Phase;
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn test_config(max_connections: usize) -> Config {
        Config {
            port: 0,
            max_connections,
            roll_delay_ms: 20,
            buy_delay_ms: 20,
            skip_delay_ms: 10,
            ..Config::default()
        }
    }

    fn addr() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    async fn test_server(rolls: &[(u8, u8)]) -> Server {
        assert_ok!(Server::with_dice(&test_config(4), Box::new(ScriptedDice::new(rolls.to_vec()))).await)
    }

    fn connect(server: &mut Server, client_id: PlayerId) -> mpsc::Receiver<Message> {
        let (sender, receiver) = mpsc::channel(OUTBOUND_QUEUE);
        server.handle_message(ServerMessage::NewConnection {
            client_id,
            addr: addr(),
            sender,
        });
        receiver
    }

    fn drain(receiver: &mut mpsc::Receiver<Message>) -> Vec<Packet> {
        let mut packets = Vec::new();
        while let Ok(Message::Binary(data)) = receiver.try_recv() {
            packets.push(deserialize(&data).unwrap());
        }
        packets
    }

    fn send(server: &mut Server, client_id: PlayerId, packet: Packet) {
        server.handle_message(ServerMessage::PacketReceived { client_id, packet });
    }

    #[tokio::test]
    async fn test_bind_reports_local_addr() {
        let server = test_server(&[]).await;
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_new_connection_is_greeted() {
        let mut server = test_server(&[]).await;
        let mut rx = connect(&mut server, 1);

        let packets = drain(&mut rx);
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], Packet::Connected { client_id: 1 });
        assert!(matches!(packets[1], Packet::GameState(_)));
    }

    #[tokio::test]
    async fn test_connection_cap_rejects() {
        let mut server = Server::with_dice(&test_config(1), Box::new(ScriptedDice::new(Vec::<(u8, u8)>::new())))
            .await
            .unwrap();
        let _first = connect(&mut server, 1);
        let mut second = connect(&mut server, 2);

        let packets = drain(&mut second);
        assert_eq!(
            packets,
            vec![Packet::Rejected {
                reason: "Server full".to_string()
            }]
        );
        assert_eq!(server.clients.len(), 1);
    }

    #[tokio::test]
    async fn test_error_goes_only_to_sender() {
        let mut server = test_server(&[]).await;
        let mut rx1 = connect(&mut server, 1);
        let mut rx2 = connect(&mut server, 2);
        drain(&mut rx1);
        drain(&mut rx2);

        send(&mut server, 1, Packet::StartGame);
        assert_eq!(
            drain(&mut rx1),
            vec![Packet::Error {
                message: "Need at least 2 players to start".to_string()
            }]
        );
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_packets_from_unknown_connections_are_dropped() {
        let mut server = test_server(&[]).await;
        send(&mut server, 7, Packet::JoinGame { name: "Ghost".to_string() });
        assert_eq!(server.session.state().player_count(), 0);
    }

    #[tokio::test]
    async fn test_turn_timer_round_trip() {
        let mut server = test_server(&[(1, 3)]).await;
        let mut rx1 = connect(&mut server, 1);
        let _rx2 = connect(&mut server, 2);

        send(&mut server, 1, Packet::JoinGame { name: "Alice".to_string() });
        send(&mut server, 2, Packet::JoinGame { name: "Bob".to_string() });
        send(&mut server, 1, Packet::StartGame);
        send(&mut server, 1, Packet::RollDice);
        drain(&mut rx1);
        assert_eq!(server.session.state().phase(), Phase::Waiting);

        let message = tokio::time::timeout(Duration::from_secs(2), server.server_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(message, ServerMessage::TurnTimer(_)));
        assert!(server.handle_message(message));

        assert_eq!(server.session.state().phase(), Phase::Rolling);
        assert!(server.session.state().is_active(2));
        let packets = drain(&mut rx1);
        assert!(matches!(packets.last(), Some(Packet::GameState(_))));
    }

    #[tokio::test]
    async fn test_leave_drops_connection() {
        let mut server = test_server(&[]).await;
        let mut rx = connect(&mut server, 1);
        send(&mut server, 1, Packet::JoinGame { name: "Alice".to_string() });
        send(&mut server, 1, Packet::Leave);

        assert!(!server.clients.contains(&1));
        assert_eq!(server.session.state().player_count(), 0);
        drain(&mut rx);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_shutdown_stops_loop() {
        let mut server = test_server(&[]).await;
        assert!(!server.handle_message(ServerMessage::Shutdown));
    }
}
