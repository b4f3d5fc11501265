//! Server network layer: TCP accept loop, per-connection tasks and shutdown

use crate::client_manager::ClientManager;
use crate::game::GameState;
use crate::layout::MazeLayout;
use crate::session::{self, Outcome, SERVER_FULL_RESPONSE};
use log::{debug, error, info, warn};
use shared::Command;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinSet;

/// Longest command line accepted, terminator included. Longer lines are
/// answered as invalid and the rest of the line is dropped.
pub const MAX_LINE_BYTES: u64 = 1024;

/// Game state handle. Every command runs with the lock held, so connections
/// never observe a half-applied move.
pub type SharedGame = Arc<Mutex<GameState>>;

/// Whether connections play in one world or each get their own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldMode {
    Shared,
    Isolated,
}

/// Startup settings for [`Server::bind`]
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` to listen on. Port 0 picks an ephemeral port.
    pub addr: String,
    /// Connections beyond this are told the server is full
    pub max_clients: usize,
    pub world: WorldMode,
    /// Leave `*` on cells the player has left
    pub trail: bool,
    /// Starting maze for every world this server creates
    pub layout: MazeLayout,
}

impl ServerConfig {
    fn new_game(&self) -> GameState {
        GameState::new(self.layout.clone()).with_trail(self.trail)
    }
}

/// Cooperative stop flag shared by the accept loop and every connection
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Asks every task holding a clone to stop. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the signal has been triggered
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one connection task needs
#[derive(Clone)]
pub struct ConnectionContext {
    pub client_id: u32,
    pub game: SharedGame,
    pub clients: Arc<RwLock<ClientManager>>,
    pub shutdown: ShutdownSignal,
}

/// Line-oriented request/response loop for one client.
///
/// Sends the greeting snapshot, then answers one frame per line until the
/// client hangs up, sends `kill`, or the server shuts down. A response that
/// is being written always completes before shutdown is observed.
pub async fn serve_connection<S>(stream: S, ctx: ConnectionContext) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (reader, mut writer) = tokio::io::split(stream);
    let mut reader = BufReader::new(reader);

    let greeting = {
        let game = ctx.game.lock().await;
        session::greeting(&game)
    };
    writer.write_all(greeting.as_bytes()).await?;
    writer.flush().await?;

    let mut buffer = Vec::new();
    let mut discarding = false;
    loop {
        buffer.clear();
        let mut limited = (&mut reader).take(MAX_LINE_BYTES);
        let read = tokio::select! {
            biased;
            _ = ctx.shutdown.wait() => {
                debug!("Closing client {} for shutdown", ctx.client_id);
                break;
            }
            read = limited.read_until(b'\n', &mut buffer) => read?,
        };

        if read == 0 {
            break;
        }

        let complete = buffer.last() == Some(&b'\n');
        if discarding {
            // Tail of an oversized line that was already answered
            discarding = !complete;
            continue;
        }

        let command = if !complete && buffer.len() as u64 >= MAX_LINE_BYTES {
            warn!(
                "Client {} sent a line longer than {} bytes",
                ctx.client_id, MAX_LINE_BYTES
            );
            discarding = true;
            Command::Invalid(String::from_utf8_lossy(&buffer[..16]).into_owned())
        } else {
            Command::parse(&String::from_utf8_lossy(&buffer))
        };
        debug!("Client {} command: {:?}", ctx.client_id, command);

        let outcome = {
            let mut game = ctx.game.lock().await;
            session::dispatch(&mut game, &command)
        };
        ctx.clients.write().await.record_command(ctx.client_id);

        match outcome {
            Outcome::Reply(text) => {
                writer.write_all(text.as_bytes()).await?;
                writer.flush().await?;
            }
            Outcome::Shutdown => {
                info!("Client {} requested server shutdown", ctx.client_id);
                ctx.shutdown.trigger();
                break;
            }
        }
    }

    Ok(())
}

async fn reject_full(mut stream: TcpStream, addr: SocketAddr) {
    let message = format!("{}\n", SERVER_FULL_RESPONSE);
    if let Err(e) = stream.write_all(message.as_bytes()).await {
        debug!("Failed to tell {} the server is full: {}", addr, e);
    }
}

/// The maze server: one listener, one task per connection
pub struct Server {
    listener: TcpListener,
    config: ServerConfig,
    game: SharedGame,
    clients: Arc<RwLock<ClientManager>>,
    shutdown: ShutdownSignal,
}

impl Server {
    /// Binds the listener and builds the starting world
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.addr).await?;
        info!("Maze server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            game: Arc::new(Mutex::new(config.new_game())),
            clients: Arc::new(RwLock::new(ClientManager::new(config.max_clients))),
            shutdown: ShutdownSignal::new(),
            config,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle for stopping [`Server::run`] from outside
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    fn game_for_connection(&self) -> SharedGame {
        match self.config.world {
            WorldMode::Shared => Arc::clone(&self.game),
            WorldMode::Isolated => Arc::new(Mutex::new(self.config.new_game())),
        }
    }

    /// Accepts connections until shutdown, then waits for every open
    /// connection to finish its current response.
    pub async fn run(self) -> io::Result<()> {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.wait() => break,

                Some(finished) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = finished {
                        error!("Connection task panicked: {}", e);
                    }
                },

                accepted = self.listener.accept() => {
                    let (stream, addr) = match accepted {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };

                    let client_id = self.clients.write().await.add_client(addr);
                    let Some(client_id) = client_id else {
                        warn!("Rejecting {}: server full", addr);
                        connections.spawn(reject_full(stream, addr));
                        continue;
                    };

                    let clients = Arc::clone(&self.clients);
                    let ctx = ConnectionContext {
                        client_id,
                        game: self.game_for_connection(),
                        clients: Arc::clone(&self.clients),
                        shutdown: self.shutdown.clone(),
                    };

                    connections.spawn(async move {
                        if let Err(e) = serve_connection(stream, ctx).await {
                            warn!("Client {} connection error: {}", client_id, e);
                        }
                        clients.write().await.remove_client(&client_id);
                    });
                },
            }
        }

        info!("Shutting down the server gracefully...");
        drop(self.listener);

        let open = connections.len();
        if open > 0 {
            info!("Waiting for {} open connection(s) to finish", open);
        }
        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                error!("Connection task panicked: {}", e);
            }
        }

        info!("Server shutdown complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Direction, Position};
    use std::time::Duration;
    use tokio_test::io::Builder;

    fn reference_game() -> GameState {
        GameState::new(MazeLayout::reference().unwrap())
    }

    fn test_context(game: GameState) -> ConnectionContext {
        let clients = Arc::new(RwLock::new(ClientManager::new(4)));
        let client_id = clients
            .try_write()
            .unwrap()
            .add_client("127.0.0.1:9000".parse().unwrap())
            .unwrap();

        ConnectionContext {
            client_id,
            game: Arc::new(Mutex::new(game)),
            clients,
            shutdown: ShutdownSignal::new(),
        }
    }

    fn reply(outcome: Outcome) -> String {
        match outcome {
            Outcome::Reply(text) => text,
            Outcome::Shutdown => panic!("Unexpected shutdown"),
        }
    }

    #[tokio::test]
    async fn test_connection_round_trip() {
        let mut expected = reference_game();
        let greeting = session::greeting(&expected);
        let moved = reply(session::dispatch(
            &mut expected,
            &Command::Move(Direction::Right),
        ));
        let found = reply(session::dispatch(&mut expected, &Command::parse("find")));

        let stream = Builder::new()
            .write(greeting.as_bytes())
            .read(b"D\n")
            .write(moved.as_bytes())
            .read(b"find\r\n")
            .write(found.as_bytes())
            .build();

        let ctx = test_context(reference_game());
        serve_connection(stream, ctx.clone()).await.unwrap();

        assert_eq!(*ctx.game.lock().await, expected);
        assert_eq!(
            ctx.game.lock().await.player_position(),
            Position::new(1, 2)
        );
        assert_eq!(
            ctx.clients.write().await.record_command(ctx.client_id),
            Some(3)
        );
        assert!(!ctx.shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_malformed_bytes_are_invalid_commands() {
        let mut expected = reference_game();
        let greeting = session::greeting(&expected);
        let invalid = reply(session::dispatch(
            &mut expected,
            &Command::Invalid("\u{FFFD}".to_string()),
        ));

        let stream = Builder::new()
            .write(greeting.as_bytes())
            .read(&[0xff, b'\n'])
            .write(invalid.as_bytes())
            .build();

        let ctx = test_context(reference_game());
        serve_connection(stream, ctx.clone()).await.unwrap();
        assert_eq!(*ctx.game.lock().await, reference_game());
    }

    #[tokio::test]
    async fn test_kill_triggers_shutdown_without_reply() {
        let game = reference_game();
        let stream = Builder::new()
            .write(session::greeting(&game).as_bytes())
            .read(b"kill\n")
            .build();

        let ctx = test_context(game);
        serve_connection(stream, ctx.clone()).await.unwrap();
        assert!(ctx.shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_connection_stops_reading_after_shutdown() {
        let game = reference_game();
        let stream = Builder::new()
            .write(session::greeting(&game).as_bytes())
            .build();

        let ctx = test_context(game);
        ctx.shutdown.trigger();
        serve_connection(stream, ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_reply_in_flight_completes_after_shutdown() {
        let mut expected = reference_game();
        let greeting = session::greeting(&expected);
        let moved = reply(session::dispatch(
            &mut expected,
            &Command::Move(Direction::Down),
        ));

        // The peer stalls while the reply is being written
        let stream = Builder::new()
            .write(greeting.as_bytes())
            .read(b"D\n")
            .wait(Duration::from_millis(200))
            .write(moved.as_bytes())
            .build();

        let ctx = test_context(reference_game());
        let trigger = {
            let signal = ctx.shutdown.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                signal.trigger();
            })
        };

        // The mock panics on drop if the reply was cut short
        serve_connection(stream, ctx.clone()).await.unwrap();
        trigger.await.unwrap();

        assert!(ctx.shutdown.is_triggered());
        assert_eq!(*ctx.game.lock().await, expected);
    }

    #[tokio::test]
    async fn test_oversized_line_is_invalid() {
        let mut expected = reference_game();
        let greeting = session::greeting(&expected);
        let invalid = reply(session::dispatch(
            &mut expected,
            &Command::Invalid("x".repeat(16)),
        ));
        let moved = reply(session::dispatch(
            &mut expected,
            &Command::Move(Direction::Right),
        ));

        let mut long_line = vec![b'x'; MAX_LINE_BYTES as usize + 500];
        long_line.push(b'\n');

        let stream = Builder::new()
            .write(greeting.as_bytes())
            .read(&long_line)
            .write(invalid.as_bytes())
            .read(b"D\n")
            .write(moved.as_bytes())
            .build();

        let ctx = test_context(reference_game());
        serve_connection(stream, ctx.clone()).await.unwrap();

        assert_eq!(*ctx.game.lock().await, expected);
        assert_eq!(
            ctx.clients.write().await.record_command(ctx.client_id),
            Some(3)
        );
    }

    #[tokio::test]
    async fn test_line_at_the_limit_is_not_split() {
        let mut expected = reference_game();
        let greeting = session::greeting(&expected);

        let mut line = vec![b'x'; MAX_LINE_BYTES as usize - 1];
        line.push(b'\n');
        let invalid = reply(session::dispatch(
            &mut expected,
            &Command::parse(&String::from_utf8_lossy(&line)),
        ));
        let moved = reply(session::dispatch(
            &mut expected,
            &Command::Move(Direction::Down),
        ));

        let stream = Builder::new()
            .write(greeting.as_bytes())
            .read(&line)
            .write(invalid.as_bytes())
            .read(b"S\n")
            .write(moved.as_bytes())
            .build();

        let ctx = test_context(reference_game());
        serve_connection(stream, ctx.clone()).await.unwrap();
        assert_eq!(
            ctx.game.lock().await.player_position(),
            Position::new(2, 1)
        );
    }

    #[tokio::test]
    async fn test_shutdown_signal_wakes_waiters() {
        let signal = ShutdownSignal::new();
        assert!(!signal.is_triggered());

        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.wait().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        signal.trigger();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake after trigger")
            .unwrap();
        assert!(signal.is_triggered());

        // Late waiters return immediately
        tokio::time::timeout(Duration::from_millis(100), signal.wait())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_isolated_worlds_do_not_share_state() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            max_clients: 4,
            world: WorldMode::Isolated,
            trail: false,
            layout: MazeLayout::reference().unwrap(),
        };
        let server = Server::bind(config).await.unwrap();

        let first = server.game_for_connection();
        let second = server.game_for_connection();
        first.lock().await.apply_move(Direction::Right);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.lock().await.player_position(), Position::new(1, 1));
    }

    #[tokio::test]
    async fn test_shared_world_is_one_state() {
        let config = ServerConfig {
            addr: "127.0.0.1:0".to_string(),
            max_clients: 4,
            world: WorldMode::Shared,
            trail: true,
            layout: MazeLayout::reference().unwrap(),
        };
        let server = Server::bind(config).await.unwrap();

        let first = server.game_for_connection();
        let second = server.game_for_connection();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
