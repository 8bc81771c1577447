//! WebSocket server and connection handling.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, PlaceResultView, ServerMessage};
use crate::session::{PlayerSession, ScoreBoard, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
///
/// Each session sits behind its map entry's lock, so two connections
/// resuming the same id never mutate it at the same time.
pub struct ServerState {
    pub config: ServerConfig,
    /// Sessions with a live connection
    pub sessions: DashMap<Uuid, PlayerSession>,
    pub scores: Arc<ScoreBoard>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let scores = Arc::new(ScoreBoard::new(&config.save_dir));
        Self {
            config,
            sessions: DashMap::new(),
            scores,
        }
    }

    /// Run `f` against a session, opening it from disk if needed.
    ///
    /// The disk read happens before the map is locked. If another
    /// connection inserted the same id meanwhile, its session wins.
    fn with_session<T>(&self, id: Uuid, f: impl FnOnce(&mut PlayerSession) -> T) -> T {
        if let Some(mut session) = self.sessions.get_mut(&id) {
            return f(&mut session);
        }
        let opened = PlayerSession::open(id, &self.config, Arc::clone(&self.scores));
        let mut session = self.sessions.entry(id).or_insert(opened);
        f(&mut session)
    }

    /// Make a saved session available for a connection.
    fn resume(&self, id: Uuid) -> Result<(), SessionError> {
        if self.sessions.contains_key(&id) || PlayerSession::has_saved_game(id, &self.config) {
            Ok(())
        } else {
            Err(SessionError::NotFound)
        }
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(state.config.addr).await?;
    info!("Block puzzle server listening on {}", state.config.addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // The session is opened lazily so a resuming client never creates a stray save
    let mut session_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let welcome = ServerMessage::Welcome { session_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                if let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) {
                    let (id, replies) = dispatch(session_id, client_msg, &state).await?;
                    session_id = id;
                    for reply in replies {
                        let _ = tx.send(reply);
                    }
                } else {
                    warn!("Invalid message from {}: {}", session_id, text);
                }
            }
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", session_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                let _ = tx.send(ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", session_id, e);
                break;
            }
            _ => {}
        }
    }

    // Progress is already on disk
    state.sessions.remove(&session_id);
    send_task.abort();

    info!("Connection closed for {}", session_id);
    Ok(())
}

/// Run [`handle_message`] on the blocking pool, since sessions read and
/// write their save files. Returns the connection's session id afterwards.
async fn dispatch(
    session_id: Uuid,
    msg: ClientMessage,
    state: &Arc<ServerState>,
) -> anyhow::Result<(Uuid, Vec<ServerMessage>)> {
    let state = Arc::clone(state);
    let result = tokio::task::spawn_blocking(move || {
        let mut session_id = session_id;
        let replies = handle_message(&mut session_id, msg, &state);
        (session_id, replies)
    })
    .await?;
    Ok(result)
}

/// Handle a client message, returning the replies in order.
fn handle_message(
    session_id: &mut Uuid,
    msg: ClientMessage,
    state: &ServerState,
) -> Vec<ServerMessage> {
    match msg {
        ClientMessage::NewGame => state.with_session(*session_id, |session| {
            session.new_game();
            vec![ServerMessage::GameState {
                state: session.view(),
            }]
        }),

        ClientMessage::ResumeGame { session_id: requested } => match state.resume(requested) {
            Ok(()) => {
                if requested != *session_id {
                    state.sessions.remove(&*session_id);
                    *session_id = requested;
                }
                let view = state.with_session(requested, |session| session.view());
                vec![
                    ServerMessage::Welcome {
                        session_id: requested,
                    },
                    ServerMessage::GameState { state: view },
                ]
            }
            Err(e) => vec![ServerMessage::Error {
                message: e.to_string(),
            }],
        },

        ClientMessage::PlacePiece { slot, x, y } => state.with_session(*session_id, |session| {
            match session.place_piece(slot, x, y) {
                Ok((outcome, game_over)) => {
                    let mut replies =
                        vec![ServerMessage::PlaceResult(PlaceResultView::from(&outcome))];
                    if outcome.is_placed() {
                        replies.push(ServerMessage::GameState {
                            state: session.view(),
                        });
                    }
                    if let Some(over) = game_over {
                        replies.push(ServerMessage::GameOver {
                            score: over.score,
                            best_score: over.best_score,
                            new_best: over.new_best,
                        });
                    }
                    replies
                }
                Err(e) => vec![ServerMessage::Error {
                    message: e.to_string(),
                }],
            }
        }),

        ClientMessage::GetState => state.with_session(*session_id, |session| {
            vec![ServerMessage::GameState {
                state: session.view(),
            }]
        }),

        ClientMessage::Ping => vec![ServerMessage::Pong],
    }
}
