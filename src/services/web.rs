//! Axum-based HTTP server and websocket control channel.
//!
//! Routes:
//! - GET `/` - Web UI (embedded index.html)
//! - GET `/static/*` - Static assets from the configured directory
//! - GET `/ws` - Websocket upgrade to the command channel
//!
//! Anything else is a 404; a wrong method on a known route is a 405.
//!
//! Each websocket connection runs one sequential loop: read a message,
//! dispatch it through [`SharedRobotState`], echo it back unchanged. A pan or
//! tilt whose device write failed is not echoed. A read error, a close frame
//! or a binary frame that is not UTF-8 ends the session.

use std::fmt::Display;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::config::WebConfig;
use crate::traits::DeviceBus;
use crate::{CommandKind, Dispatch};

use super::shared::SharedRobotState;

// ============================================================================
// Route Handlers
// ============================================================================

/// GET / - Serve the web UI
async fn index() -> impl IntoResponse {
    Html(include_str!("../../www/index.html"))
}

/// GET /ws - Upgrade to the command channel
async fn ws_upgrade<B>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<SharedRobotState<B>>>,
) -> impl IntoResponse
where
    B: DeviceBus + Send + 'static,
{
    ws.on_upgrade(move |socket| command_session(socket, state))
}

/// Fallback handler for 404
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}

// ============================================================================
// Command Session
// ============================================================================

/// What the session loop should do with one inbound frame.
#[derive(Debug, PartialEq)]
pub enum FrameAction {
    /// Send this reply (the received frame) and keep reading.
    Echo(Message),
    /// Nothing to send; keep reading.
    Skip,
    /// End the session.
    Close,
}

/// Dispatch one inbound frame and decide the reply.
///
/// Text frames are commands. Binary frames are decoded as UTF-8 and treated
/// the same way, echoed back as binary; undecodable ones end the session.
pub fn process_frame<B: DeviceBus>(state: &SharedRobotState<B>, message: Message) -> FrameAction {
    match message {
        Message::Text(text) => {
            let dispatch = state.handle_message(&text);
            reply_for(dispatch, Message::Text(text))
        }
        Message::Binary(bytes) => match std::str::from_utf8(&bytes) {
            Ok(text) => {
                let dispatch = state.handle_message(text);
                reply_for(dispatch, Message::Binary(bytes))
            }
            Err(e) => {
                log::warn!("cannot decode binary command: {}", e);
                FrameAction::Close
            }
        },
        Message::Ping(_) | Message::Pong(_) => FrameAction::Skip,
        Message::Close(_) => FrameAction::Close,
    }
}

// A failed camera write abandons the command, reply included.
fn reply_for(dispatch: Dispatch, echo: Message) -> FrameAction {
    match dispatch {
        Dispatch::DeviceFailed(CommandKind::Pan | CommandKind::Tilt) => FrameAction::Skip,
        _ => FrameAction::Echo(echo),
    }
}

async fn command_session<B>(socket: WebSocket, state: Arc<SharedRobotState<B>>)
where
    B: DeviceBus + Send + 'static,
{
    let session = state.next_session_id();
    log::info!("session {}: opened", session);

    let (outgoing, incoming) = socket.split();
    session_loop(&state, session, incoming, outgoing).await;

    log::info!("session {}: closed", session);
}

/// Read, dispatch and reply until the peer goes away.
async fn session_loop<B, I, O, E>(
    state: &SharedRobotState<B>,
    session: u64,
    mut incoming: I,
    mut outgoing: O,
) where
    B: DeviceBus,
    I: Stream<Item = Result<Message, E>> + Unpin,
    O: Sink<Message> + Unpin,
    E: Display,
    O::Error: Display,
{
    while let Some(received) = incoming.next().await {
        let message = match received {
            Ok(message) => message,
            Err(e) => {
                log::warn!("session {}: read failed: {}", session, e);
                break;
            }
        };

        match process_frame(state, message) {
            FrameAction::Echo(reply) => {
                if let Err(e) = outgoing.send(reply).await {
                    log::warn!("session {}: write failed: {}", session, e);
                    break;
                }
            }
            FrameAction::Skip => {}
            FrameAction::Close => break,
        }
    }
}

// ============================================================================
// Server Builder
// ============================================================================

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Address to bind to
    pub addr: SocketAddr,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    /// Whether to enable CORS for all origins
    pub cors_permissive: bool,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self::from_config(&WebConfig::default())
    }
}

impl WebServerConfig {
    /// Create a new config with the given address
    pub fn new(addr: impl Into<SocketAddr>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    /// Set the static asset directory
    pub fn static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Set whether CORS should be permissive
    pub fn cors(mut self, permissive: bool) -> Self {
        self.cors_permissive = permissive;
        self
    }

    /// Create from shared WebConfig
    pub fn from_config(config: &WebConfig) -> Self {
        Self {
            addr: ([0, 0, 0, 0], config.port).into(),
            static_dir: PathBuf::from(config.static_dir.as_str()),
            cors_permissive: config.cors_permissive,
        }
    }
}

/// Build the Axum router with all routes
pub fn build_router<B>(state: Arc<SharedRobotState<B>>, config: &WebServerConfig) -> Router
where
    B: DeviceBus + Send + 'static,
{
    let mut router = Router::new()
        .route("/", get(index))
        .route("/ws", get(ws_upgrade::<B>))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .fallback(not_found)
        .with_state(state);

    if config.cors_permissive {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}

/// Run the web server until Ctrl-C, then park the drive.
///
/// # Example
///
/// ```ignore
/// let state = Arc::new(SharedRobotState::new(controller));
/// run_server_with_state(state, WebServerConfig::from_config(&config.web)).await?;
/// ```
pub async fn run_server_with_state<B>(
    state: Arc<SharedRobotState<B>>,
    config: WebServerConfig,
) -> Result<(), std::io::Error>
where
    B: DeviceBus + Send + 'static,
{
    let router = build_router(Arc::clone(&state), &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    log::info!("Starting server at http://{}", config.addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("server stopped, parking drive");
    if let Err(e) = state.stop() {
        log::error!("could not park drive: {}", e);
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
