//! Session Engine (C5): one connection's lifecycle — handshake, concurrent
//! depth/heartbeat/quote loops, graceful teardown. State machine is
//! `CONNECTING → AUTHENTICATING → LIVE → CLOSING → CLOSED`; grounded in the
//! teacher's `feeds/polymarket.rs`/`feeds/user_ws.rs` connect-read loop,
//! generalized with an authenticated handshake and a shared writer actor
//! (see `writer.rs`).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy_primitives::Address;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::models::message::{self, Inbound};
use crate::models::order::MMQuote;
use crate::models::pair::TradingPair;
use crate::models::quote::{QuoteRequest, RejectReason};
use crate::oracle::PriceOracle;
use crate::pricing;
use crate::signing::QuoteSigner;
use crate::telemetry::metrics::SessionMetrics;

use super::error::SessionError;
use super::writer::Writer;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Session parameters negotiated from the hub's `auth_response.config`,
/// defaulting per §3 when the hub omits a field.
#[derive(Debug, Clone, Copy)]
struct RuntimeConfig {
    depth_push_interval_ms: u64,
    heartbeat_interval_ms: u64,
    quote_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            depth_push_interval_ms: 1_000,
            heartbeat_interval_ms: 30_000,
            quote_timeout_ms: 5_000,
        }
    }
}

impl RuntimeConfig {
    fn from_wire(wire: Option<message::SessionConfigWire>) -> Self {
        let default = Self::default();
        match wire {
            Some(cfg) => Self {
                depth_push_interval_ms: cfg.depth_push_interval_ms.unwrap_or(default.depth_push_interval_ms),
                heartbeat_interval_ms: cfg.heartbeat_interval_ms.unwrap_or(default.heartbeat_interval_ms),
                quote_timeout_ms: cfg.quote_timeout_ms.unwrap_or(default.quote_timeout_ms),
            },
            None => default,
        }
    }
}

/// One connection attempt's worth of fixed context, shared (read-only)
/// across the reader/depth-pusher/keepalive activities.
pub struct Session {
    hub: HubConfig,
    manager: Address,
    pairs: Arc<Vec<TradingPair>>,
    oracle: Arc<dyn PriceOracle>,
    signer: Arc<QuoteSigner>,
    metrics: SessionMetrics,
}

impl Session {
    pub fn new(
        hub: HubConfig,
        manager: Address,
        pairs: Vec<TradingPair>,
        oracle: Arc<dyn PriceOracle>,
        signer: Arc<QuoteSigner>,
        metrics: SessionMetrics,
    ) -> Self {
        Self {
            hub,
            manager,
            pairs: Arc::new(pairs),
            oracle,
            signer,
            metrics,
        }
    }

    /// Runs one connection attempt end to end. Returns `Ok(())` on a clean
    /// stop signal, `Err` on any fatal condition — the Supervisor decides
    /// whether/when to retry. `reached_live` is set once the handshake
    /// completes, so the Supervisor can reset its backoff even if this
    /// attempt later fails.
    pub async fn run_once(
        &self,
        global_shutdown: &broadcast::Sender<()>,
        reached_live: &std::sync::atomic::AtomicBool,
    ) -> Result<(), SessionError> {
        let mut top = global_shutdown.subscribe();

        let mut request = self
            .hub
            .ws_url
            .as_str()
            .into_client_request()
            .map_err(|e| SessionError::Handshake(e.to_string()))?;
        request.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.hub.auth_token))
                .map_err(|e| SessionError::Handshake(e.to_string()))?,
        );

        info!(ws_url = %self.hub.ws_url, "connecting to hub");
        let (ws_stream, _response) = tokio::select! {
            result = connect_async(request) => result?,
            _ = top.recv() => return Ok(()),
        };
        info!("transport established, authenticating");

        let (sink, mut read) = ws_stream.split();
        let (writer, writer_task) = Writer::spawn(sink);

        let runtime_cfg = tokio::select! {
            frame = read.next() => self.authenticate(frame)?,
            _ = top.recv() => {
                drop(writer);
                let _ = writer_task.await;
                return Ok(());
            }
        };
        reached_live.store(true, std::sync::atomic::Ordering::Relaxed);
        SessionMetrics::incr(&self.metrics.connects_succeeded);
        info!(
            depth_push_interval_ms = runtime_cfg.depth_push_interval_ms,
            heartbeat_interval_ms = runtime_cfg.heartbeat_interval_ms,
            quote_timeout_ms = runtime_cfg.quote_timeout_ms,
            "session is LIVE"
        );

        // Local fan-in: either the global shutdown or any activity's fatal
        // error tears down every sibling activity (CLOSING state).
        let (stop_tx, _) = broadcast::channel::<()>(1);
        {
            let stop_tx = stop_tx.clone();
            let mut global = global_shutdown.subscribe();
            tokio::spawn(async move {
                let _ = global.recv().await;
                let _ = stop_tx.send(());
            });
        }

        let sequence = Arc::new(AtomicU64::new(0));

        let reader = tokio::spawn(reader_loop(
            read,
            writer.clone(),
            Arc::clone(&self.pairs),
            Arc::clone(&self.oracle),
            Arc::clone(&self.signer),
            self.hub.chain_id,
            self.manager,
            self.metrics.clone(),
            runtime_cfg.quote_timeout_ms,
            stop_tx.subscribe(),
            stop_tx.clone(),
        ));

        let depth_pusher = tokio::spawn(depth_pusher_loop(
            writer.clone(),
            Arc::clone(&self.pairs),
            Arc::clone(&self.oracle),
            self.hub.chain_id,
            sequence,
            runtime_cfg.depth_push_interval_ms,
            self.metrics.clone(),
            stop_tx.subscribe(),
            stop_tx.clone(),
        ));

        let keepalive = tokio::spawn(keepalive_loop(
            writer.clone(),
            runtime_cfg.heartbeat_interval_ms,
            self.metrics.clone(),
            stop_tx.subscribe(),
            stop_tx.clone(),
        ));

        let _ = tokio::join!(reader, depth_pusher, keepalive);
        drop(writer);
        let _ = writer_task.await;

        // `top` fans out from the same global shutdown sender the internal
        // forwarder relays into `stop_tx`: if a stop message reached it,
        // every activity stopped because of an explicit Stop(), not a
        // fatal error — the Supervisor should not reconnect.
        match top.try_recv() {
            Ok(()) | Err(broadcast::error::TryRecvError::Closed) => {
                info!("session CLOSED (stop requested)");
                Ok(())
            }
            Err(_) => {
                warn!("session CLOSED (fatal)");
                Err(SessionError::Send(
                    "session terminated by a fatal transport or send error".into(),
                ))
            }
        }
    }

    fn authenticate(
        &self,
        frame: Option<Result<Message, tokio_tungstenite::tungstenite::Error>>,
    ) -> Result<RuntimeConfig, SessionError> {
        let text = match frame {
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(_)) => {
                return Err(SessionError::Auth("expected auth_response as the first frame".into()))
            }
            Some(Err(e)) => return Err(SessionError::Transport(e)),
            None => return Err(SessionError::Auth("transport closed before authentication".into())),
        };

        match message::parse_inbound(&text) {
            Ok(Inbound::AuthResponse(resp)) if resp.success => Ok(RuntimeConfig::from_wire(resp.config)),
            Ok(Inbound::AuthResponse(resp)) => Err(SessionError::Auth(
                resp.error_message.unwrap_or_else(|| "auth_response.success=false".into()),
            )),
            Ok(_) => Err(SessionError::Auth("expected auth_response as the first frame".into())),
            Err(e) => Err(SessionError::Auth(format!("malformed auth_response: {e}"))),
        }
    }
}

/// Any send failure on the shared transport is treated as transport-fatal
/// (§7): the writer task is already dead or dying, so every subsequent
/// `send_json` from any activity would fail silently forever unless
/// someone pushes the session to CLOSING.
async fn reject(
    writer: &Writer,
    quote_id: &str,
    reason: RejectReason,
    message_text: &str,
    metrics: &SessionMetrics,
    stop_tx: &broadcast::Sender<()>,
) {
    SessionMetrics::incr(&metrics.quotes_rejected);
    let frame = message::quote_reject_frame(quote_id, reason, message_text);
    if let Err(e) = writer.send_json(&frame).await {
        warn!(error = %e, "failed to send quote_reject, tearing down session");
        let _ = stop_tx.send(());
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_quote_request(
    writer: &Writer,
    pairs: &[TradingPair],
    oracle: &dyn PriceOracle,
    signer: &QuoteSigner,
    chain_id: u64,
    manager: Address,
    request: QuoteRequest,
    metrics: &SessionMetrics,
    stop_tx: &broadcast::Sender<()>,
) {
    SessionMetrics::incr(&metrics.quotes_requested);

    if request.deadline < now_unix_seconds() {
        reject(writer, &request.quote_id, RejectReason::InternalError, "deadline already passed", metrics, stop_tx).await;
        return;
    }

    let pair = match pricing::find_pair(pairs, chain_id, request.token_in, request.token_out) {
        Some(pair) => pair,
        None => {
            reject(writer, &request.quote_id, RejectReason::UnsupportedPair, "no configured pair for this route", metrics, stop_tx).await;
            return;
        }
    };

    let amount_out = match pricing::quote(&request, pair, oracle) {
        Ok(amount_out) => amount_out,
        Err(reason) => {
            reject(writer, &request.quote_id, reason, "quote rejected", metrics, stop_tx).await;
            return;
        }
    };

    let mm_quote = MMQuote {
        manager,
        from: request.recipient,
        to: request.recipient,
        input_token: request.token_in,
        output_token: request.token_out,
        amount_in: request.amount_in,
        amount_out,
        deadline: request.deadline,
        nonce: request.nonce,
    };

    match signer.sign(&mm_quote).await {
        Ok(signed) => {
            let frame = message::quote_response_frame(&request.quote_id, &signed);
            if let Err(e) = writer.send_json(&frame).await {
                warn!(error = %e, "failed to send quote_response, tearing down session");
                let _ = stop_tx.send(());
            } else {
                SessionMetrics::incr(&metrics.quotes_signed);
            }
        }
        Err(e) => {
            warn!(error = %e, "signing failed");
            reject(writer, &request.quote_id, RejectReason::InternalError, "signing failed", metrics, stop_tx).await;
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn reader_loop<S>(
    mut read: S,
    writer: Writer,
    pairs: Arc<Vec<TradingPair>>,
    oracle: Arc<dyn PriceOracle>,
    signer: Arc<QuoteSigner>,
    chain_id: u64,
    manager: Address,
    metrics: SessionMetrics,
    quote_timeout_ms: u64,
    mut stop: broadcast::Receiver<()>,
    stop_tx: broadcast::Sender<()>,
) where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let frame = tokio::select! {
            frame = read.next() => frame,
            _ = stop.recv() => {
                info!("reader stopping");
                return;
            }
        };

        match frame {
            Some(Ok(Message::Text(text))) => match message::parse_inbound(&text) {
                Ok(Inbound::QuoteRequest(request)) => {
                    let quote_id = request.quote_id.clone();
                    let budget = std::time::Duration::from_millis(quote_timeout_ms);
                    if tokio::time::timeout(
                        budget,
                        handle_quote_request(&writer, &pairs, oracle.as_ref(), &signer, chain_id, manager, request, &metrics, &stop_tx),
                    )
                    .await
                    .is_err()
                    {
                        warn!(quote_id = %quote_id, quote_timeout_ms, "quote response budget exceeded");
                        reject(&writer, &quote_id, RejectReason::InternalError, "quote response budget exceeded", &metrics, &stop_tx).await;
                    }
                }
                Ok(Inbound::HeartbeatPing) => {
                    SessionMetrics::incr(&metrics.heartbeats_sent);
                    if let Err(e) = writer.send_json(&message::heartbeat_pong_frame(now_ms())).await {
                        warn!(error = %e, "failed to send heartbeat pong, tearing down session");
                        let _ = stop_tx.send(());
                    }
                }
                Ok(Inbound::HeartbeatPong) => {}
                Ok(Inbound::Error(reason)) => warn!(?reason, "hub reported an error"),
                Ok(Inbound::AuthResponse(_)) => debug!("ignoring unexpected post-handshake auth_response"),
                Ok(Inbound::Unknown(msg_type)) => debug!(msg_type = %msg_type, "ignoring unknown frame type"),
                Err(e) => {
                    SessionMetrics::incr(&metrics.inbound_parse_errors);
                    warn!(error = %e, "failed to parse inbound frame");
                }
            },
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => {}
            Some(Ok(Message::Close(_))) => {
                warn!("hub closed the transport");
                let _ = stop_tx.send(());
                return;
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                warn!(error = %e, "transport read error");
                let _ = stop_tx.send(());
                return;
            }
            None => {
                warn!("transport stream ended");
                let _ = stop_tx.send(());
                return;
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn depth_pusher_loop(
    writer: Writer,
    pairs: Arc<Vec<TradingPair>>,
    oracle: Arc<dyn PriceOracle>,
    _chain_id: u64,
    sequence: Arc<AtomicU64>,
    interval_ms: u64,
    metrics: SessionMetrics,
    mut stop: broadcast::Receiver<()>,
    stop_tx: broadcast::Sender<()>,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                for pair in pairs.iter() {
                    let mid_price = oracle
                        .mid_price(pair.base_token, pair.quote_token)
                        .unwrap_or(rust_decimal::Decimal::ONE);
                    let seq = sequence.fetch_add(1, Ordering::Relaxed);
                    let snapshot = crate::depth_builder::build_depth(pair, mid_price, seq, now_ms());
                    let frame = message::depth_update_frame(&snapshot);
                    if let Err(e) = writer.send_json(&frame).await {
                        warn!(error = %e, "failed to send depth_update, tearing down session");
                        let _ = stop_tx.send(());
                        return;
                    }
                    SessionMetrics::incr(&metrics.depth_pushed);
                }
            }
            _ = stop.recv() => {
                info!("depth pusher stopping");
                return;
            }
        }
    }
}

async fn keepalive_loop(
    writer: Writer,
    interval_ms: u64,
    metrics: SessionMetrics,
    mut stop: broadcast::Receiver<()>,
    stop_tx: broadcast::Sender<()>,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_millis(interval_ms));
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = writer.send_json(&message::heartbeat_ping_frame(now_ms())).await {
                    warn!(error = %e, "failed to send heartbeat ping, tearing down session");
                    let _ = stop_tx.send(());
                    return;
                }
                SessionMetrics::incr(&metrics.heartbeats_sent);
            }
            _ = stop.recv() => {
                info!("keepalive stopping");
                return;
            }
        }
    }
}
