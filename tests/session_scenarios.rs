//! End-to-end scenarios against an in-process mock hub. The session engine
//! dials a loopback `TcpListener` standing in for the real RFQ hub, so these
//! exercise the full connect -> authenticate -> LIVE lifecycle — including
//! real JSON frames over a real (if local) WebSocket — without any network
//! dependency beyond loopback.

use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use alloy_primitives::Address;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

use darkpool_mm::config::HubConfig;
use darkpool_mm::constants;
use darkpool_mm::models::pair::TradingPair;
use darkpool_mm::oracle::StaticOracle;
use darkpool_mm::session::Session;
use darkpool_mm::signing::QuoteSigner;
use darkpool_mm::telemetry::metrics::SessionMetrics;

const AUTH_TOKEN: &str = "test-bearer-token";

fn wbnb() -> Address {
    Address::from_str("0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c").unwrap()
}

fn usdt() -> Address {
    Address::from_str("0x55d398326f99059fF775485246999027B3197955").unwrap()
}

fn recipient() -> Address {
    Address::from_str("0x1234567890123456789012345678901234567890").unwrap()
}

fn sample_pair() -> TradingPair {
    TradingPair {
        chain_id: 56,
        base_token: wbnb(),
        quote_token: usdt(),
        bid_spread_bps: 30,
        ask_spread_bps: 30,
        order_amount: rust_decimal::Decimal::ONE,
        min_order_size: rust_decimal::Decimal::new(1, 2),
        max_order_size: rust_decimal::Decimal::new(1000, 0),
        levels: vec![],
        price: rust_decimal::Decimal::ONE,
    }
}

fn second_pair() -> TradingPair {
    TradingPair {
        chain_id: 56,
        base_token: Address::from_str("0x1111111111111111111111111111111111111111").unwrap(),
        quote_token: Address::from_str("0x2222222222222222222222222222222222222222").unwrap(),
        bid_spread_bps: 30,
        ask_spread_bps: 30,
        order_amount: rust_decimal::Decimal::ONE,
        min_order_size: rust_decimal::Decimal::new(1, 2),
        max_order_size: rust_decimal::Decimal::new(1000, 0),
        levels: vec![],
        price: rust_decimal::Decimal::ONE,
    }
}

fn hub_config(ws_url: String, depth_ms: u64, heartbeat_ms: u64) -> HubConfig {
    HubConfig {
        ws_url,
        mm_id: "mm-a".into(),
        auth_token: AUTH_TOKEN.into(),
        chain_id: 56,
        depth_push_interval_ms: depth_ms,
        heartbeat_interval_ms: heartbeat_ms,
    }
}

async fn bind_loopback() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, format!("ws://127.0.0.1:{port}/ws"))
}

fn auth_response_frame(depth_push_interval_ms: u64, heartbeat_interval_ms: u64) -> Value {
    json!({
        "type": "auth_response",
        "success": true,
        "session_id": "sess-test",
        "config": {
            "depth_push_interval_ms": depth_push_interval_ms,
            "quote_timeout_ms": 5_000,
            "heartbeat_interval_ms": heartbeat_interval_ms,
        }
    })
}

fn quote_request_frame(quote_id: &str, token_in: Address, token_out: Address, amount_in: &str) -> Value {
    json!({
        "type": "quote_request",
        "quote_id": quote_id,
        "chain_id": 56,
        "mm_id": "mm-a",
        "token_in": format!("{:#x}", token_in),
        "token_out": format!("{:#x}", token_out),
        "amount_in": amount_in,
        "recipient": format!("{:#x}", recipient()),
        "nonce": "1",
        "deadline": 9_999_999_999u64,
        "slippage_bps": 50,
    })
}

/// Reads frames from the mock side of the socket until `pred` matches one,
/// skipping anything else (depth/heartbeat noise the engine sends
/// unprompted). Fails the test instead of hanging forever if the expected
/// frame never shows up.
async fn recv_until<S>(read: &mut S, pred: impl Fn(&Value) -> bool, max_frames: usize) -> Value
where
    S: futures_util::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    for _ in 0..max_frames {
        match tokio::time::timeout(Duration::from_secs(5), read.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                let value: Value = serde_json::from_str(&text).unwrap();
                if pred(&value) {
                    return value;
                }
            }
            Ok(Some(Ok(_))) => continue,
            Ok(Some(Err(e))) => panic!("transport error waiting for frame: {e}"),
            Ok(None) => panic!("hub socket closed before the expected frame arrived"),
            Err(_) => panic!("timed out waiting for the expected frame"),
        }
    }
    panic!("gave up after {max_frames} frames without a match");
}

/// Runs a `Session` against a mock hub handler. `handler` drives the mock
/// side of the socket after the WebSocket handshake completes; the session
/// itself runs on a background task until the test sends shutdown.
async fn run_scenario<F, Fut>(pairs: Vec<TradingPair>, depth_ms: u64, heartbeat_ms: u64, oracle: StaticOracle, handler: F)
where
    F: FnOnce(
        futures_util::stream::SplitSink<
            tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>,
            Message,
        >,
        futures_util::stream::SplitStream<tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>>,
    ) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let (listener, ws_url) = bind_loopback().await;
    let manager = constants::rfq_manager(56).unwrap();
    let signer = std::sync::Arc::new(QuoteSigner::new(56, ""));
    let oracle = std::sync::Arc::new(oracle);

    let session = Session::new(
        hub_config(ws_url, depth_ms, heartbeat_ms),
        manager,
        pairs,
        oracle,
        signer,
        SessionMetrics::new(),
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutdown_tx_run = shutdown_tx.clone();
    let session_task = tokio::spawn(async move {
        let reached_live = AtomicBool::new(false);
        session.run_once(&shutdown_tx_run, &reached_live).await
    });

    let (stream, _) = listener.accept().await.unwrap();
    let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
    let (write, read) = ws.split();

    handler(write, read).await;

    let _ = shutdown_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(5), session_task)
        .await
        .expect("session did not stop within the shutdown grace period")
        .unwrap();
    assert!(result.is_ok(), "session ended with a fatal error: {result:?}");
}

#[tokio::test]
async fn handshake_carries_the_bearer_token() {
    let (listener, ws_url) = bind_loopback().await;
    let pair = sample_pair();
    let manager = constants::rfq_manager(56).unwrap();
    let signer = std::sync::Arc::new(QuoteSigner::new(56, ""));
    let oracle = std::sync::Arc::new(StaticOracle::new());

    let session = Session::new(
        hub_config(ws_url, 60_000, 60_000),
        manager,
        vec![pair],
        oracle,
        signer,
        SessionMetrics::new(),
    );

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let shutdown_tx_run = shutdown_tx.clone();
    let session_task = tokio::spawn(async move {
        let reached_live = AtomicBool::new(false);
        session.run_once(&shutdown_tx_run, &reached_live).await
    });

    let (stream, _) = listener.accept().await.unwrap();
    let captured = std::sync::Arc::new(std::sync::Mutex::new(None));
    let captured_cb = std::sync::Arc::clone(&captured);
    let callback = move |req: &Request, response: Response| -> Result<Response, ErrorResponse> {
        let header = req
            .headers()
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        *captured_cb.lock().unwrap() = header;
        Ok(response)
    };
    let ws = tokio_tungstenite::accept_hdr_async(stream, callback).await.unwrap();
    assert_eq!(captured.lock().unwrap().as_deref(), Some("Bearer test-bearer-token"));

    let (mut write, _read) = ws.split();
    write
        .send(Message::Text(auth_response_frame(60_000, 60_000).to_string()))
        .await
        .unwrap();

    let _ = shutdown_tx.send(());
    let result = tokio::time::timeout(Duration::from_secs(5), session_task).await.unwrap().unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn s1_happy_quote_is_signed_and_returned() {
    let pair = sample_pair();
    let oracle = StaticOracle::with_prices([(pair.base_token, pair.quote_token, rust_decimal::Decimal::from(2u32))]);

    run_scenario(vec![pair], 60_000, 60_000, oracle, |mut write, mut read| async move {
        write
            .send(Message::Text(auth_response_frame(60_000, 60_000).to_string()))
            .await
            .unwrap();

        let one_token = "1000000000000000000";
        write
            .send(Message::Text(
                quote_request_frame("q-1", wbnb(), usdt(), one_token).to_string(),
            ))
            .await
            .unwrap();

        let response = recv_until(&mut read, |v| v["type"] == "quote_response", 10).await;
        assert_eq!(response["quote_id"], "q-1");
        assert_eq!(response["status"], "QUOTE_STATUS_SUCCESS");
        // amountIn=1e18, mid=2.0, spread=30bps -> 1e18 * 2 * 0.997
        assert_eq!(response["order"]["amount_out"], "1994000000000000000");

        let signature = response["order"]["signature"].as_str().unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 65 * 2);
        let v_hex = &signature[signature.len() - 2..];
        let v = u8::from_str_radix(v_hex, 16).unwrap();
        assert!(v == 27 || v == 28);
    })
    .await;
}

#[tokio::test]
async fn s2_amount_out_of_range_rejects_with_insufficient_liquidity() {
    let pair = sample_pair();
    let oracle = StaticOracle::new();

    run_scenario(vec![pair], 60_000, 60_000, oracle, |mut write, mut read| async move {
        write
            .send(Message::Text(auth_response_frame(60_000, 60_000).to_string()))
            .await
            .unwrap();

        // 2000 tokens, above the configured 1000-token max.
        let too_big = "2000000000000000000000";
        write
            .send(Message::Text(
                quote_request_frame("q-2", wbnb(), usdt(), too_big).to_string(),
            ))
            .await
            .unwrap();

        let response = recv_until(&mut read, |v| v["type"] == "quote_reject", 10).await;
        assert_eq!(response["quote_id"], "q-2");
        assert_eq!(response["reason"], "REJECT_REASON_INSUFFICIENT_LIQUIDITY");
    })
    .await;
}

#[tokio::test]
async fn s3_unknown_route_rejects_with_unsupported_pair() {
    let pair = sample_pair();
    let oracle = StaticOracle::new();
    let unknown_a = Address::from_str("0x3333333333333333333333333333333333333333").unwrap();
    let unknown_b = Address::from_str("0x4444444444444444444444444444444444444444").unwrap();

    run_scenario(vec![pair], 60_000, 60_000, oracle, |mut write, mut read| async move {
        write
            .send(Message::Text(auth_response_frame(60_000, 60_000).to_string()))
            .await
            .unwrap();

        write
            .send(Message::Text(
                quote_request_frame("q-3", unknown_a, unknown_b, "1000000000000000000").to_string(),
            ))
            .await
            .unwrap();

        let response = recv_until(&mut read, |v| v["type"] == "quote_reject", 10).await;
        assert_eq!(response["quote_id"], "q-3");
        assert_eq!(response["reason"], "REJECT_REASON_UNSUPPORTED_PAIR");
    })
    .await;
}

#[tokio::test]
async fn s4_heartbeat_ping_is_echoed_with_pong() {
    let pair = sample_pair();
    let oracle = StaticOracle::new();

    run_scenario(vec![pair], 60_000, 60_000, oracle, |mut write, mut read| async move {
        write
            .send(Message::Text(auth_response_frame(60_000, 60_000).to_string()))
            .await
            .unwrap();

        write
            .send(Message::Text(json!({"type": "heartbeat", "heartbeat": {"ping": true}, "timestamp": 0}).to_string()))
            .await
            .unwrap();

        let pong = recv_until(
            &mut read,
            |v| v["type"] == "heartbeat" && v["heartbeat"]["pong"] == true,
            10,
        )
        .await;
        assert_eq!(pong["heartbeat"]["pong"], true);
    })
    .await;
}

#[tokio::test]
async fn s6_depth_pushes_are_monotone_and_alternate_pairs() {
    let pair_a = sample_pair();
    let pair_b = second_pair();
    let oracle = StaticOracle::new();

    run_scenario(vec![pair_a.clone(), pair_b.clone()], 50, 60_000, oracle, |mut write, mut read| async move {
        write
            .send(Message::Text(auth_response_frame(50, 60_000).to_string()))
            .await
            .unwrap();

        let mut frames = Vec::new();
        for _ in 0..4 {
            let frame = recv_until(&mut read, |v| v["type"] == "depth_update", 10).await;
            frames.push(frame);
        }

        let sequences: Vec<u64> = frames.iter().map(|f| f["sequence_id"].as_u64().unwrap()).collect();
        assert_eq!(sequences, vec![0, 1, 2, 3], "sequence_id must be strictly monotone across pairs");

        let pair_ids: Vec<String> = frames
            .iter()
            .map(|f| f["pair_id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            pair_ids,
            vec![
                pair_a.pair_id(),
                pair_b.pair_id(),
                pair_a.pair_id(),
                pair_b.pair_id(),
            ],
            "pairs must be pushed in registration order on every tick"
        );
    })
    .await;
}
