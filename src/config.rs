use serde::{Deserialize, Serialize};

use crate::models::pair::TradingPair;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hub: HubConfig,
    pub signer: SignerConfig,
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub pairs: Vec<TradingPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    pub ws_url: String,
    pub mm_id: String,
    pub auth_token: String,
    pub chain_id: u64,
    pub depth_push_interval_ms: u64,
    pub heartbeat_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerConfig {
    pub private_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            ws_url: "wss://rfq.darkpool.example/ws".into(),
            mm_id: String::new(),
            auth_token: String::new(),
            chain_id: 56,
            depth_push_interval_ms: 1_000,
            heartbeat_interval_ms: 15_000,
        }
    }
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            private_key: String::new(),
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hub: HubConfig::default(),
            signer: SignerConfig::default(),
            telemetry: TelemetryConfig::default(),
            pairs: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables (`.env` if present),
    /// then layer in the pairs registry from a TOML file.
    ///
    /// Env vars:
    ///   DARKPOOL_WS_URL        — hub websocket endpoint
    ///   DARKPOOL_MM_ID         — this market-maker's registered id
    ///   DARKPOOL_AUTH_TOKEN    — bearer token for the auth handshake
    ///   DARKPOOL_CHAIN_ID      — chain id for signing (default 56)
    ///   DARKPOOL_PRIVATE_KEY   — hex secp256k1 key for signing quotes
    ///   DARKPOOL_PAIRS_FILE    — path to the TOML pairs registry (default pairs.toml)
    ///   RUST_LOG               — log level (default info)
    ///   DRY_RUN                — "true"/"1" to sign with a random key
    pub fn load_or_default() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let mut config = Self::default();

        if let Ok(url) = std::env::var("DARKPOOL_WS_URL") {
            if !url.is_empty() {
                config.hub.ws_url = url;
            }
        }
        if let Ok(mm_id) = std::env::var("DARKPOOL_MM_ID") {
            config.hub.mm_id = mm_id;
        }
        if let Ok(token) = std::env::var("DARKPOOL_AUTH_TOKEN") {
            config.hub.auth_token = token;
        }
        if let Ok(chain_id) = std::env::var("DARKPOOL_CHAIN_ID") {
            config.hub.chain_id = chain_id.parse().unwrap_or(config.hub.chain_id);
        }
        if let Ok(key) = std::env::var("DARKPOOL_PRIVATE_KEY") {
            config.signer.private_key = key;
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.telemetry.log_level = level;
        }

        let pairs_path =
            std::env::var("DARKPOOL_PAIRS_FILE").unwrap_or_else(|_| "pairs.toml".to_string());
        if let Ok(raw) = std::fs::read_to_string(&pairs_path) {
            let file: PairsFile = toml::from_str(&raw)?;
            config.pairs = file.pairs;
        } else {
            tracing::warn!(path = %pairs_path, "no pairs file found, starting with an empty registry");
        }

        if config.signer.private_key.is_empty() && !Self::is_dry_run_env() {
            tracing::warn!("no DARKPOOL_PRIVATE_KEY set — entering DRY RUN mode");
            tracing::warn!("quotes will be signed with a random key and will not verify on-chain");
        }

        Ok(config)
    }

    fn is_dry_run_env() -> bool {
        std::env::var("DRY_RUN")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false)
    }

    pub fn is_dry_run(&self) -> bool {
        self.signer.private_key.is_empty() || Self::is_dry_run_env()
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.hub.ws_url.is_empty(), "hub.ws_url must be set");
        anyhow::ensure!(!self.hub.mm_id.is_empty(), "hub.mm_id must be set");
        if self.is_dry_run() {
            tracing::info!("dry-run mode — skipping private key validation");
        } else {
            anyhow::ensure!(
                !self.signer.private_key.is_empty(),
                "DARKPOOL_PRIVATE_KEY must be set (or set DRY_RUN=true)"
            );
        }
        anyhow::ensure!(!self.pairs.is_empty(), "at least one trading pair must be configured");
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PairsFile {
    #[serde(default)]
    pairs: Vec<TradingPair>,
}
