//! Server startup and binding
//!
//! Wires upstream clients, orchestrators and the pricing boundary into an
//! [`AppState`] and serves the router with graceful shutdown.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::feeds::{CsvWarehouse, FredClient, YahooOptionsClient};
use crate::pricing::{DisabledPricingProvider, HttpPricingProvider, PricingProvider, PricingService};
use crate::routes::{self, AppState};
use crate::services::MarketDataService;

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a server backed by the configured upstream sources
    pub fn new(config: ServerConfig) -> Self {
        let upstream_timeout = Duration::from_secs(config.upstream_timeout_secs);

        let rates = FredClient::new(
            config.fred_base_url.clone(),
            config.fred_api_key.clone(),
            upstream_timeout,
        );
        let options = YahooOptionsClient::new(config.yahoo_base_url.clone(), upstream_timeout);
        let prices = match &config.history_csv {
            Some(path) => CsvWarehouse::new(path.clone()),
            None => CsvWarehouse::unconfigured(),
        };
        let market = MarketDataService::new(Arc::new(prices), Arc::new(rates), Arc::new(options));

        let pricing_timeout = Duration::from_secs(config.pricing_timeout_secs);
        let provider: Arc<dyn PricingProvider> = match &config.pricing_engine_url {
            Some(url) => Arc::new(HttpPricingProvider::new(url.clone(), pricing_timeout)),
            None => Arc::new(DisabledPricingProvider),
        };
        let pricing = PricingService::new(provider, pricing_timeout);

        Self::with_state(AppState::new(Arc::new(config), Arc::new(market), pricing))
    }

    /// Create a server around prepared state
    pub fn with_state(state: AppState) -> Self {
        let config = state.config.clone();
        let router = routes::build_router(state);

        Self { config, router }
    }

    /// The `host:port` the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Bind to the configured host/port and serve until Ctrl-C.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Serve on an already bound listener
    ///
    /// Binding to port 0 gives tests a random free port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server listening on {}", addr);

        let drain = Duration::from_secs(self.config.shutdown_timeout_secs);
        let (stopped_tx, stopped_rx) = tokio::sync::oneshot::channel::<()>();
        let serve = axum::serve(listener, self.router).with_graceful_shutdown(async move {
            shutdown_signal().await;
            stopped_tx.send(()).ok();
        })
        .into_future();

        tokio::select! {
            result = serve => result,
            _ = drain_deadline(stopped_rx, drain) => {
                tracing::warn!(timeout_secs = drain.as_secs(), "shutdown timeout reached, dropping connections");
                Ok(())
            }
        }
    }

    /// Create a test server on in-memory collaborators and return the bound address
    #[cfg(test)]
    pub async fn spawn_test_server(config: ServerConfig) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::with_state(crate::testing::test_state(config));
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        // Give the server a moment to start
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        (addr, handle)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining connections");
}

/// Resolves `drain` after shutdown starts; never resolves before.
async fn drain_deadline(stopped: tokio::sync::oneshot::Receiver<()>, drain: Duration) {
    if stopped.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(drain).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn test_server_socket_addr() {
        let mut config = ServerConfig::default();
        config.host = "127.0.0.1".to_string();
        config.port = 3000;

        let server = Server::new(config);

        assert_eq!(server.socket_addr(), "127.0.0.1:3000");
    }

    #[test]
    fn test_server_config_access() {
        let mut config = ServerConfig::default();
        config.port = 9999;

        let server = Server::new(config);

        assert_eq!(server.config().port, 9999);
    }

    #[tokio::test]
    async fn test_server_health_endpoint() {
        let config = ServerConfig::default();
        let (addr, handle) = Server::spawn_test_server(config).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["status"], "healthy");

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_ready_endpoint() {
        let config = ServerConfig::default();
        let (addr, handle) = Server::spawn_test_server(config).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/ready", addr))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["ready"], true);

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_market_endpoint_requires_key() {
        let mut config = ServerConfig::default();
        config.api_key_required = true;
        config.api_keys = vec!["secret".to_string()];
        let (addr, handle) = Server::spawn_test_server(config).await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/market/tickers", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = client
            .get(format!("http://{}/market/tickers", addr))
            .header("x-api-key", "secret")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["tickers"], json!(["AAPL", "MSFT"]));

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_pricing_without_engine() {
        let config = ServerConfig::default();
        let (addr, handle) = Server::spawn_test_server(config).await;

        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/price/bond/zero-coupon", addr))
            .json(&json!({"maturity": 2.0, "rate": 0.03}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        handle.abort();
    }

    #[tokio::test]
    async fn test_server_unknown_route_returns_404() {
        let config = ServerConfig::default();
        let (addr, handle) = Server::spawn_test_server(config).await;

        let client = reqwest::Client::new();

        let response = client
            .get(format!("http://{}/unknown/path", addr))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        handle.abort();
    }

    #[tokio::test]
    async fn test_multiple_servers_on_different_ports() {
        let (addr1, handle1) = Server::spawn_test_server(ServerConfig::default()).await;
        let (addr2, handle2) = Server::spawn_test_server(ServerConfig::default()).await;

        assert_ne!(addr1.port(), addr2.port());

        let client = reqwest::Client::new();
        for addr in [addr1, addr2] {
            let response = client
                .get(format!("http://{}/health", addr))
                .send()
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        handle1.abort();
        handle2.abort();
    }
}
