use crate::config::Config;
use crate::error::ChainError;
use crate::ledger::Ledger;
use std::sync::Arc;
use tokio::sync::RwLock;
use std::future::Future;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Booting,
    Ready,
    ShuttingDown,
}

/// Process-level owner of the ledger and its lifecycle state.
pub struct Node {
    pub config: Config,
    pub ledger: Ledger,
    pub state: Arc<RwLock<NodeState>>,
}

impl Node {
    /// Validate the config and seed the ledger with a fresh genesis block.
    pub fn init(config: Config) -> Result<Self, ChainError> {
        config.validate()?;

        let ledger = Ledger::with_genesis()?;
        info!(
            host = %config.server.host,
            port = config.server.port,
            "Initialized ledger with genesis block"
        );

        Ok(Self {
            config,
            ledger,
            state: Arc::new(RwLock::new(NodeState::Booting)),
        })
    }

    pub async fn current_state(&self) -> NodeState {
        *self.state.read().await
    }

    pub async fn set_state(&self, state: NodeState) {
        *self.state.write().await = state;
    }

    /// Bind the API listener, mark the node ready and serve until ctrl-c.
    #[cfg(feature = "api")]
    pub async fn start(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        let host = self.config.server.host.as_str();
        let port = self.config.server.port;
        let listener = tokio::net::TcpListener::bind((host, port))
            .await
            .map_err(|e| format!("API address {}:{} unavailable: {}", host, port, e))?;
        let addr = listener.local_addr()?;

        let api_node = Arc::new(crate::api::ApiNode::new(
            self.ledger.clone(),
            Some(self.state.clone()),
        ));
        let app = crate::api::build_api_router(api_node, self.config.request_timeout());

        self.set_state(NodeState::Ready).await;
        info!(
            "Listening on http://{} (chain height = {})",
            addr,
            self.ledger.height().await
        );

        let state = self.state.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_shutdown(tokio::signal::ctrl_c(), state))
            .await?;

        Ok(())
    }

    #[cfg(not(feature = "api"))]
    pub async fn start(self: Arc<Self>) -> Result<(), Box<dyn std::error::Error>> {
        Err("API feature not enabled in this build".into())
    }
}

/// Resolve once `signal` fires, marking the node as shutting down.
///
/// If the signal cannot be installed this never resolves, so the server keeps
/// running instead of stopping on the error.
#[cfg_attr(not(feature = "api"), allow(dead_code))]
async fn wait_for_shutdown<F>(signal: F, state: Arc<RwLock<NodeState>>)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for ctrl-c, serving without graceful shutdown: {}", e);
        std::future::pending::<()>().await;
    }
    *state.write().await = NodeState::ShuttingDown;
    info!("Shutdown signal received");
}
