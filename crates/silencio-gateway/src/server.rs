use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::error::GatewayError;
use crate::handler::QuestionHandler;
use crate::handlers::AppState;
use crate::router::{AskLimits, build_router};

/// Builder for the gateway; [`bind`](Self::bind) opens the listener.
pub struct GatewayServer {
    handler: Arc<dyn QuestionHandler>,
    limits: AskLimits,
}

impl GatewayServer {
    #[must_use]
    pub fn new(handler: Arc<dyn QuestionHandler>) -> Self {
        Self {
            handler,
            limits: AskLimits {
                questions_per_minute: 60,
                max_body_size: 65_536,
            },
        }
    }

    /// Questions each client may ask per minute; `0` disables the budget.
    #[must_use]
    pub fn with_rate_limit(mut self, questions_per_minute: u32) -> Self {
        self.limits.questions_per_minute = questions_per_minute;
        self
    }

    #[must_use]
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.limits.max_body_size = size;
        self
    }

    /// Parse `bind:port` and open the listener.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddr`] for an unparseable address and
    /// [`GatewayError::Bind`] when the port cannot be taken.
    pub async fn bind(self, bind: &str, port: u16) -> Result<BoundGateway, GatewayError> {
        let addr = parse_addr(bind, port)?;
        if !addr.ip().is_loopback() {
            tracing::warn!(%addr, "gateway has no authentication and is reachable beyond loopback");
        }

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| GatewayError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let router = build_router(AppState::new(self.handler), self.limits);
        Ok(BoundGateway { listener, router })
    }
}

fn parse_addr(bind: &str, port: u16) -> Result<SocketAddr, GatewayError> {
    let ip = bind
        .trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<std::net::IpAddr>()
        .map_err(|source| GatewayError::InvalidAddr {
            addr: format!("{bind}:{port}"),
            source,
        })?;
    Ok(SocketAddr::new(ip, port))
}

/// A gateway holding its listener, ready to serve.
pub struct BoundGateway {
    listener: TcpListener,
    router: Router,
}

impl BoundGateway {
    /// Address actually bound; differs from the configured one for port `0`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Bind`] if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, GatewayError> {
        self.listener
            .local_addr()
            .map_err(|source| GatewayError::Bind {
                addr: "listener".into(),
                source,
            })
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Serve`] on a fatal I/O error.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "gateway listening");
        }
        axum::serve(
            self.listener,
            self.router
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            shutdown.await;
            tracing::info!("gateway shutting down");
        })
        .await
        .map_err(GatewayError::Serve)
    }
}
