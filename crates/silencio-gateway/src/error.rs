use std::net::AddrParseError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid gateway address {addr}: {source}")]
    InvalidAddr {
        addr: String,
        source: AddrParseError,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("gateway stopped: {0}")]
    Serve(#[source] std::io::Error),
}
