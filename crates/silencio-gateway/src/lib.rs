//! HTTP front for the question answerer: `POST /ask` with a per-client
//! question budget, and `GET /health`.

mod error;
mod handler;
mod handlers;
mod limiter;
mod router;
mod server;

pub use error::GatewayError;
pub use handler::{AskReply, QuestionHandler, SourceRef};
pub use server::{BoundGateway, GatewayServer};
