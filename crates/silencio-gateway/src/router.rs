use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{AppState, ask_handler, health_handler};
use crate::limiter::{QuestionLimiter, Verdict};

/// Request limits applied to `POST /ask`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AskLimits {
    pub questions_per_minute: u32,
    pub max_body_size: usize,
}

/// `/health` is never budgeted; `/ask` is budgeted per client and size-capped.
pub(crate) fn build_router(state: AppState, limits: AskLimits) -> Router {
    let limiter = Arc::new(QuestionLimiter::new(limits.questions_per_minute));

    let ask = Router::new()
        .route("/ask", post(ask_handler))
        .layer(middleware::from_fn_with_state(limiter, budget_questions))
        .layer(RequestBodyLimitLayer::new(limits.max_body_size));

    Router::new()
        .route("/health", get(health_handler))
        .merge(ask)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Peer address, or `0.0.0.0` when the router runs without connect info.
fn client_ip(req: &Request<Body>) -> IpAddr {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED), |info| info.0.ip())
}

async fn budget_questions(
    State(limiter): State<Arc<QuestionLimiter>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let client = client_ip(&req);
    match limiter.check(client, Instant::now()) {
        Verdict::Allowed => next.run(req).await,
        Verdict::Exhausted { retry_after } => {
            let retry_after_secs = retry_after.as_secs().max(1);
            tracing::warn!(%client, retry_after_secs, "question budget exhausted");
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                Json(serde_json::json!({
                    "error": "too many questions",
                    "retry_after_secs": retry_after_secs,
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex as StdMutex;

    use http_body_util::BodyExt;
    use tower::{Service, ServiceExt};

    use super::*;
    use crate::handler::{AskReply, QuestionHandler, SourceRef};

    /// Echoes the question back and records each `top_k` it receives.
    #[derive(Default)]
    pub(crate) struct StubHandler {
        pub top_ks: StdMutex<Vec<Option<usize>>>,
    }

    impl QuestionHandler for StubHandler {
        fn ask<'a>(
            &'a self,
            question: &'a str,
            top_k: Option<usize>,
        ) -> Pin<Box<dyn Future<Output = AskReply> + Send + 'a>> {
            self.top_ks.lock().unwrap().push(top_k);
            Box::pin(async move {
                AskReply {
                    answer: format!("echo: {question}"),
                    outcome: "answered".into(),
                    sources: vec![SourceRef {
                        id: "mulholland_veri.txt::chunk_1".into(),
                        score: 0.9,
                        chunk_index: 1,
                    }],
                }
            })
        }

        fn records(&self) -> usize {
            3
        }
    }

    fn make_router(questions_per_minute: u32, max_body_size: usize) -> (Router, Arc<StubHandler>) {
        let handler = Arc::new(StubHandler::default());
        let state = AppState::new(handler.clone());
        let limits = AskLimits {
            questions_per_minute,
            max_body_size,
        };
        (build_router(state, limits), handler)
    }

    fn ask_request(body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap()
    }

    fn health_request() -> Request<Body> {
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap()
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (app, _) = make_router(0, 65_536);
        let resp = app.oneshot(health_request()).await.unwrap();
        assert_eq!(resp.status(), 200);
        let json = json_body(resp).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["records"], 3);
    }

    #[tokio::test]
    async fn ask_returns_answer_and_sources() {
        let (app, handler) = make_router(0, 65_536);
        let body = serde_json::json!({"question": "Who is Rita?", "top_k": 2});
        let resp = app.oneshot(ask_request(&body)).await.unwrap();
        assert_eq!(resp.status(), 200);

        let json = json_body(resp).await;
        assert_eq!(json["answer"], "echo: Who is Rita?");
        assert_eq!(json["outcome"], "answered");
        assert_eq!(json["sources"][0]["id"], "mulholland_veri.txt::chunk_1");
        assert_eq!(json["sources"][0]["chunk_index"], 1);
        assert_eq!(*handler.top_ks.lock().unwrap(), vec![Some(2)]);
    }

    #[tokio::test]
    async fn ask_caps_top_k() {
        let (app, handler) = make_router(0, 65_536);
        let body = serde_json::json!({"question": "q", "top_k": 10_000});
        let resp = app.oneshot(ask_request(&body)).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert_eq!(
            *handler.top_ks.lock().unwrap(),
            vec![Some(crate::handlers::MAX_TOP_K)]
        );
    }

    #[tokio::test]
    async fn ask_rejects_missing_question() {
        let (app, handler) = make_router(0, 65_536);
        let body = serde_json::json!({"top_k": 2});
        let resp = app.oneshot(ask_request(&body)).await.unwrap();
        assert!(resp.status().is_client_error());
        assert!(handler.top_ks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn authorization_header_is_ignored() {
        let (app, _) = make_router(0, 65_536);
        let mut req = ask_request(&serde_json::json!({"question": "q"}));
        req.headers_mut()
            .insert(header::AUTHORIZATION, "Bearer anything".parse().unwrap());
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn exhausted_budget_returns_retry_after() {
        let (mut app, handler) = make_router(2, 65_536);
        let body = serde_json::json!({"question": "q"});

        for _ in 0..2 {
            let resp = app.call(ask_request(&body)).await.unwrap();
            assert_eq!(resp.status(), 200);
        }
        let resp = app.call(ask_request(&body)).await.unwrap();
        assert_eq!(resp.status(), 429);
        let retry_after: u64 = resp.headers()[header::RETRY_AFTER]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!((1..=60).contains(&retry_after));
        let json = json_body(resp).await;
        assert_eq!(json["retry_after_secs"], retry_after);
        assert_eq!(handler.top_ks.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn health_not_counted_against_budget() {
        let (mut app, _) = make_router(1, 65_536);
        for _ in 0..3 {
            let resp = app.call(health_request()).await.unwrap();
            assert_eq!(resp.status(), 200);
        }
        let body = serde_json::json!({"question": "q"});
        let resp = app.call(ask_request(&body)).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let (app, handler) = make_router(0, 64);
        let req = Request::builder()
            .method("POST")
            .uri("/ask")
            .header("content-type", "application/json")
            .body(Body::from(vec![b'a'; 128]))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), 413);
        assert!(handler.top_ks.lock().unwrap().is_empty());
    }
}
