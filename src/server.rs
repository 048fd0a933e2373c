//! `GET /bingo/{slug_or_id}`: live view recomputed per request.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{BingoError, BingoResult};
use crate::live::{BingoLiveData, compute_live_data};
use crate::store::BingoStore;

pub const LIVE_CACHE_CONTROL: &str = "public, max-age=2, stale-while-revalidate=10";

#[derive(Clone)]
struct AppState {
    store: Arc<dyn BingoStore>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: bool,
    message: String,
}

struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<BingoError> for HttpError {
    fn from(err: BingoError) -> Self {
        match err {
            BingoError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            },
            other => {
                error!(error = %other, "failed to compute live bingo data");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "Failed to load bingo".into(),
                }
            }
        }
    }
}

async fn handle_get_bingo(
    State(state): State<AppState>,
    Path(slug_or_id): Path<String>,
) -> Result<Response, HttpError> {
    let store = Arc::clone(&state.store);
    let key = slug_or_id.clone();
    let live: BingoLiveData = tokio::task::spawn_blocking(move || {
        let record = store.find_active(&key)?;
        compute_live_data(&record)
    })
    .await
    .map_err(|e| {
        error!(error = %e, bingo = %slug_or_id, "live bingo task failed");
        HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to load bingo".into(),
        }
    })?
    .inspect_err(|e| {
        if matches!(e, BingoError::NotFound(_)) {
            warn!(bingo = %slug_or_id, "bingo not found");
        }
    })?;

    Ok(([(header::CACHE_CONTROL, LIVE_CACHE_CONTROL)], Json(live)).into_response())
}

pub fn build_router(store: Arc<dyn BingoStore>) -> Router {
    Router::new()
        .route("/bingo/{slug_or_id}", get(handle_get_bingo))
        .with_state(AppState { store })
}

pub async fn serve(store: Arc<dyn BingoStore>, addr: SocketAddr) -> BingoResult<()> {
    let app = build_router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::BingoRecord;
    use crate::store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let records = vec![
            BingoRecord {
                id: "b1".into(),
                slug: Some("spring-fundraiser".into()),
                active: true,
                config: r#"{"numberOfCards": 40, "seed": "event-42"}"#.into(),
                play_data: Some("[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 3]".into()),
            },
            BingoRecord {
                id: "b2".into(),
                slug: Some("broken".into()),
                active: true,
                config: r#"{"numberOfCards": 0}"#.into(),
                play_data: None,
            },
            BingoRecord {
                id: "b3".into(),
                slug: Some("bad-log".into()),
                active: true,
                config: r#"{"numberOfCards": 4}"#.into(),
                play_data: Some("{\"calledValues\": [\"x\"]}".into()),
            },
        ];
        build_router(Arc::new(InMemoryStore::new(records)))
    }

    async fn fetch(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_live_data() {
        let response = fetch(test_app(), "/bingo/spring-fundraiser").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            LIVE_CACHE_CONTROL
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let live: BingoLiveData = serde_json::from_slice(&body).unwrap();
        assert_eq!(live.number_of_cards, 40);
        assert_eq!(live.called_values, (1..=15).collect::<Vec<u32>>());
        // every card has its first column called
        assert_eq!(live.cards_with_bingo, (0..40).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_lookup_by_id() {
        let response = fetch(test_app(), "/bingo/b1").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_bingo_is_404() {
        let response = fetch(test_app(), "/bingo/winter").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_bad_payloads_are_500() {
        for uri in ["/bingo/broken", "/bingo/bad-log"] {
            let response = fetch(test_app(), uri).await;
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], true);
            assert_eq!(json["message"], "Failed to load bingo");
        }
    }
}
