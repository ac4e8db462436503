use std::path::Path;

use axum::{
    body::Bytes,
    extract::{Path as UrlPath, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use connect4::{
    parse_history, Accepted, GameError, Match, MatchConfig, MatchSnapshot, PlayerConfig,
    StartPolicy,
};
use serde::{Deserialize, Serialize};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::store::{lock, MatchStore, StoreFull, UnknownMatch};

#[derive(Clone)]
pub struct AppState {
    pub store: MatchStore,
    pub defaults: MatchConfig,
    pub max_dimension: usize,
}

impl AppState {
    pub fn new(defaults: MatchConfig, max_dimension: usize, max_matches: usize) -> Self {
        Self {
            store: MatchStore::new(max_matches),
            defaults,
            max_dimension,
        }
    }
}

pub fn app_router(state: AppState, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/matches", post(create_match))
        .route("/matches/:id", get(get_match).delete(delete_match))
        .route("/matches/:id/drop", post(drop_piece))
        .route("/matches/:id/reset", post(reset_match))
        .with_state(state);
    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_origin(HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateMatchRequest {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub start: Option<StartPolicy>,
    pub players: Option<[PlayerConfig; 2]>,
    /// Move history replayed onto the new match, e.g. `3,3,4`.
    pub position: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedMatch {
    pub id: u64,
    #[serde(rename = "match")]
    pub game: MatchSnapshot,
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub column: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResetRequest {
    pub players: Option<[PlayerConfig; 2]>,
}

async fn create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = MatchConfig {
        width: req.width.unwrap_or(state.defaults.width),
        height: req.height.unwrap_or(state.defaults.height),
        start: req.start.unwrap_or(state.defaults.start),
    };
    if config.width > state.max_dimension || config.height > state.max_dimension {
        return Err(anyhow::anyhow!(
            "board {}x{} exceeds the maximum dimension {}",
            config.width,
            config.height,
            state.max_dimension
        )
        .into());
    }
    let [first, second] = req.players.unwrap_or_default();
    let mut game = Match::new(config, &first, &second)?;
    if let Some(position) = req.position.as_deref() {
        game.replay(&parse_history(position)?)?;
    }
    let snapshot = game.snapshot();
    let id = state.store.insert(game)?;
    info!(
        id,
        width = config.width,
        height = config.height,
        open = state.store.len(),
        "match created"
    );
    let body = CreatedMatch { id, game: snapshot };
    Ok((StatusCode::CREATED, no_store(), Json(body)))
}

async fn get_match(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let shared = state.store.get(id)?;
    let snapshot = lock(&shared).snapshot();
    Ok((no_store(), Json(snapshot)))
}

async fn drop_piece(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<u64>,
    Json(req): Json<DropRequest>,
) -> Result<Json<Accepted>, ApiError> {
    let shared = state.store.get(id)?;
    let accepted = lock(&shared).drop_piece(req.column)?;
    Ok(Json(accepted))
}

async fn reset_match(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<u64>,
    body: Bytes,
) -> Result<Json<MatchSnapshot>, ApiError> {
    // An empty body keeps the players; anything else must be a valid request.
    let req: ResetRequest = if body.iter().all(u8::is_ascii_whitespace) {
        ResetRequest::default()
    } else {
        serde_json::from_slice(&body)?
    };
    let shared = state.store.get(id)?;
    let mut game = lock(&shared);
    match req.players {
        Some([first, second]) => game.reset_with_players(&first, &second),
        None => game.reset(),
    }
    info!(id, "match reset");
    Ok(Json(game.snapshot()))
}

async fn delete_match(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<u64>,
) -> Result<StatusCode, ApiError> {
    state.store.remove(id)?;
    info!(id, "match deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn no_store() -> [(header::HeaderName, &'static str); 1] {
    [(header::CACHE_CONTROL, "no-store")]
}

#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        if self.0.is::<UnknownMatch>() {
            return StatusCode::NOT_FOUND;
        }
        if self.0.is::<StoreFull>() {
            return StatusCode::SERVICE_UNAVAILABLE;
        }
        match self.0.downcast_ref::<GameError>() {
            Some(err) if err.is_conflict() => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use connect4::{Lifecycle, Order};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        app_with_capacity(64)
    }

    fn app_with_capacity(max_matches: usize) -> Router {
        app_router(
            AppState::new(MatchConfig::default(), 32, max_matches),
            Path::new("web/dist"),
        )
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn create(app: &Router, body: Value) -> u64 {
        let (status, bytes) = call(app, Method::POST, "/api/matches", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        let created: CreatedMatch = serde_json::from_slice(&bytes).unwrap();
        created.id
    }

    #[tokio::test]
    async fn create_applies_defaults() {
        let app = app();
        let (status, bytes) = call(&app, Method::POST, "/api/matches", Some(json!({}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["match"]["width"], 7);
        assert_eq!(body["match"]["height"], 6);
        assert_eq!(body["match"]["players"][0]["name"], "1");
        assert_eq!(body["match"]["players"][1]["color"], "blue");
        assert_eq!(body["match"]["lifecycle"]["state"], "in_progress");
    }

    #[tokio::test]
    async fn drop_reports_landing_cell() {
        let app = app();
        let id = create(&app, json!({"players": [{"name": "Ana"}, {"name": "Ben"}]})).await;
        let uri = format!("/api/matches/{id}/drop");
        let (status, bytes) = call(&app, Method::POST, &uri, Some(json!({"column": 2}))).await;
        assert_eq!(status, StatusCode::OK);
        let acc: Accepted = serde_json::from_slice(&bytes).unwrap();
        assert_eq!((acc.row, acc.column, acc.player), (5, 2, Order::First));
        assert_eq!(acc.active, Order::Second);
        assert_eq!(acc.lifecycle, Lifecycle::InProgress);
    }

    #[tokio::test]
    async fn replayed_position_can_finish_the_game() {
        let app = app();
        let id = create(&app, json!({"position": "0,1,0,1,0,1"})).await;
        let uri = format!("/api/matches/{id}/drop");
        let (_, bytes) = call(&app, Method::POST, &uri, Some(json!({"column": 0}))).await;
        let acc: Accepted = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(acc.lifecycle, Lifecycle::Won { winner: Order::First });

        let (status, _) = call(&app, Method::POST, &uri, Some(json!({"column": 3}))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, bytes) = call(&app, Method::GET, &format!("/api/matches/{id}"), None).await;
        let snapshot: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot["history"], "0,1,0,1,0,1,0");
        assert_eq!(snapshot["winning_line"], json!([[2, 0], [3, 0], [4, 0], [5, 0]]));
    }

    #[tokio::test]
    async fn bad_requests_are_rejected() {
        let app = app();
        let (status, _) = call(&app, Method::POST, "/api/matches", Some(json!({"width": 0}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = call(&app, Method::POST, "/api/matches", Some(json!({"height": 33}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, bytes) =
            call(&app, Method::POST, "/api/matches", Some(json!({"position": "0,x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(bytes).unwrap().contains("position 1"));

        let id = create(&app, json!({})).await;
        let uri = format!("/api/matches/{id}/drop");
        let (status, _) = call(&app, Method::POST, &uri, Some(json!({"column": 7}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn full_column_is_a_conflict() {
        let app = app();
        let id = create(&app, json!({"position": "4,4,4,4,4,4"})).await;
        let uri = format!("/api/matches/{id}/drop");
        let (status, bytes) = call(&app, Method::POST, &uri, Some(json!({"column": 4}))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(String::from_utf8(bytes).unwrap(), "column 4 is full");
    }

    #[tokio::test]
    async fn reset_with_and_without_players() {
        let app = app();
        let id = create(&app, json!({"start": "alternate", "position": "3,3"})).await;
        let uri = format!("/api/matches/{id}/reset");

        let (status, bytes) = call(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let snapshot: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot["history"], "");
        assert_eq!(snapshot["active"], "second");

        let body = json!({"players": [{"name": "Cy", "color": "green"}, {}]});
        let (_, bytes) = call(&app, Method::POST, &uri, Some(body)).await;
        let snapshot: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot["players"][0]["name"], "Cy");
        assert_eq!(snapshot["players"][1]["name"], "2");
        assert_eq!(snapshot["active"], "first");
    }

    #[tokio::test]
    async fn unknown_and_deleted_matches_are_not_found() {
        let app = app();
        let (status, _) = call(&app, Method::GET, "/api/matches/99", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let id = create(&app, json!({})).await;
        let uri = format!("/api/matches/{id}");
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_reset_body_leaves_match_untouched() {
        let app = app();
        let id = create(&app, json!({"players": [{"name": "Ana"}, {}], "position": "3"})).await;
        let uri = format!("/api/matches/{id}/reset");

        let body = json!({"players": [{"name": "Cy"}]});
        let (status, _) = call(&app, Method::POST, &uri, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, bytes) = call(&app, Method::GET, &format!("/api/matches/{id}"), None).await;
        let snapshot: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot["history"], "3");
        assert_eq!(snapshot["players"][0]["name"], "Ana");
    }

    #[tokio::test]
    async fn create_fails_when_store_is_full_of_live_matches() {
        let app = app_with_capacity(1);
        let id = create(&app, json!({})).await;
        let (status, _) = call(&app, Method::POST, "/api/matches", Some(json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let uri = format!("/api/matches/{id}");
        call(&app, Method::DELETE, &uri, None).await;
        create(&app, json!({})).await;
    }
}
