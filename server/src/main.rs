use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use connect4_engine::{best_move_within, evaluate_position, MoveRequest, Player, Strategy};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;

use config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    let app = app_router(config.clone());

    let listener = TcpListener::bind(config.addr).await?;
    info!(max_level = config.max_level, "Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn app_router(config: ServerConfig) -> Router {
    let api = Router::new()
        .route("/move", get(handle_move))
        .route("/evaluate", get(handle_evaluate))
        .with_state(config);
    Router::new()
        .nest("/api", api)
        .layer(
            CorsLayer::new()
                .allow_methods([axum::http::Method::GET])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, serde::Deserialize)]
struct MoveQuery {
    #[serde(default)]
    position: String,
    level: u8,
    strategy: Option<String>,
    player: Option<Player>,
}

#[derive(Debug, serde::Deserialize)]
struct EvaluateQuery {
    #[serde(default)]
    position: String,
    player: Option<Player>,
}

async fn handle_move(
    State(config): State<ServerConfig>,
    Query(query): Query<MoveQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let strategy = match query.strategy.as_deref() {
        Some(name) => name.parse::<Strategy>()?,
        None => Strategy::default(),
    };
    let req = MoveRequest {
        position: query.position,
        level: query.level,
        strategy,
        player: query.player,
    };
    // Searches are CPU-bound; keep them off the async workers.
    let mv = tokio::task::spawn_blocking(move || best_move_within(req, config.max_level)).await??;
    let headers = [(header::CACHE_CONTROL, "no-store")];
    Ok((headers, Json(mv)))
}

async fn handle_evaluate(Query(query): Query<EvaluateQuery>) -> Result<impl IntoResponse, ApiError> {
    let eval = evaluate_position(&query.position, query.player)?;
    Ok(Json(eval))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::BAD_REQUEST;
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}
