//! Arena Dashboard: HTTP backend and CLI for the AI trading arena
//!
//! Usage:
//!   arena-dashboard serve --port 3000                      - Launch web server with UI
//!   arena-dashboard history --final 17130.8 --shape aggressive  - Generate one value history
//!   arena-dashboard leaderboard                            - Print the mock roster

mod config;

use arena_engine::dashboard::{self, DashboardState, DisplayMode, TimeRange};
use arena_engine::mock;
use arena_engine::types::{AiModel, CryptoPrice, ListQuery, Season};
use arena_engine::value_history::{self, EndpointPinning, SeriesParams, TrendShape};
use arena_engine::{
    ApiDataService, CoinGeckoClient, DataError, DataService, MockDataService, TtlCache,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::AppConfig;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "arena-dashboard")]
#[command(about = "AI trading arena dashboard backend", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the dashboard web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Generate a single value history and print a daily summary
    History {
        /// Starting account value
        #[arg(long, default_value_t = 10_000.0)]
        initial: f64,
        /// Exact value of the last point
        #[arg(long = "final")]
        final_value: f64,
        /// Random perturbation magnitude
        #[arg(long, default_value_t = 0.8)]
        volatility: f64,
        /// Trend shape: aggressive, moderate, stable, declining, volatile
        #[arg(long, default_value = "aggressive")]
        shape: String,
        /// Number of days of history
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Samples per day
        #[arg(long, default_value_t = value_history::DEFAULT_POINTS_PER_DAY)]
        points_per_day: u32,
        /// Seed for a reproducible series
        #[arg(long)]
        seed: Option<u64>,
        /// Also pin the first point to the initial value
        #[arg(long)]
        pin_start: bool,
        /// Optional JSON export path
        #[arg(long)]
        export: Option<String>,
    },
    /// Print the mock roster ranked by performance
    Leaderboard,
}

#[derive(Clone)]
struct AppState {
    data: Arc<dyn DataService>,
    coingecko: Arc<CoinGeckoClient>,
    models_cache: Arc<TtlCache<String, Vec<AiModel>>>,
    prices_cache: Arc<TtlCache<String, Vec<CryptoPrice>>>,
    seasons_cache: Arc<TtlCache<String, Vec<Season>>>,
}

impl AppState {
    fn new(config: &AppConfig, data: Arc<dyn DataService>) -> Self {
        Self {
            data,
            coingecko: Arc::new(CoinGeckoClient::with_base_url(&config.coingecko_base)),
            models_cache: Arc::new(TtlCache::new(config.models_ttl)),
            prices_cache: Arc::new(TtlCache::new(config.prices_ttl)),
            seasons_cache: Arc::new(TtlCache::new(config.seasons_ttl)),
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,arena_engine=debug,arena_dashboard=debug")
    } else {
        EnvFilter::new("info,arena_engine=info,arena_dashboard=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

fn build_data_service(config: &AppConfig) -> anyhow::Result<Arc<dyn DataService>> {
    if config.use_mock {
        let service = MockDataService::new(&config.mock)
            .map_err(|e| anyhow::anyhow!("Mock data generation failed: {}", e))?;
        Ok(Arc::new(service))
    } else {
        Ok(Arc::new(ApiDataService::new(config.api_base.clone())))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    dotenvy::dotenv().ok();

    match cli.command {
        Commands::Serve { host, port } => {
            cmd_serve(&host, port).await?;
        }
        Commands::History {
            initial,
            final_value,
            volatility,
            shape,
            days,
            points_per_day,
            seed,
            pin_start,
            export,
        } => {
            let shape: TrendShape = shape.parse()?;
            let pinning = if pin_start {
                EndpointPinning::Both
            } else {
                EndpointPinning::FinalOnly
            };
            let params = SeriesParams::new(initial, final_value, volatility, shape, days)
                .with_points_per_day(points_per_day)
                .with_pinning(pinning);
            cmd_history(&params, seed, export)?;
        }
        Commands::Leaderboard => {
            cmd_leaderboard()?;
        }
    }

    Ok(())
}

// ============================================================================
// Serve command: Axum web server
// ============================================================================

fn build_router(state: AppState, static_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(api_health))
        .route("/data-source", get(api_data_source))
        .route("/models", get(api_models))
        .route("/models/:id", get(api_model_by_id))
        .route("/prices", get(api_prices))
        .route("/prices/live", get(api_live_prices))
        .route("/trades", get(api_trades))
        .route("/positions", get(api_positions))
        .route("/value-history/:id", get(api_value_history))
        .route("/automated-chats", get(api_automated_chats))
        .route("/seasons", get(api_seasons))
        .route("/seasons/active", get(api_active_season))
        .route("/seasons/:id", get(api_season_by_id))
        .route("/historical", get(api_historical))
        .route("/chart", get(api_chart))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
}

async fn cmd_serve(host: &str, port: u16) -> anyhow::Result<()> {
    info!("Arena Dashboard v{} starting...", APP_VERSION);

    let config = AppConfig::from_env();
    let data = build_data_service(&config)?;
    let source = data.source_info();
    info!(
        use_mock = source.use_mock,
        api_base = %source.api_base,
        "Data source: {}",
        source.source
    );

    let static_dir = config.resolve_static_dir();
    let app = build_router(AppState::new(&config, data), static_dir.clone());

    let addr: std::net::SocketAddr = format!("{}:{}", host, port).parse()?;
    println!("\n=== Arena Dashboard v{} ===", APP_VERSION);
    println!("AI Trading Arena Backend");
    println!("Listening on http://{}", addr);
    println!("\nEndpoints:");
    println!("  GET  /api/health              - Health check");
    println!("  GET  /api/data-source         - Active data source");
    println!("  GET  /api/models              - Model leaderboard");
    println!("  GET  /api/models/:id          - Single model");
    println!("  GET  /api/prices              - Coin prices");
    println!("  GET  /api/prices/live         - CoinGecko ticker");
    println!("  GET  /api/trades              - Completed trades");
    println!("  GET  /api/positions           - Open positions");
    println!("  GET  /api/value-history/:id   - Model value history");
    println!("  GET  /api/automated-chats     - Model chat feed");
    println!("  GET  /api/seasons             - Seasons");
    println!("  GET  /api/seasons/active      - Active season");
    println!("  GET  /api/seasons/:id         - Single season");
    println!("  GET  /api/historical          - CoinGecko market chart");
    println!("  GET  /api/chart               - Chart series for the dashboard");
    println!("\n  Source: {} ({})", source.source, source.api_base);
    println!("  Static: {}", static_dir.display());
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// History command: generator from the CLI
// ============================================================================

fn cmd_history(params: &SeriesParams, seed: Option<u64>, export: Option<String>) -> anyhow::Result<()> {
    println!("\n=== Arena Dashboard v{} ===", APP_VERSION);
    println!(
        "Shape: {} | Volatility: {} | {} -> {} over {} days ({} pts/day)",
        params.trend_shape,
        params.volatility,
        params.initial_value,
        params.final_value,
        params.days,
        params.points_per_day,
    );

    let mut rng: Box<dyn RngCore> = match seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };
    let points = value_history::generate(params, &mut *rng)?;

    let (min, max) = points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        (lo.min(p.value), hi.max(p.value))
    });
    println!(
        "Points: {} | Min: {:.2} | Max: {:.2} | Final: {:.2}",
        points.len(),
        min,
        max,
        points.last().map(|p| p.value).unwrap_or_default(),
    );

    println!("\n  {:>4}  {:<24} {:>12} {:>9}", "Day", "Timestamp", "Value", "Change");
    println!("  {}", "-".repeat(54));
    let step = params.points_per_day.max(1) as usize;
    for (i, p) in points.iter().enumerate().step_by(step) {
        println!(
            "  {:>4}  {:<24} {:>12.2} {:>+8.2}%",
            i / step,
            mock::iso_millis(p.timestamp),
            p.value,
            dashboard::percent_change(params.initial_value, p.value),
        );
    }

    if let Some(path) = export {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "version": APP_VERSION,
            "trendShape": params.trend_shape.as_str(),
            "initialValue": params.initial_value,
            "finalValue": params.final_value,
            "volatility": params.volatility,
            "days": params.days,
            "pointsPerDay": params.points_per_day,
            "seed": seed,
            "points": points,
        }))?;
        std::fs::write(&path, json)?;
        println!("\nExported {} points to {}", points.len(), path);
    }

    Ok(())
}

// ============================================================================
// Leaderboard command
// ============================================================================

fn cmd_leaderboard() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let now = Utc::now().timestamp_millis();
    let mut models = mock::build_models(&config.mock, now, &mut rand::thread_rng())?;
    models.sort_by_key(|m| m.rank.unwrap_or(u32::MAX));

    println!("\n=== Arena Dashboard v{} ===", APP_VERSION);
    println!("\nLeaderboard ({} models):", models.len());
    println!(
        "  {:>3}  {:<20} {:>12} {:>9} {:>7} {:>7}",
        "#", "Model", "Value", "Return", "WR%", "Trades"
    );
    println!("  {}", "-".repeat(64));
    for m in &models {
        println!(
            "  {:>3}  {:<20} {:>12.2} {:>+8.2}% {:>6.1}% {:>7}",
            m.rank.unwrap_or_default(),
            m.display_name,
            m.current_value,
            m.performance,
            m.win_rate.unwrap_or_default(),
            m.total_trades.unwrap_or_default(),
        );
    }

    if let (Some(best), Some(worst)) = (
        dashboard::highest_model(&models),
        dashboard::lowest_model(&models),
    ) {
        println!(
            "\nHighest: {} ({:+.2}%) | Lowest: {} ({:+.2}%)",
            best.display_name, best.performance, worst.display_name, worst.performance
        );
    }

    Ok(())
}

// ============================================================================
// API Handlers: helpers
// ============================================================================

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// 404 for missing resources, 503 for everything else
fn service_error(service: &str, err: DataError) -> (StatusCode, Json<Value>) {
    if err.is_not_found() {
        warn!(service, error = %err, "Resource not found");
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": format!("{} not found", service) })),
        );
    }
    error!(service, error = %err, "Data service request failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({
            "error": format!("{} service temporarily unavailable, please retry later", service),
        })),
    )
}

fn not_found(what: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": format!("{} not found", what) })),
    )
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
}

async fn cached_models(state: &AppState) -> Result<Vec<AiModel>, DataError> {
    state
        .models_cache
        .get_or_try_insert_with("models".to_string(), || state.data.get_models())
        .await
}

// ============================================================================
// API Handlers: status
// ============================================================================

/// GET /api/health
async fn api_health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "arena-dashboard",
        "version": APP_VERSION,
        "source": state.data.source_info().source,
    }))
}

/// GET /api/data-source
async fn api_data_source(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!(state.data.source_info()))
}

// ============================================================================
// API Handlers: models & history
// ============================================================================

/// GET /api/models - cached roster
async fn api_models(State(state): State<AppState>) -> ApiResult {
    let models = cached_models(&state)
        .await
        .map_err(|e| service_error("Models", e))?;
    Ok(Json(serde_json::json!(models)))
}

/// GET /api/models/:id
async fn api_model_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match state.data.get_model_by_id(&id).await {
        Ok(Some(model)) => Ok(Json(serde_json::json!(model))),
        Ok(None) => Err(not_found("Model")),
        Err(e) => Err(service_error("Model", e)),
    }
}

/// GET /api/value-history/:id?days=7
async fn api_value_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let days: u32 = params
        .get("days")
        .and_then(|s| s.parse().ok())
        .unwrap_or(arena_engine::data_service::DEFAULT_HISTORY_DAYS);

    let history = state
        .data
        .get_value_history(&id, days)
        .await
        .map_err(|e| service_error("Value history", e))?;
    Ok(Json(serde_json::json!(history)))
}

/// GET /api/chart?model=all&range=ALL&mode=$ - series projected for the chart
async fn api_chart(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let mut view = DashboardState::default();
    if let Some(model) = params.get("model").filter(|m| !m.is_empty()) {
        view.select_model(model.clone());
    }
    if let Some(range) = params.get("range") {
        view.set_time_range(range.parse::<TimeRange>().map_err(bad_request)?);
    }
    if let Some(mode) = params.get("mode") {
        view.set_display_mode(mode.parse::<DisplayMode>().map_err(bad_request)?);
    }

    let models = cached_models(&state)
        .await
        .map_err(|e| service_error("Chart", e))?;
    let series = view.chart_series(&models, Utc::now().timestamp_millis());

    Ok(Json(serde_json::json!({
        "model": view.selected_model,
        "range": view.time_range,
        "mode": view.display_mode,
        "selected": view.selected_model_data(&models),
        "highest": dashboard::highest_model(&models).map(|m| &m.id),
        "lowest": dashboard::lowest_model(&models).map(|m| &m.id),
        "series": series,
    })))
}

// ============================================================================
// API Handlers: trades, positions, chats
// ============================================================================

/// GET /api/trades?seasonId&modelId&limit
async fn api_trades(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let trades = state
        .data
        .get_trades(&query)
        .await
        .map_err(|e| service_error("Trades", e))?;
    Ok(Json(serde_json::json!(trades)))
}

/// GET /api/positions?seasonId&modelId
async fn api_positions(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult {
    let positions = state
        .data
        .get_positions(&query)
        .await
        .map_err(|e| service_error("Positions", e))?;
    Ok(Json(serde_json::json!(positions)))
}

/// GET /api/automated-chats?seasonId&modelId&limit
async fn api_automated_chats(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    let chats = state
        .data
        .get_automated_chats(&query)
        .await
        .map_err(|e| service_error("Chat", e))?;
    Ok(Json(serde_json::json!(chats)))
}

// ============================================================================
// API Handlers: prices & market data
// ============================================================================

/// GET /api/prices - cached
async fn api_prices(State(state): State<AppState>) -> ApiResult {
    let prices = state
        .prices_cache
        .get_or_try_insert_with("prices".to_string(), || state.data.get_prices())
        .await
        .map_err(|e| service_error("Prices", e))?;
    Ok(Json(serde_json::json!(prices)))
}

/// GET /api/prices/live - CoinGecko ticker, fixtures when it is unreachable
async fn api_live_prices(State(state): State<AppState>) -> Json<Value> {
    let prices = state
        .prices_cache
        .get_or_try_insert_with("live".to_string(), || async {
            Ok::<_, Infallible>(state.coingecko.prices_or_mock().await)
        })
        .await
        .unwrap_or_default();
    Json(serde_json::json!(prices))
}

/// GET /api/historical?coinId=bitcoin&days=7
async fn api_historical(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let coin_id = params
        .get("coinId")
        .filter(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| "bitcoin".to_string());
    let days: u32 = params
        .get("days")
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);

    let data = state.coingecko.historical_or_mock(&coin_id, days).await;
    Json(serde_json::json!(data))
}

// ============================================================================
// API Handlers: seasons
// ============================================================================

/// GET /api/seasons?status - cached per status filter
async fn api_seasons(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let status = params.get("status").cloned().unwrap_or_default();
    let seasons = state
        .seasons_cache
        .get_or_try_insert_with(status.clone(), || async {
            let filter = Some(status.as_str()).filter(|s| !s.is_empty());
            state.data.get_seasons(filter).await
        })
        .await
        .map_err(|e| service_error("Seasons", e))?;
    Ok(Json(serde_json::json!(seasons)))
}

/// GET /api/seasons/active - `null` when no season is running
async fn api_active_season(State(state): State<AppState>) -> ApiResult {
    let season = state
        .data
        .get_active_season()
        .await
        .map_err(|e| service_error("Season", e))?;
    Ok(Json(serde_json::json!(season)))
}

/// GET /api/seasons/:id
async fn api_season_by_id(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    match state.data.get_season_by_id(&id).await {
        Ok(Some(season)) => Ok(Json(serde_json::json!(season))),
        Ok(None) => Err(not_found("Season")),
        Err(e) => Err(service_error("Season", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_engine::MockSettings;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    /// Unroutable address so CoinGecko calls fail fast and fall back
    const DEAD_UPSTREAM: &str = "http://127.0.0.1:9";

    fn test_config() -> AppConfig {
        AppConfig::from_lookup(|key| (key == "ARENA_COINGECKO_BASE").then(|| DEAD_UPSTREAM.to_string()))
    }

    fn mock_app() -> Router {
        let mut rng = StdRng::seed_from_u64(42);
        let service = MockDataService::generate(
            &MockSettings::default(),
            Utc::now().timestamp_millis(),
            &mut rng,
        )
        .unwrap();
        build_router(
            AppState::new(&test_config(), Arc::new(service)),
            PathBuf::from("dist"),
        )
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_and_source() {
        let (status, body) = get_json(mock_app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["source"], "Mock Data");

        let (_, body) = get_json(mock_app(), "/api/data-source").await;
        assert_eq!(body["useMock"], true);
        assert_eq!(body["apiBase"], "N/A");
    }

    #[tokio::test]
    async fn test_models_routes() {
        let (status, body) = get_json(mock_app(), "/api/models").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 7);
        assert!(body[0]["valueHistory"].as_array().unwrap().len() > 100);

        let (status, body) = get_json(mock_app(), "/api/models/grok-4").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["displayName"], "GROK 4");

        let (status, body) = get_json(mock_app(), "/api/models/nobody").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Model not found");
    }

    #[tokio::test]
    async fn test_trades_filtered_and_limited() {
        let (status, body) = get_json(mock_app(), "/api/trades?modelId=grok-4&limit=5").await;
        assert_eq!(status, StatusCode::OK);
        let trades = body.as_array().unwrap();
        assert_eq!(trades.len(), 5);
        assert!(trades.iter().all(|t| t["modelId"] == "grok-4"));

        let (_, body) = get_json(mock_app(), "/api/trades?modelId=all").await;
        assert_eq!(body.as_array().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_value_history_window() {
        let (status, body) = get_json(mock_app(), "/api/value-history/qwen3-max?days=3").await;
        assert_eq!(status, StatusCode::OK);
        let points = body.as_array().unwrap();
        assert!(!points.is_empty());
        assert!(points.len() <= 3 * 24 + 1);
        assert_eq!(points.last().unwrap()["value"], 17130.8);

        let (_, body) = get_json(mock_app(), "/api/value-history/unknown").await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seasons_routes() {
        let (_, body) = get_json(mock_app(), "/api/seasons").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = get_json(mock_app(), "/api/seasons?status=active").await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = get_json(mock_app(), "/api/seasons/active").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "active");

        let (status, _) = get_json(mock_app(), "/api/seasons/season-9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chart_projection() {
        let (status, body) = get_json(mock_app(), "/api/chart?model=gpt-6&range=72H&mode=%25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["range"], "72H");
        assert_eq!(body["mode"], "%");
        assert_eq!(body["selected"]["id"], "gpt-6");
        assert_eq!(body["highest"], "qwen3-max");
        assert_eq!(body["lowest"], "gpt-6");

        let series = body["series"].as_array().unwrap();
        assert_eq!(series.len(), 1);
        let last = series[0]["points"].as_array().unwrap().last().unwrap().clone();
        assert!((last["value"].as_f64().unwrap() - (-70.3079)).abs() < 1e-6);

        let (_, body) = get_json(mock_app(), "/api/chart").await;
        assert_eq!(body["series"].as_array().unwrap().len(), 7);

        let (status, _) = get_json(mock_app(), "/api/chart?range=24H").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_historical_falls_back_to_mock() {
        let (status, body) = get_json(mock_app(), "/api/historical?coinId=bitcoin&days=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["prices"].as_array().unwrap().len(), 100);
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_503() {
        let config = test_config();
        let data: Arc<dyn DataService> = Arc::new(ApiDataService::new(DEAD_UPSTREAM));
        let app = build_router(AppState::new(&config, data), PathBuf::from("dist"));

        let (status, body) = get_json(app.clone(), "/api/models").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body["error"],
            "Models service temporarily unavailable, please retry later"
        );

        let (status, _) = get_json(app, "/api/trades").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
