//! Data services backing the dashboard routes
//!
//! `DataService` is the seam between the HTTP layer and where the data comes
//! from: `MockDataService` serves fixtures generated once at start-up,
//! `ApiDataService` forwards to the arena backend and normalizes its payloads.

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::api::upstream::UpstreamClient;
use crate::error::DataResult;
use crate::mock::{self, MockSettings};
use crate::types::{
    AiModel, AutomatedChat, CryptoPrice, ListQuery, ModelStatus, Position, Season,
    SeasonStatus, Trade, ValuePoint,
};
use crate::value_history::{trailing_window, HistoryConfigError};

pub const DEFAULT_TRADES_LIMIT: usize = 100;
pub const DEFAULT_CHATS_LIMIT: usize = 50;
pub const DEFAULT_HISTORY_DAYS: u32 = 7;

/// Where the data is coming from, for the debug badge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceInfo {
    pub use_mock: bool,
    pub source: String,
    pub api_base: String,
}

#[async_trait]
pub trait DataService: Send + Sync {
    fn source_info(&self) -> DataSourceInfo;

    async fn get_models(&self) -> DataResult<Vec<AiModel>>;

    async fn get_model_by_id(&self, id: &str) -> DataResult<Option<AiModel>>;

    /// Newest first, at most `limit` (default 100)
    async fn get_trades(&self, query: &ListQuery) -> DataResult<Vec<Trade>>;

    async fn get_positions(&self, query: &ListQuery) -> DataResult<Vec<Position>>;

    /// History points of the last `days`; unknown models yield an empty list
    async fn get_value_history(&self, model_id: &str, days: u32) -> DataResult<Vec<ValuePoint>>;

    /// Newest first, at most `limit` (default 50)
    async fn get_automated_chats(&self, query: &ListQuery) -> DataResult<Vec<AutomatedChat>>;

    async fn get_prices(&self) -> DataResult<Vec<CryptoPrice>>;

    async fn get_seasons(&self, status: Option<&str>) -> DataResult<Vec<Season>>;

    async fn get_active_season(&self) -> DataResult<Option<Season>>;

    async fn get_season_by_id(&self, id: &str) -> DataResult<Option<Season>>;
}

// ============================================================================
// Mock implementation
// ============================================================================

/// Fixture-backed service. Everything is generated in `new` and only read
/// afterwards.
pub struct MockDataService {
    models: Vec<AiModel>,
    trades: Vec<Trade>,
    positions: Vec<Position>,
    chats: Vec<AutomatedChat>,
    prices: Vec<CryptoPrice>,
    seasons: Vec<Season>,
}

impl MockDataService {
    pub fn new(settings: &MockSettings) -> Result<Self, HistoryConfigError> {
        Self::generate(settings, Utc::now().timestamp_millis(), &mut rand::thread_rng())
    }

    /// Build fixtures against an explicit clock and random source
    pub fn generate<R: Rng + ?Sized>(
        settings: &MockSettings,
        now_ms: i64,
        rng: &mut R,
    ) -> Result<Self, HistoryConfigError> {
        let now = chrono::DateTime::from_timestamp_millis(now_ms).unwrap_or_else(Utc::now);
        let models = mock::build_models(settings, now_ms, rng)?;

        let trades = models
            .iter()
            .flat_map(|m| {
                mock::generate_trades(
                    &m.id,
                    &m.display_name,
                    settings.trades_per_model,
                    now_ms,
                    &mut *rng,
                )
            })
            .collect::<Vec<_>>();
        let positions = models
            .iter()
            .flat_map(|m| mock::generate_positions(&m.id, now_ms, &mut *rng))
            .collect::<Vec<_>>();

        info!(
            models = models.len(),
            trades = trades.len(),
            positions = positions.len(),
            "Mock fixtures generated"
        );

        Ok(Self {
            models,
            trades,
            positions,
            chats: mock::scripted_chats(now),
            prices: mock::mock_prices(now),
            seasons: mock::mock_seasons(now),
        })
    }

    fn newest_first<T, F>(items: impl Iterator<Item = T>, limit: usize, timestamp: F) -> Vec<T>
    where
        F: Fn(&T) -> i64,
    {
        let mut items: Vec<T> = items.collect();
        items.sort_by_key(|item| std::cmp::Reverse(timestamp(item)));
        items.truncate(limit);
        items
    }
}

#[async_trait]
impl DataService for MockDataService {
    fn source_info(&self) -> DataSourceInfo {
        DataSourceInfo {
            use_mock: true,
            source: "Mock Data".to_string(),
            api_base: "N/A".to_string(),
        }
    }

    async fn get_models(&self) -> DataResult<Vec<AiModel>> {
        Ok(self.models.clone())
    }

    async fn get_model_by_id(&self, id: &str) -> DataResult<Option<AiModel>> {
        Ok(self.models.iter().find(|m| m.id == id).cloned())
    }

    async fn get_trades(&self, query: &ListQuery) -> DataResult<Vec<Trade>> {
        let filter = query.model_filter();
        let trades = self
            .trades
            .iter()
            .filter(|t| filter.map_or(true, |id| t.model_id == id))
            .cloned();
        Ok(Self::newest_first(
            trades,
            query.limit.unwrap_or(DEFAULT_TRADES_LIMIT),
            |t| mock::parse_millis(&t.timestamp),
        ))
    }

    async fn get_positions(&self, query: &ListQuery) -> DataResult<Vec<Position>> {
        let filter = query.model_filter();
        Ok(self
            .positions
            .iter()
            .filter(|p| filter.map_or(true, |id| p.model_id == id))
            .cloned()
            .collect())
    }

    async fn get_value_history(&self, model_id: &str, days: u32) -> DataResult<Vec<ValuePoint>> {
        let Some(model) = self.models.iter().find(|m| m.id == model_id) else {
            debug!(model_id, "Value history requested for unknown model");
            return Ok(Vec::new());
        };
        Ok(trailing_window(
            &model.value_history,
            days,
            Utc::now().timestamp_millis(),
        ))
    }

    async fn get_automated_chats(&self, query: &ListQuery) -> DataResult<Vec<AutomatedChat>> {
        let filter = query.model_filter();
        let chats = self
            .chats
            .iter()
            .filter(|c| filter.map_or(true, |id| c.model_id == id))
            .cloned();
        Ok(Self::newest_first(
            chats,
            query.limit.unwrap_or(DEFAULT_CHATS_LIMIT),
            |c| mock::parse_millis(&c.timestamp),
        ))
    }

    async fn get_prices(&self) -> DataResult<Vec<CryptoPrice>> {
        Ok(self.prices.clone())
    }

    async fn get_seasons(&self, status: Option<&str>) -> DataResult<Vec<Season>> {
        Ok(self
            .seasons
            .iter()
            .filter(|s| status.map_or(true, |st| st.is_empty() || s.status.as_str() == st))
            .cloned()
            .collect())
    }

    async fn get_active_season(&self) -> DataResult<Option<Season>> {
        Ok(self
            .seasons
            .iter()
            .find(|s| s.status == SeasonStatus::Active)
            .cloned())
    }

    async fn get_season_by_id(&self, id: &str) -> DataResult<Option<Season>> {
        Ok(self.seasons.iter().find(|s| s.id == id).cloned())
    }
}

// ============================================================================
// Upstream implementation
// ============================================================================

/// Lenient view of an upstream model; missing fields get dashboard defaults
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub display_name: Option<String>,
    #[serde(rename = "display_name")]
    pub display_name_snake: Option<String>,
    pub initial_value: Option<f64>,
    pub current_value: Option<f64>,
    pub performance: Option<f64>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub rank: Option<u32>,
    pub win_rate: Option<f64>,
    pub total_trades: Option<u32>,
    pub value_history: Option<Vec<ValuePoint>>,
}

/// Zero and missing both fall back, like `x || default`
fn or_default(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| *v != 0.0 && !v.is_nan()).unwrap_or(default)
}

impl From<RawModel> for AiModel {
    fn from(raw: RawModel) -> Self {
        let id = raw.id.unwrap_or_default();
        Self {
            name: raw.name.unwrap_or_else(|| id.clone()),
            display_name: raw
                .display_name_snake
                .filter(|s| !s.is_empty())
                .or(raw.display_name.filter(|s| !s.is_empty()))
                .unwrap_or_else(|| id.to_uppercase()),
            id,
            initial_value: or_default(raw.initial_value, mock::INITIAL_ACCOUNT_VALUE),
            current_value: or_default(raw.current_value, mock::INITIAL_ACCOUNT_VALUE),
            performance: or_default(raw.performance, 0.0),
            color: raw.color,
            icon: raw.icon,
            status: if raw.status.as_deref() == Some("active") {
                ModelStatus::Active
            } else {
                ModelStatus::Inactive
            },
            description: raw.description,
            rank: raw.rank,
            win_rate: raw.win_rate,
            total_trades: raw.total_trades,
            value_history: raw.value_history.unwrap_or_default(),
        }
    }
}

/// Arena backend service
pub struct ApiDataService {
    client: UpstreamClient,
}

impl ApiDataService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: UpstreamClient::new(base_url),
        }
    }

    fn list_params(query: &ListQuery, default_limit: Option<usize>) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(season) = query.season_id.as_deref().filter(|s| !s.is_empty()) {
            params.push(("seasonId", season.to_string()));
        }
        if let Some(model) = query.model_filter() {
            params.push(("modelId", model.to_string()));
        }
        if let Some(limit) = query.limit.or(default_limit) {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[async_trait]
impl DataService for ApiDataService {
    fn source_info(&self) -> DataSourceInfo {
        DataSourceInfo {
            use_mock: false,
            source: "API".to_string(),
            api_base: self.client.base_url().to_string(),
        }
    }

    async fn get_models(&self) -> DataResult<Vec<AiModel>> {
        let raw: Vec<RawModel> = self.client.get_list("/models", &[]).await?;
        Ok(raw.into_iter().map(AiModel::from).collect())
    }

    async fn get_model_by_id(&self, id: &str) -> DataResult<Option<AiModel>> {
        let raw: Option<RawModel> = self.client.get_optional(&format!("/models/{}", id)).await?;
        Ok(raw.map(AiModel::from))
    }

    async fn get_trades(&self, query: &ListQuery) -> DataResult<Vec<Trade>> {
        let params = Self::list_params(query, Some(DEFAULT_TRADES_LIMIT));
        self.client.get_list("/trades", &params).await
    }

    async fn get_positions(&self, query: &ListQuery) -> DataResult<Vec<Position>> {
        let params = Self::list_params(query, None);
        self.client.get_list("/positions", &params).await
    }

    async fn get_value_history(&self, model_id: &str, days: u32) -> DataResult<Vec<ValuePoint>> {
        self.client
            .get_list(
                &format!("/value-history/{}", model_id),
                &[("days", days.to_string())],
            )
            .await
    }

    async fn get_automated_chats(&self, query: &ListQuery) -> DataResult<Vec<AutomatedChat>> {
        let params = Self::list_params(query, Some(DEFAULT_CHATS_LIMIT));
        self.client.get_list("/automated-chats", &params).await
    }

    async fn get_prices(&self) -> DataResult<Vec<CryptoPrice>> {
        self.client.get_list("/prices", &[]).await
    }

    async fn get_seasons(&self, status: Option<&str>) -> DataResult<Vec<Season>> {
        let params: Vec<(&str, String)> = status
            .filter(|s| !s.is_empty())
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.client.get_list("/seasons", &params).await
    }

    async fn get_active_season(&self) -> DataResult<Option<Season>> {
        self.client.get_optional("/seasons/active").await
    }

    async fn get_season_by_id(&self, id: &str) -> DataResult<Option<Season>> {
        self.client.get_optional(&format!("/seasons/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn service() -> MockDataService {
        let mut rng = StdRng::seed_from_u64(9);
        MockDataService::generate(
            &MockSettings::default(),
            Utc::now().timestamp_millis(),
            &mut rng,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_mock_models_and_lookup() {
        let svc = service();
        assert_eq!(svc.get_models().await.unwrap().len(), 7);
        let grok = svc.get_model_by_id("grok-4").await.unwrap().unwrap();
        assert_eq!(grok.display_name, "GROK 4");
        assert!(svc.get_model_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_mock_trades_filter_sort_limit() {
        let svc = service();

        let all = svc.get_trades(&ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), DEFAULT_TRADES_LIMIT);
        let stamps: Vec<i64> = all.iter().map(|t| mock::parse_millis(&t.timestamp)).collect();
        assert!(stamps.windows(2).all(|w| w[0] >= w[1]));

        let query = ListQuery {
            model_id: Some("qwen3-max".into()),
            limit: Some(5),
            ..Default::default()
        };
        let some = svc.get_trades(&query).await.unwrap();
        assert_eq!(some.len(), 5);
        assert!(some.iter().all(|t| t.model_id == "qwen3-max"));

        let query = ListQuery {
            model_id: Some("all".into()),
            limit: Some(1000),
            ..Default::default()
        };
        assert_eq!(svc.get_trades(&query).await.unwrap().len(), 7 * 30);
    }

    #[tokio::test]
    async fn test_mock_value_history_window() {
        let svc = service();
        let full = svc.get_value_history("qwen3-max", 7).await.unwrap();
        // The oldest point can fall just outside the window by the time we query
        assert!(full.len() >= 7 * 24 && full.len() <= 7 * 24 + 1);
        assert_eq!(full.last().unwrap().value, 17130.8);

        let short = svc.get_value_history("qwen3-max", 3).await.unwrap();
        assert!(short.len() < full.len());
        assert_eq!(short.last(), full.last());

        assert!(svc.get_value_history("missing", 7).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_chats_newest_first() {
        let svc = service();
        let chats = svc.get_automated_chats(&ListQuery::default()).await.unwrap();
        assert_eq!(chats.len(), 5);
        assert_eq!(chats[0].id, "1");

        let query = ListQuery {
            model_id: Some("gpt-6".into()),
            ..Default::default()
        };
        let chats = svc.get_automated_chats(&query).await.unwrap();
        assert_eq!(chats.len(), 1);
    }

    #[tokio::test]
    async fn test_mock_seasons() {
        let svc = service();
        assert_eq!(svc.get_seasons(None).await.unwrap().len(), 2);
        assert_eq!(svc.get_seasons(Some("completed")).await.unwrap().len(), 1);
        let active = svc.get_active_season().await.unwrap().unwrap();
        assert_eq!(active.status, SeasonStatus::Active);
        assert!(svc.get_season_by_id("season-0").await.unwrap().is_some());
        assert!(svc.get_season_by_id("season-9").await.unwrap().is_none());
    }

    #[test]
    fn test_raw_model_normalization() {
        let raw: RawModel = serde_json::from_value(json!({
            "id": "grok-4",
            "name": "grok-4",
            "display_name": "GROK 4",
            "initialValue": 0,
            "currentValue": 9022.15,
            "status": "paused",
            "rank": 5
        }))
        .unwrap();

        let model = AiModel::from(raw);
        assert_eq!(model.display_name, "GROK 4");
        assert_eq!(model.initial_value, 10_000.0);
        assert_eq!(model.current_value, 9022.15);
        assert_eq!(model.performance, 0.0);
        assert_eq!(model.status, ModelStatus::Inactive);
        assert!(model.value_history.is_empty());
    }

    #[test]
    fn test_raw_model_with_both_display_name_keys() {
        let payload = json!([
            { "id": "gpt-6", "displayName": "GPT 6 (camel)", "display_name": "GPT 6" },
            { "id": "grok-4", "displayName": "GROK 4" },
            { "id": "qwen3-max", "display_name": "" }
        ]);
        let raw: Vec<RawModel> = crate::api::upstream::decode_list("/models", payload);
        assert_eq!(raw.len(), 3);

        let models: Vec<AiModel> = raw.into_iter().map(AiModel::from).collect();
        assert_eq!(models[0].display_name, "GPT 6");
        assert_eq!(models[1].display_name, "GROK 4");
        assert_eq!(models[2].display_name, "QWEN3-MAX");
    }

    #[test]
    fn test_list_params() {
        let query = ListQuery {
            season_id: Some("season-1".into()),
            model_id: Some("all".into()),
            limit: None,
        };
        let params = ApiDataService::list_params(&query, Some(100));
        assert_eq!(
            params,
            vec![("seasonId", "season-1".to_string()), ("limit", "100".to_string())]
        );
        assert!(ApiDataService::list_params(&ListQuery::default(), None).is_empty());
    }
}
