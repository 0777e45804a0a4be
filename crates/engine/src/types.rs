//! Wire types shared by the data services, the HTTP layer and the chart projection
//!
//! Everything serializes camelCase because the dashboard renderer consumes
//! these objects verbatim.

use serde::{Deserialize, Serialize};

/// A single sample on a model's account value curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Active,
    Inactive,
}

/// An AI trading model as shown on the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiModel {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub initial_value: f64,
    pub current_value: f64,
    /// Percent return since the start of the season
    pub performance: f64,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub status: ModelStatus,
    pub description: Option<String>,
    pub rank: Option<u32>,
    pub win_rate: Option<f64>,
    pub total_trades: Option<u32>,
    #[serde(default)]
    pub value_history: Vec<ValuePoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

/// A completed round-trip trade
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub model_id: String,
    pub model_name: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub direction: TradeDirection,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub entry_notional: f64,
    pub exit_notional: f64,
    pub holding_time: String,
    pub pnl: f64,
    pub pnl_percent: f64,
    /// RFC 3339
    pub timestamp: String,
}

/// An open position
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub model_id: String,
    pub symbol: String,
    pub amount: f64,
    pub entry_price: f64,
    pub current_price: f64,
    pub profit: f64,
    pub profit_percent: f64,
    pub timestamp: String,
}

/// Ticker entry for the price strip
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CryptoPrice {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub price_change_percentage_24h: f64,
    pub market_cap: f64,
    pub high_24h: f64,
    pub low_24h: f64,
    pub last_updated: String,
}

/// CoinGecko `market_chart` payload, `[timestamp, value]` pairs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoricalData {
    pub prices: Vec<(f64, f64)>,
    pub market_caps: Vec<(f64, f64)>,
    pub total_volumes: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingDecision {
    pub symbol: String,
    pub quantity: f64,
    pub action: String,
    pub confidence: u8,
}

/// One collapsible block under a chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatSection {
    UserPrompt { content: String, expanded: bool },
    ChainOfThought { content: String, expanded: bool },
    TradingDecisions {
        content: Vec<TradingDecision>,
        expanded: bool,
    },
}

/// A message in the model chat feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomatedChat {
    pub id: String,
    pub model_id: String,
    pub model_name: String,
    pub icon: String,
    pub content: String,
    pub timestamp: String,
    pub expandable: bool,
    #[serde(default)]
    pub sections: Vec<ChatSection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonStatus {
    Upcoming,
    Active,
    Completed,
}

impl SeasonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

/// A competition season
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Season {
    pub id: String,
    pub name: String,
    pub status: SeasonStatus,
    pub start_date: String,
    pub end_date: Option<String>,
    pub initial_capital: f64,
    pub description: Option<String>,
}

/// Filters accepted by the list endpoints (trades, positions, chats)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub season_id: Option<String>,
    pub model_id: Option<String>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Model filter with the `all` sentinel stripped
    pub fn model_filter(&self) -> Option<&str> {
        self.model_id
            .as_deref()
            .filter(|id| !id.is_empty() && *id != "all")
    }
}
