//! CoinGecko public API client for ticker prices and market charts (no key required)

use anyhow::Result;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::mock;
use crate::types::{CryptoPrice, HistoricalData};

const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Ticker symbol → CoinGecko coin id for the tracked coins
pub const TRACKED_COINS: [(&str, &str); 6] = [
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("BNB", "binancecoin"),
    ("DOGE", "dogecoin"),
    ("XRP", "ripple"),
];

/// CoinGecko market data client
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

/// Raw `/coins/markets` row
#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    high_24h: Option<f64>,
    low_24h: Option<f64>,
    last_updated: Option<String>,
}

impl From<MarketRow> for CryptoPrice {
    fn from(row: MarketRow) -> Self {
        Self {
            id: row.id,
            symbol: row.symbol.to_uppercase(),
            name: row.name,
            current_price: row.current_price.unwrap_or_default(),
            price_change_percentage_24h: row.price_change_percentage_24h.unwrap_or_default(),
            market_cap: row.market_cap.unwrap_or_default(),
            high_24h: row.high_24h.unwrap_or_default(),
            low_24h: row.low_24h.unwrap_or_default(),
            last_updated: row.last_updated.unwrap_or_default(),
        }
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CoinGeckoClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// GET /coins/markets for the tracked coins
    pub async fn get_markets(&self) -> Result<Vec<CryptoPrice>> {
        let ids = TRACKED_COINS
            .iter()
            .map(|(_, id)| *id)
            .collect::<Vec<_>>()
            .join(",");
        let url = format!("{}/coins/markets", self.base_url);
        debug!(ids = %ids, "Fetching CoinGecko markets");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("ids", ids.as_str()),
                ("order", "market_cap_desc"),
                ("per_page", "6"),
                ("page", "1"),
                ("sparkline", "false"),
                ("price_change_percentage", "24h"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko markets error {}: {}", status, body);
        }

        let rows: Vec<MarketRow> = response.json().await?;
        debug!(count = rows.len(), "Fetched CoinGecko markets");
        Ok(rows.into_iter().map(CryptoPrice::from).collect())
    }

    /// GET /coins/{id}/market_chart - hourly for a single day, daily otherwise
    pub async fn get_market_chart(&self, coin_id: &str, days: u32) -> Result<HistoricalData> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        let interval = if days <= 1 { "hourly" } else { "daily" };
        debug!(coin_id, days, interval, "Fetching CoinGecko market chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd".to_string()),
                ("days", days.to_string()),
                ("interval", interval.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("CoinGecko market chart error {}: {}", status, body);
        }

        Ok(response.json().await?)
    }

    /// Market chart, or a synthetic random walk when CoinGecko is unavailable
    pub async fn historical_or_mock(&self, coin_id: &str, days: u32) -> HistoricalData {
        match self.get_market_chart(coin_id, days).await {
            Ok(data) => data,
            Err(e) => {
                warn!(coin_id, error = %e, "CoinGecko unavailable, serving mock history");
                let now = Utc::now().timestamp_millis();
                mock::mock_historical_data(days, now, &mut rand::thread_rng())
            }
        }
    }

    /// Ticker prices, or the fixture list when CoinGecko is unavailable
    pub async fn prices_or_mock(&self) -> Vec<CryptoPrice> {
        match self.get_markets().await {
            Ok(prices) if !prices.is_empty() => prices,
            Ok(_) => mock::mock_prices(Utc::now()),
            Err(e) => {
                warn!(error = %e, "CoinGecko unavailable, serving mock prices");
                mock::mock_prices(Utc::now())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_market_row_conversion() {
        let row: MarketRow = serde_json::from_value(json!({
            "id": "solana",
            "symbol": "sol",
            "name": "Solana",
            "current_price": 180.5,
            "price_change_percentage_24h": -1.25,
            "market_cap": 84000000000.0,
            "high_24h": 185.0,
            "low_24h": null,
            "last_updated": "2025-10-01T00:00:00.000Z"
        }))
        .unwrap();

        let price = CryptoPrice::from(row);
        assert_eq!(price.symbol, "SOL");
        assert_eq!(price.current_price, 180.5);
        assert_eq!(price.low_24h, 0.0);
    }

    #[test]
    fn test_market_chart_payload_decodes() {
        let data: HistoricalData = serde_json::from_value(json!({
            "prices": [[1700000000000.0, 95000.5], [1700003600000.0, 95100.0]],
            "market_caps": [[1700000000000.0, 1.8e12]],
            "total_volumes": []
        }))
        .unwrap();
        assert_eq!(data.prices.len(), 2);
        assert_eq!(data.prices[1].1, 95100.0);
    }

    #[test]
    fn test_tracked_coins_cover_the_ticker() {
        let symbols: Vec<&str> = TRACKED_COINS.iter().map(|(s, _)| *s).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "SOL", "BNB", "DOGE", "XRP"]);
    }
}
