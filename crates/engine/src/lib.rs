//! Arena Engine: data layer for the AI trading arena dashboard
//!
//! Provides:
//! - Value-history generator (trend shapes, seeded or thread RNG)
//! - Mock fixtures for models, trades, positions, chats, prices and seasons
//! - Data services over the fixtures or the arena backend API
//! - TTL cache for upstream responses
//! - CoinGecko client for ticker prices and market charts
//! - Dashboard view state and chart projection

pub mod api;
pub mod cache;
pub mod dashboard;
pub mod data_service;
pub mod error;
pub mod mock;
pub mod types;
pub mod value_history;

// Re-exports for convenience
pub use api::{CoinGeckoClient, UpstreamClient};
pub use cache::TtlCache;
pub use dashboard::{ChartSeries, DashboardState, DisplayMode, TimeRange};
pub use data_service::{ApiDataService, DataService, DataSourceInfo, MockDataService};
pub use error::{DataError, DataResult};
pub use mock::MockSettings;
pub use value_history::{EndpointPinning, HistoryConfigError, SeriesParams, TrendShape};
