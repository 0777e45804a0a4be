pub mod coingecko;
pub mod upstream;

pub use coingecko::CoinGeckoClient;
pub use upstream::UpstreamClient;
