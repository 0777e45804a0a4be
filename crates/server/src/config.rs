//! Environment-driven server configuration (`.env` is loaded by `main`)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use arena_engine::MockSettings;

const DEFAULT_API_BASE: &str = "http://localhost:3001/api";
const DEFAULT_COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub use_mock: bool,
    pub api_base: String,
    pub coingecko_base: String,
    pub models_ttl: Duration,
    pub prices_ttl: Duration,
    pub seasons_ttl: Duration,
    pub mock: MockSettings,
    pub static_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset or unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mock_defaults = MockSettings::default();

        Self {
            // Unset counts as "true"; only the exact string enables mock mode otherwise
            use_mock: lookup("ARENA_USE_MOCK").map_or(true, |v| v == "true"),
            api_base: lookup("ARENA_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            coingecko_base: lookup("ARENA_COINGECKO_BASE")
                .unwrap_or_else(|| DEFAULT_COINGECKO_BASE.to_string()),
            models_ttl: Duration::from_secs(parse_or(lookup("ARENA_MODELS_CACHE_SECS"), 30)),
            prices_ttl: Duration::from_secs(parse_or(lookup("ARENA_PRICES_CACHE_SECS"), 30)),
            seasons_ttl: Duration::from_secs(parse_or(lookup("ARENA_SEASONS_CACHE_SECS"), 60)),
            mock: MockSettings {
                history_days: parse_or(lookup("ARENA_HISTORY_DAYS"), mock_defaults.history_days),
                points_per_day: parse_or(
                    lookup("ARENA_POINTS_PER_DAY"),
                    mock_defaults.points_per_day,
                ),
                ..mock_defaults
            },
            static_dir: lookup("ARENA_STATIC_DIR").map(PathBuf::from),
        }
    }

    /// `ARENA_STATIC_DIR`, else `dist/` next to the executable, else `./dist`
    pub fn resolve_static_dir(&self) -> PathBuf {
        if let Some(dir) = &self.static_dir {
            return dir.clone();
        }
        let exe_path = std::env::current_exe().unwrap_or_default();
        let exe_dir = exe_path.parent().unwrap_or(std::path::Path::new("."));
        let dist_dir = exe_dir.join("dist");
        if dist_dir.exists() {
            dist_dir
        } else {
            PathBuf::from("dist")
        }
    }
}

/// Parse into the target type; missing, malformed or out-of-range values give `default`
fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
