//! Mock fixtures for running the dashboard without a backend
//!
//! Seven models with fixed final account values, each walked from 10 000 by
//! the value-history generator using its own trend shape and volatility.
//! Trades and positions are synthetic; chats, prices and seasons are scripted.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{
    AiModel, AutomatedChat, ChatSection, CryptoPrice, HistoricalData, ModelStatus, Position,
    Season, SeasonStatus, Trade, TradeDirection, TradingDecision,
};
use crate::value_history::{
    self, HistoryConfigError, SeriesParams, TrendShape, DEFAULT_POINTS_PER_DAY,
};

pub const INITIAL_ACCOUNT_VALUE: f64 = 10_000.0;

const TRADE_SYMBOLS: [&str; 6] = ["BTC", "ETH", "SOL", "BNB", "DOGE", "XRP"];
const POSITION_SYMBOLS: [&str; 3] = ["BTC", "ETH", "SOL"];
const HOUR_MS: i64 = 60 * 60 * 1000;

// ---------------------------------------------------------------------------
// Model roster
// ---------------------------------------------------------------------------

/// Static description of one mock model
#[derive(Debug, Clone, Copy)]
pub struct ModelProfile {
    pub id: &'static str,
    pub display_name: &'static str,
    pub color: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub current_value: f64,
    pub win_rate: f64,
    pub total_trades: u32,
    pub trend_shape: TrendShape,
    pub volatility: f64,
}

pub const MODEL_PROFILES: [ModelProfile; 7] = [
    ModelProfile {
        id: "gpt-6",
        display_name: "GPT 6",
        color: "#000000",
        icon: "🤖",
        description: "GPT-6 model with conservative strategy",
        current_value: 2969.21,
        win_rate: 42.3,
        total_trades: 145,
        trend_shape: TrendShape::Declining,
        volatility: 1.0,
    },
    ModelProfile {
        id: "claude-sonnet-4.1",
        display_name: "CLAUDE SONNET 4.1",
        color: "#ff8c00",
        icon: "🎭",
        description: "Claude Sonnet with balanced approach",
        current_value: 9253.76,
        win_rate: 58.2,
        total_trades: 198,
        trend_shape: TrendShape::Moderate,
        volatility: 0.5,
    },
    ModelProfile {
        id: "gemini-2.5-pro",
        display_name: "GEMINI 2.5 PRO",
        color: "#9370db",
        icon: "💎",
        description: "Gemini 2.5 Pro multi-modal strategy",
        current_value: 3360.21,
        win_rate: 45.8,
        total_trades: 167,
        trend_shape: TrendShape::Volatile,
        volatility: 0.9,
    },
    ModelProfile {
        id: "grok-4",
        display_name: "GROK 4",
        color: "#4169e1",
        icon: "⚡",
        description: "Grok 4 with real-time analysis",
        current_value: 9022.15,
        win_rate: 55.4,
        total_trades: 176,
        trend_shape: TrendShape::Stable,
        volatility: 0.4,
    },
    ModelProfile {
        id: "deepseek-chat-v3.1",
        display_name: "DEEPSEEK CHAT V3.1",
        color: "#00ced1",
        icon: "🔍",
        description: "DeepSeek with deep learning insights",
        current_value: 13332.61,
        win_rate: 67.9,
        total_trades: 223,
        trend_shape: TrendShape::Moderate,
        volatility: 0.6,
    },
    ModelProfile {
        id: "qwen3-max",
        display_name: "QWEN3 MAX",
        color: "#6a5acd",
        icon: "🏆",
        description: "Qwen3 Max leading performer",
        current_value: 17130.8,
        win_rate: 73.5,
        total_trades: 241,
        trend_shape: TrendShape::Aggressive,
        volatility: 0.8,
    },
    ModelProfile {
        id: "btc-buyhold",
        display_name: "BTC BUY&HOLD",
        color: "#87ceeb",
        icon: "₿",
        description: "Bitcoin baseline strategy",
        current_value: 10446.61,
        win_rate: 100.0,
        total_trades: 1,
        trend_shape: TrendShape::Stable,
        volatility: 0.3,
    },
];

/// Knobs for fixture generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockSettings {
    pub history_days: u32,
    pub points_per_day: u32,
    pub trades_per_model: usize,
}

impl Default for MockSettings {
    fn default() -> Self {
        Self {
            history_days: 7,
            points_per_day: DEFAULT_POINTS_PER_DAY,
            trades_per_model: 30,
        }
    }
}

/// Percent return rounded to two decimals
pub fn performance_pct(initial: f64, current: f64) -> f64 {
    ((current - initial) / initial * 10_000.0).round() / 100.0
}

/// Build the roster with generated histories, ranked by performance.
pub fn build_models<R: Rng + ?Sized>(
    settings: &MockSettings,
    now_ms: i64,
    rng: &mut R,
) -> Result<Vec<AiModel>, HistoryConfigError> {
    let mut models = MODEL_PROFILES
        .iter()
        .map(|profile| {
            let params = SeriesParams::new(
                INITIAL_ACCOUNT_VALUE,
                profile.current_value,
                profile.volatility,
                profile.trend_shape,
                settings.history_days,
            )
            .with_points_per_day(settings.points_per_day);
            let history = value_history::generate_at(&params, now_ms, &mut *rng)?;

            Ok(AiModel {
                id: profile.id.to_string(),
                name: profile.id.to_string(),
                display_name: profile.display_name.to_string(),
                initial_value: INITIAL_ACCOUNT_VALUE,
                current_value: profile.current_value,
                performance: performance_pct(INITIAL_ACCOUNT_VALUE, profile.current_value),
                color: Some(profile.color.to_string()),
                icon: Some(profile.icon.to_string()),
                status: ModelStatus::Active,
                description: Some(profile.description.to_string()),
                rank: None,
                win_rate: Some(profile.win_rate),
                total_trades: Some(profile.total_trades),
                value_history: history,
            })
        })
        .collect::<Result<Vec<_>, HistoryConfigError>>()?;

    assign_ranks(&mut models);
    Ok(models)
}

/// Rank 1 = best performance. Roster order is preserved.
pub fn assign_ranks(models: &mut [AiModel]) {
    let mut order: Vec<usize> = (0..models.len()).collect();
    order.sort_by(|&a, &b| {
        models[b]
            .performance
            .partial_cmp(&models[a].performance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (rank, idx) in order.into_iter().enumerate() {
        models[idx].rank = Some(rank as u32 + 1);
    }
}

// ---------------------------------------------------------------------------
// Trades & positions
// ---------------------------------------------------------------------------

pub fn iso_millis(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_default()
}

/// Epoch millis of an RFC 3339 timestamp, 0 when unparseable
pub fn parse_millis(ts: &str) -> i64 {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

/// `"45M"` below an hour, `"3H 7M"` above
pub fn format_holding_time(minutes: u32) -> String {
    if minutes < 60 {
        format!("{}M", minutes)
    } else {
        format!("{}H {}M", minutes / 60, minutes % 60)
    }
}

/// `count` closed trades, one per hour, the last one an hour before `now_ms`.
pub fn generate_trades<R: Rng + ?Sized>(
    model_id: &str,
    model_name: &str,
    count: usize,
    now_ms: i64,
    rng: &mut R,
) -> Vec<Trade> {
    (0..count)
        .map(|i| {
            let symbol = TRADE_SYMBOLS[rng.gen_range(0..TRADE_SYMBOLS.len())];
            let direction = if rng.gen_bool(0.5) {
                TradeDirection::Long
            } else {
                TradeDirection::Short
            };

            let entry_price = rng.gen_range(10.0..110.0);
            let exit_price = entry_price * (1.0 + rng.gen_range(-0.05..0.05));
            let quantity = rng.gen_range(100.0..1100.0);
            let entry_notional = entry_price * quantity;
            let exit_notional = exit_price * quantity;

            let pnl = match direction {
                TradeDirection::Long => exit_notional - entry_notional,
                TradeDirection::Short => entry_notional - exit_notional,
            };

            Trade {
                id: format!("{}-trade-{}", model_id, i),
                model_id: model_id.to_string(),
                model_name: model_name.to_string(),
                symbol: symbol.to_string(),
                direction,
                entry_price,
                exit_price,
                quantity,
                entry_notional,
                exit_notional,
                holding_time: format_holding_time(rng.gen_range(0..1440)),
                pnl,
                pnl_percent: pnl / entry_notional * 100.0,
                timestamp: iso_millis(now_ms - (count - i) as i64 * HOUR_MS),
            }
        })
        .collect()
}

/// One open position per tracked symbol, opened within the last day.
pub fn generate_positions<R: Rng + ?Sized>(
    model_id: &str,
    now_ms: i64,
    rng: &mut R,
) -> Vec<Position> {
    POSITION_SYMBOLS
        .iter()
        .enumerate()
        .map(|(index, symbol)| {
            let entry_price = rng.gen_range(50.0..150.0);
            let current_price = entry_price * (1.0 + rng.gen_range(-0.1..0.1));
            let amount = rng.gen_range(1.0..11.0);
            let opened_ago = rng.gen_range(0..24 * HOUR_MS);

            Position {
                id: format!("{}-pos-{}", model_id, index),
                model_id: model_id.to_string(),
                symbol: symbol.to_string(),
                amount,
                entry_price,
                current_price,
                profit: (current_price - entry_price) * amount,
                profit_percent: (current_price - entry_price) / entry_price * 100.0,
                timestamp: iso_millis(now_ms - opened_ago),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scripted feeds
// ---------------------------------------------------------------------------

fn decisions(rows: &[(&str, f64, &str, u8)]) -> Vec<TradingDecision> {
    rows.iter()
        .map(|(symbol, quantity, action, confidence)| TradingDecision {
            symbol: symbol.to_string(),
            quantity: *quantity,
            action: action.to_string(),
            confidence: *confidence,
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn chat(
    id: &str,
    profile_id: &str,
    minutes_ago: i64,
    content: &str,
    prompt: &str,
    thought: &str,
    rows: &[(&str, f64, &str, u8)],
    now: DateTime<Utc>,
) -> AutomatedChat {
    let profile = MODEL_PROFILES.iter().find(|p| p.id == profile_id);
    AutomatedChat {
        id: id.to_string(),
        model_id: profile_id.to_string(),
        model_name: profile
            .map(|p| p.display_name.to_string())
            .unwrap_or_else(|| profile_id.to_uppercase()),
        icon: profile.map(|p| p.icon.to_string()).unwrap_or_default(),
        content: content.to_string(),
        timestamp: (now - Duration::minutes(minutes_ago))
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        expandable: true,
        sections: vec![
            ChatSection::UserPrompt {
                content: prompt.to_string(),
                expanded: false,
            },
            ChatSection::ChainOfThought {
                content: thought.to_string(),
                expanded: false,
            },
            ChatSection::TradingDecisions {
                content: decisions(rows),
                expanded: false,
            },
        ],
    }
}

/// Five chat messages, one minute apart, newest first
pub fn scripted_chats(now: DateTime<Utc>) -> Vec<AutomatedChat> {
    vec![
        chat(
            "1",
            "claude-sonnet-4.1",
            1,
            "XRP is carrying the book on strong upward momentum while BTC, ETH and SOL sit inside their invalidation levels. Holding everything and waiting for confirmation before touching the oversold BNB setup.",
            "What is your current trading status and position analysis?",
            "XRP momentum intact. BTC, ETH, SOL within risk limits. BNB oversold but no confirmation signal yet.",
            &[
                ("XRP", 3609.0, "HOLD", 85),
                ("BTC", 0.12, "HOLD", 75),
                ("ETH", 26.05, "HOLD", 70),
                ("SOL", 81.81, "HOLD", 65),
                ("BNB", 3.21, "WATCH", 60),
            ],
            now,
        ),
        chat(
            "2",
            "gpt-6",
            2,
            "MACD has not triggered any exit plan, so every position stays open. SOL is close to its stop and gets watched tick by tick; BTC and BNB turned green but the account is still deep underwater.",
            "How are your current positions performing and what are your risk management strategies?",
            "No MACD exit signals. SOL near stop-loss. BTC and BNB recovered. Portfolio drawdown persists.",
            &[
                ("BTC", 0.12, "HOLD", 80),
                ("BNB", 3.21, "HOLD", 75),
                ("SOL", 81.81, "MONITOR", 50),
                ("ETH", 26.05, "HOLD", 70),
            ],
            now,
        ),
        chat(
            "3",
            "qwen3-max",
            3,
            "Up 70% on the season. Riding the 20x BTC long toward $112k and bailing on a 4h close under $105k. Small cash buffer kept for new plays.",
            "What is your current performance and BTC position strategy?",
            "Season return ~70%. Leveraged BTC long with a defined 4h-close invalidation. Cash reserve retained.",
            &[("BTC", 0.12, "HOLD", 90), ("CASH", 97.0, "RESERVE", 100)],
            now,
        ),
        chat(
            "4",
            "deepseek-chat-v3.1",
            4,
            "ETH, SOL, XRP, BTC, DOGE and BNB are all holding with no invalidation hit, keeping the return above 30%. Stops are far from price and the technical picture is unchanged.",
            "What is your current portfolio performance and position status?",
            "Return above 30%. No invalidation conditions met. Stops well below market.",
            &[
                ("ETH", 26.05, "HOLD", 85),
                ("SOL", 81.81, "HOLD", 80),
                ("XRP", 3609.0, "HOLD", 75),
                ("BTC", 0.12, "HOLD", 85),
                ("DOGE", 27858.0, "HOLD", 70),
                ("BNB", 3.21, "HOLD", 75),
            ],
            now,
        ),
        chat(
            "5",
            "gemini-2.5-pro",
            5,
            "Every signal is still valid and adding size would over-lever the account, so nothing new goes on. ETH is slightly red but recovering; the rest is green and the DOGE short behaves.",
            "What is your current position status and risk management approach?",
            "Signals valid. Leverage cap reached. ETH recovering, others profitable, DOGE short on plan.",
            &[
                ("ETH", 26.05, "HOLD", 65),
                ("SOL", 81.81, "HOLD", 80),
                ("XRP", 3609.0, "HOLD", 75),
                ("BTC", 0.12, "HOLD", 85),
                ("DOGE", 27858.0, "HOLD", 70),
                ("BNB", 3.21, "HOLD", 80),
            ],
            now,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn price(
    id: &str,
    symbol: &str,
    name: &str,
    current: f64,
    change: f64,
    market_cap: f64,
    high: f64,
    low: f64,
    updated: &str,
) -> CryptoPrice {
    CryptoPrice {
        id: id.to_string(),
        symbol: symbol.to_string(),
        name: name.to_string(),
        current_price: current,
        price_change_percentage_24h: change,
        market_cap,
        high_24h: high,
        low_24h: low,
        last_updated: updated.to_string(),
    }
}

/// Fixture ticker for the six tracked coins
pub fn mock_prices(now: DateTime<Utc>) -> Vec<CryptoPrice> {
    let ts = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    vec![
        price("bitcoin", "BTC", "Bitcoin", 111_462.50, 2.5, 2.2e12, 112_000.0, 108_000.0, &ts),
        price("ethereum", "ETH", "Ethereum", 3456.78, -1.2, 4.15e11, 3500.0, 3400.0, &ts),
        price("solana", "SOL", "Solana", 95.45, 3.8, 4.2e10, 98.0, 92.0, &ts),
        price("binancecoin", "BNB", "BNB", 320.15, 0.8, 4.8e10, 325.0, 315.0, &ts),
        price("dogecoin", "DOGE", "Dogecoin", 0.08234, -2.1, 1.18e10, 0.085, 0.080, &ts),
        price("ripple", "XRP", "XRP", 0.5234, 1.5, 2.9e10, 0.53, 0.51, &ts),
    ]
}

/// A completed preseason and the running season
pub fn mock_seasons(now: DateTime<Utc>) -> Vec<Season> {
    let fmt = |dt: DateTime<Utc>| dt.to_rfc3339_opts(SecondsFormat::Secs, true);
    vec![
        Season {
            id: "season-0".to_string(),
            name: "Preseason".to_string(),
            status: SeasonStatus::Completed,
            start_date: fmt(now - Duration::days(21)),
            end_date: Some(fmt(now - Duration::days(7))),
            initial_capital: INITIAL_ACCOUNT_VALUE,
            description: Some("Warm-up round on a reduced coin set".to_string()),
        },
        Season {
            id: "season-1".to_string(),
            name: "Season 1".to_string(),
            status: SeasonStatus::Active,
            start_date: fmt(now - Duration::days(7)),
            end_date: None,
            initial_capital: INITIAL_ACCOUNT_VALUE,
            description: Some("Seven models, six coins, real-time perpetuals".to_string()),
        },
    ]
}

/// 100-point random walk around 95 000, spread evenly over `days`
pub fn mock_historical_data<R: Rng + ?Sized>(days: u32, now_ms: i64, rng: &mut R) -> HistoricalData {
    const POINTS: i64 = 100;
    let interval = days.max(1) as f64 * value_history::DAY_MS as f64 / POINTS as f64;

    let mut data = HistoricalData::default();
    let mut price = 95_000.0_f64;

    for i in 0..POINTS {
        let timestamp = now_ms as f64 - (POINTS - i) as f64 * interval;
        price = (price + rng.gen_range(-1000.0..1000.0)).max(0.0);

        data.prices.push((timestamp, price));
        data.market_caps.push((timestamp, price * 19_000_000.0));
        data.total_volumes
            .push((timestamp, rng.gen_range(0.0..50_000_000_000.0)));
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NOW: i64 = 1_760_000_000_000;

    #[test]
    fn test_build_models_pins_final_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let models = build_models(&MockSettings::default(), NOW, &mut rng).unwrap();

        assert_eq!(models.len(), MODEL_PROFILES.len());
        for (model, profile) in models.iter().zip(MODEL_PROFILES.iter()) {
            assert_eq!(model.id, profile.id);
            assert_eq!(model.value_history.len(), 7 * 24 + 1);
            assert_eq!(model.value_history.last().unwrap().value, profile.current_value);
            assert_eq!(model.value_history.last().unwrap().timestamp, NOW);
        }
    }

    #[test]
    fn test_ranks_follow_performance() {
        let mut rng = StdRng::seed_from_u64(2);
        let models = build_models(&MockSettings::default(), NOW, &mut rng).unwrap();
        let rank_of = |id: &str| models.iter().find(|m| m.id == id).unwrap().rank;

        assert_eq!(rank_of("qwen3-max"), Some(1));
        assert_eq!(rank_of("deepseek-chat-v3.1"), Some(2));
        assert_eq!(rank_of("btc-buyhold"), Some(3));
        assert_eq!(rank_of("gpt-6"), Some(7));
    }

    #[test]
    fn test_performance_pct() {
        assert_eq!(performance_pct(10_000.0, 17_130.8), 71.31);
        assert_eq!(performance_pct(10_000.0, 10_000.0), 0.0);
        assert_eq!(performance_pct(10_000.0, 2_969.21), -70.31);
    }

    #[test]
    fn test_holding_time_format() {
        assert_eq!(format_holding_time(0), "0M");
        assert_eq!(format_holding_time(59), "59M");
        assert_eq!(format_holding_time(60), "1H 0M");
        assert_eq!(format_holding_time(187), "3H 7M");
    }

    #[test]
    fn test_trade_pnl_matches_direction() {
        let mut rng = StdRng::seed_from_u64(3);
        let trades = generate_trades("grok-4", "GROK 4", 30, NOW, &mut rng);
        assert_eq!(trades.len(), 30);

        for t in &trades {
            let expected = match t.direction {
                TradeDirection::Long => t.exit_notional - t.entry_notional,
                TradeDirection::Short => t.entry_notional - t.exit_notional,
            };
            assert!((t.pnl - expected).abs() < 1e-9);
            assert!((t.exit_price / t.entry_price - 1.0).abs() <= 0.05);
            assert!(TRADE_SYMBOLS.contains(&t.symbol.as_str()));
        }

        // Hourly spacing, oldest first
        assert_eq!(parse_millis(&trades[0].timestamp), NOW - 30 * HOUR_MS);
        assert_eq!(parse_millis(&trades[29].timestamp), NOW - HOUR_MS);
    }

    #[test]
    fn test_positions_cover_tracked_symbols() {
        let mut rng = StdRng::seed_from_u64(4);
        let positions = generate_positions("qwen3-max", NOW, &mut rng);
        let symbols: Vec<&str> = positions.iter().map(|p| p.symbol.as_str()).collect();
        assert_eq!(symbols, POSITION_SYMBOLS.to_vec());
        for p in &positions {
            assert!((p.current_price / p.entry_price - 1.0).abs() <= 0.1);
            assert!(parse_millis(&p.timestamp) > NOW - 24 * HOUR_MS);
        }
    }

    #[test]
    fn test_scripted_chats_reference_roster() {
        let chats = scripted_chats(Utc::now());
        assert_eq!(chats.len(), 5);
        for c in &chats {
            assert!(MODEL_PROFILES.iter().any(|p| p.id == c.model_id));
            assert_eq!(c.sections.len(), 3);
        }
    }

    #[test]
    fn test_mock_history_shape() {
        let mut rng = StdRng::seed_from_u64(5);
        let data = mock_historical_data(7, NOW, &mut rng);
        assert_eq!(data.prices.len(), 100);
        assert_eq!(data.market_caps.len(), 100);
        assert!(data.prices.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(data.prices.last().unwrap().0 < NOW as f64);
    }

    #[test]
    fn test_exactly_one_active_season() {
        let seasons = mock_seasons(Utc::now());
        assert_eq!(
            seasons
                .iter()
                .filter(|s| s.status == SeasonStatus::Active)
                .count(),
            1
        );
    }
}
