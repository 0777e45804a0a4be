//! Synthetic value-history generator
//!
//! Walks a model's account value from a known starting point to a known final
//! value. A trend shape supplies the deterministic envelope (bias plus a fixed
//! sinusoid); volatility scales the random perturbation, the per-step market
//! noise and the occasional shock. The last point is always overwritten with
//! the exact final value, so charts end where the leaderboard says they do.
//!
//! The random source is injected: pass a seeded `StdRng` for reproducible
//! output, or `thread_rng()` for presentation data.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::types::ValuePoint;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const DEFAULT_POINTS_PER_DAY: u32 = 24;

/// Chance per step of a news-style shock
const SHOCK_PROBABILITY: f64 = 0.05;
const MARKET_NOISE_FACTOR: f64 = 0.5;
const SHOCK_FACTOR: f64 = 2.0;
/// Noise and shocks move the running value by this fraction per unit of volatility
const RELATIVE_NOISE_SCALE: f64 = 0.01;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryConfigError {
    #[error("unknown trend shape '{0}' (expected aggressive, moderate, stable, declining or volatile)")]
    UnknownTrendShape(String),

    #[error("days must be at least 1, got {0}")]
    InvalidDays(u32),

    #[error("points per day must be at least 1 and divide a day into whole milliseconds, got {0}")]
    InvalidPointsPerDay(u32),

    #[error("initial value must be positive and finite, got {0}")]
    InvalidInitialValue(f64),

    #[error("final value must be non-negative and finite, got {0}")]
    InvalidFinalValue(f64),

    #[error("volatility must be non-negative and finite, got {0}")]
    InvalidVolatility(f64),
}

// ---------------------------------------------------------------------------
// Trend shapes
// ---------------------------------------------------------------------------

/// Envelope policy the random walk follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendShape {
    /// Early pump, late correction, wide swings
    Aggressive,
    /// Steady bias with moderate oscillation
    Moderate,
    /// Low amplitude, mild growth
    Stable,
    /// Monotonic bias with small rebounds
    Declining,
    /// Pump-then-dump with high-frequency chop
    Volatile,
}

/// Fixed sinusoid and noise scale for one shape
struct ShapeProfile {
    /// Full cycles across the whole span
    wave_cycles: f64,
    wave_amplitude: f64,
    /// Multiplier on volatility for the per-step perturbation
    perturbation_scale: f64,
}

impl TrendShape {
    pub const ALL: [TrendShape; 5] = [
        TrendShape::Aggressive,
        TrendShape::Moderate,
        TrendShape::Stable,
        TrendShape::Declining,
        TrendShape::Volatile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Moderate => "moderate",
            Self::Stable => "stable",
            Self::Declining => "declining",
            Self::Volatile => "volatile",
        }
    }

    fn profile(&self) -> ShapeProfile {
        match self {
            Self::Aggressive => ShapeProfile {
                wave_cycles: 3.0,
                wave_amplitude: 1.5,
                perturbation_scale: 6.0,
            },
            Self::Moderate => ShapeProfile {
                wave_cycles: 2.0,
                wave_amplitude: 0.5,
                perturbation_scale: 3.0,
            },
            Self::Stable => ShapeProfile {
                wave_cycles: 1.0,
                wave_amplitude: 0.15,
                perturbation_scale: 1.5,
            },
            Self::Declining => ShapeProfile {
                wave_cycles: 6.0,
                wave_amplitude: 0.8,
                perturbation_scale: 2.0,
            },
            Self::Volatile => ShapeProfile {
                wave_cycles: 12.0,
                wave_amplitude: 1.0,
                perturbation_scale: 5.0,
            },
        }
    }

    /// Deterministic bias at `progress` in [0, 1]. Each base averages to 1 over
    /// the span so the walk lands near the final value before the override.
    fn base_multiplier(&self, progress: f64) -> f64 {
        match self {
            Self::Aggressive => {
                if progress < 0.7 {
                    1.6
                } else {
                    -0.4
                }
            }
            Self::Moderate => 1.0,
            Self::Stable => 0.9 + 0.2 * progress,
            Self::Declining => 1.5 - progress,
            Self::Volatile => 1.0 + 3.0 * (PI * progress).cos(),
        }
    }

    /// Multiplier applied to the mean per-step increment
    pub fn trend_multiplier(&self, progress: f64) -> f64 {
        let profile = self.profile();
        let wave = profile.wave_amplitude * (2.0 * PI * profile.wave_cycles * progress).sin();
        self.base_multiplier(progress) + wave
    }

    pub fn perturbation_scale(&self) -> f64 {
        self.profile().perturbation_scale
    }
}

impl std::fmt::Display for TrendShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendShape {
    type Err = HistoryConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aggressive" => Ok(Self::Aggressive),
            "moderate" => Ok(Self::Moderate),
            "stable" => Ok(Self::Stable),
            "declining" => Ok(Self::Declining),
            "volatile" => Ok(Self::Volatile),
            _ => Err(HistoryConfigError::UnknownTrendShape(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Which endpoints are forced to their exact values after the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPinning {
    /// Only the last point; the first keeps its step-zero perturbation
    #[default]
    FinalOnly,
    /// First point set to the initial value as well
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesParams {
    pub initial_value: f64,
    pub final_value: f64,
    pub volatility: f64,
    pub trend_shape: TrendShape,
    pub days: u32,
    pub points_per_day: u32,
    #[serde(default)]
    pub pinning: EndpointPinning,
}

impl SeriesParams {
    pub fn new(
        initial_value: f64,
        final_value: f64,
        volatility: f64,
        trend_shape: TrendShape,
        days: u32,
    ) -> Self {
        Self {
            initial_value,
            final_value,
            volatility,
            trend_shape,
            days,
            points_per_day: DEFAULT_POINTS_PER_DAY,
            pinning: EndpointPinning::FinalOnly,
        }
    }

    pub fn with_points_per_day(mut self, points_per_day: u32) -> Self {
        self.points_per_day = points_per_day;
        self
    }

    pub fn with_pinning(mut self, pinning: EndpointPinning) -> Self {
        self.pinning = pinning;
        self
    }

    pub fn validate(&self) -> Result<(), HistoryConfigError> {
        if self.days == 0 {
            return Err(HistoryConfigError::InvalidDays(self.days));
        }
        if self.points_per_day == 0 || DAY_MS % self.points_per_day as i64 != 0 {
            return Err(HistoryConfigError::InvalidPointsPerDay(self.points_per_day));
        }
        if !self.initial_value.is_finite() || self.initial_value <= 0.0 {
            return Err(HistoryConfigError::InvalidInitialValue(self.initial_value));
        }
        if !self.final_value.is_finite() || self.final_value < 0.0 {
            return Err(HistoryConfigError::InvalidFinalValue(self.final_value));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(HistoryConfigError::InvalidVolatility(self.volatility));
        }
        Ok(())
    }

    /// Number of steps; the series has one more point than this
    pub fn total_steps(&self) -> u64 {
        self.days as u64 * self.points_per_day as u64
    }

    /// Spacing between consecutive points in milliseconds
    pub fn interval_ms(&self) -> i64 {
        DAY_MS / self.points_per_day as i64
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Generate a series ending at the current wall-clock time.
pub fn generate<R: Rng + ?Sized>(
    params: &SeriesParams,
    rng: &mut R,
) -> Result<Vec<ValuePoint>, HistoryConfigError> {
    generate_at(params, Utc::now().timestamp_millis(), rng)
}

/// Generate a series whose last point is stamped `end_time_ms`.
///
/// Either the whole series is returned or a configuration error is raised
/// before any point is produced.
pub fn generate_at<R: Rng + ?Sized>(
    params: &SeriesParams,
    end_time_ms: i64,
    rng: &mut R,
) -> Result<Vec<ValuePoint>, HistoryConfigError> {
    params.validate()?;

    let total = params.total_steps();
    let interval = params.interval_ms();
    let step = (params.final_value - params.initial_value) / total as f64;
    let shape = params.trend_shape;
    let perturbation_range = params.volatility * shape.perturbation_scale();
    let noise_range = MARKET_NOISE_FACTOR * params.volatility * RELATIVE_NOISE_SCALE;
    let shock_range = SHOCK_FACTOR * params.volatility * RELATIVE_NOISE_SCALE;

    let mut points = Vec::with_capacity(total as usize + 1);
    let mut current = params.initial_value;

    for i in 0..=total {
        let progress = i as f64 / total as f64;
        let trend = shape.trend_multiplier(progress);
        let perturbation = unit_draw(rng) * perturbation_range;

        current += step * trend + step * perturbation;
        current += current * unit_draw(rng) * noise_range;

        if rng.gen_bool(SHOCK_PROBABILITY) {
            current += current * unit_draw(rng) * shock_range;
        }

        current = current.max(0.0);

        points.push(ValuePoint {
            timestamp: end_time_ms - (total - i) as i64 * interval,
            value: current,
        });
    }

    if params.pinning == EndpointPinning::Both {
        if let Some(first) = points.first_mut() {
            first.value = params.initial_value;
        }
    }
    if let Some(last) = points.last_mut() {
        last.value = params.final_value;
    }

    debug!(
        shape = %shape,
        points = points.len(),
        initial = params.initial_value,
        final_value = params.final_value,
        "Generated value history"
    );

    Ok(points)
}

/// Uniform draw in [-1, 1]
fn unit_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(-1.0..=1.0)
}

/// Points at or after `now_ms - days`, in input order.
pub fn trailing_window(points: &[ValuePoint], days: u32, now_ms: i64) -> Vec<ValuePoint> {
    let cutoff = now_ms - days as i64 * DAY_MS;
    points
        .iter()
        .filter(|p| p.timestamp >= cutoff)
        .copied()
        .collect()
}
