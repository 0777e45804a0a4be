//! Dashboard view state and chart projection
//!
//! Holds what the renderer needs to decide which models to draw and how:
//! the selected model, the time range and whether values are shown in
//! dollars or as percent change.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{AiModel, ValuePoint};
use crate::value_history::trailing_window;

/// Sentinel for "every model"
pub const ALL_MODELS: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "ALL")]
    All,
    #[serde(rename = "72H")]
    Last72Hours,
}

impl TimeRange {
    pub fn days(&self) -> u32 {
        match self {
            Self::All => 7,
            Self::Last72Hours => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Last72Hours => "72H",
        }
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ALL" => Ok(Self::All),
            "72H" => Ok(Self::Last72Hours),
            other => Err(format!("unknown time range: {}", other)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    #[serde(rename = "$")]
    Dollars,
    #[serde(rename = "%")]
    Percent,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dollars => "$",
            Self::Percent => "%",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(Self::Dollars),
            "%" => Ok(Self::Percent),
            other => Err(format!("unknown display mode: {}", other)),
        }
    }
}

/// One line on the chart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub model_id: String,
    pub display_name: String,
    pub color: Option<String>,
    pub points: Vec<ValuePoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub selected_model: String,
    pub time_range: TimeRange,
    pub display_mode: DisplayMode,
    pub trade_filter: String,
    pub chat_filter: String,
    pub positions_filter: String,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            selected_model: ALL_MODELS.to_string(),
            time_range: TimeRange::default(),
            display_mode: DisplayMode::default(),
            trade_filter: ALL_MODELS.to_string(),
            chat_filter: ALL_MODELS.to_string(),
            positions_filter: ALL_MODELS.to_string(),
        }
    }
}

impl DashboardState {
    pub fn select_model(&mut self, id: impl Into<String>) {
        self.selected_model = id.into();
    }

    pub fn set_time_range(&mut self, range: TimeRange) {
        self.time_range = range;
    }

    pub fn set_display_mode(&mut self, mode: DisplayMode) {
        self.display_mode = mode;
    }

    pub fn is_all_selected(&self) -> bool {
        self.selected_model == ALL_MODELS
    }

    /// None for `all` or an id not in `models`
    pub fn selected_model_data<'a>(&self, models: &'a [AiModel]) -> Option<&'a AiModel> {
        if self.is_all_selected() {
            return None;
        }
        models.iter().find(|m| m.id == self.selected_model)
    }

    /// Every model for `all`, otherwise just the selected one
    pub fn visible_models<'a>(&self, models: &'a [AiModel]) -> Vec<&'a AiModel> {
        models
            .iter()
            .filter(|m| self.is_all_selected() || m.id == self.selected_model)
            .collect()
    }

    pub fn chart_series(&self, models: &[AiModel], now_ms: i64) -> Vec<ChartSeries> {
        self.visible_models(models)
            .into_iter()
            .map(|model| {
                let window = trailing_window(&model.value_history, self.time_range.days(), now_ms);
                let points = match self.display_mode {
                    DisplayMode::Dollars => window,
                    DisplayMode::Percent => window
                        .into_iter()
                        .map(|p| ValuePoint {
                            timestamp: p.timestamp,
                            value: percent_change(model.initial_value, p.value),
                        })
                        .collect(),
                };
                ChartSeries {
                    model_id: model.id.clone(),
                    display_name: model.display_name.clone(),
                    color: model.color.clone(),
                    points,
                }
            })
            .collect()
    }
}

/// Percent change from `initial`; 0 when there is no baseline
pub fn percent_change(initial: f64, value: f64) -> f64 {
    if initial == 0.0 {
        return 0.0;
    }
    (value - initial) / initial * 100.0
}

/// Best performer; the first one wins ties
pub fn highest_model(models: &[AiModel]) -> Option<&AiModel> {
    models.iter().fold(None, |best: Option<&AiModel>, m| match best {
        Some(b) if b.performance >= m.performance => Some(b),
        _ => Some(m),
    })
}

/// Worst performer; the first one wins ties
pub fn lowest_model(models: &[AiModel]) -> Option<&AiModel> {
    models.iter().fold(None, |worst: Option<&AiModel>, m| match worst {
        Some(w) if w.performance <= m.performance => Some(w),
        _ => Some(m),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelStatus;
    use crate::value_history::DAY_MS;

    const NOW: i64 = 1_760_000_000_000;

    fn model(id: &str, performance: f64) -> AiModel {
        let history = (0..=7)
            .map(|d| ValuePoint {
                timestamp: NOW - (7 - d) * DAY_MS,
                value: 10_000.0 + d as f64 * 100.0,
            })
            .collect();
        AiModel {
            id: id.to_string(),
            name: id.to_string(),
            display_name: id.to_uppercase(),
            initial_value: 10_000.0,
            current_value: 10_700.0,
            performance,
            color: Some("#fff".to_string()),
            icon: None,
            status: ModelStatus::Active,
            description: None,
            rank: None,
            win_rate: None,
            total_trades: None,
            value_history: history,
        }
    }

    #[test]
    fn test_highest_and_lowest() {
        let models = vec![model("a", 5.0), model("b", 12.0), model("c", 12.0), model("d", -3.0)];
        assert_eq!(highest_model(&models).unwrap().id, "b");
        assert_eq!(lowest_model(&models).unwrap().id, "d");
        assert!(highest_model(&[]).is_none());
        assert!(lowest_model(&[]).is_none());
    }

    #[test]
    fn test_selection() {
        let models = vec![model("a", 1.0), model("b", 2.0)];
        let mut state = DashboardState::default();
        assert!(state.selected_model_data(&models).is_none());
        assert_eq!(state.visible_models(&models).len(), 2);

        state.select_model("b");
        assert_eq!(state.selected_model_data(&models).unwrap().id, "b");
        assert_eq!(state.visible_models(&models).len(), 1);

        state.select_model("zzz");
        assert!(state.selected_model_data(&models).is_none());
        assert!(state.visible_models(&models).is_empty());
    }

    #[test]
    fn test_chart_series_range_and_mode() {
        let models = vec![model("a", 7.0)];
        let mut state = DashboardState::default();

        let all = state.chart_series(&models, NOW);
        assert_eq!(all[0].points.len(), 8);
        assert_eq!(all[0].points[7].value, 10_700.0);

        state.set_time_range(TimeRange::Last72Hours);
        state.set_display_mode(DisplayMode::Percent);
        let recent = state.chart_series(&models, NOW);
        assert_eq!(recent[0].points.len(), 4);
        assert!((recent[0].points[3].value - 7.0).abs() < 1e-9);
        assert_eq!(recent[0].display_name, "A");
    }

    #[test]
    fn test_parse_range_and_mode() {
        assert_eq!("72h".parse::<TimeRange>().unwrap(), TimeRange::Last72Hours);
        assert_eq!("ALL".parse::<TimeRange>().unwrap(), TimeRange::All);
        assert!("24H".parse::<TimeRange>().is_err());
        assert_eq!("%".parse::<DisplayMode>().unwrap(), DisplayMode::Percent);
        assert!("€".parse::<DisplayMode>().is_err());
        assert_eq!(percent_change(0.0, 5.0), 0.0);
    }
}
