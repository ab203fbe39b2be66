//! Summary statistics produced by the aggregator.
//!
//! Field names follow the summaries JSON file consumed by the dashboard.

use serde::{Deserialize, Serialize};

/// Meters to statute miles.
pub const METERS_TO_MILES: f64 = 0.000621371;
/// Meters to feet.
pub const METERS_TO_FEET: f64 = 3.28084;

/// Unit a sport's total is reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DisplayUnit {
    #[serde(rename = "mi")]
    Miles,
    #[serde(rename = "m")]
    Meters,
    #[serde(rename = "ft (vert)")]
    VerticalFeet,
}

impl DisplayUnit {
    pub fn label(self) -> &'static str {
        match self {
            DisplayUnit::Miles => "mi",
            DisplayUnit::Meters => "m",
            DisplayUnit::VerticalFeet => "ft (vert)",
        }
    }
}

/// One `Metric: Value` row of the global table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    #[serde(rename = "Metric")]
    pub metric: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl MetricRow {
    pub fn new(metric: &str, value: impl Into<String>) -> Self {
        Self {
            metric: metric.to_string(),
            value: value.into(),
        }
    }
}

/// Count and total per sport category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SportTotal {
    pub sport: String,
    pub count: u32,
    /// Total in `unit`, rounded to a whole number
    pub total: f64,
    pub unit: DisplayUnit,
}

/// Lifetime ride mileage per bike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BikeMileage {
    pub bike: String,
    pub miles: f64,
}

/// Headline totals for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTotal {
    pub year: i32,
    pub bike_miles: u64,
    pub swim_meters: u64,
    pub ski_vert_ft: u64,
}

/// One proxy sport converted to bike miles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalencyRow {
    pub source_sport: String,
    pub source_val: f64,
    pub source_unit: String,
    pub total_miles: f64,
}

/// Bike-mile equivalents for the most recent report year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquivalencyStats {
    pub year: Option<i32>,
    pub breakdown: Vec<EquivalencyRow>,
    /// Actual ride miles in `year`
    pub actual_bike_miles: f64,
    /// Names of activities with an unrecognised equivalency tag
    pub unmatched: Vec<String>,
}

impl EquivalencyStats {
    /// Proxy miles plus actual ride miles.
    pub fn total_miles(&self) -> f64 {
        self.breakdown.iter().map(|r| r.total_miles).sum::<f64>() + self.actual_bike_miles
    }
}

/// Everything the renderer needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub global_stats: Vec<MetricRow>,
    pub sport_ranking: Vec<SportTotal>,
    pub bike_lifetime_miles: Vec<BikeMileage>,
    pub annual_totals: Vec<AnnualTotal>,
    pub equity_stats: EquivalencyStats,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.global_stats.is_empty()
    }

    /// Value of a global metric row by name.
    pub fn global_value(&self, metric: &str) -> Option<&str> {
        self.global_stats
            .iter()
            .find(|row| row.metric == metric)
            .map(|row| row.value.as_str())
    }
}
