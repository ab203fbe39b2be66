// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary statistics over the reconciled activities.
//!
//! One pass over the records fills keyed running totals; `finish` turns
//! them into the sorted tables the renderer consumes.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;

use crate::format_utils::format_thousands;
use crate::models::stats::{
    AnnualTotal, BikeMileage, DisplayUnit, EquivalencyRow, EquivalencyStats, MetricRow,
    SportTotal, Summary, METERS_TO_FEET, METERS_TO_MILES,
};
use crate::models::ActivityRecord;
use crate::services::classify::Classifier;
use crate::services::gear::GearMap;

/// Swim meters per equivalent bike mile.
pub const SWIM_METERS_PER_MILE: f64 = 100.0;
/// Vertical feet of snow sports per equivalent bike mile.
pub const SNOW_FEET_PER_MILE: f64 = 1000.0;

/// Gear label for rides without gear.
const NO_GEAR_LABEL: &str = "Unknown";

fn is_ride(category: &str) -> bool {
    category.to_lowercase().contains("ride")
}

fn is_swim(category: &str) -> bool {
    category.to_lowercase().contains("swim")
}

fn is_snow(category: &str) -> bool {
    let lower = category.to_lowercase();
    lower.contains("ski") || lower.contains("snowboard")
}

/// Unit and value a category is reported in.
fn display_metric(category: &str, activity: &ActivityRecord) -> (DisplayUnit, f64) {
    if is_snow(category) {
        (
            DisplayUnit::VerticalFeet,
            activity.total_elevation_gain * METERS_TO_FEET,
        )
    } else if is_swim(category) {
        (DisplayUnit::Meters, activity.distance)
    } else {
        (DisplayUnit::Miles, activity.distance * METERS_TO_MILES)
    }
}

#[derive(Debug, Clone, Default)]
struct SportAccum {
    count: u32,
    total: f64,
}

#[derive(Debug, Clone, Default)]
struct YearAccum {
    ride_meters: f64,
    swim_meters: f64,
    snow_elevation_meters: f64,
    /// Tagged proxy activities: category -> equivalent miles
    proxy_miles: BTreeMap<String, f64>,
}

/// Running totals for summary statistics.
#[derive(Debug, Clone)]
pub struct SummaryBuilder<'a> {
    classifier: &'a Classifier,
    processed_ids: HashSet<u64>,
    total_activities: u32,
    total_distance_meters: f64,
    total_elevation_meters: f64,
    first_date: Option<NaiveDate>,
    last_date: Option<NaiveDate>,
    active_days: HashSet<NaiveDate>,
    by_sport: HashMap<(String, DisplayUnit), SportAccum>,
    ride_meters_by_gear: HashMap<Option<String>, f64>,
    by_year: HashMap<i32, YearAccum>,
    unmatched: Vec<String>,
}

impl<'a> SummaryBuilder<'a> {
    pub fn new(classifier: &'a Classifier) -> Self {
        Self {
            classifier,
            processed_ids: HashSet::new(),
            total_activities: 0,
            total_distance_meters: 0.0,
            total_elevation_meters: 0.0,
            first_date: None,
            last_date: None,
            active_days: HashSet::new(),
            by_sport: HashMap::new(),
            ride_meters_by_gear: HashMap::new(),
            by_year: HashMap::new(),
            unmatched: Vec::new(),
        }
    }

    /// Add an activity to the running totals.
    ///
    /// Returns `false` (and changes nothing) if the activity was already
    /// counted.
    pub fn update_from_activity(&mut self, activity: &ActivityRecord) -> bool {
        if !self.processed_ids.insert(activity.id) {
            return false;
        }

        let class = self.classifier.classify(&activity.name, activity.sport());
        let category = class.category.as_str();

        self.total_activities += 1;
        self.total_distance_meters += activity.distance;
        self.total_elevation_meters += activity.total_elevation_gain;

        if let Some(date) = activity.activity_date() {
            self.first_date = Some(self.first_date.map_or(date, |d| d.min(date)));
            self.last_date = Some(self.last_date.map_or(date, |d| d.max(date)));
            self.active_days.insert(date);
        }

        let (unit, value) = display_metric(category, activity);
        let sport = self
            .by_sport
            .entry((category.to_string(), unit))
            .or_default();
        sport.count += 1;
        sport.total += value;

        if is_ride(category) {
            *self
                .ride_meters_by_gear
                .entry(activity.gear_id.clone())
                .or_insert(0.0) += activity.distance;
        }

        if let Some(year) = activity.year() {
            let totals = self.by_year.entry(year).or_default();
            if is_ride(category) {
                totals.ride_meters += activity.distance;
            } else if class.tag.is_some() {
                let miles = class
                    .declared_value
                    .unwrap_or(activity.distance * METERS_TO_MILES);
                *totals.proxy_miles.entry(class.category.clone()).or_insert(0.0) += miles;
            } else if is_swim(category) {
                totals.swim_meters += activity.distance;
            } else if is_snow(category) {
                totals.snow_elevation_meters += activity.total_elevation_gain;
            }
        }

        if let Some(token) = class.unmatched_tag {
            tracing::debug!(activity_id = activity.id, token = %token, "Unmatched equivalency tag");
            self.unmatched.push(activity.name.clone());
        }

        true
    }

    /// Build the summary tables.
    ///
    /// `report_years` picks the annual rows (newest first) and the year used
    /// for the equivalency table (the newest). `gear` maps gear IDs to names;
    /// unmapped IDs are shown as-is.
    pub fn finish(self, report_years: &[i32], gear: &GearMap) -> Summary {
        if self.total_activities == 0 {
            return Summary::default();
        }

        Summary {
            global_stats: self.global_stats(),
            sport_ranking: self.sport_ranking(),
            bike_lifetime_miles: self.bike_lifetime(gear),
            annual_totals: self.annual_totals(report_years),
            equity_stats: self.equivalency(report_years),
        }
    }

    fn global_stats(&self) -> Vec<MetricRow> {
        let mut rows = vec![MetricRow::new(
            "Total Activities",
            self.total_activities.to_string(),
        )];

        if let (Some(first), Some(last)) = (self.first_date, self.last_date) {
            rows.push(MetricRow::new(
                "Date Range",
                format!("{} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
            ));
        }
        rows.push(MetricRow::new("Active Days", self.active_days.len().to_string()));
        rows.push(MetricRow::new(
            "Total Distance",
            format!(
                "{} miles",
                format_thousands(self.total_distance_meters * METERS_TO_MILES, 0)
            ),
        ));
        rows.push(MetricRow::new(
            "Total Elevation",
            format!(
                "{} ft",
                format_thousands(self.total_elevation_meters * METERS_TO_FEET, 0)
            ),
        ));

        let min_year = self.by_year.keys().min();
        let max_year = self.by_year.keys().max();
        if let (Some(min), Some(max)) = (min_year, max_year) {
            let range = if min == max {
                min.to_string()
            } else {
                format!("{} - {}", min, max)
            };
            rows.push(MetricRow::new("Year Range", range));
        }

        rows
    }

    fn sport_ranking(&self) -> Vec<SportTotal> {
        let mut ranking: Vec<SportTotal> = self
            .by_sport
            .iter()
            .map(|((sport, unit), acc)| SportTotal {
                sport: sport.clone(),
                count: acc.count,
                total: acc.total.round(),
                unit: *unit,
            })
            .collect();

        ranking.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(b.total.total_cmp(&a.total))
                .then_with(|| a.sport.cmp(&b.sport))
        });
        ranking
    }

    fn bike_lifetime(&self, gear: &GearMap) -> Vec<BikeMileage> {
        // Several IDs can resolve to the same name; merge them.
        let mut by_name: HashMap<String, f64> = HashMap::new();
        for (gear_id, meters) in &self.ride_meters_by_gear {
            let name = match gear_id {
                Some(id) => gear.get(id).cloned().unwrap_or_else(|| id.clone()),
                None => NO_GEAR_LABEL.to_string(),
            };
            *by_name.entry(name).or_insert(0.0) += meters * METERS_TO_MILES;
        }

        let mut bikes: Vec<BikeMileage> = by_name
            .into_iter()
            .map(|(bike, miles)| BikeMileage {
                bike,
                miles: round_tenths(miles),
            })
            .collect();
        bikes.sort_by(|a, b| b.miles.total_cmp(&a.miles).then_with(|| a.bike.cmp(&b.bike)));
        bikes
    }

    fn annual_totals(&self, report_years: &[i32]) -> Vec<AnnualTotal> {
        let mut years: Vec<i32> = report_years.to_vec();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();

        years
            .into_iter()
            .map(|year| {
                let totals = self.by_year.get(&year).cloned().unwrap_or_default();
                AnnualTotal {
                    year,
                    bike_miles: (totals.ride_meters * METERS_TO_MILES).round() as u64,
                    swim_meters: totals.swim_meters as u64,
                    ski_vert_ft: (totals.snow_elevation_meters * METERS_TO_FEET) as u64,
                }
            })
            .collect()
    }

    fn equivalency(&self, report_years: &[i32]) -> EquivalencyStats {
        let mut stats = EquivalencyStats {
            unmatched: self.unmatched.clone(),
            ..Default::default()
        };

        let Some(year) = report_years.iter().copied().max() else {
            return stats;
        };
        stats.year = Some(year);

        let Some(totals) = self.by_year.get(&year) else {
            return stats;
        };

        if totals.swim_meters > 0.0 {
            stats.breakdown.push(EquivalencyRow {
                source_sport: "Swim".to_string(),
                source_val: totals.swim_meters,
                source_unit: "m".to_string(),
                total_miles: totals.swim_meters / SWIM_METERS_PER_MILE,
            });
        }

        let snow_feet = totals.snow_elevation_meters * METERS_TO_FEET;
        if snow_feet > 0.0 {
            stats.breakdown.push(EquivalencyRow {
                source_sport: "Snow Sports".to_string(),
                source_val: snow_feet,
                source_unit: "ft".to_string(),
                total_miles: snow_feet / SNOW_FEET_PER_MILE,
            });
        }

        for (category, miles) in &totals.proxy_miles {
            if *miles > 0.0 {
                stats.breakdown.push(EquivalencyRow {
                    source_sport: category.clone(),
                    source_val: *miles,
                    source_unit: "mi".to_string(),
                    total_miles: *miles,
                });
            }
        }

        stats.actual_bike_miles = (totals.ride_meters * METERS_TO_MILES).round();
        stats
    }
}

fn round_tenths(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Summarize `activities` in one pass.
pub fn summarize(
    activities: &[ActivityRecord],
    classifier: &Classifier,
    gear: &GearMap,
    report_years: &[i32],
) -> Summary {
    let mut builder = SummaryBuilder::new(classifier);
    for activity in activities {
        builder.update_from_activity(activity);
    }
    builder.finish(report_years, gear)
}
