//! Rain probability heuristic.
//!
//! This is a fixed additive score over a short window of readings, not a
//! forecast model. The thresholds are part of the public contract.

use crate::{round2, Reading};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MIN_FORECAST_READINGS: usize = 2;
pub const MAX_PROBABILITY: u32 = 100;

const HUMIDITY_VERY_HIGH: f64 = 90.0;
const HUMIDITY_HIGH: f64 = 75.0;
const PRESSURE_STEEP_DROP: f64 = -1.5;
const PRESSURE_DROP: f64 = -0.5;
const PRECIPITATION_WET: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RainDiagnostics {
    pub average_humidity: f64,
    pub pressure_change: f64,
    pub total_precipitation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainEstimate {
    pub probability: u32,
    pub records_analyzed: usize,
    pub diagnostics: RainDiagnostics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProbabilityReport {
    pub source: String,
    pub period_hours: i64,
    pub rain_probability: u32,
    pub records_analyzed: usize,
    pub debug_info: RainDiagnostics,
}

impl ProbabilityReport {
    pub fn new(source: String, period_hours: i64, estimate: RainEstimate) -> Self {
        ProbabilityReport {
            source,
            period_hours,
            rain_probability: estimate.probability,
            records_analyzed: estimate.records_analyzed,
            debug_info: estimate.diagnostics,
        }
    }
}

/// Scores `readings`, which must be ordered by station time ascending.
///
/// Returns `None` when there are fewer than [`MIN_FORECAST_READINGS`] samples.
pub fn estimate_rain(readings: &[Reading]) -> Option<RainEstimate> {
    if readings.len() < MIN_FORECAST_READINGS {
        return None;
    }
    let mut probability = 0;

    let humidities: Vec<f64> = readings.iter().filter_map(|r| r.humidity).collect();
    let average_humidity = if humidities.is_empty() {
        0.0
    } else {
        humidities.iter().sum::<f64>() / humidities.len() as f64
    };
    if average_humidity > HUMIDITY_VERY_HIGH {
        probability += 30;
    } else if average_humidity > HUMIDITY_HIGH {
        probability += 15;
    }

    let first = readings.first().and_then(|r| r.pressure);
    let last = readings.last().and_then(|r| r.pressure);
    let mut pressure_change = 0.0;
    if let (Some(first), Some(last)) = (first, last) {
        pressure_change = last - first;
        if pressure_change < PRESSURE_STEEP_DROP {
            probability += 35;
        } else if pressure_change < PRESSURE_DROP {
            probability += 15;
        }
    }

    let total_precipitation: f64 = readings.iter().filter_map(|r| r.real_precipitation).sum();
    if total_precipitation > PRECIPITATION_WET {
        probability += 25;
    }

    Some(RainEstimate {
        probability: std::cmp::min(probability, MAX_PROBABILITY),
        records_analyzed: readings.len(),
        diagnostics: RainDiagnostics {
            average_humidity: round2(average_humidity),
            pressure_change: round2(pressure_change),
            total_precipitation: round2(total_precipitation),
        },
    })
}
