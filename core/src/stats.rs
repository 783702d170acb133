use crate::{round2, Reading};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw window aggregates as returned by the store.
///
/// Every field is computed over the readings that report it, absent values
/// never count towards a denominator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowAggregate {
    pub avg_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub avg_humidity: Option<f64>,
    pub avg_wind_speed: Option<f64>,
    pub max_wind_speed: Option<f64>,
    pub total_records: i64,
}

impl WindowAggregate {
    pub fn from_readings(readings: &[Reading]) -> Self {
        let temperatures: Vec<f64> = readings.iter().filter_map(|r| r.temperature).collect();
        let humidities: Vec<f64> = readings.iter().filter_map(|r| r.humidity).collect();
        let wind_speeds: Vec<f64> = readings.iter().filter_map(|r| r.wind_speed).collect();

        WindowAggregate {
            avg_temperature: average(&temperatures),
            max_temperature: fold(&temperatures, f64::max),
            min_temperature: fold(&temperatures, f64::min),
            avg_humidity: average(&humidities),
            avg_wind_speed: average(&wind_speeds),
            max_wind_speed: fold(&wind_speeds, f64::max),
            total_records: readings.len() as i64,
        }
    }
}

fn average(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn fold(values: &[f64], f: fn(f64, f64) -> f64) -> Option<f64> {
    values.iter().copied().fold(None, |acc, v| match acc {
        Some(acc) => Some(f(acc, v)),
        None => Some(v),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TemperatureStats {
    pub average: Option<f64>,
    pub maximum: Option<f64>,
    pub minimum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HumidityStats {
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WindStats {
    pub average: Option<f64>,
    pub maximum: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Statistics {
    pub temperature: TemperatureStats,
    pub humidity: HumidityStats,
    pub wind_speed: WindStats,
    pub total_records: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatsReport {
    pub source: String,
    pub period_hours: i64,
    pub statistics: Statistics,
}

impl StatsReport {
    pub fn new(source: String, period_hours: i64, aggregate: &WindowAggregate) -> Self {
        StatsReport {
            source,
            period_hours,
            statistics: Statistics {
                temperature: TemperatureStats {
                    average: aggregate.avg_temperature.map(round2),
                    maximum: aggregate.max_temperature.map(round2),
                    minimum: aggregate.min_temperature.map(round2),
                },
                humidity: HumidityStats {
                    average: aggregate.avg_humidity.map(round2),
                },
                wind_speed: WindStats {
                    average: aggregate.avg_wind_speed.map(round2),
                    maximum: aggregate.max_wind_speed.map(round2),
                },
                total_records: aggregate.total_records,
            },
        }
    }
}
