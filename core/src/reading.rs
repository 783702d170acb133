use crate::error::ReadingError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use utoipa::ToSchema;

pub const PROCESSED: i32 = 1;
pub const UNPROCESSED: i32 = 0;

/// A persisted weather station sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub id: i64,
    pub station_time: DateTime<Utc>,
    pub source: String,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub real_precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub humidity: Option<f64>,
    pub radiation: Option<f64>,
    pub eto: Option<f64>,
    pub compass_rose: Option<String>,
    pub real_eto: Option<f64>,
    pub radiation_uv: Option<f64>,
    pub active_sensor: Option<i32>,
    pub solar_panel: Option<i32>,
    pub open_door: Option<i32>,
    pub low_battery: Option<i32>,
    pub observations: Option<String>,
    pub processed: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Reading {
    /// Materializes a validated sample with the store assigned columns
    pub fn from_new(id: i64, new: NewReading, created_at: DateTime<Utc>) -> Self {
        Reading {
            id,
            station_time: new.station_time,
            source: new.source,
            temperature: new.temperature,
            precipitation: new.precipitation,
            real_precipitation: new.real_precipitation,
            pressure: new.pressure,
            wind_speed: new.wind_speed,
            wind_direction: new.wind_direction,
            humidity: new.humidity,
            radiation: new.radiation,
            eto: new.eto,
            compass_rose: new.compass_rose,
            real_eto: new.real_eto,
            radiation_uv: new.radiation_uv,
            active_sensor: new.active_sensor,
            solar_panel: new.solar_panel,
            open_door: new.open_door,
            low_battery: new.low_battery,
            observations: new.observations,
            processed: UNPROCESSED,
            created_at,
            updated_at: None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed == PROCESSED
    }
}

/// Reduced projection used by the paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ReadingSummary {
    pub id: i64,
    pub station_time: DateTime<Utc>,
    pub source: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl From<Reading> for ReadingSummary {
    fn from(val: Reading) -> Self {
        ReadingSummary {
            id: val.id,
            station_time: val.station_time,
            source: val.source,
            temperature: val.temperature,
            humidity: val.humidity,
            wind_speed: val.wind_speed,
            created_at: val.created_at,
        }
    }
}

/// Incoming sample as sent by a station, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPayload {
    pub station_time: Option<DateTime<Utc>>,
    pub source: Option<String>,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub real_precipitation: Option<f64>,
    #[serde(alias = "presure")]
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub humidity: Option<f64>,
    pub radiation: Option<f64>,
    pub eto: Option<f64>,
    pub compass_rose: Option<String>,
    #[serde(rename = "realETO")]
    pub real_eto: Option<f64>,
    #[serde(rename = "radiationUV")]
    pub radiation_uv: Option<f64>,
    pub active_sensor: Option<i32>,
    pub solar_panel: Option<i32>,
    pub open_door: Option<i32>,
    pub low_battery: Option<i32>,
    pub observations: Option<String>,
}

/// A sample that passed validation and is ready to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub station_time: DateTime<Utc>,
    pub source: String,
    pub temperature: Option<f64>,
    pub precipitation: Option<f64>,
    pub real_precipitation: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub humidity: Option<f64>,
    pub radiation: Option<f64>,
    pub eto: Option<f64>,
    pub compass_rose: Option<String>,
    pub real_eto: Option<f64>,
    pub radiation_uv: Option<f64>,
    pub active_sensor: Option<i32>,
    pub solar_panel: Option<i32>,
    pub open_door: Option<i32>,
    pub low_battery: Option<i32>,
    pub observations: Option<String>,
}

impl TryFrom<ReadingPayload> for NewReading {
    type Error = ReadingError;

    fn try_from(val: ReadingPayload) -> Result<Self, Self::Error> {
        let station_time = val
            .station_time
            .ok_or(ReadingError::MissingField("stationTime"))?;
        let source = val.source.ok_or(ReadingError::MissingField("source"))?;
        if source.is_empty() {
            return Err(ReadingError::EmptyField("source"));
        }

        Ok(NewReading {
            station_time,
            source,
            temperature: val.temperature,
            precipitation: val.precipitation,
            real_precipitation: val.real_precipitation,
            pressure: val.pressure,
            wind_speed: val.wind_speed,
            wind_direction: val.wind_direction,
            humidity: val.humidity,
            radiation: val.radiation,
            eto: val.eto,
            compass_rose: val.compass_rose,
            real_eto: val.real_eto,
            radiation_uv: val.radiation_uv,
            active_sensor: val.active_sensor,
            solar_panel: val.solar_panel,
            open_door: val.open_door,
            low_battery: val.low_battery,
            observations: val.observations,
        })
    }
}

/// Conjunctive listing filter, unset parts match everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingFilter {
    pub source: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl ReadingFilter {
    pub fn matches(&self, reading: &Reading) -> bool {
        if let Some(source) = &self.source {
            if &reading.source != source {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if reading.station_time < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if reading.station_time > end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IngestAck {
    pub success: bool,
    pub message: String,
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Ack {
    pub success: bool,
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SourceList {
    pub total: usize,
    pub sources: Vec<String>,
}

impl From<Vec<String>> for SourceList {
    fn from(sources: Vec<String>) -> Self {
        SourceList {
            total: sources.len(),
            sources,
        }
    }
}
