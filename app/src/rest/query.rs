use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use weather_core::ReadingFilter;

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Readings to skip, defaults to 0
    pub skip: Option<i64>,
    /// Page size in [1, 1000], defaults to 100
    pub limit: Option<i64>,
    pub source: Option<String>,
    /// Inclusive lower bound on the station time, RFC 3339 with a `Z` suffix
    /// or a percent-encoded `+` offset
    pub start_date: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the station time, same format as `start_date`
    pub end_date: Option<DateTime<Utc>>,
}

impl ListQuery {
    pub fn filter(&self) -> ReadingFilter {
        ReadingFilter {
            source: self.source.clone(),
            start_time: self.start_date,
            end_time: self.end_date,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LimitQuery {
    /// Maximum readings in [1, 500], defaults to 50
    pub limit: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HoursQuery {
    /// Trailing window in hours
    pub hours: Option<i64>,
}
