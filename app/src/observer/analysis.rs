use super::{
    check_range, WeatherObserver, DEFAULT_FORECAST_HOURS, DEFAULT_STATS_HOURS,
    MAX_FORECAST_HOURS, MAX_STATS_HOURS,
};
use crate::error::ServiceError;
use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use weather_core::{estimate_rain, ProbabilityReport, StatsReport};

fn window_start(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

impl WeatherObserver {
    /// Trailing window aggregates of one source
    #[tracing::instrument]
    pub async fn stats_for_source(
        &self,
        source: &str,
        hours: Option<i64>,
    ) -> Result<StatsReport, ServiceError> {
        let hours = check_range(
            "hours",
            hours.unwrap_or(DEFAULT_STATS_HOURS),
            1,
            MAX_STATS_HOURS,
        )?;
        let aggregate = self.store.aggregate(source, window_start(hours)).await?;
        if aggregate.total_records == 0 {
            return Err(ServiceError::NotFound(format!(
                "Insufficient data for '{}' in the last {} hours",
                source, hours
            )));
        }

        debug!("Aggregated {} readings", aggregate.total_records);
        Ok(StatsReport::new(source.to_owned(), hours, &aggregate))
    }

    /// Heuristic rain score of one source, see [`weather_core::estimate_rain`]
    #[tracing::instrument]
    pub async fn rain_probability(
        &self,
        source: &str,
        hours: Option<i64>,
    ) -> Result<ProbabilityReport, ServiceError> {
        let hours = check_range(
            "hours",
            hours.unwrap_or(DEFAULT_FORECAST_HOURS),
            1,
            MAX_FORECAST_HOURS,
        )?;
        let readings = self.store.window(source, window_start(hours)).await?;
        let estimate = estimate_rain(&readings).ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Not enough data for '{}' in the last {} hours to estimate rain",
                source, hours
            ))
        })?;

        debug!(
            "Rain probability {} from {} readings",
            estimate.probability, estimate.records_analyzed
        );
        Ok(ProbabilityReport::new(source.to_owned(), hours, estimate))
    }
}
