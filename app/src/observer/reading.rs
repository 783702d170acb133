use super::{
    check_range, WeatherObserver, DEFAULT_LIST_LIMIT, DEFAULT_SOURCE_LIMIT, MAX_LIST_LIMIT,
    MAX_SOURCE_LIMIT,
};
use crate::error::ServiceError;
use std::convert::TryFrom;
use tracing::{debug, error, info};
use weather_core::{
    Ack, IngestAck, NewReading, Reading, ReadingFilter, ReadingPayload, ReadingSummary,
    SourceList,
};

// Ingestion
impl WeatherObserver {
    /// Validates one station payload and stores it as a new reading.
    /// Duplicates are stored again, measurements are not range checked.
    #[tracing::instrument(skip(payload))]
    pub async fn ingest(&self, payload: ReadingPayload) -> Result<IngestAck, ServiceError> {
        let reading = NewReading::try_from(payload)?;
        match self.store.insert(&reading).await {
            Ok(id) => {
                info!(
                    "Stored reading {} from {}, temperature: {:?}",
                    id, reading.source, reading.temperature
                );
                Ok(IngestAck {
                    success: true,
                    message: "Weather data received and stored".to_owned(),
                    id: Some(id),
                })
            }
            Err(e) => {
                error!("Failed storing reading from {}: {}", reading.source, e);
                Err(e.into())
            }
        }
    }
}

// Queries
impl WeatherObserver {
    #[tracing::instrument]
    pub async fn list(
        &self,
        skip: Option<i64>,
        limit: Option<i64>,
        filter: ReadingFilter,
    ) -> Result<Vec<ReadingSummary>, ServiceError> {
        let skip = skip.unwrap_or(0);
        if skip < 0 {
            return Err(ServiceError::Validation(format!(
                "skip must not be negative, got {}",
                skip
            )));
        }
        let limit = check_range(
            "limit",
            limit.unwrap_or(DEFAULT_LIST_LIMIT),
            1,
            MAX_LIST_LIMIT,
        )?;

        if let (Some(start), Some(end)) = (filter.start_time, filter.end_time) {
            if start > end {
                debug!("Empty time range {} > {}", start, end);
                return Ok(Vec::new());
            }
        }
        Ok(self.store.list(&filter, skip, limit).await?)
    }

    #[tracing::instrument]
    pub async fn get_by_id(&self, id: i64) -> Result<Reading, ServiceError> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("No weather data found with id {}", id)))
    }

    #[tracing::instrument]
    pub async fn list_by_source(
        &self,
        source: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Reading>, ServiceError> {
        let limit = check_range(
            "limit",
            limit.unwrap_or(DEFAULT_SOURCE_LIMIT),
            1,
            MAX_SOURCE_LIMIT,
        )?;
        let readings = self.store.list_by_source(source, limit).await?;
        if readings.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "No weather data found for source '{}'",
                source
            )));
        }
        Ok(readings)
    }

    /// One reading per source: the one that arrived last, whatever its station time
    #[tracing::instrument]
    pub async fn latest_per_source(&self) -> Result<Vec<Reading>, ServiceError> {
        Ok(self.store.latest_per_source().await?)
    }

    #[tracing::instrument]
    pub async fn list_sources(&self) -> Result<SourceList, ServiceError> {
        Ok(SourceList::from(self.store.sources().await?))
    }
}

// Mutations
impl WeatherObserver {
    #[tracing::instrument]
    pub async fn mark_processed(&self, id: i64) -> Result<Ack, ServiceError> {
        self.store.mark_processed(id).await?;
        info!("Marked reading {} as processed", id);
        Ok(Ack {
            success: true,
            message: "Weather data marked as processed".to_owned(),
            id,
        })
    }

    #[tracing::instrument]
    pub async fn delete(&self, id: i64) -> Result<Ack, ServiceError> {
        self.store.delete(id).await?;
        info!("Deleted reading {}", id);
        Ok(Ack {
            success: true,
            message: "Weather data deleted".to_owned(),
            id,
        })
    }
}
