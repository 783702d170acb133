//! In-process store with the same contract as the PostgreSQL one.

use super::ReadingStore;
use crate::error::DBError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use weather_core::{
    NewReading, Reading, ReadingFilter, ReadingSummary, WindowAggregate, PROCESSED,
};

#[derive(Default)]
pub struct MemoryReadingStore {
    inner: Mutex<InnerStore>,
}

#[derive(Default)]
struct InnerStore {
    last_id: i64,
    rows: BTreeMap<i64, Reading>,
    failing: bool,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail like a lost connection
    pub fn set_failing(&self, failing: bool) {
        self.inner.lock().failing = failing;
    }

    fn check(inner: &InnerStore) -> Result<(), DBError> {
        if inner.failing {
            Err(DBError::SQLError(sqlx::Error::PoolClosed))
        } else {
            Ok(())
        }
    }
}

fn by_station_time_desc(a: &Reading, b: &Reading) -> std::cmp::Ordering {
    b.station_time
        .cmp(&a.station_time)
        .then_with(|| b.id.cmp(&a.id))
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn insert(&self, reading: &NewReading) -> Result<i64, DBError> {
        let mut inner = self.inner.lock();
        Self::check(&inner)?;
        inner.last_id += 1;
        let id = inner.last_id;
        inner
            .rows
            .insert(id, Reading::from_new(id, reading.clone(), Utc::now()));
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Option<Reading>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn list(
        &self,
        filter: &ReadingFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ReadingSummary>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        let mut matching: Vec<Reading> = inner
            .rows
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(by_station_time_desc);
        Ok(matching
            .drain(..)
            .skip(skip as usize)
            .take(limit as usize)
            .map(ReadingSummary::from)
            .collect())
    }

    async fn list_by_source(&self, source: &str, limit: i64) -> Result<Vec<Reading>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        let mut matching: Vec<Reading> = inner
            .rows
            .values()
            .filter(|r| r.source == source)
            .cloned()
            .collect();
        matching.sort_by(by_station_time_desc);
        matching.truncate(limit as usize);
        Ok(matching)
    }

    async fn window(&self, source: &str, since: DateTime<Utc>) -> Result<Vec<Reading>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        let mut matching: Vec<Reading> = inner
            .rows
            .values()
            .filter(|r| r.source == source && r.station_time >= since)
            .cloned()
            .collect();
        matching.sort_by(|a, b| by_station_time_desc(b, a));
        Ok(matching)
    }

    async fn aggregate(
        &self,
        source: &str,
        since: DateTime<Utc>,
    ) -> Result<WindowAggregate, DBError> {
        let readings = self.window(source, since).await?;
        Ok(WindowAggregate::from_readings(&readings))
    }

    async fn latest_per_source(&self) -> Result<Vec<Reading>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        let mut latest: BTreeMap<&str, &Reading> = BTreeMap::new();
        for reading in inner.rows.values() {
            let entry = latest.entry(reading.source.as_str()).or_insert(reading);
            if reading.id > entry.id {
                *entry = reading;
            }
        }
        Ok(latest.values().map(|r| (*r).clone()).collect())
    }

    async fn sources(&self) -> Result<Vec<String>, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        let mut sources: Vec<String> = inner.rows.values().map(|r| r.source.clone()).collect();
        sources.sort();
        sources.dedup();
        Ok(sources)
    }

    async fn mark_processed(&self, id: i64) -> Result<(), DBError> {
        let mut inner = self.inner.lock();
        Self::check(&inner)?;
        let reading = inner
            .rows
            .get_mut(&id)
            .ok_or(DBError::ReadingNotFound(id))?;
        reading.processed = PROCESSED;
        reading.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), DBError> {
        let mut inner = self.inner.lock();
        Self::check(&inner)?;
        inner
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(DBError::ReadingNotFound(id))
    }

    async fn count(&self) -> Result<i64, DBError> {
        let inner = self.inner.lock();
        Self::check(&inner)?;
        Ok(inner.rows.len() as i64)
    }
}
