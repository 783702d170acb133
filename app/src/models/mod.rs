use crate::config::CONFIG;
use crate::error::{DBError, ServerError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use weather_core::{NewReading, Reading, ReadingFilter, ReadingSummary, WindowAggregate};

macro_rules! sql_stmnt {
    ($ret:ident, $stmt:expr) => {
        sqlx::query_as::<_, $ret>($stmt)
    };
    ($stmt:expr) => {
        sqlx::query($stmt)
    };
    ($ret:ident, $stmt:expr, $($bind:expr),*) => {
        sqlx::query_as::<_, $ret>($stmt)$(.bind($bind))*
    };
    ($stmt:expr, $($bind:expr),*) => {
        sqlx::query($stmt)$(.bind($bind))*
    };
}

pub async fn establish_db_connection() -> Result<sqlx::PgPool, ServerError> {
    let database_url = CONFIG.database_url()?;
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(CONFIG.db_max_connections())
        .acquire_timeout(Duration::from_millis(CONFIG.db_acquire_timeout_ms()))
        .connect(&database_url)
        .await
        .map_err(DBError::from)?;
    Ok(pool)
}

/// Creates the readings table and its indices if they are missing
pub async fn ensure_schema(conn: &sqlx::PgPool) -> Result<(), DBError> {
    sql_stmnt!(
        r#"CREATE TABLE IF NOT EXISTS weather_station_data (
            id BIGSERIAL PRIMARY KEY,
            station_time TIMESTAMPTZ NOT NULL,
            source VARCHAR(100) NOT NULL,
            temperature DOUBLE PRECISION,
            precipitation DOUBLE PRECISION,
            real_precipitation DOUBLE PRECISION,
            pressure DOUBLE PRECISION,
            wind_speed DOUBLE PRECISION,
            wind_direction DOUBLE PRECISION,
            humidity DOUBLE PRECISION,
            radiation DOUBLE PRECISION,
            eto DOUBLE PRECISION,
            compass_rose VARCHAR(10),
            real_eto DOUBLE PRECISION,
            radiation_uv DOUBLE PRECISION,
            active_sensor INTEGER,
            solar_panel INTEGER,
            open_door INTEGER,
            low_battery INTEGER,
            observations VARCHAR(500),
            processed INTEGER NOT NULL DEFAULT 0 CHECK (processed IN (0, 1)),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ
        )"#
    )
    .execute(conn)
    .await?;
    sql_stmnt!(
        "CREATE INDEX IF NOT EXISTS ix_weather_station_data_source_id ON weather_station_data (source, id)"
    )
    .execute(conn)
    .await?;
    sql_stmnt!(
        "CREATE INDEX IF NOT EXISTS ix_weather_station_data_station_time ON weather_station_data (station_time)"
    )
    .execute(conn)
    .await?;
    Ok(())
}

#[derive(sqlx::FromRow)]
pub(crate) struct CountRecord {
    pub count: Option<i64>,
}

impl CountRecord {
    pub fn count(self) -> i64 {
        self.count.unwrap_or(0)
    }
}

/// Record store seam of the service.
///
/// Every mutating call is a single transaction, a failed call leaves the
/// store unchanged.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Inserts a new row and returns its id
    async fn insert(&self, reading: &NewReading) -> Result<i64, DBError>;

    async fn get(&self, id: i64) -> Result<Option<Reading>, DBError>;

    /// Filtered scan ordered by station time descending
    async fn list(
        &self,
        filter: &ReadingFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ReadingSummary>, DBError>;

    async fn list_by_source(&self, source: &str, limit: i64) -> Result<Vec<Reading>, DBError>;

    /// Readings of `source` observed at or after `since`, ordered by station time ascending
    async fn window(&self, source: &str, since: DateTime<Utc>) -> Result<Vec<Reading>, DBError>;

    async fn aggregate(&self, source: &str, since: DateTime<Utc>)
        -> Result<WindowAggregate, DBError>;

    /// The reading with the highest id of every source
    async fn latest_per_source(&self) -> Result<Vec<Reading>, DBError>;

    /// Distinct sources in lexicographic order
    async fn sources(&self) -> Result<Vec<String>, DBError>;

    async fn mark_processed(&self, id: i64) -> Result<(), DBError>;

    async fn delete(&self, id: i64) -> Result<(), DBError>;

    async fn count(&self) -> Result<i64, DBError>;
}

/// PostgreSQL backed store
pub struct PgReadingStore {
    conn: sqlx::PgPool,
}

impl PgReadingStore {
    pub fn new(conn: sqlx::PgPool) -> Self {
        PgReadingStore { conn }
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    async fn insert(&self, dto: &NewReading) -> Result<i64, DBError> {
        reading::insert(&self.conn, dto).await
    }

    async fn get(&self, id: i64) -> Result<Option<Reading>, DBError> {
        Ok(reading::get(&self.conn, id).await?.map(Reading::from))
    }

    async fn list(
        &self,
        filter: &ReadingFilter,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<ReadingSummary>, DBError> {
        let mut daos = reading::list(&self.conn, filter, skip, limit).await?;
        Ok(daos.drain(..).map(ReadingSummary::from).collect())
    }

    async fn list_by_source(&self, source: &str, limit: i64) -> Result<Vec<Reading>, DBError> {
        let mut daos = reading::get_by_source(&self.conn, source, limit).await?;
        Ok(daos.drain(..).map(Reading::from).collect())
    }

    async fn window(&self, source: &str, since: DateTime<Utc>) -> Result<Vec<Reading>, DBError> {
        let mut daos = reading::get_since(&self.conn, source, since).await?;
        Ok(daos.drain(..).map(Reading::from).collect())
    }

    async fn aggregate(
        &self,
        source: &str,
        since: DateTime<Utc>,
    ) -> Result<WindowAggregate, DBError> {
        Ok(reading::aggregate(&self.conn, source, since).await?.into())
    }

    async fn latest_per_source(&self) -> Result<Vec<Reading>, DBError> {
        let mut daos = reading::get_latest_per_source(&self.conn).await?;
        Ok(daos.drain(..).map(Reading::from).collect())
    }

    async fn sources(&self) -> Result<Vec<String>, DBError> {
        reading::get_sources(&self.conn).await
    }

    async fn mark_processed(&self, id: i64) -> Result<(), DBError> {
        reading::mark_processed(&self.conn, id).await
    }

    async fn delete(&self, id: i64) -> Result<(), DBError> {
        reading::delete(&self.conn, id).await
    }

    async fn count(&self) -> Result<i64, DBError> {
        Ok(
            sql_stmnt!(CountRecord, "SELECT count(*) as count FROM weather_station_data")
                .fetch_one(&self.conn)
                .await?
                .count(),
        )
    }
}

#[cfg(test)]
pub mod memory;
pub mod reading;
