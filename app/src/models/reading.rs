use chrono::{DateTime, Utc};
use weather_core::{NewReading, Reading, ReadingFilter, ReadingSummary, WindowAggregate, PROCESSED};

use crate::error::DBError;

#[derive(sqlx::FromRow, Debug)]
pub struct ReadingDao {
    pub(crate) id: i64,
    pub(crate) station_time: DateTime<Utc>,
    pub(crate) source: String,
    pub(crate) temperature: Option<f64>,
    pub(crate) precipitation: Option<f64>,
    pub(crate) real_precipitation: Option<f64>,
    pub(crate) pressure: Option<f64>,
    pub(crate) wind_speed: Option<f64>,
    pub(crate) wind_direction: Option<f64>,
    pub(crate) humidity: Option<f64>,
    pub(crate) radiation: Option<f64>,
    pub(crate) eto: Option<f64>,
    pub(crate) compass_rose: Option<String>,
    pub(crate) real_eto: Option<f64>,
    pub(crate) radiation_uv: Option<f64>,
    pub(crate) active_sensor: Option<i32>,
    pub(crate) solar_panel: Option<i32>,
    pub(crate) open_door: Option<i32>,
    pub(crate) low_battery: Option<i32>,
    pub(crate) observations: Option<String>,
    pub(crate) processed: i32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl From<ReadingDao> for Reading {
    fn from(val: ReadingDao) -> Self {
        Reading {
            id: val.id,
            station_time: val.station_time,
            source: val.source,
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
            processed: val.processed,
            created_at: val.created_at,
            updated_at: val.updated_at,
        }
    }
}

#[derive(sqlx::FromRow, Debug)]
pub struct ReadingSummaryDao {
    pub(crate) id: i64,
    pub(crate) station_time: DateTime<Utc>,
    pub(crate) source: String,
    pub(crate) temperature: Option<f64>,
    pub(crate) humidity: Option<f64>,
    pub(crate) wind_speed: Option<f64>,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<ReadingSummaryDao> for ReadingSummary {
    fn from(val: ReadingSummaryDao) -> Self {
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

#[derive(sqlx::FromRow, Debug)]
pub struct AggregateDao {
    pub(crate) avg_temperature: Option<f64>,
    pub(crate) max_temperature: Option<f64>,
    pub(crate) min_temperature: Option<f64>,
    pub(crate) avg_humidity: Option<f64>,
    pub(crate) avg_wind_speed: Option<f64>,
    pub(crate) max_wind_speed: Option<f64>,
    pub(crate) total_records: Option<i64>,
}

impl From<AggregateDao> for WindowAggregate {
    fn from(val: AggregateDao) -> Self {
        WindowAggregate {
            avg_temperature: val.avg_temperature,
            max_temperature: val.max_temperature,
            min_temperature: val.min_temperature,
            avg_humidity: val.avg_humidity,
            avg_wind_speed: val.avg_wind_speed,
            max_wind_speed: val.max_wind_speed,
            total_records: val.total_records.unwrap_or(0),
        }
    }
}

#[derive(sqlx::FromRow)]
struct IdRecord {
    id: i64,
}

#[derive(sqlx::FromRow)]
struct SourceRecord {
    source: String,
}

/// INSERT a reading in its own transaction, dropping the transaction on error rolls it back
pub async fn insert(conn: &sqlx::PgPool, dto: &NewReading) -> Result<i64, DBError> {
    let mut tx = conn.begin().await?;
    let record = sql_stmnt!(
        IdRecord,
        r#"INSERT INTO weather_station_data
            (station_time, source, temperature, precipitation, real_precipitation, pressure,
             wind_speed, wind_direction, humidity, radiation, eto, compass_rose, real_eto,
             radiation_uv, active_sensor, solar_panel, open_door, low_battery, observations)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING id"#,
        dto.station_time,
        &dto.source,
        dto.temperature,
        dto.precipitation,
        dto.real_precipitation,
        dto.pressure,
        dto.wind_speed,
        dto.wind_direction,
        dto.humidity,
        dto.radiation,
        dto.eto,
        &dto.compass_rose,
        dto.real_eto,
        dto.radiation_uv,
        dto.active_sensor,
        dto.solar_panel,
        dto.open_door,
        dto.low_battery,
        &dto.observations
    )
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(record.id)
}

// READ weather_station_data
pub async fn get(conn: &sqlx::PgPool, id: i64) -> Result<Option<ReadingDao>, DBError> {
    Ok(sql_stmnt!(
        ReadingDao,
        "SELECT * FROM weather_station_data WHERE id = $1",
        id
    )
    .fetch_optional(conn)
    .await?)
}

pub async fn list(
    conn: &sqlx::PgPool,
    filter: &ReadingFilter,
    skip: i64,
    limit: i64,
) -> Result<Vec<ReadingSummaryDao>, DBError> {
    Ok(sql_stmnt!(
        ReadingSummaryDao,
        r#"SELECT id, station_time, source, temperature, humidity, wind_speed, created_at
            FROM weather_station_data
            WHERE ($1::text IS NULL OR source = $1)
            AND ($2::timestamptz IS NULL OR station_time >= $2)
            AND ($3::timestamptz IS NULL OR station_time <= $3)
            ORDER BY station_time DESC, id DESC
            OFFSET $4 LIMIT $5"#,
        &filter.source,
        filter.start_time,
        filter.end_time,
        skip,
        limit
    )
    .fetch_all(conn)
    .await?)
}

pub async fn get_by_source(
    conn: &sqlx::PgPool,
    source: &str,
    limit: i64,
) -> Result<Vec<ReadingDao>, DBError> {
    Ok(sql_stmnt!(
        ReadingDao,
        r#"SELECT * FROM weather_station_data
            WHERE source = $1
            ORDER BY station_time DESC, id DESC
            LIMIT $2"#,
        source,
        limit
    )
    .fetch_all(conn)
    .await?)
}

pub async fn get_since(
    conn: &sqlx::PgPool,
    source: &str,
    since: DateTime<Utc>,
) -> Result<Vec<ReadingDao>, DBError> {
    Ok(sql_stmnt!(
        ReadingDao,
        r#"SELECT * FROM weather_station_data
            WHERE source = $1 AND station_time >= $2
            ORDER BY station_time ASC, id ASC"#,
        source,
        since
    )
    .fetch_all(conn)
    .await?)
}

pub async fn aggregate(
    conn: &sqlx::PgPool,
    source: &str,
    since: DateTime<Utc>,
) -> Result<AggregateDao, DBError> {
    Ok(sql_stmnt!(
        AggregateDao,
        r#"SELECT AVG(temperature) AS avg_temperature,
                MAX(temperature) AS max_temperature,
                MIN(temperature) AS min_temperature,
                AVG(humidity) AS avg_humidity,
                AVG(wind_speed) AS avg_wind_speed,
                MAX(wind_speed) AS max_wind_speed,
                COUNT(id) AS total_records
            FROM weather_station_data
            WHERE source = $1 AND station_time >= $2"#,
        source,
        since
    )
    .fetch_one(conn)
    .await?)
}

/// One row per source, joined back from the highest id of each group
pub async fn get_latest_per_source(conn: &sqlx::PgPool) -> Result<Vec<ReadingDao>, DBError> {
    Ok(sql_stmnt!(
        ReadingDao,
        r#"SELECT wsd.* FROM weather_station_data AS wsd
            JOIN (
                SELECT source, MAX(id) AS max_id
                FROM weather_station_data
                GROUP BY source
            ) AS latest ON (wsd.id = latest.max_id)"#
    )
    .fetch_all(conn)
    .await?)
}

pub async fn get_sources(conn: &sqlx::PgPool) -> Result<Vec<String>, DBError> {
    let mut records = sql_stmnt!(
        SourceRecord,
        "SELECT DISTINCT source FROM weather_station_data ORDER BY source ASC"
    )
    .fetch_all(conn)
    .await?;
    Ok(records.drain(..).map(|r| r.source).collect())
}

// UPDATE weather_station_data
pub async fn mark_processed(conn: &sqlx::PgPool, id: i64) -> Result<(), DBError> {
    let mut tx = conn.begin().await?;
    let locked = sql_stmnt!(
        IdRecord,
        "SELECT id FROM weather_station_data WHERE id = $1 FOR UPDATE",
        id
    )
    .fetch_optional(&mut *tx)
    .await?;
    if locked.is_none() {
        return Err(DBError::ReadingNotFound(id));
    }

    sql_stmnt!(
        "UPDATE weather_station_data SET processed = $2, updated_at = NOW() WHERE id = $1",
        id,
        PROCESSED
    )
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(())
}

// DELETE weather_station_data
pub async fn delete(conn: &sqlx::PgPool, id: i64) -> Result<(), DBError> {
    let mut tx = conn.begin().await?;
    let deleted = sql_stmnt!("DELETE FROM weather_station_data WHERE id = $1", id)
        .execute(&mut *tx)
        .await?;
    if deleted.rows_affected() == 0 {
        return Err(DBError::ReadingNotFound(id));
    }
    tx.commit().await?;
    Ok(())
}
