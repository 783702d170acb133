use std::sync::Arc;

use chrono::{Duration, SubsecRound, Utc};
use serde_json::{json, Value};
use warp::Filter;
use weather_core::{Ack, IngestAck, ProbabilityReport, Reading, ReadingSummary, SourceList};

use super::*;
use crate::models::memory::MemoryReadingStore;
use crate::models::ReadingStore;

fn build_mocked_observer() -> (Arc<WeatherObserver>, Arc<MemoryReadingStore>) {
    let store = Arc::new(MemoryReadingStore::new());
    let observer = WeatherObserver::new(store.clone());
    (observer, store)
}

fn station_json(source: &str, hours_ago: i64, humidity: f64, pressure: f64) -> Value {
    let station_time = Utc::now().trunc_subsecs(0) - Duration::hours(hours_ago);
    json!({
        "stationTime": station_time.to_rfc3339(),
        "source": source,
        "temperature": 21.5,
        "realPrecipitation": 0.1,
        "presure": pressure,
        "windSpeed": 3.5,
        "humidity": humidity,
        "compassRose": "NE",
        "realETO": 0.3,
        "radiationUV": 4.0,
        "lowBattery": 0,
    })
}

async fn post_reading<F>(routes: &F, body: &Value) -> IngestAck
where
    F: Filter + 'static,
    F::Extract: warp::Reply + Send,
{
    let res = warp::test::request()
        .path("/webhook")
        .method("POST")
        .json(body)
        .reply(routes)
        .await;
    assert_eq!(res.status(), 200);
    serde_json::from_slice(res.body()).unwrap()
}

#[tokio::test]
async fn test_rest_ingest_and_fetch() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);

    // Execute
    let ack = post_reading(&routes, &station_json("sensor_001", 1, 60.0, 1012.5)).await;
    let res = warp::test::request()
        .path(&format!("/data/{}", ack.id.unwrap()))
        .reply(&routes)
        .await;

    // Validate
    assert!(ack.success);
    assert_eq!(res.status(), 200);
    let reading: Reading = serde_json::from_slice(res.body()).unwrap();
    assert_eq!("sensor_001", reading.source);
    assert_eq!(Some(1012.5), reading.pressure);
    assert_eq!(Some(0.3), reading.real_eto);
    assert_eq!(Some(4.0), reading.radiation_uv);
    assert_eq!(Some("NE".to_owned()), reading.compass_rose);
    assert_eq!(None, reading.eto);
    assert_eq!(0, reading.processed);

    let raw: Value = serde_json::from_slice(res.body()).unwrap();
    assert!(raw.get("station_time").is_some());
    assert!(raw.get("real_precipitation").is_some());
    assert_eq!(1012.5, raw["pressure"]);
    assert!(raw.get("presure").is_none());
}

#[tokio::test]
async fn test_rest_ingest_missing_source() {
    // Prepare
    let (observer, store) = build_mocked_observer();
    let routes = routes(&observer);
    let mut body = station_json("sensor_001", 1, 60.0, 1012.5);
    body.as_object_mut().unwrap().remove("source");

    // Execute
    let res = warp::test::request()
        .path("/webhook")
        .method("POST")
        .json(&body)
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(res.status(), 400);
    let err: ErrorDto = serde_json::from_slice(res.body()).unwrap();
    assert!(err.detail.contains("source"));
    assert_eq!(0, store.count().await.unwrap());
}

#[tokio::test]
async fn test_rest_ingest_store_failure() {
    // Prepare
    let (observer, store) = build_mocked_observer();
    let routes = routes(&observer);
    store.set_failing(true);

    // Execute
    let res = warp::test::request()
        .path("/webhook")
        .method("POST")
        .json(&station_json("sensor_001", 1, 60.0, 1012.5))
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(res.status(), 500);
    let _: ErrorDto = serde_json::from_slice(res.body()).unwrap();
}

#[tokio::test]
async fn test_rest_list_and_filter() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    for (source, hours) in [("north", 3), ("south", 2), ("north", 1)].iter() {
        post_reading(&routes, &station_json(source, *hours, 60.0, 1012.0)).await;
    }

    // Execute
    let all = warp::test::request().path("/data").reply(&routes).await;
    let north = warp::test::request()
        .path("/data?source=north&limit=1")
        .reply(&routes)
        .await;
    let invalid = warp::test::request()
        .path("/data?limit=5000")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(all.status(), 200);
    let all: Vec<ReadingSummary> = serde_json::from_slice(all.body()).unwrap();
    assert_eq!(3, all.len());
    assert!(all
        .windows(2)
        .all(|w| w[0].station_time >= w[1].station_time));

    assert_eq!(north.status(), 200);
    let north: Vec<ReadingSummary> = serde_json::from_slice(north.body()).unwrap();
    assert_eq!(1, north.len());
    assert_eq!("north", north[0].source);
    assert_eq!(all[0].id, north[0].id);

    assert_eq!(invalid.status(), 400);
}

#[tokio::test]
async fn test_rest_source_routes() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    post_reading(&routes, &station_json("b_station", 2, 60.0, 1012.0)).await;
    post_reading(&routes, &station_json("a_station", 1, 60.0, 1012.0)).await;

    // Execute
    let by_source = warp::test::request()
        .path("/data/source/a_station")
        .reply(&routes)
        .await;
    let unknown = warp::test::request()
        .path("/data/source/unknown")
        .reply(&routes)
        .await;
    let latest = warp::test::request()
        .path("/data/latest/all")
        .reply(&routes)
        .await;
    let sources = warp::test::request()
        .path("/sources/list")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(by_source.status(), 200);
    let by_source: Vec<Reading> = serde_json::from_slice(by_source.body()).unwrap();
    assert_eq!(1, by_source.len());

    assert_eq!(unknown.status(), 404);

    assert_eq!(latest.status(), 200);
    let latest: Vec<Reading> = serde_json::from_slice(latest.body()).unwrap();
    assert_eq!(2, latest.len());

    assert_eq!(sources.status(), 200);
    let sources: SourceList = serde_json::from_slice(sources.body()).unwrap();
    assert_eq!(2, sources.total);
    assert_eq!(vec!["a_station", "b_station"], sources.sources);
}

#[tokio::test]
async fn test_rest_source_routes_decode_path() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    post_reading(&routes, &station_json("Estación Norte", 2, 95.0, 1010.0)).await;
    post_reading(&routes, &station_json("Estación Norte", 1, 95.0, 1008.0)).await;

    // Execute
    let by_source = warp::test::request()
        .path("/data/source/Estaci%C3%B3n%20Norte")
        .reply(&routes)
        .await;
    let stats = warp::test::request()
        .path("/statistics/source/Estaci%C3%B3n%20Norte")
        .reply(&routes)
        .await;
    let rain = warp::test::request()
        .path("/predict/rain_probability/Estaci%C3%B3n%20Norte")
        .reply(&routes)
        .await;
    let invalid = warp::test::request()
        .path("/data/source/%FF")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(by_source.status(), 200);
    let by_source: Vec<Reading> = serde_json::from_slice(by_source.body()).unwrap();
    assert_eq!(2, by_source.len());
    assert!(by_source.iter().all(|r| r.source == "Estación Norte"));

    assert_eq!(stats.status(), 200);
    let stats: Value = serde_json::from_slice(stats.body()).unwrap();
    assert_eq!("Estación Norte", stats["source"]);
    assert_eq!(2, stats["statistics"]["total_records"]);

    assert_eq!(rain.status(), 200);
    let rain: ProbabilityReport = serde_json::from_slice(rain.body()).unwrap();
    assert_eq!("Estación Norte", rain.source);
    assert_eq!(2, rain.records_analyzed);

    assert_eq!(invalid.status(), 400);
    let _: ErrorDto = serde_json::from_slice(invalid.body()).unwrap();
}

#[tokio::test]
async fn test_rest_rejections_carry_error_dto() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let api = api(&observer);
    post_reading(&api, &station_json("sensor_001", 1, 60.0, 1012.0)).await;

    // Execute
    let plus_offset = warp::test::request()
        .path("/data?start_date=2020-01-01T00:00:00+00:00")
        .reply(&api)
        .await;
    let zulu = warp::test::request()
        .path("/data?start_date=2020-01-01T00:00:00Z")
        .reply(&api)
        .await;
    let encoded_offset = warp::test::request()
        .path("/data?start_date=2020-01-01T00:00:00%2B00:00")
        .reply(&api)
        .await;
    let malformed = warp::test::request()
        .path("/webhook")
        .method("POST")
        .header("content-type", "application/json")
        .body("{\"source\": ")
        .reply(&api)
        .await;

    // Validate
    assert_eq!(plus_offset.status(), 400);
    let err: ErrorDto = serde_json::from_slice(plus_offset.body()).unwrap();
    assert!(err.detail.contains("'Z'"));

    assert_eq!(zulu.status(), 200);
    let zulu: Vec<ReadingSummary> = serde_json::from_slice(zulu.body()).unwrap();
    assert_eq!(1, zulu.len());
    assert_eq!(encoded_offset.status(), 200);

    assert_eq!(malformed.status(), 400);
    let _: ErrorDto = serde_json::from_slice(malformed.body()).unwrap();
}

#[tokio::test]
async fn test_rest_mark_processed_and_delete() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    let id = post_reading(&routes, &station_json("sensor_001", 1, 60.0, 1012.0))
        .await
        .id
        .unwrap();
    let mark_path = format!("/data/{}/mark-processed", id);
    let data_path = format!("/data/{}", id);

    // Execute
    let marked = warp::test::request()
        .method("PUT")
        .path(&mark_path)
        .reply(&routes)
        .await;
    let marked_again = warp::test::request()
        .method("PUT")
        .path(&mark_path)
        .reply(&routes)
        .await;
    let deleted = warp::test::request()
        .method("DELETE")
        .path(&data_path)
        .reply(&routes)
        .await;
    let fetched = warp::test::request().path(&data_path).reply(&routes).await;
    let deleted_again = warp::test::request()
        .method("DELETE")
        .path(&data_path)
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(marked.status(), 200);
    assert_eq!(marked_again.status(), 200);
    let ack: Ack = serde_json::from_slice(marked_again.body()).unwrap();
    assert_eq!(id, ack.id);

    assert_eq!(deleted.status(), 200);
    assert_eq!(fetched.status(), 404);
    assert_eq!(deleted_again.status(), 404);
}

#[tokio::test]
async fn test_rest_statistics() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    post_reading(&routes, &station_json("sensor_001", 2, 50.0, 1012.0)).await;
    post_reading(&routes, &station_json("sensor_001", 1, 70.0, 1012.0)).await;

    // Execute
    let res = warp::test::request()
        .path("/statistics/source/sensor_001?hours=12")
        .reply(&routes)
        .await;
    let empty = warp::test::request()
        .path("/statistics/source/sensor_002")
        .reply(&routes)
        .await;
    let too_long = warp::test::request()
        .path("/statistics/source/sensor_001?hours=721")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(res.status(), 200);
    let report: Value = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(12, report["period_hours"]);
    assert_eq!(2, report["statistics"]["total_records"]);
    assert_eq!(60.0, report["statistics"]["humidity"]["average"]);
    assert_eq!(21.5, report["statistics"]["temperature"]["maximum"]);

    assert_eq!(empty.status(), 404);
    assert_eq!(too_long.status(), 400);
}

#[tokio::test]
async fn test_rest_rain_probability() {
    // Prepare
    let (observer, _) = build_mocked_observer();
    let routes = routes(&observer);
    post_reading(&routes, &station_json("sensor_001", 2, 95.0, 1010.0)).await;
    post_reading(&routes, &station_json("sensor_001", 1, 95.0, 1008.0)).await;
    post_reading(&routes, &station_json("sensor_002", 1, 95.0, 1008.0)).await;

    // Execute
    let res = warp::test::request()
        .path("/predict/rain_probability/sensor_001")
        .reply(&routes)
        .await;
    let single = warp::test::request()
        .path("/predict/rain_probability/sensor_002")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(res.status(), 200);
    let report: ProbabilityReport = serde_json::from_slice(res.body()).unwrap();
    assert_eq!(6, report.period_hours);
    assert_eq!(2, report.records_analyzed);
    assert_eq!(90, report.rain_probability);
    assert_eq!(-2.0, report.debug_info.pressure_change);

    assert_eq!(single.status(), 404);
}

#[tokio::test]
async fn test_rest_health() {
    // Prepare
    let (observer, store) = build_mocked_observer();
    let routes = routes(&observer);

    // Execute
    let banner = warp::test::request().path("/").reply(&routes).await;
    let liveness = warp::test::request().path("/health").reply(&routes).await;
    let healthy = warp::test::request()
        .path("/api/health")
        .reply(&routes)
        .await;
    store.set_failing(true);
    let unhealthy = warp::test::request()
        .path("/api/health")
        .reply(&routes)
        .await;

    // Validate
    assert_eq!(banner.status(), 200);
    let banner: Value = serde_json::from_slice(banner.body()).unwrap();
    assert_eq!("PostgreSQL", banner["database"]);
    assert_eq!("active", banner["status"]);

    assert_eq!(liveness.status(), 200);
    let liveness: Value = serde_json::from_slice(liveness.body()).unwrap();
    assert_eq!("healthy", liveness["status"]);

    let healthy: Value = serde_json::from_slice(healthy.body()).unwrap();
    assert_eq!(true, healthy["healthy"]);
    let unhealthy: Value = serde_json::from_slice(unhealthy.body()).unwrap();
    assert_eq!(false, unhealthy["healthy"]);
}
