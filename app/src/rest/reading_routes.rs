use super::query::{LimitQuery, ListQuery};
use super::{build_response, decode_segment};
use crate::observer::WeatherObserver;
use std::sync::Arc;
use warp::Filter;
use weather_core::ReadingPayload;

/// Largest accepted webhook body
const MAX_PAYLOAD_BYTES: u64 = 16 * 1024;

pub fn routes(
    observer: &Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    ingest(observer.clone())
        .or(list_readings(observer.clone()))
        .or(latest_readings(observer.clone()))
        .or(readings_by_source(observer.clone()))
        .or(reading_by_id(observer.clone()))
        .or(mark_processed(observer.clone()))
        .or(delete_reading(observer.clone()))
        .or(list_sources(observer.clone()))
}

/// POST /webhook
///
/// Accepts one station payload in the camelCase wire format
#[utoipa::path(
    post,
    path = "/webhook",
    tag = "readings",
    request_body = ReadingPayload,
    responses(
        (status = 200, description = "Reading stored", body = IngestAck),
        (status = 400, description = "Required field missing", body = ErrorDto),
        (status = 500, description = "Store failure", body = ErrorDto),
    )
)]
pub fn ingest(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::post())
        .and(warp::path!("webhook"))
        .and(warp::body::content_length_limit(MAX_PAYLOAD_BYTES))
        .and(warp::body::json())
        .and_then(
            |observer: Arc<WeatherObserver>, payload: ReadingPayload| async move {
                let resp = observer.ingest(payload).await;
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /data
///
/// Summaries ordered by station time, newest first
#[utoipa::path(
    get,
    path = "/data",
    tag = "readings",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of readings", body = [ReadingSummary]),
        (status = 400, description = "Pagination out of range", body = ErrorDto),
    )
)]
pub fn list_readings(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("data"))
        .and(warp::query::<ListQuery>())
        .and_then(
            |observer: Arc<WeatherObserver>, query: ListQuery| async move {
                let resp = observer
                    .list(query.skip, query.limit, query.filter())
                    .await;
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /data/latest/all
///
/// The most recently stored reading of every source
#[utoipa::path(
    get,
    path = "/data/latest/all",
    tag = "readings",
    responses(
        (status = 200, description = "One reading per source", body = [Reading]),
    )
)]
pub fn latest_readings(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("data" / "latest" / "all"))
        .and_then(|observer: Arc<WeatherObserver>| async move {
            let resp = observer.latest_per_source().await;
            build_response(resp)
        })
        .boxed()
}

/// GET /data/source/:source
#[utoipa::path(
    get,
    path = "/data/source/{source}",
    tag = "readings",
    params(
        ("source" = String, Path, description = "Station identifier"),
        LimitQuery,
    ),
    responses(
        (status = 200, description = "Readings of the source, newest first", body = [Reading]),
        (status = 404, description = "Source has no readings", body = ErrorDto),
    )
)]
pub fn readings_by_source(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("data" / "source" / String))
        .and(warp::query::<LimitQuery>())
        .and_then(
            |observer: Arc<WeatherObserver>, source: String, query: LimitQuery| async move {
                let resp = match decode_segment(&source) {
                    Ok(source) => observer.list_by_source(&source, query.limit).await,
                    Err(e) => Err(e),
                };
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /data/:id
#[utoipa::path(
    get,
    path = "/data/{id}",
    tag = "readings",
    params(("id" = i64, Path, description = "Reading id")),
    responses(
        (status = 200, description = "The full reading", body = Reading),
        (status = 404, description = "Unknown id", body = ErrorDto),
    )
)]
pub fn reading_by_id(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("data" / i64))
        .and_then(|observer: Arc<WeatherObserver>, id: i64| async move {
            let resp = observer.get_by_id(id).await;
            build_response(resp)
        })
        .boxed()
}

/// PUT /data/:id/mark-processed
///
/// Idempotent, marking twice still returns 200
#[utoipa::path(
    put,
    path = "/data/{id}/mark-processed",
    tag = "readings",
    params(("id" = i64, Path, description = "Reading id")),
    responses(
        (status = 200, description = "Reading is processed", body = Ack),
        (status = 404, description = "Unknown id", body = ErrorDto),
    )
)]
pub fn mark_processed(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::put())
        .and(warp::path!("data" / i64 / "mark-processed"))
        .and_then(|observer: Arc<WeatherObserver>, id: i64| async move {
            let resp = observer.mark_processed(id).await;
            build_response(resp)
        })
        .boxed()
}

/// DELETE /data/:id
#[utoipa::path(
    delete,
    path = "/data/{id}",
    tag = "readings",
    params(("id" = i64, Path, description = "Reading id")),
    responses(
        (status = 200, description = "Reading deleted", body = Ack),
        (status = 404, description = "Unknown id", body = ErrorDto),
    )
)]
pub fn delete_reading(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::delete())
        .and(warp::path!("data" / i64))
        .and_then(|observer: Arc<WeatherObserver>, id: i64| async move {
            let resp = observer.delete(id).await;
            build_response(resp)
        })
        .boxed()
}

/// GET /sources/list
#[utoipa::path(
    get,
    path = "/sources/list",
    tag = "readings",
    responses(
        (status = 200, description = "Distinct sources in lexical order", body = SourceList),
    )
)]
pub fn list_sources(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("sources" / "list"))
        .and_then(|observer: Arc<WeatherObserver>| async move {
            let resp = observer.list_sources().await;
            build_response(resp)
        })
        .boxed()
}
