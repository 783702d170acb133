use super::query::HoursQuery;
use super::{build_response, decode_segment};
use crate::observer::WeatherObserver;
use std::sync::Arc;
use warp::Filter;

pub fn routes(
    observer: &Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    source_statistics(observer.clone()).or(rain_probability(observer.clone()))
}

/// GET /statistics/source/:source
///
/// Aggregates over the trailing window, 24 hours unless `hours` is given
#[utoipa::path(
    get,
    path = "/statistics/source/{source}",
    tag = "analysis",
    params(
        ("source" = String, Path, description = "Station identifier"),
        HoursQuery,
    ),
    responses(
        (status = 200, description = "Window statistics", body = StatsReport),
        (status = 400, description = "Window out of range", body = ErrorDto),
        (status = 404, description = "No readings in the window", body = ErrorDto),
    )
)]
pub fn source_statistics(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("statistics" / "source" / String))
        .and(warp::query::<HoursQuery>())
        .and_then(
            |observer: Arc<WeatherObserver>, source: String, query: HoursQuery| async move {
                let resp = match decode_segment(&source) {
                    Ok(source) => observer.stats_for_source(&source, query.hours).await,
                    Err(e) => Err(e),
                };
                build_response(resp)
            },
        )
        .boxed()
}

/// GET /predict/rain_probability/:source
///
/// Heuristic rain score in [0, 100], 6 hours window unless `hours` is given
#[utoipa::path(
    get,
    path = "/predict/rain_probability/{source}",
    tag = "analysis",
    params(
        ("source" = String, Path, description = "Station identifier"),
        HoursQuery,
    ),
    responses(
        (status = 200, description = "Rain probability", body = ProbabilityReport),
        (status = 400, description = "Window out of range", body = ErrorDto),
        (status = 404, description = "Less than two readings in the window", body = ErrorDto),
    )
)]
pub fn rain_probability(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("predict" / "rain_probability" / String))
        .and(warp::query::<HoursQuery>())
        .and_then(
            |observer: Arc<WeatherObserver>, source: String, query: HoursQuery| async move {
                let resp = match decode_segment(&source) {
                    Ok(source) => observer.rain_probability(&source, query.hours).await,
                    Err(e) => Err(e),
                };
                build_response(resp)
            },
        )
        .boxed()
}
