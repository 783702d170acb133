use crate::config::CONFIG;
use crate::error::{ServerError, ServiceError};
use crate::observer::WeatherObserver;
use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::http::StatusCode;
use warp::{Filter, Reply};

mod analysis_routes;
mod doc_routes;
mod metric_routes;
mod query;
mod reading_routes;

#[cfg(test)]
mod test;

/// Every api route, without documentation and CORS
pub fn routes(
    observer: &Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    reading_routes::routes(observer)
        .or(analysis_routes::routes(observer))
        .or(metric_routes::routes(observer))
}

/// Api and documentation routes, every rejection answered with an `ErrorDto`
pub fn api(
    observer: &Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = Infallible> + Clone {
    routes(observer)
        .or(doc_routes::swagger())
        .recover(handle_rejection)
}

pub async fn dispatch_server_daemon(
    observer: Arc<WeatherObserver>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type", "accept", "authorization", "origin"]);
    let api = api(&observer)
        .with(cors)
        .with(warp::trace::request());

    let addr = CONFIG.server_addr()?;
    let (bound, server) = warp::serve(api).try_bind_with_graceful_shutdown(addr, shutdown)?;
    info!("Starting webserver at: {}", bound);
    server.await;
    info!("Webserver stopped");
    Ok(())
}

#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorDto {
    pub detail: String,
}

fn build_response<T: serde::Serialize>(
    resp: Result<T, ServiceError>,
) -> Result<warp::reply::Response, warp::Rejection> {
    let (status, err) = match resp {
        Ok(data) => return Ok(warp::reply::json(&data).into_response()),
        Err(err @ ServiceError::Validation(_)) => {
            warn!("{}", err);
            (StatusCode::BAD_REQUEST, err)
        }
        Err(err @ ServiceError::NotFound(_)) => {
            warn!("{}", err);
            (StatusCode::NOT_FOUND, err)
        }
        Err(err @ ServiceError::Persistence(_)) => {
            error!("{}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, err)
        }
    };
    let body = ErrorDto {
        detail: err.to_string(),
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}

/// Path segments arrive percent-encoded, sources may contain any character
fn decode_segment(segment: &str) -> Result<String, ServiceError> {
    urlencoding::decode(segment)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| {
            ServiceError::Validation(format!("Invalid path segment '{}': {}", segment, e))
        })
}

async fn handle_rejection(err: warp::Rejection) -> Result<warp::reply::Response, Infallible> {
    let (status, detail) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found".to_owned())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        (
            StatusCode::BAD_REQUEST,
            format!("{}, timestamps need a 'Z' suffix or an encoded '+'", e),
        )
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::PayloadTooLarge>() {
        (StatusCode::PAYLOAD_TOO_LARGE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::LengthRequired>() {
        (StatusCode::LENGTH_REQUIRED, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::UnsupportedMediaType>() {
        (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::MethodNotAllowed>() {
        (StatusCode::METHOD_NOT_ALLOWED, e.to_string())
    } else {
        error!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_owned(),
        )
    };

    warn!("Rejected request: {}", detail);
    let body = ErrorDto { detail };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}
