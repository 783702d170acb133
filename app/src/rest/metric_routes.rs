use self::dto::{BannerDto, HealthyDto, LivenessDto};
use super::build_response;
use crate::observer::WeatherObserver;
use std::sync::Arc;
use warp::Filter;
use weather_core::CORE_VERSION;

pub fn routes(
    observer: &Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    banner().or(liveness()).or(health(observer.clone()))
}

/// GET /
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "Service banner", body = BannerDto))
)]
pub fn banner() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path::end())
        .and_then(|| async move {
            let ret = BannerDto {
                message: "Weather Station Webhook API".to_owned(),
                database: "PostgreSQL".to_owned(),
                status: "active".to_owned(),
                version: CORE_VERSION.to_owned(),
            };
            build_response(Ok(ret))
        })
        .boxed()
}

/// GET /health
///
/// Liveness only, the store is not touched
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses((status = 200, description = "Process is up", body = LivenessDto))
)]
pub fn liveness() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::get()
        .and(warp::path!("health"))
        .and_then(|| async move {
            let ret = LivenessDto {
                status: "healthy".to_owned(),
            };
            build_response(Ok(ret))
        })
        .boxed()
}

/// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses((status = 200, description = "Store reachability", body = HealthyDto))
)]
pub fn health(
    observer: Arc<WeatherObserver>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::any()
        .map(move || observer.clone())
        .and(warp::get())
        .and(warp::path!("api" / "health"))
        .and_then(|observer: Arc<WeatherObserver>| async move {
            let database_state = observer.check_db().await;
            let ret = HealthyDto {
                healthy: database_state == "healthy",
                database_state,
                version: CORE_VERSION.to_owned(),
            };
            build_response(Ok(ret))
        })
        .boxed()
}

pub mod dto {
    use serde::{Deserialize, Serialize};
    use utoipa::ToSchema;

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct BannerDto {
        pub message: String,
        pub database: String,
        pub status: String,
        pub version: String,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct LivenessDto {
        pub status: String,
    }

    #[derive(Debug, Serialize, Deserialize, ToSchema)]
    pub struct HealthyDto {
        pub healthy: bool,
        pub database_state: String,
        pub version: String,
    }
}
