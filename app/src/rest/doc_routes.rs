use super::metric_routes::dto::{BannerDto, HealthyDto, LivenessDto};
use super::{analysis_routes, metric_routes, reading_routes, ErrorDto};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::Config;
use warp::Filter;
use warp::{
    http::Uri,
    hyper::{Response, StatusCode},
    path::{FullPath, Tail},
    Rejection, Reply,
};
use weather_core::{
    Ack, HumidityStats, IngestAck, ProbabilityReport, RainDiagnostics, Reading, ReadingPayload,
    ReadingSummary, SourceList, Statistics, StatsReport, TemperatureStats, WindStats,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        reading_routes::ingest,
        reading_routes::list_readings,
        reading_routes::latest_readings,
        reading_routes::readings_by_source,
        reading_routes::reading_by_id,
        reading_routes::mark_processed,
        reading_routes::delete_reading,
        reading_routes::list_sources,
        analysis_routes::source_statistics,
        analysis_routes::rain_probability,
        metric_routes::banner,
        metric_routes::liveness,
        metric_routes::health,
    ),
    components(schemas(
        ReadingPayload,
        Reading,
        ReadingSummary,
        IngestAck,
        Ack,
        SourceList,
        StatsReport,
        Statistics,
        TemperatureStats,
        HumidityStats,
        WindStats,
        ProbabilityReport,
        RainDiagnostics,
        ErrorDto,
        BannerDto,
        LivenessDto,
        HealthyDto,
    )),
    tags(
        (name = "readings", description = "Ingestion and retrieval of station readings"),
        (name = "analysis", description = "Window statistics and rain estimation"),
        (name = "health", description = "Liveness and store reachability"),
    )
)]
pub struct ApiDoc;

pub fn swagger() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api = Arc::new(ApiDoc::openapi());
    let config = Arc::new(Config::from("/api/doc/api.json"));

    warp::path!("api" / "doc" / "api.json")
        .and(warp::get())
        .map(move || warp::reply::json(api.as_ref()))
        .or(warp::path("api")
            .and(warp::path("doc"))
            .and(warp::get())
            .and(warp::path::full())
            .and(warp::path::tail())
            .and(warp::any().map(move || config.clone()))
            .and_then(serve_swagger))
}

async fn serve_swagger(
    full_path: FullPath,
    tail: Tail,
    config: Arc<Config<'static>>,
) -> Result<Box<dyn Reply + 'static>, Rejection> {
    if full_path.as_str() == "/api/doc" {
        return Ok(Box::new(warp::redirect::found(Uri::from_static(
            "/api/doc/",
        ))));
    }

    let path = tail.as_str();
    match utoipa_swagger_ui::serve(path, config) {
        Ok(Some(file)) => Ok(Box::new(
            Response::builder()
                .header("Content-Type", file.content_type)
                .body(file.bytes),
        )),
        Ok(None) => Ok(Box::new(StatusCode::NOT_FOUND)),
        Err(error) => Ok(Box::new(
            Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(error.to_string()),
        )),
    }
}
