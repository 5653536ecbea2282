use crate::cli::ServeArgs;
use crate::infra::{spawn_initial_load, AppState};
use crate::routes::with_forecast_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use electoral_forecast::config::AppConfig;
use electoral_forecast::error::AppError;
use electoral_forecast::forecast::{ForecastService, JsonDirectorySource};
use electoral_forecast::telemetry;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir.take() {
        config.data.data_dir = data_dir;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let forecast_service = Arc::new(ForecastService::new(config.data.election()?)?);
    spawn_initial_load(
        forecast_service.clone(),
        JsonDirectorySource::new(config.data.data_dir.clone()),
        readiness_flag,
    );

    let app = with_forecast_routes(forecast_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(
        ?config.environment,
        %addr,
        data_dir = %config.data.data_dir.display(),
        "electoral forecast service listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
