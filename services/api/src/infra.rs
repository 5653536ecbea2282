use electoral_forecast::forecast::{DateKey, ForecastService, JsonDirectorySource};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads forecast data in the background and flips the readiness flag once
/// queries can be served. A failed load leaves the service unready.
pub(crate) fn spawn_initial_load(
    service: Arc<ForecastService>,
    source: JsonDirectorySource,
    readiness: Arc<AtomicBool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match service.load(&source).await {
            Ok(()) => {
                readiness.store(true, Ordering::Release);
                info!(dir = %source.dir().display(), "forecast data ready");
            }
            Err(err) => error!(%err, "failed to load forecast data"),
        }
    })
}

pub(crate) fn parse_date(raw: &str) -> Result<DateKey, String> {
    ForecastService::parse_date(raw)
        .map_err(|err| format!("failed to parse '{raw}' as a date ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use electoral_forecast::config::ElectionConfig;
    use std::path::PathBuf;

    fn service() -> Arc<ForecastService> {
        Arc::new(ForecastService::new(ElectionConfig::default()).expect("default config"))
    }

    #[tokio::test]
    async fn readiness_flips_after_bundled_data_loads() {
        let service = service();
        let readiness = Arc::new(AtomicBool::new(false));
        let assets = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/json");

        spawn_initial_load(
            service.clone(),
            JsonDirectorySource::new(assets),
            readiness.clone(),
        )
        .await
        .expect("load task completes");

        assert!(readiness.load(Ordering::Acquire));
        assert!(service.is_ready());
    }

    #[tokio::test]
    async fn failed_load_leaves_service_unready() {
        let service = service();
        let readiness = Arc::new(AtomicBool::new(false));

        spawn_initial_load(
            service.clone(),
            JsonDirectorySource::new("/nonexistent/forecast-data"),
            readiness.clone(),
        )
        .await
        .expect("load task completes");

        assert!(!readiness.load(Ordering::Acquire));
        assert!(!service.is_ready());
    }

    #[test]
    fn parse_date_reports_the_raw_value() {
        assert!(parse_date("20241105").is_ok());
        let err = parse_date("Nov 5").expect_err("rejected");
        assert!(err.contains("'Nov 5'"));
    }
}
