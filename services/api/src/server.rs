use crate::cli::ServeArgs;
use crate::infra::{build_marketplace, spawn_settlement_task, AppState, MarketplaceParts};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use recruit_ledger::config::AppConfig;
use recruit_ledger::error::AppError;
use recruit_ledger::telemetry;
use std::sync::atomic::Ordering;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let MarketplaceParts {
        state,
        coordinator,
        ledger,
        transfers,
    } = build_marketplace(config.marketplace.min_escrow);
    spawn_settlement_task(transfers, ledger, coordinator);

    let app = with_marketplace_routes(state)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "recruitment marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
