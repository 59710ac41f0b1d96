use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryEscalationPublisher, InMemoryTicketRepository};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use studio_ai::config::AppConfig;
use studio_ai::error::AppError;
use studio_ai::platform::{
    DirectoryState, PlatformClient, ReqwestTransport, SessionCollector, TokenManager,
};
use studio_ai::routing::{HttpTicketClassifier, TicketIntakeService, TicketRouter};
use studio_ai::telemetry;
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

    let rules = config.routing_rules()?;
    let classifier = Arc::new(HttpTicketClassifier::new(config.classifier.clone())?);
    let repository = Arc::new(InMemoryTicketRepository::default());
    let notifications = Arc::new(InMemoryEscalationPublisher::default());
    let intake = Arc::new(TicketIntakeService::new(
        repository,
        notifications,
        TicketRouter::new(classifier, rules),
    ));

    if !config.platform.is_complete() {
        info!("platform credentials incomplete; directory queries will return empty results");
    }
    let base_url = config.platform.base_url.clone().unwrap_or_default();
    let transport = Arc::new(ReqwestTransport::new(&base_url)?);
    let tokens = Arc::new(TokenManager::new(transport.clone(), config.platform.clone()));
    let client = Arc::new(PlatformClient::new(transport, tokens));
    let locations = config.location_directory()?;
    let directory = Arc::new(DirectoryState {
        client: client.clone(),
        collector: SessionCollector::new(client, locations),
    });

    let app = app_router(intake, directory)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "studio support intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
