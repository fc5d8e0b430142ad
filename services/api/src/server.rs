use crate::cli::ServeArgs;
use crate::infra::{build_board, seed_demo, AppState, DEMO_ADMIN_EMAIL};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let board = build_board(&config.board);
    if args.demo_data {
        seed_demo(&board)?;
        info!(admin = DEMO_ADMIN_EMAIL, "serving demo data");
    }
    match (args.admin_email.take(), args.admin_password.take()) {
        (Some(email), Some(password)) => {
            board.seed_admin(&email, &password)?;
        }
        (Some(_), None) | (None, Some(_)) => {
            warn!("--admin-email and --admin-password must be given together; no admin seeded");
        }
        (None, None) => {}
    }

    let app = with_board_routes(board.service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        page_size = config.board.page_size,
        "job board api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
