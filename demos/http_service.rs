use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use service_logger::Logger;

async fn health() -> &'static str {
    r#"{"status": "healthy"}"#
}

async fn version() -> &'static str {
    r#"{"name": "demo", "version": "1.0.0"}"#
}

#[tokio::main]
async fn main() {
    let logger = match Logger::from_env() {
        Ok(logger) => logger,
        Err(err) => {
            eprintln!("invalid log configuration: {err}");
            std::process::exit(2);
        }
    };
    service_logger::set_global_logger(logger.clone());

    let app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .layer(logger.http_log_layer());

    let listener = match tokio::net::TcpListener::bind("127.0.0.1:8080").await {
        Ok(listener) => listener,
        Err(err) => logger.fatal(format_args!("failed to bind: {err}")),
    };
    logger.with_field("addr", "127.0.0.1:8080").info("listening");

    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    if let Err(err) = axum::serve(listener, service).await {
        logger.fatal(format_args!("server failed: {err}"));
    }
}
