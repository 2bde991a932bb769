use std::sync::Arc;

use service_logger::sink::StdoutSink;
use service_logger::{Logger, LoggerConfig};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

fn main() {
    let logger = Logger::new(LoggerConfig {
        output: Some(Arc::new(StdoutSink)),
        ..LoggerConfig::default()
    })
    .with_field("service", "auth");

    // Route every `tracing` event in the process through the logger.
    let subscriber = Registry::default().with(logger.tracing_layer());
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        logger.error("a global tracing subscriber was already installed");
        return;
    }

    info!("starting service");
    error!(user_id = 42, reason = "invalid password", "authentication failed");
}
