use std::sync::Arc;

use service_logger::context::with_request_context;
use service_logger::global;
use service_logger::sink::StderrSink;
use service_logger::{Logger, LoggerConfig, RequestContext};

async fn handle_order(order_id: u64) {
    let logger = global::global_logger().with_current_context();
    logger.with_field("order_id", order_id).info("order accepted");
    if order_id % 2 == 0 {
        service_logger::warn!(logger, "order {} needs manual review", order_id);
    }
}

#[tokio::main]
async fn main() {
    // Install the configured logger before any task starts logging.
    global::set_global_logger(Logger::new(LoggerConfig {
        level: "debug".to_string(),
        format: "text".to_string(),
        output: Some(Arc::new(StderrSink)),
        caller_skip: 0,
    }));

    global::info("service starting");

    let mut tasks = Vec::new();
    for order_id in 1..=4u64 {
        let ctx = RequestContext::new(format!("req-{order_id}")).with_user("u-100");
        tasks.push(tokio::spawn(with_request_context(ctx, handle_order(order_id))));
    }
    for task in tasks {
        let _ = task.await;
    }

    global::with_field("orders", 4).debug("batch done");
}
