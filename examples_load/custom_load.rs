use std::sync::Arc;
use std::time::Instant;

use service_logger::noop_sink::NoopSink;
use service_logger::{Logger, LoggerConfig};

fn main() {
    let config = LoggerConfig {
        level: "debug".to_string(),
        format: "text".to_string(),
        output: Some(Arc::new(NoopSink)),
        caller_skip: 0,
    };
    let logger = Logger::new(config).with_fields([("service", "load"), ("mode", "custom")]);

    let n: u64 = 100_000;
    let start = Instant::now();

    // DEBUG threshold: every record resolves its caller.
    for i in 0..n {
        service_logger::debug!(logger, "custom load test record {}", i);
    }

    let elapsed = start.elapsed();
    println!("custom config: emitted {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
