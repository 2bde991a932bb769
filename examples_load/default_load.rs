use std::sync::Arc;
use std::thread;
use std::time::Instant;

use service_logger::noop_sink::NoopSink;
use service_logger::Logger;

fn main() {
    let logger = Logger::for_sink(Arc::new(NoopSink)).with_field("service", "load");

    let n: u64 = 100_000;
    let workers = 4;
    let start = Instant::now();

    let handles: Vec<_> = (0..workers)
        .map(|w| {
            let logger = logger.with_field("worker", w);
            thread::spawn(move || {
                for i in 0..n / workers {
                    service_logger::info!(logger, "default load test record {}", i);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }

    let elapsed = start.elapsed();
    println!("default config: emitted {} records in {:?} (~{:.0} rec/s)",
        n,
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
