use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use serde_json::{json, Value};
use service_logger::{global, LogSink, Logger, LoggerConfig, MemorySink, RequestContext, Severity};

// Tests in this file share the process-wide slot.
static SLOT: Mutex<()> = Mutex::new(());

fn lock_slot() -> MutexGuard<'static, ()> {
    SLOT.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn install(level: &str) -> MemorySink {
    let sink = MemorySink::new();
    global::set_global_logger(Logger::new(LoggerConfig {
        level: level.to_string(),
        output: Some(Arc::new(sink.clone())),
        ..LoggerConfig::default()
    }));
    sink
}

fn records(sink: &MemorySink) -> Vec<Value> {
    sink.lines()
        .iter()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn default_slot_is_info_json() {
    let _guard = lock_slot();
    global::set_global_logger(Logger::default());
    let logger = global::global_logger();
    assert_eq!(logger.threshold(), Severity::Info);
    assert_eq!(logger.strategy(), service_logger::RenderStrategy::Structured);
}

#[test]
fn free_functions_forward_to_installed_logger() {
    let _guard = lock_slot();
    let sink = install("warn");

    global::debug("dropped");
    global::info("dropped");
    global::warn("kept warn");
    global::error(format_args!("kept {}", "error"));
    global::log(Severity::Fatal, "kept fatal");

    let messages: Vec<Value> = records(&sink).into_iter().map(|r| r["message"].clone()).collect();
    assert_eq!(messages, vec![json!("kept warn"), json!("kept error"), json!("kept fatal")]);
}

#[test]
fn derivations_use_current_slot_without_mutating_it() {
    let _guard = lock_slot();
    let sink = install("info");

    global::with_field("a", 1).info("one");
    global::with_fields([("b", 2), ("c", 3)]).info("two");
    global::with_context(&RequestContext::new("req-1")).info("three");
    global::info("four");

    let records = records(&sink);
    assert_eq!(records[0]["fields"], json!({"a": 1}));
    assert_eq!(records[1]["fields"], json!({"b": 2, "c": 3}));
    assert_eq!(records[2]["fields"], json!({"request_id": "req-1"}));
    assert!(records[3].get("fields").is_none());
}

#[test]
fn replacement_redirects_later_calls() {
    let _guard = lock_slot();
    let first = install("info");
    global::info("to first");
    let second = install("info");
    global::info("to second");

    assert_eq!(first.lines().len(), 1);
    assert_eq!(second.lines().len(), 1);
}

#[test]
fn error_caller_points_at_free_function_call_site() {
    let _guard = lock_slot();
    let sink = install("info");
    let line = line!() + 1;
    global::error("with caller");

    assert_eq!(records(&sink)[0]["caller"], format!("global.rs:{line}"));
}

#[test]
fn concurrent_replacement_never_loses_whole_records() {
    let _guard = lock_slot();
    let sink = install("info");
    let shared: Arc<dyn LogSink> = Arc::new(sink.clone());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            thread::spawn(move || {
                for i in 0..50 {
                    global::info(format_args!("t{t} m{i}"));
                }
            })
        })
        .collect();
    let swapper = thread::spawn(move || {
        for i in 0..20 {
            let logger = Logger::for_sink(Arc::clone(&shared)).with_field("generation", i);
            global::set_global_logger(logger);
        }
    });
    for handle in writers {
        handle.join().unwrap();
    }
    swapper.join().unwrap();

    assert_eq!(records(&sink).len(), 400);
}
