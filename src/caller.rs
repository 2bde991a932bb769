//! Best-effort call-site capture.
//!
//! The emission entry points are `#[track_caller]`, so the compiler hands us
//! the location of the first frame outside the logger. That location is the
//! answer when no extra frames are skipped. A non-zero skip walks a captured
//! backtrace outward from that anchor; if symbols are missing or the stack
//! is too short the caller is simply omitted.

use std::backtrace::Backtrace;
use std::panic::Location;
use std::path::Path;

/// Resolve the caller as `"file:line"`, skipping `skip` frames beyond the
/// tracked call site.
pub fn capture(location: &Location<'_>, skip: usize) -> Option<String> {
    if skip == 0 {
        return Some(format_location(location.file(), location.line()));
    }

    let trace = Backtrace::force_capture().to_string();
    let frames = frame_locations(&trace);
    let anchor = frames
        .iter()
        .position(|(file, line)| *line == location.line() && Path::new(file).ends_with(location.file()))?;
    let (file, line) = frames.get(anchor + skip)?;
    Some(format_location(file, *line))
}

/// Base name of `file` followed by the line number.
pub fn format_location(file: &str, line: u32) -> String {
    let base = file.rsplit(['/', '\\']).next().unwrap_or(file);
    format!("{base}:{line}")
}

/// Extract `(file, line)` pairs from a rendered backtrace, outermost last.
fn frame_locations(trace: &str) -> Vec<(String, u32)> {
    trace.lines().filter_map(parse_frame_line).collect()
}

fn parse_frame_line(text: &str) -> Option<(String, u32)> {
    let rest = text.trim_start().strip_prefix("at ")?;
    let mut pieces = rest.rsplitn(3, ':');
    let last = pieces.next()?;
    let middle = pieces.next()?;
    match pieces.next() {
        // file:line:column
        Some(file) => Some((file.to_string(), middle.parse().ok()?)),
        // file:line
        None => Some((middle.to_string(), last.parse().ok()?)),
    }
}
