//! Caller location extraction from stack traces
//!
//! Two textual layouts are understood:
//!
//! ```text
//!    3: my_app::handler
//!              at ./src/handler.rs:42:9
//! ```
//!
//! and the single-line form `at handler (src/handler.rs:42:9)`. Frames that
//! belong to the engine itself or to the standard library are skipped.

use crate::core::SourceLocation;
use std::backtrace::Backtrace;

/// Crates whose frames are never the caller, matched on the first path segment
pub const INTERNAL_CRATES: &[&str] = &["rust_log_inspector", "std", "core", "alloc", "backtrace"];

/// Location substrings of toolchain sources
const INTERNAL_LOCATIONS: &[&str] = &["/rustc/", "/library/std/src/", "/library/core/src/"];

/// Capture the current stack and return the first external frame
pub fn capture_source() -> Option<SourceLocation> {
    let trace = Backtrace::force_capture().to_string();
    parse_source(&trace)
}

/// First frame in `trace` outside the engine and the toolchain
pub fn parse_source(trace: &str) -> Option<SourceLocation> {
    let mut function: Option<&str> = None;

    for line in trace.lines() {
        let line = line.trim();

        if let Some(name) = frame_header(line) {
            function = Some(name);
            continue;
        }

        let Some(rest) = line.strip_prefix("at ") else {
            continue;
        };

        let (frame_fn, location) = match split_inline_frame(rest) {
            Some((name, location)) => (Some(name), location),
            None => (function, rest),
        };

        if frame_fn.is_some_and(is_internal_function) || is_internal_location(location) {
            continue;
        }

        if let Some(mut source) = parse_location(location) {
            source.function = frame_fn.map(str::to_string);
            return Some(source);
        }
    }

    None
}

/// `"12: some::function"` → `"some::function"`
fn frame_header(line: &str) -> Option<&str> {
    let (index, name) = line.split_once(": ")?;
    if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(name.trim())
}

/// `"handler (src/x.rs:1:2)"` → `("handler", "src/x.rs:1:2")`
fn split_inline_frame(rest: &str) -> Option<(&str, &str)> {
    let inner = rest.strip_suffix(')')?;
    let (name, location) = inner.rsplit_once(" (")?;
    Some((name.trim(), location))
}

/// `<alloc::boxed::Box<F> as core::ops::Fn>::call` roots at `alloc`; a user
/// module named `core` deeper in the path does not count.
fn is_internal_function(name: &str) -> bool {
    let path = name
        .trim_start_matches(['<', '&'])
        .trim_start_matches("mut ")
        .trim_start_matches("dyn ");
    if path.starts_with("__rust") {
        return true;
    }
    let root = path.split("::").next().unwrap_or(path);
    INTERNAL_CRATES.contains(&root)
}

fn is_internal_location(location: &str) -> bool {
    INTERNAL_LOCATIONS.iter().any(|marker| location.contains(marker))
}

/// `file:line[:column]`
fn parse_location(location: &str) -> Option<SourceLocation> {
    let mut parts = location.rsplitn(3, ':');
    let last = parts.next()?;
    let middle = parts.next()?;

    let (file, line, column) = match (parts.next(), middle.parse::<u32>()) {
        (Some(file), Ok(line)) => (file, line, last.parse::<u32>().ok()),
        _ => {
            let (file, line) = location.rsplit_once(':')?;
            (file, line.parse::<u32>().ok()?, None)
        }
    };

    if file.is_empty() {
        return None;
    }

    Some(SourceLocation {
        file: Some(file.to_string()),
        line: Some(line),
        column,
        function: None,
    })
}
