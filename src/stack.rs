//! Bounded stack trace capture.
//!
//! Traces are rendered as text so they can be attached to error records and
//! serialized without keeping symbol tables alive:
//!
//! ```text
//! my_service::orders::place_order
//! 	/src/orders.rs:42
//! my_service::api::handle_request
//! 	/src/api.rs:17
//! ```

use std::fmt::Write;

/// Default number of frames kept by [`capture`] callers that have no
/// configured depth.
pub const DEFAULT_STACK_DEPTH: usize = 32;

// Leading frames belonging to the unwinder or to this crate's capture paths.
const CAPTURE_FRAME_PREFIXES: &[&str] = &[
    "backtrace::",
    "distributed_errors::stack::",
    "distributed_errors::builder::",
    "distributed_errors::handler::",
];

struct Frame {
    function: String,
    file: String,
    line: u32,
}

/// Capture the current call stack, keeping at most `max_depth` frames.
///
/// Frames inside the capture machinery are skipped, so the first entry is the
/// code that asked for the trace. Symbols that cannot be resolved render as
/// `<unknown>`.
pub fn capture(max_depth: usize) -> String {
    let mut frames: Vec<Frame> = Vec::with_capacity(max_depth.min(DEFAULT_STACK_DEPTH));
    let mut skipping = true;

    backtrace::trace(|raw| {
        let mut resolved = false;
        backtrace::resolve_frame(raw, |symbol| {
            resolved = true;
            if frames.len() >= max_depth {
                return;
            }
            let function = symbol.name().map(|name| format!("{name:#}"));
            if skipping {
                if function.as_deref().is_some_and(is_capture_frame) {
                    return;
                }
                skipping = false;
            }
            frames.push(Frame {
                function: function.unwrap_or_else(|| "<unknown>".to_string()),
                file: symbol
                    .filename()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "?".to_string()),
                line: symbol.lineno().unwrap_or(0),
            });
        });

        if !resolved && frames.len() < max_depth {
            skipping = false;
            frames.push(Frame {
                function: "<unknown>".to_string(),
                file: format!("{:?}", raw.ip()),
                line: 0,
            });
        }

        frames.len() < max_depth
    });

    format_frames(&frames)
}

fn is_capture_frame(function: &str) -> bool {
    CAPTURE_FRAME_PREFIXES
        .iter()
        .any(|prefix| function.starts_with(prefix))
}

fn format_frames(frames: &[Frame]) -> String {
    let mut out = String::new();
    for frame in frames {
        // Writing into a String cannot fail.
        let _ = write!(out, "{}\n\t{}:{}\n", frame.function, frame.file, frame.line);
    }
    out
}
