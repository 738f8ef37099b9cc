// McWatch - app/watch.rs
//
// Drives a StreamEngine from a LineFeed until the feed ends or the engine
// is shut down. This is the single consumer that serialises submission.
//
// Handler failures are logged and counted; the watch continues with the
// next line. The loop wakes every FEED_POLL_INTERVAL_MS so a shutdown is
// noticed even while the source is silent.

use crate::app::engine::{Dispatch, EngineHandle, StreamEngine};
use crate::app::feed::{FeedEvent, LineFeed};
use crate::util::constants::FEED_POLL_INTERVAL_MS;
use crate::util::error::EngineError;
use std::time::Duration;

/// Why the watch loop returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEnd {
    /// The source reached end of file.
    SourceClosed,
    /// Reading the source failed.
    SourceFailed { message: String },
    /// The engine was shut down.
    EngineStopped,
}

/// Counters for one watch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchSummary {
    pub lines: usize,
    pub dropped: usize,
    pub events: usize,
    pub handler_failures: usize,
    pub end: WatchEnd,
}

/// Feed lines into `engine` until the feed ends or the engine stops.
///
/// Starts the engine if it is still Idle.
pub fn run(engine: &mut StreamEngine, feed: &LineFeed) -> Result<WatchSummary, EngineError> {
    engine.start()?;
    let handle: EngineHandle = engine.handle();
    let poll = Duration::from_millis(FEED_POLL_INTERVAL_MS);

    let mut summary = WatchSummary {
        lines: 0,
        dropped: 0,
        events: 0,
        handler_failures: 0,
        end: WatchEnd::EngineStopped,
    };

    loop {
        if handle.is_stopped() {
            summary.end = WatchEnd::EngineStopped;
            break;
        }

        let Some(event) = feed.next_timeout(poll) else {
            continue;
        };

        let line = match event {
            FeedEvent::Line(line) => line,
            FeedEvent::Eof => {
                summary.end = WatchEnd::SourceClosed;
                break;
            }
            FeedEvent::Failed { message } => {
                summary.end = WatchEnd::SourceFailed { message };
                break;
            }
        };

        summary.lines += 1;
        match engine.submit_line(&line) {
            Ok(Dispatch::Dropped) => summary.dropped += 1,
            Ok(Dispatch::Processed { events, .. }) => summary.events += events.len(),
            Err(EngineError::Closed) => {
                tracing::debug!(line = %line, "Line arrived after shutdown; stopping watch");
                summary.end = WatchEnd::EngineStopped;
                break;
            }
            Err(e @ EngineError::Handler { .. }) => {
                tracing::warn!(error = %e, line = %line, "Event handler failed");
                summary.handler_failures += 1;
            }
            Err(e @ EngineError::NotStarted) => return Err(e),
        }
    }

    tracing::info!(
        lines = summary.lines,
        dropped = summary.dropped,
        events = summary.events,
        handler_failures = summary.handler_failures,
        end = ?summary.end,
        "Watch finished"
    );

    Ok(summary)
}
