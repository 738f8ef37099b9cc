// McWatch - app/feed.rs
//
// Line feed: reads the server's console output on a background thread and
// queues complete lines for the single consumer that drives the engine.
//
// Architecture:
//   - `LineFeed::spawn` starts a reader thread over any `Read` source
//     (child stdout, stdin, a test cursor).
//   - Lines travel over a bounded mpsc channel, so submission to the engine
//     is serialised in arrival order.
//   - The reader ends on EOF or a read error and reports which one.
//
// Encoding: bytes are decoded as lossy UTF-8, one line at a time, so a
// stray invalid byte never stalls the stream.

use crate::util::constants::LINE_QUEUE_CAPACITY;
use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc;
use std::time::Duration;

/// Messages sent from the reader thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    /// One non-empty line, terminator stripped.
    Line(String),
    /// The source reached end of file.
    Eof,
    /// Reading failed; the feed is finished.
    Failed { message: String },
}

/// Receiving end of a background line reader.
pub struct LineFeed {
    rx: mpsc::Receiver<FeedEvent>,
}

impl LineFeed {
    /// Start reading `source` on a background thread.
    ///
    /// `name` labels the thread and its log output.
    pub fn spawn<R>(source: R, name: &str) -> std::io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = mpsc::sync_channel(LINE_QUEUE_CAPACITY);
        let label = name.to_string();
        std::thread::Builder::new()
            .name(format!("feed-{name}"))
            .spawn(move || run_reader(source, &label, tx))?;
        tracing::debug!(source = name, "Line feed started");
        Ok(Self { rx })
    }

    /// Wait up to `timeout` for the next message.
    ///
    /// Returns `None` on timeout. A reader that vanished without a final
    /// message is reported as `Eof`.
    pub fn next_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => Some(FeedEvent::Eof),
        }
    }

    /// Discard everything left in the feed until the source closes.
    ///
    /// Keeps the source's pipe drained so a writer never blocks on a full
    /// buffer while it shuts down. Returns the number of discarded lines.
    pub fn drain(self) -> usize {
        let mut discarded = 0;
        for event in self.rx.iter() {
            match event {
                FeedEvent::Line(_) => discarded += 1,
                FeedEvent::Eof | FeedEvent::Failed { .. } => break,
            }
        }
        discarded
    }
}

fn run_reader<R: Read>(source: R, name: &str, tx: mpsc::SyncSender<FeedEvent>) {
    let mut reader = BufReader::new(source);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                tracing::debug!(source = name, "Line feed reached EOF");
                let _ = tx.send(FeedEvent::Eof);
                return;
            }
            Ok(_) => {
                let Some(line) = decode_line(&buf) else {
                    continue;
                };
                if tx.send(FeedEvent::Line(line)).is_err() {
                    // Consumer gone; nothing left to do.
                    return;
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::warn!(source = name, error = %e, "Line feed read error");
                let _ = tx.send(FeedEvent::Failed {
                    message: e.to_string(),
                });
                return;
            }
        }
    }
}

/// Strip the line terminator and skip empty lines. Content is otherwise
/// passed through untouched.
fn decode_line(bytes: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return None;
    }
    Some(line.to_string())
}
