// McWatch - ui/console.rs
//
// Console presentation of engine events.
//
// Text mode:
//   [start] [10:00:00] [Server thread/INFO]: Done (3.5s)!
//   [join] Alice[/127.0.0.1:50212] logged in with entity id 42
//   [died] Alice fell out of the world
//   [leave] Alice left the game
//
// JSON mode writes one object per line:
//   {"event":"join","user":"Alice","record":{"time":"10:01:00",...}}

use crate::app::engine::{EventContext, StreamEngine};
use crate::core::model::{EventTag, LogRecord};
use crate::util::error::HandlerError;
use serde::Serialize;
use std::io::Write;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

/// Output rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format \"{other}\"; expected \"text\" or \"json\""
            )),
        }
    }
}

#[derive(Serialize)]
struct EventLine<'a> {
    event: EventTag,
    user: Option<&'a str>,
    record: &'a LogRecord,
}

/// Writes one line per event to `out`.
pub struct ConsoleReporter<W: Write> {
    format: OutputFormat,
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self { format, out }
    }

    /// Render one event and flush.
    pub fn report(&mut self, ctx: &EventContext<'_>) -> Result<(), HandlerError> {
        match self.format {
            OutputFormat::Text => match ctx.tag {
                EventTag::Ready => writeln!(self.out, "[start] {}", ctx.record)?,
                tag => writeln!(self.out, "[{tag}] {}", ctx.record.message)?,
            },
            OutputFormat::Json => {
                let line = EventLine {
                    event: ctx.tag,
                    user: ctx.user,
                    record: ctx.record,
                };
                serde_json::to_writer(&mut self.out, &line)?;
                writeln!(self.out)?;
            }
        }
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + 'static> ConsoleReporter<W> {
    /// Register this reporter on all four event channels of `engine`.
    ///
    /// Returns the shared reporter so the caller can reclaim the writer.
    pub fn attach(self, engine: &mut StreamEngine) -> Arc<Mutex<Self>> {
        let shared = Arc::new(Mutex::new(self));

        let r = Arc::clone(&shared);
        engine.on_ready(move |ctx| report_shared(&r, ctx));
        let r = Arc::clone(&shared);
        engine.on_join(move |ctx| report_shared(&r, ctx));
        let r = Arc::clone(&shared);
        engine.on_leave(move |ctx| report_shared(&r, ctx));
        let r = Arc::clone(&shared);
        engine.on_died(move |ctx| report_shared(&r, ctx));

        shared
    }
}

fn report_shared<W: Write>(
    reporter: &Mutex<ConsoleReporter<W>>,
    ctx: &EventContext<'_>,
) -> Result<(), HandlerError> {
    reporter
        .lock()
        .map_err(|_| "console reporter lock poisoned")?
        .report(ctx)
}
