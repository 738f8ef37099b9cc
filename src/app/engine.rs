// McWatch - app/engine.rs
//
// Stream engine: accepts raw console lines one at a time, parses and
// classifies them, dispatches the resulting events to registered handlers,
// and keeps the membership set current.
//
// Lifecycle:
//   Idle --start()--> Running --shutdown()--> Stopped (terminal)
//
// Lines are accepted only while Running. The state lives in an atomic shared
// with every `EngineHandle`, so a shutdown requested from another thread
// (e.g. the Ctrl-C handler) is seen by the next submit_line call and between
// events of a line that is currently being dispatched.
//
// Per accepted line:
//   1. parse     - unparsable lines are dropped, not reported as errors
//   2. classify  - against one membership snapshot and the working flag
//   3. dispatch  - handlers run synchronously in registration order
//   4. mutate    - a join/leave change is applied after that event's
//                  handlers return, so handlers see the set as it was before

use crate::core::classifier;
use crate::core::membership::MembershipTracker;
use crate::core::model::{ClassifiedEvent, EventTag, LogRecord, MembershipChange};
use crate::core::parser;
use crate::util::error::{EngineError, HandlerError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

// =============================================================================
// Public types
// =============================================================================

/// Engine lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineState {
    Idle = 0,
    Running = 1,
    Stopped = 2,
}

impl EngineState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => EngineState::Idle,
            1 => EngineState::Running,
            _ => EngineState::Stopped,
        }
    }
}

/// What a handler receives for one event.
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    pub tag: EventTag,
    pub record: &'a LogRecord,
    /// User the event concerns. `None` for Ready.
    pub user: Option<&'a str>,
    /// Membership as it stands before this event's change is applied.
    pub members: &'a MembershipTracker,
}

/// Event callback. An error aborts the rest of the line and is returned to
/// the caller of `submit_line`.
pub type Handler = Box<dyn FnMut(&EventContext<'_>) -> Result<(), HandlerError> + Send>;

/// Outcome of one accepted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// The line did not have the expected shape and was ignored.
    Dropped,
    /// The line was parsed; `events` lists what was dispatched, in order.
    Processed {
        record: LogRecord,
        events: Vec<EventTag>,
    },
}

/// Cloneable, thread-safe handle for observing and stopping an engine.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    state: Arc<AtomicU8>,
}

impl EngineHandle {
    /// Transition to Stopped. Idempotent.
    pub fn shutdown(&self) {
        let previous = self.state.swap(EngineState::Stopped as u8, Ordering::SeqCst);
        if previous != EngineState::Stopped as u8 {
            tracing::info!("Stream engine stopped");
        }
    }

    pub fn state(&self) -> EngineState {
        EngineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_stopped(&self) -> bool {
        self.state() == EngineState::Stopped
    }
}

// =============================================================================
// StreamEngine
// =============================================================================

#[derive(Default)]
struct Handlers {
    ready: Vec<Handler>,
    join: Vec<Handler>,
    leave: Vec<Handler>,
    died: Vec<Handler>,
}

impl Handlers {
    fn for_tag(&mut self, tag: EventTag) -> &mut Vec<Handler> {
        match tag {
            EventTag::Ready => &mut self.ready,
            EventTag::Join => &mut self.join,
            EventTag::Leave => &mut self.leave,
            EventTag::Died => &mut self.died,
        }
    }
}

/// The log-classification and event-derivation engine.
///
/// Not `Sync`: lines must be submitted from a single consumer, one at a
/// time, so that each line's membership change is visible to the next.
pub struct StreamEngine {
    handle: EngineHandle,
    working: bool,
    members: MembershipTracker,
    handlers: Handlers,
}

impl StreamEngine {
    /// Create an Idle engine with empty membership and `working == false`.
    pub fn new() -> Self {
        Self {
            handle: EngineHandle {
                state: Arc::new(AtomicU8::new(EngineState::Idle as u8)),
            },
            working: false,
            members: MembershipTracker::new(),
            handlers: Handlers::default(),
        }
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> EngineState {
        self.handle.state()
    }

    /// Idle -> Running. A no-op while Running; fails once Stopped.
    pub fn start(&mut self) -> Result<(), EngineError> {
        match self.handle.state.compare_exchange(
            EngineState::Idle as u8,
            EngineState::Running as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                tracing::info!("Stream engine running");
                Ok(())
            }
            Err(current) => match EngineState::from_u8(current) {
                EngineState::Stopped => Err(EngineError::Closed),
                _ => Ok(()),
            },
        }
    }

    /// Transition to Stopped. Idempotent.
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }

    /// Readiness signal driven from outside the engine. While `false` the
    /// Ready event can fire; once `true` it never does.
    pub fn set_working(&mut self, working: bool) {
        if self.working != working {
            tracing::debug!(working, "Working flag changed");
        }
        self.working = working;
    }

    pub fn is_working(&self) -> bool {
        self.working
    }

    /// Read-only view of the current members. `members().sorted()` gives
    /// a stable listing.
    pub fn members(&self) -> &MembershipTracker {
        &self.members
    }

    pub fn on_ready<F>(&mut self, handler: F)
    where
        F: FnMut(&EventContext<'_>) -> Result<(), HandlerError> + Send + 'static,
    {
        self.handlers.ready.push(Box::new(handler));
    }

    pub fn on_join<F>(&mut self, handler: F)
    where
        F: FnMut(&EventContext<'_>) -> Result<(), HandlerError> + Send + 'static,
    {
        self.handlers.join.push(Box::new(handler));
    }

    pub fn on_leave<F>(&mut self, handler: F)
    where
        F: FnMut(&EventContext<'_>) -> Result<(), HandlerError> + Send + 'static,
    {
        self.handlers.leave.push(Box::new(handler));
    }

    pub fn on_died<F>(&mut self, handler: F)
    where
        F: FnMut(&EventContext<'_>) -> Result<(), HandlerError> + Send + 'static,
    {
        self.handlers.died.push(Box::new(handler));
    }

    /// Submit one console line, without its line terminator.
    ///
    /// Returns `EngineError::NotStarted` / `EngineError::Closed` outside the
    /// Running state, and `EngineError::Handler` if a handler fails.
    pub fn submit_line(&mut self, raw: &str) -> Result<Dispatch, EngineError> {
        self.ensure_running()?;

        let record = match parser::parse_line(raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::trace!(error = %e, line = raw, "Dropping line");
                return Ok(Dispatch::Dropped);
            }
        };

        let classification = classifier::classify(&record, self.members.snapshot(), self.working);

        let mut dispatched = Vec::with_capacity(classification.events.len());
        for event in &classification.events {
            self.ensure_running()?;
            self.dispatch(event, &record)?;
            if let Some(change) = &event.change {
                self.apply(change);
            }
            dispatched.push(event.tag);
        }

        Ok(Dispatch::Processed {
            record,
            events: dispatched,
        })
    }

    fn ensure_running(&self) -> Result<(), EngineError> {
        match self.state() {
            EngineState::Running => Ok(()),
            EngineState::Idle => Err(EngineError::NotStarted),
            EngineState::Stopped => Err(EngineError::Closed),
        }
    }

    fn dispatch(&mut self, event: &ClassifiedEvent, record: &LogRecord) -> Result<(), EngineError> {
        tracing::debug!(
            event = %event.tag,
            user = event.user.as_deref().unwrap_or(""),
            "Dispatching event"
        );

        let ctx = EventContext {
            tag: event.tag,
            record,
            user: event.user.as_deref(),
            members: &self.members,
        };

        for handler in self.handlers.for_tag(event.tag).iter_mut() {
            handler(&ctx).map_err(|source| EngineError::Handler {
                event: event.tag.label(),
                source,
            })?;
        }
        Ok(())
    }

    fn apply(&mut self, change: &MembershipChange) {
        match change {
            MembershipChange::Add(id) => {
                if self.members.add(id) {
                    tracing::info!(user = %id, members = self.members.len(), "Member joined");
                } else {
                    tracing::debug!(user = %id, "Duplicate join; already a member");
                }
            }
            MembershipChange::Remove(id) => {
                if self.members.remove(id) {
                    tracing::info!(user = %id, members = self.members.len(), "Member left");
                } else {
                    tracing::debug!(user = %id, "Leave for non-member ignored");
                }
            }
        }
    }
}

impl Default for StreamEngine {
    fn default() -> Self {
        Self::new()
    }
}
