// McWatch - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;

// =============================================================================
// Log Record (output of parsing)
// =============================================================================

/// One console line decomposed into its time, level, and message.
///
/// Records are immutable and not retained after classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// Wall-clock time of day printed by the server.
    pub time: NaiveTime,

    /// Interior of the level token, verbatim (e.g. `Server thread/INFO`).
    pub level: String,

    /// Everything after the first `": "`, unmodified.
    pub message: String,
}

impl LogRecord {
    /// First whitespace-delimited token of the message, the identifier used
    /// by the member-activity gate and by leave lines.
    pub fn first_token(&self) -> Option<&str> {
        self.message.split_whitespace().next()
    }

    /// Text before the first `[` in the message, the identifier used by
    /// join lines (`Alice[/127.0.0.1:50212] logged in`).
    pub fn join_name(&self) -> &str {
        self.message
            .split(crate::util::constants::JOIN_NAME_TERMINATOR)
            .next()
            .unwrap_or(&self.message)
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}]: {}",
            self.time.format("%H:%M:%S"),
            self.level,
            self.message
        )
    }
}

// =============================================================================
// Event tags
// =============================================================================

/// Semantic categories derived from a record.
///
/// Declaration order is dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventTag {
    Ready,
    Join,
    Leave,
    Died,
}

impl EventTag {
    /// Returns all variants in dispatch order.
    pub fn all() -> &'static [EventTag] {
        &[
            EventTag::Ready,
            EventTag::Join,
            EventTag::Leave,
            EventTag::Died,
        ]
    }

    /// Lowercase label used in console output and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            EventTag::Ready => "ready",
            EventTag::Join => "join",
            EventTag::Leave => "leave",
            EventTag::Died => "died",
        }
    }
}

impl fmt::Display for EventTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Classification output
// =============================================================================

/// Membership mutation requested by the classifier. The engine applies it
/// once the event's handlers have returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipChange {
    Add(String),
    Remove(String),
}

/// One event derived from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub tag: EventTag,

    /// Identifier of the user the event concerns. `None` for Ready.
    pub user: Option<String>,

    /// Pending membership mutation, if the event carries one.
    pub change: Option<MembershipChange>,
}

/// Events derived from one record, in dispatch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub events: Vec<ClassifiedEvent>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Tags only, in dispatch order.
    pub fn tags(&self) -> Vec<EventTag> {
        self.events.iter().map(|e| e.tag).collect()
    }
}
