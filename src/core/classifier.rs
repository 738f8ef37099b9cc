// McWatch - core/classifier.rs
//
// Derives lifecycle events from a parsed record.
// Core layer: pure logic, no I/O. Membership is passed in as a snapshot
// rather than captured, so every rule of one record sees the same set.
//
// Rule order:
//   1. Ready  - not yet working and the message contains "Done".
//   2. Join   - the message contains "logged in". Not gated on membership,
//               a user is unknown until they join.
//   3. Member activity gate - the first token of the message is a member,
//      and the message is neither connection-loss noise nor a join line.
//   4. Leave  - gated activity containing "left the game".
//   5. Died   - any other gated activity (deaths, chat, advancements).
//
// Ready is independent of the rest and may co-occur with one of
// Join/Leave/Died. At most one of Join/Leave/Died fires per record.

use crate::core::membership::MembershipSnapshot;
use crate::core::model::{Classification, ClassifiedEvent, EventTag, LogRecord, MembershipChange};
use crate::util::constants::{JOIN_MARKER, LEAVE_MARKER, LOST_CONNECTION_MARKER, READY_MARKER};

/// Classify one record against the membership snapshot and readiness flag.
///
/// Returned events are in dispatch order (Ready, Join, Leave, Died).
pub fn classify(
    record: &LogRecord,
    members: MembershipSnapshot<'_>,
    working: bool,
) -> Classification {
    let message = record.message.as_str();
    let mut events = Vec::new();

    if !working && message.contains(READY_MARKER) {
        events.push(ClassifiedEvent {
            tag: EventTag::Ready,
            user: None,
            change: None,
        });
    }

    if message.contains(JOIN_MARKER) {
        let user = record.join_name().to_string();
        events.push(ClassifiedEvent {
            tag: EventTag::Join,
            change: Some(MembershipChange::Add(user.clone())),
            user: Some(user),
        });
    }

    if let Some(user) = member_activity(record, members) {
        let user = user.to_string();
        if message.contains(LEAVE_MARKER) {
            events.push(ClassifiedEvent {
                tag: EventTag::Leave,
                change: Some(MembershipChange::Remove(user.clone())),
                user: Some(user),
            });
        } else {
            events.push(ClassifiedEvent {
                tag: EventTag::Died,
                user: Some(user),
                change: None,
            });
        }
    }

    Classification { events }
}

/// Returns the acting member if the record is member activity eligible for
/// Leave/Died classification.
fn member_activity<'r>(record: &'r LogRecord, members: MembershipSnapshot<'_>) -> Option<&'r str> {
    let user = record.first_token()?;
    if !members.contains(user) {
        return None;
    }

    let message = record.message.as_str();
    if message.contains(LOST_CONNECTION_MARKER) || message.contains(JOIN_MARKER) {
        return None;
    }

    Some(user)
}
