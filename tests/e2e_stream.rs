// McWatch - tests/e2e_stream.rs
//
// End-to-end tests for the parse -> classify -> dispatch -> membership
// pipeline, driven through the public library API exactly as the watcher
// drives it: one raw console line at a time.

use mcwatch::app::engine::{Dispatch, EngineState, StreamEngine};
use mcwatch::app::feed::LineFeed;
use mcwatch::app::watch::{self, WatchEnd};
use mcwatch::core::model::EventTag;
use mcwatch::core::parser::parse_line;
use mcwatch::util::error::{EngineError, ParseError};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

// =============================================================================
// Helpers
// =============================================================================

/// (event, message, user-was-member-when-dispatched)
type Seen = Arc<Mutex<Vec<(EventTag, String, bool)>>>;

/// Running engine with a recording handler on every channel.
fn recording_engine() -> (StreamEngine, Seen) {
    let mut engine = StreamEngine::new();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));

    macro_rules! record_on {
        ($register:ident) => {{
            let seen = Arc::clone(&seen);
            engine.$register(move |ctx| {
                let member = ctx.user.map_or(false, |u| ctx.members.contains(u));
                seen.lock()
                    .unwrap()
                    .push((ctx.tag, ctx.record.message.clone(), member));
                Ok(())
            });
        }};
    }
    record_on!(on_ready);
    record_on!(on_join);
    record_on!(on_leave);
    record_on!(on_died);

    engine.start().unwrap();
    (engine, seen)
}

fn tags(seen: &Seen) -> Vec<EventTag> {
    seen.lock().unwrap().iter().map(|(t, _, _)| *t).collect()
}

fn join_alice(engine: &mut StreamEngine) {
    engine
        .submit_line("[10:01:00] [Server]: Alice[/127.0.0.1] logged in")
        .unwrap();
    assert!(engine.members().contains("Alice"));
}

// =============================================================================
// Concrete scenarios
// =============================================================================

#[test]
fn e2e_done_line_emits_ready() {
    let (mut engine, seen) = recording_engine();
    let dispatch = engine
        .submit_line("[10:00:00] [Server]: Done (3.5s)!")
        .unwrap();

    match dispatch {
        Dispatch::Processed { record, events } => {
            assert_eq!(record.message, "Done (3.5s)!");
            assert_eq!(events, vec![EventTag::Ready]);
        }
        Dispatch::Dropped => panic!("ready line was dropped"),
    }
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(EventTag::Ready, "Done (3.5s)!".to_string(), false)]
    );
}

#[test]
fn e2e_join_adds_member() {
    let (mut engine, seen) = recording_engine();
    engine
        .submit_line("[10:01:00] [Server]: Alice[/127.0.0.1] logged in")
        .unwrap();

    assert_eq!(tags(&seen), vec![EventTag::Join]);
    assert_eq!(engine.members().sorted(), vec!["Alice".to_string()]);
}

#[test]
fn e2e_lost_connection_emits_nothing_and_keeps_member() {
    let (mut engine, seen) = recording_engine();
    join_alice(&mut engine);
    seen.lock().unwrap().clear();

    engine
        .submit_line("[10:02:00] [Server]: Alice lost connection: disconnected")
        .unwrap();

    assert!(tags(&seen).is_empty());
    assert!(engine.members().contains("Alice"));
}

#[test]
fn e2e_leave_removes_member_after_dispatch() {
    let (mut engine, seen) = recording_engine();
    join_alice(&mut engine);
    seen.lock().unwrap().clear();

    engine
        .submit_line("[10:03:00] [Server]: Alice left the game")
        .unwrap();

    // The leave handler ran while Alice was still a member.
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(EventTag::Leave, "Alice left the game".to_string(), true)]
    );
    assert!(!engine.members().contains("Alice"));
}

#[test]
fn e2e_non_member_activity_emits_nothing() {
    let (mut engine, seen) = recording_engine();
    engine
        .submit_line("[10:04:00] [Server]: Bob fell out of the world")
        .unwrap();
    assert!(tags(&seen).is_empty());
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn e2e_duplicate_join_is_idempotent() {
    let (mut engine, seen) = recording_engine();
    join_alice(&mut engine);
    join_alice(&mut engine);

    assert_eq!(engine.members().len(), 1);
    assert_eq!(tags(&seen), vec![EventTag::Join, EventTag::Join]);
}

#[test]
fn e2e_leave_for_non_member_is_not_an_error() {
    let (mut engine, seen) = recording_engine();
    let dispatch = engine
        .submit_line("[10:03:00] [Server]: Carol left the game")
        .unwrap();
    assert!(matches!(dispatch, Dispatch::Processed { ref events, .. } if events.is_empty()));
    assert!(tags(&seen).is_empty());
    assert!(engine.members().is_empty());
}

#[test]
fn e2e_join_is_visible_to_the_next_line() {
    let (mut engine, seen) = recording_engine();
    engine
        .submit_line("[10:01:00] [Server]: Alice[/127.0.0.1] logged in")
        .unwrap();
    engine
        .submit_line("[10:01:05] [Server]: Alice was slain by Zombie")
        .unwrap();

    assert_eq!(tags(&seen), vec![EventTag::Join, EventTag::Died]);
}

#[test]
fn e2e_rejoin_after_leave() {
    let (mut engine, seen) = recording_engine();
    join_alice(&mut engine);
    engine
        .submit_line("[10:03:00] [Server]: Alice left the game")
        .unwrap();
    engine
        .submit_line("[10:04:00] [Server]: Alice fell out of the world")
        .unwrap();
    join_alice(&mut engine);

    assert_eq!(
        tags(&seen),
        vec![EventTag::Join, EventTag::Leave, EventTag::Join]
    );
}

#[test]
fn e2e_lines_without_separator_are_unparsable_and_dropped() {
    let (mut engine, seen) = recording_engine();
    for line in [
        "Starting minecraft server version 1.14.4",
        "[10:00:00] [Server] Done (3.5s)!",
        "*** Error, this build is outdated ***",
    ] {
        assert!(matches!(
            parse_line(line),
            Err(ParseError::Unparsable { .. })
        ));
        assert_eq!(engine.submit_line(line).unwrap(), Dispatch::Dropped);
    }
    assert!(tags(&seen).is_empty());
}

#[test]
fn e2e_well_formed_lines_round_trip_their_fields() {
    for (h, m, s, level, message) in [
        (0, 0, 0, "Server thread/INFO", "Starting minecraft server"),
        (9, 5, 7, "Server", "Alice: with: colons"),
        (23, 59, 59, "User Authenticator #1/INFO", "UUID of player Alice is 1234"),
    ] {
        let line = format!("[{h}:{m}:{s}] [{level}]: {message}");
        let record = parse_line(&line).unwrap();
        assert_eq!(
            record.time,
            chrono::NaiveTime::from_hms_opt(h, m, s).unwrap()
        );
        assert_eq!(record.level, level);
        assert_eq!(record.message, message);
    }
}

#[test]
fn e2e_submit_after_shutdown_is_closed_not_dropped() {
    let (mut engine, _seen) = recording_engine();
    engine.handle().shutdown();
    assert_eq!(engine.state(), EngineState::Stopped);
    assert!(matches!(
        engine.submit_line("not even parsable"),
        Err(EngineError::Closed)
    ));
}

#[test]
fn e2e_server_session_through_line_feed() {
    let session = "\
Loading libraries, please wait...
[12:00:00] [Server thread/INFO]: Starting minecraft server version 1.14.4
[12:00:04] [Server thread/INFO]: Done (4.210s)! For help, type \"help\"
[12:01:00] [User Authenticator #1/INFO]: UUID of player Alice is 0000
[12:01:00] [Server thread/INFO]: Alice[/127.0.0.1:50212] logged in with entity id 42 at (0.5, 64.0, 0.5)
[12:01:00] [Server thread/INFO]: Alice joined the game
[12:02:00] [Server thread/INFO]: Bob fell out of the world
[12:03:00] [Server thread/INFO]: Alice lost connection: Disconnected
[12:03:00] [Server thread/INFO]: Alice left the game
";
    let (mut engine, seen) = recording_engine();
    let feed = LineFeed::spawn(Cursor::new(session.as_bytes().to_vec()), "e2e").unwrap();
    let summary = watch::run(&mut engine, &feed).unwrap();

    assert_eq!(summary.end, WatchEnd::SourceClosed);
    assert_eq!(summary.lines, 9);
    assert_eq!(summary.dropped, 1);
    assert_eq!(
        tags(&seen),
        vec![
            EventTag::Ready,
            EventTag::Join,
            EventTag::Died,
            EventTag::Leave
        ]
    );
    assert!(engine.members().is_empty());
}

#[test]
fn e2e_long_line_keeps_its_message_through_line_feed() {
    let message = format!("Alice {} left the game", "x".repeat(70_000));
    let session = format!(
        "[12:01:00] [Server thread/INFO]: Alice[/127.0.0.1:50212] logged in\n\
         [12:03:00] [Server thread/INFO]: {message}\n"
    );
    let (mut engine, seen) = recording_engine();
    let feed = LineFeed::spawn(Cursor::new(session.into_bytes()), "e2e").unwrap();
    let summary = watch::run(&mut engine, &feed).unwrap();

    assert_eq!(summary.end, WatchEnd::SourceClosed);
    assert_eq!(tags(&seen), vec![EventTag::Join, EventTag::Leave]);
    let seen = seen.lock().unwrap();
    assert_eq!(seen[1].1.len(), message.len());
    assert_eq!(seen[1].1, message);
    assert!(engine.members().is_empty());
}
