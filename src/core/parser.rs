// McWatch - core/parser.rs
//
// Turns one raw console line into a LogRecord.
// Core layer: operates on &str only, never touches I/O.
//
// Expected shape:
//
//   [10:01:00] [Server thread/INFO]: Alice[/127.0.0.1:50212] logged in
//   \________/ \__________________/  \_______________________________/
//      time          level                       message
//
// The line splits on the first ": ". The metadata half then splits on its
// first whitespace run into the time token and the level token.

use crate::core::model::LogRecord;
use crate::util::constants::METADATA_SEPARATOR;
use crate::util::error::ParseError;
use chrono::NaiveTime;
use regex::Regex;
use std::sync::OnceLock;

/// `[H:M:S]` with unsigned integer components.
fn time_token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\[(\d+):(\d+):(\d+)\]$").expect("time token regex is valid")
    })
}

fn unparsable(reason: &'static str) -> ParseError {
    ParseError::Unparsable { reason }
}

/// Parse a single console line.
///
/// The message is everything after the first `": "`, preserved exactly,
/// including any further `": "` it contains.
pub fn parse_line(raw: &str) -> Result<LogRecord, ParseError> {
    let (metadata, message) = raw
        .split_once(METADATA_SEPARATOR)
        .ok_or_else(|| unparsable("missing ': ' separator"))?;

    let metadata = metadata.trim_start();
    let split_at = metadata
        .find(char::is_whitespace)
        .ok_or_else(|| unparsable("metadata has no level token"))?;
    let time_token = &metadata[..split_at];
    let level_token = metadata[split_at..].trim_start();

    let time = parse_time_token(time_token)?;
    let level = parse_level_token(level_token)?;

    Ok(LogRecord {
        time,
        level: level.to_string(),
        message: message.to_string(),
    })
}

/// `[10:01:00]` -> 10:01:00. Components must form a valid time of day.
fn parse_time_token(token: &str) -> Result<NaiveTime, ParseError> {
    let caps = time_token_regex()
        .captures(token)
        .ok_or_else(|| unparsable("time token is not [H:M:S]"))?;

    let mut parts = [0u32; 3];
    for (slot, idx) in parts.iter_mut().zip(1usize..=3) {
        *slot = caps[idx]
            .parse()
            .map_err(|_| unparsable("time component out of range"))?;
    }

    NaiveTime::from_hms_opt(parts[0], parts[1], parts[2])
        .ok_or_else(|| unparsable("time component out of range"))
}

/// `[Server thread/INFO]` -> `Server thread/INFO`.
fn parse_level_token(token: &str) -> Result<&str, ParseError> {
    if token.len() >= 2 && token.starts_with('[') && token.ends_with(']') {
        Ok(&token[1..token.len() - 1])
    } else {
        Err(unparsable("level token is not bracketed"))
    }
}
