//! Parser for the text score format
//!
//! Format (one command per line):
//!
//! ```text
//! tempo <bpm>                 20..400, emits a tempo change at the cursor
//! ppq <ticks>                 48..9600, resolution for later durations
//! channel <n>                 0..15
//! rest <ms>                   advances the cursor
//! <note> <ms> [velocity]      e.g. C4 200, F#3 120 90, Bb2 500
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. Notes are strictly
//! sequential: each note starts where the previous note or rest ended.

use std::num::IntErrorKind;

use tracing::debug;

use crate::config::{PlaybackDefaults, BPM_RANGE, CHANNEL_RANGE, PPQ_RANGE, VELOCITY_RANGE};
use crate::error::{Error, Result};
use crate::pipeline::event::{Event, Message};
use crate::pipeline::note;
use crate::timing::{micros_per_quarter, ticks_for, MAX_TICK};

const REST_MS_RANGE: (i64, i64) = (0, i32::MAX as i64);
const NOTE_MS_RANGE: (i64, i64) = (1, i32::MAX as i64);

/// Mutable playback state threaded through the score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackState {
    pub bpm: u16,
    pub ppq: u16,
    pub channel: u8,
    /// Absolute tick where the next note or rest starts
    pub cursor: u32,
}

impl From<&PlaybackDefaults> for PlaybackState {
    fn from(defaults: &PlaybackDefaults) -> Self {
        Self {
            bpm: defaults.bpm,
            ppq: defaults.ppq,
            channel: defaults.channel,
            cursor: 0,
        }
    }
}

/// One interpreted score line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Tempo(u16),
    Ppq(u16),
    Channel(u8),
    Rest { ms: u64 },
    Note { pitch: u8, ms: u64, velocity: u8 },
}

/// Result of parsing a whole score
#[derive(Debug, Clone)]
pub struct ParsedScore {
    /// Events in emission order
    pub events: Vec<Event>,
    /// Playback state after the last line
    pub state: PlaybackState,
}

fn is_blank_or_comment(line: &str) -> bool {
    let line = line.trim_start();
    line.is_empty() || line.starts_with('#')
}

/// Parse an integer argument; overflow counts as out of range
fn parse_int(line: usize, token: &str, what: &'static str, range: (i64, i64)) -> Result<i64> {
    token.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Error::OutOfRange {
            line,
            what,
            min: range.0,
            max: range.1,
        },
        _ => Error::MalformedCommand {
            line,
            reason: format!("{} must be an integer, got '{}'", what, token),
        },
    })
}

fn parse_ranged(line: usize, token: &str, what: &'static str, range: (i64, i64)) -> Result<i64> {
    let value = parse_int(line, token, what, range)?;
    if value < range.0 || value > range.1 {
        return Err(Error::OutOfRange {
            line,
            what,
            min: range.0,
            max: range.1,
        });
    }
    Ok(value)
}

/// Parse a velocity, clamping anything outside 0..127
fn parse_velocity(line: usize, token: &str) -> Result<u8> {
    let (min, max) = VELOCITY_RANGE;
    let value = match token.parse::<i64>() {
        Ok(v) => v.clamp(min, max),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => max,
        Err(e) if *e.kind() == IntErrorKind::NegOverflow => min,
        Err(_) => {
            return Err(Error::MalformedCommand {
                line,
                reason: format!("velocity must be an integer, got '{}'", token),
            })
        }
    };
    Ok(value as u8)
}

fn required<'a>(line: usize, arg: Option<&'a str>, reason: &str) -> Result<&'a str> {
    arg.ok_or_else(|| Error::MalformedCommand {
        line,
        reason: reason.to_string(),
    })
}

/// Interpret a single score line
///
/// Returns `Ok(None)` for blank and comment lines. Tokens after the third
/// are ignored.
pub fn parse_line(line_no: usize, line: &str, default_velocity: u8) -> Result<Option<Command>> {
    if is_blank_or_comment(line) {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let (Some(head), arg, extra) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Ok(None);
    };

    let command = match head {
        "tempo" => {
            let arg = required(line_no, arg, "tempo needs bpm")?;
            Command::Tempo(parse_ranged(line_no, arg, "bpm", BPM_RANGE)? as u16)
        }
        "ppq" => {
            let arg = required(line_no, arg, "ppq needs value")?;
            Command::Ppq(parse_ranged(line_no, arg, "ppq", PPQ_RANGE)? as u16)
        }
        "channel" => {
            let arg = required(line_no, arg, "channel needs 0..15")?;
            Command::Channel(parse_ranged(line_no, arg, "channel", CHANNEL_RANGE)? as u8)
        }
        "rest" => {
            let arg = required(line_no, arg, "rest needs ms")?;
            let ms = parse_ranged(line_no, arg, "rest ms", REST_MS_RANGE)?;
            Command::Rest { ms: ms as u64 }
        }
        token => {
            let arg = required(line_no, arg, "note needs duration ms")?;
            let pitch = note::resolve(token).map_err(|source| Error::InvalidNoteToken {
                line: line_no,
                token: token.to_string(),
                source,
            })?;
            let ms = parse_ranged(line_no, arg, "note duration ms", NOTE_MS_RANGE)?;
            let velocity = match extra {
                Some(v) => parse_velocity(line_no, v)?,
                None => default_velocity,
            };
            Command::Note {
                pitch,
                ms: ms as u64,
                velocity,
            }
        }
    };

    Ok(Some(command))
}

fn push_event(events: &mut Vec<Event>, time: u32, message: Message) -> Result<()> {
    events.try_reserve(1).map_err(|_| Error::ResourceExhaustion {
        context: "growing event list",
    })?;
    let source_index = events.len();
    events.push(Event {
        time,
        message,
        source_index,
    });
    Ok(())
}

fn tempo_message(bpm: u16) -> Message {
    Message::Tempo {
        micros_per_quarter: micros_per_quarter(bpm),
    }
}

/// Move the cursor forward, refusing to pass [`MAX_TICK`]
fn advance(line: usize, cursor: u32, ticks: u32) -> Result<u32> {
    cursor
        .checked_add(ticks)
        .filter(|t| *t <= MAX_TICK)
        .ok_or(Error::OutOfRange {
            line,
            what: "timeline position (ticks)",
            min: 0,
            max: MAX_TICK as i64,
        })
}

/// Apply one command to the playback state, emitting its events
pub fn step(
    state: PlaybackState,
    line: usize,
    command: Command,
    events: &mut Vec<Event>,
) -> Result<PlaybackState> {
    debug!(line, ?command, cursor = state.cursor, "interpreting");

    let next = match command {
        Command::Tempo(bpm) => {
            push_event(events, state.cursor, tempo_message(bpm))?;
            PlaybackState { bpm, ..state }
        }
        Command::Ppq(ppq) => PlaybackState { ppq, ..state },
        Command::Channel(channel) => PlaybackState { channel, ..state },
        Command::Rest { ms } => {
            let ticks = ticks_for(ms, state.bpm, state.ppq);
            PlaybackState {
                cursor: advance(line, state.cursor, ticks)?,
                ..state
            }
        }
        Command::Note {
            pitch,
            ms,
            velocity,
        } => {
            let ticks = ticks_for(ms, state.bpm, state.ppq);
            let end = advance(line, state.cursor, ticks)?;
            push_event(
                events,
                state.cursor,
                Message::NoteOn {
                    channel: state.channel,
                    pitch,
                    velocity,
                },
            )?;
            push_event(
                events,
                end,
                Message::NoteOff {
                    channel: state.channel,
                    pitch,
                },
            )?;
            PlaybackState { cursor: end, ..state }
        }
    };

    Ok(next)
}

/// Line-by-line score interpreter
#[derive(Debug, Clone, Default)]
pub struct ScoreParser {
    defaults: PlaybackDefaults,
}

impl ScoreParser {
    pub fn new(defaults: PlaybackDefaults) -> Self {
        Self { defaults }
    }

    /// Parse a full score
    ///
    /// An initial tempo event at tick 0 always opens the event list. The
    /// first failing line aborts the parse.
    pub fn parse(&self, text: &str) -> Result<ParsedScore> {
        let mut state = PlaybackState::from(&self.defaults);
        let mut events = Vec::new();
        push_event(&mut events, 0, tempo_message(state.bpm))?;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if let Some(command) = parse_line(line_no, line, self.defaults.velocity)? {
                state = step(state, line_no, command, &mut events)?;
            }
        }

        Ok(ParsedScore { events, state })
    }
}

/// Parse a score with the default playback state
pub fn parse_score(text: &str) -> Result<ParsedScore> {
    ScoreParser::default().parse(text)
}
