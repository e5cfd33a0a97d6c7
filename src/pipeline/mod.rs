//! Score compilation pipeline
//!
//! - Parser: interpret score lines into timed events
//! - Note: note name to MIDI pitch resolution
//! - Event: timeline event model
//! - Scheduler: deterministic event ordering and compilation driver

pub mod event;
pub mod note;
pub mod parser;
pub mod scheduler;

pub use event::{Event, Message, Priority};
pub use parser::{parse_score, Command, ParsedScore, PlaybackState, ScoreParser};
pub use scheduler::{order_events, Compilation, NoteSpan, Pipeline};
