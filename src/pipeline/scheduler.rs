//! Event scheduler and pipeline orchestrator
//!
//! Orders parsed events into the timeline and drives a full compilation:
//! parse, order, encode.

use std::path::Path;

use tracing::{debug, info};

use crate::config::CompilerConfig;
use crate::error::Result;
use crate::pipeline::event::{Event, Message};
use crate::pipeline::parser::ScoreParser;
use crate::smf;

/// Sort events by (time, priority, emission order)
///
/// At a shared tick tempo changes come first, then note-offs, then
/// note-ons. Emission order breaks any remaining tie, so the result does
/// not depend on sort stability.
pub fn order_events(mut events: Vec<Event>) -> Vec<Event> {
    events.sort_unstable_by_key(Event::order_key);
    events
}

/// A sounding note recovered from the timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpan {
    pub channel: u8,
    pub pitch: u8,
    pub velocity: u8,
    /// Tick of the note-on
    pub start: u32,
    /// Tick of the note-off
    pub end: u32,
}

/// An ordered timeline ready for encoding
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Events in output order, without End of Track
    pub timeline: Vec<Event>,
    /// Resolution in effect at the end of the score
    pub ppq: u16,
}

impl Compilation {
    /// Encode the timeline as SMF bytes
    pub fn encode(&self) -> Result<Vec<u8>> {
        smf::encode(&self.timeline, self.ppq)
    }

    /// Encode and write to `path`, returning the number of bytes written
    pub fn write_midi(&self, path: &Path) -> Result<usize> {
        let bytes = self.encode()?;
        smf::write_smf(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "wrote midi file");
        Ok(bytes.len())
    }

    /// Tick of the last timeline event (0 for an empty timeline)
    pub fn last_tick(&self) -> u32 {
        self.timeline.last().map_or(0, |e| e.time)
    }

    /// Number of timeline events, End of Track excluded
    pub fn event_count(&self) -> usize {
        self.timeline.len()
    }

    /// Note-on/note-off pairs in emission order
    ///
    /// The parser emits each note-off directly after its note-on, so pairs
    /// are matched by emission order rather than by timeline position.
    pub fn note_spans(&self) -> Vec<NoteSpan> {
        let mut by_source: Vec<&Event> = self.timeline.iter().collect();
        by_source.sort_unstable_by_key(|e| e.source_index);

        by_source
            .windows(2)
            .filter_map(|pair| match (pair[0].message, pair[1].message) {
                (
                    Message::NoteOn {
                        channel,
                        pitch,
                        velocity,
                    },
                    Message::NoteOff {
                        channel: off_channel,
                        pitch: off_pitch,
                    },
                ) if channel == off_channel && pitch == off_pitch => Some(NoteSpan {
                    channel,
                    pitch,
                    velocity,
                    start: pair[0].time,
                    end: pair[1].time,
                }),
                _ => None,
            })
            .collect()
    }

    /// Ticks and tempos (microseconds per quarter) of every tempo event
    pub fn tempo_changes(&self) -> Vec<(u32, u32)> {
        self.timeline
            .iter()
            .filter_map(|e| match e.message {
                Message::Tempo { micros_per_quarter } => Some((e.time, micros_per_quarter)),
                _ => None,
            })
            .collect()
    }
}

/// Score compilation pipeline
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: CompilerConfig,
}

impl Pipeline {
    /// Create a new pipeline
    ///
    /// # Arguments
    /// * `config` - Playback defaults and output settings
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Parse and order a score
    ///
    /// Nothing is encoded if any line fails.
    pub fn compile(&self, text: &str) -> Result<Compilation> {
        self.config.validate()?;

        let parsed = ScoreParser::new(self.config.defaults).parse(text)?;
        debug!(events = parsed.events.len(), "ordering events");
        let timeline = order_events(parsed.events);

        let compilation = Compilation {
            timeline,
            ppq: parsed.state.ppq,
        };
        info!(
            events = compilation.event_count(),
            last_tick = compilation.last_tick(),
            ppq = compilation.ppq,
            "compiled score"
        );
        Ok(compilation)
    }
}
