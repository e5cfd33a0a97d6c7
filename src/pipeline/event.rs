//! Timeline events
//!
//! Each event carries one MIDI message as a tagged variant. Ordering
//! priority and encoded length follow from the variant.

use crate::bytebuf::ByteBuffer;
use crate::error::Result;

/// Processing order for events sharing a tick (lower first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Priority {
    Meta = 0,
    NoteOff = 1,
    NoteOn = 2,
}

/// A single MIDI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Set Tempo meta event: FF 51 03 tt tt tt
    Tempo { micros_per_quarter: u32 },
    NoteOn { channel: u8, pitch: u8, velocity: u8 },
    /// Note off, always sent with release velocity 0
    NoteOff { channel: u8, pitch: u8 },
    /// End of Track meta event: FF 2F 00
    EndOfTrack,
}

impl Message {
    pub fn priority(&self) -> Priority {
        match self {
            Message::Tempo { .. } | Message::EndOfTrack => Priority::Meta,
            Message::NoteOff { .. } => Priority::NoteOff,
            Message::NoteOn { .. } => Priority::NoteOn,
        }
    }

    /// Number of raw bytes this message encodes to
    pub fn encoded_len(&self) -> usize {
        match self {
            Message::Tempo { .. } => 6,
            Message::NoteOn { .. } | Message::NoteOff { .. } | Message::EndOfTrack => 3,
        }
    }

    /// Raw protocol bytes, at most 8
    pub fn to_bytes(&self) -> ([u8; 8], usize) {
        let mut data = [0u8; 8];
        match *self {
            Message::Tempo { micros_per_quarter } => {
                let us = micros_per_quarter.to_be_bytes();
                data[..6].copy_from_slice(&[0xFF, 0x51, 0x03, us[1], us[2], us[3]]);
            }
            Message::NoteOn {
                channel,
                pitch,
                velocity,
            } => {
                data[..3].copy_from_slice(&[0x90 | (channel & 0x0F), pitch, velocity]);
            }
            Message::NoteOff { channel, pitch } => {
                data[..3].copy_from_slice(&[0x80 | (channel & 0x0F), pitch, 0]);
            }
            Message::EndOfTrack => {
                data[..3].copy_from_slice(&[0xFF, 0x2F, 0x00]);
            }
        }
        (data, self.encoded_len())
    }

    /// Append the raw bytes of this message (no delta time)
    pub fn write_to(&self, buf: &mut ByteBuffer) -> Result<()> {
        let (data, len) = self.to_bytes();
        buf.put(&data[..len])
    }
}

/// A message placed at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Absolute time in ticks
    pub time: u32,
    pub message: Message,
    /// Position in emission order, used as the final tie-break
    pub source_index: usize,
}

impl Event {
    pub fn priority(&self) -> Priority {
        self.message.priority()
    }

    /// Sort key: (time, priority, emission order)
    pub fn order_key(&self) -> (u32, Priority, usize) {
        (self.time, self.priority(), self.source_index)
    }
}
