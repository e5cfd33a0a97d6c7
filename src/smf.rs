//! Standard MIDI File writer
//!
//! Produces Format 0 files with a single track:
//!
//! ```text
//! MThd <len=6> <format=0> <ntrks=1> <division=ppq>
//! MTrk <len>   (<delta vlq> <event bytes>)* 00 FF 2F 00
//! ```
//!
//! All multi-byte integers are big-endian.

use std::fs;
use std::path::Path;

use crate::bytebuf::ByteBuffer;
use crate::error::{Error, Result};
use crate::pipeline::event::{Event, Message};

const HEADER_LENGTH: u32 = 6;
const FORMAT_SINGLE_TRACK: u16 = 0;

/// Build the track body from ordered events
///
/// Each event becomes a delta time (ticks since the previous event) followed
/// by its raw bytes. End of Track is appended at delta 0.
pub fn encode_track(events: &[Event]) -> Result<ByteBuffer> {
    let mut track = ByteBuffer::new();
    let mut last_tick = 0u32;

    for event in events {
        debug_assert!(
            event.time >= last_tick,
            "events out of order: tick {} after {}",
            event.time,
            last_tick
        );
        track.put_vlq(event.time.saturating_sub(last_tick))?;
        event.message.write_to(&mut track)?;
        last_tick = event.time;
    }

    track.put_vlq(0)?;
    Message::EndOfTrack.write_to(&mut track)?;
    Ok(track)
}

/// Encode ordered events into a complete SMF byte stream
///
/// # Arguments
/// * `events` - Events sorted by (time, priority, emission order)
/// * `ppq` - Ticks per quarter note for the header division field
pub fn encode(events: &[Event], ppq: u16) -> Result<Vec<u8>> {
    let track = encode_track(events)?;
    let track_len = u32::try_from(track.len()).map_err(|_| Error::ResourceExhaustion {
        context: "sizing track chunk",
    })?;

    let mut out = ByteBuffer::new();

    out.put(b"MThd")?;
    out.put_be32(HEADER_LENGTH)?;
    out.put_be16(FORMAT_SINGLE_TRACK)?;
    out.put_be16(1)?;
    out.put_be16(ppq)?;

    out.put(b"MTrk")?;
    out.put_be32(track_len)?;
    out.put(track.as_slice())?;

    Ok(out.into_vec())
}

/// Read a variable-length quantity from the start of `bytes`
///
/// Returns the value and the number of bytes consumed, or `None` if the
/// input ends mid-quantity or the value does not fit in 32 bits.
pub fn read_vlq(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut value: u32 = 0;
    for (i, &byte) in bytes.iter().enumerate().take(5) {
        if value > (u32::MAX >> 7) {
            return None;
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }
    None
}

/// Write encoded SMF bytes to `path`
pub fn write_smf(path: &Path, bytes: &[u8]) -> Result<()> {
    fs::write(path, bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(time: u32, message: Message, source_index: usize) -> Event {
        Event {
            time,
            message,
            source_index,
        }
    }

    fn on(pitch: u8) -> Message {
        Message::NoteOn {
            channel: 0,
            pitch,
            velocity: 100,
        }
    }

    fn off(pitch: u8) -> Message {
        Message::NoteOff { channel: 0, pitch }
    }

    fn vlq(value: u32) -> Vec<u8> {
        let mut buf = ByteBuffer::new();
        buf.put_vlq(value).unwrap();
        buf.into_vec()
    }

    #[test]
    fn test_empty_track_is_end_of_track_only() {
        let track = encode_track(&[]).unwrap();
        assert_eq!(track.as_slice(), &[0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode(&[], 960).unwrap();
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[4..8], &[0, 0, 0, 6]);
        assert_eq!(&bytes[8..10], &[0, 0]); // format 0
        assert_eq!(&bytes[10..12], &[0, 1]); // one track
        assert_eq!(&bytes[12..14], &[0x03, 0xC0]); // 960
        assert_eq!(&bytes[14..18], b"MTrk");
        assert_eq!(&bytes[18..22], &[0, 0, 0, 4]);
        assert_eq!(bytes.len(), 22 + 4);
    }

    #[test]
    fn test_deltas_are_relative() {
        let events = [
            event(0, on(60), 0),
            event(200, off(60), 1),
            event(200, on(62), 2),
            event(400, off(62), 3),
        ];
        let track = encode_track(&events).unwrap();
        assert_eq!(
            track.as_slice(),
            &[
                0x00, 0x90, 60, 100, //
                0x81, 0x48, 0x80, 60, 0, //
                0x00, 0x90, 62, 100, //
                0x81, 0x48, 0x80, 62, 0, //
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "events out of order")]
    fn test_unordered_events_are_caught() {
        let events = [event(200, off(60), 0), event(100, on(62), 1)];
        let _ = encode_track(&events);
    }

    #[test]
    fn test_track_length_matches_body() {
        let events = [event(
            100_000,
            Message::Tempo {
                micros_per_quarter: 600_000,
            },
            0,
        )];
        let bytes = encode(&events, 480).unwrap();
        let len = u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        assert_eq!(len, bytes.len() - 22);
        // 100000 needs three VLQ bytes
        assert_eq!(len, 3 + 6 + 4);
    }

    #[test]
    fn test_read_vlq_reference_values() {
        assert_eq!(read_vlq(&[0x00]), Some((0, 1)));
        assert_eq!(read_vlq(&[0x7F]), Some((127, 1)));
        assert_eq!(read_vlq(&[0x81, 0x00]), Some((128, 2)));
        assert_eq!(read_vlq(&[0x81, 0x40, 0x99]), Some((192, 2)));
    }

    #[test]
    fn test_read_vlq_rejects_truncated_and_oversized() {
        assert_eq!(read_vlq(&[]), None);
        assert_eq!(read_vlq(&[0x81]), None);
        assert_eq!(read_vlq(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]), None);
        assert_eq!(read_vlq(&[0x90, 0x80, 0x80, 0x80, 0x00]), None);
    }

    #[test]
    fn test_vlq_round_trip() {
        let mut samples = vec![0, 0x7FFF_FFFF, u32::MAX];
        for shift in 0..32 {
            let p = 1u32 << shift;
            samples.extend([p - 1, p, p + 1]);
        }
        for v in samples {
            let bytes = vlq(v);
            assert_eq!(read_vlq(&bytes), Some((v, bytes.len())), "value {}", v);
        }
    }

    #[test]
    fn test_write_smf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.midi");
        let bytes = encode(&[], 480).unwrap();
        write_smf(&path, &bytes).unwrap();
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_write_smf_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.midi");
        let err = write_smf(&path, &[]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
