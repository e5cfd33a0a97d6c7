//! Growable byte buffer used to assemble SMF output
//!
//! Capacity starts at 256 bytes and doubles until the pending write fits.
//! Allocation failure is reported as [`Error::ResourceExhaustion`] instead of
//! aborting.

use crate::error::{Error, Result};

const INITIAL_CAPACITY: usize = 256;

/// Owned, append-only byte container
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ByteBuffer {
    bytes: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure room for `additional` more bytes
    ///
    /// Grows to the next power-of-two multiple of the current capacity
    /// (or 256 bytes for an empty buffer).
    pub fn reserve(&mut self, additional: usize) -> Result<()> {
        let need = self
            .bytes
            .len()
            .checked_add(additional)
            .ok_or(Error::ResourceExhaustion {
                context: "sizing byte buffer",
            })?;
        if need <= self.bytes.capacity() {
            return Ok(());
        }

        let mut new_cap = self.bytes.capacity().max(INITIAL_CAPACITY);
        while new_cap < need {
            new_cap = new_cap.checked_mul(2).ok_or(Error::ResourceExhaustion {
                context: "sizing byte buffer",
            })?;
        }

        self.bytes
            .try_reserve_exact(new_cap - self.bytes.len())
            .map_err(|_| Error::ResourceExhaustion {
                context: "growing byte buffer",
            })
    }

    /// Append raw bytes
    pub fn put(&mut self, src: &[u8]) -> Result<()> {
        self.reserve(src.len())?;
        self.bytes.extend_from_slice(src);
        Ok(())
    }

    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.reserve(1)?;
        self.bytes.push(value);
        Ok(())
    }

    /// Append a 16-bit value, most significant byte first
    pub fn put_be16(&mut self, value: u16) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    /// Append a 32-bit value, most significant byte first
    pub fn put_be32(&mut self, value: u32) -> Result<()> {
        self.put(&value.to_be_bytes())
    }

    /// Append a MIDI variable-length quantity
    ///
    /// 7 bits per byte, most significant group first, high bit set on every
    /// byte except the last.
    pub fn put_vlq(&mut self, value: u32) -> Result<()> {
        // A u32 needs at most 5 groups
        let mut groups = [0u8; 5];
        let mut n = 0;
        let mut rest = value;

        groups[n] = (rest & 0x7F) as u8;
        n += 1;
        rest >>= 7;
        while rest != 0 {
            groups[n] = (rest & 0x7F) as u8 | 0x80;
            n += 1;
            rest >>= 7;
        }

        groups[..n].reverse();
        self.put(&groups[..n])
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.bytes.capacity()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }
}
