//! Text score to Standard MIDI File compiler
//!
//! Compiles a line-oriented score (`tempo`, `ppq`, `channel`, `rest` and
//! note lines) into a Format 0, single-track SMF.
//!
//! - [`pipeline`]: score parsing, event model and scheduling
//! - [`smf`]: SMF byte layout and variable-length quantities
//! - [`timing`]: millisecond to tick conversion
//! - [`bytebuf`]: growable output buffer
//! - [`cli`]: file-level driver used by the binaries

pub mod bytebuf;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod smf;
pub mod timing;

pub use config::{CompilerConfig, PlaybackDefaults};
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{Compilation, Pipeline};

/// Compile score text into SMF bytes using the default configuration
///
/// # Example
/// ```
/// let bytes = midiscribe::compile_score("C4 200\n").unwrap();
/// assert_eq!(&bytes[0..4], b"MThd");
/// ```
pub fn compile_score(text: &str) -> Result<Vec<u8>> {
    Pipeline::new(CompilerConfig::default())
        .compile(text)?
        .encode()
}
