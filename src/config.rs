//! Compiler configuration
//!
//! Loaded from a RON file, every field optional:
//!
//! ```ron
//! (
//!     defaults: (bpm: 90, ppq: 960, channel: 1, velocity: 80),
//!     output_dir: "out",
//!     extension: "mid",
//! )
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const BPM_RANGE: (i64, i64) = (20, 400);
pub const PPQ_RANGE: (i64, i64) = (48, 9600);
pub const CHANNEL_RANGE: (i64, i64) = (0, 15);
pub const VELOCITY_RANGE: (i64, i64) = (0, 127);

/// Playback state at the start of every score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    /// Tempo in quarter notes per minute
    pub bpm: u16,
    /// Ticks per quarter note
    pub ppq: u16,
    /// MIDI channel (0-15)
    pub channel: u8,
    /// Velocity for note lines without one
    pub velocity: u8,
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            bpm: 120,
            ppq: 480,
            channel: 0,
            velocity: 100,
        }
    }
}

/// Configuration for a compilation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub defaults: PlaybackDefaults,
    /// Directory the CLI writes compiled files into
    pub output_dir: PathBuf,
    /// File extension for compiled files, without the dot
    pub extension: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            defaults: PlaybackDefaults::default(),
            output_dir: PathBuf::from("midis"),
            extension: "midi".to_string(),
        }
    }
}

fn check_range(what: &str, value: i64, (min, max): (i64, i64)) -> Result<()> {
    if value < min || value > max {
        return Err(Error::Config(format!(
            "{} {} out of range ({}..{})",
            what, value, min, max
        )));
    }
    Ok(())
}

impl CompilerConfig {
    /// Parse and validate a RON configuration string
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: CompilerConfig =
            ron::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Check the playback defaults against the score command bounds
    pub fn validate(&self) -> Result<()> {
        let d = &self.defaults;
        check_range("default bpm", d.bpm as i64, BPM_RANGE)?;
        check_range("default ppq", d.ppq as i64, PPQ_RANGE)?;
        check_range("default channel", d.channel as i64, CHANNEL_RANGE)?;
        check_range("default velocity", d.velocity as i64, VELOCITY_RANGE)?;
        if self.extension.is_empty() {
            return Err(Error::Config("extension must not be empty".to_string()));
        }
        Ok(())
    }

    /// Output file for a compiled score
    ///
    /// Uses `name` when given, otherwise the final component of `input`
    /// (split on both `/` and `\`, extension kept), placed in
    /// `output_dir` with `extension` appended.
    pub fn output_path(&self, input: &str, name: Option<&str>) -> PathBuf {
        let stem = match name {
            Some(name) => name,
            None => input.rsplit(['/', '\\']).next().unwrap_or(input),
        };
        self.output_dir
            .join(format!("{}.{}", stem, self.extension))
    }
}
