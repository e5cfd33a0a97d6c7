//! Error types for score compilation

use std::path::PathBuf;

use thiserror::Error;

/// Failure to resolve a note token such as `C#4` or `Bb-1`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NoteParseError {
    #[error("unknown note letter '{0}'")]
    UnknownLetter(char),
    #[error("missing octave")]
    MissingOctave,
    #[error("invalid octave '{0}'")]
    InvalidOctave(String),
    #[error("pitch {0} outside 0..127")]
    PitchOutOfRange(i64),
}

/// Coarse classification of [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedCommand,
    OutOfRange,
    InvalidNoteToken,
    ResourceExhaustion,
    Config,
    Io,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("line {line}: {reason}")]
    MalformedCommand { line: usize, reason: String },

    #[error("line {line}: {what} out of range ({min}..{max})")]
    OutOfRange {
        line: usize,
        what: &'static str,
        min: i64,
        max: i64,
    },

    #[error("line {line}: invalid note token '{token}': {source}")]
    InvalidNoteToken {
        line: usize,
        token: String,
        source: NoteParseError,
    },

    #[error("out of memory while {context}")]
    ResourceExhaustion { context: &'static str },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedCommand { .. } => ErrorKind::MalformedCommand,
            Error::OutOfRange { .. } => ErrorKind::OutOfRange,
            Error::InvalidNoteToken { .. } => ErrorKind::InvalidNoteToken,
            Error::ResourceExhaustion { .. } => ErrorKind::ResourceExhaustion,
            Error::Config(_) => ErrorKind::Config,
            Error::Io { .. } => ErrorKind::Io,
        }
    }

    /// Score line the error was raised on, if it came from parsing
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::MalformedCommand { line, .. }
            | Error::OutOfRange { line, .. }
            | Error::InvalidNoteToken { line, .. } => Some(*line),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_line_number() {
        let err = Error::OutOfRange {
            line: 3,
            what: "bpm",
            min: 20,
            max: 400,
        };
        assert_eq!(err.to_string(), "line 3: bpm out of range (20..400)");
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn test_note_error_display() {
        let err = Error::InvalidNoteToken {
            line: 7,
            token: "H4".to_string(),
            source: NoteParseError::UnknownLetter('H'),
        };
        assert_eq!(
            err.to_string(),
            "line 7: invalid note token 'H4': unknown note letter 'H'"
        );
    }

    #[test]
    fn test_resource_exhaustion_has_no_line() {
        let err = Error::ResourceExhaustion {
            context: "growing byte buffer",
        };
        assert_eq!(err.line(), None);
        assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
    }
}
