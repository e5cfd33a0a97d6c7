//! Command-line driver shared by the binaries
//!
//! Reads a score file, compiles it and writes the result into the output
//! directory. The output file is only created once compilation succeeds.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;

/// Process exit status for a finished run
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Install the stderr `tracing` subscriber
///
/// `RUST_LOG` wins over the default filter (`warn`, or crate debug output
/// when `verbose`).
pub fn init_logging(verbose: bool) {
    let default = if verbose { "midiscribe=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Read a score file as text
///
/// Bytes that are not valid UTF-8 become U+FFFD, so they are harmless in
/// comment lines and show up as a line-numbered error anywhere else.
pub fn read_score(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Summary of a written file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub path: PathBuf,
    pub ppq: u16,
    pub last_tick: u32,
    /// Timeline events, End of Track excluded
    pub events: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} (ppq={}, lastTick={}, events={})",
            self.path.display(),
            self.ppq,
            self.last_tick,
            self.events
        )
    }
}

/// Compile `input` and write `<output_dir>/<name>.<extension>`
pub fn compile_to_file(input: &str, name: Option<&str>, config: CompilerConfig) -> Result<Report> {
    let text = read_score(Path::new(input))?;
    let output_path = config.output_path(input, name);

    let pipeline = Pipeline::new(config);
    let compilation = pipeline.compile(&text)?;

    let out_dir = &pipeline.config().output_dir;
    fs::create_dir_all(out_dir).map_err(|source| Error::Io {
        path: out_dir.clone(),
        source,
    })?;
    compilation.write_midi(&output_path)?;

    Ok(Report {
        path: output_path,
        ppq: compilation.ppq,
        last_tick: compilation.last_tick(),
        events: compilation.event_count(),
    })
}

/// Exit status for the outcome of a run
pub fn exit_status<T>(result: &Result<T>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}
