//! Destinations for encoded lines.
//!
//! Supports:
//! - any `Write` (files, stdout) through [`WriterSink`]
//! - an InfluxDB write endpoint through [`HttpSink`]
//! - several destinations at once through [`MultiSink`]

pub mod http;

use std::io::Write;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use crate::error::Result;

pub use http::HttpSink;

/// Extension appended to input file names in directory output mode.
pub const OUTPUT_EXTENSION: &str = "out";

/// Consumer of encoded lines.
pub trait LineSink {
    /// Accept one line, without its trailing newline.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush or deliver everything accepted so far.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: LineSink + ?Sized> LineSink for &mut S {
    fn write_line(&mut self, line: &str) -> Result<()> {
        (**self).write_line(line)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

impl<S: LineSink + ?Sized> LineSink for Box<S> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        (**self).write_line(line)
    }

    fn finish(&mut self) -> Result<()> {
        (**self).finish()
    }
}

// =============================================================================
// Writer output
// =============================================================================

/// Writes newline-terminated lines to a writer.
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> LineSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// Fan-out
// =============================================================================

/// Sends every line to each of its sinks, in order.
#[derive(Default)]
pub struct MultiSink<'a> {
    sinks: Vec<Box<dyn LineSink + 'a>>,
}

impl<'a> MultiSink<'a> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: impl LineSink + 'a) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LineSink for MultiSink<'_> {
    fn write_line(&mut self, line: &str) -> Result<()> {
        for sink in &mut self.sinks {
            sink.write_line(line)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for sink in &mut self.sinks {
            sink.finish()?;
        }
        Ok(())
    }
}

// =============================================================================
// Output path resolution
// =============================================================================

/// Where converted files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPath {
    /// No file output.
    None,
    /// All inputs go to this one file.
    File(PathBuf),
    /// One `<input name>.out` file per input inside this directory.
    Directory(PathBuf),
}

impl OutputPath {
    /// Interpret a user supplied output path.
    ///
    /// A path ending with the platform separator, or naming an existing
    /// directory, selects directory mode.
    pub fn parse(path: Option<&str>) -> Self {
        match path {
            None | Some("") => OutputPath::None,
            Some(p) if p.ends_with(MAIN_SEPARATOR) || p.ends_with('/') => {
                OutputPath::Directory(PathBuf::from(p))
            }
            Some(p) if Path::new(p).is_dir() => OutputPath::Directory(PathBuf::from(p)),
            Some(p) => OutputPath::File(PathBuf::from(p)),
        }
    }

    /// Output file for `input` (`None` for stdin) in directory mode.
    pub fn directory_file(dir: &Path, input: Option<&Path>) -> PathBuf {
        let name = input
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stdin".to_string());
        dir.join(format!("{}.{}", name, OUTPUT_EXTENSION))
    }
}
