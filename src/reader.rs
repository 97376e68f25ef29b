//! Line sources
use crate::error::{Error, FormatError};

use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor, Read},
    path::Path,
};

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

/// Forward only source of text lines, with line accounting.
pub trait LineSource {
    /// Returns the next line, without its termination.
    /// Returns None once the source is exhausted.
    fn next(&mut self) -> Result<Option<String>, Error>;

    /// Number of the last line returned (1 based)
    fn line_number(&self) -> usize;

    /// Name of this source, for diagnostics
    fn name(&self) -> Option<&str> {
        None
    }

    /// Returns the next line, when the content is not allowed to end here.
    /// `context` describes what was expected.
    fn require(&mut self, context: &'static str) -> Result<String, Error> {
        match self.next()? {
            Some(line) => Ok(line),
            None => Err(Error::format(
                self.line_number(),
                "",
                FormatError::UnexpectedEof(context),
            )),
        }
    }
}

/// Local files, possibly gzip compressed
#[derive(Debug)]
pub enum FileReader {
    Plain(File),
    #[cfg(feature = "flate2")]
    Gz(GzDecoder<File>),
}

impl Read for FileReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Self::Plain(h) => h.read(buf),
            #[cfg(feature = "flate2")]
            Self::Gz(h) => h.read(buf),
        }
    }
}

/// [LineSource] over any [Read]able interface
#[derive(Debug)]
pub struct LineReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    name: Option<String>,
    buf: String,
}

impl<R: Read> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            name: None,
            buf: String::with_capacity(128),
        }
    }

    /// Names this source
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

impl LineReader<FileReader> {
    /// Opens a local file. Files terminated by `.gz` are decompressed
    /// on the fly, which requires the `flate2` feature.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let fd = File::open(path)?;
        let gzip = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let reader = if gzip {
            #[cfg(feature = "flate2")]
            {
                FileReader::Gz(GzDecoder::new(fd))
            }
            #[cfg(not(feature = "flate2"))]
            {
                return Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::Unsupported,
                    "gzip compressed files require the flate2 feature",
                )));
            }
        } else {
            FileReader::Plain(fd)
        };

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self::new(reader).with_name(&name))
    }
}

impl LineReader<Cursor<Vec<u8>>> {
    /// Builds a [LineSource] from in memory content
    pub fn from_text(content: &str) -> Self {
        Self::new(Cursor::new(content.as_bytes().to_vec()))
    }
}

impl<R: Read> LineSource for LineReader<R> {
    fn next(&mut self) -> Result<Option<String>, Error> {
        self.buf.clear();
        let size = self.reader.read_line(&mut self.buf)?;
        if size == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let line = self.buf.trim_end_matches(|c: char| c == '\n' || c == '\r');
        Ok(Some(line.to_string()))
    }

    fn line_number(&self) -> usize {
        self.line_number
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
