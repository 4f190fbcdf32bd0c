// SPDX-License-Identifier: Apache-2.0

//! Reads Liberty files from disk, transparently decompressing `*.gz`.

use super::liberty_parser::{Block, LibertyParser};
use crate::error::{DffLibMapError, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Adapts a reader into the byte iterator the parser consumes; the first I/O
/// error ends the iteration and is kept for the caller to report.
struct ByteReader<R: Read> {
    reader: BufReader<R>,
    error: Option<std::io::Error>,
}

impl<R: Read> ByteReader<R> {
    fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(256 * 1024, reader),
            error: None,
        }
    }
}

impl<R: Read> Iterator for ByteReader<R> {
    type Item = u8;

    fn next(&mut self) -> Option<u8> {
        if self.error.is_some() {
            return None;
        }
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return None,
                Ok(_) => return Some(byte[0]),
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.error = Some(e);
                    return None;
                }
            }
        }
    }
}

/// Parses Liberty text held in memory.
pub fn parse_liberty_str(text: &str) -> Result<Block> {
    LibertyParser::new(text).parse().map_err(DffLibMapError::Parse)
}

/// Opens and parses the Liberty file at `path`.
///
/// A file that cannot be opened is a configuration error; malformed contents
/// are a parse error.
pub fn parse_liberty_file(path: &Path) -> Result<Block> {
    let file = File::open(path).map_err(|e| {
        DffLibMapError::Config(format!(
            "Can't open liberty file `{}': {}",
            path.display(),
            e
        ))
    })?;
    match file.metadata() {
        Ok(meta) => log::info!(
            "Parsing Liberty file: {} ({} bytes)",
            path.display(),
            meta.len()
        ),
        Err(e) => log::warn!("Could not stat {}: {}", path.display(), e),
    }
    let is_gz = path.extension().map(|x| x == "gz").unwrap_or(false);
    let reader: Box<dyn Read> = if is_gz {
        Box::new(MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(file)
    };
    let mut bytes = ByteReader::new(reader);
    let parsed = LibertyParser::new_from_iter(&mut bytes).parse();
    if let Some(e) = bytes.error.take() {
        return Err(DffLibMapError::Config(format!(
            "Error reading liberty file `{}': {}",
            path.display(),
            e
        )));
    }
    parsed.map_err(|e| DffLibMapError::Parse(format!("{}: {}", path.display(), e)))
}
