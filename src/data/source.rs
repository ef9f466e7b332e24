use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Open a text file for buffered reading, transparently decompressing gzip.
///
/// Gzip is detected by magic bytes rather than by extension, so a `.txt`
/// that was compressed in place still reads correctly.
pub fn open_text<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut magic = [0u8; 2];
    let is_gzip = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        // Shorter than two bytes: cannot be gzip
        Err(_) => false,
    };

    let file = File::open(path)
        .with_context(|| format!("Failed to reopen {}", path.display()))?;

    if is_gzip {
        log::debug!("Reading gzipped file {}", path.display());
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a whole text file (gzip-aware) into a string.
pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut content = String::new();
    open_text(path)?
        .read_to_string(&mut content)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content)
}
