//! Transparent decompression for file-backed cell sources.
//!
//! Sources call [`auto_detect_reader`] on a freshly opened file. Detection checks
//! the file extension first and falls back to the stream's magic bytes, so a
//! `data.csv.gz` and a gzip stream saved as `data.csv` both decode.
//!
//! Built-in codecs, when their feature is enabled:
//! - **Gzip** (`.gz`) via `flate2` (feature `compression-gzip`)
//! - **Zstd** (`.zst`) via `zstd` (feature `compression-zstd`)
//!
//! Compressed streams cannot seek, which is why file sources reposition by
//! re-opening and skipping rows.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// A decompression codec recognizable by extension or magic bytes.
pub trait Decompressor: Send + Sync {
    /// Human-readable codec name (e.g., "gzip", "zstd").
    fn name(&self) -> &'static str;

    /// File extensions with leading dot, lowercase (e.g., `&[".gz", ".gzip"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Signature at the start of a compressed stream.
    fn magic_bytes(&self) -> &'static [u8];

    /// Wrap `reader` so it yields decompressed bytes.
    ///
    /// # Errors
    /// Returns an error if the decoder cannot be initialized.
    fn wrap(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>>;
}

/// Codecs compiled into this build.
#[must_use]
#[allow(unused_mut)]
pub fn builtin_codecs() -> Vec<&'static dyn Decompressor> {
    let mut codecs: Vec<&'static dyn Decompressor> = Vec::new();
    #[cfg(feature = "compression-gzip")]
    codecs.push(&GzipCodec);
    #[cfg(feature = "compression-zstd")]
    codecs.push(&ZstdCodec);
    codecs
}

/// Codec whose extension matches `path`, if any. Case-insensitive.
#[must_use]
pub fn detect_from_extension(path: &Path) -> Option<&'static dyn Decompressor> {
    let name = path.to_string_lossy().to_lowercase();
    builtin_codecs()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
}

fn detect_from_magic<R: BufRead>(reader: &mut R) -> io::Result<Option<&'static dyn Decompressor>> {
    let buf = reader.fill_buf()?;
    if buf.is_empty() {
        return Ok(None);
    }
    Ok(builtin_codecs()
        .into_iter()
        .find(|codec| buf.starts_with(codec.magic_bytes())))
}

/// Wrap `reader` with decompression when `path_hint` or the stream calls for it.
///
/// # Errors
/// Returns an error when peeking at the stream or initializing a decoder fails.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> io::Result<Box<dyn Read>> {
    if let Some(codec) = detect_from_extension(path_hint.as_ref()) {
        return codec.wrap(Box::new(reader));
    }

    let mut buffered = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buffered)? {
        return codec.wrap(Box::new(buffered));
    }
    Ok(Box::new(buffered))
}

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl Decompressor for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x1f, 0x8b]
    }

    fn wrap(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(flate2::read::MultiGzDecoder::new(reader)))
    }
}

#[cfg(feature = "compression-zstd")]
struct ZstdCodec;

#[cfg(feature = "compression-zstd")]
impl Decompressor for ZstdCodec {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".zst", ".zstd"]
    }

    fn magic_bytes(&self) -> &'static [u8] {
        &[0x28, 0xb5, 0x2f, 0xfd]
    }

    fn wrap(&self, reader: Box<dyn Read>) -> io::Result<Box<dyn Read>> {
        zstd::stream::read::Decoder::new(reader).map(|d| Box::new(d) as Box<dyn Read>)
    }
}
