//! Compressed container format
//!
//! A container wraps one logical byte payload, compressed as a single
//! block, behind a small signed header.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────┬──────────────────────┬────────────────────────┬─────────┐
//! │ Magic "SVPZ" (4) │ Compressed len (4 BE)│ Uncompressed len (4 BE)│ Payload │
//! └──────────────────┴──────────────────────┴────────────────────────┴─────────┘
//! ```
//!
//! A compressed length of 0 means the payload is stored raw (compression
//! was disabled or did not shrink it); the payload is then exactly
//! uncompressed-length bytes. Otherwise the payload is exactly
//! compressed-length bytes of zstd data.
//!
//! The retired deflate-based scheme ("SVPF") is recognized only to reject
//! it with a clear message. Any other magic means "not a container": the
//! open path reports that as `Ok(None)` so the caller can try other
//! interpretations of the file.

use crate::stream::{ByteStream, SeekOrigin};
use savepoint_core::endian;
use savepoint_core::{Error, Result};
use tracing::{debug, warn};

/// Magic bytes identifying the current container scheme: "SVPZ"
pub const CONTAINER_MAGIC: [u8; 4] = *b"SVPZ";

/// Magic bytes of the retired deflate-based scheme, recognized only to
/// produce a clear "no longer supported" error
pub const LEGACY_MAGIC: [u8; 4] = *b"SVPF";

/// Container header size in bytes (magic + both length fields)
pub const CONTAINER_HEADER_SIZE: usize = 12;

/// Initial payload buffer capacity. Capacity doubles whenever a write
/// would overflow it; this is the only growth policy.
pub const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Growable payload accumulator shared by the container and chunk writers.
///
/// Tracks a logical length and a cursor separately so a writer can seek
/// back and patch earlier bytes without truncating what follows.
#[derive(Debug)]
pub(crate) struct PayloadBuf {
    data: Vec<u8>,
    len: usize,
    pos: usize,
}

impl PayloadBuf {
    pub(crate) fn new() -> Self {
        PayloadBuf {
            data: Vec::new(),
            len: 0,
            pos: 0,
        }
    }

    /// Storage currently held, before logical truncation.
    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    fn grow_to_fit(&mut self, required: usize) {
        let mut capacity = self.data.len().max(INITIAL_BUFFER_CAPACITY);
        while capacity < required {
            capacity *= 2;
        }
        if capacity > self.data.len() {
            self.data.resize(capacity, 0);
        }
    }

    pub(crate) fn write(&mut self, data: &[u8]) {
        let end = self.pos + data.len();
        if end > self.data.len() {
            self.grow_to_fit(end);
        }
        self.data[self.pos..end].copy_from_slice(data);
        self.pos = end;
        if end > self.len {
            self.len = end;
        }
    }

    pub(crate) fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let base = match origin {
            SeekOrigin::Start => 0i64,
            SeekOrigin::Current => self.pos as i64,
            SeekOrigin::End => self.len as i64,
        };
        let target = base + offset;
        if target < 0 {
            return Err(Error::invalid_operation("seek before start of payload"));
        }
        self.pos = target as usize;
        Ok(self.pos as u64)
    }

    pub(crate) fn tell(&self) -> u64 {
        self.pos as u64
    }

    pub(crate) fn into_bytes(mut self) -> Vec<u8> {
        self.data.truncate(self.len);
        self.data
    }
}

/// Deflate `payload` unless disabled or not worthwhile.
///
/// Returns the bytes to store and the compressed-length header field
/// (0 when the original bytes are stored raw).
pub(crate) fn deflate_payload(payload: Vec<u8>, compress: bool) -> Result<(Vec<u8>, u32)> {
    if !compress {
        return Ok((payload, 0));
    }
    let packed = zstd::bulk::compress(&payload, zstd::DEFAULT_COMPRESSION_LEVEL)
        .map_err(|e| Error::compress(e.to_string()))?;
    if packed.len() < payload.len() {
        let compressed_len = packed.len() as u32;
        Ok((packed, compressed_len))
    } else {
        Ok((payload, 0))
    }
}

/// Inflate a stored payload according to its header fields.
pub(crate) fn inflate_payload(
    stored: Vec<u8>,
    compressed_len: u32,
    uncompressed_len: u32,
) -> Result<Vec<u8>> {
    if compressed_len == 0 {
        return Ok(stored);
    }
    let inflated = zstd::bulk::decompress(&stored, uncompressed_len as usize)
        .map_err(|e| Error::decompress(e.to_string()))?;
    if inflated.len() != uncompressed_len as usize {
        return Err(Error::corruption(format!(
            "payload inflated to {} bytes but header declared {}",
            inflated.len(),
            uncompressed_len
        )));
    }
    Ok(inflated)
}

/// Write-mode container.
///
/// Owns its underlying stream. Every write lands in an in-memory payload
/// buffer; nothing touches the medium until [`finish`](Self::finish),
/// which compresses the accumulated payload, frames it, emits it, and
/// returns the underlying stream.
pub struct CompressedWriter<S: ByteStream> {
    inner: S,
    buf: PayloadBuf,
    compress: bool,
}

impl<S: ByteStream> CompressedWriter<S> {
    /// New writer that compresses its payload on finish.
    pub fn new(inner: S) -> Self {
        CompressedWriter {
            inner,
            buf: PayloadBuf::new(),
            compress: true,
        }
    }

    /// New writer that always stores its payload raw.
    pub fn without_compression(inner: S) -> Self {
        CompressedWriter {
            inner,
            buf: PayloadBuf::new(),
            compress: false,
        }
    }

    /// Bytes accumulated so far.
    pub fn payload_len(&self) -> usize {
        self.buf.len
    }

    /// Compress (or store) the payload, emit the framed container to the
    /// underlying stream, and return that stream.
    pub fn finish(self) -> Result<S> {
        let Self {
            mut inner,
            buf,
            compress,
        } = self;
        let payload = buf.into_bytes();
        let raw_len = payload.len() as u32;
        let (stored, compressed_len) = deflate_payload(payload, compress)?;

        debug!(
            raw = raw_len,
            stored = stored.len(),
            compressed = compressed_len != 0,
            "closing container"
        );

        inner.write(&CONTAINER_MAGIC)?;
        inner.write(&endian::disk_u32(compressed_len))?;
        inner.write(&endian::disk_u32(raw_len))?;
        inner.write(&stored)?;
        Ok(inner)
    }
}

impl<S: ByteStream> ByteStream for CompressedWriter<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buf.write(data);
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::invalid_operation("read on a write-mode container"))
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        self.buf.seek(offset, origin)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.buf.tell())
    }
}

/// Read-mode container.
///
/// [`open`](Self::open) validates the header, reads and inflates the whole
/// payload up front, then serves sequential reads from the buffered bytes.
#[derive(Debug)]
pub struct CompressedReader {
    payload: Vec<u8>,
    pos: usize,
}

impl CompressedReader {
    /// Open a container from the stream's current position.
    ///
    /// Returns `Ok(None)` when the leading magic is not a container of
    /// this kind at all (including a medium too short to hold a magic);
    /// that outcome is the caller's to interpret, not a failure. A
    /// recognized-but-retired scheme and every corruption of a recognized
    /// container are hard errors.
    pub fn open<S: ByteStream>(inner: &mut S) -> Result<Option<Self>> {
        let mut magic = [0u8; 4];
        match inner.read(&mut magic) {
            Ok(()) => {}
            Err(Error::Corruption(_)) => return Ok(None),
            Err(e) => return Err(e),
        }

        if magic == LEGACY_MAGIC {
            warn!("container uses the retired compression scheme");
            return Err(Error::LegacyFormat);
        }
        if magic != CONTAINER_MAGIC {
            return Ok(None);
        }

        let mut field = [0u8; 4];
        inner.read(&mut field)?;
        let compressed_len = endian::host_u32(field);
        inner.read(&mut field)?;
        let uncompressed_len = endian::host_u32(field);

        let stored_len = if compressed_len != 0 {
            compressed_len
        } else {
            uncompressed_len
        };
        let mut stored = vec![0u8; stored_len as usize];
        inner.read(&mut stored)?;

        let payload = inflate_payload(stored, compressed_len, uncompressed_len)?;
        debug!(len = payload.len(), "opened container");
        Ok(Some(CompressedReader { payload, pos: 0 }))
    }

    /// Total payload length after inflation.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

impl ByteStream for CompressedReader {
    fn write(&mut self, _data: &[u8]) -> Result<()> {
        Err(Error::invalid_operation("write on a read-mode container"))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len();
        if end > self.payload.len() {
            return Err(Error::corruption(format!(
                "read of {} bytes at offset {} past end of {}-byte payload",
                buf.len(),
                self.pos,
                self.payload.len()
            )));
        }
        buf.copy_from_slice(&self.payload[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let base = match origin {
            SeekOrigin::Start => 0i64,
            SeekOrigin::Current => self.pos as i64,
            SeekOrigin::End => self.payload.len() as i64,
        };
        let target = base + offset;
        if target < 0 {
            return Err(Error::invalid_operation("seek before start of payload"));
        }
        self.pos = target as usize;
        Ok(self.pos as u64)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }
}
