//! Embedded chunk container
//!
//! Carries a container payload inside a foreign file format (a save blob
//! riding alongside a thumbnail in one image file) as a single tagged,
//! length-prefixed, checksummed chunk:
//!
//! ```text
//! ┌───────────────┬─────────┬──────────────────────┬─────────────────────────┐
//! │ Length (4 BE) │ Tag (4) │ Payload (length)     │ CRC32 of tag+payload (4)│
//! └───────────────┴─────────┴──────────────────────┴─────────────────────────┘
//! ```
//!
//! The length field covers the payload only. The payload reuses the
//! compressed container's framing minus its magic (the chunk tag plays
//! that role):
//!
//! ```text
//! [4: compressed len BE][4: uncompressed len BE][data]
//! ```
//!
//! so an embedded chunk can itself be a compressed archive.
//!
//! Checksum verification on read belongs to the embedding caller (it owns
//! the surrounding tag and length bytes); [`chunk_checksum`] is the
//! function to do it with. The reader skips the checksum field without
//! looking at it.

use crate::compressed::{deflate_payload, inflate_payload, PayloadBuf};
use crate::stream::{ByteStream, SeekOrigin};
use crc32fast::Hasher;
use savepoint_core::endian;
use savepoint_core::{Error, Result};
use tracing::debug;

/// Size of the chunk framing around the payload (length + tag + checksum).
pub const CHUNK_OVERHEAD: usize = 12;

/// CRC-32 over the tag bytes then the payload bytes, computed incrementally.
pub fn chunk_checksum(tag: &[u8; 4], payload: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(tag);
    hasher.update(payload);
    hasher.finalize()
}

/// Write-mode embedded chunk.
///
/// Borrows the caller's stream: the foreign format owns that handle, and
/// other sibling chunks follow this one. Nothing touches the medium until
/// [`finish`](Self::finish), which frames the accumulated payload and
/// leaves the stream positioned immediately past the chunk.
pub struct ChunkWriter<'a, S: ByteStream> {
    inner: &'a mut S,
    tag: [u8; 4],
    buf: PayloadBuf,
    compress: bool,
}

impl<'a, S: ByteStream> ChunkWriter<'a, S> {
    /// New chunk writer with the caller-supplied type tag.
    pub fn new(inner: &'a mut S, tag: [u8; 4]) -> Self {
        ChunkWriter {
            inner,
            tag,
            buf: PayloadBuf::new(),
            compress: true,
        }
    }

    /// New chunk writer that always stores its payload raw.
    pub fn without_compression(inner: &'a mut S, tag: [u8; 4]) -> Self {
        ChunkWriter {
            inner,
            tag,
            buf: PayloadBuf::new(),
            compress: false,
        }
    }

    /// Compress (or store) the payload and emit the framed chunk at the
    /// stream's current position. The stream stays open for the caller's
    /// next sibling chunk.
    pub fn finish(self) -> Result<()> {
        let Self {
            inner,
            tag,
            buf,
            compress,
        } = self;
        let payload = buf.into_bytes();
        let raw_len = payload.len() as u32;
        let (stored, compressed_len) = deflate_payload(payload, compress)?;

        let mut framed = Vec::with_capacity(8 + stored.len());
        framed.extend_from_slice(&endian::disk_u32(compressed_len));
        framed.extend_from_slice(&endian::disk_u32(raw_len));
        framed.extend_from_slice(&stored);

        let crc = chunk_checksum(&tag, &framed);
        debug!(
            tag = %String::from_utf8_lossy(&tag),
            raw = raw_len,
            stored = framed.len(),
            "closing chunk"
        );

        inner.write(&endian::disk_u32(framed.len() as u32))?;
        inner.write(&tag)?;
        inner.write(&framed)?;
        inner.write(&endian::disk_u32(crc))?;
        Ok(())
    }
}

impl<S: ByteStream> ByteStream for ChunkWriter<'_, S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.buf.write(data);
        Ok(())
    }

    fn read(&mut self, _buf: &mut [u8]) -> Result<()> {
        Err(Error::invalid_operation("read on a write-mode chunk"))
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        self.buf.seek(offset, origin)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.buf.tell())
    }
}

/// Read-mode embedded chunk.
///
/// The caller has already parsed the foreign format's indexing: the stream
/// is positioned at the first payload byte and `payload_len` is the chunk
/// length field it read. Open consumes the payload plus the trailing
/// checksum field, leaving the stream at the next sibling chunk.
pub struct ChunkReader {
    payload: Vec<u8>,
    pos: usize,
}

impl ChunkReader {
    /// Read and inflate a chunk payload of the pre-declared length.
    pub fn open<S: ByteStream>(inner: &mut S, payload_len: u32) -> Result<Self> {
        if payload_len < 8 {
            return Err(Error::corruption(format!(
                "chunk payload of {} bytes is too short for its length fields",
                payload_len
            )));
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
        if stored_len != payload_len - 8 {
            return Err(Error::corruption(format!(
                "chunk declares {} payload bytes but frames {}",
                payload_len - 8,
                stored_len
            )));
        }

        let mut stored = vec![0u8; stored_len as usize];
        inner.read(&mut stored)?;

        // Trailing checksum is the embedding caller's to verify; this layer
        // never saw the tag bytes it covers.
        inner.seek(4, SeekOrigin::Current)?;

        let payload = inflate_payload(stored, compressed_len, uncompressed_len)?;
        debug!(len = payload.len(), "opened chunk");
        Ok(ChunkReader { payload, pos: 0 })
    }

    /// Total payload length after inflation.
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

impl ByteStream for ChunkReader {
    fn write(&mut self, _data: &[u8]) -> Result<()> {
        Err(Error::invalid_operation("write on a read-mode chunk"))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let end = self.pos + buf.len();
        if end > self.payload.len() {
            return Err(Error::corruption(format!(
                "read of {} bytes at offset {} past end of {}-byte chunk",
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
            return Err(Error::invalid_operation("seek before start of chunk"));
        }
        self.pos = target as usize;
        Ok(self.pos as u64)
    }

    fn tell(&mut self) -> Result<u64> {
        Ok(self.pos as u64)
    }
}
