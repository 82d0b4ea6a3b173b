//! Storage containers for savepoint archives
//!
//! This crate implements the byte-oriented storage backends the codec
//! writes through:
//! - `stream`: the sequential read/write/seek surface over a file or
//!   memory buffer
//! - `compressed`: the framed, optionally zstd-compressed container
//! - `chunk`: the tagged, checksummed chunk variant embedded inside a
//!   foreign file format

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunk;
pub mod compressed;
pub mod stream;

pub use chunk::{chunk_checksum, ChunkReader, ChunkWriter, CHUNK_OVERHEAD};
pub use compressed::{
    CompressedReader, CompressedWriter, CONTAINER_HEADER_SIZE, CONTAINER_MAGIC,
    INITIAL_BUFFER_CAPACITY, LEGACY_MAGIC,
};
pub use stream::{ByteStream, FileStream, MemoryStream, Mode, SeekOrigin};
