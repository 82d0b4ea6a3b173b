//! Savepoint: object-graph persistence codec
//!
//! Turns an in-memory graph of heap objects (cyclic and shared references
//! included) into a compact, optionally-compressed binary blob, and
//! reconstructs an equivalent graph from that blob.
//!
//! The layers, bottom up:
//!
//! - [`ByteStream`]: sequential read/write/seek over a file or memory
//!   buffer, one mode per handle
//! - [`CompressedWriter`] / [`CompressedReader`]: the framed container
//!   (magic, two big-endian length fields, zstd-or-raw payload)
//! - [`ChunkWriter`] / [`ChunkReader`]: the same payload carried as one
//!   tagged, CRC-checksummed chunk inside a foreign file format
//! - [`Serializer`] / [`Deserializer`]: the token protocol that collapses
//!   repeat references through per-session identity tables
//!
//! # Saving and loading a graph
//!
//! ```
//! use savepoint::{
//!     CompressedReader, CompressedWriter, Deserializer, MemoryStream, ObjRef, ObjSlot,
//!     Persist, Serializer, TypeRegistry,
//! };
//! use std::any::Any;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! #[derive(Default)]
//! struct Marker {
//!     ticks: u32,
//! }
//!
//! impl Persist for Marker {
//!     fn type_tag(&self) -> &'static str {
//!         "marker"
//!     }
//!     fn write_fields(&self, ser: &mut Serializer<'_>) -> savepoint::Result<()> {
//!         ser.write_u32(self.ticks)
//!     }
//!     fn read_fields(&mut self, de: &mut Deserializer<'_>) -> savepoint::Result<()> {
//!         self.ticks = de.read_u32()?;
//!         Ok(())
//!     }
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! # fn main() -> savepoint::Result<()> {
//! let marker = Rc::new(RefCell::new(Marker { ticks: 35 }));
//!
//! let mut writer = CompressedWriter::new(MemoryStream::new());
//! Serializer::new(&mut writer).write_object(&ObjSlot::object(&marker))?;
//! let blob = writer.finish()?.into_bytes();
//!
//! let mut registry = TypeRegistry::new();
//! registry.register("marker", || -> ObjRef { Rc::new(RefCell::new(Marker::default())) });
//!
//! let mut medium = MemoryStream::from_vec(blob);
//! let mut reader = CompressedReader::open(&mut medium)?.expect("is a container");
//! let loaded = Deserializer::new(&mut reader, &registry).read_object()?;
//! let loaded = loaded.as_object().unwrap();
//! assert_eq!(
//!     loaded.borrow().as_any().downcast_ref::<Marker>().unwrap().ticks,
//!     35
//! );
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use savepoint_codec::{
    Constructor, Deserializer, ObjRef, ObjSlot, Persist, Serializer, TypeRegistry,
};
pub use savepoint_container::{
    chunk_checksum, ByteStream, ChunkReader, ChunkWriter, CompressedReader, CompressedWriter,
    FileStream, MemoryStream, Mode, SeekOrigin, CHUNK_OVERHEAD, CONTAINER_HEADER_SIZE,
    CONTAINER_MAGIC, INITIAL_BUFFER_CAPACITY, LEGACY_MAGIC,
};
pub use savepoint_core::{endian, Error, Name, Result, Sprite};

/// Wire-level token constants and index-width rules.
pub mod wire {
    pub use savepoint_codec::wire::*;
}
