//! Token-based object-graph codec
//!
//! Walks a graph of heap objects (cyclic and shared references included)
//! and streams it through a [`ByteStream`](savepoint_container::ByteStream)
//! as a flat token protocol:
//!
//! - scalars are raw bytes in the fixed on-disk order, never tokenized
//! - every reference-typed value is one token byte, then for a first
//!   occurrence its type identity and fields, or for a repeat a small
//!   sequential index into the session's identity table
//! - names and sprite tags mirror the same scheme against their own
//!   independent tables
//!
//! The protocol is strictly ordered, not content-addressed: the Nth first
//! occurrence on the write side is the Nth on the read side, which is the
//! whole correctness argument for back-references.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod de;
pub mod persist;
pub mod ser;
pub mod wire;

pub use de::Deserializer;
pub use persist::{Constructor, ObjRef, ObjSlot, Persist, TypeRegistry};
pub use ser::Serializer;
