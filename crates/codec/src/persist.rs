//! Serializable object contract
//!
//! The codec never introspects fields. A domain type opts in by
//! implementing [`Persist`]: a symmetric pair of field passes plus a
//! stable type tag, and a registered constructor that builds an empty
//! shell of the type. Construction and population are two separate steps
//! so the read pass can register an object in its identity table before
//! filling it in; that ordering is what makes cyclic graphs resolvable.

use crate::de::Deserializer;
use crate::ser::Serializer;
use rustc_hash::FxHashMap;
use savepoint_core::Result;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared handle to a serializable heap object.
///
/// The codec is single-threaded by design; `Rc<RefCell<_>>` is the
/// ownership model for the whole object graph.
pub type ObjRef = Rc<RefCell<dyn Persist>>;

/// Constructor producing an empty shell of a registered type. Fields are
/// populated afterwards by [`Persist::read_fields`].
pub type Constructor = fn() -> ObjRef;

/// Contract for types the codec can serialize.
///
/// `write_fields` and `read_fields` must visit the same fields in the
/// same order; the codec stores no schema. A type's `read_fields` may be
/// handed references to objects whose own fields are not yet populated
/// (that is how cycles arrive), so it must only store them, never
/// inspect them during the pass.
pub trait Persist: Any {
    /// Stable tag identifying this type in archives, resolvable to a
    /// constructor through the [`TypeRegistry`].
    fn type_tag(&self) -> &'static str;

    /// Write every field, in a fixed order.
    fn write_fields(&self, ser: &mut Serializer<'_>) -> Result<()>;

    /// Read every field, in the same order `write_fields` wrote them.
    fn read_fields(&mut self, de: &mut Deserializer<'_>) -> Result<()>;

    /// Escape hatch back to the concrete type after a load.
    fn as_any(&self) -> &dyn Any;
}

/// A reference-typed value as the codec sees it.
#[derive(Clone, Default)]
pub enum ObjSlot {
    /// Absent reference.
    #[default]
    Null,
    /// Reserved sentinel, distinct from absent, preserved verbatim
    /// across a round trip.
    Tombstone,
    /// Live object.
    Object(ObjRef),
}

impl ObjSlot {
    /// Wrap a concrete object handle.
    pub fn object<T: Persist>(obj: &Rc<RefCell<T>>) -> Self {
        let concrete: Rc<RefCell<T>> = Rc::clone(obj);
        let shared: ObjRef = concrete;
        ObjSlot::Object(shared)
    }

    /// Whether this is the null reference.
    pub fn is_null(&self) -> bool {
        matches!(self, ObjSlot::Null)
    }

    /// Whether this is the tombstone sentinel.
    pub fn is_tombstone(&self) -> bool {
        matches!(self, ObjSlot::Tombstone)
    }

    /// The object handle, if this slot holds one.
    pub fn as_object(&self) -> Option<&ObjRef> {
        match self {
            ObjSlot::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl fmt::Debug for ObjSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjSlot::Null => f.write_str("Null"),
            ObjSlot::Tombstone => f.write_str("Tombstone"),
            ObjSlot::Object(obj) => write!(f, "Object({:p})", Rc::as_ptr(obj)),
        }
    }
}

/// Entry pairing a type tag with its shell constructor.
#[derive(Clone, Copy)]
pub(crate) struct TypeEntry {
    pub(crate) tag: &'static str,
    pub(crate) construct: Constructor,
}

/// Maps type tags to shell constructors for the read pass.
///
/// The registry is the caller's: register every type a save may contain
/// before opening it. An archive naming an unregistered tag fails hard;
/// there is no skip path for unknown types.
#[derive(Default)]
pub struct TypeRegistry {
    entries: FxHashMap<&'static str, TypeEntry>,
}

impl TypeRegistry {
    /// New empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type tag and its shell constructor. Re-registering a
    /// tag replaces the previous constructor.
    pub fn register(&mut self, tag: &'static str, construct: Constructor) {
        self.entries.insert(tag, TypeEntry { tag, construct });
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn lookup(&self, tag: &str) -> Option<TypeEntry> {
        self.entries.get(tag).copied()
    }
}
