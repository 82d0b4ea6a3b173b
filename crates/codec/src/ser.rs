//! Write pass of the object-graph codec
//!
//! One serializer makes exactly one pass over a value sequence per
//! container session. It owns three identity tables (objects, names,
//! sprite tags) that assign sequential indices in first-occurrence order
//! and die with the pass.

use crate::persist::{ObjRef, ObjSlot};
use crate::wire::{
    index_width, TOKEN_NEW_NAME, TOKEN_NEW_OBJECT, TOKEN_NEW_SPRITE, TOKEN_NEW_TYPED_OBJECT,
    TOKEN_NIL_NAME, TOKEN_NIL_SPRITE, TOKEN_NULL, TOKEN_OLD_NAME, TOKEN_OLD_OBJECT,
    TOKEN_OLD_SPRITE, TOKEN_TOMBSTONE,
};
use rustc_hash::FxHashMap;
use savepoint_core::endian;
use savepoint_core::{Name, Result, Sprite};
use savepoint_container::ByteStream;
use std::rc::Rc;

/// Write pass over one container session.
pub struct Serializer<'a> {
    stream: &'a mut dyn ByteStream,
    /// Object identity: allocation address → first-occurrence index.
    objects: FxHashMap<usize, u32>,
    /// Type identity: type tag → first-occurrence index.
    types: FxHashMap<&'static str, u32>,
    /// Name identity: intern-pool handle → first-occurrence index.
    names: FxHashMap<u32, u32>,
    /// Sprite identity: intern-pool handle → first-occurrence index.
    sprites: FxHashMap<u32, u32>,
}

impl<'a> Serializer<'a> {
    /// New write pass over `stream`.
    pub fn new(stream: &'a mut dyn ByteStream) -> Self {
        Serializer {
            stream,
            objects: FxHashMap::default(),
            types: FxHashMap::default(),
            names: FxHashMap::default(),
            sprites: FxHashMap::default(),
        }
    }

    /// Objects assigned an identity so far this pass.
    pub fn objects_written(&self) -> usize {
        self.objects.len()
    }

    /// Write a u8.
    pub fn write_u8(&mut self, v: u8) -> Result<()> {
        self.stream.write(&[v])
    }

    /// Write a u16 in on-disk order.
    pub fn write_u16(&mut self, v: u16) -> Result<()> {
        self.stream.write(&endian::disk_u16(v))
    }

    /// Write a u32 in on-disk order.
    pub fn write_u32(&mut self, v: u32) -> Result<()> {
        self.stream.write(&endian::disk_u32(v))
    }

    /// Write a u64 in on-disk order.
    pub fn write_u64(&mut self, v: u64) -> Result<()> {
        self.stream.write(&endian::disk_u64(v))
    }

    /// Write an i8.
    pub fn write_i8(&mut self, v: i8) -> Result<()> {
        self.write_u8(v as u8)
    }

    /// Write an i16 in on-disk order.
    pub fn write_i16(&mut self, v: i16) -> Result<()> {
        self.stream.write(&endian::disk_i16(v))
    }

    /// Write an i32 in on-disk order.
    pub fn write_i32(&mut self, v: i32) -> Result<()> {
        self.stream.write(&endian::disk_i32(v))
    }

    /// Write an i64 in on-disk order.
    pub fn write_i64(&mut self, v: i64) -> Result<()> {
        self.stream.write(&endian::disk_i64(v))
    }

    /// Write an f32 bit pattern in on-disk order.
    pub fn write_f32(&mut self, v: f32) -> Result<()> {
        self.stream.write(&endian::disk_f32(v))
    }

    /// Write an f64 bit pattern in on-disk order.
    pub fn write_f64(&mut self, v: f64) -> Result<()> {
        self.stream.write(&endian::disk_f64(v))
    }

    /// Write a fixed-size blob verbatim. The width is the caller's
    /// contract; nothing is length-prefixed.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write(data)
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_u32(s.len() as u32)?;
        self.stream.write(s.as_bytes())
    }

    fn write_index(&mut self, index: u32, table_len: usize) -> Result<()> {
        match index_width(table_len) {
            1 => self.write_u8(index as u8),
            2 => self.write_u16(index as u16),
            _ => self.write_u32(index),
        }
    }

    /// Write an object reference: a token, then for a first occurrence the
    /// type identity and the object's fields.
    pub fn write_object(&mut self, slot: &ObjSlot) -> Result<()> {
        match slot {
            ObjSlot::Null => self.write_u8(TOKEN_NULL),
            ObjSlot::Tombstone => self.write_u8(TOKEN_TOMBSTONE),
            ObjSlot::Object(obj) => self.write_object_ref(obj),
        }
    }

    fn write_object_ref(&mut self, obj: &ObjRef) -> Result<()> {
        let key = Rc::as_ptr(obj) as *const () as usize;
        if let Some(&index) = self.objects.get(&key) {
            self.write_u8(TOKEN_OLD_OBJECT)?;
            let table_len = self.objects.len();
            return self.write_index(index, table_len);
        }

        // Identity is assigned before the fields are walked so that any
        // reference back to this object lands in the old-object path.
        let index = self.objects.len() as u32;
        self.objects.insert(key, index);

        let guard = obj.borrow();
        let tag = guard.type_tag();
        if let Some(&type_index) = self.types.get(tag) {
            self.write_u8(TOKEN_NEW_OBJECT)?;
            let table_len = self.types.len();
            self.write_index(type_index, table_len)?;
        } else {
            let type_index = self.types.len() as u32;
            self.types.insert(tag, type_index);
            self.write_u8(TOKEN_NEW_TYPED_OBJECT)?;
            self.write_string(tag)?;
        }
        guard.write_fields(self)
    }

    /// Write a name reference against the session name table.
    pub fn write_name(&mut self, name: Option<Name>) -> Result<()> {
        let Some(name) = name else {
            return self.write_u8(TOKEN_NIL_NAME);
        };
        if let Some(&index) = self.names.get(&name.handle()) {
            self.write_u8(TOKEN_OLD_NAME)?;
            let table_len = self.names.len();
            self.write_index(index, table_len)
        } else {
            let index = self.names.len() as u32;
            self.names.insert(name.handle(), index);
            self.write_u8(TOKEN_NEW_NAME)?;
            self.write_string(name.as_str())
        }
    }

    /// Write a sprite-tag reference against the session sprite table.
    pub fn write_sprite(&mut self, sprite: Option<Sprite>) -> Result<()> {
        let Some(sprite) = sprite else {
            return self.write_u8(TOKEN_NIL_SPRITE);
        };
        if let Some(&index) = self.sprites.get(&sprite.handle()) {
            self.write_u8(TOKEN_OLD_SPRITE)?;
            let table_len = self.sprites.len();
            self.write_index(index, table_len)
        } else {
            let index = self.sprites.len() as u32;
            self.sprites.insert(sprite.handle(), index);
            self.write_u8(TOKEN_NEW_SPRITE)?;
            self.write_bytes(&sprite.chars())
        }
    }
}
