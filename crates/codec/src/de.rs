//! Read pass of the object-graph codec
//!
//! The mirror of the write pass: one pass per container session, three
//! identity tables filled in the same first-occurrence order the write
//! side assigned. A new object is registered in its table *before* its
//! fields are read, so the back-references inside a cycle resolve
//! against the still-unpopulated shell.

use crate::persist::{ObjRef, ObjSlot, TypeEntry, TypeRegistry};
use crate::wire::{
    index_width, TOKEN_NEW_NAME, TOKEN_NEW_OBJECT, TOKEN_NEW_SPRITE, TOKEN_NEW_TYPED_OBJECT,
    TOKEN_NIL_NAME, TOKEN_NIL_SPRITE, TOKEN_NULL, TOKEN_OLD_NAME, TOKEN_OLD_OBJECT,
    TOKEN_OLD_SPRITE, TOKEN_TOMBSTONE,
};
use savepoint_core::endian;
use savepoint_core::{Error, Name, Result, Sprite};
use savepoint_container::ByteStream;
use std::rc::Rc;

/// Read pass over one container session.
pub struct Deserializer<'a> {
    stream: &'a mut dyn ByteStream,
    registry: &'a TypeRegistry,
    /// Object identity: index → materialized object, in assignment order.
    objects: Vec<ObjRef>,
    /// Type identity: index → registered type entry.
    types: Vec<TypeEntry>,
    /// Name identity: index → interned name.
    names: Vec<Name>,
    /// Sprite identity: index → interned sprite tag.
    sprites: Vec<Sprite>,
}

impl<'a> Deserializer<'a> {
    /// New read pass over `stream`, resolving type tags through `registry`.
    pub fn new(stream: &'a mut dyn ByteStream, registry: &'a TypeRegistry) -> Self {
        Deserializer {
            stream,
            registry,
            objects: Vec::new(),
            types: Vec::new(),
            names: Vec::new(),
            sprites: Vec::new(),
        }
    }

    /// Objects materialized so far this pass.
    pub fn objects_read(&self) -> usize {
        self.objects.len()
    }

    /// Read a u8.
    pub fn read_u8(&mut self) -> Result<u8> {
        let mut bytes = [0u8; 1];
        self.stream.read(&mut bytes)?;
        Ok(bytes[0])
    }

    /// Read a u16 from on-disk order.
    pub fn read_u16(&mut self) -> Result<u16> {
        let mut bytes = [0u8; 2];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_u16(bytes))
    }

    /// Read a u32 from on-disk order.
    pub fn read_u32(&mut self) -> Result<u32> {
        let mut bytes = [0u8; 4];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_u32(bytes))
    }

    /// Read a u64 from on-disk order.
    pub fn read_u64(&mut self) -> Result<u64> {
        let mut bytes = [0u8; 8];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_u64(bytes))
    }

    /// Read an i8.
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read an i16 from on-disk order.
    pub fn read_i16(&mut self) -> Result<i16> {
        let mut bytes = [0u8; 2];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_i16(bytes))
    }

    /// Read an i32 from on-disk order.
    pub fn read_i32(&mut self) -> Result<i32> {
        let mut bytes = [0u8; 4];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_i32(bytes))
    }

    /// Read an i64 from on-disk order.
    pub fn read_i64(&mut self) -> Result<i64> {
        let mut bytes = [0u8; 8];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_i64(bytes))
    }

    /// Read an f32 bit pattern from on-disk order.
    pub fn read_f32(&mut self) -> Result<f32> {
        let mut bytes = [0u8; 4];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_f32(bytes))
    }

    /// Read an f64 bit pattern from on-disk order.
    pub fn read_f64(&mut self) -> Result<f64> {
        let mut bytes = [0u8; 8];
        self.stream.read(&mut bytes)?;
        Ok(endian::host_f64(bytes))
    }

    /// Fill a fixed-size blob. The width is the caller's contract.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read(buf)
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_u32()? as usize;
        let mut bytes = vec![0u8; len];
        self.stream.read(&mut bytes)?;
        String::from_utf8(bytes).map_err(|_| Error::corruption("string is not valid UTF-8"))
    }

    fn read_index(&mut self, table_len: usize) -> Result<u32> {
        match index_width(table_len) {
            1 => Ok(u32::from(self.read_u8()?)),
            2 => Ok(u32::from(self.read_u16()?)),
            _ => self.read_u32(),
        }
    }

    /// Read an object reference written by the matching write pass.
    pub fn read_object(&mut self) -> Result<ObjSlot> {
        let token = self.read_u8()?;
        match token {
            TOKEN_NULL => Ok(ObjSlot::Null),
            TOKEN_TOMBSTONE => Ok(ObjSlot::Tombstone),
            TOKEN_OLD_OBJECT => {
                let table_len = self.objects.len();
                let index = self.read_index(table_len)? as usize;
                let obj = self.objects.get(index).cloned().ok_or_else(|| {
                    Error::corruption(format!(
                        "back-reference {} exceeds object table size {}",
                        index, table_len
                    ))
                })?;
                Ok(ObjSlot::Object(obj))
            }
            TOKEN_NEW_OBJECT => {
                let table_len = self.types.len();
                let index = self.read_index(table_len)? as usize;
                let entry = self.types.get(index).copied().ok_or_else(|| {
                    Error::corruption(format!(
                        "type reference {} exceeds type table size {}",
                        index, table_len
                    ))
                })?;
                self.read_new_object(entry)
            }
            TOKEN_NEW_TYPED_OBJECT => {
                let tag = self.read_string()?;
                let entry = match self.registry.lookup(&tag) {
                    Some(entry) => entry,
                    None => return Err(Error::UnknownType(tag)),
                };
                self.types.push(entry);
                self.read_new_object(entry)
            }
            other => Err(Error::corruption(format!(
                "unrecognized reference token {:#04x}",
                other
            ))),
        }
    }

    fn read_new_object(&mut self, entry: TypeEntry) -> Result<ObjSlot> {
        let obj = (entry.construct)();
        // Registered before its fields are read; cycles resolve against
        // the still-empty shell.
        self.objects.push(Rc::clone(&obj));
        obj.borrow_mut().read_fields(self)?;
        Ok(ObjSlot::Object(obj))
    }

    /// Read a name reference written by the matching write pass.
    pub fn read_name(&mut self) -> Result<Option<Name>> {
        let token = self.read_u8()?;
        match token {
            TOKEN_NIL_NAME => Ok(None),
            TOKEN_OLD_NAME => {
                let table_len = self.names.len();
                let index = self.read_index(table_len)? as usize;
                self.names.get(index).copied().map(Some).ok_or_else(|| {
                    Error::corruption(format!(
                        "name reference {} exceeds name table size {}",
                        index, table_len
                    ))
                })
            }
            TOKEN_NEW_NAME => {
                let text = self.read_string()?;
                let name = Name::new(&text);
                self.names.push(name);
                Ok(Some(name))
            }
            other => Err(Error::corruption(format!(
                "unrecognized name token {:#04x}",
                other
            ))),
        }
    }

    /// Read a sprite-tag reference written by the matching write pass.
    pub fn read_sprite(&mut self) -> Result<Option<Sprite>> {
        let token = self.read_u8()?;
        match token {
            TOKEN_NIL_SPRITE => Ok(None),
            TOKEN_OLD_SPRITE => {
                let table_len = self.sprites.len();
                let index = self.read_index(table_len)? as usize;
                self.sprites.get(index).copied().map(Some).ok_or_else(|| {
                    Error::corruption(format!(
                        "sprite reference {} exceeds sprite table size {}",
                        index, table_len
                    ))
                })
            }
            TOKEN_NEW_SPRITE => {
                let mut chars = [0u8; 4];
                self.read_bytes(&mut chars)?;
                let sprite = Sprite::intern(chars);
                self.sprites.push(sprite);
                Ok(Some(sprite))
            }
            other => Err(Error::corruption(format!(
                "unrecognized sprite token {:#04x}",
                other
            ))),
        }
    }
}
