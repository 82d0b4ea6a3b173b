//! Token protocol constants
//!
//! Every reference-typed value in an archive is preceded by a one-byte
//! token. Scalars are never tokenized; they are raw bytes in the fixed
//! on-disk order.

/// Explicit null reference.
pub const TOKEN_NULL: u8 = 0x00;

/// Reserved tombstone sentinel: non-null, non-object, preserved verbatim.
pub const TOKEN_TOMBSTONE: u8 = 0x01;

/// Back-reference to an earlier object; an object-table index follows.
pub const TOKEN_OLD_OBJECT: u8 = 0x02;

/// First occurrence of an object whose type was already seen this session;
/// a type-table index follows, then the object's fields.
pub const TOKEN_NEW_OBJECT: u8 = 0x03;

/// First occurrence of an object of a first-seen type; the type tag string
/// follows, then the object's fields.
pub const TOKEN_NEW_TYPED_OBJECT: u8 = 0x04;

/// Absent name.
pub const TOKEN_NIL_NAME: u8 = 0x05;

/// Back-reference to an earlier name; a name-table index follows.
pub const TOKEN_OLD_NAME: u8 = 0x06;

/// First occurrence of a name; its text follows.
pub const TOKEN_NEW_NAME: u8 = 0x07;

/// Absent sprite tag.
pub const TOKEN_NIL_SPRITE: u8 = 0x08;

/// Back-reference to an earlier sprite tag; a sprite-table index follows.
pub const TOKEN_OLD_SPRITE: u8 = 0x09;

/// First occurrence of a sprite tag; its 4 characters follow.
pub const TOKEN_NEW_SPRITE: u8 = 0x0A;

/// Width in bytes of a table index: the minimal fixed width sufficient for
/// the current table size. Both passes derive the width from their own
/// table, which the ordered protocol keeps in lockstep.
pub fn index_width(table_len: usize) -> usize {
    if table_len <= 0x100 {
        1
    } else if table_len <= 0x1_0000 {
        2
    } else {
        4
    }
}
