//! A save blob riding inside a foreign image file as a checksummed chunk.
//!
//! The embedding caller owns the foreign format: it writes its own
//! signature and thumbnail, parses its own indexing on the way back in,
//! and verifies each chunk's checksum with [`chunk_checksum`] before
//! handing the payload to [`ChunkReader`].

use proptest::prelude::*;
use savepoint::{
    chunk_checksum, ByteStream, ChunkReader, ChunkWriter, Deserializer, MemoryStream, ObjRef,
    ObjSlot, Persist, Result, SeekOrigin, Serializer, TypeRegistry,
};
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

const FOREIGN_SIGNATURE: &[u8; 8] = b"\x89IMG\r\n\x1a\n";
const THUMBNAIL: &[u8] = &[0x40; 96];

#[derive(Default)]
struct Checkpoint {
    level: u32,
    skill: u8,
}

impl Persist for Checkpoint {
    fn type_tag(&self) -> &'static str {
        "checkpoint"
    }
    fn write_fields(&self, ser: &mut Serializer<'_>) -> Result<()> {
        ser.write_u32(self.level)?;
        ser.write_u8(self.skill)
    }
    fn read_fields(&mut self, de: &mut Deserializer<'_>) -> Result<()> {
        self.level = de.read_u32()?;
        self.skill = de.read_u8()?;
        Ok(())
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Build the foreign file: signature, raw thumbnail, then the save chunk
/// and a sibling comment chunk.
fn build_foreign_file() -> Vec<u8> {
    let mut medium = MemoryStream::new();
    medium.write(FOREIGN_SIGNATURE).unwrap();
    medium.write(THUMBNAIL).unwrap();

    let checkpoint = Rc::new(RefCell::new(Checkpoint { level: 12, skill: 3 }));
    let mut chunk = ChunkWriter::new(&mut medium, *b"SAVE");
    Serializer::new(&mut chunk)
        .write_object(&ObjSlot::object(&checkpoint))
        .unwrap();
    chunk.finish().unwrap();

    let mut note = ChunkWriter::without_compression(&mut medium, *b"NOTE");
    note.write(b"nightmare run").unwrap();
    note.finish().unwrap();

    medium.into_bytes()
}

/// Embedding-caller chunk parse: read length and tag at the current
/// position, verify the checksum, and rewind to the first payload byte.
fn parse_and_verify_chunk(rs: &mut MemoryStream) -> (u32, [u8; 4]) {
    let mut field = [0u8; 4];
    rs.read(&mut field).unwrap();
    let payload_len = u32::from_be_bytes(field);
    let mut tag = [0u8; 4];
    rs.read(&mut tag).unwrap();

    let mut payload = vec![0u8; payload_len as usize];
    rs.read(&mut payload).unwrap();
    rs.read(&mut field).unwrap();
    let stored_crc = u32::from_be_bytes(field);
    assert_eq!(
        stored_crc,
        chunk_checksum(&tag, &payload),
        "chunk {:?} failed checksum",
        tag
    );

    rs.seek(-(payload_len as i64) - 4, SeekOrigin::Current).unwrap();
    (payload_len, tag)
}

#[test]
fn test_embedded_save_roundtrip() {
    let file = build_foreign_file();
    assert_eq!(&file[..8], FOREIGN_SIGNATURE);

    let mut rs = MemoryStream::from_vec(file);
    rs.seek(8 + THUMBNAIL.len() as i64, SeekOrigin::Start).unwrap();

    let (payload_len, tag) = parse_and_verify_chunk(&mut rs);
    assert_eq!(tag, *b"SAVE");

    let mut registry = TypeRegistry::new();
    registry.register("checkpoint", || -> ObjRef {
        Rc::new(RefCell::new(Checkpoint::default()))
    });

    let mut reader = ChunkReader::open(&mut rs, payload_len).unwrap();
    let loaded = Deserializer::new(&mut reader, &registry)
        .read_object()
        .unwrap();
    let loaded = loaded.as_object().unwrap();
    let guard = loaded.borrow();
    let checkpoint = guard.as_any().downcast_ref::<Checkpoint>().unwrap();
    assert_eq!(checkpoint.level, 12);
    assert_eq!(checkpoint.skill, 3);
    drop(guard);

    // ChunkReader::open consumed payload + checksum: the medium now sits
    // at the sibling chunk.
    let (note_len, note_tag) = parse_and_verify_chunk(&mut rs);
    assert_eq!(note_tag, *b"NOTE");
    let mut note = ChunkReader::open(&mut rs, note_len).unwrap();
    let mut text = vec![0u8; note.payload_len()];
    note.read(&mut text).unwrap();
    assert_eq!(text, b"nightmare run");
}

#[test]
fn test_chunk_does_not_consume_the_medium() {
    let mut medium = MemoryStream::new();
    medium.write(b"prefix").unwrap();

    let mut chunk = ChunkWriter::new(&mut medium, *b"SAVE");
    chunk.write(b"payload").unwrap();
    chunk.finish().unwrap();

    // The caller's handle is still usable after the chunk closes.
    medium.write(b"suffix").unwrap();
    let bytes = medium.into_bytes();
    assert!(bytes.starts_with(b"prefix"));
    assert!(bytes.ends_with(b"suffix"));
}

fn save_chunk_region(file: &[u8]) -> std::ops::Range<usize> {
    // [signature][thumbnail][len][tag][payload...][crc]
    let start = 8 + THUMBNAIL.len();
    let payload_len =
        u32::from_be_bytes(file[start..start + 4].try_into().unwrap()) as usize;
    let payload_start = start + 8;
    payload_start..payload_start + payload_len
}

proptest! {
    /// Flipping any single payload bit must fail the embedding caller's
    /// checksum verification.
    #[test]
    fn prop_any_payload_bit_flip_fails_checksum(
        byte_offset in 0usize..64,
        bit in 0u8..8
    ) {
        let mut file = build_foreign_file();
        let region = save_chunk_region(&file);
        prop_assume!(byte_offset < region.len());
        file[region.start + byte_offset] ^= 1 << bit;

        let mut rs = MemoryStream::from_vec(file);
        rs.seek(8 + THUMBNAIL.len() as i64, SeekOrigin::Start).unwrap();

        let mut field = [0u8; 4];
        rs.read(&mut field).unwrap();
        let payload_len = u32::from_be_bytes(field);
        let mut tag = [0u8; 4];
        rs.read(&mut tag).unwrap();
        let mut payload = vec![0u8; payload_len as usize];
        rs.read(&mut payload).unwrap();
        rs.read(&mut field).unwrap();
        let stored_crc = u32::from_be_bytes(field);

        prop_assert_ne!(stored_crc, chunk_checksum(&tag, &payload));
    }
}
