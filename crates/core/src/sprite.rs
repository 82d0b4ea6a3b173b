//! Process-wide interned sprite tags
//!
//! A sprite tag is a 4-character code naming a sprite sheet family
//! (`TROO`, `PLAY`, ...). Like names, tags are value-interned process-wide
//! so the codec can key its per-session sprite table by a stable numeric
//! handle.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;

static POOL: Lazy<Mutex<SpritePool>> = Lazy::new(|| Mutex::new(SpritePool::default()));

#[derive(Default)]
struct SpritePool {
    by_chars: FxHashMap<[u8; 4], u32>,
    entries: Vec<[u8; 4]>,
}

/// Handle to a process-wide interned 4-character sprite tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sprite(u32);

impl Sprite {
    /// Intern a 4-character tag, returning the existing handle if pooled.
    pub fn intern(chars: [u8; 4]) -> Self {
        let mut pool = POOL.lock();
        if let Some(&index) = pool.by_chars.get(&chars) {
            return Sprite(index);
        }
        let index = pool.entries.len() as u32;
        pool.entries.push(chars);
        pool.by_chars.insert(chars, index);
        Sprite(index)
    }

    /// The tag's 4 characters.
    pub fn chars(self) -> [u8; 4] {
        POOL.lock().entries[self.0 as usize]
    }

    /// The stable numeric handle.
    pub fn handle(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Sprite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            write!(f, "{}", char::from(c))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tag_same_handle() {
        let a = Sprite::intern(*b"TROO");
        let b = Sprite::intern(*b"TROO");
        assert_eq!(a, b);
        assert_eq!(a.handle(), b.handle());
    }

    #[test]
    fn test_distinct_tags() {
        let a = Sprite::intern(*b"POSS");
        let b = Sprite::intern(*b"SPOS");
        assert_ne!(a, b);
    }

    #[test]
    fn test_chars_roundtrip() {
        let sprite = Sprite::intern(*b"CYBR");
        assert_eq!(sprite.chars(), *b"CYBR");
        assert_eq!(sprite.to_string(), "CYBR");
    }
}
