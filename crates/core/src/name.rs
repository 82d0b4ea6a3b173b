//! Process-wide interned symbolic names
//!
//! Names are short symbolic strings (actor classes, state labels, map
//! markers) that recur constantly across a game session. Interning gives
//! each distinct string one stable numeric handle for its whole process
//! lifetime, so equality is an integer compare and the codec can key its
//! per-session name table by handle instead of by string content.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::fmt;

static POOL: Lazy<Mutex<NamePool>> = Lazy::new(|| Mutex::new(NamePool::default()));

#[derive(Default)]
struct NamePool {
    by_text: FxHashMap<&'static str, u32>,
    entries: Vec<&'static str>,
}

/// Handle to a process-wide interned string.
///
/// Two `Name`s compare equal iff their texts are equal. The handle is
/// stable for the process lifetime but not across processes; archives
/// never store raw handles, only the interned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Name(u32);

impl Name {
    /// Intern `text`, returning the existing handle if already pooled.
    pub fn new(text: &str) -> Self {
        let mut pool = POOL.lock();
        if let Some(&index) = pool.by_text.get(text) {
            return Name(index);
        }
        // Pool entries live for the process lifetime.
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let index = pool.entries.len() as u32;
        pool.entries.push(leaked);
        pool.by_text.insert(leaked, index);
        Name(index)
    }

    /// The interned text.
    pub fn as_str(self) -> &'static str {
        POOL.lock().entries[self.0 as usize]
    }

    /// The stable numeric handle.
    pub fn handle(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
