//! Interned strings used for node labels.
//!
//! Labels are attached once at construction time and compared or copied
//! through the debug surface on every tick, so they are interned into a
//! process-wide heap and passed around as a single pointer.

use ::once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::ops::Deref;
use std::sync::{Mutex, MutexGuard, PoisonError};

static SYMBOL_HEAP: Lazy<Mutex<BTreeSet<&'static str>>> =
    Lazy::new(|| Mutex::new(BTreeSet::new()));

fn heap() -> MutexGuard<'static, BTreeSet<&'static str>> {
    // The heap only ever grows.
    SYMBOL_HEAP.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An interned string with O(1) equality.
#[derive(Clone, Copy, Eq, Hash)]
pub struct Symbol {
    s: &'static str,
}

impl Symbol {
    /// Retrieves the address of the backing string.
    pub fn addr(self) -> usize {
        self.s.as_ptr() as usize
    }

    /// Retrieves the string from the Symbol.
    pub fn as_str(self) -> &'static str {
        self.s
    }

    /// Number of distinct strings interned so far.
    pub fn count() -> usize {
        heap().len()
    }
}

impl Debug for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        Debug::fmt(self.s, fmt)
    }
}

impl Deref for Symbol {
    type Target = str;
    fn deref(&self) -> &str {
        self.s
    }
}

impl Display for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.write_str(self.s)
    }
}

impl<S: AsRef<str>> From<S> for Symbol {
    fn from(s: S) -> Symbol {
        let s = s.as_ref();
        let mut heap = heap();
        let s = match heap.get(s) {
            Some(interned) => *interned,
            None => {
                let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
                heap.insert(leaked);
                leaked
            }
        };
        Symbol { s }
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.s == other
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        self.s == *other
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(self.s)
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Symbol, D::Error> {
        String::deserialize(de).map(Symbol::from)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_interning() {
        let a = Symbol::from("patrol");
        let b = Symbol::from(String::from("patrol"));
        assert_eq!(a, b);
        assert_eq!(a.addr(), b.addr());
        assert_eq!(a, "patrol");
        assert_ne!(a, Symbol::from("flee"));

        let unique = Symbol::from("symbol-count-unique");
        assert!(Symbol::count() >= 3);
        assert_eq!(unique.as_str(), "symbol-count-unique");
    }
}
