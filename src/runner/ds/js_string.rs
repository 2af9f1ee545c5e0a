//! Immutable UTF-16 string storage used for every script-visible string.
//!
//! The code units live behind an `Rc<[u16]>` so cloning is a reference bump, and the hash is
//! computed once at construction. Scope resolution and property lookup hash the same key over and
//! over, so they read the cached value instead of rehashing the units.

use rustc_hash::FxHasher;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Clone)]
pub struct JsString {
    units: Rc<[u16]>,
    hash: u64,
}

fn hash_units(units: &[u16]) -> u64 {
    let mut hasher = FxHasher::default();
    units.hash(&mut hasher);
    hasher.finish()
}

impl JsString {
    pub fn from_units(units: Vec<u16>) -> Self {
        let hash = hash_units(&units);
        JsString {
            units: Rc::from(units),
            hash,
        }
    }

    pub fn empty() -> Self {
        JsString::from_units(Vec::new())
    }

    pub fn units(&self) -> &[u16] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Precomputed content hash, identical for equal strings.
    pub fn hash_value(&self) -> u64 {
        self.hash
    }

    pub fn char_code_at(&self, index: usize) -> Option<u16> {
        self.units.get(index).copied()
    }

    pub fn concat(&self, other: &JsString) -> JsString {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut units = Vec::with_capacity(self.len() + other.len());
        units.extend_from_slice(&self.units);
        units.extend_from_slice(&other.units);
        JsString::from_units(units)
    }

    /// Code units in `[start, end)`, clamped to the string bounds.
    pub fn substring(&self, start: usize, end: usize) -> JsString {
        let end = end.min(self.len());
        let start = start.min(end);
        JsString::from_units(self.units[start..end].to_vec())
    }

    pub fn index_of(&self, needle: &JsString, from: usize) -> Option<usize> {
        let n = needle.len();
        if n == 0 {
            return Some(from.min(self.len()));
        }
        if n > self.len() {
            return None;
        }
        (from..=self.len() - n).find(|&i| self.units[i..i + n] == *needle.units)
    }

    pub fn starts_with_str(&self, prefix: &str) -> bool {
        let mut i = 0;
        for unit in prefix.encode_utf16() {
            if self.units.get(i) != Some(&unit) {
                return false;
            }
            i += 1;
        }
        true
    }

    /// Returns the numeric value when this string is a canonical array index
    /// (`"0"`, `"17"`, but not `"01"` or `"4294967295"`).
    pub fn as_array_index(&self) -> Option<u32> {
        let units = self.units();
        if units.is_empty() || units.len() > 10 {
            return None;
        }
        if units.len() > 1 && units[0] == b'0' as u16 {
            return None;
        }
        let mut value: u64 = 0;
        for &u in units {
            if !(b'0' as u16..=b'9' as u16).contains(&u) {
                return None;
            }
            value = value * 10 + (u - b'0' as u16) as u64;
        }
        if value < u32::MAX as u64 {
            Some(value as u32)
        } else {
            None
        }
    }

    pub fn to_case(&self, upper: bool) -> JsString {
        let s = self.to_string();
        let mapped = if upper {
            s.to_uppercase()
        } else {
            s.to_lowercase()
        };
        JsString::from(mapped.as_str())
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString::from_units(s.encode_utf16().collect())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString::from(s.as_str())
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && (Rc::ptr_eq(&self.units, &other.units) || self.units == other.units)
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for JsString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.units.cmp(&other.units)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf16_lossy(&self.units))
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf16_lossy(&self.units))
    }
}
