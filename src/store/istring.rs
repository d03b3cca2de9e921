//! Case-insensitive field names.
//!
//! Entity keys compare without regard to ASCII case ("ClassName" and
//! "classname" name the same field) but are displayed and re-encoded in the
//! case they were written with. `IString` keeps both forms: a lowercase
//! canonical key used for `Eq`/`Hash`/`Ord`, and the original display string.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Field name compared and hashed on its lowercase form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IString {
    canonical: String,
    display: String,
}

impl IString {
    pub fn new(s: impl Into<String>) -> Self {
        let display = s.into();
        Self {
            canonical: display.to_ascii_lowercase(),
            display,
        }
    }

    /// Original-case form, used for display and encoding.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Lowercase comparison key.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Case-insensitive comparison against a plain string.
    pub fn matches(&self, other: &str) -> bool {
        self.canonical.len() == other.len() && self.canonical.eq_ignore_ascii_case(other)
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }
}

impl PartialEq for IString {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for IString {}

impl PartialEq<str> for IString {
    fn eq(&self, other: &str) -> bool {
        self.matches(other)
    }
}

impl PartialEq<&str> for IString {
    fn eq(&self, other: &&str) -> bool {
        self.matches(other)
    }
}

impl Hash for IString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for IString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for IString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for IString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<IString> for String {
    fn from(s: IString) -> Self {
        s.display
    }
}

impl AsRef<str> for IString {
    fn as_ref(&self) -> &str {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_case_insensitive_eq() {
        let a = IString::new("ClassName");
        let b = IString::new("classname");
        assert_eq!(a, b);
        assert!(a == "CLASSNAME");
        assert!(a != "classnam");
        assert_eq!(a.as_str(), "ClassName");
        assert_eq!(a.canonical(), "classname");
    }

    #[test]
    fn test_hash_uses_canonical() {
        let mut map = HashMap::new();
        map.insert(IString::new("Origin"), 1);
        assert_eq!(map.get(&IString::new("ORIGIN")), Some(&1));
        assert_eq!(map.get(&IString::from("origin")), Some(&1));
        assert!(IString::new("Origin") == "origin");
    }

    #[test]
    fn test_ordering_ignores_case() {
        let mut map = BTreeMap::new();
        map.insert(IString::new("b"), 1);
        map.insert(IString::new("A"), 2);
        map.insert(IString::new("c"), 3);
        let keys: Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["A", "b", "c"]);
    }

    #[test]
    fn test_serde_uses_display_form() {
        let key = IString::new("TargetName");
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"TargetName\"");
        let back: IString = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "TargetName");
        assert_eq!(back, IString::new("targetname"));
    }

    #[test]
    fn test_empty() {
        let key = IString::new("");
        assert!(key.is_empty());
        assert_eq!(key.len(), 0);
    }
}
