use crate::{Error, Result};
use std::collections::BTreeMap;

/// String key/value carrier for span contexts crossing the plugin boundary
///
/// Encoded as `key\tvalue\n` lines. Keys and values may not contain tabs or
/// newlines; such entries are refused by [`TextMap::insert`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextMap {
    entries: BTreeMap<String, String>,
}

impl TextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry; returns false if it cannot be encoded
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        let value = value.into();
        if key.is_empty() || !is_encodable(&key) || !is_encodable(&value) {
            return false;
        }
        self.entries.insert(key, value);
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            out.push_str(key);
            out.push('\t');
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    pub fn decode(encoded: &str) -> Result<Self> {
        let mut map = Self::new();
        for line in encoded.lines().filter(|line| !line.is_empty()) {
            let Some((key, value)) = line.split_once('\t') else {
                return Err(Error::MalformedTextMap(line.to_string()));
            };
            if key.is_empty() {
                return Err(Error::MalformedTextMap(line.to_string()));
            }
            map.entries.insert(key.to_string(), value.to_string());
        }
        Ok(map)
    }
}

fn is_encodable(s: &str) -> bool {
    !s.contains(['\t', '\n', '\r'])
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TextMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_sorted_lines() {
        let map: TextMap = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(map.encode(), "a\t1\nb\t2\n");
    }

    #[test]
    fn test_decode_accepts_missing_trailing_newline() -> Result<()> {
        let map = TextMap::decode("ot-mock-traceid\t00ff\not-mock-spanid\t01")?;
        assert_eq!(map.get("ot-mock-traceid"), Some("00ff"));
        assert_eq!(map.get("ot-mock-spanid"), Some("01"));
        Ok(())
    }

    #[test]
    fn test_decode_rejects_line_without_tab() {
        assert!(matches!(
            TextMap::decode("no-separator"),
            Err(Error::MalformedTextMap(_))
        ));
    }

    #[test]
    fn test_insert_refuses_unencodable_entries() {
        let mut map = TextMap::new();
        assert!(!map.insert("bad\tkey", "v"));
        assert!(!map.insert("key", "multi\nline"));
        assert!(!map.insert("", "v"));
        assert!(map.insert("key", "value"));
        assert_eq!(map.len(), 1);
    }
}
