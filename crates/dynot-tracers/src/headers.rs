use std::collections::BTreeMap;

/// HTTP request headers as seen by a tracer driver
///
/// Header names are case-insensitive and stored lowercased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    headers: BTreeMap<String, String>,
}

impl RequestHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set a header, replacing any previous value
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RequestHeaders {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name.as_ref(), value);
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let mut headers = RequestHeaders::new();
        headers.set("X-OT-Span-Context", "abc");
        assert_eq!(headers.get("x-ot-span-context"), Some("abc"));
        assert_eq!(headers.remove("X-Ot-Span-Context").as_deref(), Some("abc"));
        assert!(headers.is_empty());
    }
}
