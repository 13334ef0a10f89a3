//! Opaque JSON text.

/// JSON text held verbatim. Whatever substring was read is what gets written
/// back; the text is never reparsed or reformatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RawJson(String);

impl RawJson {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// An empty holder carries no JSON at all (not even `null`).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for RawJson {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for RawJson {
    fn from(text: String) -> Self {
        Self(text)
    }
}
