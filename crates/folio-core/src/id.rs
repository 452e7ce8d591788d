//! Namespaced content identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::BookError;

/// A namespaced path such as `folio:guide/en_us/entries/basics`
///
/// Paths always use `/` as separator; backslashes are normalized away and
/// leading/trailing separators are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentId {
    namespace: String,
    path: String,
}

impl ContentId {
    /// Create an identifier from its two halves
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Result<Self, BookError> {
        let namespace = namespace.into();
        let path = normalize_path(&path.into());

        let namespace_ok = !namespace.is_empty()
            && !namespace.contains(|c: char| c == ':' || c == '/' || c.is_whitespace());
        let path_ok = !path.is_empty() && !path.contains(':');
        if !namespace_ok || !path_ok {
            return Err(BookError::InvalidId(format!("{}:{}", namespace, path)));
        }

        Ok(Self { namespace, path })
    }

    /// Identifier from literals known to be well formed
    pub(crate) fn known(namespace: &'static str, path: &'static str) -> Self {
        Self {
            namespace: namespace.to_string(),
            path: path.to_string(),
        }
    }

    /// Parse `namespace:path`, falling back to `default_namespace` when the
    /// namespace half is omitted
    pub fn parse_in(raw: &str, default_namespace: &str) -> Result<Self, BookError> {
        match raw.split_once(':') {
            Some((namespace, path)) => Self::new(namespace, path),
            None => Self::new(default_namespace, raw),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path segments, in order
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/')
    }

    /// Same namespace, different path
    pub fn with_path(&self, path: impl Into<String>) -> Result<Self, BookError> {
        Self::new(self.namespace.clone(), path)
    }

    /// The path relative to `prefix`, if this id lives below it
    pub fn relative_to(&self, prefix: &ContentId) -> Option<&str> {
        if self.namespace != prefix.namespace {
            return None;
        }
        self.path
            .strip_prefix(prefix.path.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|rest| !rest.is_empty())
    }
}

fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/").trim_matches('/').to_string()
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl FromStr for ContentId {
    type Err = BookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (namespace, path) = s
            .split_once(':')
            .ok_or_else(|| BookError::InvalidId(s.to_string()))?;
        Self::new(namespace, path)
    }
}

impl Serialize for ContentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Lookup key for a domain object documented by the book
///
/// Built from an object spec like `minecraft:stone#4{tag}`; the count and
/// tag suffixes are ignored so every stack of the same object maps to one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ObjectKey(String);

impl ObjectKey {
    pub fn from_spec(spec: &str) -> Option<Self> {
        let end = spec.find(|c| c == '#' || c == '{').unwrap_or(spec.len());
        let key = spec[..end].trim().to_ascii_lowercase();
        if key.is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
