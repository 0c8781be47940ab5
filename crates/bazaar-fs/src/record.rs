//! Stored record types.
//!
//! One [`FileRecord`] exists per `(namespace, path)` pair. Directories are
//! never stored; they are derived from the paths of existing records.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Loosely typed metadata value attached to a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    /// JSON `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer above `i64::MAX`.
    UInt(u64),
    /// Floating point number. Must be finite to be stored.
    Float(f64),
    /// UTF-8 string.
    String(String),
    /// Ordered list of values.
    List(Vec<ExtraValue>),
    /// Nested string-keyed map.
    Map(BTreeMap<String, ExtraValue>),
}

impl ExtraValue {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ExtraValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, ExtraValue::Null)
    }

    /// Returns false if this value holds a NaN or infinite float at any
    /// depth. JSON has no encoding for those.
    pub fn is_finite(&self) -> bool {
        match self {
            ExtraValue::Float(n) => n.is_finite(),
            ExtraValue::List(items) => items.iter().all(ExtraValue::is_finite),
            ExtraValue::Map(map) => map.values().all(ExtraValue::is_finite),
            _ => true,
        }
    }
}

impl From<&str> for ExtraValue {
    fn from(s: &str) -> Self {
        ExtraValue::String(s.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(s: String) -> Self {
        ExtraValue::String(s)
    }
}

impl From<bool> for ExtraValue {
    fn from(b: bool) -> Self {
        ExtraValue::Bool(b)
    }
}

impl From<i64> for ExtraValue {
    fn from(n: i64) -> Self {
        ExtraValue::Int(n)
    }
}

impl From<u64> for ExtraValue {
    fn from(n: u64) -> Self {
        match i64::try_from(n) {
            Ok(n) => ExtraValue::Int(n),
            Err(_) => ExtraValue::UInt(n),
        }
    }
}

impl From<f64> for ExtraValue {
    fn from(n: f64) -> Self {
        ExtraValue::Float(n)
    }
}

impl<T: Into<ExtraValue>> From<Vec<T>> for ExtraValue {
    fn from(items: Vec<T>) -> Self {
        ExtraValue::List(items.into_iter().map(Into::into).collect())
    }
}

/// Metadata map attached to a file. Always replaced as a whole.
pub type Extras = BTreeMap<String, ExtraValue>;

/// Store key: a normalized path within a namespace.
///
/// Ordered by namespace first so one namespace occupies a contiguous range.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey {
    pub namespace: String,
    pub path: String,
}

impl RecordKey {
    /// Create a key. `path` must already be normalized.
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }
}

/// A stored file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRecord {
    /// Normalized absolute path.
    pub path: String,
    /// Namespace the record lives in.
    pub namespace: String,
    /// Opaque content, replaced wholesale on write.
    pub content: Vec<u8>,
    /// Attached metadata.
    pub extras: Extras,
}

impl FileRecord {
    /// The key this record is stored under.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.namespace.clone(), self.path.clone())
    }

    /// Summary without the content.
    pub fn stat(&self) -> FileStat {
        FileStat {
            path: self.path.clone(),
            namespace: self.namespace.clone(),
            size: self.content.len() as u64,
            extras_len: self.extras.len(),
        }
    }
}

/// File summary returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileStat {
    /// Normalized absolute path.
    pub path: String,
    /// Namespace the record lives in.
    pub namespace: String,
    /// Content size in bytes.
    pub size: u64,
    /// Number of keys in the extras map.
    pub extras_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_value_json_shape() {
        let mut extras = Extras::new();
        extras.insert("foo".into(), "bar".into());
        extras.insert("count".into(), 3i64.into());
        extras.insert("ratio".into(), 0.5f64.into());
        extras.insert("tags".into(), vec!["a", "b"].into());
        extras.insert("gone".into(), ExtraValue::Null);

        let json = serde_json::to_string(&extras).unwrap();
        assert_eq!(
            json,
            r#"{"count":3,"foo":"bar","gone":null,"ratio":0.5,"tags":["a","b"]}"#
        );

        let back: Extras = serde_json::from_str(&json).unwrap();
        assert_eq!(back, extras);
        assert_eq!(back["foo"].as_str(), Some("bar"));
        assert!(back["gone"].is_null());
    }

    #[test]
    fn test_nested_map_decodes_as_map() {
        let back: ExtraValue = serde_json::from_str(r#"{"inner":{"x":true}}"#).unwrap();
        let ExtraValue::Map(outer) = back else {
            panic!("expected map");
        };
        assert_eq!(
            outer["inner"],
            ExtraValue::Map(BTreeMap::from([("x".to_string(), ExtraValue::Bool(true))]))
        );
    }

    #[test]
    fn test_large_unsigned_keeps_precision() {
        let back: ExtraValue = serde_json::from_str("18446744073709551615").unwrap();
        assert_eq!(back, ExtraValue::UInt(u64::MAX));
        assert_eq!(serde_json::to_string(&back).unwrap(), "18446744073709551615");

        // anything that fits stays signed
        let back: ExtraValue = serde_json::from_str("42").unwrap();
        assert_eq!(back, ExtraValue::Int(42));
        assert_eq!(ExtraValue::from(42u64), ExtraValue::Int(42));
        assert_eq!(ExtraValue::from(u64::MAX), ExtraValue::UInt(u64::MAX));
    }

    #[test]
    fn test_is_finite_checks_nested_values() {
        assert!(ExtraValue::from(0.5f64).is_finite());
        assert!(!ExtraValue::Float(f64::NAN).is_finite());
        assert!(!ExtraValue::from(vec![1.0, f64::INFINITY]).is_finite());

        let nested = ExtraValue::Map(BTreeMap::from([(
            "inner".to_string(),
            ExtraValue::Float(f64::NEG_INFINITY),
        )]));
        assert!(!nested.is_finite());
        assert!(ExtraValue::from("inf").is_finite());
    }

    #[test]
    fn test_key_ordering_groups_namespaces() {
        let a = RecordKey::new("a", "/z");
        let b = RecordKey::new("b", "/a");
        assert!(a < b);
    }

    #[test]
    fn test_stat() {
        let record = FileRecord {
            path: "/dir1/file".into(),
            namespace: "test".into(),
            content: b"hello".to_vec(),
            extras: Extras::from([("foo".to_string(), ExtraValue::from("bar"))]),
        };
        let stat = record.stat();
        assert_eq!(stat.size, 5);
        assert_eq!(stat.extras_len, 1);
        assert_eq!(record.key(), RecordKey::new("test", "/dir1/file"));
    }
}
