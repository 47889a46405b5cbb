//! Record ids.
//!
//! Every document record is keyed by a `"type:name"` string such as
//! `shape:photo`. Ids are interned once per process, so copying, hashing and
//! comparing them never touches the string.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static RECORD_IDS: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Counter behind `RecordId::unique`.
static NEXT_UNIQUE: AtomicU64 = AtomicU64::new(0);

/// Key of a document record. Serializes as its `"type:name"` string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordId(Spur);

impl RecordId {
    /// The id for `key`. The same key always yields the same id.
    pub fn intern(key: &str) -> Self {
        RecordId(RECORD_IDS.get_or_intern(key))
    }

    pub fn as_str(&self) -> &str {
        RECORD_IDS.resolve(&self.0)
    }

    /// The part before the first `:` (`shape` for `shape:photo`), or the
    /// whole key when there is none.
    pub fn record_type(&self) -> &str {
        let key = self.as_str();
        key.split_once(':').map_or(key, |(ty, _)| ty)
    }

    /// A fresh `record_type:n` id that no snapshot or caller has used yet.
    pub fn unique(record_type: &str) -> Self {
        loop {
            let n = NEXT_UNIQUE.fetch_add(1, Ordering::Relaxed);
            let key = format!("{record_type}:{n}");
            // Loaded snapshots may already own low numbers.
            if RECORD_IDS.get(&key).is_none() {
                return Self::intern(&key);
            }
        }
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(RecordId::intern(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_id() {
        let a = RecordId::intern("shape:hero");
        let b = RecordId::intern("shape:hero");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "shape:hero");
        assert_eq!(a.to_string(), "shape:hero");
        assert_eq!(format!("{a:?}"), "#shape:hero");
    }

    #[test]
    fn record_type_is_the_key_prefix() {
        assert_eq!(RecordId::intern("frame:board").record_type(), "frame");
        assert_eq!(RecordId::intern("loose").record_type(), "loose");
    }

    #[test]
    fn unique_skips_keys_already_taken() {
        let next = NEXT_UNIQUE.load(Ordering::Relaxed);
        let taken = RecordId::intern(&format!("asset:{next}"));
        let fresh = RecordId::unique("asset");
        assert_ne!(fresh, taken);
        assert_eq!(fresh.record_type(), "asset");
    }
}
