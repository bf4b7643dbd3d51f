//! Display context shared between trackers and their redraw collaborators.
//!
//! A [`Context`] is an insertion-ordered mapping from names to [`Value`]s. Trackers
//! copy their public state into it after every recompute, next to any passthrough
//! entries the caller supplied at construction (labels, suffix templates, ...). A
//! renderer only ever needs the context to produce its output.

use std::{fmt, time::Duration};

use compact_str::{CompactString, ToCompactString};

/// A single context entry.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    /// A boolean flag.
    Bool(bool),
    /// An unsigned count (indices, totals, whole seconds).
    UInt(u64),
    /// A signed count (e.g. a backward delta).
    Int(i64),
    /// A fractional number (rates, percentages).
    Float(f64),
    /// Free-form text.
    Text(CompactString),
    /// A span of time.
    Duration(Duration),
}

impl Value {
    /// Returns the value as a float when it is numeric.
    ///
    /// Durations convert to fractional seconds.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::UInt(v) => Some(v as f64),
            Self::Int(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Duration(d) => Some(d.as_secs_f64()),
            Self::Bool(_) | Self::Text(_) => None,
        }
    }

    /// Returns the value as text when it is a [`Value::Text`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Durations render as `H:MM:SS`, the way a remaining-time column usually reads.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Duration(d) => {
                let secs = d.as_secs();
                write!(f, "{}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::UInt(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.into())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v.into())
    }
}

impl From<CompactString> for Value {
    fn from(v: CompactString) -> Self {
        Self::Text(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

/// An insertion-ordered mapping of display entries.
///
/// Re-inserting an existing key replaces its value in place, so the order reflects
/// when a key was first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Context {
    entries: Vec<(CompactString, Value)>,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Looks up an entry by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find_map(|(k, v)| (k.as_str() == key).then_some(v))
    }

    /// Returns `true` if an entry named `key` exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts or replaces an entry, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Option<Value> {
        let key = key.as_ref();
        let value = value.into();
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            return Some(std::mem::replace(slot, value));
        }
        self.entries.push((key.to_compact_string(), value));
        None
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the context holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<Value>> Extend<(K, V)> for Context {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: AsRef<str>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut ctx = Self::new();
        ctx.extend(iter);
        ctx
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Context {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap as _;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Context {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ContextVisitor;

        impl<'de> serde::de::Visitor<'de> for ContextVisitor {
            type Value = Context;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of display entries")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Context, A::Error> {
                let mut ctx = Context::new();
                while let Some((k, v)) = access.next_entry::<CompactString, Value>()? {
                    ctx.insert(k, v);
                }
                Ok(ctx)
            }
        }

        deserializer.deserialize_map(ContextVisitor)
    }
}
