//! Header fields storage
use crate::{
    ambiguity::AmbiguityTracker,
    prelude::{Epoch, SV},
    version::Version,
};

use std::collections::{BTreeMap, HashMap};

mod fields;
mod registry;

pub use registry::{
    lookup, Continuations, Continued, Convert, FieldSpec, HandlerKind, HeaderLine, HeaderSpec,
    OccurrencePolicy, Registry, END_OF_HEADER,
};

#[cfg(feature = "serde")]
use serde::Serialize;

/// Typed header value
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Value {
    Text(String),
    Char(char),
    Flag(bool),
    Integer(i64),
    Float(f64),
    /// 3D coordinates, or (H, E, N) eccentricities
    Triple((f64, f64, f64)),
    Epoch(Epoch),
    Version(Version),
    /// Observation codes, in order of appearance
    Codes(Vec<String>),
    /// Snapshot of the wavelength factors
    Ambiguity(AmbiguityTracker),
    /// Declared number of observations, per satellite and observation type
    ObsCounts(BTreeMap<SV, Vec<u32>>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }
    pub fn as_epoch(&self) -> Option<Epoch> {
        match self {
            Self::Epoch(e) => Some(*e),
            _ => None,
        }
    }
    pub fn as_version(&self) -> Option<Version> {
        match self {
            Self::Version(v) => Some(*v),
            _ => None,
        }
    }
    pub fn as_codes(&self) -> Option<&[String]> {
        match self {
            Self::Codes(codes) => Some(codes),
            _ => None,
        }
    }
    pub fn as_obs_counts(&self) -> Option<&BTreeMap<SV, Vec<u32>>> {
        match self {
            Self::ObsCounts(counts) => Some(counts),
            _ => None,
        }
    }
}

/// [Value] and its provenance
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HeaderValue {
    pub value: Value,
    /// Record index from which this value is effective
    pub record: usize,
    /// Source line number
    pub line: usize,
    /// Epoch of the event that introduced this value (flag 5)
    pub epoch: Option<Epoch>,
}

/// The three shapes a header field may take
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Entry {
    /// Current value
    Single(HeaderValue),
    /// Every occurrence, in order
    Multi(Vec<HeaderValue>),
    /// Value valid from the given record index onwards
    RecordIndexed(BTreeMap<usize, HeaderValue>),
}

/// Per decoding header fields storage, indexed by field name
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HeaderStore {
    entries: HashMap<String, Entry>,
    /// Number of header blocks processed so far
    pub blocks: usize,
}

impl HeaderStore {
    /// Returns true if this field was defined at some point
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns raw [Entry]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Returns most recent value of this field
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        match self.entries.get(name)? {
            Entry::Single(value) => Some(value),
            Entry::Multi(values) => values.last(),
            Entry::RecordIndexed(values) => values.values().next_back(),
        }
    }

    /// Returns the value of this field, that applies to record `index`:
    /// the most recent value set at or before that index.
    pub fn at(&self, name: &str, index: usize) -> Option<&HeaderValue> {
        match self.entries.get(name)? {
            Entry::RecordIndexed(values) => values.range(..=index).next_back().map(|(_, v)| v),
            Entry::Single(value) => {
                if value.record <= index {
                    Some(value)
                } else {
                    None
                }
            },
            Entry::Multi(values) => values.iter().rev().find(|v| v.record <= index),
        }
    }

    /// Returns every occurrence of this field
    pub fn all(&self, name: &str) -> Vec<&HeaderValue> {
        match self.entries.get(name) {
            Some(Entry::Single(value)) => vec![value],
            Some(Entry::Multi(values)) => values.iter().collect(),
            Some(Entry::RecordIndexed(values)) => values.values().collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn set_single(&mut self, name: &str, value: HeaderValue) {
        self.entries.insert(name.to_string(), Entry::Single(value));
    }

    pub(crate) fn push(&mut self, name: &str, value: HeaderValue) {
        match self.entries.get_mut(name) {
            Some(Entry::Multi(values)) => values.push(value),
            _ => {
                self.entries
                    .insert(name.to_string(), Entry::Multi(vec![value]));
            },
        }
    }

    pub(crate) fn set_indexed(&mut self, name: &str, value: HeaderValue) {
        match self.entries.get_mut(name) {
            Some(Entry::RecordIndexed(values)) => {
                values.insert(value.record, value);
            },
            _ => {
                let mut values = BTreeMap::new();
                values.insert(value.record, value);
                self.entries
                    .insert(name.to_string(), Entry::RecordIndexed(values));
            },
        }
    }

    /// Comments, in order of appearance
    pub fn comments(&self) -> Vec<&str> {
        self.all("comment")
            .iter()
            .filter_map(|v| v.value.as_text())
            .collect()
    }

    /// Observation codes that apply to record `index`
    pub fn obs_codes(&self, index: usize) -> Vec<String> {
        self.at("obscodes", index)
            .and_then(|v| v.value.as_codes())
            .map(|codes| codes.to_vec())
            .unwrap_or_default()
    }

    /// Returns true for Compact RINEX
    pub fn is_crinex(&self) -> bool {
        self.contains("is_crx")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    fn text(s: &str, record: usize) -> HeaderValue {
        HeaderValue {
            value: Value::Text(s.to_string()),
            record,
            line: record + 1,
            epoch: None,
        }
    }
    #[test]
    fn record_indexed_lookup() {
        let mut store = HeaderStore::default();
        store.set_indexed("marker", text("A", 0));
        store.set_indexed("marker", text("B", 10));
        store.set_indexed("marker", text("C", 10));
        assert_eq!(store.at("marker", 0).unwrap().value.as_text(), Some("A"));
        assert_eq!(store.at("marker", 9).unwrap().value.as_text(), Some("A"));
        assert_eq!(store.at("marker", 10).unwrap().value.as_text(), Some("C"));
        assert_eq!(store.at("marker", 100).unwrap().value.as_text(), Some("C"));
        assert_eq!(store.get("marker").unwrap().value.as_text(), Some("C"));
        assert_eq!(store.all("marker").len(), 2);
    }
    #[test]
    fn multi_values() {
        let mut store = HeaderStore::default();
        store.push("comment", text("first", 0));
        store.push("comment", text("second", 0));
        assert_eq!(store.comments(), vec!["first", "second"]);
        assert!(store.at("comment", 0).is_some());
    }
    #[test]
    fn single_values() {
        let mut store = HeaderStore::default();
        store.set_single("observer", text("me", 0));
        store.set_single("observer", text("you", 0));
        assert_eq!(store.get("observer").unwrap().value.as_text(), Some("you"));
        assert!(!store.is_crinex());
    }
}
