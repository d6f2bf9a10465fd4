use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SAMPLE_KEY: &str = "key";
pub const SAMPLE_VALUE: &str = "value";

/// String-to-string mapping that gets pickled into a fixture.
///
/// Entries iterate in key order, so the pickled bytes only depend on the
/// content of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureMap {
    entries: BTreeMap<String, String>,
}

impl FixtureMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `{"key": "value"}` mapping used when nothing else is configured.
    pub fn sample() -> Self {
        let mut map = Self::new();
        map.insert(SAMPLE_KEY.to_string(), SAMPLE_VALUE.to_string());
        map
    }

    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl FromIterator<(String, String)> for FixtureMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Extend<(String, String)> for FixtureMap {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

impl From<BTreeMap<String, String>> for FixtureMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

/// Output of the transform stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFixture {
    pub pickled: Vec<u8>,
    pub base64: String,
    pub entry_count: usize,
    pub protocol: u8,
}
