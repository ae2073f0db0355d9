//! Parsed command responses.

/// An ordered key/value mapping parsed from a control-port reply body.
///
/// Keys are unique; inserting an existing key replaces its value in place,
/// so iteration order stays deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponsePairs {
    pairs: Vec<(String, String)>,
}

impl ResponsePairs {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair, replacing the value of an existing key in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse reply lines into pairs.
    ///
    /// A line is split at the first `=`, or failing that at the first
    /// space. Bare status lines (no separator, e.g. `OK`) carry no data and
    /// are skipped.
    pub fn parse(lines: &[String]) -> Self {
        let mut pairs = Self::new();
        for line in lines {
            if let Some((key, value)) = line.split_once('=').or_else(|| line.split_once(' ')) {
                pairs.insert(key, value);
            }
        }
        pairs
    }
}

/// A reply that can report whether the command succeeded.
pub trait CommandReply {
    /// Whether the daemon accepted the command.
    fn is_success(&self) -> bool;
}

/// Minimal command result: a bare success flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandResponse {
    success: bool,
}

impl CommandResponse {
    /// Create a response with the given success flag.
    pub fn new(success: bool) -> Self {
        Self { success }
    }
}

impl CommandReply for CommandResponse {
    fn is_success(&self) -> bool {
        self.success
    }
}
