//! Per-name presence records.

use crate::name::LogicalName;
use std::collections::HashMap;

/// Whether a name exists in the host's own (local) namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LocalState {
    #[default]
    Unknown,
    /// A local lookup for this name is in flight.
    Searching,
    Absent,
    Present,
}

impl LocalState {
    pub fn is_terminal(self) -> bool {
        matches!(self, LocalState::Absent | LocalState::Present)
    }
}

/// Where a name lives on the remote host, if anywhere.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RemoteState {
    #[default]
    Unknown,
    Absent,
    /// Present, at this server-relative path.
    Resolved(String),
}

impl RemoteState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteState::Unknown)
    }

    pub fn resolved_path(&self) -> Option<&str> {
        match self {
            RemoteState::Resolved(path) => Some(path),
            _ => None,
        }
    }
}

/// Cached local/remote resolution state for one logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceRecord {
    pub local: LocalState,
    pub remote: RemoteState,
}

/// Mapping from logical name to its presence record.
///
/// Records are created lazily and only removed by `evict` or `clear`.
#[derive(Debug, Default)]
pub struct PresenceCache {
    records: HashMap<LogicalName, PresenceRecord>,
}

impl PresenceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for `name`, creating an Unknown/Unknown record on first access.
    pub fn get(&mut self, name: &LogicalName) -> PresenceRecord {
        self.records.entry(name.clone()).or_default().clone()
    }

    /// Record for `name` without creating one.
    pub fn peek(&self, name: &LogicalName) -> Option<&PresenceRecord> {
        self.records.get(name)
    }

    pub fn set(&mut self, name: &LogicalName, record: PresenceRecord) {
        self.records.insert(name.clone(), record);
    }

    pub fn set_local(&mut self, name: &LogicalName, local: LocalState) {
        self.records.entry(name.clone()).or_default().local = local;
    }

    pub fn set_remote(&mut self, name: &LogicalName, remote: RemoteState) {
        self.records.entry(name.clone()).or_default().remote = remote;
    }

    /// Forget one name so the next query checks again.
    pub fn evict(&mut self, name: &LogicalName) -> Option<PresenceRecord> {
        self.records.remove(name)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    #[test]
    fn test_get_creates_default_record() {
        let mut cache = PresenceCache::new();
        assert!(cache.peek(&name("a")).is_none());

        let record = cache.get(&name("a"));
        assert_eq!(record.local, LocalState::Unknown);
        assert_eq!(record.remote, RemoteState::Unknown);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_set_and_evict() {
        let mut cache = PresenceCache::new();
        let a = name("a.b");

        cache.set_local(&a, LocalState::Absent);
        cache.set_remote(&a, RemoteState::Resolved("a/b.py".to_string()));

        let record = cache.get(&a);
        assert!(record.local.is_terminal());
        assert_eq!(record.remote.resolved_path(), Some("a/b.py"));

        assert!(cache.evict(&a).is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_searching_is_not_terminal() {
        assert!(!LocalState::Searching.is_terminal());
        assert!(!LocalState::Unknown.is_terminal());
        assert!(RemoteState::Absent.is_terminal());
        assert!(!RemoteState::Unknown.is_terminal());
    }
}
