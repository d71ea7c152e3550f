//! Loaded-unit table and the best-effort flush sweep.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Units whose names start with this prefix are runtime internals.
pub const RESERVED_PREFIX: &str = "_";

/// Infrastructure units the resolver itself depends on.
pub const PROTECTED_UNITS: &[&str] = &["sys", "builtins", "encodings.idna", "http.client", "logging"];

/// Names containing this marker belong to the host's module-loading machinery.
pub const LOADER_MARKER: &str = "importlib";

/// A unit the host has loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnit {
    pub name: String,
    /// Where the content came from (remote path or local file).
    pub origin: String,
    pub is_package: bool,
    pub content: Vec<u8>,
}

/// The host runtime's view of loaded units.
pub trait LoadedUnits {
    fn unit_names(&self) -> Vec<String>;

    /// Drop a unit. Returns whether it was loaded.
    fn unload(&mut self, name: &str) -> bool;
}

/// In-process table of loaded units, keyed by name.
#[derive(Debug, Default)]
pub struct UnitTable {
    units: BTreeMap<String, Arc<LoadedUnit>>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, unit: LoadedUnit) -> Arc<LoadedUnit> {
        let unit = Arc::new(unit);
        self.units.insert(unit.name.clone(), unit.clone());
        unit
    }

    pub fn get(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        self.units.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl LoadedUnits for UnitTable {
    fn unit_names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    fn unload(&mut self, name: &str) -> bool {
        self.units.remove(name).is_some()
    }
}

/// Whether `flush_non_system_units` must leave `name` alone.
pub fn is_system_unit(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX) || name.contains(LOADER_MARKER) || PROTECTED_UNITS.contains(&name)
}

/// Unload every loaded unit that is not a system unit.
///
/// Best effort: there is no dependency ordering, so units that captured
/// state from a flushed unit keep running against it. Returns the names
/// that were unloaded.
pub fn flush_non_system_units(units: &mut dyn LoadedUnits) -> Vec<String> {
    let mut flushed = Vec::new();
    for name in units.unit_names() {
        if is_system_unit(&name) {
            continue;
        }
        if units.unload(&name) {
            debug!(unit = %name, "flushed");
            flushed.push(name);
        }
    }
    info!(count = flushed.len(), "flushed all non-system units");
    flushed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(name: &str) -> LoadedUnit {
        LoadedUnit {
            name: name.to_string(),
            origin: format!("{}.py", name),
            is_package: false,
            content: Vec::new(),
        }
    }

    #[test]
    fn test_flush_keeps_system_units() {
        let mut table = UnitTable::new();
        for name in [
            "json",
            "sys",
            "_thread",
            "http.client",
            "importlib.util",
            "app.models",
            "logging",
            "builtins",
            "encodings.idna",
        ] {
            table.insert(unit(name));
        }

        let mut flushed = flush_non_system_units(&mut table);
        flushed.sort();
        assert_eq!(flushed, vec!["app.models", "json"]);

        for name in PROTECTED_UNITS {
            assert!(table.contains(name));
        }
        assert!(table.contains("_thread"));
        assert!(table.contains("importlib.util"));
    }

    #[test]
    fn test_protected_names_are_exact() {
        assert!(is_system_unit("http.client"));
        assert!(!is_system_unit("http"));
        assert!(!is_system_unit("logging.handlers"));
    }

    #[test]
    fn test_flush_empty_table() {
        let mut table = UnitTable::new();
        assert!(flush_non_system_units(&mut table).is_empty());
    }
}
