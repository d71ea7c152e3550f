//! Host runtime adapter.
//!
//! [`ModuleHost`] models the runtime the resolver plugs into: an ordered
//! chain of [`Finder`]s consulted on import, a table of loaded units, and
//! registration of remote resolvers at the front of the chain.

pub mod namespace;
pub mod units;

pub use namespace::VfsNamespace;
pub use units::{LoadedUnit, LoadedUnits, UnitTable, flush_non_system_units, is_system_unit};

use crate::name::LogicalName;
use crate::remote::config::ResolverConfig;
use crate::remote::error::Result;
use crate::remote::resolver::{RemoteResolver, SpecDescriptor};
use crate::remote::transport::{HttpTransport, Transport};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use tracing::{debug, info, warn};

/// Answers whether a name exists without the resolver's help.
pub trait LocalNamespace: Send + Sync {
    fn contains(&self, name: &LogicalName) -> bool;
}

/// One entry of the host's lookup chain.
pub trait Finder: Send + Sync {
    /// Descriptor for `name` if this finder can provide it.
    fn find_spec(&self, name: &LogicalName) -> Option<SpecDescriptor>;

    /// Content for a name this finder described.
    fn get_data(&self, name: &LogicalName) -> Result<Vec<u8>>;
}

/// Identifies a finder installed in a [`ModuleHost`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FinderId(u64);

/// Returned by [`ModuleHost::register`]; pass it to `unregister` to remove
/// the resolver again.
#[derive(Clone)]
pub struct ResolverHandle {
    id: FinderId,
    resolver: Arc<RemoteResolver>,
}

impl ResolverHandle {
    pub fn id(&self) -> FinderId {
        self.id
    }

    pub fn resolver(&self) -> &Arc<RemoteResolver> {
        &self.resolver
    }
}

struct FinderEntry {
    id: FinderId,
    finder: Arc<dyn Finder>,
}

#[derive(Default)]
struct HostState {
    finders: RwLock<Vec<FinderEntry>>,
    units: Mutex<UnitTable>,
    next_id: AtomicU64,
}

impl HostState {
    fn units(&self) -> MutexGuard<'_, UnitTable> {
        self.units.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot so no lock is held while finders run (they may re-enter).
    fn chain(&self) -> Vec<Arc<dyn Finder>> {
        self.finders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|entry| entry.finder.clone())
            .collect()
    }

    fn find_spec(&self, name: &LogicalName) -> Option<(SpecDescriptor, Arc<dyn Finder>)> {
        self.chain()
            .into_iter()
            .find_map(|finder| finder.find_spec(name).map(|spec| (spec, finder)))
    }
}

/// The host's full namespace query, handed to resolvers as their local lookup.
///
/// Walks the whole chain, including the resolver asking, which is why the
/// resolver guards against re-entry for a name it is already probing.
struct ChainNamespace {
    host: Weak<HostState>,
}

impl LocalNamespace for ChainNamespace {
    fn contains(&self, name: &LogicalName) -> bool {
        let Some(host) = self.host.upgrade() else {
            return false;
        };
        if host.units().contains(name.as_str()) {
            return true;
        }
        host.find_spec(name).is_some()
    }
}

/// A minimal host runtime: finder chain plus loaded units.
#[derive(Clone, Default)]
pub struct ModuleHost {
    state: Arc<HostState>,
}

impl ModuleHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> FinderId {
        FinderId(self.state.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a finder at the lowest priority.
    pub fn add_finder(&self, finder: Arc<dyn Finder>) -> FinderId {
        let id = self.next_id();
        self.state
            .finders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FinderEntry { id, finder });
        id
    }

    /// Register a remote resolver talking HTTP to `config.host:config.port`.
    ///
    /// Every call installs another independent resolver with its own cache;
    /// the most recent one is consulted first.
    pub fn register(&self, config: ResolverConfig) -> Result<ResolverHandle> {
        config.validate()?;
        let transport = HttpTransport::new(config.base_url(), &config.network)?;
        self.register_with_transport(config, Arc::new(transport))
    }

    /// Register a remote resolver over an arbitrary transport.
    ///
    /// With `override_local`, non-system units are flushed first so that
    /// remote versions are picked up on the next import.
    pub fn register_with_transport(
        &self,
        config: ResolverConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<ResolverHandle> {
        let local = Arc::new(ChainNamespace {
            host: Arc::downgrade(&self.state),
        });
        let override_local = config.override_local;
        let resolver = Arc::new(RemoteResolver::with_transport(config, transport, local)?);

        if override_local {
            self.flush_non_system_units();
        }

        let id = self.next_id();
        self.state
            .finders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                0,
                FinderEntry {
                    id,
                    finder: resolver.clone(),
                },
            );

        Ok(ResolverHandle { id, resolver })
    }

    /// Remove a finder. Returns whether it was installed.
    pub fn unregister(&self, id: FinderId) -> bool {
        let mut finders = self
            .state
            .finders
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = finders.len();
        finders.retain(|entry| entry.id != id);
        before != finders.len()
    }

    pub fn finder_count(&self) -> usize {
        self.state
            .finders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// First descriptor the chain produces for `name`.
    pub fn find_spec(&self, name: &LogicalName) -> Option<SpecDescriptor> {
        self.state.find_spec(name).map(|(spec, _)| spec)
    }

    /// Load `name`, or return the already loaded unit.
    ///
    /// Any failure surfaces as `None`, the same as a unit nobody provides.
    pub fn import(&self, name: &LogicalName) -> Option<Arc<LoadedUnit>> {
        if let Some(unit) = self.state.units().get(name.as_str()) {
            return Some(unit);
        }

        let Some((spec, finder)) = self.state.find_spec(name) else {
            debug!(name = %name, "no finder can provide unit");
            return None;
        };

        match finder.get_data(name) {
            Ok(content) => {
                info!(name = %name, origin = %spec.origin, "loaded unit");
                Some(self.state.units().insert(LoadedUnit {
                    name: name.to_string(),
                    origin: spec.origin,
                    is_package: spec.is_package,
                    content,
                }))
            }
            Err(e) => {
                warn!(name = %name, "cannot load unit: {}", e);
                None
            }
        }
    }

    /// Record a unit as loaded without going through the chain.
    pub fn insert_unit(&self, unit: LoadedUnit) -> Arc<LoadedUnit> {
        self.state.units().insert(unit)
    }

    pub fn loaded(&self, name: &str) -> Option<Arc<LoadedUnit>> {
        self.state.units().get(name)
    }

    /// See [`units::flush_non_system_units`]; the same hazards apply.
    pub fn flush_non_system_units(&self) -> Vec<String> {
        flush_non_system_units(&mut *self.state.units())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::cache::LocalState;
    use crate::remote::testing::MockTransport;
    use crate::vfs::MemoryVfs;

    fn name(s: &str) -> LogicalName {
        LogicalName::new(s).unwrap()
    }

    fn host_with_local(files: &[(&str, &str)]) -> ModuleHost {
        let vfs = files
            .iter()
            .fold(MemoryVfs::new(), |vfs, (path, body)| vfs.with_file(path, body));
        let host = ModuleHost::new();
        host.add_finder(Arc::new(VfsNamespace::new(vfs, "lib", ".py")));
        host
    }

    fn config() -> ResolverConfig {
        ResolverConfig::new("h", 80)
    }

    #[test]
    fn test_register_rejects_bad_config() {
        let host = ModuleHost::new();
        assert!(host.register(ResolverConfig::new("", 80)).is_err());
        assert!(host.register(ResolverConfig::new("h", 0)).is_err());
        assert_eq!(host.finder_count(), 0);
    }

    #[test]
    fn test_reentrant_local_lookup() {
        let host = host_with_local(&[]);
        let transport = Arc::new(MockTransport::new().with_file("a/b.py", "X=1"));
        let handle = host
            .register_with_transport(config(), transport.clone())
            .unwrap();

        // The local lookup walks the chain, reaching this resolver again for
        // the same name; that nested query must answer false.
        let unit = host.import(&name("a.b")).unwrap();
        assert_eq!(unit.content, b"X=1");
        assert!(!unit.is_package);

        let record = handle.resolver().record(&name("a.b")).unwrap();
        assert_eq!(record.local, LocalState::Absent);
        assert_eq!(transport.log(), vec!["HEAD a/b", "HEAD a/b.py", "GET a/b.py"]);
    }

    #[test]
    fn test_local_unit_preferred() {
        let host = host_with_local(&[("lib/json.py", "LOCAL")]);
        let transport = Arc::new(MockTransport::new().with_file("json.py", "REMOTE"));
        host.register_with_transport(config(), transport.clone())
            .unwrap();

        let unit = host.import(&name("json")).unwrap();
        assert_eq!(unit.content, b"LOCAL");
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_override_prefers_remote_and_flushes() {
        let host = host_with_local(&[("lib/json.py", "LOCAL")]);
        host.import(&name("json")).unwrap();
        host.insert_unit(LoadedUnit {
            name: "sys".to_string(),
            origin: "builtin".to_string(),
            is_package: false,
            content: Vec::new(),
        });

        let transport = Arc::new(MockTransport::new().with_file("json.py", "REMOTE"));
        host.register_with_transport(config().with_override_local(true), transport)
            .unwrap();

        assert!(host.loaded("json").is_none());
        assert!(host.loaded("sys").is_some());

        let unit = host.import(&name("json")).unwrap();
        assert_eq!(unit.content, b"REMOTE");
    }

    #[test]
    fn test_package_with_missing_index() {
        let host = ModuleHost::new();
        host.register_with_transport(config(), Arc::new(MockTransport::new().with_head("pkg", 301)))
            .unwrap();

        let unit = host.import(&name("pkg")).unwrap();
        assert!(unit.is_package);
        assert_eq!(unit.origin, "pkg/__init__.py");
        assert!(unit.content.is_empty());
    }

    #[test]
    fn test_failed_fetch_is_plain_absence() {
        let host = ModuleHost::new();
        host.register_with_transport(config(), Arc::new(MockTransport::new().with_head("mod.py", 200)))
            .unwrap();

        assert!(host.import(&name("mod")).is_none());
        assert!(host.loaded("mod").is_none());
    }

    #[test]
    fn test_unregister() {
        let host = ModuleHost::new();
        let handle = host
            .register_with_transport(config(), Arc::new(MockTransport::new().with_file("m.py", "M")))
            .unwrap();
        assert_eq!(host.finder_count(), 1);

        assert!(host.unregister(handle.id()));
        assert!(!host.unregister(handle.id()));
        assert!(host.import(&name("m")).is_none());
    }

    #[test]
    fn test_last_registration_consulted_first() {
        let host = ModuleHost::new();
        host.register_with_transport(config(), Arc::new(MockTransport::new().with_file("m.py", "FIRST")))
            .unwrap();
        host.register_with_transport(
            config().with_override_local(true),
            Arc::new(MockTransport::new().with_file("m.py", "SECOND")),
        )
        .unwrap();

        let unit = host.import(&name("m")).unwrap();
        assert_eq!(unit.content, b"SECOND");
    }
}
