//! Remote artifact resolver.
//!
//! The resolver decides, per logical name, whether the host should load a
//! unit from the remote server. Local units win unless the resolver was
//! configured with `override_local`. Every decision is memoized in a
//! [`PresenceCache`] so repeated lookups do not hit the network.

use crate::host::{Finder, LocalNamespace};
use crate::name::LogicalName;
use crate::remote::cache::{LocalState, PresenceCache, PresenceRecord, RemoteState};
use crate::remote::config::ResolverConfig;
use crate::remote::error::{ResolverError, Result};
use crate::remote::fetch::{Fetcher, RemoteArtifact};
use crate::remote::locator::RemoteLocator;
use crate::remote::transport::{HttpTransport, Transport};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// What the host needs to build a loadable unit descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDescriptor {
    pub name: LogicalName,
    pub is_package: bool,
    /// Server-relative path the content will be fetched from.
    pub origin: String,
}

/// Resolves logical names against one remote artifact server.
///
/// Calls may re-enter for the same name while its local lookup is running;
/// such calls answer `false`. The cache lock is never held across a local
/// lookup or a network request, so two threads querying the same name at
/// once may both issue requests. Share one resolver per host, not across threads.
pub struct RemoteResolver {
    /// Configuration.
    config: ResolverConfig,

    /// Host namespace consulted before the remote.
    local: Arc<dyn LocalNamespace>,

    /// Remote locator.
    locator: RemoteLocator,

    /// Content fetcher.
    fetcher: Fetcher,

    /// Presence records by name.
    cache: Mutex<PresenceCache>,
}

impl RemoteResolver {
    /// Create a resolver talking HTTP to `config.host:config.port`.
    ///
    /// Fails with a configuration error before any network activity.
    pub fn new(config: ResolverConfig, local: Arc<dyn LocalNamespace>) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.base_url(), &config.network)?;
        Self::with_transport(config, Arc::new(transport), local)
    }

    /// Create a resolver over an arbitrary transport.
    pub fn with_transport(
        config: ResolverConfig,
        transport: Arc<dyn Transport>,
        local: Arc<dyn LocalNamespace>,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            host = %config.host,
            port = config.port,
            override_local = config.override_local,
            "registered remote resolver"
        );

        Ok(Self {
            locator: RemoteLocator::new(transport.clone(), config.extension.clone()),
            fetcher: Fetcher::new(transport),
            config,
            local,
            cache: Mutex::new(PresenceCache::new()),
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn cache(&self) -> MutexGuard<'_, PresenceCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether this resolver can and should provide `name`.
    ///
    /// Returns `false` while a local lookup for `name` is in flight, when the
    /// name exists locally (unless overriding), or when the remote has no
    /// match. Populates the presence cache as a side effect.
    pub fn can_resolve(&self, name: &LogicalName) -> bool {
        debug!(name = %name, "finding unit");
        let record = self.cache().get(name);

        if record.local == LocalState::Searching {
            return false;
        }

        if !self.config.override_local && self.is_present_locally(name, record.local) {
            debug!(name = %name, "loading locally instead");
            return false;
        }

        self.is_present_remote(name, &record.remote)
    }

    fn is_present_locally(&self, name: &LogicalName, state: LocalState) -> bool {
        let state = match state {
            LocalState::Unknown => {
                debug!(name = %name, "not cached, searching locally");
                self.cache().set_local(name, LocalState::Searching);
                let state = if self.local.contains(name) {
                    LocalState::Present
                } else {
                    LocalState::Absent
                };
                self.cache().set_local(name, state);
                state
            }
            state => state,
        };

        let present = state == LocalState::Present;
        debug!(name = %name, present, "local presence");
        present
    }

    fn is_present_remote(&self, name: &LogicalName, state: &RemoteState) -> bool {
        if self.config.cache_remote_result && state.is_terminal() {
            return state.resolved_path().is_some();
        }

        debug!(name = %name, "checking remote availability");
        let state = match self.locator.locate(name) {
            Ok(Some(path)) => {
                debug!(name = %name, path = %path, "available remotely");
                RemoteState::Resolved(path)
            }
            Ok(None) => {
                debug!(name = %name, "not available remotely");
                RemoteState::Absent
            }
            Err(e) => {
                warn!(name = %name, "remote lookup failed, treating as absent: {}", e);
                RemoteState::Absent
            }
        };

        let found = state.resolved_path().is_some();
        self.cache().set_remote(name, state);
        found
    }

    /// Whether the cached remote path for `name` is a package index.
    ///
    /// `false` when `name` has not been resolved yet.
    pub fn is_package(&self, name: &LogicalName) -> bool {
        let suffix = self.config.package_index_suffix();
        self.cache()
            .peek(name)
            .and_then(|record| record.remote.resolved_path())
            .is_some_and(|path| path.ends_with(&suffix))
    }

    /// Descriptor for `name`, or `None` when this resolver cannot provide it.
    pub fn describe(&self, name: &LogicalName) -> Option<SpecDescriptor> {
        if !self.can_resolve(name) {
            return None;
        }

        let origin = self.resolved_path(name)?;
        let is_package = self.is_package(name);
        if is_package {
            debug!(name = %name, "spec is a package");
        }

        Some(SpecDescriptor {
            name: name.clone(),
            is_package,
            origin,
        })
    }

    /// Fetch the content of a previously resolved name.
    ///
    /// Nothing about a failed fetch is cached; asking again re-issues the GET.
    pub fn fetch(&self, name: &LogicalName) -> Result<RemoteArtifact> {
        info!(name = %name, "fetching source");
        let path = self
            .resolved_path(name)
            .ok_or_else(|| ResolverError::NotResolved(name.to_string()))?;
        let is_package = self.is_package(name);

        self.fetcher.fetch(name, &path, is_package)
    }

    fn resolved_path(&self, name: &LogicalName) -> Option<String> {
        self.cache()
            .peek(name)
            .and_then(|record| record.remote.resolved_path().map(str::to_string))
    }

    /// Snapshot of the presence record for `name`, if one exists.
    pub fn record(&self, name: &LogicalName) -> Option<PresenceRecord> {
        self.cache().peek(name).cloned()
    }

    /// Forget what is known about `name`.
    pub fn evict(&self, name: &LogicalName) -> Option<PresenceRecord> {
        self.cache().evict(name)
    }

    /// Forget every presence record.
    pub fn clear_cache(&self) {
        self.cache().clear();
    }
}

impl Finder for RemoteResolver {
    fn find_spec(&self, name: &LogicalName) -> Option<SpecDescriptor> {
        self.describe(name)
    }

    fn get_data(&self, name: &LogicalName) -> Result<Vec<u8>> {
        self.fetch(name).map(|artifact| artifact.content)
    }
}
