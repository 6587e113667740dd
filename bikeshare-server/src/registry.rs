//! Registry of running engines, one per bike-share deployment.
//!
//! Queries name their deployment explicitly; there is no ambient "current
//! system".

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{CircularArea, SystemId};
use crate::engine::{
    AvailabilitySummary, Challenge, ChallengeRequest, EngineConfig, EngineHandle, EngineSnapshot,
    QueryError,
};
use crate::gbfs::FeedClient;

/// Errors from registry lookups and dispatch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown bike share system: {0}")]
    UnknownSystem(SystemId),

    #[error("bike share system registered twice: {0}")]
    DuplicateSystem(SystemId),

    #[error(transparent)]
    Query(#[from] QueryError),
}

/// All engines known to the server.
#[derive(Debug, Default)]
pub struct SystemRegistry {
    engines: BTreeMap<SystemId, EngineHandle>,
}

impl SystemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn an engine for `system` and add it to the registry.
    pub fn start<C: FeedClient>(
        &mut self,
        system: SystemId,
        config: EngineConfig,
        client: Arc<C>,
    ) -> Result<&EngineHandle, RegistryError> {
        if self.engines.contains_key(&system) {
            return Err(RegistryError::DuplicateSystem(system));
        }
        let handle = EngineHandle::spawn(system, config, client);
        self.register(handle)
    }

    /// Add an already running engine.
    pub fn register(&mut self, handle: EngineHandle) -> Result<&EngineHandle, RegistryError> {
        let system = handle.system().clone();
        if self.engines.contains_key(&system) {
            return Err(RegistryError::DuplicateSystem(system));
        }
        Ok(&*self.engines.entry(system).or_insert(handle))
    }

    pub fn get(&self, system: &SystemId) -> Result<&EngineHandle, RegistryError> {
        self.engines
            .get(system)
            .ok_or_else(|| RegistryError::UnknownSystem(system.clone()))
    }

    /// Registered system ids, sorted.
    pub fn ids(&self) -> Vec<SystemId> {
        self.engines.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    pub async fn request_challenge(
        &self,
        system: &SystemId,
        request: ChallengeRequest,
    ) -> Result<Challenge, RegistryError> {
        Ok(self.get(system)?.request_challenge(request).await?)
    }

    pub async fn request_status(
        &self,
        system: &SystemId,
        area: CircularArea,
    ) -> Result<AvailabilitySummary, RegistryError> {
        Ok(self.get(system)?.request_status(area).await?)
    }

    pub fn refresh(&self, system: &SystemId) -> Result<(), RegistryError> {
        Ok(self.get(system)?.refresh()?)
    }

    pub async fn snapshot(&self, system: &SystemId) -> Result<EngineSnapshot, RegistryError> {
        Ok(self.get(system)?.snapshot().await?)
    }

    /// Snapshot every engine concurrently, in id order.
    pub async fn snapshots(&self) -> Vec<(SystemId, Result<EngineSnapshot, QueryError>)> {
        let pending = self.engines.iter().map(|(id, handle)| async move {
            (id.clone(), handle.snapshot().await)
        });
        join_all(pending).await
    }

    /// Stop every engine.
    pub fn shutdown_all(&self) {
        for handle in self.engines.values() {
            handle.shutdown();
        }
    }
}
