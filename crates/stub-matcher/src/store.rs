//! Stub registry.
//!
//! Stubs are grouped by full method name and kept in registration order;
//! lookups return the first stub whose request accepts the incoming one.
//! Duplicate detection uses strict equality of request contents, lookups use
//! each stub's own match kind.

use crate::config::MatcherConfig;
use crate::error::MatchError;
use crate::json::JsonValue;
use crate::matcher::Comparator;
use crate::stub::{Metadata, Stub};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors returned by stub store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("stub already exists for method {0}")]
    AlreadyExists(String),
    #[error("stub not found for method {0}")]
    NotFound(String),
    #[error(transparent)]
    Match(#[from] MatchError),
}

/// Storage and lookup of stubs.
pub trait StubsStore: Send + Sync {
    /// Register a stub. Fails if an identical request is already registered.
    fn add(&self, stub: Stub) -> Result<(), StoreError>;

    /// Whether a stub with the same request is registered.
    fn exists(&self, stub: &Stub) -> Result<bool, StoreError>;

    /// Replace the registered stub that has the same request as `stub`.
    fn update(&self, stub: Stub) -> Result<(), StoreError>;

    /// Remove the registered stub that has the same request as `stub`.
    fn delete(&self, stub: &Stub) -> Result<(), StoreError>;

    /// Remove every stub of `method`, returning how many were removed.
    fn delete_all_for_method(&self, method: &str) -> usize;

    fn delete_all(&self);

    fn all_stubs(&self) -> Vec<Stub>;

    fn stubs_for_method(&self, method: &str) -> Vec<Stub>;

    /// First stub of `method` that accepts the request.
    ///
    /// A request body that is not a valid JSON object is an error, not a miss.
    fn find_match(
        &self,
        method: &str,
        request: &str,
        metadata: &Metadata,
    ) -> Result<Option<Stub>, StoreError>;
}

/// In-memory [`StubsStore`].
pub struct InMemoryStubsStore {
    stubs: RwLock<BTreeMap<String, Vec<Stub>>>,
    comparator: Comparator,
}

impl InMemoryStubsStore {
    pub fn new(comparator: Comparator) -> Self {
        Self {
            stubs: RwLock::new(BTreeMap::new()),
            comparator,
        }
    }

    pub fn from_config(config: &MatcherConfig) -> Self {
        Self::new(config.comparator())
    }

    /// Position of the stub registering the same request as `stub`.
    fn position(&self, stubs: &[Stub], stub: &Stub) -> Result<Option<usize>, MatchError> {
        for (index, existing) in stubs.iter().enumerate() {
            if existing.same_request(stub, &self.comparator)? {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }
}

impl Default for InMemoryStubsStore {
    fn default() -> Self {
        Self::new(Comparator::default())
    }
}

impl StubsStore for InMemoryStubsStore {
    fn add(&self, stub: Stub) -> Result<(), StoreError> {
        // Reject contents that can never be compared before they are stored.
        stub.request.content.to_object()?;

        let mut stubs = self.stubs.write();
        let entries = stubs.entry(stub.full_method.clone()).or_default();
        if self.position(entries, &stub)?.is_some() {
            return Err(StoreError::AlreadyExists(stub.full_method));
        }
        info!(
            method = %stub.full_method,
            request = %stub.request.content,
            "Added stub"
        );
        entries.push(stub);
        Ok(())
    }

    fn exists(&self, stub: &Stub) -> Result<bool, StoreError> {
        let stubs = self.stubs.read();
        match stubs.get(&stub.full_method) {
            Some(entries) => Ok(self.position(entries, stub)?.is_some()),
            None => Ok(false),
        }
    }

    fn update(&self, stub: Stub) -> Result<(), StoreError> {
        let mut stubs = self.stubs.write();
        let Some(entries) = stubs.get_mut(&stub.full_method) else {
            return Err(StoreError::NotFound(stub.full_method));
        };
        let Some(index) = self.position(entries, &stub)? else {
            return Err(StoreError::NotFound(stub.full_method));
        };
        info!(
            method = %stub.full_method,
            request = %stub.request.content,
            "Updated stub"
        );
        entries[index] = stub;
        Ok(())
    }

    fn delete(&self, stub: &Stub) -> Result<(), StoreError> {
        let mut stubs = self.stubs.write();
        let Some(entries) = stubs.get_mut(&stub.full_method) else {
            return Err(StoreError::NotFound(stub.full_method.clone()));
        };
        let Some(index) = self.position(entries, stub)? else {
            return Err(StoreError::NotFound(stub.full_method.clone()));
        };
        entries.remove(index);
        if entries.is_empty() {
            stubs.remove(&stub.full_method);
        }
        info!(
            method = %stub.full_method,
            request = %stub.request.content,
            "Deleted stub"
        );
        Ok(())
    }

    fn delete_all_for_method(&self, method: &str) -> usize {
        let removed = self
            .stubs
            .write()
            .remove(method)
            .map(|entries| entries.len())
            .unwrap_or(0);
        info!(method, removed, "Deleted stubs for method");
        removed
    }

    fn delete_all(&self) {
        self.stubs.write().clear();
        info!("Deleted all stubs");
    }

    fn all_stubs(&self) -> Vec<Stub> {
        self.stubs.read().values().flatten().cloned().collect()
    }

    fn stubs_for_method(&self, method: &str) -> Vec<Stub> {
        self.stubs.read().get(method).cloned().unwrap_or_default()
    }

    fn find_match(
        &self,
        method: &str,
        request: &str,
        metadata: &Metadata,
    ) -> Result<Option<Stub>, StoreError> {
        let request = JsonValue::parse_object(request)?;

        let stubs = self.stubs.read();
        let Some(entries) = stubs.get(method) else {
            debug!(method, "No stubs configured for method");
            return Ok(None);
        };
        for (index, stub) in entries.iter().enumerate() {
            if stub.request.accepts(&request, metadata, &self.comparator)? {
                debug!(method, index, "Request matched stub");
                return Ok(Some(stub.clone()));
            }
        }
        debug!(method, candidates = entries.len(), "No stub matched request");
        Ok(None)
    }
}
