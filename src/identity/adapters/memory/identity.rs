//! In-memory identity repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::identity::{
    domain::{Identity, IdentityId, LinkCode, PhoneNumber},
    ports::{IdentityRepository, IdentityRepositoryError, IdentityRepositoryResult},
};
use crate::memory::{InMemoryStore, Tables};

/// Identity records with their phone and link code indexes.
#[derive(Debug, Default)]
pub(crate) struct IdentityTable {
    records: HashMap<IdentityId, Identity>,
    phone_index: HashMap<PhoneNumber, IdentityId>,
    code_index: HashMap<LinkCode, IdentityId>,
}

impl IdentityTable {
    pub(crate) fn get(&self, id: IdentityId) -> Option<&Identity> {
        self.records.get(&id)
    }

    pub(crate) fn contains(&self, id: IdentityId) -> bool {
        self.records.contains_key(&id)
    }

    pub(crate) fn holder_of_phone(&self, phone: &PhoneNumber) -> Option<IdentityId> {
        self.phone_index.get(phone).copied()
    }

    fn holder_of_code(&self, code: &LinkCode) -> Option<IdentityId> {
        self.code_index.get(code).copied()
    }

    /// Removes `id` and its index entries.
    pub(crate) fn remove(&mut self, id: IdentityId) -> Option<Identity> {
        let removed = self.records.remove(&id)?;
        if let Some(phone) = removed.phone() {
            self.phone_index.remove(phone);
        }
        if let Some(code) = removed.link_code() {
            self.code_index.remove(code);
        }
        Some(removed)
    }

    /// Writes `identity`, replacing any stored version and its index entries.
    ///
    /// Callers check index uniqueness first.
    pub(crate) fn put(&mut self, identity: Identity) {
        let id = identity.id();
        self.remove(id);
        if let Some(phone) = identity.phone() {
            self.phone_index.insert(phone.clone(), id);
        }
        if let Some(code) = identity.link_code() {
            self.code_index.insert(code.clone(), id);
        }
        self.records.insert(id, identity);
    }
}

/// Thread-safe in-memory identity repository.
///
/// The records live in an [`InMemoryStore`]; the compare-and-clear in
/// [`IdentityRepository::commit_promotion`] and the task check in
/// [`IdentityRepository::delete`] each run under its single lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityRepository {
    store: InMemoryStore,
}

impl InMemoryIdentityRepository {
    /// Creates an empty repository over a private store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository over `store`, sharing it with other adapters.
    #[must_use]
    pub fn with_store(store: &InMemoryStore) -> Self {
        Self {
            store: store.clone(),
        }
    }

    /// Returns every stored identity ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityRepositoryError::Persistence`] when the lock is
    /// poisoned.
    pub fn snapshot(&self) -> IdentityRepositoryResult<Vec<Identity>> {
        let tables = self.read()?;
        let mut identities: Vec<Identity> =
            tables.identities.records.values().cloned().collect();
        identities.sort_by_key(Identity::id);
        Ok(identities)
    }

    fn read(&self) -> IdentityRepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.store.read().map_err(IdentityRepositoryError::persistence)
    }

    fn write(&self) -> IdentityRepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.store.write().map_err(IdentityRepositoryError::persistence)
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn store(&self, identity: &Identity) -> IdentityRepositoryResult<()> {
        let mut tables = self.write()?;
        let table = &mut tables.identities;
        if table.contains(identity.id()) {
            return Err(IdentityRepositoryError::DuplicateIdentity(identity.id()));
        }
        if let Some(phone) = identity.phone() {
            if table.holder_of_phone(phone).is_some() {
                return Err(IdentityRepositoryError::DuplicatePhone(phone.clone()));
            }
        }
        if let Some(code) = identity.link_code() {
            if table.holder_of_code(code).is_some() {
                return Err(IdentityRepositoryError::DuplicateLinkCode(code.clone()));
            }
        }
        table.put(identity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: IdentityId) -> IdentityRepositoryResult<Option<Identity>> {
        Ok(self.read()?.identities.get(id).cloned())
    }

    async fn find_by_phone(
        &self,
        phone: &PhoneNumber,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let tables = self.read()?;
        Ok(tables
            .identities
            .holder_of_phone(phone)
            .and_then(|id| tables.identities.get(id))
            .cloned())
    }

    async fn find_by_link_code(
        &self,
        code: &LinkCode,
    ) -> IdentityRepositoryResult<Option<Identity>> {
        let tables = self.read()?;
        Ok(tables
            .identities
            .holder_of_code(code)
            .and_then(|id| tables.identities.get(id))
            .cloned())
    }

    async fn commit_promotion(
        &self,
        promoted: &Identity,
        redeemed_code: &LinkCode,
    ) -> IdentityRepositoryResult<Identity> {
        let id = promoted.id();
        let mut tables = self.write()?;
        let table = &mut tables.identities;

        let stored = table.get(id).ok_or(IdentityRepositoryError::NotFound(id))?;
        if stored.link_code() != Some(redeemed_code) {
            return Err(IdentityRepositoryError::LinkCodeConsumed(id));
        }
        if let Some(phone) = promoted.phone() {
            if table.holder_of_phone(phone).is_some_and(|owner| owner != id) {
                return Err(IdentityRepositoryError::PhoneConflict(phone.clone()));
            }
        }

        table.put(promoted.clone());
        Ok(promoted.clone())
    }

    async fn delete(&self, id: IdentityId) -> IdentityRepositoryResult<()> {
        let mut tables = self.write()?;
        if !tables.identities.contains(id) {
            return Err(IdentityRepositoryError::NotFound(id));
        }
        if tables.tasks.values().any(|task| task.is_owned_by(id)) {
            return Err(IdentityRepositoryError::StillOwnsTasks(id));
        }
        tables.identities.remove(id);
        Ok(())
    }
}
