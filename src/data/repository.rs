use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::{Change, DataError, Entity, EntitySet, Query};

/// Tracking state of an entity inside a repository.
/// Untracked (detached) entities have no entry at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState {
    Unchanged,
    Added,
    Modified,
    Deleted,
}

struct Tracked<T> {
    entity: T,
    state: EntityState,
}

struct ChangeTracker<T: Entity> {
    entries: Vec<Tracked<T>>,
}

impl<T: Entity> ChangeTracker<T> {
    fn position(&self, key: T::Key) -> Option<usize> {
        self.entries.iter().position(|e| e.entity.key() == key)
    }

    fn entry_mut(&mut self, key: T::Key) -> Option<&mut Tracked<T>> {
        self.entries.iter_mut().find(|e| e.entity.key() == key)
    }

    fn track(&mut self, entity: T, state: EntityState) {
        match self.entry_mut(entity.key()) {
            Some(entry) => {
                entry.entity = entity;
                entry.state = state;
            }
            None => self.entries.push(Tracked { entity, state }),
        }
    }

    fn pending(&self) -> Vec<(Change<T>, T::Key, EntityState)> {
        self.entries
            .iter()
            .filter_map(|e| {
                let change = match e.state {
                    EntityState::Added => Change::Insert(e.entity.clone()),
                    EntityState::Modified => Change::Update(e.entity.clone()),
                    EntityState::Deleted => Change::Delete(e.entity.key()),
                    EntityState::Unchanged => return None,
                };
                Some((change, e.entity.key(), e.state))
            })
            .collect()
    }

    /// Mark flushed entries as persisted. Entries restaged since the flush
    /// started keep their new state.
    fn accept(&mut self, flushed: &[(T::Key, EntityState)]) {
        for (key, state) in flushed {
            let Some(index) = self.position(*key) else {
                continue;
            };
            if self.entries[index].state != *state {
                continue;
            }
            if *state == EntityState::Deleted {
                self.entries.remove(index);
            } else {
                self.entries[index].state = EntityState::Unchanged;
            }
        }
    }
}

/// Generic CRUD gateway over one entity set with explicit change tracking.
///
/// Writes are only staged here; they reach the store when the owning
/// [`UnitOfWork`](super::UnitOfWork) saves.
pub struct Repository<T: Entity> {
    set: Arc<dyn EntitySet<T>>,
    tracker: Mutex<ChangeTracker<T>>,
}

impl<T: Entity> Repository<T> {
    pub fn new(set: Arc<dyn EntitySet<T>>) -> Self {
        Self {
            set,
            tracker: Mutex::new(ChangeTracker {
                entries: Vec::new(),
            }),
        }
    }

    fn tracker(&self) -> MutexGuard<'_, ChangeTracker<T>> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stage a new entity for insertion.
    pub fn add(&self, entity: T) -> Result<(), DataError> {
        entity.validate().map_err(DataError::InvalidArgument)?;
        self.tracker().track(entity, EntityState::Added);
        Ok(())
    }

    /// Stage an entity for update, attaching it first if untracked.
    pub fn update(&self, entity: T) -> Result<(), DataError> {
        entity.validate().map_err(DataError::InvalidArgument)?;
        let mut tracker = self.tracker();
        let state = match tracker.entry_mut(entity.key()) {
            Some(entry) if entry.state == EntityState::Added => EntityState::Added,
            _ => EntityState::Modified,
        };
        tracker.track(entity, state);
        Ok(())
    }

    /// Stage an entity for removal. Entities added but never saved are
    /// simply forgotten.
    pub fn remove(&self, entity: &T) {
        let mut tracker = self.tracker();
        match tracker.position(entity.key()) {
            Some(index) if tracker.entries[index].state == EntityState::Added => {
                tracker.entries.remove(index);
            }
            Some(index) => tracker.entries[index].state = EntityState::Deleted,
            None => tracker.entries.push(Tracked {
                entity: entity.clone(),
                state: EntityState::Deleted,
            }),
        }
    }

    /// Stage removal of the entity with `key`, if it exists.
    pub async fn delete(&self, key: T::Key) -> Result<(), DataError> {
        if let Some(entity) = self.get(key).await? {
            self.remove(&entity);
        }
        Ok(())
    }

    /// Start tracking an entity as unchanged.
    pub fn attach(&self, entity: T) {
        let mut tracker = self.tracker();
        if tracker.position(entity.key()).is_none() {
            tracker.entries.push(Tracked {
                entity,
                state: EntityState::Unchanged,
            });
        }
    }

    pub fn detach(&self, entity: &T) {
        let mut tracker = self.tracker();
        if let Some(index) = tracker.position(entity.key()) {
            tracker.entries.remove(index);
        }
    }

    pub fn detach_all(&self) {
        self.tracker().entries.clear();
    }

    pub fn state(&self, key: T::Key) -> Option<EntityState> {
        let tracker = self.tracker();
        tracker.position(key).map(|i| tracker.entries[i].state)
    }

    /// Find an entity by key, preferring the tracked copy.
    /// Entities found in the store are attached as unchanged.
    pub async fn get(&self, key: T::Key) -> Result<Option<T>, DataError> {
        {
            let tracker = self.tracker();
            if let Some(index) = tracker.position(key) {
                let entry = &tracker.entries[index];
                return Ok(match entry.state {
                    EntityState::Deleted => None,
                    _ => Some(entry.entity.clone()),
                });
            }
        }

        let found = self.set.find(key).await?;
        if let Some(entity) = &found {
            self.attach(entity.clone());
        }
        Ok(found)
    }

    /// Non-tracked view over every stored entity.
    pub fn query(&self) -> Query<T> {
        Query::new(self.set.clone())
    }

    pub fn has_changes(&self) -> bool {
        self.tracker()
            .entries
            .iter()
            .any(|e| e.state != EntityState::Unchanged)
    }

    /// Flush staged changes to the entity set. Staged changes survive a
    /// failed flush.
    pub(crate) async fn save(&self) -> Result<u64, DataError> {
        let pending = self.tracker().pending();
        if pending.is_empty() {
            return Ok(0);
        }

        let flushed: Vec<_> = pending.iter().map(|(_, key, state)| (*key, *state)).collect();
        let changes = pending.into_iter().map(|(change, _, _)| change).collect();

        let affected = self.set.apply(changes).await?;
        self.tracker().accept(&flushed);
        Ok(affected)
    }
}

/// Type-erased handle the unit of work uses to flush every repository.
#[async_trait]
pub(crate) trait PendingChanges: Send + Sync {
    async fn flush(&self) -> Result<u64, DataError>;
}

#[async_trait]
impl<T: Entity> PendingChanges for Repository<T> {
    async fn flush(&self) -> Result<u64, DataError> {
        self.save().await
    }
}
