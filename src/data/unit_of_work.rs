use std::{
    any::{Any, TypeId},
    sync::{Arc, Mutex, PoisonError},
};

use tracing::debug;

use super::{DataContext, DataError, Entity, Repository, repository::PendingChanges};

struct Slot {
    repository: Arc<dyn Any + Send + Sync>,
    pending: Arc<dyn PendingChanges>,
}

/// Per-request persistence scope.
///
/// Hands out one repository per entity type and commits everything they
/// staged in `save_changes`.
pub struct UnitOfWork {
    context: DataContext,
    // Insertion order keeps flushes deterministic
    slots: Mutex<Vec<(TypeId, Slot)>>,
}

impl UnitOfWork {
    pub fn new(context: DataContext) -> Self {
        Self {
            context,
            slots: Mutex::new(Vec::new()),
        }
    }

    /// The repository for `T`, created on first use and cached for the
    /// lifetime of this unit of work.
    pub fn repository<T: Entity>(&self) -> Result<Arc<Repository<T>>, DataError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let type_id = TypeId::of::<T>();

        if let Some((_, slot)) = slots.iter().find(|(id, _)| *id == type_id) {
            if let Ok(repository) = slot.repository.clone().downcast::<Repository<T>>() {
                return Ok(repository);
            }
        }

        let repository = Arc::new(Repository::new(self.context.set::<T>()?));
        slots.retain(|(id, _)| *id != type_id);
        slots.push((
            type_id,
            Slot {
                repository: repository.clone(),
                pending: repository.clone(),
            },
        ));
        Ok(repository)
    }

    /// Commit all staged changes. Returns the number of affected rows.
    pub async fn save_changes(&self) -> Result<u64, DataError> {
        let pending: Vec<Arc<dyn PendingChanges>> = self
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, slot)| slot.pending.clone())
            .collect();

        let mut affected = 0;
        for repository in pending {
            affected += repository.flush().await?;
        }

        debug!("Saved changes, {} rows affected", affected);
        Ok(affected)
    }
}
