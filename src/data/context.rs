use std::{
    any::{Any, TypeId, type_name},
    collections::HashMap,
    sync::Arc,
};

use super::{DataError, Entity, EntitySet};

/// Registry of entity sets, built once at start-up and shared by every
/// unit of work.
#[derive(Clone, Default)]
pub struct DataContext {
    sets: Arc<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl DataContext {
    pub fn builder() -> DataContextBuilder {
        DataContextBuilder::default()
    }

    /// The entity set registered for `T`.
    pub fn set<T: Entity>(&self) -> Result<Arc<dyn EntitySet<T>>, DataError> {
        self.sets
            .get(&TypeId::of::<T>())
            .and_then(|set| set.downcast_ref::<Arc<dyn EntitySet<T>>>())
            .cloned()
            .ok_or(DataError::UnknownEntity(type_name::<T>()))
    }
}

#[derive(Default)]
pub struct DataContextBuilder {
    sets: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl DataContextBuilder {
    /// Register the entity set backing `T`, replacing any earlier one.
    pub fn register<T: Entity>(mut self, set: Arc<dyn EntitySet<T>>) -> Self {
        self.sets.insert(TypeId::of::<T>(), Box::new(set));
        self
    }

    pub fn build(self) -> DataContext {
        DataContext {
            sets: Arc::new(self.sets),
        }
    }
}
