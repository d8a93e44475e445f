use std::sync::Arc;

use super::{DataError, Entity, EntitySet};

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Lazy, non-tracked read over an entity set.
///
/// Nothing is loaded until a terminal operation (`to_vec`, `count`, `any`)
/// runs, and results are never attached to a repository.
pub struct Query<T: Entity> {
    set: Arc<dyn EntitySet<T>>,
    predicates: Vec<Predicate<T>>,
}

impl<T: Entity> Query<T> {
    pub(crate) fn new(set: Arc<dyn EntitySet<T>>) -> Self {
        Self {
            set,
            predicates: Vec::new(),
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Box::new(predicate));
        self
    }

    pub async fn to_vec(self) -> Result<Vec<T>, DataError> {
        let rows = self.set.load_all().await?;
        Ok(rows
            .into_iter()
            .filter(|row| self.predicates.iter().all(|p| p(row)))
            .collect())
    }

    pub async fn count(self) -> Result<usize, DataError> {
        Ok(self.to_vec().await?.len())
    }

    pub async fn any(self) -> Result<bool, DataError> {
        Ok(self.count().await? > 0)
    }
}
