// In-memory entity set standing in for PostgreSQL in tests
use std::sync::{
    Mutex, MutexGuard, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;

use super::{Change, DataError, Entity, EntitySet};

type UniqueBy<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

pub struct MemorySet<T: Entity> {
    rows: Mutex<Vec<T>>,
    unique_by: Option<UniqueBy<T>>,
    fail_next: AtomicBool,
}

impl<T: Entity> MemorySet<T> {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            unique_by: None,
            fail_next: AtomicBool::new(false),
        }
    }

    /// Reject inserts and updates that collide on the given column.
    pub fn unique_by<F>(mut self, column: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.unique_by = Some(Box::new(column));
        self
    }

    /// Make the next `apply` fail without touching the rows.
    pub fn fail_next_apply(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn seed(&self, row: T) {
        self.lock().push(row);
    }

    pub fn rows(&self) -> Vec<T> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_unique(&self, rows: &[T], candidate: &T) -> Result<(), DataError> {
        let Some(column) = &self.unique_by else {
            return Ok(());
        };
        let value = column(candidate);
        let clash = rows
            .iter()
            .any(|row| row.key() != candidate.key() && column(row) == value);
        if clash {
            return Err(DataError::Conflict(format!("duplicate value '{value}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Entity> EntitySet<T> for MemorySet<T> {
    async fn find(&self, key: T::Key) -> Result<Option<T>, DataError> {
        Ok(self.lock().iter().find(|row| row.key() == key).cloned())
    }

    async fn load_all(&self) -> Result<Vec<T>, DataError> {
        Ok(self.rows())
    }

    async fn apply(&self, changes: Vec<Change<T>>) -> Result<u64, DataError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(DataError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut rows = self.lock();
        // Work on a copy so a failing change leaves the table untouched
        let mut staged = rows.clone();
        let mut affected = 0;

        for change in changes {
            match change {
                Change::Insert(entity) => {
                    if staged.iter().any(|row| row.key() == entity.key()) {
                        return Err(DataError::Conflict(format!("duplicate key {:?}", entity.key())));
                    }
                    self.check_unique(&staged, &entity)?;
                    staged.push(entity);
                    affected += 1;
                }
                Change::Update(entity) => {
                    self.check_unique(&staged, &entity)?;
                    if let Some(row) = staged.iter_mut().find(|row| row.key() == entity.key()) {
                        *row = entity;
                        affected += 1;
                    }
                }
                Change::Delete(key) => {
                    let before = staged.len();
                    staged.retain(|row| row.key() != key);
                    affected += (before - staged.len()) as u64;
                }
            }
        }

        *rows = staged;
        Ok(affected)
    }
}
