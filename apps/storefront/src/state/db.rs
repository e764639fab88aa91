//! # Database State
//!
//! Wraps the `Database` handle for the command layer.
//!
//! The pool inside is thread-safe; commands share it without extra locking.

use florals_db::{Database, OrderRepository};

#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// The inner database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let order = state.db.inner().orders().require(&id).await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Shorthand for `inner().orders()`.
    pub fn orders(&self) -> OrderRepository {
        self.db.orders()
    }
}
