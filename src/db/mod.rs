//! Account and task storage.
//!
//! Handlers talk to storage only through the [`Store`] trait. The crate ships
//! an in-process [`MemoryStore`]; a relational backend plugs in by
//! implementing the same trait.
//!
//! ```rust,ignore
//! use tasker::db::{MemoryStore, Store};
//! use std::sync::Arc;
//!
//! let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
//! let account = store.find_account_by_email("ada@example.com").await?;
//! ```

/// In-process store backed by `parking_lot` locks.
pub mod memory;
/// Stored records and their owner relation.
pub mod models;

pub use memory::MemoryStore;
pub use models::{Account, NewAccount, NewTask, Task};

use crate::types::Result;
use async_trait::async_trait;

/// Persistence operations the HTTP layer depends on.
///
/// Email lookups are case-insensitive. Creating or updating an account with an
/// email that is already taken fails with `AppError::InvalidInput`.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_account(&self, new: NewAccount) -> Result<Account>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>>;

    async fn list_accounts(&self) -> Result<Vec<Account>>;

    /// Replace a stored account. Fails with `NotFound` if it no longer exists.
    async fn update_account(&self, account: Account) -> Result<Account>;

    /// Delete an account and every task it owns. Returns whether it existed.
    async fn delete_account(&self, id: i64) -> Result<bool>;

    async fn create_task(&self, new: NewTask) -> Result<Task>;

    async fn find_task(&self, id: i64) -> Result<Option<Task>>;

    async fn list_tasks_for(&self, owner_id: i64) -> Result<Vec<Task>>;

    async fn list_tasks(&self) -> Result<Vec<Task>>;

    /// Replace a stored task. The stored owner is kept regardless of the
    /// `owner_id` passed in.
    async fn update_task(&self, task: Task) -> Result<Task>;

    async fn delete_task(&self, id: i64) -> Result<bool>;
}
