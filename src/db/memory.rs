use super::Store;
use super::models::{Account, NewAccount, NewTask, Task, normalize_email};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    tasks: BTreeMap<i64, Task>,
    next_account_id: i64,
    next_task_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.accounts
            .values()
            .any(|a| a.email == email && Some(a.id) != except)
    }
}

/// Ephemeral store. Ids start at 1 and are never reused.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(&self, new: NewAccount) -> Result<Account> {
        let email = normalize_email(&new.email);
        let mut tables = self.tables.write();

        if tables.email_taken(&email, None) {
            return Err(AppError::InvalidInput("User already exists".to_string()));
        }

        tables.next_account_id += 1;
        let account = Account {
            id: tables.next_account_id,
            email,
            first_name: new.first_name,
            last_name: new.last_name,
            phone_number: new.phone_number,
            role: new.role,
            profile: new.profile,
            credential: new.credential,
            created_at: Utc::now(),
        };
        tables.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let email = normalize_email(email);
        let tables = self.tables.read();
        Ok(tables.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_account_by_id(&self, id: i64) -> Result<Option<Account>> {
        Ok(self.tables.read().accounts.get(&id).cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>> {
        Ok(self.tables.read().accounts.values().cloned().collect())
    }

    async fn update_account(&self, mut account: Account) -> Result<Account> {
        account.email = normalize_email(&account.email);
        let mut tables = self.tables.write();

        if !tables.accounts.contains_key(&account.id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }
        if tables.email_taken(&account.email, Some(account.id)) {
            return Err(AppError::InvalidInput("User already exists".to_string()));
        }

        tables.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn delete_account(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.write();
        let existed = tables.accounts.remove(&id).is_some();
        if existed {
            tables.tasks.retain(|_, t| t.owner_id != id);
        }
        Ok(existed)
    }

    async fn create_task(&self, new: NewTask) -> Result<Task> {
        let mut tables = self.tables.write();

        if !tables.accounts.contains_key(&new.owner_id) {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tables.next_task_id += 1;
        let task = Task {
            id: tables.next_task_id,
            owner_id: new.owner_id,
            title: new.title,
            description: new.description,
            priority: new.priority,
            status: new.status,
            due_date: new.due_date,
            created_at: Utc::now(),
            updated_at: None,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(task)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.tables.read().tasks.get(&id).cloned())
    }

    async fn list_tasks_for(&self, owner_id: i64) -> Result<Vec<Task>> {
        let tables = self.tables.read();
        Ok(tables
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>> {
        Ok(self.tables.read().tasks.values().cloned().collect())
    }

    async fn update_task(&self, mut task: Task) -> Result<Task> {
        let mut tables = self.tables.write();

        let Some(stored) = tables.tasks.get(&task.id) else {
            return Err(AppError::NotFound("Task not found".to_string()));
        };
        task.owner_id = stored.owner_id;
        task.created_at = stored.created_at;

        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        Ok(self.tables.write().tasks.remove(&id).is_some())
    }
}
