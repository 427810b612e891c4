use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::Role;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

/// Process-local account store.
///
/// Backs the service when no database is configured, and the HTTP tests.
/// Every operation takes the lock once, so each read or write is atomic.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.email.as_str() == email).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.username == *username).cloned())
    }

    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().await;

        if accounts.iter().any(|a| a.username == account.username) {
            return Err(AccountError::DuplicateUser(format!(
                "username '{}'",
                account.username
            )));
        }
        if accounts.iter().any(|a| a.email == account.email) {
            return Err(AccountError::DuplicateUser(format!(
                "email '{}'",
                account.email
            )));
        }

        accounts.push(account.clone());
        Ok(account)
    }

    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<Option<Account>, AccountError> {
        let mut accounts = self.accounts.write().await;

        Ok(accounts
            .iter_mut()
            .find(|a| a.username == *username)
            .map(|a| {
                a.role = role;
                a.clone()
            }))
    }

    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Option<Account>, AccountError> {
        let mut accounts = self.accounts.write().await;

        Ok(accounts
            .iter_mut()
            .find(|a| a.username == *username)
            .map(|a| {
                a.password_hash = password_hash.to_string();
                a.clone()
            }))
    }

    async fn delete(&self, username: &Username) -> Result<Option<Account>, AccountError> {
        let mut accounts = self.accounts.write().await;
        let position = accounts.iter().position(|a| a.username == *username);

        Ok(position.map(|index| accounts.remove(index)))
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        Ok(self.accounts.read().await.clone())
    }
}
