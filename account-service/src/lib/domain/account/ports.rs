use async_trait::async_trait;

use crate::access::models::Caller;
use crate::account::errors::AccountError;
use crate::account::models::AccessToken;
use crate::account::models::Account;
use crate::account::models::AccountView;
use crate::account::models::RegisterCommand;
use crate::account::models::Role;
use crate::account::models::Username;

/// Port for the authentication and account management operations.
///
/// Access control has already been applied by the time these run; the only
/// identity check performed here is the ownership rule of
/// [`change_password`](AccountServicePort::change_password).
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Exchange email and password for an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `StoreUnavailable` - Store operation failed
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AccountError>;

    /// Create an account and log it in.
    ///
    /// # Errors
    /// * `DuplicateUser` - Username or email is already registered
    /// * `StoreUnavailable` - Store operation failed
    async fn register(&self, command: RegisterCommand) -> Result<AccessToken, AccountError>;

    /// Change the role of an account.
    ///
    /// # Errors
    /// * `NotFound` - No account with this username
    /// * `StoreUnavailable` - Store operation failed
    async fn change_role(&self, username: &Username, role: Role)
        -> Result<AccountView, AccountError>;

    /// Delete one account.
    ///
    /// # Errors
    /// * `NotFound` - No account with this username
    /// * `StoreUnavailable` - Store operation failed
    async fn delete_account(&self, username: &Username) -> Result<(), AccountError>;

    /// Delete every listed account that exists.
    ///
    /// # Returns
    /// Usernames actually deleted, in request order
    ///
    /// # Errors
    /// * `NotFound` - None of the usernames matched an account
    /// * `StoreUnavailable` - Store operation failed
    async fn delete_accounts(&self, usernames: &[Username]) -> Result<Vec<Username>, AccountError>;

    /// Set a new password for `username`.
    ///
    /// # Errors
    /// * `Forbidden` - Caller is not `username` and is not an admin
    /// * `NotFound` - No account with this username
    /// * `StoreUnavailable` - Store operation failed
    async fn change_password(
        &self,
        caller: &Caller,
        username: &Username,
        new_password: &str,
    ) -> Result<(), AccountError>;

    /// List every account.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn list_accounts(&self) -> Result<Vec<AccountView>, AccountError>;
}

/// Persistence operations for the account aggregate (the User Store).
///
/// Lookups are case-sensitive exact matches. Mutations that target a missing
/// account return `Ok(None)` and change nothing.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Retrieve account by email address.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by username.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<Account>, AccountError>;

    /// Persist a new account.
    ///
    /// # Errors
    /// * `DuplicateUser` - Username or email is already taken
    /// * `StoreUnavailable` - Store operation failed
    async fn create(&self, account: Account) -> Result<Account, AccountError>;

    /// Set the role of an account, returning the updated record.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<Option<Account>, AccountError>;

    /// Replace the password hash of an account, returning the updated record.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Option<Account>, AccountError>;

    /// Remove an account, returning the removed record.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn delete(&self, username: &Username) -> Result<Option<Account>, AccountError>;

    /// Retrieve all accounts.
    ///
    /// # Errors
    /// * `StoreUnavailable` - Store operation failed
    async fn list_all(&self) -> Result<Vec<Account>, AccountError>;
}
