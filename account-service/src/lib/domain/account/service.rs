use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use chrono::Utc;
use futures::future::join_all;

use crate::access::models::Caller;
use crate::access::models::SessionClaims;
use crate::account::errors::AccountError;
use crate::account::models::AccessToken;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::AccountView;
use crate::account::models::RegisterCommand;
use crate::account::models::Role;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;

/// Domain service implementation for account operations.
///
/// Concrete implementation of AccountServicePort with dependency injection.
pub struct AccountService<AR>
where
    AR: AccountRepository,
{
    repository: Arc<AR>,
    authenticator: Arc<Authenticator>,
}

impl<AR> AccountService<AR>
where
    AR: AccountRepository,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password hasher and token issuer holding the signing key
    pub fn new(repository: Arc<AR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            repository,
            authenticator,
        }
    }

    fn issue_token(&self, account: &Account) -> Result<AccessToken, AccountError> {
        let claims =
            SessionClaims::for_account(account, Utc::now(), self.authenticator.token_ttl());
        let access_token = self.authenticator.generate_token(&claims)?;

        Ok(AccessToken { access_token })
    }
}

#[async_trait]
impl<AR> AccountServicePort for AccountService<AR>
where
    AR: AccountRepository,
{
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AccountError> {
        let Some(account) = self.repository.find_by_email(email).await? else {
            tracing::info!("Login rejected");
            return Err(self.authenticator.reject_unknown(password).into());
        };

        let claims =
            SessionClaims::for_account(&account, Utc::now(), self.authenticator.token_ttl());

        let result = self
            .authenticator
            .authenticate(password, &account.password_hash, &claims)
            .inspect_err(|_| tracing::info!("Login rejected"))?;

        tracing::info!(account_id = %account.id, role = %account.role, "Login succeeded");

        Ok(AccessToken {
            access_token: result.access_token,
        })
    }

    async fn register(&self, command: RegisterCommand) -> Result<AccessToken, AccountError> {
        let password_hash = self.authenticator.hash_password(&command.password)?;

        let account = Account {
            id: AccountId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            role: command.role,
            created_at: Utc::now(),
        };

        let created = self.repository.create(account).await?;

        tracing::info!(
            account_id = %created.id,
            username = %created.username,
            role = %created.role,
            "Account registered"
        );

        self.issue_token(&created)
    }

    async fn change_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<AccountView, AccountError> {
        let account = self
            .repository
            .update_role(username, role)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        tracing::info!(username = %username, role = %role, "Role changed");

        Ok(account.into())
    }

    async fn delete_account(&self, username: &Username) -> Result<(), AccountError> {
        self.repository
            .delete(username)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        tracing::info!(username = %username, "Account deleted");

        Ok(())
    }

    async fn delete_accounts(&self, usernames: &[Username]) -> Result<Vec<Username>, AccountError> {
        let outcomes = join_all(usernames.iter().map(|u| self.repository.delete(u))).await;

        let mut deleted = Vec::new();
        let mut failures = Vec::new();
        for (username, outcome) in usernames.iter().zip(outcomes) {
            match outcome {
                Ok(Some(_)) => deleted.push(username.clone()),
                Ok(None) => {}
                Err(e) => failures.push((username, e)),
            }
        }

        // Deletions that went through stay applied when the batch fails.
        if let Some((_, first_error)) = failures.first() {
            tracing::warn!(
                deleted = ?deleted.iter().map(Username::as_str).collect::<Vec<_>>(),
                failed = ?failures.iter().map(|(u, _)| u.as_str()).collect::<Vec<_>>(),
                error = %first_error,
                "Batch delete failed part way"
            );
            return Err(first_error.clone());
        }

        if deleted.is_empty() {
            return Err(AccountError::NotFound("no matching users".to_string()));
        }

        tracing::info!(
            requested = usernames.len(),
            deleted = deleted.len(),
            "Accounts deleted"
        );

        Ok(deleted)
    }

    async fn change_password(
        &self,
        caller: &Caller,
        username: &Username,
        new_password: &str,
    ) -> Result<(), AccountError> {
        if caller.username != *username && !caller.is_admin() {
            tracing::warn!(
                caller = %caller.username,
                target = %username,
                "Password change for another account refused"
            );
            return Err(AccountError::Forbidden);
        }

        let password_hash = self.authenticator.hash_password(new_password)?;

        self.repository
            .update_password_hash(username, &password_hash)
            .await?
            .ok_or_else(|| AccountError::NotFound(username.to_string()))?;

        tracing::info!(caller = %caller.username, target = %username, "Password changed");

        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<AccountView>, AccountError> {
        let accounts = self.repository.list_all().await?;

        Ok(accounts.iter().map(AccountView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use auth::PasswordHasher;
    use chrono::Duration;
    use mockall::mock;

    use super::*;
    use crate::account::models::EmailAddress;

    // Define mocks in the test module using mockall
    mock! {
        pub TestAccountRepository {}

        #[async_trait]
        impl AccountRepository for TestAccountRepository {
            async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError>;
            async fn find_by_username(&self, username: &Username) -> Result<Option<Account>, AccountError>;
            async fn create(&self, account: Account) -> Result<Account, AccountError>;
            async fn update_role(&self, username: &Username, role: Role) -> Result<Option<Account>, AccountError>;
            async fn update_password_hash(&self, username: &Username, password_hash: &str) -> Result<Option<Account>, AccountError>;
            async fn delete(&self, username: &Username) -> Result<Option<Account>, AccountError>;
            async fn list_all(&self) -> Result<Vec<Account>, AccountError>;
        }
    }

    const SECRET: &[u8] = b"service-test-secret-at-least-32-bytes";

    fn authenticator() -> Arc<Authenticator> {
        Arc::new(
            Authenticator::new(SECRET, Duration::hours(1))
                .with_password_hasher(PasswordHasher::with_cost(64, 1, 1).unwrap()),
        )
    }

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    fn account_with_password(name: &str, password: &str, role: Role) -> Account {
        Account {
            id: AccountId::new(),
            username: username(name),
            email: EmailAddress::new(format!("{}@example.com", name)).unwrap(),
            password_hash: authenticator().hash_password(password).unwrap(),
            role,
            created_at: Utc::now(),
        }
    }

    fn caller(name: &str, role: Role) -> Caller {
        Caller {
            id: AccountId::new(),
            username: username(name),
            email: format!("{}@example.com", name),
            role,
        }
    }

    #[tokio::test]
    async fn test_login_success_issues_verifiable_token() {
        let mut repository = MockTestAccountRepository::new();
        let stored = account_with_password("alice", "correct horse", Role::Admin);
        let stored_id = stored.id;

        repository
            .expect_find_by_email()
            .withf(|email| email == "alice@example.com")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let authenticator = authenticator();
        let service = AccountService::new(Arc::new(repository), Arc::clone(&authenticator));

        let token = service
            .login("alice@example.com", "correct horse")
            .await
            .expect("Login failed");

        let claims: SessionClaims = authenticator.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.registered.sub, stored_id.to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.registered.exp - claims.registered.iat, 3600);
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email_are_indistinguishable() {
        let mut repository = MockTestAccountRepository::new();
        let stored = account_with_password("alice", "correct horse", Role::User);

        repository
            .expect_find_by_email()
            .returning(move |email| {
                Ok((email == "alice@example.com").then(|| stored.clone()))
            });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let wrong_password = service
            .login("alice@example.com", "battery staple")
            .await
            .unwrap_err();
        let unknown_email = service
            .login("nobody@example.com", "correct horse")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AccountError::InvalidCredentials));
        assert!(matches!(unknown_email, AccountError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    }

    #[tokio::test]
    async fn test_login_store_failure_propagates() {
        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_find_by_email()
            .times(1)
            .returning(|_| Err(AccountError::StoreUnavailable("connection reset".to_string())));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.login("alice@example.com", "pw").await;
        assert!(matches!(result, Err(AccountError::StoreUnavailable(_))));
    }

    #[tokio::test]
    async fn test_register_hashes_password_and_logs_in() {
        let mut repository = MockTestAccountRepository::new();

        repository
            .expect_create()
            .withf(|account| {
                account.username.as_str() == "dave"
                    && account.email.as_str() == "dave@example.com"
                    && account.role == Role::User
                    && account.password_hash.starts_with("$argon2id$")
                    && !account.password_hash.contains("s3cret-pass")
            })
            .times(1)
            .returning(Ok);

        let authenticator = authenticator();
        let service = AccountService::new(Arc::new(repository), Arc::clone(&authenticator));

        let command = RegisterCommand::new(
            username("dave"),
            EmailAddress::new("dave@example.com".to_string()).unwrap(),
            "s3cret-pass".to_string(),
            Role::User,
        );

        let token = service.register(command).await.expect("Register failed");

        let claims: SessionClaims = authenticator.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.username, "dave");
        assert_eq!(claims.email, "dave@example.com");
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_register_duplicate_user() {
        let mut repository = MockTestAccountRepository::new();

        repository.expect_create().times(1).returning(|account| {
            Err(AccountError::DuplicateUser(format!(
                "username '{}'",
                account.username
            )))
        });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let command = RegisterCommand::new(
            username("dave"),
            EmailAddress::new("dave@example.com".to_string()).unwrap(),
            "s3cret-pass".to_string(),
            Role::User,
        );

        let result = service.register(command).await;
        assert!(matches!(result, Err(AccountError::DuplicateUser(_))));
    }

    #[tokio::test]
    async fn test_change_role_success() {
        let mut repository = MockTestAccountRepository::new();
        let stored = account_with_password("bob", "pw", Role::User);

        repository
            .expect_update_role()
            .withf(|name, role| name.as_str() == "bob" && *role == Role::Admin)
            .times(1)
            .returning(move |_, role| {
                let mut updated = stored.clone();
                updated.role = role;
                Ok(Some(updated))
            });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let view = service
            .change_role(&username("bob"), Role::Admin)
            .await
            .expect("Change role failed");

        assert_eq!(view.username, "bob");
        assert_eq!(view.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_change_role_not_found() {
        let mut repository = MockTestAccountRepository::new();

        repository
            .expect_update_role()
            .times(1)
            .returning(|_, _| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.change_role(&username("bob"), Role::Admin).await;
        assert!(matches!(result, Err(AccountError::NotFound(name)) if name == "bob"));
    }

    #[tokio::test]
    async fn test_delete_account_success() {
        let mut repository = MockTestAccountRepository::new();
        let stored = account_with_password("erin", "pw", Role::User);

        repository
            .expect_delete()
            .withf(|name| name.as_str() == "erin")
            .times(1)
            .returning(move |_| Ok(Some(stored.clone())));

        let service = AccountService::new(Arc::new(repository), authenticator());

        assert!(service.delete_account(&username("erin")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_account_not_found() {
        let mut repository = MockTestAccountRepository::new();
        repository.expect_delete().times(1).returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.delete_account(&username("erin")).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_accounts_partial_success() {
        let mut repository = MockTestAccountRepository::new();
        let a = account_with_password("a", "pw", Role::User);
        let c = account_with_password("c", "pw", Role::User);

        repository
            .expect_delete()
            .times(3)
            .returning(move |name| match name.as_str() {
                "a" => Ok(Some(a.clone())),
                "c" => Ok(Some(c.clone())),
                _ => Ok(None),
            });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let deleted = service
            .delete_accounts(&[username("a"), username("b"), username("c")])
            .await
            .expect("Batch delete failed");

        assert_eq!(deleted, vec![username("a"), username("c")]);
    }

    #[tokio::test]
    async fn test_delete_accounts_none_matched() {
        let mut repository = MockTestAccountRepository::new();
        repository.expect_delete().times(2).returning(|_| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .delete_accounts(&[username("x"), username("y")])
            .await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_accounts_empty_request() {
        let repository = MockTestAccountRepository::new();
        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service.delete_accounts(&[]).await;
        assert!(matches!(result, Err(AccountError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_accounts_store_failure_mid_batch() {
        let mut repository = MockTestAccountRepository::new();
        let applied = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&applied);

        repository
            .expect_delete()
            .times(3)
            .returning(move |name| {
                if name.as_str() == "b" {
                    return Err(AccountError::StoreUnavailable("timeout".to_string()));
                }
                recorded.lock().unwrap().push(name.as_str().to_string());
                Ok(Some(account_with_password(name.as_str(), "pw", Role::User)))
            });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .delete_accounts(&[username("a"), username("b"), username("c")])
            .await;

        assert!(matches!(result, Err(AccountError::StoreUnavailable(_))));

        let mut applied = applied.lock().unwrap().clone();
        applied.sort();
        assert_eq!(applied, vec!["a".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn test_change_own_password() {
        let mut repository = MockTestAccountRepository::new();
        let stored = account_with_password("frank", "old", Role::User);

        repository
            .expect_update_password_hash()
            .withf(|name, hash| {
                name.as_str() == "frank" && hash.starts_with("$argon2id$") && !hash.contains("new-pw")
            })
            .times(1)
            .returning(move |_, hash| {
                let mut updated = stored.clone();
                updated.password_hash = hash.to_string();
                Ok(Some(updated))
            });

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .change_password(&caller("frank", Role::User), &username("frank"), "new-pw")
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_change_other_password_requires_admin() {
        let mut repository = MockTestAccountRepository::new();
        repository.expect_update_password_hash().times(0);

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .change_password(&caller("mallory", Role::User), &username("frank"), "pwned")
            .await;
        assert!(matches!(result, Err(AccountError::Forbidden)));
    }

    #[tokio::test]
    async fn test_admin_changes_other_password_not_found() {
        let mut repository = MockTestAccountRepository::new();
        repository
            .expect_update_password_hash()
            .times(1)
            .returning(|_, _| Ok(None));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let result = service
            .change_password(&caller("root", Role::Admin), &username("ghost"), "pw")
            .await;
        assert!(matches!(result, Err(AccountError::NotFound(name)) if name == "ghost"));
    }

    #[tokio::test]
    async fn test_list_accounts_strips_password_hashes() {
        let mut repository = MockTestAccountRepository::new();
        let accounts = vec![
            account_with_password("gina", "pw1", Role::User),
            account_with_password("hank", "pw2", Role::Admin),
        ];

        repository
            .expect_list_all()
            .times(1)
            .returning(move || Ok(accounts.clone()));

        let service = AccountService::new(Arc::new(repository), authenticator());

        let views = service.list_accounts().await.expect("List failed");
        assert_eq!(views.len(), 2);

        let json = serde_json::to_string(&views).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$argon2"));
    }
}
