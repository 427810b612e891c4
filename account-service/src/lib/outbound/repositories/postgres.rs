use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::EmailAddress;
use crate::account::models::Role;
use crate::account::models::Username;
use crate::account::ports::AccountRepository;

const ACCOUNT_COLUMNS: &str = "id, username, email, password_hash, role, created_at";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &PgRow) -> Result<Account, AccountError> {
        let role: String = row.get("role");

        Ok(Account {
            id: AccountId(row.get("id")),
            username: Username::new(row.get("username"))?,
            email: EmailAddress::new(row.get("email"))?,
            password_hash: row.get("password_hash"),
            role: role.parse::<Role>()?,
            created_at: row.get("created_at"),
        })
    }

    fn optional_account(row: Option<PgRow>) -> Result<Option<Account>, AccountError> {
        row.as_ref().map(Self::row_to_account).transpose()
    }
}

fn store_error(e: sqlx::Error) -> AccountError {
    AccountError::StoreUnavailable(e.to_string())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Self::optional_account(row)
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE username = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Self::optional_account(row)
    }

    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            r#"
            INSERT INTO accounts (id, username, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id.0)
        .bind(account.username.as_str())
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    if db_err.constraint() == Some("accounts_username_key") {
                        return AccountError::DuplicateUser(format!(
                            "username '{}'",
                            account.username
                        ));
                    }
                    if db_err.constraint() == Some("accounts_email_key") {
                        return AccountError::DuplicateUser(format!("email '{}'", account.email));
                    }
                }
            }
            store_error(e)
        })?;

        Ok(account)
    }

    async fn update_role(
        &self,
        username: &Username,
        role: Role,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET role = $2 WHERE username = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(username.as_str())
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Self::optional_account(row)
    }

    async fn update_password_hash(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "UPDATE accounts SET password_hash = $2 WHERE username = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Self::optional_account(row)
    }

    async fn delete(&self, username: &Username) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "DELETE FROM accounts WHERE username = $1 RETURNING {}",
            ACCOUNT_COLUMNS
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        Self::optional_account(row)
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts ORDER BY created_at ASC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        rows.iter().map(Self::row_to_account).collect()
    }
}
