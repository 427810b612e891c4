use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::access::errors::UnauthenticatedReason;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::Role;
use crate::account::models::Username;

/// Identity claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionClaims {
    #[serde(flatten)]
    pub registered: auth::Claims,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl SessionClaims {
    /// Claims for `account`, issued at `issued_at` and valid for `ttl`.
    pub fn for_account(account: &Account, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            registered: auth::Claims::issued_at(account.id, issued_at, ttl),
            username: account.username.as_str().to_string(),
            email: account.email.as_str().to_string(),
            role: account.role,
        }
    }
}

/// Verified identity of the account making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: AccountId,
    pub username: Username,
    pub email: String,
    pub role: Role,
}

impl Caller {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl TryFrom<SessionClaims> for Caller {
    type Error = UnauthenticatedReason;

    fn try_from(claims: SessionClaims) -> Result<Self, Self::Error> {
        let id = AccountId::from_string(&claims.registered.sub)
            .map_err(|e| UnauthenticatedReason::Claims(e.to_string()))?;
        let username = Username::new(claims.username)
            .map_err(|e| UnauthenticatedReason::Claims(e.to_string()))?;

        Ok(Self {
            id,
            username,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// What an operation demands of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any verified identity.
    Authenticated,
    /// A verified identity whose role is in the set.
    AnyRole(&'static [Role]),
}

impl Requirement {
    pub const ADMIN: Requirement = Requirement::AnyRole(&[Role::Admin]);

    pub fn permits(&self, role: Role) -> bool {
        match self {
            Requirement::Authenticated => true,
            Requirement::AnyRole(allowed) => allowed.contains(&role),
        }
    }
}
