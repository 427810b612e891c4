use std::sync::Arc;

use auth::Authenticator;

use crate::access::errors::AccessError;
use crate::access::errors::UnauthenticatedReason;
use crate::access::models::Caller;
use crate::access::models::Requirement;
use crate::access::models::SessionClaims;

/// Per-request access decision.
///
/// `token -> Caller` when the signature and expiry check out, then
/// `Caller -> Caller` when its role satisfies the operation's requirement.
/// Claims are only ever read from a token that passed verification.
pub struct AccessGate {
    authenticator: Arc<Authenticator>,
}

impl AccessGate {
    pub fn new(authenticator: Arc<Authenticator>) -> Self {
        Self { authenticator }
    }

    /// Resolve the bearer token into a verified caller.
    ///
    /// # Errors
    /// * `Unauthenticated` - Token is missing, malformed, forged or expired
    pub fn authenticate(&self, token: Option<&str>) -> Result<Caller, AccessError> {
        let token = token.ok_or(UnauthenticatedReason::MissingToken)?;

        let claims: SessionClaims = self
            .authenticator
            .validate_token(token)
            .map_err(UnauthenticatedReason::from)?;

        Ok(Caller::try_from(claims)?)
    }

    /// Check a verified caller against an operation's requirement.
    ///
    /// # Errors
    /// * `Forbidden` - Caller's role is not in the allowed set
    pub fn authorize(&self, caller: Caller, requirement: Requirement) -> Result<Caller, AccessError> {
        if requirement.permits(caller.role) {
            Ok(caller)
        } else {
            Err(AccessError::Forbidden)
        }
    }

    /// Authenticate then authorize in one step.
    pub fn admit(
        &self,
        token: Option<&str>,
        requirement: Requirement,
    ) -> Result<Caller, AccessError> {
        let caller = self.authenticate(token)?;
        self.authorize(caller, requirement)
    }
}
