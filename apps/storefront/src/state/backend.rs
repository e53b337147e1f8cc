//! # Cart Backends
//!
//! Where a session's cart lines are persisted.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AuthState::Guest          ──► LocalCart   (guest cart JSON file)       │
//! │  AuthState::Authenticated  ──► RemoteCart  (cart_lines of the account)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The active backend is a pure function of the authentication state
//! ([`backend_kind`]). Backends never merge: switching discards the other
//! backend's lines from the session.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use vitrine_core::CartItem;
use vitrine_db::DbError;

use super::session::AuthState;

/// Which backend a session is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Local,
    Remote,
}

/// The backend an authentication state calls for.
pub fn backend_kind(auth: &AuthState) -> BackendKind {
    match auth {
        AuthState::Guest => BackendKind::Local,
        AuthState::Authenticated { .. } => BackendKind::Remote,
    }
}

/// One line-level change to push to a backend.
#[derive(Debug, Clone, Copy)]
pub enum CartChange<'a> {
    /// The line now has this quantity (created if new).
    Upserted(&'a CartItem),
    /// The line is gone.
    Removed(&'a CartItem),
    /// Every line is gone.
    Cleared,
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Local guest storage could not be read or written.
    #[error("Guest cart storage failed: {0}")]
    Storage(String),

    /// The account cart store refused or could not be reached.
    #[error("Cart store failed: {0}")]
    Upstream(#[from] DbError),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Storage(err.to_string())
    }
}

/// A place cart lines live.
#[async_trait]
pub trait CartBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Every persisted line, in display order.
    async fn load(&self) -> Result<Vec<CartItem>, BackendError>;

    /// Persists `change`. `snapshot` is the whole cart after the change, for
    /// backends that store the cart wholesale.
    ///
    /// ## Returns
    /// The backend's own id for an upserted line when it assigns one.
    async fn persist(
        &self,
        change: CartChange<'_>,
        snapshot: &[CartItem],
    ) -> Result<Option<String>, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitrine_core::{Account, Role};

    #[test]
    fn test_backend_follows_auth_state() {
        assert_eq!(backend_kind(&AuthState::Guest), BackendKind::Local);

        let account = Account {
            id: "acc-1".to_string(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            phone: None,
            role: Role::Customer,
            active: true,
            created_at: Utc::now(),
        };
        let auth = AuthState::Authenticated {
            account,
            token: "t".to_string(),
        };
        assert_eq!(backend_kind(&auth), BackendKind::Remote);
    }
}
