//! Session status as reported by the authentication provider.
//!
//! The dashboard never signs users in or out; it only reacts to the resolved value.
use std::fmt;

/// Tri-state session status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    /// The provider has not resolved the session yet.
    #[default]
    Unresolved,
    /// Resolved to guest mode.
    Unauthenticated,
    /// Resolved to an active session.
    Authenticated {
        /// Session user id, used as the key of the saved watchlist.
        user: String,
    },
}

impl AuthStatus {
    /// `true` once the provider has settled on a session state.
    pub fn is_resolved(&self) -> bool {
        !matches!(self, AuthStatus::Unresolved)
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthStatus::Unresolved => f.write_str("unresolved"),
            AuthStatus::Unauthenticated => f.write_str("guest"),
            AuthStatus::Authenticated { user } => write!(f, "signed in as {}", user),
        }
    }
}
