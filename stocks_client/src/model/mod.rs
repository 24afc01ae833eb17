//! Dashboard state types.
//!
//! - `watchlist` — immutable watchlist snapshots and the `WatchlistStore` holding the current one.
//! - `feedback` — the single status message shown above the cards.
//! - `auth` — session status reported by the authentication provider.
//! - `card` — per-ticker quote display state.
pub mod auth;
pub mod card;
pub mod feedback;
pub mod watchlist;
