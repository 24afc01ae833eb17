//! Status/feedback message describing the most recent notable event.
use std::fmt;

use stocks_common::Ticker;

/// Latest notable event, rendered as a single line above the cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    /// Shown when the watchlist is empty and nothing else happened yet.
    GettingStarted,
    /// A ticker was added by the user.
    Added(Ticker),
    /// The user tried to add a ticker that is already tracked.
    AlreadyTracked(Ticker),
    /// The user removed a ticker.
    Removed(Ticker),
    /// The ticker was dropped because the quote provider does not know it.
    RemovedNotFound(Ticker),
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::GettingStarted => f.write_str("👋 Add a ticker to start tracking, e.g. AAPL"),
            Feedback::Added(ticker) => write!(f, "✅ Added {}", ticker),
            Feedback::AlreadyTracked(ticker) => write!(f, "❌ {} is already being tracked!", ticker),
            Feedback::Removed(ticker) => write!(f, "🗑 Removed {}", ticker),
            Feedback::RemovedNotFound(ticker) => {
                write!(f, "🔍 Removed {}: symbol not found", ticker)
            }
        }
    }
}

/// Holds the current feedback value. Each event overwrites the previous one.
#[derive(Debug, Clone, Default)]
pub struct FeedbackChannel {
    current: Option<Feedback>,
}

impl FeedbackChannel {
    /// Replaces the current message.
    pub fn set(&mut self, feedback: Feedback) {
        self.current = Some(feedback);
    }

    /// Clears the message.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The current message, if any.
    pub fn current(&self) -> Option<&Feedback> {
        self.current.as_ref()
    }

    /// `true` while no user-visible event happened since the last hydration.
    ///
    /// Flushes are suppressed in this state so an empty default never overwrites a
    /// backend value that has not been loaded yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.current, None | Some(Feedback::GettingStarted))
    }
}
