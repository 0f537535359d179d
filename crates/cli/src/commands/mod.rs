//! CLI command implementations.

pub mod cart;

use rocketshoes_storefront::{AppState, CartError, StateError, StorefrontConfig, TracingNotifier};
use thiserror::Error;

/// State used by every command. Notifications go to the log as `toast` events.
pub type CliState = AppState<TracingNotifier>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The cart store could not be opened.
    #[error("Failed to open cart: {0}")]
    State(#[from] StateError),

    /// A cart operation failed.
    #[error("Cart operation failed: {0}")]
    Cart(#[from] CartError),

    /// Output could not be serialized.
    #[error("Failed to serialize cart: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    /// Whether the user has already been told about this failure.
    #[must_use]
    pub const fn is_notified(&self) -> bool {
        matches!(self, Self::Cart(_))
    }
}

/// Open the cart store described by `config`.
///
/// # Errors
///
/// Returns `CommandError::State` if the API client cannot be built or the
/// persisted cart cannot be read.
pub fn open_state(config: StorefrontConfig) -> Result<CliState, CommandError> {
    Ok(AppState::new(config, TracingNotifier)?)
}
