//! Client side of the comment, forum and checkout endpoints.
//!
//! These types play the part of the page: they hold the locally stored
//! pseudo-identity, validate before anything is sent, and rebuild the
//! comment tree from a fresh fetch after every change. Nothing is retried;
//! every failure ends the action and leaves the form as the user typed it.

pub mod api;
pub mod board;
pub mod checkout;
pub mod forum;

use thiserror::Error;

use crate::identity::StorageError;
use crate::utils::validation::ValidationError;

pub use api::{CheckoutApi, CommentApi, ForumApi, HttpApi};
pub use board::{CommentBoard, CommentForm};
pub use checkout::{CheckoutFlow, CheckoutSession, PaymentOutcome, PaymentProcessor};
pub use forum::{ForumBoard, ForumPostForm};

#[derive(Debug, Error)]
pub enum ClientError {
    /// Caught before any request was made.
    #[error("{message}")]
    Validation {
        rule: ValidationError,
        message: String,
    },
    /// The server's `{ error }` text, verbatim.
    #[error("{0}")]
    Server(String),
    #[error("{0}")]
    Transport(String),
    /// The payment processor's message, verbatim.
    #[error("{0}")]
    Payment(String),
    #[error("{0}")]
    NotAllowed(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClientError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Validation { .. })
    }
}
