//! Client side of the collection API: the HTTP client, the per-card
//! in-flight guard and the toggle session that drives one set screen.

mod http;
mod inflight;
mod session;

pub use http::{HttpClientConfig, HttpCollectionClient};
pub use inflight::{InFlightGuard, InFlightTicket};
pub use session::{CardState, ToggleError, ToggleSession};

use async_trait::async_trait;
use thiserror::Error;

use crate::catalog::{CardId, SetId};
use crate::listing::{CardListing, SetListing};

#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e.to_string())
    }
}

/// The calls a set screen needs.
#[async_trait]
pub trait CollectionApi: Send + Sync {
    async fn set_cards(&self, set_id: SetId) -> Result<Vec<CardListing>, ClientError>;

    async fn set(&self, set_id: SetId) -> Result<SetListing, ClientError>;

    async fn mark_owned(&self, card_id: CardId) -> Result<(), ClientError>;

    async fn mark_unowned(&self, card_id: CardId) -> Result<(), ClientError>;
}
