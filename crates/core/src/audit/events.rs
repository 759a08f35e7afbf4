use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CardId;
use crate::importer::ImportReport;
use crate::wishlist::{Priority, WishlistId};

/// Everything worth recording about changes to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    ServiceStarted {
        version: String,
        config_hash: String,
    },
    ServiceStopped {
        reason: String,
    },

    /// One ownership mutation and what it did.
    OwnershipChanged {
        user_id: String,
        card_id: CardId,
        /// "mark_owned", "increment", "set_quantity", "mark_unowned" or "toggle"
        operation: String,
        /// `MutationOutcome` label
        outcome: String,
        /// Quantity held afterwards, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quantity: Option<u32>,
    },

    WishlistItemAdded {
        user_id: String,
        wishlist_id: WishlistId,
        card_id: CardId,
        priority: Priority,
    },
    WishlistItemUpdated {
        user_id: String,
        wishlist_id: WishlistId,
        card_id: CardId,
        priority: Priority,
    },
    WishlistItemRemoved {
        user_id: String,
        wishlist_id: WishlistId,
    },

    PreferenceChanged {
        user_id: String,
        key: String,
        value: String,
    },

    CatalogImported {
        user_id: String,
        languages: Vec<String>,
        report: ImportReport,
    },
}

impl AuditEvent {
    /// Storage label, also the `event_type` filter value.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ServiceStarted { .. } => "service_started",
            Self::ServiceStopped { .. } => "service_stopped",
            Self::OwnershipChanged { .. } => "ownership_changed",
            Self::WishlistItemAdded { .. } => "wishlist_item_added",
            Self::WishlistItemUpdated { .. } => "wishlist_item_updated",
            Self::WishlistItemRemoved { .. } => "wishlist_item_removed",
            Self::PreferenceChanged { .. } => "preference_changed",
            Self::CatalogImported { .. } => "catalog_imported",
        }
    }

    pub fn card_id(&self) -> Option<CardId> {
        match self {
            Self::OwnershipChanged { card_id, .. }
            | Self::WishlistItemAdded { card_id, .. }
            | Self::WishlistItemUpdated { card_id, .. } => Some(*card_id),
            _ => None,
        }
    }

    /// The user whose action produced the event. Service lifecycle events
    /// have none.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::OwnershipChanged { user_id, .. }
            | Self::WishlistItemAdded { user_id, .. }
            | Self::WishlistItemUpdated { user_id, .. }
            | Self::WishlistItemRemoved { user_id, .. }
            | Self::PreferenceChanged { user_id, .. }
            | Self::CatalogImported { user_id, .. } => Some(user_id),
            Self::ServiceStarted { .. } | Self::ServiceStopped { .. } => None,
        }
    }
}

/// A stored event with its metadata columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub event_type: String,
    pub card_id: Option<CardId>,
    pub user_id: Option<String>,
    pub data: AuditEvent,
}

impl AuditRecord {
    /// A record ready for insertion; the store assigns the id.
    pub fn from_event(timestamp: DateTime<Utc>, event: AuditEvent) -> Self {
        Self {
            id: 0,
            timestamp,
            event_type: event.event_type().to_string(),
            card_id: event.card_id(),
            user_id: event.user_id().map(String::from),
            data: event,
        }
    }
}
