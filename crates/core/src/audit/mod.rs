//! Append-only audit trail of collection changes.
//!
//! Events travel from [`AuditHandle`]s through a bounded channel to a single
//! [`AuditWriter`] task that persists them.

mod events;
mod handle;
mod sqlite;
mod store;
mod writer;

pub use events::*;
pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use writer::*;
