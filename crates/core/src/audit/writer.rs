use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use super::{AuditEventEnvelope, AuditHandle, AuditRecord, AuditStore};

/// Drains the audit channel into an [`AuditStore`].
pub struct AuditWriter {
    rx: mpsc::Receiver<AuditEventEnvelope>,
    store: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(rx: mpsc::Receiver<AuditEventEnvelope>, store: Arc<dyn AuditStore>) -> Self {
        Self { rx, store }
    }

    /// Runs until every [`AuditHandle`] has been dropped. Insert failures
    /// are logged and skipped.
    pub async fn run(mut self) {
        info!("Audit writer started");
        let mut written = 0u64;
        while let Some(envelope) = self.rx.recv().await {
            let record = AuditRecord::from_event(envelope.timestamp, envelope.event);
            match self.store.insert(&record) {
                Ok(_) => written += 1,
                Err(e) => error!(event_type = %record.event_type, error = %e, "Failed to write audit event"),
            }
        }
        info!(written, "Audit writer stopped");
    }
}

/// A connected handle/writer pair. Spawn `writer.run()` and clone the handle
/// wherever events are emitted.
pub fn create_audit_system(
    store: Arc<dyn AuditStore>,
    buffer_size: usize,
) -> (AuditHandle, AuditWriter) {
    let (tx, rx) = mpsc::channel(buffer_size);
    (AuditHandle::new(tx), AuditWriter::new(rx, store))
}
