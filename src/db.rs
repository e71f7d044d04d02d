use std::sync::Arc;

use crate::audit::AuditLog;
use crate::store::Store;

/// Handles to the store and its audit log, shared by every connection
#[derive(Clone)]
pub struct Db {
    store: Arc<Store>,
    audit: Arc<AuditLog>,
}

impl Db {
    pub fn new(store: Store, audit: AuditLog) -> Self {
        Self {
            store: Arc::new(store),
            audit: Arc::new(audit),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::new(Store::new(), AuditLog::new())
    }
}
