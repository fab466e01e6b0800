//! Complaint lifecycle, authorization and account logic.

pub mod services;

pub use services::*;

use std::sync::Arc;

use aduan_common::Config;
use aduan_db::repositories::{
    AuditLogRepository, ComplaintRepository, FeedbackRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Every service wired to one connection.
#[derive(Clone)]
pub struct Services {
    pub accounts: AccountService,
    pub complaints: ComplaintService,
    pub audit: AuditService,
}

impl Services {
    /// Wire services over `db` using the given event publisher and storage backend.
    #[must_use]
    pub fn new(
        db: &Arc<DatabaseConnection>,
        config: &Config,
        events: EventPublisherService,
        storage: StorageService,
    ) -> Self {
        let audit = AuditService::new(AuditLogRepository::new(Arc::clone(db)));
        let accounts = AccountService::new(UserRepository::new(Arc::clone(db)), audit.clone());
        let complaints = ComplaintService::new(
            ComplaintRepository::new(Arc::clone(db)),
            FeedbackRepository::new(Arc::clone(db)),
            audit.clone(),
            events,
            storage,
            AttachmentPolicy::from_config(&config.attachments),
        );

        Self {
            accounts,
            complaints,
            audit,
        }
    }

    /// Wire services with local file storage from `config.storage`.
    #[must_use]
    pub fn with_local_storage(
        db: &Arc<DatabaseConnection>,
        config: &Config,
        events: EventPublisherService,
    ) -> Self {
        let storage: StorageService = Arc::new(LocalStorage::new(&config.storage.base_path));
        Self::new(db, config, events, storage)
    }
}
