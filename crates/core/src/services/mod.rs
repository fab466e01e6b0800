//! Business logic services.

#![allow(missing_docs)]

pub mod account;
pub mod attachment;
pub mod audit;
pub mod complaint;
pub mod event_publisher;
pub mod policy;
pub mod query;
pub mod refresh;
pub mod storage;

pub use account::{AccountService, RegisterInput};
pub use attachment::{AttachmentInput, AttachmentPolicy};
pub use audit::{AuditAction, AuditService};
pub use complaint::{AttachmentChange, ComplaintService, CreateComplaintInput, EditComplaintInput};
pub use event_publisher::{
    BroadcastEventPublisher, ComplaintEvent, EventPublisher, EventPublisherService,
    NoOpEventPublisher,
};
pub use policy::{Caller, Denial};
pub use query::{ComplaintFilter, ComplaintStats};
pub use refresh::{AdminRefresher, AdminSnapshot};
pub use storage::{LocalStorage, NoOpStorage, StorageBackend, StorageService};
