//! Repositories: one per stored collection.

mod audit_log;
mod complaint;
mod feedback;
mod user;

pub use audit_log::AuditLogRepository;
pub use complaint::ComplaintRepository;
pub use feedback::FeedbackRepository;
pub use user::UserRepository;
