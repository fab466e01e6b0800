//! Database entities.

pub mod audit_log;
pub mod complaint;
pub mod feedback;
pub mod user;

pub use audit_log::Entity as AuditLog;
pub use complaint::Entity as Complaint;
pub use feedback::Entity as Feedback;
pub use user::Entity as User;
