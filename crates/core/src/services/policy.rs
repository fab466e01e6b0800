//! Authorization policy for complaint operations.
//!
//! Every check is a pure function over the caller and, where relevant, the
//! complaint record. Services call these before touching the store so a
//! denial never leaves a partial write behind.

use aduan_common::AppError;
use aduan_db::entities::{
    complaint::{self, ComplaintStatus},
    user::{self, UserRole},
};
use thiserror::Error;

/// Statuses in which the owning student may still edit or delete.
pub const STUDENT_EDIT_WINDOW: [ComplaintStatus; 2] = [ComplaintStatus::New, ComplaintStatus::Read];

/// Identity of the user performing an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: UserRole,
    pub name: String,
    pub email: String,
}

impl Caller {
    /// Build a caller from an authenticated user.
    #[must_use]
    pub fn from_user(user: &user::Model) -> Self {
        Self {
            user_id: user.id.clone(),
            role: user.role,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }

    /// Whether the caller is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Whether the caller owns the complaint.
    #[must_use]
    pub fn owns(&self, complaint: &complaint::Model) -> bool {
        self.user_id == complaint.student_id
    }
}

impl From<&user::Model> for Caller {
    fn from(user: &user::Model) -> Self {
        Self::from_user(user)
    }
}

/// Why an operation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Denial {
    #[error("only students can submit complaints")]
    StudentsOnly,

    #[error("administrator role required")]
    AdminOnly,

    #[error("complaint belongs to another student")]
    NotOwner,

    #[error("complaint can no longer be changed by the student (status {0})")]
    OutsideEditWindow(ComplaintStatus),

    #[error("priority is set by administrators")]
    PriorityIsAdminOwned,
}

impl From<Denial> for AppError {
    fn from(denial: Denial) -> Self {
        Self::Forbidden(denial.to_string())
    }
}

/// Whether a student may still change a complaint in this status.
#[must_use]
pub fn student_may_modify(status: ComplaintStatus) -> bool {
    STUDENT_EDIT_WINDOW.contains(&status)
}

/// Only students submit complaints.
pub fn authorize_create(caller: &Caller) -> Result<(), Denial> {
    match caller.role {
        UserRole::Student => Ok(()),
        UserRole::Admin => Err(Denial::StudentsOnly),
    }
}

/// Admin-only operations: status, priority, notes, full listing.
pub fn authorize_admin(caller: &Caller) -> Result<(), Denial> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(Denial::AdminOnly)
    }
}

/// Reading a complaint or its feedback.
pub fn authorize_view(caller: &Caller, complaint: &complaint::Model) -> Result<(), Denial> {
    if caller.is_admin() || caller.owns(complaint) {
        Ok(())
    } else {
        Err(Denial::NotOwner)
    }
}

/// Editing or deleting. Admins at any status, owners inside the edit window.
pub fn authorize_modify(caller: &Caller, complaint: &complaint::Model) -> Result<(), Denial> {
    if caller.is_admin() {
        return Ok(());
    }
    if !caller.owns(complaint) {
        return Err(Denial::NotOwner);
    }
    if !student_may_modify(complaint.status) {
        return Err(Denial::OutsideEditWindow(complaint.status));
    }
    Ok(())
}

/// Leaving feedback. Only the owning student; the status check is separate.
pub fn authorize_feedback(caller: &Caller, complaint: &complaint::Model) -> Result<(), Denial> {
    if caller.role != UserRole::Student || !caller.owns(complaint) {
        return Err(Denial::NotOwner);
    }
    Ok(())
}
