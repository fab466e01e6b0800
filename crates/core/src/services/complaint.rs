//! Complaint lifecycle service.
//!
//! Applies the authorization policy and the status state machine before any
//! read or write reaches the store. Audit entries and events are best-effort
//! and never fail an operation that already succeeded.

use aduan_common::{AppError, AppResult, IdGenerator};
use aduan_db::{
    entities::{
        complaint::{self, ComplaintCategory, ComplaintStatus, Priority},
        feedback,
    },
    repositories::{ComplaintRepository, FeedbackRepository},
};
use chrono::{SubsecRound, Utc};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::Validate;

use super::{
    attachment::{AttachmentInput, AttachmentPolicy, storage_key},
    audit::{AuditAction, AuditService},
    event_publisher::{ComplaintEvent, EventPublisherService},
    policy::{
        Caller, Denial, authorize_admin, authorize_create, authorize_feedback, authorize_modify,
        authorize_view,
    },
    query::{self, ComplaintFilter, ComplaintStats},
    storage::StorageService,
};

/// Maximum title length in characters.
const MAX_TITLE_LENGTH: u64 = 200;
/// Maximum description length in characters.
const MAX_DESCRIPTION_LENGTH: u64 = 5000;
/// Maximum feedback length in characters.
const MAX_FEEDBACK_LENGTH: usize = 2000;

/// Input for submitting a complaint.
#[derive(Debug, Clone, Validate)]
pub struct CreateComplaintInput {
    pub category: ComplaintCategory,
    #[validate(length(max = MAX_TITLE_LENGTH))]
    pub title: String,
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: String,
    pub attachment: Option<AttachmentInput>,
}

/// What to do with the attachment during an edit.
#[derive(Debug, Clone)]
pub enum AttachmentChange {
    Replace(AttachmentInput),
    Remove,
}

/// Input for editing a complaint. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditComplaintInput {
    #[validate(length(max = MAX_TITLE_LENGTH))]
    pub title: Option<String>,
    #[validate(length(max = MAX_DESCRIPTION_LENGTH))]
    pub description: Option<String>,
    pub category: Option<ComplaintCategory>,
    /// Admins only.
    pub priority: Option<Priority>,
    #[serde(skip)]
    pub attachment: Option<AttachmentChange>,
}

impl EditComplaintInput {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.attachment.is_none()
    }
}

/// Stored attachment metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredAttachment {
    key: String,
    name: String,
    content_type: String,
    size: i64,
}

impl StoredAttachment {
    fn describe(key: String, input: &AttachmentInput) -> Self {
        Self {
            key,
            name: input.file_name.clone(),
            content_type: input.content_type.trim().to_ascii_lowercase(),
            size: i64::try_from(input.data.len()).unwrap_or(i64::MAX),
        }
    }
}

/// Next `updated_at`: the current time, but always strictly after `previous`.
///
/// Truncated to microseconds, the store's precision.
#[must_use]
pub fn next_updated_at(previous: &DateTimeWithTimeZone) -> DateTimeWithTimeZone {
    let now: DateTimeWithTimeZone = Utc::now().trunc_subsecs(6).into();
    let floor = *previous + chrono::Duration::microseconds(1);
    now.max(floor)
}

/// Reject blank text. The value itself is stored as submitted.
fn ensure_present(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Build a freshly submitted complaint owned by `caller`.
fn new_complaint(
    caller: &Caller,
    id: String,
    category: ComplaintCategory,
    title: String,
    description: String,
    attachment: Option<StoredAttachment>,
) -> complaint::Model {
    let now: DateTimeWithTimeZone = Utc::now().trunc_subsecs(6).into();
    let (attachment_key, attachment_name, attachment_type, attachment_size) = match attachment {
        Some(a) => (Some(a.key), Some(a.name), Some(a.content_type), Some(a.size)),
        None => (None, None, None, None),
    };

    complaint::Model {
        id,
        student_id: caller.user_id.clone(),
        student_name: caller.name.clone(),
        student_email: caller.email.clone(),
        category,
        title,
        description,
        attachment_key,
        attachment_name,
        attachment_type,
        attachment_size,
        status: ComplaintStatus::New,
        priority: Priority::Low,
        admin_notes: None,
        created_at: now,
        updated_at: now,
    }
}

fn insertable(model: complaint::Model) -> complaint::ActiveModel {
    complaint::ActiveModel {
        id: Set(model.id),
        student_id: Set(model.student_id),
        student_name: Set(model.student_name),
        student_email: Set(model.student_email),
        category: Set(model.category),
        title: Set(model.title),
        description: Set(model.description),
        attachment_key: Set(model.attachment_key),
        attachment_name: Set(model.attachment_name),
        attachment_type: Set(model.attachment_type),
        attachment_size: Set(model.attachment_size),
        status: Set(model.status),
        priority: Set(model.priority),
        admin_notes: Set(model.admin_notes),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    }
}

/// Complaint lifecycle service.
#[derive(Clone)]
pub struct ComplaintService {
    complaint_repo: ComplaintRepository,
    feedback_repo: FeedbackRepository,
    audit: AuditService,
    events: EventPublisherService,
    storage: StorageService,
    attachment_policy: AttachmentPolicy,
    id_gen: IdGenerator,
}

impl ComplaintService {
    /// Create a new complaint service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        feedback_repo: FeedbackRepository,
        audit: AuditService,
        events: EventPublisherService,
        storage: StorageService,
        attachment_policy: AttachmentPolicy,
    ) -> Self {
        Self {
            complaint_repo,
            feedback_repo,
            audit,
            events,
            storage,
            attachment_policy,
            id_gen: IdGenerator::new(),
        }
    }

    async fn notify(&self, event: ComplaintEvent) {
        if let Err(e) = self.events.publish(event).await {
            warn!(error = %e, "Failed to publish complaint event");
        }
    }

    async fn discard_payload(&self, key: &str) {
        if let Err(e) = self.storage.delete(key).await {
            warn!(error = %e, key, "Failed to delete attachment payload");
        }
    }

    async fn store_attachment(
        &self,
        complaint_id: &str,
        input: &AttachmentInput,
    ) -> AppResult<StoredAttachment> {
        let key = storage_key(complaint_id, &self.id_gen.generate(), &input.file_name);
        let stored = StoredAttachment::describe(key, input);
        self.storage.save(&stored.key, &input.data).await?;
        Ok(stored)
    }

    // ========== Lifecycle ==========

    /// Submit a new complaint. Students only.
    pub async fn create(
        &self,
        caller: &Caller,
        input: CreateComplaintInput,
    ) -> AppResult<complaint::Model> {
        authorize_create(caller)?;
        input.validate()?;

        ensure_present(&input.title, "Title")?;
        ensure_present(&input.description, "Description")?;
        if let Some(attachment) = &input.attachment {
            self.attachment_policy.validate(attachment)?;
        }

        let id = self.id_gen.generate_complaint_id();
        let stored = match &input.attachment {
            Some(attachment) => Some(self.store_attachment(&id, attachment).await?),
            None => None,
        };
        let stored_key = stored.as_ref().map(|a| a.key.clone());

        let model = new_complaint(
            caller,
            id,
            input.category,
            input.title,
            input.description,
            stored,
        );
        let created = match self.complaint_repo.create(insertable(model)).await {
            Ok(created) => created,
            Err(e) => {
                if let Some(key) = stored_key {
                    self.discard_payload(&key).await;
                }
                return Err(e);
            }
        };

        info!(
            complaint_id = %created.id,
            student_id = %created.student_id,
            category = %created.category,
            "Complaint submitted"
        );
        self.audit
            .record(AuditAction::ComplaintCreated, &caller.user_id, created.id.as_str())
            .await;
        self.notify(ComplaintEvent::Created {
            id: created.id.clone(),
            student_id: created.student_id.clone(),
        })
        .await;

        Ok(created)
    }

    /// Read a complaint. Owner or admin.
    pub async fn get(&self, caller: &Caller, id: &str) -> AppResult<complaint::Model> {
        let complaint = self.complaint_repo.get_by_id(id).await?;
        authorize_view(caller, &complaint)?;
        Ok(complaint)
    }

    /// Move a complaint to its single legal next status. Admins only.
    pub async fn advance_status(
        &self,
        caller: &Caller,
        id: &str,
        target: ComplaintStatus,
    ) -> AppResult<complaint::Model> {
        authorize_admin(caller)?;

        let complaint = self.complaint_repo.get_by_id(id).await?;
        let from = complaint.status;
        if !from.can_advance_to(target) {
            return Err(AppError::InvalidTransition {
                from: from.to_string(),
                to: target.to_string(),
            });
        }

        let updated_at = next_updated_at(&complaint.updated_at);
        let mut active: complaint::ActiveModel = complaint.into();
        active.status = Set(target);
        active.updated_at = Set(updated_at);

        let updated = self.complaint_repo.update(active).await?;

        info!(complaint_id = %updated.id, %from, to = %target, "Complaint status advanced");
        self.audit
            .record(
                AuditAction::StatusAdvanced,
                &caller.user_id,
                format!("{}: {from} -> {target}", updated.id),
            )
            .await;
        self.notify(ComplaintEvent::StatusChanged {
            id: updated.id.clone(),
            student_id: updated.student_id.clone(),
            from,
            to: target,
        })
        .await;

        Ok(updated)
    }

    /// Set the priority at any status. Admins only.
    pub async fn set_priority(
        &self,
        caller: &Caller,
        id: &str,
        priority: Priority,
    ) -> AppResult<complaint::Model> {
        authorize_admin(caller)?;

        let complaint = self.complaint_repo.get_by_id(id).await?;
        let updated_at = next_updated_at(&complaint.updated_at);
        let mut active: complaint::ActiveModel = complaint.into();
        active.priority = Set(priority);
        active.updated_at = Set(updated_at);

        let updated = self.complaint_repo.update(active).await?;

        info!(complaint_id = %updated.id, %priority, "Complaint priority set");
        self.audit
            .record(
                AuditAction::PriorityChanged,
                &caller.user_id,
                format!("{}: {priority}", updated.id),
            )
            .await;
        self.notify(ComplaintEvent::PriorityChanged {
            id: updated.id.clone(),
            priority,
        })
        .await;

        Ok(updated)
    }

    /// Replace the admin notes. Blank notes clear them. Admins only.
    pub async fn set_admin_notes(
        &self,
        caller: &Caller,
        id: &str,
        notes: Option<String>,
    ) -> AppResult<complaint::Model> {
        authorize_admin(caller)?;

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let complaint = self.complaint_repo.get_by_id(id).await?;
        let updated_at = next_updated_at(&complaint.updated_at);
        let mut active: complaint::ActiveModel = complaint.into();
        active.admin_notes = Set(notes);
        active.updated_at = Set(updated_at);

        let updated = self.complaint_repo.update(active).await?;

        info!(complaint_id = %updated.id, "Admin notes updated");
        self.audit
            .record(AuditAction::AdminNotesUpdated, &caller.user_id, updated.id.as_str())
            .await;
        self.notify(ComplaintEvent::Updated {
            id: updated.id.clone(),
        })
        .await;

        Ok(updated)
    }

    /// Edit title, description, category, priority or attachment.
    ///
    /// Owning students may edit while the complaint is new or read and may
    /// not touch priority. Admins may edit at any status.
    pub async fn edit(
        &self,
        caller: &Caller,
        id: &str,
        input: EditComplaintInput,
    ) -> AppResult<complaint::Model> {
        input.validate()?;

        let complaint = self.complaint_repo.get_by_id(id).await?;
        authorize_modify(caller, &complaint)?;
        if input.priority.is_some() && !caller.is_admin() {
            return Err(Denial::PriorityIsAdminOwned.into());
        }
        if input.is_empty() {
            return Err(AppError::Validation("Nothing to update".to_string()));
        }

        if let Some(title) = &input.title {
            ensure_present(title, "Title")?;
        }
        if let Some(description) = &input.description {
            ensure_present(description, "Description")?;
        }
        if let Some(AttachmentChange::Replace(attachment)) = &input.attachment {
            self.attachment_policy.validate(attachment)?;
        }

        let old_key = complaint.attachment_key.clone();
        let updated_at = next_updated_at(&complaint.updated_at);
        let complaint_id = complaint.id.clone();
        let mut active: complaint::ActiveModel = complaint.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(priority) = input.priority {
            active.priority = Set(priority);
        }

        let attachment_changed = input.attachment.is_some();
        let mut new_key = None;
        match &input.attachment {
            Some(AttachmentChange::Replace(attachment)) => {
                let stored = self.store_attachment(&complaint_id, attachment).await?;
                new_key = Some(stored.key.clone());
                active.attachment_key = Set(Some(stored.key));
                active.attachment_name = Set(Some(stored.name));
                active.attachment_type = Set(Some(stored.content_type));
                active.attachment_size = Set(Some(stored.size));
            }
            Some(AttachmentChange::Remove) => {
                active.attachment_key = Set(None);
                active.attachment_name = Set(None);
                active.attachment_type = Set(None);
                active.attachment_size = Set(None);
            }
            None => {}
        }
        active.updated_at = Set(updated_at);

        let updated = match self.complaint_repo.update(active).await {
            Ok(updated) => updated,
            Err(e) => {
                if let Some(key) = new_key {
                    self.discard_payload(&key).await;
                }
                return Err(e);
            }
        };

        if let Some(old) = old_key.filter(|_| attachment_changed) {
            self.discard_payload(&old).await;
        }

        info!(complaint_id = %updated.id, editor = %caller.user_id, "Complaint edited");
        self.audit
            .record(AuditAction::ComplaintEdited, &caller.user_id, updated.id.as_str())
            .await;
        self.notify(ComplaintEvent::Updated {
            id: updated.id.clone(),
        })
        .await;

        Ok(updated)
    }

    /// Delete a complaint with its feedback and attachment payload.
    ///
    /// Feedback goes with the row through the foreign key cascade, so a failed
    /// delete leaves both in place. Returns `false` when there was nothing to
    /// delete.
    pub async fn delete(&self, caller: &Caller, id: &str) -> AppResult<bool> {
        let Some(complaint) = self.complaint_repo.find_by_id(id).await? else {
            return Ok(false);
        };
        authorize_modify(caller, &complaint)?;

        let removed = self.complaint_repo.delete(id).await?;
        if !removed {
            return Ok(false);
        }

        if let Some(key) = &complaint.attachment_key {
            self.discard_payload(key).await;
        }

        info!(complaint_id = %id, "Complaint deleted");
        self.audit
            .record(AuditAction::ComplaintDeleted, &caller.user_id, id)
            .await;
        self.notify(ComplaintEvent::Deleted {
            id: id.to_string(),
            student_id: complaint.student_id,
        })
        .await;

        Ok(true)
    }

    // ========== Feedback ==========

    /// Leave feedback on a finished complaint. Owning student only.
    pub async fn add_feedback(
        &self,
        caller: &Caller,
        id: &str,
        text: &str,
    ) -> AppResult<feedback::Model> {
        let complaint = self.complaint_repo.get_by_id(id).await?;
        authorize_feedback(caller, &complaint)?;

        if complaint.status != ComplaintStatus::Done {
            return Err(AppError::InvalidState(format!(
                "Feedback is only accepted once the complaint is {}, it is {}",
                ComplaintStatus::Done,
                complaint.status
            )));
        }

        ensure_present(text, "Feedback")?;
        if text.chars().count() > MAX_FEEDBACK_LENGTH {
            return Err(AppError::Validation("Feedback too long".to_string()));
        }

        let model = feedback::ActiveModel {
            id: Set(self.id_gen.generate()),
            complaint_id: Set(complaint.id.clone()),
            student_id: Set(caller.user_id.clone()),
            body: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        let created = self.feedback_repo.create(model).await?;

        info!(complaint_id = %complaint.id, feedback_id = %created.id, "Feedback added");
        self.audit
            .record(AuditAction::FeedbackAdded, &caller.user_id, complaint.id.as_str())
            .await;
        self.notify(ComplaintEvent::FeedbackAdded {
            id: complaint.id,
            feedback_id: created.id.clone(),
        })
        .await;

        Ok(created)
    }

    /// Feedback on a complaint, oldest first. Owner or admin.
    pub async fn list_feedback(
        &self,
        caller: &Caller,
        id: &str,
    ) -> AppResult<Vec<feedback::Model>> {
        let complaint = self.complaint_repo.get_by_id(id).await?;
        authorize_view(caller, &complaint)?;
        self.feedback_repo.find_by_complaint(id).await
    }

    // ========== Reads ==========

    /// A student's complaints, newest first. The student themself or an admin.
    pub async fn list_for_student(
        &self,
        caller: &Caller,
        student_id: &str,
    ) -> AppResult<Vec<complaint::Model>> {
        if !caller.is_admin() && caller.user_id != student_id {
            return Err(Denial::NotOwner.into());
        }
        debug!(student_id, "Listing complaints for student");
        let mut complaints = self.complaint_repo.find_by_student(student_id).await?;
        query::sort_newest_first(&mut complaints);
        Ok(complaints)
    }

    /// Every complaint in admin order. Admins only.
    pub async fn list_all(&self, caller: &Caller) -> AppResult<Vec<complaint::Model>> {
        authorize_admin(caller)?;
        let mut complaints = self.complaint_repo.find_all().await?;
        query::sort_for_admin(&mut complaints);
        Ok(complaints)
    }

    /// The complaints the caller can see: all for admins, their own for students.
    async fn scope(&self, caller: &Caller) -> AppResult<Vec<complaint::Model>> {
        if caller.is_admin() {
            self.list_all(caller).await
        } else {
            self.list_for_student(caller, &caller.user_id).await
        }
    }

    /// Complaints in the caller's scope matching every set criterion.
    pub async fn filter(
        &self,
        caller: &Caller,
        filter: &ComplaintFilter,
    ) -> AppResult<Vec<complaint::Model>> {
        if caller.is_admin() {
            let mut complaints = self
                .complaint_repo
                .find_filtered(filter.status, filter.category, filter.priority)
                .await?;
            query::sort_for_admin(&mut complaints);
            return Ok(complaints);
        }

        let own = self.scope(caller).await?;
        Ok(own.into_iter().filter(|c| filter.matches(c)).collect())
    }

    /// Substring search over id, title and description in the caller's scope.
    pub async fn search(
        &self,
        caller: &Caller,
        text: &str,
    ) -> AppResult<Vec<complaint::Model>> {
        let scope = self.scope(caller).await?;
        Ok(query::search(&scope, text).into_iter().cloned().collect())
    }

    /// Per-status totals over the caller's scope.
    pub async fn stats(&self, caller: &Caller) -> AppResult<ComplaintStats> {
        if caller.is_admin() {
            let mut stats = ComplaintStats::default();
            for status in ComplaintStatus::ALL {
                stats.add(status, self.complaint_repo.count_by_status(status).await?);
            }
            return Ok(stats);
        }

        let scope = self.scope(caller).await?;
        Ok(ComplaintStats::from_complaints(&scope))
    }
}
