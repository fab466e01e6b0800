//! Complaint entity.

use std::fmt;
use std::str::FromStr;

use aduan_common::AppError;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Where a complaint is in its handling lifecycle.
///
/// Statuses only move forward, one step at a time:
/// `baru` -> `dibaca` -> `diproses` -> `selesai`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum ComplaintStatus {
    /// Submitted, not yet opened by an admin.
    #[sea_orm(string_value = "baru")]
    #[serde(rename = "baru")]
    #[default]
    New,
    /// Opened by an admin.
    #[sea_orm(string_value = "dibaca")]
    #[serde(rename = "dibaca")]
    Read,
    /// Being worked on.
    #[sea_orm(string_value = "diproses")]
    #[serde(rename = "diproses")]
    Processing,
    /// Resolved. Terminal.
    #[sea_orm(string_value = "selesai")]
    #[serde(rename = "selesai")]
    Done,
}

impl ComplaintStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::New, Self::Read, Self::Processing, Self::Done];

    /// The single legal successor, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::New => Some(Self::Read),
            Self::Read => Some(Self::Processing),
            Self::Processing => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Whether `target` is the legal next step from `self`.
    #[must_use]
    pub fn can_advance_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }

    /// Position in the lifecycle, starting at zero.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::New => 0,
            Self::Read => 1,
            Self::Processing => 2,
            Self::Done => 3,
        }
    }

    /// Whether no further transition exists.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "baru",
            Self::Read => "dibaca",
            Self::Processing => "diproses",
            Self::Done => "selesai",
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown complaint status: {s}")))
    }
}

/// Complaint category.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum ComplaintCategory {
    #[sea_orm(string_value = "akademik")]
    #[serde(rename = "akademik")]
    Academic,
    #[sea_orm(string_value = "kemudahan")]
    #[serde(rename = "kemudahan")]
    Facilities,
    #[sea_orm(string_value = "kantin")]
    #[serde(rename = "kantin")]
    Canteen,
    #[sea_orm(string_value = "perpustakaan")]
    #[serde(rename = "perpustakaan")]
    Library,
    #[sea_orm(string_value = "pengangkutan")]
    #[serde(rename = "pengangkutan")]
    Transport,
    #[sea_orm(string_value = "asrama")]
    #[serde(rename = "asrama")]
    Hostel,
    #[sea_orm(string_value = "lain-lain")]
    #[serde(rename = "lain-lain")]
    Other,
}

impl ComplaintCategory {
    /// All categories.
    pub const ALL: [Self; 7] = [
        Self::Academic,
        Self::Facilities,
        Self::Canteen,
        Self::Library,
        Self::Transport,
        Self::Hostel,
        Self::Other,
    ];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "akademik",
            Self::Facilities => "kemudahan",
            Self::Canteen => "kantin",
            Self::Library => "perpustakaan",
            Self::Transport => "pengangkutan",
            Self::Hostel => "asrama",
            Self::Other => "lain-lain",
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplaintCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown complaint category: {s}")))
    }
}

/// Triage priority, independent of status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[derive(Default)]
pub enum Priority {
    #[sea_orm(string_value = "rendah")]
    #[serde(rename = "rendah")]
    #[default]
    Low,
    #[sea_orm(string_value = "sederhana")]
    #[serde(rename = "sederhana")]
    Medium,
    #[sea_orm(string_value = "tinggi")]
    #[serde(rename = "tinggi")]
    High,
}

impl Priority {
    /// All priorities, lowest first.
    pub const ALL: [Self; 3] = [Self::Low, Self::Medium, Self::High];

    /// Stored value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "rendah",
            Self::Medium => "sederhana",
            Self::High => "tinggi",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|priority| priority.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown priority: {s}")))
    }
}

/// Complaint model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning student.
    pub student_id: String,

    /// Student name at submission time (denormalized).
    pub student_name: String,

    /// Student email at submission time (denormalized).
    pub student_email: String,

    pub category: ComplaintCategory,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Storage key of the attachment payload.
    #[sea_orm(nullable)]
    pub attachment_key: Option<String>,

    /// Original attachment file name.
    #[sea_orm(nullable)]
    pub attachment_name: Option<String>,

    /// Attachment MIME type.
    #[sea_orm(nullable)]
    pub attachment_type: Option<String>,

    /// Attachment size in bytes.
    #[sea_orm(nullable)]
    pub attachment_size: Option<i64>,

    pub status: ComplaintStatus,

    pub priority: Priority,

    /// Notes written by admins only.
    #[sea_orm(column_type = "Text", nullable)]
    pub admin_notes: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    /// Never earlier than `created_at`; strictly later after any mutation.
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the complaint carries an attachment.
    #[must_use]
    pub const fn has_attachment(&self) -> bool {
        self.attachment_key.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
    #[sea_orm(has_many = "super::feedback::Entity")]
    Feedback,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedback.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
