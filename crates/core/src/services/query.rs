//! Read-side helpers over complaint lists: filtering, search, ordering and stats.
//!
//! All functions are pure. Callers pass the scope (a student's complaints or
//! the full admin list) explicitly.

use std::cmp::Reverse;

use aduan_db::entities::complaint::{self, ComplaintCategory, ComplaintStatus, Priority};
use serde::{Deserialize, Serialize};

/// Conjunctive filter. `None` criteria match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
    pub category: Option<ComplaintCategory>,
    pub priority: Option<Priority>,
}

impl ComplaintFilter {
    /// Filter with no criteria.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            status: None,
            category: None,
            priority: None,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: ComplaintStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: ComplaintCategory) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Whether no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none() && self.category.is_none() && self.priority.is_none()
    }

    /// Whether a complaint satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, complaint: &complaint::Model) -> bool {
        self.status.is_none_or(|s| complaint.status == s)
            && self.category.is_none_or(|c| complaint.category == c)
            && self.priority.is_none_or(|p| complaint.priority == p)
    }

    /// Matching complaints, order preserved.
    #[must_use]
    pub fn apply<'a>(&self, complaints: &'a [complaint::Model]) -> Vec<&'a complaint::Model> {
        complaints.iter().filter(|c| self.matches(c)).collect()
    }
}

/// Case-insensitive substring search over id, title and description.
///
/// A blank query matches everything.
#[must_use]
pub fn search<'a>(complaints: &'a [complaint::Model], query: &str) -> Vec<&'a complaint::Model> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return complaints.iter().collect();
    }

    complaints
        .iter()
        .filter(|c| {
            c.id.to_lowercase().contains(&needle)
                || c.title.to_lowercase().contains(&needle)
                || c.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Student view: newest first.
pub fn sort_newest_first(complaints: &mut [complaint::Model]) {
    complaints.sort_by_key(|c| Reverse(c.created_at));
}

/// Admin view: lowest status rank first (unread on top), then newest first.
pub fn sort_for_admin(complaints: &mut [complaint::Model]) {
    complaints.sort_by_key(|c| (c.status.rank(), Reverse(c.created_at)));
}

/// Totals shown in the admin dashboard header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintStats {
    pub total: u64,
    pub new: u64,
    pub read: u64,
    pub processing: u64,
    pub done: u64,
}

impl ComplaintStats {
    /// Count complaints per status.
    #[must_use]
    pub fn from_complaints(complaints: &[complaint::Model]) -> Self {
        complaints.iter().fold(Self::default(), |mut stats, c| {
            stats.add(c.status, 1);
            stats
        })
    }

    /// Add `count` complaints in `status`.
    pub fn add(&mut self, status: ComplaintStatus, count: u64) {
        self.total += count;
        *self.slot_mut(status) += count;
    }

    /// Count for a single status.
    #[must_use]
    pub const fn count(&self, status: ComplaintStatus) -> u64 {
        match status {
            ComplaintStatus::New => self.new,
            ComplaintStatus::Read => self.read,
            ComplaintStatus::Processing => self.processing,
            ComplaintStatus::Done => self.done,
        }
    }

    fn slot_mut(&mut self, status: ComplaintStatus) -> &mut u64 {
        match status {
            ComplaintStatus::New => &mut self.new,
            ComplaintStatus::Read => &mut self.read,
            ComplaintStatus::Processing => &mut self.processing,
            ComplaintStatus::Done => &mut self.done,
        }
    }
}
