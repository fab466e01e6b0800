//! Periodic refresh of the admin complaint list.
//!
//! Re-reads every complaint on a fixed interval and publishes the result
//! through a watch channel. The task ends once every receiver is dropped.

use std::time::Duration;

use aduan_common::AppResult;
use aduan_db::entities::complaint;
use chrono::{DateTime, Utc};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};
use tracing::{debug, info, warn};

use super::{
    complaint::ComplaintService,
    policy::{Caller, authorize_admin},
    query::ComplaintStats,
};

/// One refresh result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSnapshot {
    /// Complaints in admin order.
    pub complaints: Vec<complaint::Model>,
    pub stats: ComplaintStats,
    /// `None` until the first successful refresh.
    pub refreshed_at: Option<DateTime<Utc>>,
}

/// Keeps an admin's complaint list current.
pub struct AdminRefresher {
    service: ComplaintService,
    caller: Caller,
    period: Duration,
}

impl AdminRefresher {
    /// Create a refresher for `caller`, who must be an administrator.
    pub fn new(service: ComplaintService, caller: Caller, period: Duration) -> AppResult<Self> {
        authorize_admin(&caller)?;
        Ok(Self {
            service,
            caller,
            period: period.max(Duration::from_secs(1)),
        })
    }

    /// Load a fresh snapshot.
    pub async fn refresh_once(&self) -> AppResult<AdminSnapshot> {
        let complaints = self.service.list_all(&self.caller).await?;
        let stats = ComplaintStats::from_complaints(&complaints);
        Ok(AdminSnapshot {
            complaints,
            stats,
            refreshed_at: Some(Utc::now()),
        })
    }

    /// Refresh and publish. Returns `false` once nobody is listening.
    async fn tick(&self, tx: &watch::Sender<AdminSnapshot>) -> bool {
        match self.refresh_once().await {
            Ok(snapshot) => {
                debug!(total = snapshot.stats.total, "Admin list refreshed");
                tx.send(snapshot).is_ok()
            }
            Err(e) => {
                warn!(error = %e, "Admin list refresh failed; keeping previous snapshot");
                !tx.is_closed()
            }
        }
    }

    /// Start refreshing in the background.
    ///
    /// The first refresh happens immediately.
    pub fn spawn(self) -> (watch::Receiver<AdminSnapshot>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(AdminSnapshot::default());

        let handle = tokio::spawn(async move {
            let mut ticker = interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    () = tx.closed() => break,
                    _ = ticker.tick() => {
                        if !self.tick(&tx).await {
                            break;
                        }
                    }
                }
            }

            info!(admin_id = %self.caller.user_id, "Admin refresher stopped");
        });

        (rx, handle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{
        attachment::AttachmentPolicy,
        audit::AuditService,
        event_publisher::NoOpEventPublisher,
        policy::tests::{admin, complaint_owned_by, student},
        storage::NoOpStorage,
    };
    use aduan_common::AppError;
    use aduan_db::{
        entities::complaint::ComplaintStatus,
        repositories::{AuditLogRepository, ComplaintRepository, FeedbackRepository},
    };
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ComplaintService {
        let db = Arc::new(db);
        ComplaintService::new(
            ComplaintRepository::new(db.clone()),
            FeedbackRepository::new(db.clone()),
            AuditService::new(AuditLogRepository::new(db)),
            Arc::new(NoOpEventPublisher),
            Arc::new(NoOpStorage),
            AttachmentPolicy::default(),
        )
    }

    #[test]
    fn test_requires_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = AdminRefresher::new(service(db), student("s1"), Duration::from_secs(30));
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_failed_tick_keeps_previous_snapshot() {
        let complaint = complaint_owned_by("s1", ComplaintStatus::New);
        // One successful read, then the mock runs dry and errors.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[complaint]])
            .into_connection();
        let refresher =
            AdminRefresher::new(service(db), admin(), Duration::from_secs(30)).unwrap();

        let (tx, rx) = watch::channel(AdminSnapshot::default());

        assert!(refresher.tick(&tx).await);
        let first = rx.borrow().clone();
        assert_eq!(first.stats.total, 1);
        assert!(first.refreshed_at.is_some());

        assert!(refresher.tick(&tx).await);
        assert_eq!(*rx.borrow(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_publishes_and_stops_without_receivers() {
        let a = complaint_owned_by("s1", ComplaintStatus::New);
        let b = complaint_owned_by("s2", ComplaintStatus::Done);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[a.clone()]])
            .append_query_results([[a, b]])
            .into_connection();
        let refresher =
            AdminRefresher::new(service(db), admin(), Duration::from_secs(30)).unwrap();

        let (mut rx, handle) = refresher.spawn();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().stats.total, 1);

        rx.changed().await.unwrap();
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.stats.total, 2);
        assert_eq!(snapshot.stats.done, 1);

        drop(rx);
        handle.await.unwrap();
    }
}
