use std::sync::{Arc, RwLock};

use rocket::tokio::sync::broadcast;
use serde::Serialize;

use crate::error::StoreResult;
use crate::models::submission::SubmissionKind;
use crate::store::Store;

/// Admin-side changes that can move a badge count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEvent {
    SubmissionCreated(SubmissionKind),
    StatusChanged(SubmissionKind),
    NotesSaved(SubmissionKind),
    SubmissionDeleted(SubmissionKind),
}

impl AdminEvent {
    pub fn kind(self) -> SubmissionKind {
        match self {
            AdminEvent::SubmissionCreated(k)
            | AdminEvent::StatusChanged(k)
            | AdminEvent::NotesSaved(k)
            | AdminEvent::SubmissionDeleted(k) => k,
        }
    }
}

/// Owner of the admin event channel. Emitters call `publish`; the badge
/// listener holds a receiver from `subscribe`.
pub struct Notifier {
    tx: broadcast::Sender<AdminEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Notifier { tx }
    }

    /// Returns the number of listeners that will see the event.
    pub fn publish(&self, event: AdminEvent) -> usize {
        match self.tx.send(event) {
            Ok(n) => n,
            // No listener yet (tests, or before liftoff). Nothing to refresh.
            Err(_) => 0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
        self.tx.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Notifier::new(64)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BadgeCounts {
    pub unread_contacts: i64,
    pub pending_franchise: i64,
}

/// Badge counts shown in the admin shell, refreshed by polling and by events.
#[derive(Default)]
pub struct BadgeBoard {
    counts: RwLock<BadgeCounts>,
}

impl BadgeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> BadgeCounts {
        self.counts.read().map(|c| *c).unwrap_or_default()
    }

    pub fn refresh(&self, store: &dyn Store) -> StoreResult<BadgeCounts> {
        let contact = SubmissionKind::Contact;
        let franchise = SubmissionKind::Franchise;
        let fresh = BadgeCounts {
            unread_contacts: store.submission_count(contact, Some(contact.badge_status()))?,
            pending_franchise: store.submission_count(franchise, Some(franchise.badge_status()))?,
        };
        if let Ok(mut c) = self.counts.write() {
            *c = fresh;
        }
        Ok(fresh)
    }
}

/// Refreshes the board on every event until the channel closes. A lagged
/// receiver still refreshes once, since the latest counts cover missed events.
pub async fn run_badge_listener(
    mut rx: broadcast::Receiver<AdminEvent>,
    store: Arc<dyn Store>,
    board: Arc<BadgeBoard>,
) {
    loop {
        match rx.recv().await {
            Ok(event) => log::debug!("[task] Badge refresh after {:?} on {}", event, event.kind().table()),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                log::debug!("[task] Badge listener skipped {} events", n)
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
        if let Err(e) = board.refresh(&*store) {
            log::warn!("[task] Badge refresh failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::NewSubmission;
    use crate::store::tests::test_store;
    use rocket::tokio;
    use std::time::Duration;

    fn contact() -> NewSubmission {
        NewSubmission {
            name: "王先生".into(),
            email: "wang@example.com".into(),
            phone: "13800138000".into(),
            city: None,
            message: "请问可以预订包间吗？".into(),
        }
    }

    #[test]
    fn publish_without_listener_is_harmless() {
        let n = Notifier::default();
        assert_eq!(n.publish(AdminEvent::StatusChanged(SubmissionKind::Contact)), 0);
        let _rx = n.subscribe();
        assert_eq!(n.publish(AdminEvent::StatusChanged(SubmissionKind::Contact)), 1);
    }

    #[test]
    fn refresh_counts_badge_statuses() {
        let store = test_store();
        let board = BadgeBoard::new();
        assert_eq!(board.get(), BadgeCounts::default());
        let sub = store.submission_create(SubmissionKind::Contact, &contact()).unwrap();
        assert_eq!(board.refresh(&store).unwrap().unread_contacts, 1);
        store.submission_update_status(SubmissionKind::Contact, sub.id, "replied").unwrap();
        board.refresh(&store).unwrap();
        assert_eq!(board.get().unread_contacts, 0);
    }

    #[rocket::async_test]
    async fn event_triggers_refresh_without_waiting_for_poll() {
        let store: Arc<dyn Store> = Arc::new(test_store());
        let board = Arc::new(BadgeBoard::new());
        let notifier = Notifier::default();
        let handle = tokio::spawn(run_badge_listener(
            notifier.subscribe(),
            Arc::clone(&store),
            Arc::clone(&board),
        ));

        store.submission_create(SubmissionKind::Contact, &contact()).unwrap();
        notifier.publish(AdminEvent::SubmissionCreated(SubmissionKind::Contact));

        let mut seen = 0;
        for _ in 0..50 {
            seen = board.get().unread_contacts;
            if seen == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(seen, 1);

        drop(notifier);
        handle.await.unwrap();
    }
}
