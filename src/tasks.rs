use rocket::fairing::{Fairing, Info, Kind};
use rocket::tokio;
use rocket::{Orbit, Rocket};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::notify::{run_badge_listener, BadgeBoard, Notifier};
use crate::rate_limit::RateLimiter;
use crate::store::Store;

pub struct BackgroundTasks;

#[rocket::async_trait]
impl Fairing for BackgroundTasks {
    fn info(&self) -> Info {
        Info {
            name: "Background Tasks",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let (store, board, notifier) = match (
            rocket.state::<Arc<dyn Store>>(),
            rocket.state::<Arc<BadgeBoard>>(),
            rocket.state::<Arc<Notifier>>(),
        ) {
            (Some(s), Some(b), Some(n)) => (Arc::clone(s), Arc::clone(b), Arc::clone(n)),
            _ => {
                log::error!("[task] Managed state missing, background tasks not started");
                return;
            }
        };
        let poll_secs = rocket
            .state::<AppConfig>()
            .map(|c| c.badge_poll_secs)
            .unwrap_or(30);

        if let Err(e) = board.refresh(&*store) {
            log::warn!("[task] Initial badge refresh failed: {}", e);
        }

        // Event-driven badge refresh
        tokio::spawn(run_badge_listener(
            notifier.subscribe(),
            Arc::clone(&store),
            Arc::clone(&board),
        ));

        // Badge polling, independent of events
        let s = Arc::clone(&store);
        let b = Arc::clone(&board);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(poll_secs));
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = b.refresh(&*s) {
                    log::warn!("[task] Badge poll failed: {}", e);
                }
            }
        });

        // Session cleanup
        let s = Arc::clone(&store);
        tokio::spawn(async move {
            loop {
                let interval = get_interval(&*s, "task_session_cleanup_interval", 30);
                tokio::time::sleep(Duration::from_secs(interval * 60)).await;
                let count = s.session_cleanup_expired();
                if count > 0 {
                    log::info!("[task] Cleaned up {} expired sessions", count);
                }
            }
        });

        // Rate limiter housekeeping
        if let Some(limiter) = rocket.state::<Arc<RateLimiter>>() {
            let limiter = Arc::clone(limiter);
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(Duration::from_secs(15 * 60)).await;
                    let dropped = limiter.cleanup(Duration::from_secs(60 * 60));
                    if dropped > 0 {
                        log::debug!("[task] Dropped {} idle rate-limit keys", dropped);
                    }
                }
            });
        }

        log::info!("[task] Background tasks started (badge poll every {}s)", poll_secs);
    }
}

fn get_interval(store: &dyn Store, key: &str, default: u64) -> u64 {
    store
        .setting_get_or(key, &default.to_string())
        .parse::<u64>()
        .unwrap_or(default)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::test_store;

    #[test]
    fn interval_falls_back_and_clamps() {
        let store = test_store();
        assert_eq!(get_interval(&store, "task_session_cleanup_interval", 99), 30);
        assert_eq!(get_interval(&store, "missing_key", 7), 7);
        store.setting_set("task_session_cleanup_interval", "0").unwrap();
        assert_eq!(get_interval(&store, "task_session_cleanup_interval", 30), 1);
        store.setting_set("task_session_cleanup_interval", "soon").unwrap();
        assert_eq!(get_interval(&store, "task_session_cleanup_interval", 30), 30);
    }
}
