use std::sync::Arc;

use rocket::request::FlashMessage;
use rocket::State;
use rocket_dyn_templates::Template;
use serde::Serialize;
use serde_json::json;

use super::base_context;
use crate::error::StoreResult;
use crate::models::collection::Collection;
use crate::models::submission::{Submission, SubmissionKind};
use crate::notify::BadgeBoard;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

#[derive(Debug, Serialize, PartialEq)]
pub struct DashboardStats {
    pub pending_applications: i64,
    pub total_applications: i64,
    pub unread_contacts: i64,
    pub stores: i64,
    pub menu_items: i64,
}

pub fn load_stats(store: &dyn Store) -> StoreResult<(DashboardStats, Vec<Submission>)> {
    let franchise = SubmissionKind::Franchise;
    let contact = SubmissionKind::Contact;
    let stats = DashboardStats {
        pending_applications: store.submission_count(franchise, Some(franchise.badge_status()))?,
        total_applications: store.submission_count(franchise, None)?,
        unread_contacts: store.submission_count(contact, Some(contact.badge_status()))?,
        stores: store.collection_count(Collection::Stores)?,
        menu_items: store.collection_count(Collection::MenuItems)?,
    };
    let mut recent = store.submission_list(franchise)?;
    recent.truncate(5);
    Ok((stats, recent))
}

#[get("/")]
pub fn dashboard(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let mut context = base_context(slug, &admin, board, "仪表盘", flash);
    match load_stats(&***store) {
        Ok((stats, recent)) => {
            let recent: Vec<_> = recent
                .iter()
                .map(|s| {
                    json!({
                        "submission": s,
                        "status_label": s.kind.status_label(&s.status),
                    })
                })
                .collect();
            context["stats"] = json!(stats);
            context["recent"] = json!(recent);
        }
        Err(e) => {
            log::error!("Dashboard load failed: {}", e);
            context["load_error"] = json!(e.to_string());
        }
    }
    Template::render("admin/dashboard", &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::NewSubmission;
    use crate::store::tests::test_store;

    #[test]
    fn stats_count_pending_and_keep_five_newest() {
        let store = test_store();
        for i in 0..7 {
            let app = NewSubmission {
                name: format!("申请人{}", i),
                email: format!("a{}@example.com", i),
                phone: "13800138000".into(),
                city: Some("汕头".into()),
                message: String::new(),
            };
            store.submission_create(SubmissionKind::Franchise, &app).unwrap();
        }
        let first = store.submission_list(SubmissionKind::Franchise).unwrap().pop().unwrap();
        store.submission_update_status(SubmissionKind::Franchise, first.id, "contacted").unwrap();

        let (stats, recent) = load_stats(&store).unwrap();
        assert_eq!(stats.total_applications, 7);
        assert_eq!(stats.pending_applications, 6);
        assert_eq!(stats.stores, 0);
        assert_eq!(recent.len(), 5);
    }
}
