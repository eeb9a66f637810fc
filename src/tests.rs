#![cfg(test)]

use std::collections::HashMap;
use std::sync::Arc;

use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;

use crate::editor::{EditorState, SettingsEditor};
use crate::error::StoreError;
use crate::intake::{self, IntakeError};
use crate::models::collection::{Collection, RecordFields};
use crate::models::content::Testimonial;
use crate::models::submission::{NewSubmission, SubmissionKind};
use crate::notify::{AdminEvent, BadgeBoard, Notifier};
use crate::rate_limit::RateLimiter;
use crate::reorder::{self, Direction};
use crate::render::{self, Notice};
use crate::resolver::{self, resolve_list, resolve_page};
use crate::routes;
use crate::store::sqlite::SqliteStore;
use crate::store::tests::test_store;
use crate::store::Store;

fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn ids_and_orders(store: &SqliteStore, c: Collection) -> Vec<(i64, i64)> {
    store
        .collection_list(c, false)
        .unwrap()
        .iter()
        .map(|r| (r.id, r.sort_order))
        .collect()
}

fn application(email: &str) -> NewSubmission {
    NewSubmission {
        name: "林先生".into(),
        email: email.into(),
        phone: "13712345678".into(),
        city: Some("揭阳".into()),
        message: "想在揭阳开一家店".into(),
    }
}

// ── Ordered collections ────────────────────────────────

#[test]
fn new_rows_go_after_the_current_max_in_every_collection() {
    let store = test_store();
    for c in [Collection::Testimonials, Collection::MenuTips, Collection::BrandGallery] {
        let before = store.collection_list(c, false).unwrap();
        let expected = before.iter().map(|r| r.sort_order).max().unwrap_or(0) + 1;
        let fields = match c {
            Collection::Testimonials => RecordFields::new()
                .set("name", "赵女士")
                .set("role", "游客")
                .set("content", "汤底很鲜")
                .set("rating", 4)
                .set("avatar", "赵"),
            Collection::MenuTips => RecordFields::new().set("content", "搭配沙茶酱更香"),
            _ => RecordFields::new().set("image_url", "/uploads/gallery/a.jpg").set("alt_text", "门店外景"),
        };
        let rec = store.collection_create(c, &fields).unwrap();
        assert_eq!(rec.sort_order, expected, "{:?}", c);
    }
}

#[test]
fn boundary_moves_leave_the_list_unchanged() {
    let store = test_store();
    let c = Collection::FranchiseBenefits;
    let before = ids_and_orders(&store, c);
    assert!(before.len() >= 2);

    assert!(!reorder::move_entity(&store, c, before[0].0, Direction::Up).unwrap());
    assert!(!reorder::move_entity(&store, c, before[before.len() - 1].0, Direction::Down).unwrap());
    assert_eq!(ids_and_orders(&store, c), before);
}

#[test]
fn interior_move_swaps_exactly_two_rows() {
    let store = test_store();
    let c = Collection::FranchiseProcess;
    let before = ids_and_orders(&store, c);
    assert!(before.len() >= 3);

    assert!(reorder::move_entity(&store, c, before[1].0, Direction::Down).unwrap());
    let after = ids_and_orders(&store, c);

    let mut expected = before.clone();
    expected[1] = (before[2].0, before[1].1);
    expected[2] = (before[1].0, before[2].1);
    assert_eq!(after, expected);

    let changed = before
        .iter()
        .filter(|(id, order)| after.iter().find(|(aid, _)| aid == id).map(|(_, o)| o) != Some(order))
        .count();
    assert_eq!(changed, 2);
}

#[test]
fn category_in_use_cannot_be_deleted() {
    let store = test_store();
    let staple = store
        .collection_list(Collection::MenuCategories, false)
        .unwrap()
        .into_iter()
        .find(|r| r.get_str("name") == "主食")
        .unwrap();
    store
        .collection_create(
            Collection::MenuItems,
            &RecordFields::new().set("name", "牛肉丸粿条").set("category", "主食").set("price", 22.0),
        )
        .unwrap();
    let before = store.collection_count(Collection::MenuCategories).unwrap();

    let err = crate::editor::confirm_delete(&store, Collection::MenuCategories, staple.id, Some("yes")).unwrap_err();
    assert!(matches!(err, StoreError::InUse(_)));
    assert!(!err.to_string().is_empty());
    assert_eq!(store.collection_count(Collection::MenuCategories).unwrap(), before);
}

// ── Resolver ───────────────────────────────────────────

#[test]
fn empty_page_resolves_to_defaults() {
    let copy = resolver::merge(resolver::page_defaults("home"), HashMap::new());
    for (key, value) in resolver::page_defaults("home") {
        assert_eq!(copy.get(key), *value);
    }
}

#[test]
fn one_stored_row_overrides_only_its_key() {
    let store = test_store();
    let row = store
        .site_setting_by_page("home")
        .unwrap()
        .into_iter()
        .find(|r| r.key == "home_hero_title")
        .unwrap();
    store.site_setting_update(row.id, "潮来 · 新春限定", None).unwrap();

    let copy = resolve_page(&store, "home");
    assert_eq!(copy.get("home_hero_title"), "潮来 · 新春限定");
    for (key, value) in resolver::page_defaults("home") {
        if *key != "home_hero_title" {
            assert_eq!(copy.get(key), *value, "{}", key);
        }
    }
}

#[test]
fn empty_menu_table_renders_no_items() {
    let store = test_store();
    let items = resolve_list(&store, Collection::MenuItems, resolver::default_menu_items);
    assert!(items.is_empty());

    let tips = resolve_list(&store, Collection::MenuTips, resolver::default_menu_tips);
    assert_eq!(tips.len(), store.collection_list(Collection::MenuTips, true).unwrap().len());
}

#[test]
fn deactivating_the_last_store_shows_no_builtin_store() {
    let store = test_store();
    let shop = store
        .collection_create(
            Collection::Stores,
            &RecordFields::new()
                .set("name", "潮来龙湖店")
                .set("address", "汕头市龙湖区长平路8号")
                .set("phone", "0754-8666-1234")
                .set("hours", "10:00-21:30"),
        )
        .unwrap();

    let page = |s: &SqliteStore| {
        let list = resolve_list(s, Collection::Stores, resolver::default_stores);
        render::render_stores(&routes::public::chrome(s), &resolve_page(s, "stores"), &list)
    };
    assert!(page(&store).contains("潮来龙湖店"));

    store.collection_toggle_active(Collection::Stores, shop.id).unwrap();
    assert!(store.collection_list(Collection::Stores, true).unwrap().is_empty());
    let html = page(&store);
    assert!(!html.contains("潮来龙湖店"));
    assert!(!html.contains("0754-8888-0001"));
}

fn drop_content_tables(store: &SqliteStore) {
    let conn = store.pool.get().unwrap();
    conn.execute_batch(
        "DROP TABLE site_settings; DROP TABLE testimonials; DROP TABLE brand_gallery;
         DROP TABLE footer_config; DROP TABLE contact_info;",
    )
    .unwrap();
}

#[test]
fn unreadable_store_resolves_to_defaults() {
    let store = test_store();
    drop_content_tables(&store);

    assert_eq!(resolve_page(&store, "home"), resolver::merge(resolver::page_defaults("home"), HashMap::new()));
    assert_eq!(
        resolve_list(&store, Collection::Testimonials, resolver::default_testimonials),
        resolver::default_testimonials()
    );
    assert_eq!(
        resolve_list(&store, Collection::ContactInfo, resolver::default_contact_lines),
        resolver::default_contact_lines()
    );
    assert_eq!(resolver::resolve_footer(&store), crate::models::content::FooterConfig::default());
}

// ── Submissions ────────────────────────────────────────

#[test]
fn duplicate_application_is_rejected_before_insert() {
    let store = test_store();
    let notifier = Notifier::default();
    intake::submit(&store, &notifier, SubmissionKind::Franchise, &application("lin@example.com")).unwrap();

    let err = intake::submit(&store, &notifier, SubmissionKind::Franchise, &application("LIN@example.com ")).unwrap_err();
    assert!(matches!(err, IntakeError::Store(StoreError::Duplicate(_))));
    assert_eq!(store.submission_count(SubmissionKind::Franchise, None).unwrap(), 1);
}

#[test]
fn public_form_is_rate_limited_per_ip() {
    let store = test_store();
    let notifier = Notifier::default();
    let limiter = RateLimiter::default();
    let message = |i: usize| NewSubmission {
        name: "王先生".into(),
        email: format!("wang{}@example.com", i),
        phone: "13800138000".into(),
        city: None,
        message: "请问周末几点开门？谢谢".into(),
    };

    for i in 0..crate::rate_limit::FORM_MAX_ATTEMPTS as usize {
        let view = routes::public::handle_submission(&store, &notifier, &limiter, "10.0.0.1", SubmissionKind::Contact, message(i));
        assert!(matches!(view.notice, Some(Notice::Success(_))));
    }
    let blocked = routes::public::handle_submission(&store, &notifier, &limiter, "10.0.0.1", SubmissionKind::Contact, message(99));
    assert!(matches!(blocked.notice, Some(Notice::Error(_))));
    assert_eq!(blocked.values.email, "wang99@example.com");

    let other = routes::public::handle_submission(&store, &notifier, &limiter, "10.0.0.2", SubmissionKind::Contact, message(100));
    assert!(matches!(other.notice, Some(Notice::Success(_))));
}

#[test]
fn status_change_event_refreshes_badges() {
    let store = test_store();
    let board = BadgeBoard::new();
    let notifier = Notifier::default();
    let mut rx = notifier.subscribe();

    let app = intake::submit(&store, &notifier, SubmissionKind::Franchise, &application("x@example.com")).unwrap();
    assert_eq!(rx.try_recv().unwrap(), AdminEvent::SubmissionCreated(SubmissionKind::Franchise));
    board.refresh(&store).unwrap();
    assert_eq!(board.get().pending_franchise, 1);

    store.submission_update_status(SubmissionKind::Franchise, app.id, "contacted").unwrap();
    notifier.publish(AdminEvent::StatusChanged(SubmissionKind::Franchise));
    assert_eq!(rx.try_recv().unwrap().kind(), SubmissionKind::Franchise);
    board.refresh(&store).unwrap();
    assert_eq!(board.get().pending_franchise, 0);
}

// ── Admin flow ─────────────────────────────────────────

#[test]
fn added_testimonial_appends_and_toggle_hides_it_from_home() {
    let store = test_store();
    let previous_max = store
        .collection_list(Collection::Testimonials, false)
        .unwrap()
        .iter()
        .map(|r| r.sort_order)
        .max()
        .unwrap_or(0);

    let outcome = EditorState::start_add().submit(&store, Collection::Testimonials);
    assert!(outcome.saved.is_none(), "empty form must not save");

    let draft = form(&[
        ("name", "王先生"),
        ("role", "老顾客"),
        ("content", "每周都要来吃一次牛肉粿粉"),
        ("rating", "5"),
        ("avatar", "王"),
        ("is_active", "on"),
    ]);
    let outcome = EditorState::reopen(crate::editor::FormMode::Add, draft).submit(&store, Collection::Testimonials);
    let saved = outcome.saved.unwrap();
    assert_eq!(outcome.state, EditorState::Idle);
    assert_eq!(saved.sort_order, previous_max + 1);

    let listed = store.collection_list(Collection::Testimonials, false).unwrap();
    assert_eq!(listed.last().map(|r| r.id), Some(saved.id));

    let home = |s: &SqliteStore| {
        let t: Vec<Testimonial> = resolve_list(s, Collection::Testimonials, resolver::default_testimonials);
        render::render_home(&routes::public::chrome(s), &resolve_page(s, "home"), &t, &[])
    };
    assert!(home(&store).contains("每周都要来吃一次牛肉粿粉"));

    store.collection_toggle_active(Collection::Testimonials, saved.id).unwrap();
    assert!(!home(&store).contains("每周都要来吃一次牛肉粿粉"));
    assert!(store.collection_get(Collection::Testimonials, saved.id).is_ok());
}

#[test]
fn bulk_settings_save_reports_count() {
    let store = test_store();
    let mut editor = SettingsEditor::load(&store).unwrap();
    let ids: Vec<i64> = editor.rows().iter().take(2).map(|r| r.saved.id).collect();
    for id in &ids {
        editor.edit(*id, "更新后的文案");
    }
    let report = editor.save_all(&store);
    assert_eq!(report.saved, 2);
    assert!(report.failed.is_none());
    assert_eq!(editor.dirty_count(), 0);
    assert_eq!(store.site_setting_get(ids[0]).unwrap().value, "更新后的文案");
}

// ── HTTP ───────────────────────────────────────────────

fn client_for(store: SqliteStore) -> (Client, Arc<dyn Store>, Arc<Notifier>) {
    let store: Arc<dyn Store> = Arc::new(store);
    let notifier = Arc::new(Notifier::default());
    let rocket = rocket::build()
        .manage(Arc::clone(&store))
        .manage(Arc::clone(&notifier))
        .manage(Arc::new(RateLimiter::default()))
        .mount("/", routes::public::routes());
    (Client::tracked(rocket).expect("valid rocket"), store, notifier)
}

fn client() -> (Client, Arc<dyn Store>, Arc<Notifier>) {
    client_for(test_store())
}

#[test]
fn public_pages_render() {
    let (client, _, _) = client();
    for path in ["/", "/menu", "/stores", "/about", "/reviews", "/franchise", "/contact"] {
        let resp = client.get(path).dispatch();
        assert_eq!(resp.status(), Status::Ok, "{}", path);
        let body = resp.into_string().unwrap_or_default();
        assert!(body.contains("潮来"), "{}", path);
    }
}

#[test]
fn home_renders_default_copy_when_tables_are_missing() {
    let store = test_store();
    drop_content_tables(&store);
    let (client, _, _) = client_for(store);

    let resp = client.get("/").dispatch();
    assert_eq!(resp.status(), Status::Ok);
    let body = resp.into_string().unwrap_or_default();
    assert!(body.contains("正宗潮汕牛肉粿粉"));
    assert!(body.contains("为什么选择潮来"));
    assert!(body.contains("service@chaolai.com"));
}

#[test]
fn contact_post_stores_message_and_notifies() {
    let (client, store, notifier) = client();
    let mut rx = notifier.subscribe();
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", "王先生")
        .append_pair("email", "wang@example.com")
        .append_pair("phone", "13800138000")
        .append_pair("message", "想预订周六晚上的位子，请回电")
        .finish();

    let resp = client.post("/contact").header(ContentType::Form).body(body).dispatch();
    assert_eq!(resp.status(), Status::Ok);
    assert!(resp.into_string().unwrap_or_default().contains("消息已发送"));
    assert_eq!(store.submission_count(SubmissionKind::Contact, Some("unread")).unwrap(), 1);
    assert_eq!(rx.try_recv().unwrap(), AdminEvent::SubmissionCreated(SubmissionKind::Contact));
}
