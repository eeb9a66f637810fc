use std::sync::Arc;

use rocket::form::Form;
use rocket::response::content::RawHtml;
use rocket::State;

use crate::error::StoreError;
use crate::intake::{self, IntakeError};
use crate::models::collection::Collection;
use crate::models::submission::{NewSubmission, SubmissionKind};
use crate::notify::Notifier;
use crate::rate_limit::{RateLimiter, FORM_MAX_ATTEMPTS, FORM_WINDOW};
use crate::render::{self, Chrome, FormView, Notice};
use crate::resolver::{self, resolve_list, resolve_page};
use crate::security::auth::{hash_ip, ClientIp};
use crate::store::Store;

pub(crate) fn chrome(store: &dyn Store) -> Chrome {
    Chrome {
        footer: resolver::resolve_footer(store),
        contact_lines: resolve_list(store, Collection::ContactInfo, resolver::default_contact_lines),
    }
}

// ── Pages ──────────────────────────────────────────────

#[get("/")]
pub fn home(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    let copy = resolve_page(s, "home");
    let testimonials = resolve_list(s, Collection::Testimonials, resolver::default_testimonials);
    let gallery = resolve_list(s, Collection::BrandGallery, resolver::default_gallery);
    RawHtml(render::render_home(&chrome(s), &copy, &testimonials, &gallery))
}

#[get("/menu")]
pub fn menu(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    let copy = resolve_page(s, "menu");
    let categories = resolve_list(s, Collection::MenuCategories, resolver::default_menu_categories);
    let items = resolve_list(s, Collection::MenuItems, resolver::default_menu_items);
    let tips = resolve_list(s, Collection::MenuTips, resolver::default_menu_tips);
    RawHtml(render::render_menu(&chrome(s), &copy, &categories, &items, &tips))
}

#[get("/stores")]
pub fn stores(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    let copy = resolve_page(s, "stores");
    let list = resolve_list(s, Collection::Stores, resolver::default_stores);
    RawHtml(render::render_stores(&chrome(s), &copy, &list))
}

#[get("/about")]
pub fn about(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    RawHtml(render::render_about(&chrome(s), &resolve_page(s, "about")))
}

#[get("/reviews")]
pub fn reviews(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    let testimonials = resolve_list(s, Collection::Testimonials, resolver::default_testimonials);
    RawHtml(render::render_reviews(&chrome(s), &testimonials))
}

fn franchise_page(s: &dyn Store, form: &FormView) -> RawHtml<String> {
    let copy = resolve_page(s, "franchise");
    let benefits = resolve_list(s, Collection::FranchiseBenefits, resolver::default_benefits);
    let requirements = resolve_list(s, Collection::FranchiseRequirements, resolver::default_requirements);
    let process = resolve_list(s, Collection::FranchiseProcess, resolver::default_process);
    RawHtml(render::render_franchise(&chrome(s), &copy, &benefits, &requirements, &process, form))
}

#[get("/franchise")]
pub fn franchise(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    franchise_page(&***store, &FormView::default())
}

#[get("/contact")]
pub fn contact(store: &State<Arc<dyn Store>>) -> RawHtml<String> {
    let s = &***store;
    RawHtml(render::render_contact(&chrome(s), &resolve_page(s, "contact"), &FormView::default()))
}

// ── Form submissions ───────────────────────────────────

#[derive(Debug, FromForm)]
pub struct SubmissionForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub city: Option<String>,
    pub message: Option<String>,
}

impl From<SubmissionForm> for NewSubmission {
    fn from(f: SubmissionForm) -> Self {
        NewSubmission {
            name: f.name,
            email: f.email,
            phone: f.phone,
            city: f.city,
            message: f.message.unwrap_or_default(),
        }
    }
}

/// Runs intake and turns the outcome into the form state to render.
pub(crate) fn handle_submission(
    store: &dyn Store,
    notifier: &Notifier,
    limiter: &RateLimiter,
    ip: &str,
    kind: SubmissionKind,
    raw: NewSubmission,
) -> FormView {
    let key = format!("{}:{}", kind.slug(), hash_ip(ip));
    if !limiter.check_and_record(&key, FORM_MAX_ATTEMPTS, FORM_WINDOW) {
        return FormView {
            values: raw,
            errors: Default::default(),
            notice: Some(Notice::Error("提交过于频繁，请稍后再试".to_string())),
        };
    }

    match intake::submit(store, notifier, kind, &raw) {
        Ok(_) => FormView {
            values: NewSubmission::default(),
            errors: Default::default(),
            notice: Some(Notice::Success(match kind {
                SubmissionKind::Contact => "消息已发送！我们会尽快回复您。".to_string(),
                SubmissionKind::Franchise => "申请已提交！我们将在24小时内与您联系。".to_string(),
            })),
        },
        Err(IntakeError::Invalid(errors)) => FormView {
            values: raw,
            errors,
            notice: Some(Notice::Error("请检查表单中标记的字段".to_string())),
        },
        Err(IntakeError::Store(StoreError::Duplicate(msg))) => FormView {
            values: raw,
            errors: Default::default(),
            notice: Some(Notice::Error(msg)),
        },
        Err(IntakeError::Store(e)) => {
            log::error!("Failed to store {} submission: {}", kind.table(), e);
            FormView {
                values: raw,
                errors: Default::default(),
                notice: Some(Notice::Error("提交失败，请稍后重试".to_string())),
            }
        }
    }
}

#[post("/contact", data = "<form>")]
pub fn contact_submit(
    store: &State<Arc<dyn Store>>,
    notifier: &State<Arc<Notifier>>,
    limiter: &State<Arc<RateLimiter>>,
    ip: ClientIp,
    form: Form<SubmissionForm>,
) -> RawHtml<String> {
    let s = &***store;
    let view = handle_submission(s, notifier, limiter, &ip.0, SubmissionKind::Contact, form.into_inner().into());
    RawHtml(render::render_contact(&chrome(s), &resolve_page(s, "contact"), &view))
}

#[post("/franchise", data = "<form>")]
pub fn franchise_submit(
    store: &State<Arc<dyn Store>>,
    notifier: &State<Arc<Notifier>>,
    limiter: &State<Arc<RateLimiter>>,
    ip: ClientIp,
    form: Form<SubmissionForm>,
) -> RawHtml<String> {
    let s = &***store;
    let view = handle_submission(s, notifier, limiter, &ip.0, SubmissionKind::Franchise, form.into_inner().into());
    franchise_page(s, &view)
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        home,
        menu,
        stores,
        about,
        reviews,
        franchise,
        contact,
        contact_submit,
        franchise_submit,
    ]
}
