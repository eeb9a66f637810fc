use std::sync::Arc;

use rocket::form::Form;
use rocket::http::Header;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{admin_base, base_context};
use crate::error::StoreResult;
use crate::export;
use crate::models::submission::{Submission, SubmissionFilter, SubmissionKind};
use crate::notify::{AdminEvent, BadgeBoard, Notifier};
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

fn list_url(slug: &AdminSlug, kind: SubmissionKind) -> String {
    format!("{}/submissions/{}", admin_base(slug), kind.slug())
}

fn filter_from(status: Option<String>, q: Option<String>) -> SubmissionFilter {
    SubmissionFilter {
        status: status.filter(|s| !s.is_empty() && s != "all"),
        search: q.filter(|s| !s.trim().is_empty()),
    }
}

/// Newest first, narrowed by the list filter.
pub(crate) fn filtered(store: &dyn Store, kind: SubmissionKind, filter: &SubmissionFilter) -> StoreResult<Vec<Submission>> {
    Ok(store
        .submission_list(kind)?
        .into_iter()
        .filter(|s| filter.matches(s))
        .collect())
}

#[get("/submissions/<name>?<status>&<q>")]
pub fn submissions_list(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    status: Option<String>,
    q: Option<String>,
    flash: Option<FlashMessage<'_>>,
) -> Option<Template> {
    let kind = SubmissionKind::from_slug(name)?;
    let filter = filter_from(status, q);
    let mut context = base_context(slug, &admin, board, kind.label(), flash);

    context["kind"] = json!({ "slug": kind.slug(), "label": kind.label(), "is_franchise": kind == SubmissionKind::Franchise });
    context["statuses"] = json!(kind
        .statuses()
        .iter()
        .map(|(id, label)| json!({ "id": id, "label": label }))
        .collect::<Vec<_>>());
    context["filter"] = json!({
        "status": filter.status.as_deref().unwrap_or("all"),
        "q": filter.search.as_deref().unwrap_or(""),
    });
    context["list_url"] = json!(list_url(slug, kind));

    match filtered(&***store, kind, &filter) {
        Ok(rows) => {
            let rows: Vec<_> = rows
                .iter()
                .map(|s| json!({ "submission": s, "status_label": kind.status_label(&s.status) }))
                .collect();
            context["rows"] = json!(rows);
        }
        Err(e) => {
            log::error!("Failed to list {}: {}", kind.table(), e);
            context["rows"] = json!([]);
            context["load_error"] = json!(e.to_string());
        }
    }
    Some(Template::render("admin/submissions", &context))
}

#[derive(Debug, FromForm)]
pub struct StatusForm {
    pub status: String,
}

#[post("/submissions/<name>/<id>/status", data = "<form>")]
pub fn submission_status(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    notifier: &State<Arc<Notifier>>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
    form: Form<StatusForm>,
) -> Option<Flash<Redirect>> {
    let kind = SubmissionKind::from_slug(name)?;
    let back = Redirect::to(list_url(slug, kind));
    Some(match store.submission_update_status(kind, id, form.status.trim()) {
        Ok(s) => {
            notifier.publish(AdminEvent::StatusChanged(kind));
            Flash::success(back, format!("「{}」状态已更新为{}", s.name, kind.status_label(&s.status)))
        }
        Err(e) => Flash::error(back, e.to_string()),
    })
}

#[derive(Debug, FromForm)]
pub struct NotesForm {
    pub notes: String,
}

#[post("/submissions/<name>/<id>/notes", data = "<form>")]
pub fn submission_notes(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    notifier: &State<Arc<Notifier>>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
    form: Form<NotesForm>,
) -> Option<Flash<Redirect>> {
    let kind = SubmissionKind::from_slug(name)?;
    let back = Redirect::to(list_url(slug, kind));
    Some(match store.submission_save_notes(kind, id, form.notes.trim()) {
        Ok(s) => {
            notifier.publish(AdminEvent::NotesSaved(kind));
            Flash::success(back, format!("已保存「{}」的备注", s.name))
        }
        Err(e) => Flash::error(back, e.to_string()),
    })
}

#[derive(Debug, FromForm)]
pub struct ConfirmForm {
    pub confirm: Option<String>,
}

#[post("/submissions/<name>/<id>/delete", data = "<form>")]
pub fn submission_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    notifier: &State<Arc<Notifier>>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
    form: Form<ConfirmForm>,
) -> Option<Flash<Redirect>> {
    let kind = SubmissionKind::from_slug(name)?;
    let back = Redirect::to(list_url(slug, kind));
    if form.confirm.as_deref() != Some("yes") {
        return Some(Flash::error(back, "请先确认删除操作"));
    }
    Some(match store.submission_delete(kind, id) {
        Ok(()) => {
            notifier.publish(AdminEvent::SubmissionDeleted(kind));
            log::info!("Deleted {} #{}", kind.table(), id);
            Flash::success(back, "已删除")
        }
        Err(e) => Flash::error(back, e.to_string()),
    })
}

/// CSV download with an attachment file name.
#[derive(Responder)]
#[response(content_type = "text/csv")]
pub struct CsvDownload {
    body: String,
    disposition: Header<'static>,
}

impl CsvDownload {
    fn new(file_name: String, body: String) -> Self {
        CsvDownload {
            body,
            disposition: Header::new("Content-Disposition", format!("attachment; filename=\"{}\"", file_name)),
        }
    }
}

#[get("/submissions/<name>/export?<status>&<q>")]
pub fn submissions_export(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    name: &str,
    status: Option<String>,
    q: Option<String>,
) -> Option<Result<CsvDownload, Flash<Redirect>>> {
    let kind = SubmissionKind::from_slug(name)?;
    let filter = filter_from(status, q);
    Some(match filtered(&***store, kind, &filter) {
        Ok(rows) => {
            let today = chrono::Local::now().date_naive();
            log::info!("Exporting {} {} rows", rows.len(), kind.table());
            Ok(CsvDownload::new(export::file_name(kind, today), export::submissions_csv(kind, &rows)))
        }
        Err(e) => Err(Flash::error(Redirect::to(list_url(slug, kind)), e.to_string())),
    })
}
