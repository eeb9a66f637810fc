use std::collections::HashMap;
use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::{json, Value};

use super::{admin_base, base_context};
use crate::editor::{confirm_delete, EditorState, FormMode};
use crate::models::collection::{Collection, FieldErrors, FieldKind, OrderedRecord};
use crate::notify::BadgeBoard;
use crate::reorder::{self, Direction};
use crate::security::auth::AdminUser;
use crate::storage::MediaStore;
use crate::store::Store;
use crate::AdminSlug;

fn list_url(slug: &AdminSlug, c: Collection) -> String {
    format!("{}/content/{}", admin_base(slug), c.slug())
}

fn cell_text(v: Option<&Value>, kind: FieldKind) -> String {
    match (v, kind) {
        (Some(Value::Bool(true)), _) => "是".to_string(),
        (Some(Value::Bool(false)), _) => "否".to_string(),
        (Some(Value::Number(n)), FieldKind::Real { .. }) => n.as_f64().map(|f| format!("{:.2}", f)).unwrap_or_default(),
        (Some(Value::String(s)), _) => s.chars().take(40).collect(),
        (Some(Value::Null), _) | (None, _) => String::new(),
        (Some(other), _) => other.to_string(),
    }
}

/// Up to three columns besides the title, skipping images and long text.
fn summary_columns(c: Collection) -> Vec<&'static crate::models::collection::FieldSpec> {
    c.fields()
        .iter()
        .filter(|f| f.name != c.title_field() && !matches!(f.kind, FieldKind::Image | FieldKind::LongText))
        .take(3)
        .collect()
}

pub(crate) fn list_rows(c: Collection, records: &[OrderedRecord]) -> Vec<Value> {
    let columns = summary_columns(c);
    let last = records.len().saturating_sub(1);
    records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let cells: Vec<String> = columns.iter().map(|f| cell_text(r.fields.get(f.name), f.kind)).collect();
            let image = c
                .fields()
                .iter()
                .find(|f| f.kind == FieldKind::Image)
                .map(|f| r.get_str(f.name).to_string())
                .filter(|s| !s.is_empty());
            json!({
                "id": r.id,
                "title": r.title(c),
                "sort_order": r.sort_order,
                "is_active": r.is_active,
                "cells": cells,
                "image": image,
                "is_first": i == 0,
                "is_last": i == last,
            })
        })
        .collect()
}

/// One entry per form field, with its current draft value and inline error.
pub(crate) fn field_views(
    c: Collection,
    draft: &HashMap<String, String>,
    errors: &FieldErrors,
    categories: &[String],
) -> Vec<Value> {
    c.fields()
        .iter()
        .map(|f| {
            let (input, min, max, step) = match f.kind {
                FieldKind::Text => ("text", None, None, None),
                FieldKind::LongText => ("textarea", None, None, None),
                FieldKind::Integer { min, max } => ("number", Some(min as f64), Some(max as f64), Some("1")),
                FieldKind::Real { min, max } => ("number", Some(min), Some(max), Some("any")),
                FieldKind::Bool => ("checkbox", None, None, None),
                FieldKind::Image => ("image", None, None, None),
                FieldKind::MenuCategory => ("select", None, None, None),
            };
            let value = draft.get(f.name).cloned().unwrap_or_default();
            let options = if f.kind == FieldKind::MenuCategory { categories.to_vec() } else { Vec::new() };
            json!({
                "name": f.name,
                "label": f.label,
                "input": input,
                "required": f.required,
                "value": value,
                "checked": matches!(value.as_str(), "on" | "true" | "1"),
                "min": min,
                "max": max,
                "step": step,
                "options": options,
                "error": errors.get(f.name),
            })
        })
        .collect()
}

fn category_names(store: &dyn Store) -> Vec<String> {
    store
        .collection_list(Collection::MenuCategories, false)
        .map(|rows| rows.iter().map(|r| r.get_str("name").to_string()).collect())
        .unwrap_or_default()
}

fn render_form(
    store: &dyn Store,
    slug: &AdminSlug,
    admin: &AdminUser,
    board: &BadgeBoard,
    c: Collection,
    state: &EditorState,
) -> Template {
    let (mode, draft, version, errors, error) = match state {
        EditorState::FormOpen { mode, draft, version, field_errors, error } => {
            (*mode, draft.clone(), *version, field_errors.clone(), error.clone())
        }
        EditorState::Idle => (FormMode::Add, HashMap::new(), None, FieldErrors::new(), None),
    };
    let title = match mode {
        FormMode::Add => format!("新增 · {}", c.label()),
        FormMode::Edit(_) => format!("编辑 · {}", c.label()),
    };
    let action = match mode {
        FormMode::Add => list_url(slug, c),
        FormMode::Edit(id) => format!("{}/{}", list_url(slug, c), id),
    };
    let mut context = base_context(slug, admin, board, &title, None);
    context["collection"] = json!({ "slug": c.slug(), "label": c.label(), "upload_folder": c.upload_folder() });
    context["mode"] = json!(mode);
    context["action"] = json!(action);
    context["list_url"] = json!(list_url(slug, c));
    context["version"] = json!(version);
    context["is_active"] = json!(draft.get("is_active").map(|v| v == "on").unwrap_or(false));
    context["sort_order"] = json!(draft.get("sort_order"));
    context["fields"] = json!(field_views(c, &draft, &errors, &category_names(store)));
    context["error"] = json!(error);
    context["geocode"] = json!(c == Collection::Stores);
    Template::render("admin/collections/form", &context)
}

// ── List ───────────────────────────────────────────────

#[get("/content/<name>")]
pub fn collection_list(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    flash: Option<FlashMessage<'_>>,
) -> Option<Template> {
    let c = Collection::from_slug(name)?;
    let mut context = base_context(slug, &admin, board, c.label(), flash);
    context["collection"] = json!({ "slug": c.slug(), "label": c.label() });
    context["columns"] = json!(summary_columns(c).iter().map(|f| f.label).collect::<Vec<_>>());
    context["list_url"] = json!(list_url(slug, c));
    match store.collection_list(c, false) {
        Ok(records) => context["rows"] = json!(list_rows(c, &records)),
        Err(e) => {
            log::error!("Failed to list {}: {}", c.table(), e);
            context["rows"] = json!([]);
            context["load_error"] = json!(e.to_string());
        }
    }
    Some(Template::render("admin/collections/list", &context))
}

// ── Form ───────────────────────────────────────────────

#[get("/content/<name>/new")]
pub fn collection_new(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
) -> Option<Template> {
    let c = Collection::from_slug(name)?;
    Some(render_form(&***store, slug, &admin, board, c, &EditorState::start_add()))
}

#[get("/content/<name>/<id>/edit")]
pub fn collection_edit(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    id: i64,
) -> Result<Template, Flash<Redirect>> {
    let c = Collection::from_slug(name).ok_or_else(|| Flash::error(Redirect::to(admin_base(slug)), "未知的内容类型"))?;
    match store.collection_get(c, id) {
        Ok(rec) => Ok(render_form(&***store, slug, &admin, board, c, &EditorState::start_edit(&rec))),
        Err(e) => Err(Flash::error(Redirect::to(list_url(slug, c)), e.to_string())),
    }
}

fn submit(
    admin: &AdminUser,
    store: &dyn Store,
    slug: &AdminSlug,
    board: &BadgeBoard,
    c: Collection,
    mode: FormMode,
    form: HashMap<String, String>,
) -> Result<Flash<Redirect>, Template> {
    let outcome = EditorState::reopen(mode, form).submit(store, c);
    match outcome.saved {
        Some(rec) => {
            let verb = if mode == FormMode::Add { "已添加" } else { "已保存" };
            Ok(Flash::success(
                Redirect::to(list_url(slug, c)),
                format!("{}「{}」", verb, rec.title(c)),
            ))
        }
        None => Err(render_form(store, slug, admin, board, c, &outcome.state)),
    }
}

#[post("/content/<name>", data = "<form>")]
pub fn collection_create(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    form: Form<HashMap<String, String>>,
) -> Option<Result<Flash<Redirect>, Template>> {
    let c = Collection::from_slug(name)?;
    Some(submit(&admin, &***store, slug, board, c, FormMode::Add, form.into_inner()))
}

#[post("/content/<name>/<id>", data = "<form>")]
pub fn collection_update(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    id: i64,
    form: Form<HashMap<String, String>>,
) -> Option<Result<Flash<Redirect>, Template>> {
    let c = Collection::from_slug(name)?;
    Some(submit(&admin, &***store, slug, board, c, FormMode::Edit(id), form.into_inner()))
}

// ── Delete ─────────────────────────────────────────────

#[get("/content/<name>/<id>/delete")]
pub fn collection_delete_confirm(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    name: &str,
    id: i64,
) -> Result<Template, Flash<Redirect>> {
    let c = Collection::from_slug(name).ok_or_else(|| Flash::error(Redirect::to(admin_base(slug)), "未知的内容类型"))?;
    let rec = store
        .collection_get(c, id)
        .map_err(|e| Flash::error(Redirect::to(list_url(slug, c)), e.to_string()))?;
    let mut context = base_context(slug, &admin, board, "确认删除", None);
    context["collection"] = json!({ "slug": c.slug(), "label": c.label() });
    context["item"] = json!({ "id": rec.id, "title": rec.title(c) });
    context["list_url"] = json!(list_url(slug, c));
    context["in_use"] = json!(items_in_category(&***store, c, &rec));
    Ok(Template::render("admin/collections/delete", &context))
}

/// Menu items still filed under a category row; zero for other collections.
pub(crate) fn items_in_category(store: &dyn Store, c: Collection, rec: &OrderedRecord) -> i64 {
    if c != Collection::MenuCategories {
        return 0;
    }
    store.menu_items_in_category(rec.get_str("name")).unwrap_or_else(|e| {
        log::warn!("Failed to count items in category #{}: {}", rec.id, e);
        0
    })
}

#[derive(Debug, FromForm)]
pub struct DeleteForm {
    pub confirm: Option<String>,
}

#[post("/content/<name>/<id>/delete", data = "<form>")]
pub fn collection_delete(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    media: &State<MediaStore>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
    form: Form<DeleteForm>,
) -> Flash<Redirect> {
    let c = match Collection::from_slug(name) {
        Some(c) => c,
        None => return Flash::error(Redirect::to(admin_base(slug)), "未知的内容类型"),
    };
    let back = Redirect::to(list_url(slug, c));
    let existing = store.collection_get(c, id).ok();

    match confirm_delete(&***store, c, id, form.confirm.as_deref()) {
        Ok(()) => {
            if let Some(rec) = existing {
                remove_local_images(media, c, &rec);
                Flash::success(back, format!("已删除「{}」", rec.title(c)))
            } else {
                Flash::success(back, "已删除")
            }
        }
        Err(e) => Flash::error(back, e.to_string()),
    }
}

/// Uploaded images belonging to a deleted row. Foreign URLs are left alone.
fn remove_local_images(media: &MediaStore, c: Collection, rec: &OrderedRecord) {
    for f in c.fields().iter().filter(|f| f.kind == FieldKind::Image) {
        let url = rec.get_str(f.name);
        if url.is_empty() || media.relative_path(url).is_err() {
            continue;
        }
        if let Err(e) = media.delete_by_url(url) {
            log::warn!("Could not remove image {} of {} #{}: {}", url, c.table(), rec.id, e);
        }
    }
}

// ── Toggle / reorder ───────────────────────────────────

#[post("/content/<name>/<id>/toggle")]
pub fn collection_toggle(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
) -> Option<Flash<Redirect>> {
    let c = Collection::from_slug(name)?;
    let back = Redirect::to(list_url(slug, c));
    Some(match store.collection_toggle_active(c, id) {
        Ok(rec) => {
            log::info!("Toggled {} #{} -> active={}", c.table(), id, rec.is_active);
            let state = if rec.is_active { "已启用" } else { "已停用" };
            Flash::success(back, format!("「{}」{}", rec.title(c), state))
        }
        Err(e) => Flash::error(back, e.to_string()),
    })
}

#[post("/content/<name>/<id>/move/<dir>")]
pub fn collection_move(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    name: &str,
    id: i64,
    dir: &str,
) -> Option<Flash<Redirect>> {
    let c = Collection::from_slug(name)?;
    let direction = Direction::parse(dir)?;
    let back = Redirect::to(list_url(slug, c));
    Some(match reorder::move_entity(&***store, c, id, direction) {
        // A boundary move is a silent no-op.
        Ok(_) => Flash::success(back, "排序已更新"),
        Err(e) => Flash::error(back, e.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::test_store;

    #[test]
    fn rows_flag_first_and_last_for_move_buttons() {
        let store = test_store();
        let records = store.collection_list(Collection::Testimonials, false).unwrap();
        let rows = list_rows(Collection::Testimonials, &records);
        assert_eq!(rows.len(), records.len());
        assert_eq!(rows[0]["is_first"], json!(true));
        assert_eq!(rows[rows.len() - 1]["is_last"], json!(true));
        assert_eq!(rows[0]["title"], json!("王先生"));
        // role, rating, avatar; content is long text
        assert_eq!(rows[0]["cells"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn menu_item_fields_offer_categories() {
        let mut draft = HashMap::new();
        draft.insert("category".to_string(), "配菜".to_string());
        draft.insert("is_bestseller".to_string(), "on".to_string());
        let mut errors = FieldErrors::new();
        errors.insert("price".to_string(), "请填写价格".to_string());
        let cats = vec!["主食".to_string(), "配菜".to_string()];
        let views = field_views(Collection::MenuItems, &draft, &errors, &cats);

        let category = views.iter().find(|v| v["name"] == "category").unwrap();
        assert_eq!(category["input"], "select");
        assert_eq!(category["options"], json!(cats));
        assert_eq!(category["value"], "配菜");
        let price = views.iter().find(|v| v["name"] == "price").unwrap();
        assert_eq!(price["error"], "请填写价格");
        assert_eq!(price["step"], "any");
        let best = views.iter().find(|v| v["name"] == "is_bestseller").unwrap();
        assert_eq!(best["checked"], json!(true));
    }

    #[test]
    fn delete_prompt_counts_items_in_category() {
        let store = test_store();
        let cats = store.collection_list(Collection::MenuCategories, false).unwrap();
        let main = cats.iter().find(|c| c.get_str("name") == "主食").unwrap();
        assert_eq!(items_in_category(&store, Collection::MenuCategories, main), 0);

        let item = store
            .collection_create(
                Collection::MenuItems,
                &crate::models::collection::RecordFields::new()
                    .set("name", "牛肉粿条")
                    .set("category", "主食")
                    .set("price", 18.0),
            )
            .unwrap();
        assert_eq!(items_in_category(&store, Collection::MenuCategories, main), 1);
        assert_eq!(items_in_category(&store, Collection::MenuItems, &item), 0);
    }
}
