use std::collections::HashMap;
use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{admin_base, base_context};
use crate::editor::SettingsEditor;
use crate::models::site_setting::{SettingFilter, PAGES};
use crate::notify::BadgeBoard;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

/// Settings URL that keeps the active filter after a save.
fn settings_url(slug: &AdminSlug, filter: &SettingFilter) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let pairs = [("page", &filter.page), ("category", &filter.category), ("q", &filter.search)];
    for (name, value) in pairs {
        if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
            query.append_pair(name, v);
        }
    }
    let query = query.finish();
    if query.is_empty() {
        format!("{}/settings", admin_base(slug))
    } else {
        format!("{}/settings?{}", admin_base(slug), query)
    }
}

/// Filter echoed back by the forms as `filter_page`, `filter_category` and `filter_q`.
fn posted_filter(form: &HashMap<String, String>) -> SettingFilter {
    let get = |k: &str| form.get(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    SettingFilter {
        page: get("filter_page"),
        category: get("filter_category"),
        search: get("filter_q"),
    }
}

#[get("/settings?<page>&<category>&<q>")]
pub fn settings_page(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    page: Option<String>,
    category: Option<String>,
    q: Option<String>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let filter = SettingFilter { page, category, search: q };
    let mut context = base_context(slug, &admin, board, "页面文案", flash);

    // Category choices follow the selected page.
    let categories: Vec<_> = PAGES
        .iter()
        .filter(|p| filter.page.as_deref().map(|sel| sel == "all" || sel == p.id).unwrap_or(true))
        .flat_map(|p| p.categories.iter().map(|(id, label, _)| json!({ "id": id, "label": label })))
        .collect();

    context["filter"] = json!({
        "page": filter.page.as_deref().unwrap_or("all"),
        "category": filter.category.as_deref().unwrap_or("all"),
        "q": filter.search.as_deref().unwrap_or(""),
    });
    context["pages"] = json!(PAGES.iter().map(|p| json!({ "id": p.id, "label": p.label })).collect::<Vec<_>>());
    context["categories"] = json!(categories);

    match SettingsEditor::load(&***store) {
        Ok(editor) => {
            let groups = editor.grouped(&filter);
            context["total"] = json!(groups.iter().flat_map(|g| &g.categories).map(|c| c.rows.len()).sum::<usize>());
            context["groups"] = json!(groups);
        }
        Err(e) => {
            log::error!("Failed to load site settings: {}", e);
            context["groups"] = json!([]);
            context["total"] = json!(0);
            context["load_error"] = json!(e.to_string());
        }
    }
    Template::render("admin/settings", &context)
}

#[post("/settings/<id>", data = "<form>")]
pub fn settings_save_one(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    id: i64,
    form: Form<HashMap<String, String>>,
) -> Flash<Redirect> {
    let form = form.into_inner();
    let back = Redirect::to(settings_url(slug, &posted_filter(&form)));

    let mut editor = match SettingsEditor::load(&***store) {
        Ok(e) => e,
        Err(e) => return Flash::error(back, e.to_string()),
    };
    editor.apply_form(&form);
    match editor.save_one(&***store, id) {
        Ok(saved) => {
            log::info!("Site setting {} updated (v{})", saved.key, saved.version);
            Flash::success(back, format!("已保存「{}」", saved.key))
        }
        Err(e) => Flash::error(back, e.to_string()),
    }
}

#[post("/settings", data = "<form>")]
pub fn settings_save_all(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    form: Form<HashMap<String, String>>,
) -> Flash<Redirect> {
    let form = form.into_inner();
    let back = Redirect::to(settings_url(slug, &posted_filter(&form)));

    let mut editor = match SettingsEditor::load(&***store) {
        Ok(e) => e,
        Err(e) => return Flash::error(back, e.to_string()),
    };
    editor.apply_form(&form);
    if editor.dirty_count() == 0 {
        return Flash::warning(back, "没有需要保存的更改");
    }

    let report = editor.save_all(&***store);
    match report.failed {
        None => Flash::success(back, format!("成功保存 {} 项更改！", report.saved)),
        Some((key, e)) => {
            log::warn!("Bulk settings save stopped at {}: {}", key, e);
            Flash::error(back, format!("已保存 {} 项，「{}」保存失败：{}", report.saved, key, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_keeps_filter() {
        let slug = AdminSlug("admin".into());
        assert_eq!(settings_url(&slug, &SettingFilter::default()), "/admin/settings");
        let filter = SettingFilter {
            page: Some("about".into()),
            category: None,
            search: Some("故事 2".into()),
        };
        let url = settings_url(&slug, &filter);
        assert!(url.starts_with("/admin/settings?page=about&q="));
        assert!(!url.contains(' '));
    }

    #[test]
    fn posted_filter_ignores_blank_fields() {
        let mut form = HashMap::new();
        form.insert("filter_page".to_string(), "home".to_string());
        form.insert("filter_q".to_string(), "  ".to_string());
        form.insert("value_3".to_string(), "x".to_string());
        let f = posted_filter(&form);
        assert_eq!(f.page.as_deref(), Some("home"));
        assert_eq!(f.search, None);
        assert_eq!(f.category, None);
    }
}
