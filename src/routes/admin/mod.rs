use rocket::request::FlashMessage;
use serde_json::{json, Value};

use crate::models::collection::Collection;
use crate::models::submission::SubmissionKind;
use crate::notify::BadgeBoard;
use crate::security::auth::AdminUser;
use crate::AdminSlug;

pub mod api;
pub mod collections;
pub mod dashboard;
pub mod footer;
pub mod settings;
pub mod submissions;

/// Helper: get the admin base path from managed state
pub(crate) fn admin_base(slug: &AdminSlug) -> String {
    format!("/{}", slug.0)
}

/// Sidebar entries: (group, href relative to the admin base, label).
pub(crate) fn nav_items() -> Vec<(&'static str, String, &'static str)> {
    let mut items = vec![("概览", String::new(), "仪表盘")];
    for c in Collection::ALL {
        let group = match c {
            Collection::Stores | Collection::BrandGallery | Collection::Testimonials => "网站内容",
            Collection::MenuItems | Collection::MenuCategories | Collection::MenuTips => "菜单",
            Collection::FranchiseBenefits | Collection::FranchiseRequirements | Collection::FranchiseProcess => "加盟",
            Collection::ContactInfo => "网站内容",
        };
        items.push((group, format!("/content/{}", c.slug()), c.label()));
    }
    items.push(("网站内容", "/settings".to_string(), "页面文案"));
    items.push(("网站内容", "/footer".to_string(), "页脚设置"));
    for kind in [SubmissionKind::Franchise, SubmissionKind::Contact] {
        items.push(("客户", format!("/submissions/{}", kind.slug()), kind.label()));
    }
    items
}

/// Context every admin template extends: slug, signed-in admin, badges, sidebar and flash.
pub(crate) fn base_context(
    slug: &AdminSlug,
    admin: &AdminUser,
    board: &BadgeBoard,
    page_title: &str,
    flash: Option<FlashMessage<'_>>,
) -> Value {
    let nav: Vec<Value> = nav_items()
        .into_iter()
        .map(|(group, href, label)| json!({ "group": group, "href": href, "label": label }))
        .collect();
    let mut context = json!({
        "page_title": page_title,
        "admin_slug": slug.0,
        "admin_name": admin.display_name(),
        "badges": board.get(),
        "nav": nav,
    });
    if let Some(ref f) = flash {
        context["flash_kind"] = json!(f.kind());
        context["flash_msg"] = json!(f.message());
    }
    context
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        dashboard::dashboard,
        collections::collection_list,
        collections::collection_new,
        collections::collection_edit,
        collections::collection_create,
        collections::collection_update,
        collections::collection_delete_confirm,
        collections::collection_delete,
        collections::collection_toggle,
        collections::collection_move,
        settings::settings_page,
        settings::settings_save_one,
        settings::settings_save_all,
        submissions::submissions_list,
        submissions::submission_status,
        submissions::submission_notes,
        submissions::submission_delete,
        submissions::submissions_export,
        footer::footer_page,
        footer::footer_save,
        api::badges,
        api::geocode,
        api::upload,
        api::upload_delete,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_covers_every_collection_and_inbox() {
        let items = nav_items();
        for c in Collection::ALL {
            assert!(items.iter().any(|(_, href, _)| href == &format!("/content/{}", c.slug())));
        }
        assert!(items.iter().any(|(_, href, _)| href == "/submissions/contacts"));
        assert!(items.iter().any(|(_, href, _)| href == "/submissions/franchise"));
        assert_eq!(items[0].1, "");
    }
}
