use std::sync::Arc;

use rocket::form::Form;
use rocket::request::FlashMessage;
use rocket::response::{Flash, Redirect};
use rocket::State;
use rocket_dyn_templates::Template;
use serde_json::json;

use super::{admin_base, base_context};
use crate::models::content::FooterConfig;
use crate::notify::BadgeBoard;
use crate::security::auth::AdminUser;
use crate::store::Store;
use crate::AdminSlug;

#[get("/footer")]
pub fn footer_page(
    admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    board: &State<Arc<BadgeBoard>>,
    flash: Option<FlashMessage<'_>>,
) -> Template {
    let mut context = base_context(slug, &admin, board, "页脚设置", flash);
    match store.footer_get() {
        Ok(footer) => context["footer"] = json!(footer),
        Err(e) => {
            log::error!("Failed to load footer config: {}", e);
            context["footer"] = json!(FooterConfig::default());
            context["load_error"] = json!(e.to_string());
        }
    }
    Template::render("admin/footer", &context)
}

#[derive(Debug, FromForm)]
pub struct FooterForm {
    pub brand_name: String,
    pub brand_description: String,
}

#[post("/footer", data = "<form>")]
pub fn footer_save(
    _admin: AdminUser,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    form: Form<FooterForm>,
) -> Flash<Redirect> {
    let back = Redirect::to(format!("{}/footer", admin_base(slug)));
    let footer = FooterConfig {
        brand_name: form.brand_name.trim().to_string(),
        brand_description: form.brand_description.trim().to_string(),
    };
    match store.footer_save(&footer) {
        Ok(()) => Flash::success(back, "页脚设置已保存"),
        Err(e) => Flash::error(back, e.to_string()),
    }
}
