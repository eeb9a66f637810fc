#[macro_use]
extern crate rocket;

use std::sync::Arc;

use rocket::fairing::{Fairing, Info, Kind};
use rocket::fs::FileServer;
use rocket::http::Header;
use rocket::response::content::RawHtml;
use rocket::Request;
use rocket_dyn_templates::Template;

mod boot;
mod config;
mod db;
mod editor;
mod error;
mod export;
mod geocode;
mod intake;
mod models;
mod notify;
mod rate_limit;
mod reorder;
mod render;
mod resolver;
mod routes;
mod security;
mod storage;
mod store;
mod tasks;

#[cfg(test)]
mod tests;

use config::AppConfig;
use store::sqlite::SqliteStore;
use store::Store;

/// Holds the admin URL slug from configuration.
/// Shared via Rocket managed state so routes, fairings, and templates can access it.
pub struct AdminSlug(pub String);

pub struct NoCacheAdmin;

#[rocket::async_trait]
impl Fairing for NoCacheAdmin {
    fn info(&self) -> Info {
        Info { name: "No-Cache Admin Pages", kind: Kind::Response }
    }

    async fn on_response<'r>(&self, req: &'r rocket::Request<'_>, res: &mut rocket::Response<'r>) {
        let slug = req.rocket().state::<AdminSlug>()
            .map(|s| s.0.as_str())
            .unwrap_or("admin");
        let prefix = format!("/{}", slug);
        if req.uri().path().starts_with(&*prefix) {
            res.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
            res.set_header(Header::new("Pragma", "no-cache"));
        }
    }
}

#[catch(404)]
fn not_found(req: &Request<'_>) -> RawHtml<String> {
    match req.rocket().state::<Arc<dyn Store>>() {
        Some(store) => RawHtml(render::render_not_found(&routes::public::chrome(&**store))),
        None => RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>404</h1><p>页面不存在</p><a href='/'>← 返回首页</a></body></html>".to_string()),
    }
}

#[catch(500)]
fn server_error() -> RawHtml<String> {
    RawHtml("<html><body style='font-family:sans-serif;text-align:center;padding:80px'><h1>500</h1><p>服务器内部错误，请稍后重试。</p><a href='/'>← 返回首页</a></body></html>".to_string())
}

fn open_store(cfg: &AppConfig) -> Result<Arc<dyn Store>, String> {
    let store = SqliteStore::new_at(&cfg.database_path)?;
    store.run_migrations()?;
    store.seed_defaults()?;
    security::auth::bootstrap_admin(&store, &cfg.bootstrap_admin_email, &cfg.bootstrap_admin_password)?;
    Ok(Arc::new(store))
}

#[launch]
fn rocket() -> _ {
    env_logger::init();

    let figment = rocket::Config::figment();
    let cfg = AppConfig::from_figment(&figment);

    // Boot check: create directories, validate critical files
    boot::run(&cfg);

    let store = match open_store(&cfg) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to open database {}: {}", cfg.database_path, e);
            std::process::exit(1);
        }
    };

    let admin_mount = cfg.admin_base();
    log::info!("Admin panel mounted at: {}", admin_mount);

    let media = storage::MediaStore::from_config(&cfg);
    let geocoder = geocode::Geocoder::from_config(&cfg);

    rocket::custom(figment)
        .manage(store)
        .manage(Arc::new(notify::Notifier::default()))
        .manage(Arc::new(notify::BadgeBoard::new()))
        .manage(Arc::new(rate_limit::RateLimiter::default()))
        .manage(media)
        .manage(geocoder)
        .manage(AdminSlug(cfg.admin_slug.clone()))
        .attach(Template::fairing())
        .attach(NoCacheAdmin)
        .attach(tasks::BackgroundTasks)
        .mount(cfg.uploads_url_prefix.as_str(), FileServer::from(cfg.uploads_dir.as_str()))
        .mount("/", routes::public::routes())
        .mount(admin_mount.as_str(), routes::admin::routes())
        .mount(admin_mount.as_str(), routes::auth::routes())
        .manage(cfg)
        .register("/", catchers![not_found, server_error])
}
