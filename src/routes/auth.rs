use std::sync::Arc;
use std::time::Duration;

use rocket::form::Form;
use rocket::http::{CookieJar, Header};
use rocket::request::FlashMessage;
use rocket::response::{self, Flash, Redirect, Responder};
use rocket::{Request, State};
use rocket_dyn_templates::Template;
use serde_json::json;

use crate::rate_limit::RateLimiter;
use crate::security::auth::{self, ClientIp, LoginError};
use crate::store::Store;
use crate::AdminSlug;

/// Wrapper that adds no-cache headers to a Template response
pub struct NoCacheTemplate(Template);

impl<'r> Responder<'r, 'static> for NoCacheTemplate {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let mut resp = self.0.respond_to(req)?;
        resp.set_header(Header::new("Cache-Control", "no-store, no-cache, must-revalidate, max-age=0"));
        resp.set_header(Header::new("Pragma", "no-cache"));
        Ok(resp)
    }
}

#[derive(Debug, FromForm)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

fn login_template(slug: &AdminSlug, email: &str, error: Option<&str>) -> NoCacheTemplate {
    NoCacheTemplate(Template::render(
        "admin/login",
        json!({
            "admin_slug": slug.0,
            "email": email,
            "error": error,
        }),
    ))
}

#[get("/login")]
pub fn login_page(slug: &State<AdminSlug>, flash: Option<FlashMessage<'_>>) -> NoCacheTemplate {
    let msg = flash.map(|f| f.message().to_string());
    login_template(slug, "", msg.as_deref())
}

#[post("/login", data = "<form>")]
pub fn login_submit(
    form: Form<LoginForm>,
    store: &State<Arc<dyn Store>>,
    slug: &State<AdminSlug>,
    limiter: &State<Arc<RateLimiter>>,
    ip: ClientIp,
    user_agent: UserAgent,
    cookies: &CookieJar<'_>,
) -> Result<Redirect, NoCacheTemplate> {
    let s = &***store;
    let rate_key = format!("login:{}", auth::hash_ip(&ip.0));
    let max_attempts = s.setting_get_i64("login_rate_limit").max(1) as u64;
    let window = Duration::from_secs(15 * 60);

    if !limiter.check_and_record(&rate_key, max_attempts, window) {
        return Err(login_template(slug, &form.email, Some("登录尝试次数过多，请15分钟后再试")));
    }

    match auth::sign_in(s, &form.email, &form.password, Some(&ip.0), user_agent.0.as_deref()) {
        Ok(token) => {
            limiter.reset(&rate_key);
            auth::set_session_cookie(cookies, &token, s);
            log::info!("Admin {} signed in", form.email.trim());
            Ok(Redirect::to(format!("/{}", slug.0)))
        }
        Err(e) => {
            if let LoginError::Internal(ref msg) = e {
                log::error!("Sign-in failed: {}", msg);
            }
            Err(login_template(slug, &form.email, Some(&e.to_string())))
        }
    }
}

#[get("/logout")]
pub fn logout(store: &State<Arc<dyn Store>>, slug: &State<AdminSlug>, cookies: &CookieJar<'_>) -> Redirect {
    if let Some(token) = auth::session_token(cookies) {
        let _ = auth::destroy_session(&***store, &token);
    }
    auth::clear_session_cookie(cookies);
    Redirect::to(format!("/{}/login", slug.0))
}

/// Catch-all for any /<admin_slug>/* route (including the root) that failed the AdminUser guard.
#[get("/<_path..>", rank = 99)]
pub fn admin_redirect_to_login(_path: std::path::PathBuf, slug: &State<AdminSlug>) -> Flash<Redirect> {
    Flash::error(Redirect::to(format!("/{}/login", slug.0)), "请先以管理员身份登录")
}

#[post("/<_path..>", rank = 99)]
pub fn admin_post_to_login(_path: std::path::PathBuf, slug: &State<AdminSlug>) -> Flash<Redirect> {
    Flash::error(Redirect::to(format!("/{}/login", slug.0)), "登录已过期，请重新登录")
}

/// Optional `User-Agent` header.
pub struct UserAgent(pub Option<String>);

#[rocket::async_trait]
impl<'r> rocket::request::FromRequest<'r> for UserAgent {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> rocket::request::Outcome<Self, Self::Error> {
        rocket::request::Outcome::Success(UserAgent(
            request.headers().get_one("User-Agent").map(|s| s.to_string()),
        ))
    }
}

pub fn routes() -> Vec<rocket::Route> {
    routes![
        login_page,
        login_submit,
        logout,
        admin_redirect_to_login,
        admin_post_to_login,
    ]
}
