use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::models::user::{Profile, User};
use crate::store::Store;

const SESSION_COOKIE: &str = "chaolai_session";

// ── Client IP request guard ──

/// Real client IP: X-Real-IP, then the first X-Forwarded-For entry, then the socket peer.
pub struct ClientIp(pub String);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClientIp {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = request.headers();

        if let Some(ip) = headers.get_one("X-Real-IP").map(str::trim).filter(|ip| !ip.is_empty()) {
            return Outcome::Success(ClientIp(ip.to_string()));
        }

        if let Some(ip) = headers
            .get_one("X-Forwarded-For")
            .and_then(|f| f.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
        {
            return Outcome::Success(ClientIp(ip.to_string()));
        }

        let ip = request
            .client_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        Outcome::Success(ClientIp(ip))
    }
}

// ── Admin guard ──

/// Guard: a signed-in user whose profile has `role = 'admin'`.
pub struct AdminUser {
    pub user: User,
    pub profile: Profile,
}

impl AdminUser {
    pub fn display_name(&self) -> &str {
        self.profile.display_name(&self.user)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let store = match request.guard::<&State<Arc<dyn Store>>>().await {
            Outcome::Success(s) => s,
            _ => return Outcome::Forward(Status::Unauthorized),
        };
        let cookies = request.cookies();
        let token = match cookies.get_private(SESSION_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Outcome::Forward(Status::Unauthorized),
        };

        match resolve_admin(&***store, &token) {
            Ok(admin) => Outcome::Success(admin),
            Err(status) => {
                cookies.remove_private(Cookie::from(SESSION_COOKIE));
                Outcome::Forward(status)
            }
        }
    }
}

/// Session token -> admin, or the status a failed lookup maps to.
pub fn resolve_admin(store: &dyn Store, token: &str) -> Result<AdminUser, Status> {
    let user_id = store.session_get_user_id(token).ok_or(Status::Unauthorized)?;
    let user = store.user_get_by_id(user_id).ok_or(Status::Unauthorized)?;
    match store.profile_get(user.id) {
        Some(profile) if profile.is_admin() => Ok(AdminUser { user, profile }),
        _ => Err(Status::Forbidden),
    }
}

// ── Password utilities ──

pub fn hash_password(password: &str) -> Result<String, String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST).map_err(|e| e.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

// ── Sign-in ──

#[derive(Debug, PartialEq)]
pub enum LoginError {
    BadCredentials,
    NotAdmin,
    Internal(String),
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginError::BadCredentials => write!(f, "邮箱或密码错误"),
            LoginError::NotAdmin => write!(f, "您没有管理员权限"),
            LoginError::Internal(e) => write!(f, "{}", e),
        }
    }
}

/// Checks credentials and the admin role, then opens a session.
pub fn sign_in(
    store: &dyn Store,
    email: &str,
    password: &str,
    ip: Option<&str>,
    ua: Option<&str>,
) -> Result<String, LoginError> {
    let user = store
        .user_get_by_email(email.trim())
        .filter(|u| verify_password(password, &u.password_hash))
        .ok_or(LoginError::BadCredentials)?;

    if !store.profile_get(user.id).map(|p| p.is_admin()).unwrap_or(false) {
        return Err(LoginError::NotAdmin);
    }

    let token = create_session(store, user.id, ip, ua).map_err(LoginError::Internal)?;
    let _ = store.user_touch_last_login(user.id);
    Ok(token)
}

// ── Session management ──

pub fn create_session(
    store: &dyn Store,
    user_id: i64,
    ip: Option<&str>,
    ua: Option<&str>,
) -> Result<String, String> {
    let expiry_hours = store.setting_get_i64("session_expiry_hours").max(1);
    let token = uuid::Uuid::new_v4().to_string();
    let expires = Utc::now().naive_utc() + Duration::hours(expiry_hours);
    let expires_str = expires.format("%Y-%m-%d %H:%M:%S").to_string();

    store.session_create(user_id, &token, &expires_str, ip, ua)?;
    Ok(token)
}

pub fn destroy_session(store: &dyn Store, token: &str) -> Result<(), String> {
    store.session_delete(token)
}

pub fn session_token(cookies: &CookieJar<'_>) -> Option<String> {
    cookies.get_private(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// `Secure` is set when the configured site URL is https.
pub fn set_session_cookie(cookies: &CookieJar<'_>, token: &str, store: &dyn Store) {
    let secure = store.setting_get_or("site_url", "").starts_with("https://");
    let mut cookie = Cookie::new(SESSION_COOKIE, token.to_string());
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Strict);
    cookie.set_path("/");
    cookie.set_secure(secure);
    cookies.add_private(cookie);
}

pub fn clear_session_cookie(cookies: &CookieJar<'_>) {
    cookies.remove_private(Cookie::from(SESSION_COOKIE));
}

pub fn hash_ip(ip: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(ip.as_bytes());
    hex::encode(hasher.finalize())
}

/// Creates the configured first admin when the users table is empty.
pub fn bootstrap_admin(store: &dyn Store, email: &str, password: &str) -> Result<bool, String> {
    if store.user_count() > 0 {
        return Ok(false);
    }
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        log::warn!("No users exist and no bootstrap admin is configured; admin panel is unreachable");
        return Ok(false);
    }
    let hash = hash_password(password)?;
    store.user_create(email, &hash, "管理员", "admin")?;
    log::info!("Created bootstrap admin {}", email);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::test_store;

    fn fast_hash(pw: &str) -> String {
        bcrypt::hash(pw, 4).unwrap()
    }

    #[test]
    fn only_admins_can_sign_in() {
        let store = test_store();
        store.user_create("boss@chaolai.cn", &fast_hash("secret"), "老板", "admin").unwrap();
        store.user_create("guest@chaolai.cn", &fast_hash("secret"), "", "user").unwrap();

        assert_eq!(
            sign_in(&store, "boss@chaolai.cn", "wrong", None, None),
            Err(LoginError::BadCredentials)
        );
        assert_eq!(
            sign_in(&store, "guest@chaolai.cn", "secret", None, None),
            Err(LoginError::NotAdmin)
        );
        let token = sign_in(&store, "Boss@Chaolai.cn", "secret", Some("127.0.0.1"), None).unwrap();
        let admin = resolve_admin(&store, &token).ok().unwrap();
        assert_eq!(admin.display_name(), "老板");
        assert!(store.user_get_by_id(admin.user.id).unwrap().last_login_at.is_some());

        destroy_session(&store, &token).unwrap();
        assert_eq!(resolve_admin(&store, &token).err(), Some(Status::Unauthorized));
    }

    #[test]
    fn non_admin_session_is_forbidden() {
        let store = test_store();
        let id = store.user_create("guest@chaolai.cn", &fast_hash("x"), "", "user").unwrap();
        let token = create_session(&store, id, None, None).unwrap();
        assert_eq!(resolve_admin(&store, &token).err(), Some(Status::Forbidden));
    }

    #[test]
    fn bootstrap_only_on_empty_users() {
        let store = test_store();
        assert_eq!(bootstrap_admin(&store, "", ""), Ok(false));
        store.user_create("a@b.cn", &fast_hash("x"), "", "admin").unwrap();
        assert_eq!(bootstrap_admin(&store, "c@d.cn", "pw"), Ok(false));
        assert_eq!(store.user_count(), 1);
    }

    #[test]
    fn ip_hash_is_stable_hex() {
        assert_eq!(hash_ip("1.2.3.4"), hash_ip("1.2.3.4"));
        assert_eq!(hash_ip("1.2.3.4").len(), 64);
    }
}
