use rocket::figment::Figment;
use serde::Deserialize;

/// Application section of the Rocket figment (`[default.chaolai]` in Rocket.toml,
/// or `ROCKET_CHAOLAI={...}` from the environment).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_path: String,
    pub uploads_dir: String,
    pub uploads_url_prefix: String,
    pub admin_slug: String,
    pub badge_poll_secs: u64,
    pub max_upload_bytes: u64,
    pub amap_key: String,
    pub amap_default_city: String,
    pub bootstrap_admin_email: String,
    pub bootstrap_admin_password: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: "website/db/chaolai.db".to_string(),
            uploads_dir: "website/uploads".to_string(),
            uploads_url_prefix: "/uploads".to_string(),
            admin_slug: "admin".to_string(),
            badge_poll_secs: 30,
            max_upload_bytes: 5 * 1024 * 1024,
            amap_key: String::new(),
            amap_default_city: "汕头市".to_string(),
            bootstrap_admin_email: String::new(),
            bootstrap_admin_password: String::new(),
        }
    }
}

impl AppConfig {
    pub const SECTION: &'static str = "chaolai";

    /// Extract the application section, falling back to defaults for anything missing.
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract_inner::<AppConfig>(Self::SECTION) {
            Ok(cfg) => cfg.normalized(),
            Err(e) => {
                if !e.missing() {
                    log::warn!("Invalid [{}] configuration, using defaults: {}", Self::SECTION, e);
                }
                AppConfig::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        self.admin_slug = self.admin_slug.trim_matches('/').to_string();
        if self.admin_slug.is_empty() {
            self.admin_slug = "admin".to_string();
        }
        self.uploads_url_prefix = format!("/{}", self.uploads_url_prefix.trim_matches('/'));
        self.badge_poll_secs = self.badge_poll_secs.max(1);
        self
    }

    pub fn admin_base(&self) -> String {
        format!("/{}", self.admin_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::providers::Serialized;

    #[test]
    fn missing_section_uses_defaults() {
        let cfg = AppConfig::from_figment(&Figment::new());
        assert_eq!(cfg.admin_slug, "admin");
        assert_eq!(cfg.badge_poll_secs, 30);
        assert_eq!(cfg.max_upload_bytes, 5 * 1024 * 1024);
    }

    #[test]
    fn section_values_are_normalized() {
        let figment = Figment::new()
            .merge(Serialized::default("chaolai.admin_slug", "/backstage/"))
            .merge(Serialized::default("chaolai.uploads_url_prefix", "media/"))
            .merge(Serialized::default("chaolai.badge_poll_secs", 0));
        let cfg = AppConfig::from_figment(&figment);
        assert_eq!(cfg.admin_slug, "backstage");
        assert_eq!(cfg.admin_base(), "/backstage");
        assert_eq!(cfg.uploads_url_prefix, "/media");
        assert_eq!(cfg.badge_poll_secs, 1);
        assert_eq!(cfg.database_path, "website/db/chaolai.db");
    }
}
