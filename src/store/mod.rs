use std::collections::HashMap;

use crate::error::StoreResult;
use crate::models::collection::{Collection, OrderedRecord, RecordFields};
use crate::models::content::FooterConfig;
use crate::models::site_setting::{SiteSetting, SiteSettingSeed};
use crate::models::submission::{NewSubmission, Submission, SubmissionKind};
use crate::models::user::{Profile, User};

pub mod sqlite;

/// Unified data-access trait. Every database operation goes through here.
/// Implementation: `SqliteStore` (wraps rusqlite/r2d2).
pub trait Store: Send + Sync {
    // ── Lifecycle ───────────────────────────────────────────────────
    fn run_migrations(&self) -> Result<(), String>;
    fn seed_defaults(&self) -> Result<(), String>;

    // ── App settings ────────────────────────────────────────────────
    fn setting_get(&self, key: &str) -> Option<String>;
    fn setting_get_or(&self, key: &str, default: &str) -> String {
        self.setting_get(key).unwrap_or_else(|| default.to_string())
    }
    fn setting_get_i64(&self, key: &str) -> i64 {
        self.setting_get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }
    fn setting_set(&self, key: &str, value: &str) -> Result<(), String>;

    // ── Site settings (page copy) ───────────────────────────────────
    /// Every row, ordered by page then key.
    fn site_setting_list(&self) -> StoreResult<Vec<SiteSetting>>;
    fn site_setting_by_page(&self, page: &str) -> StoreResult<Vec<SiteSetting>>;
    /// key -> value for one page. Duplicate keys resolve to the most recently written row.
    fn site_setting_page(&self, page: &str) -> StoreResult<HashMap<String, String>>;
    fn site_setting_get(&self, id: i64) -> StoreResult<SiteSetting>;
    /// Writes a new value, recomputing the stored category. With `expected_version`
    /// set, a stale version is rejected with `Conflict`.
    fn site_setting_update(
        &self,
        id: i64,
        value: &str,
        expected_version: Option<i64>,
    ) -> StoreResult<SiteSetting>;
    /// Inserts `(page, key)` when missing; existing rows are left untouched.
    fn site_setting_upsert(&self, seed: &SiteSettingSeed) -> StoreResult<bool>;

    // ── Ordered collections ─────────────────────────────────────────
    /// Sorted by `sort_order` ascending, then id.
    fn collection_list(&self, c: Collection, active_only: bool) -> StoreResult<Vec<OrderedRecord>>;
    fn collection_get(&self, c: Collection, id: i64) -> StoreResult<OrderedRecord>;
    fn collection_count(&self, c: Collection) -> StoreResult<i64>;
    /// Appends at `max(sort_order) + 1`; any supplied sort order is ignored.
    fn collection_create(&self, c: Collection, fields: &RecordFields) -> StoreResult<OrderedRecord>;
    fn collection_update(
        &self,
        c: Collection,
        id: i64,
        fields: &RecordFields,
        expected_version: Option<i64>,
    ) -> StoreResult<OrderedRecord>;
    fn collection_delete(&self, c: Collection, id: i64) -> StoreResult<()>;
    fn collection_toggle_active(&self, c: Collection, id: i64) -> StoreResult<OrderedRecord>;
    /// Exchanges the sort orders of two rows in one transaction.
    fn collection_swap_sort(&self, c: Collection, a: i64, b: i64) -> StoreResult<()>;
    fn menu_items_in_category(&self, category: &str) -> StoreResult<i64>;

    // ── Footer ──────────────────────────────────────────────────────
    fn footer_get(&self) -> StoreResult<FooterConfig>;
    fn footer_save(&self, footer: &FooterConfig) -> StoreResult<()>;

    // ── Submissions ─────────────────────────────────────────────────
    fn submission_create(&self, kind: SubmissionKind, form: &NewSubmission) -> StoreResult<Submission>;
    /// Newest first.
    fn submission_list(&self, kind: SubmissionKind) -> StoreResult<Vec<Submission>>;
    fn submission_update_status(&self, kind: SubmissionKind, id: i64, status: &str) -> StoreResult<Submission>;
    fn submission_save_notes(&self, kind: SubmissionKind, id: i64, notes: &str) -> StoreResult<Submission>;
    fn submission_delete(&self, kind: SubmissionKind, id: i64) -> StoreResult<()>;
    fn submission_count(&self, kind: SubmissionKind, status: Option<&str>) -> StoreResult<i64>;

    // ── Users ───────────────────────────────────────────────────────
    fn user_get_by_id(&self, id: i64) -> Option<User>;
    fn user_get_by_email(&self, email: &str) -> Option<User>;
    fn user_count(&self) -> i64;
    /// Creates the credentials row and its profile together.
    fn user_create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: &str,
    ) -> Result<i64, String>;
    fn user_touch_last_login(&self, id: i64) -> Result<(), String>;
    fn profile_get(&self, user_id: i64) -> Option<Profile>;

    // ── Sessions ────────────────────────────────────────────────────
    fn session_create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), String>;
    fn session_get_user_id(&self, token: &str) -> Option<i64>;
    fn session_delete(&self, token: &str) -> Result<(), String>;
    fn session_cleanup_expired(&self) -> usize;
}
