use std::collections::HashMap;

use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use serde_json::{Map, Value};

use crate::db::DbPool;
use crate::error::{StoreError, StoreResult};
use crate::models::collection::{Collection, FieldKind, FieldSpec, OrderedRecord, RecordFields};
use crate::models::content::FooterConfig;
use crate::models::site_setting::{resolve_category, SiteSetting, SiteSettingSeed};
use crate::models::submission::{NewSubmission, Submission, SubmissionKind, DUPLICATE_WINDOW_HOURS};
use crate::models::user::{Profile, User};
use crate::resolver;

use super::Store;

/// SQLite-backed implementation of the Store trait.
/// Wraps the r2d2 connection pool; ordered tables share one generic accessor
/// driven by each collection's field list.
pub struct SqliteStore {
    pub pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn new_at(path: &str) -> Result<Self, String> {
        let pool = crate::db::init_pool_at(path)?;
        Ok(Self { pool })
    }
}

// ── Row mapping helpers ─────────────────────────────────────────────

fn count_recent_by_email(conn: &Connection, kind: SubmissionKind, email: &str, hours: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        &format!(
            "SELECT COUNT(*) FROM {} WHERE lower(email) = lower(?1) AND created_at > datetime('now', ?2)",
            kind.table()
        ),
        params![email.trim(), format!("-{} hours", hours)],
        |row| row.get(0),
    )
}

fn count_menu_items(conn: &Connection, category: &str) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM menu_items WHERE category = ?1",
        params![category],
        |row| row.get(0),
    )
}

const RECORD_META: &str = "id, sort_order, is_active, version, created_at, updated_at";

fn record_select(c: Collection) -> String {
    let names: Vec<&str> = c.fields().iter().map(|f| f.name).collect();
    format!("SELECT {}, {} FROM {}", RECORD_META, names.join(", "), c.table())
}

fn json_from_sql(spec: &FieldSpec, v: ValueRef<'_>) -> Value {
    match v {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => match spec.kind {
            FieldKind::Bool => Value::Bool(n != 0),
            FieldKind::Real { .. } => Value::from(n as f64),
            _ => Value::from(n),
        },
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}

/// Binding for one domain column. Missing booleans and integers fall back to
/// their column default so NOT NULL constraints hold.
pub(crate) fn to_sql_value(spec: &FieldSpec, v: Option<&Value>) -> SqlValue {
    match (spec.kind, v) {
        (FieldKind::Bool, None | Some(Value::Null)) => SqlValue::Integer(0),
        (FieldKind::Integer { min, .. }, None | Some(Value::Null)) => SqlValue::Integer(min.max(0)),
        (_, None | Some(Value::Null)) => SqlValue::Null,
        (_, Some(Value::Bool(b))) => SqlValue::Integer(*b as i64),
        (FieldKind::Real { .. }, Some(Value::Number(n))) => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        (_, Some(Value::Number(n))) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(0.0)),
        },
        (_, Some(Value::String(s))) => SqlValue::Text(s.clone()),
        (_, Some(other)) => SqlValue::Text(other.to_string()),
    }
}

fn row_to_record(c: Collection, row: &Row<'_>) -> rusqlite::Result<OrderedRecord> {
    let mut fields = Map::new();
    for (i, spec) in c.fields().iter().enumerate() {
        fields.insert(spec.name.to_string(), json_from_sql(spec, row.get_ref(6 + i)?));
    }
    Ok(OrderedRecord {
        id: row.get(0)?,
        sort_order: row.get(1)?,
        is_active: row.get::<_, i64>(2)? != 0,
        version: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        fields,
    })
}

fn load_record(conn: &Connection, c: Collection, id: i64) -> StoreResult<OrderedRecord> {
    let sql = format!("{} WHERE id = ?1", record_select(c));
    conn.query_row(&sql, params![id], |row| row_to_record(c, row))
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("{} #{}", c.label(), id)))
}

fn is_blank(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn check_version(expected: Option<i64>, found: i64) -> StoreResult<()> {
    match expected {
        Some(expected) if expected != found => Err(StoreError::Conflict { expected, found }),
        _ => Ok(()),
    }
}

const SETTING_COLUMNS: &str = "id, page, key, value, description, category, version, updated_at";

fn row_to_site_setting(row: &Row<'_>) -> rusqlite::Result<SiteSetting> {
    Ok(SiteSetting {
        id: row.get(0)?,
        page: row.get(1)?,
        key: row.get(2)?,
        value: row.get(3)?,
        description: row.get(4)?,
        category: row.get(5)?,
        version: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

fn submission_columns(kind: SubmissionKind) -> &'static str {
    match kind {
        SubmissionKind::Contact => {
            "id, name, email, phone, NULL, message, status, notes, created_at, updated_at"
        }
        SubmissionKind::Franchise => {
            "id, name, email, phone, city, COALESCE(message, ''), status, notes, created_at, updated_at"
        }
    }
}

fn row_to_submission(kind: SubmissionKind, row: &Row<'_>) -> rusqlite::Result<Submission> {
    Ok(Submission {
        id: row.get(0)?,
        kind,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        city: row.get(4)?,
        message: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn load_submission(conn: &Connection, kind: SubmissionKind, id: i64) -> StoreResult<Submission> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        submission_columns(kind),
        kind.table()
    );
    conn.query_row(&sql, params![id], |row| row_to_submission(kind, row))
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("{} #{}", kind.label(), id)))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        last_login_at: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl Store for SqliteStore {
    // ── Lifecycle ───────────────────────────────────────────────────

    fn run_migrations(&self) -> Result<(), String> {
        crate::db::run_migrations(&self.pool).map_err(|e| e.to_string())
    }

    fn seed_defaults(&self) -> Result<(), String> {
        crate::db::seed_defaults(&self.pool).map_err(|e| e.to_string())?;

        // Page copy: missing keys only, admin edits are never overwritten.
        let mut added = 0;
        for page in resolver::PAGES_WITH_DEFAULTS {
            for (key, value) in resolver::page_defaults(page) {
                let seed = SiteSettingSeed {
                    page: page.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                    description: None,
                };
                if self.site_setting_upsert(&seed).map_err(|e| e.to_string())? {
                    added += 1;
                }
            }
        }
        if added > 0 {
            log::info!("Seeded {} page copy settings", added);
        }

        // Starter collections are inserted once, so an admin emptying a table
        // does not see it refilled on the next restart.
        if self.setting_get("content_seeded").as_deref() != Some("true") {
            crate::db::seed_starter_content(&self.pool).map_err(|e| e.to_string())?;
            self.setting_set("content_seeded", "true")?;
        }
        Ok(())
    }

    // ── App settings ────────────────────────────────────────────────

    fn setting_get(&self, key: &str) -> Option<String> {
        let conn = self.pool.get().ok()?;
        conn.query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| row.get(0))
            .optional()
            .ok()
            .flatten()
    }

    fn setting_set(&self, key: &str, value: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    // ── Site settings ───────────────────────────────────────────────

    fn site_setting_list(&self) -> StoreResult<Vec<SiteSetting>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM site_settings ORDER BY page ASC, key ASC, id ASC",
            SETTING_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], row_to_site_setting)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn site_setting_by_page(&self, page: &str) -> StoreResult<Vec<SiteSetting>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM site_settings WHERE page = ?1 ORDER BY key ASC, id ASC",
            SETTING_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![page], row_to_site_setting)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn site_setting_page(&self, page: &str) -> StoreResult<HashMap<String, String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM site_settings WHERE page = ?1 ORDER BY updated_at ASC, id ASC",
        )?;
        let mut map = HashMap::new();
        let rows = stmt.query_map(params![page], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (k, v) = row?;
            map.insert(k, v);
        }
        Ok(map)
    }

    fn site_setting_get(&self, id: i64) -> StoreResult<SiteSetting> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT {} FROM site_settings WHERE id = ?1", SETTING_COLUMNS),
            params![id],
            row_to_site_setting,
        )
        .optional()?
        .ok_or_else(|| StoreError::NotFound(format!("页面设置 #{}", id)))
    }

    fn site_setting_update(
        &self,
        id: i64,
        value: &str,
        expected_version: Option<i64>,
    ) -> StoreResult<SiteSetting> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let (page, key, version): (String, String, i64) = tx
            .query_row(
                "SELECT page, key, version FROM site_settings WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(format!("页面设置 #{}", id)))?;
        check_version(expected_version, version)?;
        tx.execute(
            "UPDATE site_settings
             SET value = ?1, category = ?2, version = version + 1, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?3",
            params![value, resolve_category(&page, &key), id],
        )?;
        let saved = tx.query_row(
            &format!("SELECT {} FROM site_settings WHERE id = ?1", SETTING_COLUMNS),
            params![id],
            row_to_site_setting,
        )?;
        tx.commit()?;
        Ok(saved)
    }

    fn site_setting_upsert(&self, seed: &SiteSettingSeed) -> StoreResult<bool> {
        let conn = self.pool.get()?;
        let exists: i64 = conn.query_row(
            "SELECT COUNT(*) FROM site_settings WHERE page = ?1 AND key = ?2",
            params![seed.page, seed.key],
            |row| row.get(0),
        )?;
        if exists > 0 {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO site_settings (page, key, value, description, category)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                seed.page,
                seed.key,
                seed.value,
                seed.description,
                resolve_category(&seed.page, &seed.key)
            ],
        )?;
        Ok(true)
    }

    // ── Ordered collections ─────────────────────────────────────────

    fn collection_list(&self, c: Collection, active_only: bool) -> StoreResult<Vec<OrderedRecord>> {
        let conn = self.pool.get()?;
        let filter = if active_only { " WHERE is_active = 1" } else { "" };
        let sql = format!("{}{} ORDER BY sort_order ASC, id ASC", record_select(c), filter);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| row_to_record(c, row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn collection_get(&self, c: Collection, id: i64) -> StoreResult<OrderedRecord> {
        let conn = self.pool.get()?;
        load_record(&conn, c, id)
    }

    fn collection_count(&self, c: Collection) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {}", c.table()), [], |row| row.get(0))?)
    }

    fn collection_create(&self, c: Collection, fields: &RecordFields) -> StoreResult<OrderedRecord> {
        for spec in c.fields() {
            if spec.required && spec.kind != FieldKind::Bool && is_blank(fields.values.get(spec.name)) {
                return Err(StoreError::Invalid(format!("{}不能为空", spec.label)));
            }
        }

        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let next: i64 = tx.query_row(
            &format!("SELECT COALESCE(MAX(sort_order), 0) + 1 FROM {}", c.table()),
            [],
            |row| row.get(0),
        )?;

        let names: Vec<&str> = c.fields().iter().map(|f| f.name).collect();
        let placeholders: Vec<String> = (1..=names.len() + 2).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}, sort_order, is_active) VALUES ({})",
            c.table(),
            names.join(", "),
            placeholders.join(", ")
        );
        let mut values: Vec<SqlValue> = c
            .fields()
            .iter()
            .map(|spec| to_sql_value(spec, fields.values.get(spec.name)))
            .collect();
        values.push(SqlValue::Integer(next));
        values.push(SqlValue::Integer(fields.is_active.unwrap_or(true) as i64));
        tx.execute(&sql, params_from_iter(values))?;
        let id = tx.last_insert_rowid();
        let rec = load_record(&tx, c, id)?;
        tx.commit()?;
        Ok(rec)
    }

    fn collection_update(
        &self,
        c: Collection,
        id: i64,
        fields: &RecordFields,
        expected_version: Option<i64>,
    ) -> StoreResult<OrderedRecord> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let current = load_record(&tx, c, id)?;
        check_version(expected_version, current.version)?;

        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();
        for spec in c.fields() {
            if let Some(v) = fields.values.get(spec.name) {
                if spec.required && spec.kind != FieldKind::Bool && is_blank(Some(v)) {
                    return Err(StoreError::Invalid(format!("{}不能为空", spec.label)));
                }
                values.push(to_sql_value(spec, Some(v)));
                sets.push(format!("{} = ?{}", spec.name, values.len()));
            }
        }
        if let Some(active) = fields.is_active {
            values.push(SqlValue::Integer(active as i64));
            sets.push(format!("is_active = ?{}", values.len()));
        }
        if let Some(order) = fields.sort_order {
            values.push(SqlValue::Integer(order));
            sets.push(format!("sort_order = ?{}", values.len()));
        }
        sets.push("version = version + 1".to_string());
        sets.push("updated_at = CURRENT_TIMESTAMP".to_string());
        values.push(SqlValue::Integer(id));
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            c.table(),
            sets.join(", "),
            values.len()
        );
        tx.execute(&sql, params_from_iter(values))?;

        if c == Collection::MenuCategories {
            let old_name = current.get_str("name");
            if let Some(new_name) = fields.get_str("name") {
                if !old_name.is_empty() && new_name != old_name {
                    tx.execute(
                        "UPDATE menu_items SET category = ?1, updated_at = CURRENT_TIMESTAMP
                         WHERE category = ?2",
                        params![new_name, old_name],
                    )?;
                }
            }
        }

        let rec = load_record(&tx, c, id)?;
        tx.commit()?;
        Ok(rec)
    }

    fn collection_delete(&self, c: Collection, id: i64) -> StoreResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let current = load_record(&tx, c, id)?;
        if c == Collection::MenuCategories {
            let name = current.get_str("name");
            let used = count_menu_items(&tx, name)?;
            if used > 0 {
                return Err(StoreError::InUse(format!(
                    "分类「{}」下还有 {} 个菜品，无法删除",
                    name, used
                )));
            }
        }
        tx.execute(&format!("DELETE FROM {} WHERE id = ?1", c.table()), params![id])?;
        tx.commit()?;
        Ok(())
    }

    fn collection_toggle_active(&self, c: Collection, id: i64) -> StoreResult<OrderedRecord> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            &format!(
                "UPDATE {} SET is_active = 1 - is_active, version = version + 1,
                 updated_at = CURRENT_TIMESTAMP WHERE id = ?1",
                c.table()
            ),
            params![id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} #{}", c.label(), id)));
        }
        let rec = load_record(&tx, c, id)?;
        tx.commit()?;
        Ok(rec)
    }

    fn collection_swap_sort(&self, c: Collection, a: i64, b: i64) -> StoreResult<()> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let first = load_record(&tx, c, a)?;
        let second = load_record(&tx, c, b)?;
        let sql = format!(
            "UPDATE {} SET sort_order = ?1, version = version + 1, updated_at = CURRENT_TIMESTAMP
             WHERE id = ?2",
            c.table()
        );
        tx.execute(&sql, params![second.sort_order, a])?;
        tx.execute(&sql, params![first.sort_order, b])?;
        tx.commit()?;
        Ok(())
    }

    fn menu_items_in_category(&self, category: &str) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        Ok(count_menu_items(&conn, category)?)
    }

    // ── Footer ──────────────────────────────────────────────────────

    fn footer_get(&self) -> StoreResult<FooterConfig> {
        let conn = self.pool.get()?;
        Ok(conn
            .query_row(
                "SELECT brand_name, brand_description FROM footer_config WHERE id = 1",
                [],
                |row| {
                    Ok(FooterConfig {
                        brand_name: row.get(0)?,
                        brand_description: row.get(1)?,
                    })
                },
            )
            .optional()?
            .unwrap_or_default())
    }

    fn footer_save(&self, footer: &FooterConfig) -> StoreResult<()> {
        if footer.brand_name.trim().is_empty() {
            return Err(StoreError::Invalid("品牌名称不能为空".to_string()));
        }
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO footer_config (id, brand_name, brand_description, updated_at)
             VALUES (1, ?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(id) DO UPDATE SET brand_name = ?1, brand_description = ?2,
                 updated_at = CURRENT_TIMESTAMP",
            params![footer.brand_name, footer.brand_description],
        )?;
        Ok(())
    }

    // ── Submissions ─────────────────────────────────────────────────

    fn submission_create(&self, kind: SubmissionKind, form: &NewSubmission) -> StoreResult<Submission> {
        let mut conn = self.pool.get()?;
        match kind {
            SubmissionKind::Contact => {
                conn.execute(
                    "INSERT INTO contact_submissions (name, email, phone, message, status)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![form.name, form.email, form.phone, form.message, kind.initial_status()],
                )?;
                load_submission(&conn, kind, conn.last_insert_rowid())
            }
            SubmissionKind::Franchise => {
                let city = form
                    .city
                    .as_deref()
                    .ok_or_else(|| StoreError::Invalid("请填写意向城市".to_string()))?;
                let message = if form.message.is_empty() { None } else { Some(form.message.as_str()) };

                // Write lock up front so concurrent applications see each other.
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                if count_recent_by_email(&tx, kind, &form.email, DUPLICATE_WINDOW_HOURS)? > 0 {
                    return Err(StoreError::Duplicate(
                        "您在24小时内已提交过加盟申请，我们会尽快与您联系，请勿重复提交".to_string(),
                    ));
                }
                tx.execute(
                    "INSERT INTO franchise_applications (name, phone, email, city, message, status)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![form.name, form.phone, form.email, city, message, kind.initial_status()],
                )?;
                let created = load_submission(&tx, kind, tx.last_insert_rowid())?;
                tx.commit()?;
                Ok(created)
            }
        }
    }

    fn submission_list(&self, kind: SubmissionKind) -> StoreResult<Vec<Submission>> {
        let conn = self.pool.get()?;
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at DESC, id DESC",
            submission_columns(kind),
            kind.table()
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| row_to_submission(kind, row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn submission_update_status(&self, kind: SubmissionKind, id: i64, status: &str) -> StoreResult<Submission> {
        if !kind.is_valid_status(status) {
            return Err(StoreError::Invalid(format!("无效的状态: {}", status)));
        }
        let conn = self.pool.get()?;
        let changed = conn.execute(
            &format!(
                "UPDATE {} SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                kind.table()
            ),
            params![status, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} #{}", kind.label(), id)));
        }
        load_submission(&conn, kind, id)
    }

    fn submission_save_notes(&self, kind: SubmissionKind, id: i64, notes: &str) -> StoreResult<Submission> {
        let notes = notes.trim();
        let notes = if notes.is_empty() { None } else { Some(notes) };
        let mut conn = self.pool.get()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            &format!(
                "UPDATE {} SET notes = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
                kind.table()
            ),
            params![notes, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} #{}", kind.label(), id)));
        }
        if let Some(status) = kind.status_after_notes() {
            tx.execute(
                &format!("UPDATE {} SET status = ?1 WHERE id = ?2", kind.table()),
                params![status, id],
            )?;
        }
        let saved = load_submission(&tx, kind, id)?;
        tx.commit()?;
        Ok(saved)
    }

    fn submission_delete(&self, kind: SubmissionKind, id: i64) -> StoreResult<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute(&format!("DELETE FROM {} WHERE id = ?1", kind.table()), params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(format!("{} #{}", kind.label(), id)));
        }
        Ok(())
    }

    fn submission_count(&self, kind: SubmissionKind, status: Option<&str>) -> StoreResult<i64> {
        let conn = self.pool.get()?;
        let count = match status {
            Some(st) => conn.query_row(
                &format!("SELECT COUNT(*) FROM {} WHERE status = ?1", kind.table()),
                params![st],
                |row| row.get(0),
            )?,
            None => conn.query_row(&format!("SELECT COUNT(*) FROM {}", kind.table()), [], |row| {
                row.get(0)
            })?,
        };
        Ok(count)
    }

    // ── Users ───────────────────────────────────────────────────────

    fn user_get_by_id(&self, id: i64) -> Option<User> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT id, email, password_hash, last_login_at, created_at FROM users WHERE id = ?1",
            params![id],
            row_to_user,
        )
        .ok()
    }

    fn user_get_by_email(&self, email: &str) -> Option<User> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT id, email, password_hash, last_login_at, created_at FROM users
             WHERE lower(email) = lower(?1)",
            params![email.trim()],
            row_to_user,
        )
        .ok()
    }

    fn user_count(&self) -> i64 {
        let conn = match self.pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap_or(0)
    }

    fn user_create(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: &str,
    ) -> Result<i64, String> {
        let mut conn = self.pool.get().map_err(|e| e.to_string())?;
        let tx = conn.transaction().map_err(|e| e.to_string())?;
        tx.execute(
            "INSERT INTO users (email, password_hash) VALUES (?1, ?2)",
            params![email.trim().to_lowercase(), password_hash],
        )
        .map_err(|e| e.to_string())?;
        let id = tx.last_insert_rowid();
        let full_name = if full_name.trim().is_empty() { None } else { Some(full_name.trim()) };
        tx.execute(
            "INSERT INTO profiles (id, role, full_name) VALUES (?1, ?2, ?3)",
            params![id, role, full_name],
        )
        .map_err(|e| e.to_string())?;
        tx.commit().map_err(|e| e.to_string())?;
        Ok(id)
    }

    fn user_touch_last_login(&self, id: i64) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE users SET last_login_at = datetime('now') WHERE id = ?1",
            params![id],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn profile_get(&self, user_id: i64) -> Option<Profile> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT id, role, full_name FROM profiles WHERE id = ?1",
            params![user_id],
            |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    role: row.get(1)?,
                    full_name: row.get(2)?,
                })
            },
        )
        .ok()
    }

    // ── Sessions ────────────────────────────────────────────────────

    fn session_create(
        &self,
        user_id: i64,
        token: &str,
        expires_at: &str,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO sessions (id, user_id, created_at, expires_at, ip_address, user_agent)
             VALUES (?1, ?2, datetime('now'), ?3, ?4, ?5)",
            params![token, user_id, expires_at, ip, user_agent],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_get_user_id(&self, token: &str) -> Option<i64> {
        let conn = self.pool.get().ok()?;
        conn.query_row(
            "SELECT user_id FROM sessions WHERE id = ?1 AND expires_at > datetime('now')",
            params![token],
            |row| row.get(0),
        )
        .ok()
    }

    fn session_delete(&self, token: &str) -> Result<(), String> {
        let conn = self.pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM sessions WHERE id = ?1", params![token])
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    fn session_cleanup_expired(&self) -> usize {
        match self.pool.get() {
            Ok(conn) => conn
                .execute("DELETE FROM sessions WHERE expires_at <= datetime('now')", [])
                .unwrap_or(0),
            Err(_) => 0,
        }
    }
}
