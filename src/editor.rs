//! Admin editing state: the per-collection add/edit form and the bulk
//! settings editor.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::models::collection::{Collection, FieldErrors, OrderedRecord, RecordFields};
use crate::models::site_setting::{category_label, page_info, SettingFilter, SiteSetting, PAGES};
use crate::store::Store;

// ── Collection form ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "mode", content = "id", rename_all = "lowercase")]
pub enum FormMode {
    Add,
    Edit(i64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditorState {
    Idle,
    FormOpen {
        mode: FormMode,
        /// Raw form values as the admin typed them.
        draft: HashMap<String, String>,
        /// Version the edit started from; checked on save.
        version: Option<i64>,
        field_errors: FieldErrors,
        error: Option<String>,
    },
}

/// What a submit produced: the saved row and the state to render next.
pub struct SubmitOutcome {
    pub state: EditorState,
    pub saved: Option<OrderedRecord>,
}

fn value_to_input(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(true) => "on".to_string(),
        Value::Bool(false) => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl EditorState {
    pub fn start_add() -> Self {
        let mut draft = HashMap::new();
        draft.insert("is_active".to_string(), "on".to_string());
        EditorState::FormOpen {
            mode: FormMode::Add,
            draft,
            version: None,
            field_errors: FieldErrors::new(),
            error: None,
        }
    }

    pub fn start_edit(record: &OrderedRecord) -> Self {
        let mut draft: HashMap<String, String> = record
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), value_to_input(v)))
            .collect();
        if record.is_active {
            draft.insert("is_active".to_string(), "on".to_string());
        }
        draft.insert("sort_order".to_string(), record.sort_order.to_string());
        EditorState::FormOpen {
            mode: FormMode::Edit(record.id),
            draft,
            version: Some(record.version),
            field_errors: FieldErrors::new(),
            error: None,
        }
    }

    /// Re-open a form from a posted body (the server-side counterpart of the
    /// form staying open between keystrokes).
    pub fn reopen(mode: FormMode, draft: HashMap<String, String>) -> Self {
        let version = draft.get("version").and_then(|v| v.trim().parse().ok());
        EditorState::FormOpen {
            mode,
            draft,
            version,
            field_errors: FieldErrors::new(),
            error: None,
        }
    }

    /// Validate and persist. Success returns to `Idle`; any failure keeps the
    /// form open with the draft intact and the error attached.
    pub fn submit(self, store: &dyn Store, c: Collection) -> SubmitOutcome {
        let (mode, draft, version) = match self {
            EditorState::Idle => {
                return SubmitOutcome { state: EditorState::Idle, saved: None };
            }
            EditorState::FormOpen { mode, draft, version, .. } => (mode, draft, version),
        };

        let fields = match RecordFields::from_form(c, &draft) {
            Ok(f) => f,
            Err(field_errors) => {
                return SubmitOutcome {
                    state: EditorState::FormOpen { mode, draft, version, field_errors, error: None },
                    saved: None,
                }
            }
        };

        let result = match mode {
            FormMode::Add => store.collection_create(c, &fields),
            FormMode::Edit(id) => store.collection_update(c, id, &fields, version),
        };

        match result {
            Ok(rec) => {
                log::info!("Saved {} #{}", c.table(), rec.id);
                SubmitOutcome { state: EditorState::Idle, saved: Some(rec) }
            }
            Err(e) => SubmitOutcome {
                state: EditorState::FormOpen {
                    mode,
                    draft,
                    version,
                    field_errors: FieldErrors::new(),
                    error: Some(e.to_string()),
                },
                saved: None,
            },
        }
    }
}

/// Deletes only after the explicit confirmation step has been answered.
pub fn confirm_delete(store: &dyn Store, c: Collection, id: i64, confirmation: Option<&str>) -> StoreResult<()> {
    if confirmation != Some("yes") {
        return Err(StoreError::Invalid("请先确认删除操作".to_string()));
    }
    store.collection_delete(c, id)?;
    log::info!("Deleted {} #{}", c.table(), id);
    Ok(())
}

// ── Settings editor ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettingRow {
    pub saved: SiteSetting,
    pub edited: String,
    /// Version the edit started from; a save against a newer row is a conflict.
    pub base_version: i64,
}

impl SettingRow {
    pub fn is_dirty(&self) -> bool {
        self.edited != self.saved.value
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryGroup {
    pub id: String,
    pub label: String,
    pub rows: Vec<SettingRow>,
}

#[derive(Debug, Serialize)]
pub struct PageGroup {
    pub page: String,
    pub label: String,
    pub categories: Vec<CategoryGroup>,
}

#[derive(Debug)]
pub struct SaveAllReport {
    pub saved: usize,
    /// Key and error of the row that stopped the run. Rows saved before it stay saved.
    pub failed: Option<(String, StoreError)>,
}

/// Tracks the last saved value of every setting next to the value being edited.
#[derive(Debug, Default)]
pub struct SettingsEditor {
    rows: Vec<SettingRow>,
}

impl SettingsEditor {
    pub fn load(store: &dyn Store) -> StoreResult<Self> {
        Ok(Self::from_settings(store.site_setting_list()?))
    }

    pub fn from_settings(settings: Vec<SiteSetting>) -> Self {
        SettingsEditor {
            rows: settings
                .into_iter()
                .map(|s| SettingRow {
                    edited: s.value.clone(),
                    base_version: s.version,
                    saved: s,
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[SettingRow] {
        &self.rows
    }

    pub fn edit(&mut self, id: i64, value: &str) -> bool {
        match self.rows.iter_mut().find(|r| r.saved.id == id) {
            Some(row) => {
                row.edited = value.to_string();
                true
            }
            None => false,
        }
    }

    /// Apply posted `value_<id>` fields and the `version_<id>` each was loaded at.
    pub fn apply_form(&mut self, form: &HashMap<String, String>) {
        for (name, value) in form {
            if let Some(id) = name.strip_prefix("value_").and_then(|s| s.parse::<i64>().ok()) {
                self.edit(id, value);
            } else if let Some(id) = name.strip_prefix("version_").and_then(|s| s.parse::<i64>().ok()) {
                if let (Some(row), Ok(v)) = (self.rows.iter_mut().find(|r| r.saved.id == id), value.trim().parse()) {
                    row.base_version = v;
                }
            }
        }
    }

    pub fn dirty_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_dirty()).count()
    }

    pub fn save_one(&mut self, store: &dyn Store, id: i64) -> StoreResult<SiteSetting> {
        let row = self
            .rows
            .iter_mut()
            .find(|r| r.saved.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("页面设置 #{}", id)))?;
        let saved = store.site_setting_update(id, &row.edited, Some(row.base_version))?;
        row.base_version = saved.version;
        row.saved = saved.clone();
        row.edited = saved.value.clone();
        Ok(saved)
    }

    /// Saves dirty rows one after another, stopping at the first failure.
    pub fn save_all(&mut self, store: &dyn Store) -> SaveAllReport {
        let dirty: Vec<i64> = self.rows.iter().filter(|r| r.is_dirty()).map(|r| r.saved.id).collect();
        let mut saved = 0;
        for id in dirty {
            if let Err(e) = self.save_one(store, id) {
                let key = self
                    .rows
                    .iter()
                    .find(|r| r.saved.id == id)
                    .map(|r| r.saved.key.clone())
                    .unwrap_or_default();
                return SaveAllReport { saved, failed: Some((key, e)) };
            }
            saved += 1;
        }
        SaveAllReport { saved, failed: None }
    }

    /// Rows matching `filter`, grouped by page then stored category, in the
    /// page order of the admin navigation.
    pub fn grouped(&self, filter: &SettingFilter) -> Vec<PageGroup> {
        let mut pages: Vec<String> = PAGES.iter().map(|p| p.id.to_string()).collect();
        for row in &self.rows {
            if !pages.contains(&row.saved.page) {
                pages.push(row.saved.page.clone());
            }
        }

        let mut out = Vec::new();
        for page in pages {
            let rows: Vec<&SettingRow> = self
                .rows
                .iter()
                .filter(|r| r.saved.page == page && filter.matches(&r.saved))
                .collect();
            if rows.is_empty() {
                continue;
            }
            let mut cat_order: Vec<String> = page_info(&page)
                .map(|info| info.categories.iter().map(|(id, _, _)| id.to_string()).collect())
                .unwrap_or_default();
            cat_order.push(crate::models::site_setting::GENERAL_CATEGORY.to_string());

            let categories = cat_order
                .iter()
                .filter_map(|cat| {
                    let cat_rows: Vec<SettingRow> =
                        rows.iter().filter(|r| &r.saved.category == cat).map(|r| (*r).clone()).collect();
                    if cat_rows.is_empty() {
                        None
                    } else {
                        Some(CategoryGroup {
                            id: cat.clone(),
                            label: category_label(&page, cat).to_string(),
                            rows: cat_rows,
                        })
                    }
                })
                .collect();
            out.push(PageGroup {
                label: page_info(&page).map(|p| p.label).unwrap_or(page.as_str()).to_string(),
                page,
                categories,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::test_store;

    fn testimonial_form(name: &str) -> HashMap<String, String> {
        [
            ("name", name),
            ("role", "常客"),
            ("content", "牛肉很嫩，汤头清甜"),
            ("rating", "5"),
            ("avatar", "王"),
            ("is_active", "on"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn add_then_submit_returns_to_idle() {
        let store = test_store();
        let state = EditorState::start_add();
        assert!(matches!(state, EditorState::FormOpen { mode: FormMode::Add, .. }));
        let state = EditorState::reopen(FormMode::Add, testimonial_form("王先生"));
        let out = state.submit(&store, Collection::Testimonials);
        assert_eq!(out.state, EditorState::Idle);
        assert_eq!(out.saved.unwrap().get_str("name"), "王先生");
    }

    #[test]
    fn invalid_submit_keeps_form_open_with_draft() {
        let store = test_store();
        let mut form = testimonial_form("王先生");
        form.insert("rating".into(), "0".into());
        let out = EditorState::reopen(FormMode::Add, form).submit(&store, Collection::Testimonials);
        match out.state {
            EditorState::FormOpen { field_errors, draft, .. } => {
                assert!(field_errors.contains_key("rating"));
                assert_eq!(draft["name"], "王先生");
            }
            EditorState::Idle => panic!("form should stay open"),
        }
        assert!(out.saved.is_none());
    }

    #[test]
    fn stale_edit_surfaces_conflict() {
        let store = test_store();
        let rec = store
            .collection_list(Collection::Testimonials, false)
            .unwrap()
            .remove(0);
        let mut form = match EditorState::start_edit(&rec) {
            EditorState::FormOpen { draft, .. } => draft,
            EditorState::Idle => unreachable!(),
        };
        form.insert("version".into(), rec.version.to_string());
        store.collection_toggle_active(Collection::Testimonials, rec.id).unwrap();

        let out = EditorState::reopen(FormMode::Edit(rec.id), form).submit(&store, Collection::Testimonials);
        match out.state {
            EditorState::FormOpen { error: Some(msg), .. } => assert!(msg.contains("请刷新后重试")),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn delete_requires_confirmation() {
        let store = test_store();
        let rec = store.collection_list(Collection::MenuTips, false).unwrap().remove(0);
        assert!(confirm_delete(&store, Collection::MenuTips, rec.id, None).is_err());
        assert!(store.collection_get(Collection::MenuTips, rec.id).is_ok());
        confirm_delete(&store, Collection::MenuTips, rec.id, Some("yes")).unwrap();
        assert!(store.collection_get(Collection::MenuTips, rec.id).is_err());
    }

    #[test]
    fn settings_dirty_tracking_and_save_all() {
        let store = test_store();
        let mut ed = SettingsEditor::load(&store).unwrap();
        assert_eq!(ed.dirty_count(), 0);
        let ids: Vec<i64> = ed.rows().iter().take(3).map(|r| r.saved.id).collect();

        // Editing back to the saved value is not a change.
        let original = ed.rows()[0].saved.value.clone();
        ed.edit(ids[0], "临时");
        ed.edit(ids[0], &original);
        assert_eq!(ed.dirty_count(), 0);

        let mut form = HashMap::new();
        form.insert(format!("value_{}", ids[1]), "一".to_string());
        form.insert(format!("value_{}", ids[2]), "二".to_string());
        form.insert("csrf".to_string(), "x".to_string());
        ed.apply_form(&form);
        assert_eq!(ed.dirty_count(), 2);

        let report = ed.save_all(&store);
        assert_eq!(report.saved, 2);
        assert!(report.failed.is_none());
        assert_eq!(ed.dirty_count(), 0);
        assert_eq!(store.site_setting_get(ids[1]).unwrap().value, "一");
    }

    #[test]
    fn save_all_stops_at_conflict_and_keeps_earlier_rows() {
        let store = test_store();
        let mut ed = SettingsEditor::load(&store).unwrap();
        let first = ed.rows()[0].saved.clone();
        let second = ed.rows()[1].saved.clone();
        ed.edit(first.id, "A");
        ed.edit(second.id, "B");
        // Someone else saves the second row meanwhile.
        store.site_setting_update(second.id, "other", None).unwrap();

        let report = ed.save_all(&store);
        assert_eq!(report.saved, 1);
        let (key, err) = report.failed.unwrap();
        assert_eq!(key, second.key);
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.site_setting_get(first.id).unwrap().value, "A");
        assert_eq!(store.site_setting_get(second.id).unwrap().value, "other");
    }

    #[test]
    fn stale_posted_version_is_a_conflict() {
        let store = test_store();
        let row = SettingsEditor::load(&store).unwrap().rows()[0].saved.clone();
        store.site_setting_update(row.id, "newer", None).unwrap();

        // Editor reloaded after the other write, but the form was rendered before it.
        let mut ed = SettingsEditor::load(&store).unwrap();
        let mut form = HashMap::new();
        form.insert(format!("value_{}", row.id), "mine".to_string());
        form.insert(format!("version_{}", row.id), row.version.to_string());
        ed.apply_form(&form);
        assert!(matches!(ed.save_one(&store, row.id), Err(StoreError::Conflict { .. })));
        assert_eq!(store.site_setting_get(row.id).unwrap().value, "newer");
    }

    #[test]
    fn grouping_follows_stored_category() {
        let store = test_store();
        let ed = SettingsEditor::load(&store).unwrap();
        let groups = ed.grouped(&SettingFilter { page: Some("about".into()), ..Default::default() });
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "关于");
        let ids: Vec<&str> = groups[0].categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["page", "story", "value", "milestone", "team", "achievement"]);
    }
}
